//! Command-line client for an IALab backend.

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use ialab_rs::Client;
use ialab_rs_config::{IalabConfig, LayeredConfigOptions};
use ialab_rs_core::{ChatSession, RealtimeChannel, StreamOutcome, TurnSubmission};
use ialab_rs_protocol::ChannelMessage;
use log::{debug, info};
use std::io::{Read, Write};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;

/// Command-line options for the IALab client.
#[derive(Parser)]
#[command(name = "ialab", version)]
struct Cli {
    /// Extra ialab.json5 layered over the discovered config
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Segment markdown from a file (or stdin) and print the segments as JSON
    Render { file: Option<PathBuf> },
    /// Manage stored chats
    Chats {
        #[command(subcommand)]
        action: ChatsAction,
    },
    /// Manage backend models
    Models {
        #[command(subcommand)]
        action: ModelsAction,
    },
    /// Interactive chat over the real-time channel
    Chat {
        /// Stored chat to continue
        #[arg(long)]
        open: Option<String>,
    },
}

#[derive(Subcommand)]
enum ChatsAction {
    List,
    Show { name: String },
    Delete { name: String },
}

#[derive(Subcommand)]
enum ModelsAction {
    List,
    Load {
        path: String,
        #[arg(long)]
        format: Option<String>,
    },
    Unload,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    ialab_rs::init_logging();
    let cli = Cli::parse();

    match cli.command {
        Command::Render { file } => render(file.as_ref()),
        Command::Chats { action } => {
            let mut client = client(cli.config.as_ref())?;
            chats(&mut client.session, action).await
        }
        Command::Models { action } => {
            let client = client(cli.config.as_ref())?;
            models(&client.session, action).await
        }
        Command::Chat { open } => {
            let Client {
                mut session,
                channel,
            } = client(cli.config.as_ref())?;
            if let Some(name) = open {
                session
                    .open_chat(&name)
                    .await
                    .with_context(|| format!("failed to open chat {name}"))?;
            }
            let events = channel.subscribe();
            channel
                .connect()
                .await
                .context("failed to connect realtime channel")?;
            let result = chat_loop(&mut session, events).await;
            channel.disconnect().await;
            result
        }
    }
}

fn client(config_path: Option<&PathBuf>) -> anyhow::Result<Client> {
    let config = load_config(config_path)?;
    Client::from_config(&config).context("failed to build client")
}

fn load_config(runtime_path: Option<&PathBuf>) -> anyhow::Result<IalabConfig> {
    let cwd = std::env::current_dir().context("cwd")?;
    info!("loading layered config from cwd: {}", cwd.display());
    let mut options = LayeredConfigOptions::new(&cwd);
    if let Some(path) = runtime_path {
        info!("adding runtime config layer: {}", path.display());
        options = options.with_runtime_path(path);
    }
    let layered =
        IalabConfig::load_layered_with_options(options).context("failed to load layered config")?;
    let sources: Vec<&str> = layered.layers.iter().map(|layer| layer.source.name()).collect();
    debug!("layered config loaded (layers={})", sources.join(","));
    Ok(layered.config)
}

fn render(file: Option<&PathBuf>) -> anyhow::Result<()> {
    let text = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read stdin")?;
            text
        }
    };
    let segments = ialab_rs_render::segment(&text);
    println!("{}", serde_json::to_string_pretty(&segments)?);
    Ok(())
}

async fn chats(session: &mut ChatSession, action: ChatsAction) -> anyhow::Result<()> {
    match action {
        ChatsAction::List => {
            for name in session.list_chats().await? {
                println!("{name}");
            }
        }
        ChatsAction::Show { name } => {
            session.open_chat(&name).await?;
            for message in session.conversation().messages() {
                println!("[{}] {}", message.role.as_str(), message.content.text());
            }
        }
        ChatsAction::Delete { name } => {
            session.delete_chat(&name).await?;
            println!("deleted {name}");
        }
    }
    Ok(())
}

async fn models(session: &ChatSession, action: ModelsAction) -> anyhow::Result<()> {
    match action {
        ModelsAction::List => {
            let listing = session.list_models().await?;
            for model in &listing.models {
                match model.size() {
                    Some(size) => println!("{} ({size} bytes)", model.path()),
                    None => println!("{}", model.path()),
                }
            }
            println!("formats: {}", listing.formats.join(", "));
        }
        ModelsAction::Load { path, format } => {
            session.load_model(&path, format.as_deref()).await?;
            println!("loaded {path}");
        }
        ModelsAction::Unload => {
            session.unload_model().await?;
            println!("model unloaded");
        }
    }
    Ok(())
}

/// Read lines from stdin; Ctrl-C stops a streaming reply.
async fn chat_loop(
    session: &mut ChatSession,
    mut events: broadcast::Receiver<ChannelMessage>,
) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            return Ok(());
        };
        let command = line.trim().to_owned();
        match command.as_str() {
            "/exit" => return Ok(()),
            "/new" => {
                session.reset_conversation();
                continue;
            }
            "/retry" => {
                let submission = session.retry_last_turn().await;
                if !report_submission(session, submission) {
                    continue;
                }
            }
            _ => {
                let submission = session.submit_user_turn(line).await;
                if !report_submission(session, submission) {
                    continue;
                }
            }
        }
        stream_reply(session, &mut events).await?;
    }
}

/// Print the banner for a rejected send; true when a reply is expected.
fn report_submission(session: &ChatSession, submission: TurnSubmission) -> bool {
    match submission {
        TurnSubmission::Sent(_) => true,
        TurnSubmission::Ignored => false,
        TurnSubmission::Failed(_) => {
            if let Some(banner) = session.conversation().error() {
                eprintln!("{} ({})", banner.title, banner.detail);
            }
            false
        }
    }
}

async fn stream_reply(
    session: &mut ChatSession,
    events: &mut broadcast::Receiver<ChannelMessage>,
) -> anyhow::Result<()> {
    while session.conversation().is_loading() {
        tokio::select! {
            received = events.recv() => {
                let message = match received {
                    Ok(message) => message,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        if let Some(notice) = session.on_channel_lagged(skipped) {
                            println!();
                            eprintln!("{}", notice.content.text());
                        }
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => bail!("realtime channel closed"),
                };
                let delta = match &message {
                    ChannelMessage::ResponseDelta(event) => event.content.clone(),
                    _ => String::new(),
                };
                match session.handle_channel_message(&message) {
                    Some(StreamOutcome::Buffered) => {
                        print!("{delta}");
                        std::io::stdout().flush()?;
                    }
                    Some(StreamOutcome::Committed(_)) => println!("{delta}"),
                    Some(StreamOutcome::CompletedEmpty) => println!(),
                    Some(StreamOutcome::Failed(notice)) => {
                        println!();
                        eprintln!("{}", notice.content.text());
                    }
                    Some(StreamOutcome::Ignored) | None => {}
                }
            }
            _ = tokio::signal::ctrl_c() => {
                session.stop_active_turn();
                if let Some(notice) = session.conversation().messages().last() {
                    println!();
                    eprintln!("{}", notice.content.text());
                }
            }
        }
    }
    Ok(())
}
