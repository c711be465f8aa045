use futures_util::{SinkExt, StreamExt};
use ialab_rs_core::{ChannelError, RealtimeChannel, WsChannel};
use ialab_rs_protocol::{ChannelMessage, StreamEvent};
use pretty_assertions::assert_eq;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message as WsMessage;

/// Accept one socket: push `frames` to the client and forward what it sends.
async fn spawn_server(frames: Vec<String>) -> (String, mpsc::UnboundedReceiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let (forward, received) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept");
        let mut socket = tokio_tungstenite::accept_async(stream)
            .await
            .expect("handshake");
        for frame in frames {
            socket.send(WsMessage::Text(frame)).await.expect("send");
        }
        while let Some(Ok(frame)) = socket.next().await {
            if let WsMessage::Text(text) = frame {
                let _ = forward.send(text);
            }
        }
    });
    (format!("ws://{addr}/ws"), received)
}

async fn next_event(
    events: &mut tokio::sync::broadcast::Receiver<ChannelMessage>,
) -> ChannelMessage {
    tokio::time::timeout(Duration::from_secs(5), events.recv())
        .await
        .expect("event in time")
        .expect("open channel")
}

#[tokio::test]
async fn frames_are_decoded_and_broadcast() {
    let delta = ChannelMessage::ResponseDelta(StreamEvent::delta("Hi"));
    let frames = vec![
        serde_json::to_string(&delta).expect("encode"),
        "not json".to_string(),
        r#"{"event":"response_stopped"}"#.to_string(),
    ];
    let (url, _received) = spawn_server(frames).await;

    let channel = WsChannel::new(url);
    let mut events = channel.subscribe();
    channel.connect().await.expect("connect");
    assert!(channel.is_connected());

    assert_eq!(next_event(&mut events).await, delta);
    assert_eq!(next_event(&mut events).await, ChannelMessage::ResponseStopped);
    channel.disconnect().await;
    assert!(!channel.is_connected());
}

#[tokio::test]
async fn emit_sends_json_envelope() {
    let (url, mut received) = spawn_server(Vec::new()).await;
    let channel = WsChannel::new(url);
    channel.connect().await.expect("connect");

    channel
        .emit(ChannelMessage::ConsoleOutput("ping".to_string()))
        .await
        .expect("emit");
    let frame = tokio::time::timeout(Duration::from_secs(5), received.recv())
        .await
        .expect("frame in time")
        .expect("frame");
    assert_eq!(frame, r#"{"event":"console_output","data":"ping"}"#);
}

#[tokio::test]
async fn emit_before_connect_fails() {
    let channel = WsChannel::new("ws://127.0.0.1:9/ws");
    let err = channel
        .emit(ChannelMessage::ResponseStopped)
        .await
        .expect_err("not connected");
    assert!(matches!(err, ChannelError::NotConnected));
}

#[tokio::test]
async fn connect_to_closed_port_fails() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let channel = WsChannel::new(format!("ws://{addr}/ws"));
    let err = channel.connect().await.expect_err("refused");
    assert!(matches!(err, ChannelError::Connect(_)));
}
