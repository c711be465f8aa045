//! Streaming conversation aggregator.
//!
//! Owns the committed transcript, the in-flight response buffer, the history
//! mirrored to the backend, and the token counter. All mutation is synchronous;
//! network calls are driven by [`crate::session::ChatSession`].

mod notices;

pub use notices::Notices;

use crate::error::{ApiError, ErrorBanner};
use ialab_rs_config::ChatConfig;
use ialab_rs_protocol::{
    HistoryEntry, Message, MessageContent, MessageId, Role, StreamEvent, TurnId, UserInputRequest,
};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::time::{Duration, Instant};
use uuid::Uuid;

const CHAT_NAME_MAX_CHARS: usize = 40;

/// Phase of the turn currently in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    Idle,
    /// Request sent, no content received yet.
    AwaitingFirstToken,
    /// At least one content fragment buffered.
    Streaming,
}

/// Request produced by starting a turn, ready to POST.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedTurn {
    pub turn_id: TurnId,
    pub request: UserInputRequest,
}

/// Result of feeding one stream event to the conversation.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamOutcome {
    /// Stale or unmatched event; nothing changed.
    Ignored,
    /// Counters or buffer updated, turn still open.
    Buffered,
    /// Turn finished and the buffer became this assistant message.
    Committed(Message),
    /// Turn finished with nothing buffered.
    CompletedEmpty,
    /// Turn ended by a backend error, reported as this system message.
    Failed(Message),
}

#[derive(Debug)]
struct ActiveTurn {
    id: TurnId,
    phase: TurnPhase,
    user_tokens_counted: bool,
}

/// Single source of truth for what has been said in one chat.
#[derive(Debug)]
pub struct Conversation {
    messages: Vec<Message>,
    message_ids: HashSet<MessageId>,
    history: Vec<HistoryEntry>,
    pending: String,
    token_usage: u64,
    active_turn: Option<ActiveTurn>,
    last_request: Option<UserInputRequest>,
    error: Option<ErrorBanner>,
    chat_name: Option<String>,
    system_prompt: String,
    tools: bool,
    rag: bool,
    banner_timeout: Option<Duration>,
    notices: Notices,
}

impl Conversation {
    /// Create an empty conversation from chat settings.
    pub fn new(config: &ChatConfig, notices: Notices) -> Self {
        Self {
            messages: Vec::new(),
            message_ids: HashSet::new(),
            history: vec![HistoryEntry::new(Role::System, config.system_prompt.as_str())],
            pending: String::new(),
            token_usage: 0,
            active_turn: None,
            last_request: None,
            error: None,
            chat_name: None,
            system_prompt: config.system_prompt.clone(),
            tools: config.tools,
            rag: config.rag,
            banner_timeout: config.error_banner_timeout_ms.map(Duration::from_millis),
            notices,
        }
    }

    /// Committed transcript in display order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// History mirrored to the backend; always starts with the system entry.
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Text streamed so far for the active turn.
    pub fn pending_text(&self) -> Option<&str> {
        self.active_turn
            .as_ref()
            .filter(|turn| turn.phase == TurnPhase::Streaming)
            .map(|_| self.pending.as_str())
    }

    pub fn token_usage(&self) -> u64 {
        self.token_usage
    }

    /// Loading indicator: true from submission until the turn ends.
    pub fn is_loading(&self) -> bool {
        self.active_turn.is_some()
    }

    pub fn phase(&self) -> TurnPhase {
        self.active_turn
            .as_ref()
            .map_or(TurnPhase::Idle, |turn| turn.phase)
    }

    pub fn active_turn_id(&self) -> Option<TurnId> {
        self.active_turn.as_ref().map(|turn| turn.id)
    }

    pub fn error(&self) -> Option<&ErrorBanner> {
        self.error.as_ref()
    }

    /// Name the chat is persisted under, once known.
    pub fn chat_name(&self) -> Option<&str> {
        self.chat_name.as_deref()
    }

    pub fn set_chat_name(&mut self, name: impl Into<String>) {
        self.chat_name = Some(name.into());
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Replace the system prompt, rewriting the head of the history.
    pub fn set_system_prompt(&mut self, prompt: impl Into<String>) {
        self.system_prompt = prompt.into();
        let entry = HistoryEntry::new(Role::System, self.system_prompt.as_str());
        match self.history.first_mut() {
            Some(head) if head.role == Role::System => *head = entry,
            _ => self.history.insert(0, entry),
        }
    }

    pub fn tools(&self) -> bool {
        self.tools
    }

    pub fn set_tools(&mut self, enabled: bool) {
        self.tools = enabled;
    }

    pub fn rag(&self) -> bool {
        self.rag
    }

    pub fn set_rag(&mut self, enabled: bool) {
        self.rag = enabled;
    }

    /// Start a user turn.
    ///
    /// Appends the user message and history entry, then returns the request to
    /// send. Returns `None` without touching state for blank input or while
    /// another turn is in flight.
    pub fn begin_user_turn(&mut self, input: impl Into<MessageContent>) -> Option<PreparedTurn> {
        let content = input.into();
        if !content.has_payload() {
            debug!("ignoring empty user input");
            return None;
        }
        if let Some(turn) = &self.active_turn {
            warn!("user input rejected, turn in flight (turn_id={})", turn.id);
            return None;
        }

        if self.chat_name.is_none() {
            self.chat_name = Some(derive_chat_name(&content));
        }
        self.history
            .push(HistoryEntry::new(Role::User, content.clone()));
        self.insert_message(new_message(Role::User, content));
        self.error = None;
        Some(self.start_turn())
    }

    /// Re-send the last request after a failed network call.
    ///
    /// Only valid while idle with an error banner showing.
    pub fn retry_last_turn(&mut self) -> Option<PreparedTurn> {
        if self.active_turn.is_some() || self.error.is_none() || self.last_request.is_none() {
            return None;
        }
        self.error = None;
        Some(self.start_turn())
    }

    fn start_turn(&mut self) -> PreparedTurn {
        let turn_id = Uuid::new_v4();
        self.pending.clear();
        self.active_turn = Some(ActiveTurn {
            id: turn_id,
            phase: TurnPhase::AwaitingFirstToken,
            user_tokens_counted: false,
        });
        let request = UserInputRequest {
            content: self.history.clone(),
            tools: self.tools,
            rag: self.rag,
            turn_id: Some(turn_id),
        };
        self.last_request = Some(request.clone());
        info!(
            "turn started (turn_id={}, history_len={})",
            turn_id,
            self.history.len()
        );
        PreparedTurn { turn_id, request }
    }

    /// Apply one incremental update from the real-time channel.
    ///
    /// Events are ignored while idle or when their turn id names a different
    /// turn; events without a turn id belong to the active turn.
    pub fn apply_stream_event(&mut self, event: &StreamEvent) -> StreamOutcome {
        let Some(turn) = self.active_turn.as_mut() else {
            debug!("stream event while idle ignored (finished={})", event.finished);
            return StreamOutcome::Ignored;
        };
        if let Some(turn_id) = event.turn_id
            && turn_id != turn.id
        {
            debug!(
                "stream event for stale turn ignored (turn_id={}, active={})",
                turn_id, turn.id
            );
            return StreamOutcome::Ignored;
        }

        if let Some(tokens) = event.user_tokens
            && !turn.user_tokens_counted
        {
            turn.user_tokens_counted = true;
            self.token_usage = self.token_usage.saturating_add(tokens);
        }
        if let Some(tokens) = event.assistant_token_count {
            self.token_usage = self.token_usage.saturating_add(tokens);
        }

        if event.error {
            let turn_id = turn.id;
            self.active_turn = None;
            warn!("turn failed on stream error (turn_id={})", turn_id);
            let notice = self.notices.stream_error(&event.content);
            let message = new_message(Role::System, notice);
            self.insert_message(message.clone());
            return StreamOutcome::Failed(message);
        }

        if !event.content.is_empty() {
            self.pending.push_str(&event.content);
            turn.phase = TurnPhase::Streaming;
        }

        if event.finished {
            return self.commit_pending();
        }
        StreamOutcome::Buffered
    }

    fn commit_pending(&mut self) -> StreamOutcome {
        let Some(turn) = self.active_turn.take() else {
            return StreamOutcome::Ignored;
        };
        let text = std::mem::take(&mut self.pending);
        if text.is_empty() {
            info!("turn completed without content (turn_id={})", turn.id);
            return StreamOutcome::CompletedEmpty;
        }
        self.history
            .push(HistoryEntry::new(Role::Assistant, text.as_str()));
        let message = new_message(Role::Assistant, text);
        self.insert_message(message.clone());
        info!(
            "turn committed (turn_id={}, message_id={})",
            turn.id, message.id
        );
        StreamOutcome::Committed(message)
    }

    /// Record a rejected `user_input` call.
    ///
    /// The user message stays; the banner is raised regardless of whether the
    /// turn is still active.
    pub fn fail_turn(&mut self, turn_id: TurnId, error: &ApiError) {
        if self.active_turn_id() == Some(turn_id) {
            self.active_turn = None;
            self.pending.clear();
        }
        let kind = error.kind();
        warn!(
            "turn request failed (turn_id={}, kind={})",
            turn_id,
            kind.as_str()
        );
        self.error = Some(ErrorBanner {
            kind,
            title: self.notices.banner_title(kind).to_string(),
            detail: error.to_string(),
            raised_at: Instant::now(),
            auto_dismiss: self.banner_timeout,
        });
    }

    /// Abandon the active turn locally.
    ///
    /// Returns the stopped turn id so the caller can notify the backend, or
    /// `None` when nothing was in flight.
    pub fn stop_active_turn(&mut self) -> Option<TurnId> {
        let turn = self.active_turn.take()?;
        self.pending.clear();
        let notice = new_message(Role::System, self.notices.stopped_by_user());
        self.insert_message(notice);
        info!("turn stopped by user (turn_id={})", turn.id);
        Some(turn.id)
    }

    /// End the active turn after stream events were lost.
    ///
    /// The partial reply is discarded and a system notice is appended.
    /// Returns `None` when nothing was in flight.
    pub fn interrupt_turn(&mut self, skipped: u64) -> Option<(TurnId, Message)> {
        let turn = self.active_turn.take()?;
        self.pending.clear();
        let notice = new_message(Role::System, self.notices.stream_lagged(skipped));
        self.insert_message(notice.clone());
        warn!(
            "turn interrupted, stream events lost (turn_id={}, skipped={})",
            turn.id, skipped
        );
        Some((turn.id, notice))
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Clear the banner once its auto-dismiss delay has passed.
    pub fn expire_error(&mut self, now: Instant) -> bool {
        if self.error.as_ref().is_some_and(|banner| banner.is_expired(now)) {
            self.error = None;
            return true;
        }
        false
    }

    /// Start a fresh chat with the current system prompt.
    pub fn reset(&mut self) {
        if let Some(turn) = &self.active_turn {
            debug!("reset abandons active turn (turn_id={})", turn.id);
        }
        self.messages.clear();
        self.message_ids.clear();
        self.pending.clear();
        self.token_usage = 0;
        self.history = vec![HistoryEntry::new(Role::System, self.system_prompt.as_str())];
        self.active_turn = None;
        self.last_request = None;
        self.error = None;
        self.chat_name = None;
    }

    /// Replace the transcript with a stored chat.
    ///
    /// System notices are shown but not mirrored into the history.
    pub fn load_messages(&mut self, name: impl Into<String>, messages: Vec<Message>) {
        self.reset();
        let name = name.into();
        debug!(
            "loading chat (name={}, count={})",
            name,
            messages.len()
        );
        for mut message in messages {
            if message.id.is_empty() {
                message.id = new_message_id();
            }
            let entry = (message.role != Role::System)
                .then(|| HistoryEntry::new(message.role, message.content.clone()));
            if self.insert_message(message)
                && let Some(entry) = entry
            {
                self.history.push(entry);
            }
        }
        self.chat_name = Some(name);
    }

    /// Append a message unless its id is already present.
    pub(crate) fn insert_message(&mut self, message: Message) -> bool {
        if !self.message_ids.insert(message.id.clone()) {
            debug!("duplicate message dropped (message_id={})", message.id);
            return false;
        }
        self.messages.push(message);
        true
    }
}

fn new_message_id() -> MessageId {
    Uuid::new_v4().to_string()
}

fn new_message(role: Role, content: impl Into<MessageContent>) -> Message {
    Message {
        id: new_message_id(),
        role,
        content: content.into(),
        timestamp: chrono::Utc::now().timestamp_millis(),
    }
}

/// Chat name taken from the first user message.
fn derive_chat_name(content: &MessageContent) -> String {
    let text = content.text().split_whitespace().collect::<Vec<_>>().join(" ");
    if text.is_empty() {
        return format!("chat-{}", chrono::Utc::now().format("%Y%m%d-%H%M%S"));
    }
    text.chars().take(CHAT_NAME_MAX_CHARS).collect()
}
