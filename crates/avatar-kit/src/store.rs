//! Observable session state.
//!
//! [`AvatarStore`] is the single source of truth for one avatar session: its
//! connection status, voice-chat flags, activity flags and transcript. Every
//! mutation synchronously notifies all subscribers in registration order.
//! Subscribers receive no payload and re-read whatever they need.
//!
//! The store is meant to be created once by the composition root and shared
//! as an `Arc<AvatarStore>`.

use avatar_kit_core::generate_id;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use streaming_avatar::{ConnectionQuality, MediaStream, StreamingAvatarClient};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    #[default]
    Inactive,
    Connecting,
    Connected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageSender {
    Client,
    Avatar,
}

/// One chat turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub sender: MessageSender,
    pub content: String,
}

impl Message {
    /// Creates a message with a fresh unique id.
    pub fn new(sender: MessageSender, content: impl Into<String>) -> Self {
        Self {
            id: generate_id(),
            sender,
            content: content.into(),
        }
    }
}

/// A snapshot of everything the store tracks, apart from the client handle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionState {
    pub base_path: Option<String>,
    pub is_muted: bool,
    pub is_voice_chat_loading: bool,
    pub is_voice_chat_active: bool,
    pub session_state: SessionStatus,
    pub stream: Option<MediaStream>,
    pub messages: Vec<Message>,
    pub is_listening: bool,
    pub is_user_talking: bool,
    pub is_avatar_talking: bool,
    pub connection_quality: ConnectionQuality,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            base_path: None,
            is_muted: true,
            is_voice_chat_loading: false,
            is_voice_chat_active: false,
            session_state: SessionStatus::Inactive,
            stream: None,
            messages: Vec::new(),
            is_listening: false,
            is_user_talking: false,
            is_avatar_talking: false,
            connection_quality: ConnectionQuality::Unknown,
        }
    }
}

/// A write to exactly one field of [`SessionState`].
#[derive(Debug, Clone, PartialEq)]
pub enum StateChange {
    BasePath(Option<String>),
    IsMuted(bool),
    IsVoiceChatLoading(bool),
    IsVoiceChatActive(bool),
    SessionState(SessionStatus),
    Stream(Option<MediaStream>),
    Messages(Vec<Message>),
    IsListening(bool),
    IsUserTalking(bool),
    IsAvatarTalking(bool),
    ConnectionQuality(ConnectionQuality),
}

impl StateChange {
    /// The name of the field this change writes, for logging.
    pub fn field(&self) -> &'static str {
        match self {
            StateChange::BasePath(_) => "base_path",
            StateChange::IsMuted(_) => "is_muted",
            StateChange::IsVoiceChatLoading(_) => "is_voice_chat_loading",
            StateChange::IsVoiceChatActive(_) => "is_voice_chat_active",
            StateChange::SessionState(_) => "session_state",
            StateChange::Stream(_) => "stream",
            StateChange::Messages(_) => "messages",
            StateChange::IsListening(_) => "is_listening",
            StateChange::IsUserTalking(_) => "is_user_talking",
            StateChange::IsAvatarTalking(_) => "is_avatar_talking",
            StateChange::ConnectionQuality(_) => "connection_quality",
        }
    }

    fn apply(self, state: &mut SessionState) {
        match self {
            StateChange::BasePath(v) => state.base_path = v,
            StateChange::IsMuted(v) => state.is_muted = v,
            StateChange::IsVoiceChatLoading(v) => state.is_voice_chat_loading = v,
            StateChange::IsVoiceChatActive(v) => state.is_voice_chat_active = v,
            StateChange::SessionState(v) => state.session_state = v,
            StateChange::Stream(v) => state.stream = v,
            StateChange::Messages(v) => state.messages = v,
            StateChange::IsListening(v) => state.is_listening = v,
            StateChange::IsUserTalking(v) => state.is_user_talking = v,
            StateChange::IsAvatarTalking(v) => state.is_avatar_talking = v,
            StateChange::ConnectionQuality(v) => state.connection_quality = v,
        }
    }
}

/// Settings applied with [`AvatarStore::configure`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreConfig {
    pub base_path: Option<String>,
}

/// An observer callback.
pub type Listener = Arc<dyn Fn() + Send + Sync>;

type ListenerList = Mutex<Vec<(u64, Listener)>>;

/// Returned by [`AvatarStore::subscribe`]; call [`unsubscribe`](Self::unsubscribe)
/// to stop receiving notifications. Dropping it without unsubscribing keeps the
/// listener registered.
#[must_use = "dropping a Subscription does not unsubscribe; keep it to call unsubscribe()"]
pub struct Subscription {
    id: u64,
    listeners: Weak<ListenerList>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.lock().retain(|(id, _)| *id != self.id);
        }
    }
}

pub struct AvatarStore {
    state: RwLock<SessionState>,
    avatar: RwLock<Option<Arc<dyn StreamingAvatarClient>>>,
    listeners: Arc<ListenerList>,
    next_listener_id: AtomicU64,
}

impl Default for AvatarStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AvatarStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(SessionState::default()),
            avatar: RwLock::new(None),
            listeners: Arc::new(Mutex::new(Vec::new())),
            next_listener_id: AtomicU64::new(0),
        }
    }

    /// Returns a snapshot of the current state.
    pub fn get_state(&self) -> SessionState {
        self.state.read().clone()
    }

    /// Reads from the current state without cloning it.
    ///
    /// `f` runs under the state's read lock and must not mutate the store.
    pub fn read<R>(&self, f: impl FnOnce(&SessionState) -> R) -> R {
        f(&self.state.read())
    }

    pub fn session_status(&self) -> SessionStatus {
        self.state.read().session_state
    }

    /// Writes one field, then notifies every listener once.
    pub fn set_state(&self, change: StateChange) {
        debug!(field = change.field(), "Updating avatar state");
        change.apply(&mut self.state.write());
        self.notify_listeners();
    }

    /// Registers `listener`. Each call is an independent registration, even
    /// when the same callback is subscribed twice.
    pub fn subscribe(&self, listener: Listener) -> Subscription {
        let id = self.next_listener_id.fetch_add(1, Ordering::Relaxed);
        self.listeners.lock().push((id, listener));
        Subscription {
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    // Listeners run with no store lock held, so they may read or write the
    // store again.
    fn notify_listeners(&self) {
        let snapshot: Vec<Listener> = self
            .listeners
            .lock()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in snapshot {
            listener();
        }
    }

    /// Applies `config`. Fields left as `None` are not touched.
    pub fn configure(&self, config: StoreConfig) {
        if let Some(base_path) = config.base_path {
            self.set_state(StateChange::BasePath(Some(base_path)));
        }
    }

    /// Restores every field to its default, drops the client handle and
    /// notifies once.
    pub fn reset(&self) {
        *self.state.write() = SessionState::default();
        *self.avatar.write() = None;
        self.notify_listeners();
    }

    pub fn add_message(&self, message: Message) {
        self.update_messages(|messages| {
            messages.push(message);
            Some(())
        });
    }

    /// Replaces the content of the last message. Does nothing, and does not
    /// notify, when there are no messages.
    pub fn update_last_message(&self, content: impl Into<String>) {
        self.update_messages(|messages| {
            messages.last_mut()?.content = content.into();
            Some(())
        });
    }

    /// Appends `text` to the last message. Returns `false`, without
    /// notifying, when there are no messages.
    pub fn append_to_last_message(&self, text: &str) -> bool {
        self.update_messages(|messages| {
            messages.last_mut()?.content.push_str(text);
            Some(())
        })
        .is_some()
    }

    // Copies, edits and stores the message list under one write guard.
    // Listeners are notified only when `f` returns `Some`.
    fn update_messages<R>(&self, f: impl FnOnce(&mut Vec<Message>) -> Option<R>) -> Option<R> {
        let result = {
            let mut state = self.state.write();
            let mut messages = state.messages.clone();
            let result = f(&mut messages)?;
            state.messages = messages;
            result
        };
        debug!(field = "messages", "Updating avatar state");
        self.notify_listeners();
        Some(result)
    }

    pub fn clear_messages(&self) {
        self.set_state(StateChange::Messages(Vec::new()));
    }

    pub fn last_message(&self) -> Option<Message> {
        self.state.read().messages.last().cloned()
    }

    /// The client handle, if one has been initialized.
    pub fn avatar(&self) -> Option<Arc<dyn StreamingAvatarClient>> {
        self.avatar.read().clone()
    }

    /// Replaces the client handle. Listeners are not notified.
    pub fn set_avatar(&self, avatar: Option<Arc<dyn StreamingAvatarClient>>) {
        *self.avatar.write() = avatar;
    }
}
