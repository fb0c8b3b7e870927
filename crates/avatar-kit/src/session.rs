//! Session lifecycle: start and stop an avatar session and keep the store in
//! step with the client's events.
//!
//! `Inactive -> start -> Connecting -> StreamReady -> Connected ->
//! stop / StreamDisconnected -> Inactive`

use crate::aggregator::TurnAggregator;
use crate::error::{Result, SessionError};
use crate::store::{AvatarStore, MessageSender, SessionStatus, StateChange};
use crate::voice_chat::VoiceChat;
use avatar_kit_core::is_valid_api_key;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use streaming_avatar::{
    AvatarApiConfig, AvatarClientFactory, AvatarEvent, EventHandler, MediaStream,
    StartAvatarRequest, StreamingAvatarClient, StreamingEvent,
};
use tracing::{debug, info, warn};

/// Optional application callbacks registered on the client by
/// [`SessionController::init`], one per event.
#[derive(Default, Clone)]
pub struct InitEventCallbacks {
    pub on_stream_ready: Option<EventHandler>,
    pub on_stream_disconnected: Option<EventHandler>,
    pub on_avatar_start_talking: Option<EventHandler>,
    pub on_avatar_stop_talking: Option<EventHandler>,
    pub on_avatar_talking_message: Option<EventHandler>,
    pub on_avatar_end_message: Option<EventHandler>,
    pub on_user_start_talking: Option<EventHandler>,
    pub on_user_stop_talking: Option<EventHandler>,
    pub on_user_talking_message: Option<EventHandler>,
    pub on_user_end_message: Option<EventHandler>,
}

impl InitEventCallbacks {
    fn into_bindings(self) -> Vec<(StreamingEvent, EventHandler)> {
        [
            (StreamingEvent::StreamReady, self.on_stream_ready),
            (StreamingEvent::StreamDisconnected, self.on_stream_disconnected),
            (StreamingEvent::AvatarStartTalking, self.on_avatar_start_talking),
            (StreamingEvent::AvatarStopTalking, self.on_avatar_stop_talking),
            (StreamingEvent::AvatarTalkingMessage, self.on_avatar_talking_message),
            (StreamingEvent::AvatarEndMessage, self.on_avatar_end_message),
            (StreamingEvent::UserStart, self.on_user_start_talking),
            (StreamingEvent::UserStop, self.on_user_stop_talking),
            (StreamingEvent::UserTalkingMessage, self.on_user_talking_message),
            (StreamingEvent::UserEndMessage, self.on_user_end_message),
        ]
        .into_iter()
        .filter_map(|(event, handler)| handler.map(|h| (event, h)))
        .collect()
    }
}

struct Inner {
    store: Arc<AvatarStore>,
    factory: Arc<dyn AvatarClientFactory>,
    aggregator: TurnAggregator,
    voice_chat: VoiceChat,
    /// Handlers registered by `start`, removed again by `stop`.
    bindings: Mutex<Vec<(StreamingEvent, EventHandler)>>,
}

/// Starts and stops sessions against the client held by the store.
///
/// Cheap to clone; clones share the same speaker marker and event bindings.
#[derive(Clone)]
pub struct SessionController {
    inner: Arc<Inner>,
}

impl SessionController {
    pub fn new(store: Arc<AvatarStore>, factory: Arc<dyn AvatarClientFactory>) -> Self {
        Self {
            inner: Arc::new(Inner {
                voice_chat: VoiceChat::new(store.clone()),
                store,
                factory,
                aggregator: TurnAggregator::new(),
                bindings: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn store(&self) -> &Arc<AvatarStore> {
        &self.inner.store
    }

    pub fn avatar(&self) -> Option<Arc<dyn StreamingAvatarClient>> {
        self.inner.store.avatar()
    }

    pub fn session_state(&self) -> SessionStatus {
        self.inner.store.session_status()
    }

    pub fn stream(&self) -> Option<MediaStream> {
        self.inner.store.read(|s| s.stream.clone())
    }

    /// Builds a client for `token`, makes it the store's client and registers
    /// `callbacks` on it.
    pub fn init(
        &self,
        token: &str,
        callbacks: InitEventCallbacks,
    ) -> Arc<dyn StreamingAvatarClient> {
        let store = &self.inner.store;
        let config = AvatarApiConfig {
            token: token.to_string(),
            base_path: store.read(|s| s.base_path.clone()),
        };
        info!(base_path = ?config.base_path, "Initializing avatar client");

        let avatar = self.inner.factory.create(config);
        store.set_avatar(Some(avatar.clone()));
        for (event, handler) in callbacks.into_bindings() {
            avatar.on(event, handler);
        }
        avatar
    }

    /// Starts a session.
    ///
    /// Fails without touching any state if a session is already active, or if
    /// no client exists and `token` is missing. Otherwise moves to
    /// `Connecting`, wires the client's events into the store and waits for
    /// the client to create the session.
    pub async fn start(
        &self,
        request: StartAvatarRequest,
        token: Option<&str>,
    ) -> Result<Arc<dyn StreamingAvatarClient>> {
        let store = &self.inner.store;
        if store.session_status() != SessionStatus::Inactive {
            return Err(SessionError::AlreadyActive);
        }

        if store.avatar().is_none() {
            match token {
                Some(token) if is_valid_api_key(token) => {
                    self.init(token, InitEventCallbacks::default());
                }
                _ => return Err(SessionError::TokenRequired),
            }
        }
        let avatar = store.avatar().ok_or(SessionError::NotInitialized)?;

        store.set_state(StateChange::SessionState(SessionStatus::Connecting));
        self.bind_session_events(avatar.as_ref());

        info!(avatar = %request.avatar_name, "Starting avatar session");
        let session = avatar.create_start_avatar(request).await?;
        info!(session_id = %session.session_id, "Avatar session created");

        Ok(avatar)
    }

    /// Stops the session and returns the store to `Inactive`.
    ///
    /// Safe to call when no session is running. If the client fails to tear
    /// down, the error is returned and the status is left as it was.
    pub async fn stop(&self) -> Result<()> {
        let inner = &self.inner;
        let store = &inner.store;
        let avatar = store.avatar();

        let bindings = std::mem::take(&mut *inner.bindings.lock());
        if let Some(avatar) = &avatar {
            for (event, handler) in &bindings {
                avatar.off(*event, handler);
            }
        }

        store.clear_messages();
        inner.aggregator.reset();
        inner.voice_chat.stop_voice_chat();
        store.set_state(StateChange::IsListening(false));
        store.set_state(StateChange::IsUserTalking(false));
        store.set_state(StateChange::IsAvatarTalking(false));
        store.set_state(StateChange::Stream(None));

        if let Some(avatar) = &avatar {
            avatar.stop_avatar().await?;
        }
        store.set_state(StateChange::SessionState(SessionStatus::Inactive));
        info!("Avatar session stopped");
        Ok(())
    }

    fn bind_session_events(&self, avatar: &dyn StreamingAvatarClient) {
        let weak = Arc::downgrade(&self.inner);
        let bindings: Vec<(StreamingEvent, EventHandler)> = vec![
            (
                StreamingEvent::StreamReady,
                handler(&weak, |inner, event| {
                    inner
                        .store
                        .set_state(StateChange::Stream(event.stream().cloned()));
                    inner
                        .store
                        .set_state(StateChange::SessionState(SessionStatus::Connected));
                    info!("Avatar stream ready");
                }),
            ),
            (
                StreamingEvent::StreamDisconnected,
                handler(&weak, |inner, _| {
                    info!("Avatar stream disconnected; stopping session");
                    spawn_stop(SessionController { inner });
                }),
            ),
            (
                StreamingEvent::ConnectionQualityChanged,
                handler(&weak, |inner, event| match event.quality() {
                    Some(quality) => inner
                        .store
                        .set_state(StateChange::ConnectionQuality(quality)),
                    None => warn!("Connection quality event without a quality"),
                }),
            ),
            (
                StreamingEvent::UserStart,
                handler(&weak, |inner, _| {
                    inner.store.set_state(StateChange::IsUserTalking(true))
                }),
            ),
            (
                StreamingEvent::UserStop,
                handler(&weak, |inner, _| {
                    inner.store.set_state(StateChange::IsUserTalking(false))
                }),
            ),
            (
                StreamingEvent::AvatarStartTalking,
                handler(&weak, |inner, _| {
                    inner.store.set_state(StateChange::IsAvatarTalking(true))
                }),
            ),
            (
                StreamingEvent::AvatarStopTalking,
                handler(&weak, |inner, _| {
                    inner.store.set_state(StateChange::IsAvatarTalking(false))
                }),
            ),
            (
                StreamingEvent::UserTalkingMessage,
                handler(&weak, |inner, event| {
                    inner.push_fragment(MessageSender::Client, event)
                }),
            ),
            (
                StreamingEvent::AvatarTalkingMessage,
                handler(&weak, |inner, event| {
                    inner.push_fragment(MessageSender::Avatar, event)
                }),
            ),
            (
                StreamingEvent::UserEndMessage,
                handler(&weak, |inner, _| inner.aggregator.end_turn()),
            ),
            (
                StreamingEvent::AvatarEndMessage,
                handler(&weak, |inner, _| inner.aggregator.end_turn()),
            ),
        ];

        for (event, handler) in &bindings {
            avatar.on(*event, handler.clone());
        }
        self.inner.bindings.lock().extend(bindings);
    }
}

impl Inner {
    fn push_fragment(&self, sender: MessageSender, event: &AvatarEvent) {
        let Some(text) = event.message() else {
            warn!(event = ?event.event, "Talking message event without text");
            return;
        };
        let outcome = self.aggregator.push_fragment(&self.store, sender, text);
        debug!(?sender, ?outcome, "Aggregated fragment");
    }
}

/// Wraps `f` in an [`EventHandler`] that only runs while the controller is alive.
fn handler<F>(weak: &Weak<Inner>, f: F) -> EventHandler
where
    F: Fn(Arc<Inner>, &AvatarEvent) + Send + Sync + 'static,
{
    let weak = weak.clone();
    Arc::new(move |event: &AvatarEvent| {
        if let Some(inner) = weak.upgrade() {
            f(inner, event);
        }
    })
}

// Client handlers are synchronous, so the teardown runs as its own task.
fn spawn_stop(controller: SessionController) {
    match tokio::runtime::Handle::try_current() {
        Ok(runtime) => {
            runtime.spawn(async move {
                if let Err(e) = controller.stop().await {
                    warn!(error = %e, "Failed to stop session after stream disconnect");
                }
            });
        }
        Err(_) => warn!("No tokio runtime available; cannot stop disconnected session"),
    }
}
