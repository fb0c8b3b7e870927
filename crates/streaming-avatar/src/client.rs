use crate::events::EventHandler;
use crate::types::{
    AvatarApiConfig, SessionInfo, SpeakRequest, SpeakResponse, StartAvatarRequest, StreamingEvent,
    VoiceChatConfig,
};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// The contract of a real-time streaming avatar client.
///
/// Implementations own the connection to the avatar service (signalling, media
/// transport, audio capture) and report what happens on it through events
/// registered with [`on`](Self::on). Handlers are called synchronously from
/// whatever context the implementation emits on.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait StreamingAvatarClient: Send + Sync {
    /// Registers `handler` for `event`.
    fn on(&self, event: StreamingEvent, handler: EventHandler);

    /// Deregisters a handler previously passed to [`on`](Self::on).
    fn off(&self, event: StreamingEvent, handler: &EventHandler);

    /// Creates a session and starts streaming. `StreamReady` is emitted once
    /// media is flowing.
    async fn create_start_avatar(&self, request: StartAvatarRequest) -> Result<SessionInfo>;

    /// Tears the session down.
    async fn stop_avatar(&self) -> Result<()>;

    async fn start_voice_chat(&self, config: VoiceChatConfig) -> Result<()>;

    fn close_voice_chat(&self);

    fn mute_input_audio(&self);

    fn unmute_input_audio(&self);

    /// Sends text for the avatar to answer or repeat.
    async fn speak(&self, request: SpeakRequest) -> Result<SpeakResponse>;

    async fn start_listening(&self) -> Result<()>;

    async fn stop_listening(&self) -> Result<()>;

    /// Cuts off whatever the avatar is currently saying.
    async fn interrupt(&self) -> Result<()>;
}

/// Builds clients from credentials.
///
/// The session controller holds one of these so it can lazily construct a
/// client the first time it is given a token.
pub trait AvatarClientFactory: Send + Sync {
    fn create(&self, config: AvatarApiConfig) -> Arc<dyn StreamingAvatarClient>;
}

impl<F> AvatarClientFactory for F
where
    F: Fn(AvatarApiConfig) -> Arc<dyn StreamingAvatarClient> + Send + Sync,
{
    fn create(&self, config: AvatarApiConfig) -> Arc<dyn StreamingAvatarClient> {
        self(config)
    }
}
