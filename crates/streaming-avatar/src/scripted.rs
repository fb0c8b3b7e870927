//! An in-process client that replays a recorded event script.
//!
//! `ScriptedAvatar` never touches the network. Starting a session emits
//! `StreamReady` followed by every scripted event, in order; `Repeat` speak
//! tasks are echoed back as avatar talking events. Every call made against the
//! client is recorded so callers can inspect what the layer above asked for.

use crate::client::{AvatarClientFactory, StreamingAvatarClient};
use crate::events::{EventHandler, EventRegistry};
use crate::types::{
    AvatarApiConfig, AvatarEvent, MediaStream, SessionInfo, SpeakRequest, SpeakResponse,
    StartAvatarRequest, StreamingEvent, TaskType, VoiceChatConfig,
};
use anyhow::Result;
use async_trait::async_trait;
use avatar_kit_core::generate_id;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, info};

/// One call made against a [`ScriptedAvatar`].
#[derive(Debug, Clone, PartialEq)]
pub enum SdkCall {
    CreateStartAvatar(StartAvatarRequest),
    StopAvatar,
    StartVoiceChat(VoiceChatConfig),
    CloseVoiceChat,
    MuteInputAudio,
    UnmuteInputAudio,
    Speak(SpeakRequest),
    StartListening,
    StopListening,
    Interrupt,
}

pub struct ScriptedAvatar {
    config: AvatarApiConfig,
    registry: EventRegistry,
    script: Mutex<VecDeque<AvatarEvent>>,
    calls: Mutex<Vec<SdkCall>>,
}

impl ScriptedAvatar {
    pub fn new(config: AvatarApiConfig, script: impl IntoIterator<Item = AvatarEvent>) -> Self {
        Self {
            config,
            registry: EventRegistry::new(),
            script: Mutex::new(script.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &AvatarApiConfig {
        &self.config
    }

    /// Emits `event` to the registered handlers right away.
    pub fn emit(&self, event: AvatarEvent) -> usize {
        self.registry.emit(&event)
    }

    pub fn calls(&self) -> Vec<SdkCall> {
        self.calls.lock().clone()
    }

    pub fn handler_count(&self, event: StreamingEvent) -> usize {
        self.registry.handler_count(event)
    }

    fn record(&self, call: SdkCall) {
        debug!(?call, "Scripted avatar call");
        self.calls.lock().push(call);
    }

    fn replay_script(&self) {
        // Drain first so handlers may queue further events without deadlocking.
        let events: Vec<AvatarEvent> = self.script.lock().drain(..).collect();
        for event in &events {
            self.registry.emit(event);
        }
    }
}

#[async_trait]
impl StreamingAvatarClient for ScriptedAvatar {
    fn on(&self, event: StreamingEvent, handler: EventHandler) {
        self.registry.on(event, handler);
    }

    fn off(&self, event: StreamingEvent, handler: &EventHandler) {
        self.registry.off(event, handler);
    }

    async fn create_start_avatar(&self, request: StartAvatarRequest) -> Result<SessionInfo> {
        info!(avatar = %request.avatar_name, "Starting scripted avatar session");
        self.record(SdkCall::CreateStartAvatar(request));
        let session_id = generate_id();
        self.registry
            .emit(&AvatarEvent::stream_ready(MediaStream::new(format!(
                "stream-{session_id}"
            ))));
        self.replay_script();
        Ok(SessionInfo { session_id })
    }

    async fn stop_avatar(&self) -> Result<()> {
        self.record(SdkCall::StopAvatar);
        Ok(())
    }

    async fn start_voice_chat(&self, config: VoiceChatConfig) -> Result<()> {
        self.record(SdkCall::StartVoiceChat(config));
        Ok(())
    }

    fn close_voice_chat(&self) {
        self.record(SdkCall::CloseVoiceChat);
    }

    fn mute_input_audio(&self) {
        self.record(SdkCall::MuteInputAudio);
    }

    fn unmute_input_audio(&self) {
        self.record(SdkCall::UnmuteInputAudio);
    }

    async fn speak(&self, request: SpeakRequest) -> Result<SpeakResponse> {
        let echo = request.task_type == TaskType::Repeat;
        let text = request.text.clone();
        self.record(SdkCall::Speak(request));
        if echo {
            self.registry
                .emit(&AvatarEvent::new(StreamingEvent::AvatarStartTalking));
            self.registry.emit(&AvatarEvent::avatar_message(text));
            self.registry
                .emit(&AvatarEvent::new(StreamingEvent::AvatarEndMessage));
            self.registry
                .emit(&AvatarEvent::new(StreamingEvent::AvatarStopTalking));
        }
        Ok(SpeakResponse {
            task_id: generate_id(),
            duration_ms: None,
        })
    }

    async fn start_listening(&self) -> Result<()> {
        self.record(SdkCall::StartListening);
        Ok(())
    }

    async fn stop_listening(&self) -> Result<()> {
        self.record(SdkCall::StopListening);
        Ok(())
    }

    async fn interrupt(&self) -> Result<()> {
        self.record(SdkCall::Interrupt);
        Ok(())
    }
}

/// Hands out a fresh [`ScriptedAvatar`] per `create`, each loaded with the same script.
pub struct ScriptedAvatarFactory {
    script: Vec<AvatarEvent>,
    created: Mutex<Vec<Arc<ScriptedAvatar>>>,
}

impl ScriptedAvatarFactory {
    pub fn new(script: Vec<AvatarEvent>) -> Self {
        Self {
            script,
            created: Mutex::new(Vec::new()),
        }
    }

    /// The most recently created client, if any.
    pub fn last_created(&self) -> Option<Arc<ScriptedAvatar>> {
        self.created.lock().last().cloned()
    }

    pub fn created_count(&self) -> usize {
        self.created.lock().len()
    }
}

impl AvatarClientFactory for ScriptedAvatarFactory {
    fn create(&self, config: AvatarApiConfig) -> Arc<dyn StreamingAvatarClient> {
        let avatar = Arc::new(ScriptedAvatar::new(config, self.script.clone()));
        self.created.lock().push(avatar.clone());
        avatar
    }
}
