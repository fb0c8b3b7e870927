//! Voice chat controls.
//!
//! Every operation is a no-op when no client has been initialized yet.

use crate::error::Result;
use crate::store::{AvatarStore, StateChange};
use std::sync::Arc;
use streaming_avatar::VoiceChatConfig;
use tracing::info;

#[derive(Clone)]
pub struct VoiceChat {
    store: Arc<AvatarStore>,
}

impl VoiceChat {
    pub fn new(store: Arc<AvatarStore>) -> Self {
        Self { store }
    }

    /// Opens the voice channel. `is_voice_chat_loading` is set for the
    /// duration of the call and cleared again if the client fails.
    pub async fn start_voice_chat(&self, is_input_audio_muted: Option<bool>) -> Result<()> {
        let Some(avatar) = self.store.avatar() else {
            return Ok(());
        };
        self.store.set_state(StateChange::IsVoiceChatLoading(true));

        let config = VoiceChatConfig {
            is_input_audio_muted,
        };
        if let Err(e) = avatar.start_voice_chat(config).await {
            self.store.set_state(StateChange::IsVoiceChatLoading(false));
            return Err(e.into());
        }

        self.store.set_state(StateChange::IsVoiceChatLoading(false));
        self.store.set_state(StateChange::IsVoiceChatActive(true));
        self.store
            .set_state(StateChange::IsMuted(is_input_audio_muted.unwrap_or(false)));
        info!(muted = is_input_audio_muted.unwrap_or(false), "Voice chat started");
        Ok(())
    }

    pub fn stop_voice_chat(&self) {
        let Some(avatar) = self.store.avatar() else {
            return;
        };
        avatar.close_voice_chat();
        self.store.set_state(StateChange::IsVoiceChatActive(false));
        self.store.set_state(StateChange::IsMuted(true));
    }

    pub fn mute_input_audio(&self) {
        let Some(avatar) = self.store.avatar() else {
            return;
        };
        avatar.mute_input_audio();
        self.store.set_state(StateChange::IsMuted(true));
    }

    pub fn unmute_input_audio(&self) {
        let Some(avatar) = self.store.avatar() else {
            return;
        };
        avatar.unmute_input_audio();
        self.store.set_state(StateChange::IsMuted(false));
    }

    pub fn is_muted(&self) -> bool {
        self.store.read(|s| s.is_muted)
    }

    pub fn is_voice_chat_active(&self) -> bool {
        self.store.read(|s| s.is_voice_chat_active)
    }

    pub fn is_voice_chat_loading(&self) -> bool {
        self.store.read(|s| s.is_voice_chat_loading)
    }
}
