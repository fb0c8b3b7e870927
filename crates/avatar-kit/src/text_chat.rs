use crate::error::Result;
use crate::store::AvatarStore;
use std::sync::Arc;
use streaming_avatar::{SpeakRequest, SpeakResponse, TaskMode, TaskType};
use tracing::debug;

/// Sends typed text to the avatar.
///
/// `Talk` tasks make the avatar answer the text, `Repeat` tasks make it read
/// the text out verbatim. The `_sync` variants resolve only once the avatar
/// finished speaking. All methods return `Ok(None)` when no client exists.
#[derive(Clone)]
pub struct TextChat {
    store: Arc<AvatarStore>,
}

impl TextChat {
    pub fn new(store: Arc<AvatarStore>) -> Self {
        Self { store }
    }

    pub async fn send_message(&self, message: &str) -> Result<Option<SpeakResponse>> {
        self.speak(message, TaskType::Talk, TaskMode::Async).await
    }

    pub async fn send_message_sync(&self, message: &str) -> Result<Option<SpeakResponse>> {
        self.speak(message, TaskType::Talk, TaskMode::Sync).await
    }

    pub async fn repeat_message(&self, message: &str) -> Result<Option<SpeakResponse>> {
        self.speak(message, TaskType::Repeat, TaskMode::Async).await
    }

    pub async fn repeat_message_sync(&self, message: &str) -> Result<Option<SpeakResponse>> {
        self.speak(message, TaskType::Repeat, TaskMode::Sync).await
    }

    async fn speak(
        &self,
        text: &str,
        task_type: TaskType,
        task_mode: TaskMode,
    ) -> Result<Option<SpeakResponse>> {
        let Some(avatar) = self.store.avatar() else {
            return Ok(None);
        };
        debug!(?task_type, ?task_mode, chars = text.len(), "Sending speak task");
        let response = avatar
            .speak(SpeakRequest {
                text: text.to_string(),
                task_type,
                task_mode,
            })
            .await?;
        Ok(Some(response))
    }
}
