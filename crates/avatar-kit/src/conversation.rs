use crate::error::Result;
use crate::store::{AvatarStore, StateChange};
use std::sync::Arc;

/// Who is talking and whether the avatar is listening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConversationState {
    pub is_avatar_listening: bool,
    pub is_user_talking: bool,
    pub is_avatar_talking: bool,
}

/// Listening and interrupt controls. Each call is a no-op without a client.
#[derive(Clone)]
pub struct ConversationControls {
    store: Arc<AvatarStore>,
}

impl ConversationControls {
    pub fn new(store: Arc<AvatarStore>) -> Self {
        Self { store }
    }

    pub async fn start_listening(&self) -> Result<()> {
        let Some(avatar) = self.store.avatar() else {
            return Ok(());
        };
        avatar.start_listening().await?;
        self.store.set_state(StateChange::IsListening(true));
        Ok(())
    }

    pub async fn stop_listening(&self) -> Result<()> {
        let Some(avatar) = self.store.avatar() else {
            return Ok(());
        };
        avatar.stop_listening().await?;
        self.store.set_state(StateChange::IsListening(false));
        Ok(())
    }

    /// Cuts the avatar off mid-utterance.
    pub async fn interrupt(&self) -> Result<()> {
        let Some(avatar) = self.store.avatar() else {
            return Ok(());
        };
        avatar.interrupt().await?;
        Ok(())
    }

    pub fn state(&self) -> ConversationState {
        crate::views::conversation_state(&self.store)
    }
}
