//! Composition root
//!
//! `AvatarKit` bundles one [`AvatarStore`] with every controller that operates
//! on it. Create it once and hand clones to whatever needs them; all clones
//! share the same store.

use crate::conversation::ConversationControls;
use crate::session::SessionController;
use crate::store::{AvatarStore, StoreConfig};
use crate::text_chat::TextChat;
use crate::voice_chat::VoiceChat;
use std::sync::Arc;
use streaming_avatar::AvatarClientFactory;

#[derive(Clone)]
pub struct AvatarKit {
    pub store: Arc<AvatarStore>,
    pub session: SessionController,
    pub voice_chat: VoiceChat,
    pub text_chat: TextChat,
    pub conversation: ConversationControls,
}

impl AvatarKit {
    pub fn new(factory: Arc<dyn AvatarClientFactory>) -> Self {
        Self::with_store(Arc::new(AvatarStore::new()), factory)
    }

    pub fn with_store(store: Arc<AvatarStore>, factory: Arc<dyn AvatarClientFactory>) -> Self {
        Self {
            session: SessionController::new(store.clone(), factory),
            voice_chat: VoiceChat::new(store.clone()),
            text_chat: TextChat::new(store.clone()),
            conversation: ConversationControls::new(store.clone()),
            store,
        }
    }

    pub fn configure(&self, config: StoreConfig) {
        self.store.configure(config);
    }

    pub fn reset(&self) {
        self.store.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MessageSender, SessionStatus};
    use streaming_avatar::{AvatarEvent, ScriptedAvatarFactory, StartAvatarRequest};

    #[tokio::test]
    async fn test_controllers_share_one_store() {
        let factory = Arc::new(ScriptedAvatarFactory::new(vec![]));
        let kit = AvatarKit::new(factory.clone());

        kit.session
            .start(StartAvatarRequest::new("Anna"), Some("token"))
            .await
            .unwrap();
        kit.voice_chat.start_voice_chat(Some(true)).await.unwrap();
        kit.conversation.start_listening().await.unwrap();
        kit.text_chat.repeat_message("Welcome!").await.unwrap();

        let state = kit.store.get_state();
        assert_eq!(state.session_state, SessionStatus::Connected);
        assert!(state.is_voice_chat_active);
        assert!(state.is_muted);
        assert!(state.is_listening);
        assert_eq!(state.messages.len(), 1);
        assert_eq!(state.messages[0].sender, MessageSender::Avatar);
        assert_eq!(state.messages[0].content, "Welcome!");

        // The repeated utterance has ended, so a new avatar fragment opens a new turn.
        factory
            .last_created()
            .unwrap()
            .emit(AvatarEvent::avatar_message("Ask me anything."));
        assert_eq!(kit.store.get_state().messages.len(), 2);
        assert!(!kit.conversation.state().is_avatar_talking);
    }

    #[tokio::test]
    async fn test_reset_drops_client() {
        let kit = AvatarKit::new(Arc::new(ScriptedAvatarFactory::new(vec![])));
        kit.configure(StoreConfig {
            base_path: Some("https://avatar.example.test".into()),
        });
        kit.session.init("token", Default::default());

        kit.reset();

        assert!(kit.session.avatar().is_none());
        assert!(kit.store.get_state().base_path.is_none());
    }
}
