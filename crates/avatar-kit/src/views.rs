//! Read-only projections of the store for presentation code.

use crate::conversation::ConversationState;
use crate::store::{AvatarStore, Message};
use streaming_avatar::ConnectionQuality;

pub fn connection_quality(store: &AvatarStore) -> ConnectionQuality {
    store.read(|s| s.connection_quality)
}

pub fn message_history(store: &AvatarStore) -> Vec<Message> {
    store.read(|s| s.messages.clone())
}

pub fn conversation_state(store: &AvatarStore) -> ConversationState {
    store.read(|s| ConversationState {
        is_avatar_listening: s.is_listening,
        is_user_talking: s.is_user_talking,
        is_avatar_talking: s.is_avatar_talking,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MessageSender, StateChange};

    #[test]
    fn test_views_follow_store() {
        let store = AvatarStore::new();
        assert_eq!(connection_quality(&store), ConnectionQuality::Unknown);
        assert!(message_history(&store).is_empty());

        store.set_state(StateChange::ConnectionQuality(ConnectionQuality::Good));
        store.set_state(StateChange::IsAvatarTalking(true));
        store.add_message(Message::new(MessageSender::Avatar, "Hi"));

        assert_eq!(connection_quality(&store), ConnectionQuality::Good);
        assert_eq!(message_history(&store)[0].content, "Hi");
        assert_eq!(
            conversation_state(&store),
            ConversationState {
                is_avatar_listening: false,
                is_user_talking: false,
                is_avatar_talking: true,
            }
        );
    }
}
