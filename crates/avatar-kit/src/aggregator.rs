//! Folds streamed talking-message fragments into chat turns.
//!
//! The client and the avatar both stream their utterances as a series of text
//! fragments. Consecutive fragments from the same speaker are concatenated onto
//! the last message; a fragment from the other speaker, or any fragment after
//! an end-of-turn signal, starts a new message.
//!
//! A single speaker marker is shared by both channels, so the upstream client
//! is expected to deliver fragments serialized: a client fragment arriving in
//! the middle of an avatar turn closes that turn.

use crate::store::{AvatarStore, Message, MessageSender};
use parking_lot::Mutex;
use tracing::{debug, warn};

/// What [`TurnAggregator::push_fragment`] did with a fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentOutcome {
    /// A new message was started.
    Started,
    /// The fragment was appended to the last message.
    Appended,
    /// The speaker matched but there was no message to append to.
    Dropped,
}

#[derive(Default)]
pub struct TurnAggregator {
    current_sender: Mutex<Option<MessageSender>>,
}

impl TurnAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_sender(&self) -> Option<MessageSender> {
        *self.current_sender.lock()
    }

    /// Folds one fragment into the transcript.
    ///
    /// The speaker marker stays locked until the store has been updated, so
    /// fragments pushed from several threads land in marker order.
    pub fn push_fragment(
        &self,
        store: &AvatarStore,
        sender: MessageSender,
        text: &str,
    ) -> FragmentOutcome {
        let mut current = self.current_sender.lock();
        if *current != Some(sender) {
            *current = Some(sender);
            debug!(?sender, "Starting new turn");
            store.add_message(Message::new(sender, text));
            return FragmentOutcome::Started;
        }

        if store.append_to_last_message(text) {
            FragmentOutcome::Appended
        } else {
            warn!(?sender, "No message to append fragment to; dropping it");
            FragmentOutcome::Dropped
        }
    }

    /// Closes the current turn, whichever speaker it belongs to.
    pub fn end_turn(&self) {
        *self.current_sender.lock() = None;
    }

    pub fn reset(&self) {
        self.end_turn();
    }
}
