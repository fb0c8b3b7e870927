//! Avatar Kit
//!
//! Client-side session state for a real-time streaming avatar. The crate keeps
//! an observable [`AvatarStore`] in step with a [`StreamingAvatarClient`]'s
//! events and folds streamed speech fragments into chat turns.
//!
//! - `store`: the observable session state and its subscribe/notify mechanism.
//! - `aggregator`: merges talking-message fragments into per-speaker turns.
//! - `session`: starts and stops sessions and wires client events into the store.
//! - `voice_chat`, `text_chat`, `conversation`: thin controls over the client.
//! - `views`: read-only projections for presentation code.
//! - `state`: the `AvatarKit` composition root.
//!
//! [`StreamingAvatarClient`]: streaming_avatar::StreamingAvatarClient

pub mod aggregator;
pub mod config;
pub mod conversation;
pub mod error;
pub mod session;
pub mod state;
pub mod store;
pub mod text_chat;
pub mod views;
pub mod voice_chat;

pub use aggregator::{FragmentOutcome, TurnAggregator};
pub use config::{AvatarConfig, ConfigError};
pub use conversation::{ConversationControls, ConversationState};
pub use error::SessionError;
pub use session::{InitEventCallbacks, SessionController};
pub use state::AvatarKit;
pub use store::{
    AvatarStore, Listener, Message, MessageSender, SessionState, SessionStatus, StateChange,
    StoreConfig, Subscription,
};
pub use text_chat::TextChat;
pub use voice_chat::VoiceChat;
