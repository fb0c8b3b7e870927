//! Streaming Avatar SDK boundary
//!
//! Types and traits describing the real-time avatar streaming service as seen
//! from the application: the events a client emits, the requests it accepts,
//! the [`StreamingAvatarClient`] trait itself, and [`ScriptedAvatar`], an
//! in-process client that replays recorded events.

pub mod client;
pub mod events;
pub mod scripted;
pub mod types;

pub use client::{AvatarClientFactory, StreamingAvatarClient};
#[cfg(any(test, feature = "mock"))]
pub use client::MockStreamingAvatarClient;
pub use events::{EventHandler, EventRegistry};
pub use scripted::{ScriptedAvatar, ScriptedAvatarFactory, SdkCall};
pub use types::*;
