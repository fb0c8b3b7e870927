//! Avatar Kit Core
//!
//! Dependency-light helpers used by the SDK boundary crate, the avatar kit
//! itself and the replay service.

pub mod utils;

pub use utils::{format_timestamp, generate_id, is_valid_api_key};
