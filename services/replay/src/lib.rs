//! Avatar Replay Library Crate
//!
//! Replays a recorded sequence of streaming-avatar events through the avatar
//! kit and reports the resulting transcript. The `avatar-replay` binary is a
//! thin wrapper around this library.

pub mod runner;
pub mod script;

pub use runner::{ReplayReport, run_replay};
pub use script::{format_transcript, load_script, parse_script};
