//! Loading event scripts and rendering transcripts.

use anyhow::{Context, Result};
use avatar_kit::{Message, MessageSender};
use std::path::Path;
use streaming_avatar::AvatarEvent;

/// Reads a JSON array of [`AvatarEvent`]s from `path`.
pub fn load_script(path: &Path) -> Result<Vec<AvatarEvent>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script {}", path.display()))?;
    parse_script(&raw).with_context(|| format!("Invalid script {}", path.display()))
}

pub fn parse_script(raw: &str) -> Result<Vec<AvatarEvent>> {
    Ok(serde_json::from_str(raw)?)
}

/// One line per turn, e.g. `AVATAR: Hi there`.
pub fn format_transcript(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|m| {
            let speaker = match m.sender {
                MessageSender::Client => "CLIENT",
                MessageSender::Avatar => "AVATAR",
            };
            format!("{speaker}: {}", m.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
