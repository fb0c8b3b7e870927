//! Drives one avatar session from a recorded script.

use anyhow::{Context, Result};
use avatar_kit::{AvatarConfig, AvatarKit, Message, SessionStatus};
use parking_lot::Mutex;
use std::sync::Arc;
use streaming_avatar::{AvatarEvent, ScriptedAvatarFactory, StartAvatarRequest};
use tracing::{debug, info};

/// The outcome of a replayed session.
#[derive(Debug, Clone)]
pub struct ReplayReport {
    pub transcript: Vec<Message>,
    /// Number of store notifications observed while the session ran.
    pub notifications: usize,
}

/// Starts a session against a [`ScriptedAvatarFactory`] loaded with `script`,
/// collects the transcript and stops the session again.
pub async fn run_replay(
    config: &AvatarConfig,
    script: Vec<AvatarEvent>,
    request: StartAvatarRequest,
) -> Result<ReplayReport> {
    let token = config.require_token()?;
    let kit = AvatarKit::new(Arc::new(ScriptedAvatarFactory::new(script)));
    kit.configure(config.store_config());

    // Keep the last non-empty transcript; stop clears the store's messages.
    let transcript: Arc<Mutex<Vec<Message>>> = Arc::new(Mutex::new(Vec::new()));
    let notifications = Arc::new(Mutex::new(0usize));
    let subscription = {
        let store = Arc::downgrade(&kit.store);
        let transcript = transcript.clone();
        let notifications = notifications.clone();
        let last_status = Mutex::new(SessionStatus::Inactive);
        kit.store.subscribe(Arc::new(move || {
            *notifications.lock() += 1;
            let Some(store) = store.upgrade() else { return };
            let (status, messages) = store.read(|s| (s.session_state, s.messages.clone()));
            let mut last = last_status.lock();
            if *last != status {
                let previous = std::mem::replace(&mut *last, status);
                info!(from = ?previous, to = ?status, "Session status changed");
            }
            if !messages.is_empty() {
                *transcript.lock() = messages;
            }
        }))
    };

    kit.session
        .start(request, Some(token))
        .await
        .context("Failed to start scripted session")?;
    debug!(
        quality = ?avatar_kit::views::connection_quality(&kit.store),
        "Script replayed"
    );
    if kit.session.session_state() != SessionStatus::Inactive {
        kit.session
            .stop()
            .await
            .context("Failed to stop scripted session")?;
    }
    subscription.unsubscribe();

    let transcript = std::mem::take(&mut *transcript.lock());
    let notifications = *notifications.lock();
    Ok(ReplayReport {
        transcript,
        notifications,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::{format_transcript, parse_script};
    use avatar_kit::MessageSender;
    use streaming_avatar::StreamingEvent;
    use tracing::Level;

    fn config(token: Option<&str>) -> AvatarConfig {
        AvatarConfig {
            api_token: token.map(str::to_string),
            base_path: None,
            log_level: Level::INFO,
        }
    }

    #[tokio::test]
    async fn test_replay_bundled_greeting_script() {
        let script = parse_script(include_str!("../scripts/greeting.json")).unwrap();

        let report = run_replay(&config(Some("token")), script, StartAvatarRequest::new("Anna"))
            .await
            .unwrap();

        assert_eq!(
            format_transcript(&report.transcript),
            "AVATAR: Hi! How can I help you today?\n\
             CLIENT: What's the weather like?\n\
             AVATAR: Sunny, with a light breeze."
        );
        assert!(report.notifications > 0);
    }

    #[tokio::test]
    async fn test_replay_requires_token() {
        let err = run_replay(&config(None), vec![], StartAvatarRequest::new("Anna"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("AVATAR_API_TOKEN"));
    }

    #[tokio::test]
    async fn test_replay_with_empty_script() {
        let report = run_replay(&config(Some("token")), vec![], StartAvatarRequest::new("Anna"))
            .await
            .unwrap();
        assert!(report.transcript.is_empty());
    }

    #[tokio::test]
    async fn test_user_only_script() {
        let script = vec![
            AvatarEvent::user_message("one"),
            AvatarEvent::new(StreamingEvent::UserEndMessage),
            AvatarEvent::user_message("two"),
        ];
        let report = run_replay(&config(Some("token")), script, StartAvatarRequest::new("Anna"))
            .await
            .unwrap();

        let senders: Vec<MessageSender> = report.transcript.iter().map(|m| m.sender).collect();
        assert_eq!(senders, vec![MessageSender::Client, MessageSender::Client]);
    }
}
