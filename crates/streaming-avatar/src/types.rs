//! Wire-level types exchanged with the streaming avatar service.
//!
//! Everything here is plain data: the event tags the client emits, the payloads
//! carried in an event's `detail`, and the request bodies accepted by the
//! client's async operations.

use serde::{Deserialize, Serialize};

/// The fixed set of events a [`StreamingAvatarClient`](crate::StreamingAvatarClient) emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamingEvent {
    /// The avatar started speaking.
    AvatarStartTalking,
    /// The avatar stopped speaking.
    AvatarStopTalking,
    /// An incremental piece of the avatar's current utterance.
    AvatarTalkingMessage,
    /// The avatar's current utterance is complete.
    AvatarEndMessage,
    /// An incremental piece of the user's transcribed speech.
    UserTalkingMessage,
    /// The user's current utterance is complete.
    UserEndMessage,
    /// Voice activity detected on the user's input.
    UserStart,
    /// Voice activity on the user's input ended.
    UserStop,
    /// The user has been silent for a while.
    UserSilence,
    /// The media stream is ready; `detail` carries the stream.
    StreamReady,
    /// The media stream was torn down by the remote side.
    StreamDisconnected,
    /// The connection quality estimate changed; `detail` carries the new value.
    ConnectionQualityChanged,
}

impl StreamingEvent {
    /// Every event tag, in declaration order.
    pub const ALL: [StreamingEvent; 12] = [
        StreamingEvent::AvatarStartTalking,
        StreamingEvent::AvatarStopTalking,
        StreamingEvent::AvatarTalkingMessage,
        StreamingEvent::AvatarEndMessage,
        StreamingEvent::UserTalkingMessage,
        StreamingEvent::UserEndMessage,
        StreamingEvent::UserStart,
        StreamingEvent::UserStop,
        StreamingEvent::UserSilence,
        StreamingEvent::StreamReady,
        StreamingEvent::StreamDisconnected,
        StreamingEvent::ConnectionQualityChanged,
    ];
}

/// Connection quality as reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionQuality {
    #[default]
    Unknown,
    Good,
    Bad,
}

/// Opaque handle to the avatar's remote media stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaStream {
    pub id: String,
}

impl MediaStream {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Payload of the talking-message events: one fragment of text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TalkingMessage {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
}

/// The event-specific data carried by an [`AvatarEvent`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum EventDetail {
    #[default]
    None,
    Stream(MediaStream),
    Message(TalkingMessage),
    Quality(ConnectionQuality),
}

/// A single event emitted by the client: the tag plus its `detail`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvatarEvent {
    pub event: StreamingEvent,
    #[serde(default)]
    pub detail: EventDetail,
}

impl AvatarEvent {
    /// An event that carries no detail (start/stop talking, end message, ...).
    pub fn new(event: StreamingEvent) -> Self {
        Self {
            event,
            detail: EventDetail::None,
        }
    }

    pub fn stream_ready(stream: MediaStream) -> Self {
        Self {
            event: StreamingEvent::StreamReady,
            detail: EventDetail::Stream(stream),
        }
    }

    pub fn avatar_message(text: impl Into<String>) -> Self {
        Self::talking(StreamingEvent::AvatarTalkingMessage, text)
    }

    pub fn user_message(text: impl Into<String>) -> Self {
        Self::talking(StreamingEvent::UserTalkingMessage, text)
    }

    pub fn quality_changed(quality: ConnectionQuality) -> Self {
        Self {
            event: StreamingEvent::ConnectionQualityChanged,
            detail: EventDetail::Quality(quality),
        }
    }

    fn talking(event: StreamingEvent, text: impl Into<String>) -> Self {
        Self {
            event,
            detail: EventDetail::Message(TalkingMessage {
                message: text.into(),
                task_id: None,
            }),
        }
    }

    /// The text fragment, if this is a talking-message event.
    pub fn message(&self) -> Option<&str> {
        match &self.detail {
            EventDetail::Message(m) => Some(&m.message),
            _ => None,
        }
    }

    pub fn stream(&self) -> Option<&MediaStream> {
        match &self.detail {
            EventDetail::Stream(s) => Some(s),
            _ => None,
        }
    }

    pub fn quality(&self) -> Option<ConnectionQuality> {
        match self.detail {
            EventDetail::Quality(q) => Some(q),
            _ => None,
        }
    }
}

/// Credentials and endpoint used to construct a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarApiConfig {
    pub token: String,
    pub base_path: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvatarQuality {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceEmotion {
    Excited,
    Serious,
    Friendly,
    Soothing,
    Broadcaster,
}

/// Voice overrides for the avatar.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VoiceSetting {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotion: Option<VoiceEmotion>,
}

/// Parameters for creating and starting an avatar session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StartAvatarRequest {
    pub avatar_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<AvatarQuality>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub knowledge_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub knowledge_base: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<VoiceSetting>,
    /// Seconds of inactivity before the service closes the session.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_idle_timeout: Option<u32>,
}

impl StartAvatarRequest {
    pub fn new(avatar_name: impl Into<String>) -> Self {
        Self {
            avatar_name: avatar_name.into(),
            ..Default::default()
        }
    }
}

/// Returned once the service has created the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub session_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceChatConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_input_audio_muted: Option<bool>,
}

/// Whether the avatar should answer the text (`Talk`) or say it verbatim (`Repeat`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Talk,
    Repeat,
}

/// `Sync` resolves after the avatar finished speaking, `Async` as soon as the task is queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskMode {
    Sync,
    Async,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeakRequest {
    pub text: String,
    pub task_type: TaskType,
    pub task_mode: TaskMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeakResponse {
    pub task_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_streaming_event_serialization() {
        let json = serde_json::to_string(&StreamingEvent::ConnectionQualityChanged).unwrap();
        assert_eq!(json, "\"connection_quality_changed\"");

        let parsed: StreamingEvent = serde_json::from_str("\"user_end_message\"").unwrap();
        assert_eq!(parsed, StreamingEvent::UserEndMessage);
    }

    #[test]
    fn test_connection_quality_defaults_to_unknown() {
        assert_eq!(ConnectionQuality::default(), ConnectionQuality::Unknown);
        assert_eq!(
            serde_json::to_string(&ConnectionQuality::Good).unwrap(),
            "\"GOOD\""
        );
    }

    #[test]
    fn test_avatar_event_from_script_json() {
        let events: Vec<AvatarEvent> = serde_json::from_value(json!([
            { "event": "user_start" },
            { "event": "user_talking_message", "detail": { "kind": "message", "value": { "message": "Hel" } } },
            { "event": "connection_quality_changed", "detail": { "kind": "quality", "value": "BAD" } },
        ]))
        .unwrap();

        assert_eq!(events[0], AvatarEvent::new(StreamingEvent::UserStart));
        assert_eq!(events[1].message(), Some("Hel"));
        assert_eq!(events[2].quality(), Some(ConnectionQuality::Bad));
        assert!(events[0].message().is_none());
    }

    #[test]
    fn test_detail_accessors() {
        let ready = AvatarEvent::stream_ready(MediaStream::new("s1"));
        assert_eq!(ready.stream().map(|s| s.id.as_str()), Some("s1"));
        assert!(ready.quality().is_none());

        let msg = AvatarEvent::avatar_message("Hi");
        assert_eq!(msg.event, StreamingEvent::AvatarTalkingMessage);
        assert_eq!(msg.message(), Some("Hi"));
    }

    #[test]
    fn test_speak_request_serialization() {
        let req = SpeakRequest {
            text: "hello".into(),
            task_type: TaskType::Repeat,
            task_mode: TaskMode::Async,
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            json!({ "text": "hello", "task_type": "repeat", "task_mode": "async" })
        );
    }

    #[test]
    fn test_start_avatar_request_omits_unset_fields() {
        let value = serde_json::to_value(StartAvatarRequest::new("Wayne_20240711")).unwrap();
        assert_eq!(value, json!({ "avatar_name": "Wayne_20240711" }));
    }
}
