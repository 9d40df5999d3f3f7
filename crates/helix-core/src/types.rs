//! Shared types for helix

use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::search_mode::ChatEndpoint;

/// Who wrote a chat turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
    /// Synthetic client-side messages (errors)
    Bot,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Bot => "bot",
        }
    }
}

/// Source attached to an assistant reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub url: String,
    pub title: String,
    pub text: String,
}

/// Sequence content embedded in an assistant reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailSequence {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub should_update_workspace: bool,
}

/// Chat message held by the session
#[derive(Debug, Clone)]
pub struct Message {
    pub id: u64,
    pub sender: Sender,
    pub text: String,
    /// File name of an attached image
    pub image: Option<String>,
    pub citations: Vec<Citation>,
    pub reasoning: Option<String>,
    pub email_sequence: Option<EmailSequence>,
    pub timestamp: DateTime<Local>,
}

impl Message {
    /// Wire form sent back to the backend as history
    pub fn transcript_entry(&self) -> TranscriptEntry {
        TranscriptEntry {
            text: self.text.clone(),
            sender: self.sender,
        }
    }
}

/// `{text, sender}` pair used in chat history and stored sequences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    #[serde(default)]
    pub text: String,
    pub sender: Sender,
}

/// Sequence record as stored by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sequence {
    pub id: String,
    pub user_id: String,
    pub org_id: String,
    pub name: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub messages: Vec<TranscriptEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<NaiveDateTime>,
}

/// Create-or-update body for `POST /api/sequences`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceDraft {
    pub id: String,
    pub user_id: String,
    pub org_id: String,
    pub name: String,
    pub content: String,
    pub messages: Vec<TranscriptEntry>,
}

/// Envelope returned by the chat endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub message: ChatReply,
}

/// Assistant turn as returned by the backend; every field is optional
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatReply {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub sender: Option<String>,
    #[serde(default)]
    pub reasoning: Option<String>,
    #[serde(default)]
    pub citations: Option<Vec<Citation>>,
    #[serde(default)]
    pub email_sequence: Option<EmailSequence>,
}

/// Image attached to an outgoing chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ImageAttachment {
    /// Read an attachment from disk
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        use anyhow::Context;

        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read image {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());

        Ok(Self { file_name, bytes })
    }

    /// Expand a leading `~/` against the home directory
    pub fn resolve_path(raw: &str) -> PathBuf {
        match raw.strip_prefix("~/") {
            Some(rest) => dirs::home_dir()
                .map(|home| home.join(rest))
                .unwrap_or_else(|| PathBuf::from(raw)),
            None => PathBuf::from(raw),
        }
    }
}

/// Outgoing chat call prepared by the session
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// Correlates the completion with this request
    pub ticket: u64,
    pub endpoint: ChatEndpoint,
    /// Active sequence id
    pub workspace: String,
    pub user_id: String,
    pub org_id: String,
    pub messages: Vec<TranscriptEntry>,
    pub image: Option<ImageAttachment>,
}

/// Transient user-facing notice (rendered as a toast)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_decodes_with_missing_fields() {
        let resp: ChatResponse = serde_json::from_str(r#"{"message": {"text": "hi"}}"#).unwrap();
        assert_eq!(resp.message.text, "hi");
        assert!(resp.message.email_sequence.is_none());

        let resp: ChatResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(resp.message.text, "");
    }

    #[test]
    fn reply_decodes_null_sequence_and_flag_default() {
        let resp: ChatResponse = serde_json::from_str(
            r#"{"message": {"text": "ok", "reasoning": "", "email_sequence": null}}"#,
        )
        .unwrap();
        assert!(resp.message.email_sequence.is_none());

        let resp: ChatResponse = serde_json::from_str(
            r#"{"message": {"text": "ok", "email_sequence": {"content": "Hi there"}}}"#,
        )
        .unwrap();
        let seq = resp.message.email_sequence.unwrap();
        assert_eq!(seq.content, "Hi there");
        assert!(!seq.should_update_workspace);
    }

    #[test]
    fn sequence_record_parses_naive_timestamps() {
        let json = r#"{
            "id": "1", "user_id": "user_001", "org_id": "org_001",
            "name": "Sequence 1", "content": "Hello",
            "messages": [{"text": "hi", "sender": "user", "id": 1}],
            "created_at": "2025-01-05T10:20:30.123456",
            "updated_at": "2025-01-06T08:00:00"
        }"#;
        let seq: Sequence = serde_json::from_str(json).unwrap();
        assert_eq!(seq.messages.len(), 1);
        assert_eq!(seq.messages[0].sender, Sender::User);
        assert_eq!(
            seq.created_at.unwrap().format("%Y-%m-%d").to_string(),
            "2025-01-05"
        );
    }

    #[test]
    fn transcript_serializes_lowercase_sender() {
        let entry = TranscriptEntry {
            text: "hello".into(),
            sender: Sender::Assistant,
        };
        assert_eq!(
            serde_json::to_string(&entry).unwrap(),
            r#"{"text":"hello","sender":"assistant"}"#
        );
    }
}
