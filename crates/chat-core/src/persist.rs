//! Versioned codec for the persisted session collection.
//!
//! The stored payload mirrors the browser-era format: camelCase keys,
//! RFC 3339 timestamp strings, a schema version tag, and only the minimal
//! projection (sessions, current selection, bound backend session id).
//! Date fields are revived to `DateTime<Utc>` on every decode, both at
//! load time and after any external rehydration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use chat_types::message::Message;
use chat_types::session::Session;
use chat_types::{ChatError, Result};

use crate::ports::StoragePort;

/// Key under which the whole state lives in the storage substrate.
pub const STORAGE_KEY: &str = "chat-storage";

/// Current schema version. Version-0 payloads are migrated on load.
pub const SCHEMA_VERSION: u32 = 1;

// ─── Stored records ──────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredState {
    version: u32,
    #[serde(default)]
    sessions: Vec<StoredSession>,
    #[serde(default)]
    current_session_id: Option<String>,
    #[serde(default)]
    backend_session_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSession {
    id: String,
    title: String,
    #[serde(default)]
    messages: Vec<StoredMessage>,
    #[serde(default)]
    is_starred: bool,
    created_at: String,
    updated_at: String,
    #[serde(default)]
    backend_session_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredMessage {
    id: String,
    content: String,
    timestamp: String,
    #[serde(rename = "isAI")]
    is_ai: bool,
    #[serde(default)]
    attachments: Vec<String>,
    #[serde(default)]
    images: Vec<String>,
}

/// What a successful decode yields: the revived domain state.
#[derive(Debug, Default)]
pub struct DecodedState {
    pub sessions: Vec<Session>,
    pub current_session_id: Option<String>,
    pub backend_session_id: Option<String>,
}

// ─── Codec ───────────────────────────────────────────────────

pub fn encode(
    sessions: &[Session],
    current_session_id: &Option<String>,
    backend_session_id: &Option<String>,
) -> Result<Vec<u8>> {
    let state = StoredState {
        version: SCHEMA_VERSION,
        sessions: sessions.iter().map(session_to_record).collect(),
        current_session_id: current_session_id.clone(),
        backend_session_id: backend_session_id.clone(),
    };
    Ok(serde_json::to_vec(&state)?)
}

pub fn decode(bytes: &[u8]) -> Result<DecodedState> {
    let now = Utc::now();
    let mut value: Value = serde_json::from_slice(bytes)?;

    let version = value
        .get("version")
        .and_then(Value::as_u64)
        .unwrap_or(0) as u32;
    if version < SCHEMA_VERSION {
        migrate_v0(&mut value, now);
    }

    let stored: StoredState = serde_json::from_value(value)?;

    let sessions = stored
        .sessions
        .into_iter()
        .map(|s| session_from_record(s, now))
        .collect();

    Ok(DecodedState {
        sessions,
        current_session_id: stored.current_session_id,
        backend_session_id: stored.backend_session_id,
    })
}

/// Fetch and decode the persisted state, if any.
pub async fn load(storage: &dyn StoragePort) -> Result<Option<DecodedState>> {
    match storage.get(STORAGE_KEY).await? {
        Some(bytes) => {
            let state = decode(&bytes).map_err(|e| {
                ChatError::Storage(format!("corrupt persisted state: {}", e))
            })?;
            Ok(Some(state))
        }
        None => Ok(None),
    }
}

// ─── Migration ───────────────────────────────────────────────

/// Normalize a version-0 payload in place: absent timestamps default to
/// the load time, absent message arrays to empty, absent ids to null.
fn migrate_v0(value: &mut Value, now: DateTime<Utc>) {
    let now_str = Value::String(now.to_rfc3339());

    if let Some(obj) = value.as_object_mut() {
        obj.insert("version".to_string(), Value::from(SCHEMA_VERSION));
        if !obj.contains_key("sessions") {
            obj.insert("sessions".to_string(), Value::Array(Vec::new()));
        }

        if let Some(sessions) = obj.get_mut("sessions").and_then(Value::as_array_mut) {
            for session in sessions {
                let Some(s) = session.as_object_mut() else { continue };
                s.entry("createdAt").or_insert_with(|| now_str.clone());
                s.entry("updatedAt").or_insert_with(|| now_str.clone());
                s.entry("messages").or_insert_with(|| Value::Array(Vec::new()));
                if let Some(messages) = s.get_mut("messages").and_then(Value::as_array_mut) {
                    for message in messages {
                        if let Some(m) = message.as_object_mut() {
                            m.entry("timestamp").or_insert_with(|| now_str.clone());
                        }
                    }
                }
            }
        }
    }
}

// ─── Record conversions ──────────────────────────────────────

fn session_to_record(session: &Session) -> StoredSession {
    StoredSession {
        id: session.id.clone(),
        title: session.title.clone(),
        messages: session.messages.iter().map(message_to_record).collect(),
        is_starred: session.is_starred,
        created_at: session.created_at.to_rfc3339(),
        updated_at: session.updated_at.to_rfc3339(),
        backend_session_id: session.backend_session_id.clone(),
    }
}

fn message_to_record(message: &Message) -> StoredMessage {
    StoredMessage {
        id: message.id.clone(),
        content: message.content.clone(),
        timestamp: message.timestamp.to_rfc3339(),
        is_ai: message.is_ai,
        attachments: message.attachments.clone(),
        images: message.images.clone(),
    }
}

fn session_from_record(record: StoredSession, now: DateTime<Utc>) -> Session {
    Session {
        id: record.id,
        title: record.title,
        messages: record
            .messages
            .into_iter()
            .map(|m| message_from_record(m, now))
            .collect(),
        is_starred: record.is_starred,
        created_at: revive(&record.created_at, now),
        updated_at: revive(&record.updated_at, now),
        backend_session_id: record.backend_session_id,
    }
}

fn message_from_record(record: StoredMessage, now: DateTime<Utc>) -> Message {
    Message {
        id: record.id,
        content: record.content,
        timestamp: revive(&record.timestamp, now),
        is_ai: record.is_ai,
        attachments: record.attachments,
        images: record.images,
    }
}

fn revive(encoded: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    match DateTime::parse_from_rfc3339(encoded) {
        Ok(dt) => dt.with_timezone(&Utc),
        Err(e) => {
            log::warn!("Unparseable stored timestamp {:?} ({}), using load time", encoded, e);
            now
        }
    }
}
