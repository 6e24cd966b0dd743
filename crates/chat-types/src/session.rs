use chrono::{DateTime, Utc};

use crate::message::Message;

/// Maximum title length derived from the first message.
pub const TITLE_MAX_CHARS: usize = 30;

/// Title used when a session has no messages yet.
pub const UNTITLED: &str = "New Chat";

/// One conversation thread: the local record plus the id of the remote
/// agent session it is bound to.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub title: String,
    pub messages: Vec<Message>,
    pub is_starred: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Remote session id issued by the agent backend. Once set it is never
    /// cleared for the lifetime of the session.
    pub backend_session_id: Option<String>,
}

impl Session {
    pub fn new(first_message: Message, backend_session_id: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: derive_title(&first_message.content),
            messages: vec![first_message],
            is_starred: false,
            created_at: now,
            updated_at: now,
            backend_session_id,
        }
    }

    /// Refresh `updated_at`. Kept monotonic even if the clock steps back.
    pub fn touch(&mut self) {
        let now = Utc::now();
        if now > self.updated_at {
            self.updated_at = now;
        }
    }
}

/// Derive a session title from its first message: content of up to
/// `TITLE_MAX_CHARS` chars verbatim, longer content truncated with `...`.
pub fn derive_title(content: &str) -> String {
    if content.is_empty() {
        return UNTITLED.to_string();
    }
    let count = content.chars().count();
    if count <= TITLE_MAX_CHARS {
        content.to_string()
    } else {
        let mut title: String = content.chars().take(TITLE_MAX_CHARS).collect();
        title.push_str("...");
        title
    }
}

/// Sidebar projection of a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionListEntry {
    pub id: String,
    pub title: String,
    pub age: AgeBucket,
}

/// Coarse age of a session, bucketed by whole days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeBucket {
    Today,
    Yesterday,
    DaysAgo(i64),
}

impl AgeBucket {
    pub fn from_updated_at(updated_at: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let days = (now - updated_at).num_days().max(0);
        match days {
            0 => AgeBucket::Today,
            1 => AgeBucket::Yesterday,
            n => AgeBucket::DaysAgo(n),
        }
    }
}

impl std::fmt::Display for AgeBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgeBucket::Today => write!(f, "Today"),
            AgeBucket::Yesterday => write!(f, "Yesterday"),
            AgeBucket::DaysAgo(n) => write!(f, "{} days ago", n),
        }
    }
}
