use chrono::{DateTime, Utc};

/// A single message in a conversation.
///
/// Messages are immutable once created; their order within a session is the
/// conversation order.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub is_ai: bool,
    /// References to attached files (paths or object URLs)
    pub attachments: Vec<String>,
    /// References to attached images
    pub images: Vec<String>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(content, false)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(content, true)
    }

    fn new(content: impl Into<String>, is_ai: bool) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            content: content.into(),
            timestamp: Utc::now(),
            is_ai,
            attachments: Vec::new(),
            images: Vec::new(),
        }
    }

    pub fn with_attachments(mut self, attachments: Vec<String>, images: Vec<String>) -> Self {
        self.attachments = attachments;
        self.images = images;
        self
    }
}
