//! Plain-text export of a conversation transcript.
//!
//! Pure rendering only; handing the text to the user as a download is a
//! platform concern.

use chrono::{DateTime, Utc};

use chat_types::message::Message;
use chat_types::session::Session;

/// Render a session as a plain-text transcript, one block per message.
pub fn render_transcript(session: &Session) -> String {
    session.messages.iter().map(render_message).collect()
}

fn render_message(message: &Message) -> String {
    let speaker = if message.is_ai { "Assistant" } else { "You" };
    format!(
        "{} ({}):\n{}\n\n",
        speaker,
        message.timestamp.format("%Y-%m-%d %H:%M"),
        message.content
    )
}

/// File name for a transcript saved at `now`. Colons and dots are kept
/// out of the timestamp so the name survives every download target.
pub fn export_filename(now: DateTime<Utc>) -> String {
    format!("chat-export-{}.txt", now.format("%Y-%m-%dT%H-%M-%SZ"))
}
