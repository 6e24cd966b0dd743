//! WASM-target tests for chat-types.
//!
//! Runs the message, session, frame, and config tests under
//! wasm32-unknown-unknown via `wasm-pack test --node`.

use wasm_bindgen_test::*;

use chat_types::config::ClientConfig;
use chat_types::frame::{InboundFrame, OutboundFrame};
use chat_types::message::Message;
use chat_types::session::{derive_title, AgeBucket, Session, UNTITLED};

use chrono::{Duration, Utc};

// ─── Message Tests ───────────────────────────────────────

#[wasm_bindgen_test]
fn message_user() {
    let msg = Message::user("Hello");
    assert!(!msg.is_ai);
    assert_eq!(msg.content, "Hello");
}

#[wasm_bindgen_test]
fn message_assistant() {
    let msg = Message::assistant("I can help");
    assert!(msg.is_ai);
}

#[wasm_bindgen_test]
fn message_ids_are_unique() {
    assert_ne!(Message::user("a").id, Message::user("b").id);
}

// ─── Session / Title Tests ───────────────────────────────

#[wasm_bindgen_test]
fn session_new_derives_title() {
    let session = Session::new(Message::user("Hello there"), None);
    assert_eq!(session.title, "Hello there");
    assert_eq!(session.messages.len(), 1);
}

#[wasm_bindgen_test]
fn derive_title_boundaries() {
    let exact: String = "x".repeat(30);
    assert_eq!(derive_title(&exact), exact);

    let over: String = "y".repeat(31);
    let title = derive_title(&over);
    assert!(title.ends_with("..."));
    assert_eq!(title.chars().count(), 33);

    assert_eq!(derive_title(""), UNTITLED);
}

#[wasm_bindgen_test]
fn age_buckets() {
    let now = Utc::now();
    assert_eq!(AgeBucket::from_updated_at(now, now), AgeBucket::Today);
    assert_eq!(
        AgeBucket::from_updated_at(now - Duration::days(1), now),
        AgeBucket::Yesterday
    );
    assert_eq!(
        AgeBucket::from_updated_at(now - Duration::days(4), now),
        AgeBucket::DaysAgo(4)
    );
}

// ─── Frame Tests ─────────────────────────────────────────

#[wasm_bindgen_test]
fn inbound_frame_agent_response() {
    let frame: InboundFrame =
        serde_json::from_str(r#"{"type":"agent_response","content":"hi"}"#).unwrap();
    assert_eq!(
        frame,
        InboundFrame::AgentResponse {
            content: "hi".to_string()
        }
    );
}

#[wasm_bindgen_test]
fn inbound_frame_unknown_type_is_rejected() {
    assert!(serde_json::from_str::<InboundFrame>(r#"{"type":"heartbeat"}"#).is_err());
}

#[wasm_bindgen_test]
fn outbound_frame_wire_format() {
    let json = serde_json::to_string(&OutboundFrame::Message {
        content: "hello".to_string(),
    })
    .unwrap();
    assert_eq!(json, r#"{"type":"message","content":"hello"}"#);
}

// ─── Config Tests ────────────────────────────────────────

#[wasm_bindgen_test]
fn config_ws_url() {
    let config = ClientConfig::default();
    assert_eq!(config.ws_url("abc"), "ws://localhost:8000/ws/abc");
}
