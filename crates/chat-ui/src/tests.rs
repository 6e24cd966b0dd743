#[cfg(test)]
mod tests {
    use crate::state::*;
    use chat_types::event::ChatEvent;

    // ─── UiState Tests ───────────────────────────────────────

    #[test]
    fn test_ui_state_initial() {
        let state = UiState::new();
        assert!(state.input_text.is_empty());
        assert!(!state.sending);
        assert_eq!(state.status_text, "Ready");
        assert_eq!(state.channel_status, ChannelStatus::Offline);
        assert!(state.error_banner.is_none());
        assert!(state.tool_activity.is_none());
        assert!(state.rename_target.is_none());
    }

    #[test]
    fn test_ui_state_mark_sending() {
        let mut state = UiState::new();
        state.mark_sending();
        assert!(state.sending);
        assert_eq!(state.status_text, "Waiting for reply");
    }

    #[test]
    fn test_ui_state_assistant_reply_clears_sending() {
        let mut state = UiState::new();
        state.mark_sending();
        state.tool_activity = Some("search: started".to_string());

        state.process_events(vec![ChatEvent::AssistantReply {
            session_id: "s1".to_string(),
        }]);

        assert!(!state.sending);
        assert!(state.tool_activity.is_none());
        assert_eq!(state.status_text, "Ready");
    }

    #[test]
    fn test_ui_state_send_failed_sets_banner() {
        let mut state = UiState::new();
        state.mark_sending();

        state.process_events(vec![ChatEvent::SendFailed {
            message: "network down".to_string(),
        }]);

        assert!(!state.sending);
        assert_eq!(state.error_banner.as_deref(), Some("network down"));
    }

    #[test]
    fn test_ui_state_channel_status_transitions() {
        let mut state = UiState::new();

        state.process_events(vec![ChatEvent::ChannelOpen]);
        assert_eq!(state.channel_status, ChannelStatus::Live);
        assert_eq!(state.channel_status.label(), "Live");

        state.process_events(vec![ChatEvent::ChannelClosed]);
        assert_eq!(state.channel_status, ChannelStatus::Reconnecting);

        state.process_events(vec![ChatEvent::ChannelGaveUp]);
        assert_eq!(state.channel_status, ChannelStatus::GaveUp);
        assert_eq!(state.channel_status.label(), "Disconnected");
    }

    #[test]
    fn test_ui_state_tool_activity() {
        let mut state = UiState::new();
        state.process_events(vec![ChatEvent::ToolActivity {
            tool: "search".to_string(),
            detail: "started".to_string(),
        }]);

        assert_eq!(state.status_text, "Running: search");
        assert_eq!(state.tool_activity.as_deref(), Some("search: started"));
    }

    #[test]
    fn test_ui_state_error_event_sets_banner() {
        let mut state = UiState::new();
        state.process_events(vec![ChatEvent::Error {
            message: "backend hiccup".to_string(),
        }]);
        assert_eq!(state.error_banner.as_deref(), Some("backend hiccup"));
    }

    #[test]
    fn test_ui_state_store_changed_is_inert() {
        let mut state = UiState::new();
        state.mark_sending();
        state.process_events(vec![ChatEvent::StoreChanged]);
        assert!(state.sending);
        assert_eq!(state.status_text, "Waiting for reply");
    }
}
