//! Chat panel: conversation transcript, retry affordance, input row.

use egui::{self, Align, Layout, RichText, ScrollArea, Vec2};

use chat_types::message::Message;
use chat_types::session::Session;

use crate::state::{ChatAction, UiState};
use crate::theme::*;

/// Render the chat panel. Returns the action the user took, if any.
pub fn chat_panel(
    ui: &mut egui::Ui,
    state: &mut UiState,
    session: Option<&Session>,
) -> Option<ChatAction> {
    let mut action = None;

    egui::Frame::default()
        .fill(BG_PRIMARY)
        .inner_margin(PANEL_PADDING)
        .show(ui, |ui| {
            ui.vertical(|ui| {
                ui.horizontal(|ui| {
                    let title = session.map(|s| s.title.as_str()).unwrap_or("New Chat");
                    ui.heading(RichText::new(title).color(TEXT_PRIMARY).strong());
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        let status_color = if state.sending { WARNING } else { SUCCESS };
                        ui.label(
                            RichText::new(&state.status_text)
                                .color(status_color)
                                .small(),
                        );
                        ui.label(
                            RichText::new(state.channel_status.label())
                                .color(TEXT_SECONDARY)
                                .small(),
                        );
                        let has_messages =
                            session.map(|s| !s.messages.is_empty()).unwrap_or(false);
                        if has_messages && ui.small_button("Export").clicked() {
                            action = Some(ChatAction::Export);
                        }
                    });
                });

                ui.separator();

                if let Some(message) = state.error_banner.clone() {
                    ui.horizontal(|ui| {
                        ui.label(RichText::new(&message).color(ERROR).small());
                        if ui.small_button("Dismiss").clicked() {
                            state.error_banner = None;
                        }
                    });
                }

                let available_height = ui.available_height() - 60.0;
                ScrollArea::vertical()
                    .max_height(available_height)
                    .auto_shrink([false, false])
                    .stick_to_bottom(true)
                    .show(ui, |ui| {
                        let messages = session.map(|s| s.messages.as_slice()).unwrap_or(&[]);
                        for message in messages {
                            render_message(ui, message);
                            ui.add_space(4.0);
                        }

                        if let Some(activity) = &state.tool_activity {
                            ui.label(
                                RichText::new(activity).color(TEXT_SECONDARY).small().italics(),
                            );
                        }

                        // Retry sits under the last assistant reply
                        let can_retry = !state.sending
                            && messages.last().map(|m| m.is_ai).unwrap_or(false);
                        if can_retry && ui.small_button("Regenerate").clicked() {
                            action = Some(ChatAction::Retry);
                        }
                    });

                ui.add_space(8.0);

                ui.horizontal(|ui| {
                    let input = egui::TextEdit::singleline(&mut state.input_text)
                        .hint_text("Type a message...")
                        .desired_width(ui.available_width() - 70.0)
                        .font(egui::FontId::proportional(14.0));

                    let response = ui.add(input);

                    let send_enabled =
                        !state.input_text.trim().is_empty() && !state.sending;
                    let send_btn = ui.add_enabled(
                        send_enabled,
                        egui::Button::new(RichText::new("Send").color(TEXT_PRIMARY))
                            .fill(if send_enabled { ACCENT } else { BG_SURFACE })
                            .corner_radius(PANEL_ROUNDING)
                            .min_size(Vec2::new(60.0, 0.0)),
                    );

                    // Submit on Enter or button click
                    if (response.lost_focus()
                        && ui.input(|i| i.key_pressed(egui::Key::Enter))
                        && send_enabled)
                        || send_btn.clicked()
                    {
                        let text = state.input_text.trim().to_string();
                        action = Some(ChatAction::Send(text));
                        state.input_text.clear();
                        response.request_focus();
                    }
                });
            });
        });

    action
}

fn render_message(ui: &mut egui::Ui, message: &Message) {
    let (label, label_color) = if message.is_ai {
        ("Assistant", SUCCESS)
    } else {
        ("You", ACCENT)
    };

    egui::Frame::default()
        .fill(BG_SECONDARY)
        .corner_radius(PANEL_ROUNDING)
        .inner_margin(8.0)
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.label(RichText::new(label).color(label_color).strong().small());
                ui.label(
                    RichText::new(message.timestamp.format("%H:%M").to_string())
                        .color(TEXT_SECONDARY)
                        .small(),
                );
            });
            ui.label(RichText::new(&message.content).color(TEXT_PRIMARY));
            if !message.attachments.is_empty() || !message.images.is_empty() {
                let count = message.attachments.len() + message.images.len();
                ui.label(
                    RichText::new(format!("{} attachment(s)", count))
                        .color(TEXT_SECONDARY)
                        .small(),
                );
            }
        });
}
