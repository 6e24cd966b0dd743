//! Sessions sidebar: New Chat, starred list, recent list bucketed by age.

use egui::{self, RichText, ScrollArea};

use chat_types::session::{AgeBucket, SessionListEntry};

use crate::state::{SidebarAction, UiState};
use crate::theme::*;

/// Render the sidebar. Returns the action the user took, if any.
pub fn sidebar_panel(
    ui: &mut egui::Ui,
    state: &mut UiState,
    starred: &[SessionListEntry],
    recent: &[SessionListEntry],
    current_id: Option<&str>,
) -> Option<SidebarAction> {
    let mut action = None;

    egui::Frame::default()
        .fill(BG_SECONDARY)
        .inner_margin(PANEL_PADDING)
        .show(ui, |ui| {
            ui.set_min_width(SIDEBAR_WIDTH);

            if ui
                .add_sized(
                    [ui.available_width(), 28.0],
                    egui::Button::new(RichText::new("+ New Chat").color(TEXT_PRIMARY))
                        .fill(ACCENT)
                        .corner_radius(PANEL_ROUNDING),
                )
                .clicked()
            {
                action = Some(SidebarAction::NewChat);
            }

            ui.add_space(8.0);

            ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
                if !starred.is_empty() {
                    ui.label(RichText::new("Starred").color(TEXT_SECONDARY).small());
                    for entry in starred {
                        if let Some(a) = session_row(ui, state, entry, current_id, true) {
                            action = Some(a);
                        }
                    }
                    ui.add_space(8.0);
                }

                ui.label(RichText::new("Recent").color(TEXT_SECONDARY).small());
                let mut last_bucket: Option<AgeBucket> = None;
                for entry in recent {
                    if last_bucket != Some(entry.age) {
                        ui.add_space(4.0);
                        ui.label(
                            RichText::new(entry.age.to_string())
                                .color(TEXT_SECONDARY)
                                .small(),
                        );
                        last_bucket = Some(entry.age);
                    }
                    if let Some(a) = session_row(ui, state, entry, current_id, false) {
                        action = Some(a);
                    }
                }
            });
        });

    action
}

fn session_row(
    ui: &mut egui::Ui,
    state: &mut UiState,
    entry: &SessionListEntry,
    current_id: Option<&str>,
    is_starred: bool,
) -> Option<SidebarAction> {
    let mut action = None;

    // Rename mode replaces the row with an edit field
    if let Some((target_id, draft)) = &mut state.rename_target {
        if target_id == &entry.id {
            let response = ui.text_edit_singleline(draft);
            let commit = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if commit {
                let title = draft.trim().to_string();
                if !title.is_empty() {
                    action = Some(SidebarAction::Rename(entry.id.clone(), title));
                }
                state.rename_target = None;
            } else if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
                state.rename_target = None;
            }
            return action;
        }
    }

    ui.horizontal(|ui| {
        let selected = current_id == Some(entry.id.as_str());
        let label = ui.selectable_label(
            selected,
            RichText::new(&entry.title).color(TEXT_PRIMARY),
        );
        if label.clicked() {
            action = Some(SidebarAction::Select(entry.id.clone()));
        }
        if label.double_clicked() {
            state.rename_target = Some((entry.id.clone(), entry.title.clone()));
        }

        let star_icon = if is_starred { "★" } else { "☆" };
        let star_color = if is_starred { STAR } else { TEXT_SECONDARY };
        if ui
            .small_button(RichText::new(star_icon).color(star_color))
            .clicked()
        {
            action = Some(SidebarAction::ToggleStar(entry.id.clone()));
        }

        if ui
            .small_button(RichText::new("✕").color(TEXT_SECONDARY))
            .clicked()
        {
            action = Some(SidebarAction::Delete(entry.id.clone()));
        }
    });

    action
}
