// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Modal dialogs: hotspot capture, character detail, audio guide.

use crate::app::AppMode;
use crate::models::group::ImageGroup;
use crate::models::hotspot::Hotspot;
use crate::services::strokes::StrokePlayer;
use crate::session::EditSession;
use std::time::Instant;

/// Result of the hotspot capture dialog.
pub enum CreationAction {
    None,
    Confirm,
    Cancel,
    GenerateExplanation(String),
}

/// Phase two of hotspot creation: capture the character and an
/// optional explanation for the drawn rectangle.
pub fn creation_dialog(
    ctx: &egui::Context,
    session: &mut EditSession,
    generating: bool,
) -> CreationAction {
    let mut action = CreationAction::None;
    let Some(pending) = session.pending_mut() else {
        return action;
    };

    egui::Window::new("Add character")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .show(ctx, |ui| {
            ui.set_min_width(320.0);

            ui.label("Character (single glyph)");
            ui.add(
                egui::TextEdit::singleline(&mut pending.character)
                    .char_limit(1)
                    .font(egui::TextStyle::Heading)
                    .hint_text("天"),
            );
            let has_character = !pending.character.trim().is_empty();

            ui.add_space(8.0);
            ui.label("Explanation");
            ui.add(
                egui::TextEdit::multiline(&mut pending.explanation)
                    .desired_rows(4)
                    .hint_text("Cultural notes for this character..."),
            );

            ui.horizontal(|ui| {
                if ui
                    .add_enabled(
                        has_character && !generating,
                        egui::Button::new("Generate explanation"),
                    )
                    .clicked()
                {
                    action = CreationAction::GenerateExplanation(pending.character.clone());
                }
                if generating {
                    ui.spinner();
                }
            });

            ui.separator();
            ui.horizontal(|ui| {
                if ui.button("Cancel").clicked() {
                    action = CreationAction::Cancel;
                }
                // Creation stays disabled until a character is given.
                if ui
                    .add_enabled(has_character, egui::Button::new("Create"))
                    .clicked()
                {
                    action = CreationAction::Confirm;
                }
            });
        });

    action
}

/// Result of the character detail dialog.
pub enum DetailAction {
    None,
    Close,
}

/// Visitor-facing detail view: animated stroke order plus the
/// explanation text.
pub fn detail_dialog(
    ctx: &egui::Context,
    hotspot: &Hotspot,
    player: &mut StrokePlayer,
    now: Instant,
) -> DetailAction {
    let mut action = DetailAction::None;

    egui::Window::new("Character detail")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .show(ctx, |ui| {
            ui.horizontal_top(|ui| {
                ui.vertical(|ui| {
                    player.paint(ui, now);

                    ui.add_space(6.0);
                    ui.horizontal(|ui| {
                        let ready = player.is_ready();
                        if ui.add_enabled(ready, egui::Button::new("Replay")).clicked() {
                            player.replay(now);
                        }
                        if ui.add_enabled(ready, egui::Button::new("Trace")).clicked() {
                            player.start_quiz();
                        }
                        if let Some((done, total)) = player.quiz_progress() {
                            ui.label(
                                egui::RichText::new(format!("{done} / {total} strokes"))
                                    .weak(),
                            );
                        }
                    });
                });

                ui.add_space(16.0);
                ui.vertical(|ui| {
                    ui.set_max_width(360.0);
                    ui.heading(
                        egui::RichText::new(&hotspot.character)
                            .size(56.0)
                            .color(egui::Color32::from_rgb(0x2c, 0x18, 0x10)),
                    );
                    ui.separator();
                    egui::ScrollArea::vertical()
                        .max_height(240.0)
                        .show(ui, |ui| {
                            ui.label(
                                egui::RichText::new(&hotspot.explanation).size(15.0),
                            );
                        });
                });
            });

            ui.add_space(10.0);
            ui.vertical_centered(|ui| {
                if ui.button("Close").clicked() {
                    action = DetailAction::Close;
                }
            });
        });

    action
}

/// Result of the audio guide popup.
pub enum AudioAction {
    None,
    Close,
    Toggle,
    Restart,
    SetText(String),
}

/// Narration popup: transcript (editable while curating) and
/// playback controls.
pub fn audio_dialog(
    ctx: &egui::Context,
    group: &ImageGroup,
    mode: AppMode,
    playing: bool,
) -> AudioAction {
    let mut action = AudioAction::None;

    egui::Window::new("Audio guide")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .show(ctx, |ui| {
            ui.set_min_width(360.0);

            if mode == AppMode::Edit {
                let mut text = group.audio_text.clone().unwrap_or_default();
                if ui
                    .add(
                        egui::TextEdit::multiline(&mut text)
                            .desired_rows(6)
                            .hint_text("Narration transcript..."),
                    )
                    .changed()
                {
                    action = AudioAction::SetText(text);
                }
            } else {
                egui::ScrollArea::vertical()
                    .max_height(180.0)
                    .show(ui, |ui| {
                        ui.label(
                            group
                                .audio_text
                                .as_deref()
                                .unwrap_or("No transcript available."),
                        );
                    });
            }

            ui.separator();
            ui.horizontal(|ui| {
                let toggle_label = if playing { "⏸ Pause" } else { "▶ Play" };
                if ui.button(toggle_label).clicked() {
                    action = AudioAction::Toggle;
                }
                if ui.button("↺ Restart").clicked() {
                    action = AudioAction::Restart;
                }
                if ui.button("Close").clicked() {
                    action = AudioAction::Close;
                }
            });
        });

    action
}
