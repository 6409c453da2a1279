// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Group list sidebar.
//!
//! Shows the document title, one entry per image group (with variant
//! count), the view/edit mode toggle, and the presentation-mode
//! entry. In presentation mode the sidebar collapses to a thin strip
//! so the stage dominates the screen.

use crate::app::AppMode;
use crate::models::group::AppData;

/// Result of sidebar interaction.
pub enum SidebarAction {
    None,
    JumpToGroup(String),
    DeleteGroup(String),
    ImportGroup,
    SetMode(AppMode),
    EnterPresentation,
    SetTitle(String),
}

/// Display the sidebar. `thumbnail` resolves an image reference to a
/// loaded texture, when one is ready.
pub fn show(
    ui: &mut egui::Ui,
    data: &AppData,
    active_group: Option<&str>,
    mode: AppMode,
    presentation: bool,
    saving: bool,
    thumbnail: &dyn Fn(&str) -> Option<egui::TextureHandle>,
) -> SidebarAction {
    let mut action = SidebarAction::None;

    // Title area.
    if !presentation {
        ui.add_space(8.0);
        if mode == AppMode::Edit {
            let mut title = data.app_title.clone();
            if ui
                .add(egui::TextEdit::singleline(&mut title).hint_text("Exhibit title"))
                .changed()
            {
                action = SidebarAction::SetTitle(title);
            }
        } else {
            ui.heading(&data.app_title);
        }
        ui.separator();
    }

    // Group list.
    egui::ScrollArea::vertical()
        .auto_shrink([false, true])
        .show(ui, |ui| {
            for group in &data.images {
                let selected = active_group == Some(group.id.as_str());
                let entry = group_entry(ui, group, selected, presentation, thumbnail);
                if entry.clicked() {
                    action = SidebarAction::JumpToGroup(group.id.clone());
                }

                if mode == AppMode::Edit && !presentation && data.images.len() > 1 {
                    ui.horizontal(|ui| {
                        if ui.small_button("Delete group").clicked() {
                            action = SidebarAction::DeleteGroup(group.id.clone());
                        }
                    });
                }
                ui.add_space(6.0);
            }
        });

    if presentation {
        return action;
    }

    ui.separator();

    if ui.button("➕ Import new group...").clicked() {
        action = SidebarAction::ImportGroup;
    }

    ui.horizontal(|ui| {
        if ui
            .selectable_label(mode == AppMode::View, "▶ Browse")
            .clicked()
        {
            action = SidebarAction::SetMode(AppMode::View);
        }
        if ui
            .selectable_label(mode == AppMode::Edit, "✏ Edit")
            .clicked()
        {
            action = SidebarAction::SetMode(AppMode::Edit);
        }
    });

    if ui.button("Enter presentation mode").clicked() {
        action = SidebarAction::EnterPresentation;
    }

    if saving {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label(egui::RichText::new("Saving...").weak());
        });
    }

    action
}

fn group_entry(
    ui: &mut egui::Ui,
    group: &crate::models::group::ImageGroup,
    selected: bool,
    presentation: bool,
    thumbnail: &dyn Fn(&str) -> Option<egui::TextureHandle>,
) -> egui::Response {
    let height = if presentation { 36.0 } else { 72.0 };
    let (rect, response) = ui.allocate_exact_size(
        egui::vec2(ui.available_width(), height),
        egui::Sense::click(),
    );

    let stroke = if selected {
        egui::Stroke::new(2.0, egui::Color32::from_rgb(0x8b, 0x23, 0x23))
    } else {
        egui::Stroke::new(1.0, egui::Color32::from_gray(180))
    };
    ui.painter()
        .rect_stroke(rect, egui::Rounding::same(6.0), stroke);

    let texture = group.variants.first().and_then(|r| thumbnail(r));
    if let Some(texture) = texture {
        ui.painter().image(
            texture.id(),
            rect.shrink(2.0),
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );
    }

    if !presentation {
        // Name strip along the bottom edge, over the thumbnail.
        let strip = egui::Rect::from_min_max(
            egui::pos2(rect.min.x, rect.max.y - 18.0),
            rect.max,
        );
        ui.painter().rect_filled(
            strip,
            egui::Rounding::ZERO,
            egui::Color32::from_rgba_unmultiplied(0x2c, 0x18, 0x10, 200),
        );
        ui.painter().text(
            strip.left_center() + egui::vec2(6.0, 0.0),
            egui::Align2::LEFT_CENTER,
            &group.name,
            egui::FontId::proportional(12.0),
            egui::Color32::from_gray(240),
        );
        if group.variants.len() > 1 {
            ui.painter().text(
                strip.right_center() - egui::vec2(6.0, 0.0),
                egui::Align2::RIGHT_CENTER,
                format!("{}", group.variants.len()),
                egui::FontId::proportional(11.0),
                egui::Color32::from_rgb(245, 186, 60),
            );
        }
    }

    response
}
