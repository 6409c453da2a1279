// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main display stage.
//!
//! Renders the active slide's image with its hotspot layer and turns
//! pointer input into geometry-engine transitions, swipe navigation,
//! and document actions for the app to apply.

use crate::app::AppMode;
use crate::interaction::engine::{Corner, HotspotEngine, HotspotUpdate};
use crate::interaction::swipe::{SwipeOutcome, SwipeTracker};
use crate::models::group::ImageGroup;
use crate::models::hotspot::Hotspot;
use crate::models::slides::Slide;
use crate::util::geometry::{to_percent, to_screen, Bounds, PercentPoint, PercentRect};
use std::time::Instant;

const ACCENT: egui::Color32 = egui::Color32::from_rgb(0x8b, 0x23, 0x23);
const INK: egui::Color32 = egui::Color32::from_rgb(0x2c, 0x18, 0x10);
const GLOW: egui::Color32 = egui::Color32::from_rgb(245, 186, 60);

const HANDLE_RADIUS: f32 = 5.0;
const HANDLE_HIT_RADIUS: f32 = 10.0;
const DELETE_RADIUS: f32 = 9.0;

/// Result of stage interaction.
pub enum StageAction {
    None,
    /// A drawn rectangle passed the size gate and awaits capture.
    ProposeHotspot(PercentRect),
    MoveHotspot { id: String, x: f64, y: f64 },
    ReshapeHotspot { id: String, rect: PercentRect },
    DeleteHotspot(String),
    SelectHotspot(String),
    Navigate(SwipeOutcome),
    RenameGroup(String),
}

/// Display the stage and handle pointer interactions.
#[allow(clippy::too_many_arguments)]
pub fn show(
    ui: &mut egui::Ui,
    group: &ImageGroup,
    slide: &Slide,
    texture: Option<&egui::TextureHandle>,
    mode: AppMode,
    presentation: bool,
    engine: &mut HotspotEngine,
    swipe: &mut SwipeTracker,
    now: Instant,
) -> StageAction {
    let mut action = StageAction::None;
    let available_size = ui.available_size();

    egui::Frame::canvas(ui.style()).show(ui, |ui| {
        ui.set_min_size(available_size);
        let stage_rect = ui.max_rect();
        let editing = mode == AppMode::Edit && !presentation;

        let image_rect = texture.map(|tex| fit_rect(stage_rect, tex.size_vec2()));

        // Swipe gestures run on raw pointer input so they work across
        // the whole stage; while an engine interaction is active the
        // gesture layer stays out of the way.
        if engine.is_idle() {
            let (pressed, down, released, pos) = ui.input(|i| {
                (
                    i.pointer.primary_pressed(),
                    i.pointer.primary_down(),
                    i.pointer.primary_released(),
                    i.pointer.latest_pos(),
                )
            });
            if pressed {
                if let Some(pos) = pos {
                    let over_editable_layer =
                        editing && image_rect.is_some_and(|r| r.contains(pos));
                    if stage_rect.contains(pos) && !over_editable_layer {
                        swipe.pointer_down(pos.x);
                    }
                }
            }
            if down {
                if let Some(pos) = pos {
                    swipe.pointer_moved(pos.x);
                }
            }
            if released {
                let outcome = swipe.pointer_up(now);
                if outcome != SwipeOutcome::None {
                    action = StageAction::Navigate(outcome);
                }
            }
        }

        let (texture, image_rect) = match (texture, image_rect) {
            (Some(texture), Some(image_rect)) => (texture, image_rect),
            _ => {
                ui.centered_and_justified(|ui| {
                    ui.label(
                        egui::RichText::new("Loading image...")
                            .size(16.0)
                            .color(egui::Color32::from_gray(140)),
                    );
                });
                return;
            }
        };
        let bounds = Bounds::new(
            image_rect.min.x,
            image_rect.min.y,
            image_rect.width(),
            image_rect.height(),
        );

        let response = ui.allocate_rect(image_rect, egui::Sense::click_and_drag());

        if editing {
            if response.drag_started() {
                if let Some(pos) = response.interact_pointer_pos() {
                    let at = to_percent(pos.x, pos.y, &bounds);
                    if let Some((hotspot, corner)) = hit_handle(&group.hotspots, &bounds, pos) {
                        engine.begin_resize(hotspot, corner, at);
                    } else if let Some(hotspot) = hit_hotspot(&group.hotspots, at) {
                        engine.begin_move(hotspot, at);
                    } else {
                        engine.begin_draw(at);
                    }
                }
            }
            if response.dragged() {
                if let Some(pos) = response.interact_pointer_pos() {
                    let at = to_percent(pos.x, pos.y, &bounds);
                    if let Some((id, update)) = engine.pointer_moved(at) {
                        action = match update {
                            HotspotUpdate::Origin { x, y } => {
                                StageAction::MoveHotspot { id, x, y }
                            }
                            HotspotUpdate::Bounds(rect) => {
                                StageAction::ReshapeHotspot { id, rect }
                            }
                        };
                    }
                }
            }
            if response.drag_stopped() {
                if let Some(proposed) = engine.pointer_released() {
                    action = StageAction::ProposeHotspot(proposed);
                }
            }
        }

        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                if editing {
                    if let Some(id) = hit_delete_button(&group.hotspots, &bounds, pos) {
                        action = StageAction::DeleteHotspot(id);
                    }
                } else if !swipe.suppresses_tap(now) {
                    let at = to_percent(pos.x, pos.y, &bounds);
                    if let Some(hotspot) = hit_hotspot(&group.hotspots, at) {
                        action = StageAction::SelectHotspot(hotspot.id.clone());
                    }
                }
            }
        }

        let painter = ui.painter().clone();
        painter.image(
            texture.id(),
            image_rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );

        for hotspot in &group.hotspots {
            let rect = screen_rect(hotspot.rect(), &bounds);
            if editing {
                painter.rect_filled(
                    rect,
                    egui::Rounding::same(6.0),
                    egui::Color32::from_rgba_unmultiplied(0x8b, 0x23, 0x23, 40),
                );
                painter.rect_stroke(
                    rect,
                    egui::Rounding::same(6.0),
                    egui::Stroke::new(3.0, ACCENT),
                );
                painter.text(
                    rect.min + egui::vec2(6.0, 4.0),
                    egui::Align2::LEFT_TOP,
                    &hotspot.character,
                    egui::FontId::proportional(14.0),
                    ACCENT,
                );

                for corner in Corner::ALL {
                    let pos = corner_screen_pos(hotspot.rect(), corner, &bounds);
                    painter.circle_filled(pos, HANDLE_RADIUS, egui::Color32::WHITE);
                    painter.circle_stroke(pos, HANDLE_RADIUS, egui::Stroke::new(2.0, ACCENT));
                }

                let delete = delete_button_pos(hotspot.rect(), &bounds);
                painter.circle_filled(delete, DELETE_RADIUS, ACCENT);
                painter.text(
                    delete,
                    egui::Align2::CENTER_CENTER,
                    "×",
                    egui::FontId::proportional(14.0),
                    egui::Color32::WHITE,
                );
            } else {
                painter.rect_filled(
                    rect,
                    egui::Rounding::same(6.0),
                    egui::Color32::from_rgba_unmultiplied(251, 191, 36, 14),
                );
                painter.rect_stroke(rect, egui::Rounding::same(6.0), egui::Stroke::new(3.0, GLOW));
            }
        }

        // Transient rectangle while drawing.
        if let Some(preview) = engine.preview() {
            let rect = screen_rect(preview, &bounds);
            painter.rect_filled(
                rect,
                egui::Rounding::ZERO,
                egui::Color32::from_rgba_unmultiplied(0x8b, 0x23, 0x23, 40),
            );
            painter.rect_stroke(rect, egui::Rounding::ZERO, egui::Stroke::new(2.0, ACCENT));
        }

        // Title overlay; editable while curating.
        if editing {
            let title_rect = egui::Rect::from_min_size(
                stage_rect.min + egui::vec2(16.0, 12.0),
                egui::vec2(320.0, 28.0),
            );
            let mut name = group.name.clone();
            let title_response = ui.put(
                title_rect,
                egui::TextEdit::singleline(&mut name).hint_text("Title this image"),
            );
            if title_response.changed() {
                action = StageAction::RenameGroup(name);
            }
        } else {
            painter.text(
                stage_rect.min + egui::vec2(16.0, 12.0),
                egui::Align2::LEFT_TOP,
                &group.name,
                egui::FontId::proportional(24.0),
                INK,
            );
        }

        // Variant position badge for multi-variant groups.
        if slide.total_variants > 1 {
            painter.text(
                egui::pos2(stage_rect.center().x, stage_rect.max.y - 10.0),
                egui::Align2::CENTER_BOTTOM,
                format!("{} / {}", slide.variant_index + 1, slide.total_variants),
                egui::FontId::proportional(13.0),
                egui::Color32::from_gray(120),
            );
        }
    });

    action
}

/// Fit the image into the stage, preserving aspect ratio and
/// centering the result.
fn fit_rect(stage: egui::Rect, image_size: egui::Vec2) -> egui::Rect {
    let available = stage.size() - egui::vec2(32.0, 32.0);
    let img_aspect = image_size.x / image_size.y;
    let available_aspect = available.x / available.y;

    let (display_width, display_height) = if img_aspect > available_aspect {
        let width = available.x;
        (width, width / img_aspect)
    } else {
        let height = available.y;
        (height * img_aspect, height)
    };

    let offset = egui::vec2(
        (stage.width() - display_width) / 2.0,
        (stage.height() - display_height) / 2.0,
    );
    egui::Rect::from_min_size(
        stage.min + offset,
        egui::vec2(display_width, display_height),
    )
}

fn screen_rect(rect: PercentRect, bounds: &Bounds) -> egui::Rect {
    let (min_x, min_y) = to_screen(PercentPoint::new(rect.x, rect.y), bounds);
    let (max_x, max_y) = to_screen(
        PercentPoint::new(rect.x + rect.width, rect.y + rect.height),
        bounds,
    );
    egui::Rect::from_min_max(egui::pos2(min_x, min_y), egui::pos2(max_x, max_y))
}

fn corner_screen_pos(rect: PercentRect, corner: Corner, bounds: &Bounds) -> egui::Pos2 {
    let (px, py) = match corner {
        Corner::Nw => (rect.x, rect.y),
        Corner::Ne => (rect.x + rect.width, rect.y),
        Corner::Sw => (rect.x, rect.y + rect.height),
        Corner::Se => (rect.x + rect.width, rect.y + rect.height),
    };
    let (x, y) = to_screen(PercentPoint::new(px, py), bounds);
    egui::pos2(x, y)
}

fn delete_button_pos(rect: PercentRect, bounds: &Bounds) -> egui::Pos2 {
    let ne = corner_screen_pos(rect, Corner::Ne, bounds);
    ne + egui::vec2(10.0, -10.0)
}

/// Topmost hotspot under the pointer, in percent space.
fn hit_hotspot<'a>(hotspots: &'a [Hotspot], at: PercentPoint) -> Option<&'a Hotspot> {
    hotspots.iter().rev().find(|h| h.rect().contains(at))
}

fn hit_handle<'a>(
    hotspots: &'a [Hotspot],
    bounds: &Bounds,
    pos: egui::Pos2,
) -> Option<(&'a Hotspot, Corner)> {
    for hotspot in hotspots.iter().rev() {
        for corner in Corner::ALL {
            let handle = corner_screen_pos(hotspot.rect(), corner, bounds);
            if handle.distance(pos) <= HANDLE_HIT_RADIUS {
                return Some((hotspot, corner));
            }
        }
    }
    None
}

fn hit_delete_button(hotspots: &[Hotspot], bounds: &Bounds, pos: egui::Pos2) -> Option<String> {
    hotspots
        .iter()
        .rev()
        .find(|h| delete_button_pos(h.rect(), bounds).distance(pos) <= DELETE_RADIUS + 2.0)
        .map(|h| h.id.clone())
}
