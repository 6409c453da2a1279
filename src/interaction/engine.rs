// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Hotspot geometry engine.
//!
//! State machine for creating, moving, and resizing hotspot
//! rectangles in percent space. Exactly one interaction can be active
//! at a time; the tagged union below makes concurrent create/move/
//! resize unrepresentable. The engine owns no hotspot data: it emits
//! updates and proposals and the caller applies them to the document.

use crate::models::hotspot::{Hotspot, MIN_SIZE};
use crate::util::geometry::{PercentPoint, PercentRect};

/// Corner handle identity for resize interactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    Nw,
    Ne,
    Sw,
    Se,
}

impl Corner {
    pub const ALL: [Corner; 4] = [Corner::Nw, Corner::Ne, Corner::Sw, Corner::Se];

    fn bears_east(self) -> bool {
        matches!(self, Corner::Ne | Corner::Se)
    }

    fn bears_south(self) -> bool {
        matches!(self, Corner::Sw | Corner::Se)
    }

    fn bears_west(self) -> bool {
        matches!(self, Corner::Nw | Corner::Sw)
    }

    fn bears_north(self) -> bool {
        matches!(self, Corner::Nw | Corner::Ne)
    }
}

/// Geometry change the caller should apply to a hotspot.
#[derive(Debug, Clone, PartialEq)]
pub enum HotspotUpdate {
    /// Translate without changing size.
    Origin { x: f64, y: f64 },
    /// Replace position and size together.
    Bounds(PercentRect),
}

#[derive(Debug, Clone, PartialEq)]
enum Interaction {
    Idle,
    Drawing {
        start: PercentPoint,
        preview: PercentRect,
    },
    Moving {
        id: String,
        offset_x: f64,
        offset_y: f64,
    },
    Resizing {
        id: String,
        corner: Corner,
        start_pointer: PercentPoint,
        start_rect: PercentRect,
    },
}

#[derive(Debug)]
pub struct HotspotEngine {
    interaction: Interaction,
}

impl Default for HotspotEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl HotspotEngine {
    pub fn new() -> Self {
        Self {
            interaction: Interaction::Idle,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.interaction, Interaction::Idle)
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.interaction, Interaction::Drawing { .. })
    }

    /// Transient rectangle being drawn, if a create is in progress.
    pub fn preview(&self) -> Option<PercentRect> {
        match &self.interaction {
            Interaction::Drawing { preview, .. } => Some(*preview),
            _ => None,
        }
    }

    /// Start drawing a new rectangle from a background press.
    /// Refused while a move or resize is active.
    pub fn begin_draw(&mut self, at: PercentPoint) -> bool {
        if !self.is_idle() {
            return false;
        }
        self.interaction = Interaction::Drawing {
            start: at,
            preview: PercentRect::new(at.x, at.y, 0.0, 0.0),
        };
        true
    }

    /// Start dragging an existing hotspot. Records the grab offset so
    /// the rectangle does not jump to the pointer.
    pub fn begin_move(&mut self, hotspot: &Hotspot, at: PercentPoint) -> bool {
        if !self.is_idle() {
            return false;
        }
        self.interaction = Interaction::Moving {
            id: hotspot.id.clone(),
            offset_x: at.x - hotspot.x,
            offset_y: at.y - hotspot.y,
        };
        true
    }

    /// Start resizing from one of the four corner handles.
    pub fn begin_resize(&mut self, hotspot: &Hotspot, corner: Corner, at: PercentPoint) -> bool {
        if !self.is_idle() {
            return false;
        }
        self.interaction = Interaction::Resizing {
            id: hotspot.id.clone(),
            corner,
            start_pointer: at,
            start_rect: hotspot.rect(),
        };
        true
    }

    /// Feed a pointer position. Returns the update to apply, if any;
    /// while drawing, the preview is updated instead.
    pub fn pointer_moved(&mut self, at: PercentPoint) -> Option<(String, HotspotUpdate)> {
        match &mut self.interaction {
            Interaction::Idle => None,
            Interaction::Drawing { start, preview } => {
                *preview = PercentRect::from_corners(*start, at);
                None
            }
            Interaction::Moving {
                id,
                offset_x,
                offset_y,
            } => Some((
                id.clone(),
                HotspotUpdate::Origin {
                    x: at.x - *offset_x,
                    y: at.y - *offset_y,
                },
            )),
            Interaction::Resizing {
                id,
                corner,
                start_pointer,
                start_rect,
            } => {
                let bounds = resize_rect(*start_rect, *corner, at.x - start_pointer.x, at.y - start_pointer.y);
                Some((id.clone(), HotspotUpdate::Bounds(bounds)))
            }
        }
    }

    /// End the active interaction. If a draw finished with both edges
    /// above the minimum size, the rectangle is proposed for creation;
    /// degenerate draws are discarded silently.
    pub fn pointer_released(&mut self) -> Option<PercentRect> {
        let finished = std::mem::replace(&mut self.interaction, Interaction::Idle);
        match finished {
            Interaction::Drawing { preview, .. }
                if preview.width > MIN_SIZE && preview.height > MIN_SIZE =>
            {
                Some(preview)
            }
            _ => None,
        }
    }

    /// Abandon any active interaction without proposing anything.
    pub fn cancel(&mut self) {
        self.interaction = Interaction::Idle;
    }
}

/// Corner-anchored resize: the handle's own corner follows the
/// pointer delta while the diagonally opposite corner stays fixed,
/// and neither edge may shrink below `MIN_SIZE`. West/north handles
/// pin the far edge when the minimum is reached.
fn resize_rect(start: PercentRect, corner: Corner, delta_x: f64, delta_y: f64) -> PercentRect {
    let PercentRect {
        x,
        y,
        width,
        height,
    } = start;
    let mut out = start;

    if corner.bears_east() {
        out.width = (width + delta_x).max(MIN_SIZE);
    }
    if corner.bears_south() {
        out.height = (height + delta_y).max(MIN_SIZE);
    }
    if corner.bears_west() {
        if width - delta_x < MIN_SIZE {
            out.x = x + width - MIN_SIZE;
            out.width = MIN_SIZE;
        } else {
            out.x = x + delta_x;
            out.width = width - delta_x;
        }
    }
    if corner.bears_north() {
        if height - delta_y < MIN_SIZE {
            out.y = y + height - MIN_SIZE;
            out.height = MIN_SIZE;
        } else {
            out.y = y + delta_y;
            out.height = height - delta_y;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hotspot(x: f64, y: f64, w: f64, h: f64) -> Hotspot {
        Hotspot::new(
            "h1".into(),
            PercentRect::new(x, y, w, h),
            "天".into(),
            "".into(),
        )
    }

    fn p(x: f64, y: f64) -> PercentPoint {
        PercentPoint::new(x, y)
    }

    #[test]
    fn test_tiny_draw_is_discarded() {
        let mut engine = HotspotEngine::new();
        assert!(engine.begin_draw(p(10.0, 10.0)));
        engine.pointer_moved(p(12.0, 12.0));
        assert_eq!(engine.pointer_released(), None);
        assert!(engine.is_idle());
    }

    #[test]
    fn test_one_axis_too_small_is_discarded() {
        let mut engine = HotspotEngine::new();
        engine.begin_draw(p(10.0, 10.0));
        engine.pointer_moved(p(20.0, 11.5));
        assert_eq!(engine.pointer_released(), None);
    }

    #[test]
    fn test_draw_proposes_oriented_rect_from_any_direction() {
        let expected = PercentRect::new(10.0, 10.0, 15.0, 20.0);
        let corners = [
            (p(10.0, 10.0), p(25.0, 30.0)),
            (p(25.0, 30.0), p(10.0, 10.0)),
            (p(25.0, 10.0), p(10.0, 30.0)),
            (p(10.0, 30.0), p(25.0, 10.0)),
        ];
        for (start, end) in corners {
            let mut engine = HotspotEngine::new();
            engine.begin_draw(start);
            engine.pointer_moved(end);
            assert_eq!(engine.pointer_released(), Some(expected));
        }
    }

    #[test]
    fn test_move_preserves_grab_offset() {
        let mut engine = HotspotEngine::new();
        let h = hotspot(20.0, 20.0, 10.0, 10.0);
        // Grab 3% right and 4% below the origin.
        assert!(engine.begin_move(&h, p(23.0, 24.0)));

        let (id, update) = engine.pointer_moved(p(50.0, 60.0)).unwrap();
        assert_eq!(id, "h1");
        assert_eq!(update, HotspotUpdate::Origin { x: 47.0, y: 56.0 });
        assert_eq!(engine.pointer_released(), None);
    }

    #[test]
    fn test_move_is_not_clamped() {
        let mut engine = HotspotEngine::new();
        let h = hotspot(0.0, 0.0, 10.0, 10.0);
        engine.begin_move(&h, p(0.0, 0.0));
        let (_, update) = engine.pointer_moved(p(-30.0, 130.0)).unwrap();
        assert_eq!(update, HotspotUpdate::Origin { x: -30.0, y: 130.0 });
    }

    #[test]
    fn test_interactions_are_mutually_exclusive() {
        let mut engine = HotspotEngine::new();
        let h = hotspot(20.0, 20.0, 10.0, 10.0);

        assert!(engine.begin_move(&h, p(21.0, 21.0)));
        assert!(!engine.begin_draw(p(50.0, 50.0)));
        assert!(!engine.begin_resize(&h, Corner::Se, p(30.0, 30.0)));
        engine.pointer_released();

        assert!(engine.begin_draw(p(50.0, 50.0)));
        assert!(!engine.begin_move(&h, p(21.0, 21.0)));
    }

    fn resize_once(corner: Corner, to: PercentPoint) -> PercentRect {
        let mut engine = HotspotEngine::new();
        let h = hotspot(20.0, 20.0, 10.0, 10.0);
        let from = match corner {
            Corner::Nw => p(20.0, 20.0),
            Corner::Ne => p(30.0, 20.0),
            Corner::Sw => p(20.0, 30.0),
            Corner::Se => p(30.0, 30.0),
        };
        engine.begin_resize(&h, corner, from);
        let (_, update) = engine.pointer_moved(to).unwrap();
        match update {
            HotspotUpdate::Bounds(rect) => rect,
            other => panic!("expected bounds update, got {other:?}"),
        }
    }

    #[test]
    fn test_resize_se_grows_both_axes() {
        let rect = resize_once(Corner::Se, p(36.0, 34.0));
        assert_eq!(rect, PercentRect::new(20.0, 20.0, 16.0, 14.0));
    }

    #[test]
    fn test_resize_nw_moves_origin() {
        let rect = resize_once(Corner::Nw, p(15.0, 17.0));
        assert_eq!(rect, PercentRect::new(15.0, 17.0, 15.0, 13.0));
    }

    #[test]
    fn test_resize_opposite_corner_never_moves() {
        // Drag every corner in several directions; the diagonally
        // opposite corner must keep its absolute position.
        let targets = [
            p(10.0, 10.0),
            p(45.0, 45.0),
            p(45.0, 10.0),
            p(10.0, 45.0),
            p(90.0, -20.0),
        ];
        for corner in Corner::ALL {
            for to in targets {
                let rect = resize_once(corner, to);
                let (ox, oy) = match corner {
                    Corner::Nw => (30.0, 30.0),
                    Corner::Ne => (20.0, 30.0),
                    Corner::Sw => (30.0, 20.0),
                    Corner::Se => (20.0, 20.0),
                };
                let (got_x, got_y) = match corner {
                    Corner::Nw => (rect.x + rect.width, rect.y + rect.height),
                    Corner::Ne => (rect.x, rect.y + rect.height),
                    Corner::Sw => (rect.x + rect.width, rect.y),
                    Corner::Se => (rect.x, rect.y),
                };
                assert!(
                    (got_x - ox).abs() < 1e-9 && (got_y - oy).abs() < 1e-9,
                    "{corner:?} dragged to ({},{}) moved its anchor",
                    to.x,
                    to.y
                );
            }
        }
    }

    #[test]
    fn test_resize_floors_at_min_size() {
        // Drag each handle far past the opposite edge.
        for corner in Corner::ALL {
            let rect = resize_once(
                corner,
                match corner {
                    Corner::Nw => p(90.0, 90.0),
                    Corner::Ne => p(-50.0, 90.0),
                    Corner::Sw => p(90.0, -50.0),
                    Corner::Se => p(-50.0, -50.0),
                },
            );
            assert_eq!(rect.width, MIN_SIZE, "{corner:?}");
            assert_eq!(rect.height, MIN_SIZE, "{corner:?}");
        }
    }

    #[test]
    fn test_resize_west_pins_right_edge_at_min() {
        // Right edge sits at x=30; collapsing from the west pins it.
        let rect = resize_once(Corner::Sw, p(40.0, 30.0));
        assert_eq!(rect.x, 28.0);
        assert_eq!(rect.width, MIN_SIZE);
    }

    #[test]
    fn test_cancel_discards_preview() {
        let mut engine = HotspotEngine::new();
        engine.begin_draw(p(10.0, 10.0));
        engine.pointer_moved(p(40.0, 40.0));
        engine.cancel();
        assert!(engine.is_idle());
        assert_eq!(engine.pointer_released(), None);
    }
}
