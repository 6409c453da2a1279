// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Hotspot data structures.
//!
//! A hotspot is a rectangular annotation anchored in percent space and
//! bound to a single character plus an explanation text. Because the
//! geometry is percentage-based it is independent of the rendered
//! pixel size and of which variant of the image is shown.

use crate::util::geometry::PercentRect;
use serde::{Deserialize, Serialize};

/// Smallest legal hotspot edge, in percent of the container.
pub const MIN_SIZE: f64 = 2.0;

/// A clickable region tied to one character.
///
/// `x`/`y` may drift outside 0-100 while dragging; partially
/// off-image hotspots are legal and are not corrected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotspot {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub character: String,
    pub explanation: String,
}

impl Hotspot {
    pub fn new(
        id: String,
        rect: PercentRect,
        character: String,
        explanation: String,
    ) -> Self {
        Self {
            id,
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            character,
            explanation,
        }
    }

    pub fn rect(&self) -> PercentRect {
        PercentRect::new(self.x, self.y, self.width, self.height)
    }

    /// Move the hotspot, preserving its size.
    pub fn set_origin(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
    }

    pub fn set_rect(&mut self, rect: PercentRect) {
        self.x = rect.x;
        self.y = rect.y;
        self.width = rect.width;
        self.height = rect.height;
    }
}
