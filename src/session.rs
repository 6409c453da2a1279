// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Two-phase hotspot creation flow.
//!
//! Phase one is a proposed rectangle from the geometry engine; phase
//! two captures the character (required, single glyph) and an
//! optional explanation before the hotspot is committed to its group.
//! Cancelling at any point discards the proposal without touching the
//! document.

use crate::models::group::AppData;
use crate::models::hotspot::Hotspot;
use crate::util;
use crate::util::geometry::PercentRect;
use anyhow::{bail, Result};

/// Explanation stored when the curator leaves the field blank.
pub const DEFAULT_EXPLANATION: &str = "No detailed explanation yet.";

/// A proposed hotspot awaiting confirmation.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingHotspot {
    pub group_id: String,
    pub rect: PercentRect,
    pub character: String,
    pub explanation: String,
}

#[derive(Debug, Default)]
pub struct EditSession {
    pending: Option<PendingHotspot>,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the capture dialog for a freshly drawn rectangle.
    pub fn propose(&mut self, group_id: String, rect: PercentRect) {
        self.pending = Some(PendingHotspot {
            group_id,
            rect,
            character: String::new(),
            explanation: String::new(),
        });
    }

    pub fn pending(&self) -> Option<&PendingHotspot> {
        self.pending.as_ref()
    }

    pub fn pending_mut(&mut self) -> Option<&mut PendingHotspot> {
        self.pending.as_mut()
    }

    pub fn is_capturing(&self) -> bool {
        self.pending.is_some()
    }

    /// Confirmation is available only once a character was entered.
    pub fn can_confirm(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|p| !p.character.trim().is_empty())
    }

    /// Discard the proposal. No mutation has happened yet, so there
    /// is nothing to roll back.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Commit the pending hotspot to its group. Assigns a fresh id,
    /// keeps only the first glyph of the character field, and falls
    /// back to a placeholder explanation when the field is blank.
    pub fn confirm(&mut self, data: &mut AppData) -> Result<String> {
        let Some(pending) = self.pending.take() else {
            bail!("No hotspot awaiting confirmation.");
        };

        let Some(glyph) = pending.character.trim().chars().next() else {
            self.pending = Some(pending);
            bail!("A character is required.");
        };

        let explanation = if pending.explanation.trim().is_empty() {
            DEFAULT_EXPLANATION.to_string()
        } else {
            pending.explanation.clone()
        };

        let id = util::fresh_id();
        let hotspot = Hotspot::new(id.clone(), pending.rect, glyph.to_string(), explanation);

        if let Err(e) = data.add_hotspot(&pending.group_id, hotspot) {
            self.pending = Some(pending);
            return Err(e);
        }
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::group::ImageGroup;
    use crate::models::slides::SlideModel;

    fn data_one_group() -> AppData {
        AppData {
            app_title: "t".to_string(),
            images: vec![ImageGroup::new("g1".into(), "one".into(), "a.png".into())],
        }
    }

    #[test]
    fn test_cancel_discards_without_mutation() {
        let mut data = data_one_group();
        let before = data.clone();

        let mut session = EditSession::new();
        session.propose("g1".into(), PercentRect::new(10.0, 10.0, 5.0, 5.0));
        assert!(session.is_capturing());
        session.cancel();

        assert!(!session.is_capturing());
        assert_eq!(data, before);
        assert!(session.confirm(&mut data).is_err());
    }

    #[test]
    fn test_confirm_requires_character() {
        let mut data = data_one_group();
        let mut session = EditSession::new();
        session.propose("g1".into(), PercentRect::new(10.0, 10.0, 5.0, 5.0));

        assert!(!session.can_confirm());
        assert!(session.confirm(&mut data).is_err());
        // The proposal survives a failed confirm.
        assert!(session.is_capturing());
        assert!(data.images[0].hotspots.is_empty());
    }

    #[test]
    fn test_confirm_defaults_explanation() {
        let mut data = data_one_group();
        let mut session = EditSession::new();
        session.propose("g1".into(), PercentRect::new(10.0, 10.0, 5.0, 5.0));
        session.pending_mut().unwrap().character = "天".into();
        assert!(session.can_confirm());

        let id = session.confirm(&mut data).unwrap();
        assert!(!session.is_capturing());

        let h = data.images[0].hotspots.last().unwrap();
        assert_eq!(h.id, id);
        assert_eq!(h.character, "天");
        assert_eq!(h.explanation, DEFAULT_EXPLANATION);
        assert_eq!(h.rect(), PercentRect::new(10.0, 10.0, 5.0, 5.0));
    }

    #[test]
    fn test_confirm_keeps_single_glyph() {
        let mut data = data_one_group();
        let mut session = EditSession::new();
        session.propose("g1".into(), PercentRect::new(10.0, 10.0, 5.0, 5.0));
        let pending = session.pending_mut().unwrap();
        pending.character = "  天地  ".into();
        pending.explanation = "sky".into();

        session.confirm(&mut data).unwrap();
        let h = data.images[0].hotspots.last().unwrap();
        assert_eq!(h.character, "天");
        assert_eq!(h.explanation, "sky");
    }

    #[test]
    fn test_hotspot_created_on_one_variant_shows_on_all() {
        let mut data = data_one_group();
        data.add_variant("g1", "b.png".into()).unwrap();
        data.add_variant("g1", "c.png".into()).unwrap();

        let slides = SlideModel::from_groups(&data.images);
        assert_eq!(slides.len(), 3);

        // Draw while viewing the middle variant.
        let viewing = slides.get(1).unwrap().group_id.clone();
        let mut session = EditSession::new();
        session.propose(viewing, PercentRect::new(10.0, 10.0, 5.0, 5.0));
        session.pending_mut().unwrap().character = "天".into();
        session.confirm(&mut data).unwrap();

        // Switching to the third variant resolves to the same group,
        // hence the identical hotspot at identical coordinates.
        let other = slides.get(2).unwrap();
        let group = data.group(&other.group_id).unwrap();
        assert_eq!(group.hotspots.len(), 1);
        assert_eq!(group.hotspots[0].character, "天");
        assert_eq!(
            group.hotspots[0].rect(),
            PercentRect::new(10.0, 10.0, 5.0, 5.0)
        );
    }
}
