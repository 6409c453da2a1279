// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Flattened slide sequence derived from the group collection.
//!
//! The two-level structure (groups of variants) is presented to the
//! visitor as one linear, wrap-around sequence. The sequence is a
//! pure projection: it is rebuilt from the group list after every
//! mutation and never edited directly, so there is no second copy of
//! the structure to fall out of sync.

use super::group::ImageGroup;

/// One (group, variant) pair at a flat position.
#[derive(Debug, Clone, PartialEq)]
pub struct Slide {
    pub group_id: String,
    pub variant_index: usize,
    pub total_variants: usize,
    pub first_in_group: bool,
}

#[derive(Debug, Default)]
pub struct SlideModel {
    slides: Vec<Slide>,
}

impl SlideModel {
    pub fn from_groups(groups: &[ImageGroup]) -> Self {
        let mut model = Self::default();
        model.rebuild(groups);
        model
    }

    /// Recompute the flat sequence from the current group list.
    pub fn rebuild(&mut self, groups: &[ImageGroup]) {
        self.slides.clear();
        for group in groups {
            let total = group.variants.len();
            for variant_index in 0..total {
                self.slides.push(Slide {
                    group_id: group.id.clone(),
                    variant_index,
                    total_variants: total,
                    first_in_group: variant_index == 0,
                });
            }
        }
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Slide> {
        self.slides.get(index)
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    /// Next index, wrapping past the end.
    pub fn next(&self, index: usize) -> usize {
        if self.slides.is_empty() {
            return 0;
        }
        (index + 1) % self.slides.len()
    }

    /// Previous index, wrapping past the start.
    pub fn previous(&self, index: usize) -> usize {
        if self.slides.is_empty() {
            return 0;
        }
        (index + self.slides.len() - 1) % self.slides.len()
    }

    /// Flat index of the first slide belonging to `group_id`.
    pub fn jump_to_group(&self, group_id: &str) -> Option<usize> {
        self.slides
            .iter()
            .position(|s| s.group_id == group_id && s.first_in_group)
    }

    /// Re-derive an index against the current sequence. Indices past
    /// the end (stale after a deletion) clamp to the last slide.
    pub fn clamp(&self, index: usize) -> usize {
        if self.slides.is_empty() {
            0
        } else {
            index.min(self.slides.len() - 1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups() -> Vec<ImageGroup> {
        let mut g1 = ImageGroup::new("g1".into(), "one".into(), "a.png".into());
        g1.variants.push("a2.png".into());
        g1.variants.push("a3.png".into());
        let g2 = ImageGroup::new("g2".into(), "two".into(), "b.png".into());
        vec![g1, g2]
    }

    #[test]
    fn test_flatten_tags_slides() {
        let model = SlideModel::from_groups(&groups());
        assert_eq!(model.len(), 4);

        let first = model.get(0).unwrap();
        assert_eq!(first.group_id, "g1");
        assert!(first.first_in_group);
        assert_eq!(first.total_variants, 3);

        let third = model.get(2).unwrap();
        assert_eq!(third.group_id, "g1");
        assert_eq!(third.variant_index, 2);
        assert!(!third.first_in_group);

        let last = model.get(3).unwrap();
        assert_eq!(last.group_id, "g2");
        assert!(last.first_in_group);
        assert_eq!(last.total_variants, 1);
    }

    #[test]
    fn test_next_previous_are_inverses() {
        let model = SlideModel::from_groups(&groups());
        for i in 0..model.len() {
            assert_eq!(model.previous(model.next(i)), i);
            assert_eq!(model.next(model.previous(i)), i);
        }
    }

    #[test]
    fn test_wraparound() {
        let model = SlideModel::from_groups(&groups());
        assert_eq!(model.next(3), 0);
        assert_eq!(model.previous(0), 3);
    }

    #[test]
    fn test_jump_to_group() {
        let model = SlideModel::from_groups(&groups());
        assert_eq!(model.jump_to_group("g1"), Some(0));
        assert_eq!(model.jump_to_group("g2"), Some(3));
        assert_eq!(model.jump_to_group("missing"), None);
    }

    #[test]
    fn test_clamp_after_shrink() {
        let mut gs = groups();
        let mut model = SlideModel::from_groups(&gs);
        assert_eq!(model.clamp(3), 3);

        gs.remove(1);
        model.rebuild(&gs);
        assert_eq!(model.clamp(3), 2);

        model.rebuild(&[]);
        assert_eq!(model.clamp(3), 0);
    }

    #[test]
    fn test_empty_sequence_navigation() {
        let model = SlideModel::default();
        assert_eq!(model.next(0), 0);
        assert_eq!(model.previous(0), 0);
    }
}
