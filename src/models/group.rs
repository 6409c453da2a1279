// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Image groups and the persisted application document.
//!
//! A group is one logical subject with an ordered list of visual
//! variants (filters, crops, lighting passes) and a single hotspot
//! collection shared by every variant. All mutation commands live
//! here so that the invariants (a group keeps at least one variant,
//! the document keeps at least one group) are enforced next to the
//! data they protect. Rejected commands return an error carrying a
//! user-facing message and leave the document untouched.

use super::hotspot::Hotspot;
use crate::util;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Narration text seeded when audio is first attached to a group.
pub const DEFAULT_AUDIO_TEXT: &str = "Enter the narration transcript here...";

/// One logical image subject with its variants and shared hotspots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageGroup {
    pub id: String,
    /// Ordered image references: data URLs, http(s) URLs, or paths.
    #[serde(default)]
    pub variants: Vec<String>,
    /// Legacy single-image field from old documents; consumed by
    /// [`AppData::migrate`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_text: Option<String>,
    #[serde(default)]
    pub hotspots: Vec<Hotspot>,
}

impl ImageGroup {
    pub fn new(id: String, name: String, reference: String) -> Self {
        Self {
            id,
            variants: vec![reference],
            url: None,
            name,
            audio_url: None,
            audio_text: None,
            hotspots: Vec::new(),
        }
    }

    pub fn hotspot(&self, id: &str) -> Option<&Hotspot> {
        self.hotspots.iter().find(|h| h.id == id)
    }

    pub fn hotspot_mut(&mut self, id: &str) -> Option<&mut Hotspot> {
        self.hotspots.iter_mut().find(|h| h.id == id)
    }
}

/// The persisted document. The in-memory copy is authoritative; the
/// saved file is a debounced mirror.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppData {
    pub app_title: String,
    pub images: Vec<ImageGroup>,
}

impl AppData {
    /// Wrap legacy single-image groups into one-element variant lists.
    ///
    /// Idempotent: groups that already carry variants pass through
    /// unchanged (any stale legacy field is cleared), and groups with
    /// neither end up with an empty list.
    pub fn migrate(&mut self) {
        for group in &mut self.images {
            if group.variants.is_empty() {
                if let Some(url) = group.url.take() {
                    group.variants.push(url);
                }
            } else {
                group.url = None;
            }
        }
    }

    pub fn group(&self, id: &str) -> Option<&ImageGroup> {
        self.images.iter().find(|g| g.id == id)
    }

    pub fn group_mut(&mut self, id: &str) -> Option<&mut ImageGroup> {
        self.images.iter_mut().find(|g| g.id == id)
    }

    /// Create a new group from an imported image. Returns the fresh id.
    pub fn import_group(&mut self, name: String, reference: String) -> String {
        let id = util::fresh_id();
        self.images
            .push(ImageGroup::new(id.clone(), name, reference));
        log::info!("Imported new group, total: {}", self.images.len());
        id
    }

    pub fn rename_group(&mut self, id: &str, name: String) -> Result<()> {
        let Some(group) = self.group_mut(id) else {
            bail!("Unknown image group.");
        };
        group.name = name;
        Ok(())
    }

    /// Delete a whole group and its hotspots. The last remaining
    /// group cannot be deleted.
    pub fn delete_group(&mut self, id: &str) -> Result<()> {
        if self.images.len() <= 1 {
            bail!("At least one image group must remain.");
        }
        if self.group(id).is_none() {
            bail!("Unknown image group.");
        }
        self.images.retain(|g| g.id != id);
        log::info!("Deleted group, total: {}", self.images.len());
        Ok(())
    }

    pub fn add_variant(&mut self, id: &str, reference: String) -> Result<()> {
        let Some(group) = self.group_mut(id) else {
            bail!("Unknown image group.");
        };
        group.variants.push(reference);
        Ok(())
    }

    /// Remove one variant. Removing the sole variant is rejected;
    /// the caller must delete the whole group instead.
    pub fn remove_variant(&mut self, id: &str, index: usize) -> Result<()> {
        let Some(group) = self.group_mut(id) else {
            bail!("Unknown image group.");
        };
        if group.variants.len() <= 1 {
            bail!("This is the group's only image. Delete the whole group instead.");
        }
        if index >= group.variants.len() {
            bail!("Unknown variant.");
        }
        group.variants.remove(index);
        Ok(())
    }

    /// Attach or replace the narration audio. Seeds a placeholder
    /// transcript when the group has none yet.
    pub fn attach_audio(&mut self, id: &str, data_url: String) -> Result<()> {
        let Some(group) = self.group_mut(id) else {
            bail!("Unknown image group.");
        };
        group.audio_url = Some(data_url);
        if group.audio_text.is_none() {
            group.audio_text = Some(DEFAULT_AUDIO_TEXT.to_string());
        }
        Ok(())
    }

    pub fn detach_audio(&mut self, id: &str) -> Result<()> {
        let Some(group) = self.group_mut(id) else {
            bail!("Unknown image group.");
        };
        group.audio_url = None;
        group.audio_text = None;
        Ok(())
    }

    pub fn set_audio_text(&mut self, id: &str, text: String) -> Result<()> {
        let Some(group) = self.group_mut(id) else {
            bail!("Unknown image group.");
        };
        group.audio_text = Some(text);
        Ok(())
    }

    pub fn add_hotspot(&mut self, id: &str, hotspot: Hotspot) -> Result<()> {
        let Some(group) = self.group_mut(id) else {
            bail!("Unknown image group.");
        };
        group.hotspots.push(hotspot);
        log::info!("Added hotspot, group total: {}", group.hotspots.len());
        Ok(())
    }

    pub fn delete_hotspot(&mut self, group_id: &str, hotspot_id: &str) -> Result<()> {
        let Some(group) = self.group_mut(group_id) else {
            bail!("Unknown image group.");
        };
        let before = group.hotspots.len();
        group.hotspots.retain(|h| h.id != hotspot_id);
        if group.hotspots.len() == before {
            bail!("Unknown hotspot.");
        }
        Ok(())
    }
}

impl Default for AppData {
    fn default() -> Self {
        demo_data()
    }
}

const DEMO_TITLE: &str = "Hanzi Interactive Explorer";

const DEMO_VARIANTS: [&str; 3] = [
    "https://images.unsplash.com/photo-1533158388470-9a56699990c6?q=80&w=2588&auto=format&fit=crop",
    "https://images.unsplash.com/photo-1533158388470-9a56699990c6?q=80&w=2588&auto=format&fit=crop&sat=-100",
    "https://images.unsplash.com/photo-1533158388470-9a56699990c6?q=80&w=2588&auto=format&fit=crop&sepia=100",
];

const DEMO_SECOND_IMAGE: &str =
    "https://images.unsplash.com/photo-1629814585036-74d30c309582?q=80&w=2670&auto=format&fit=crop";

const DEMO_CHAR_ROWS: [[&str; 5]; 6] = [
    ["君", "諱", "表", "字", "元"],
    ["異", "系", "帝", "高", "辛"],
    ["爰", "暨", "后", "稷", "張"],
    ["仲", "孝", "友", "雅", "藝"],
    ["攸", "載", "天", "挺", "留"],
    ["侯", "應", "期", "佐", "治"],
];

/// Seed document used when no saved data exists: a stele rubbing with
/// a grid of demo hotspots (three display variants) and a second,
/// empty group.
pub fn demo_data() -> AppData {
    let cols = DEMO_CHAR_ROWS[0].len();
    let rows = DEMO_CHAR_ROWS.len();
    let cell_width = 100.0 / cols as f64;
    let cell_height = 100.0 / rows as f64;
    let box_size = cell_width.min(cell_height) * 0.7;

    let mut hotspots = Vec::with_capacity(rows * cols);
    for (row, chars) in DEMO_CHAR_ROWS.iter().enumerate() {
        for (col, ch) in chars.iter().enumerate() {
            let x = col as f64 * cell_width + (cell_width - box_size) / 2.0;
            let y = row as f64 * cell_height + (cell_height - box_size) / 2.0;

            let explanation = if *ch == "天" {
                "\"天\" (tian) is one of the most important concepts in Chinese \
                 culture: sky, the heavens, or daytime. It is tied to the emperor \
                 (the Son of Heaven) and stands for supreme authority and the \
                 order of nature."
                    .to_string()
            } else {
                format!(
                    "Tap to explore the stroke order and structure of \"{ch}\"."
                )
            };

            hotspots.push(Hotspot {
                id: format!("demo-{ch}-{row}-{col}"),
                x,
                y,
                width: box_size,
                height: box_size,
                character: (*ch).to_string(),
                explanation,
            });
        }
    }

    AppData {
        app_title: DEMO_TITLE.to_string(),
        images: vec![
            ImageGroup {
                id: "demo-1".to_string(),
                variants: DEMO_VARIANTS.iter().map(|s| s.to_string()).collect(),
                url: None,
                name: "Stele Rubbing Demo".to_string(),
                audio_url: None,
                audio_text: Some(
                    "An audio guide to this inscription. The engraved text \
                     preserves the essence of ancient calligraphy; through \
                     these characters we glimpse the traces of history."
                        .to_string(),
                ),
                hotspots,
            },
            ImageGroup {
                id: "demo-2".to_string(),
                variants: vec![DEMO_SECOND_IMAGE.to_string()],
                url: None,
                name: "Xuan Paper Calligraphy".to_string(),
                audio_url: None,
                audio_text: None,
                hotspots: Vec::new(),
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::geometry::PercentRect;

    fn two_group_data() -> AppData {
        AppData {
            app_title: "t".to_string(),
            images: vec![
                ImageGroup::new("g1".into(), "one".into(), "a.png".into()),
                ImageGroup::new("g2".into(), "two".into(), "b.png".into()),
            ],
        }
    }

    #[test]
    fn test_migrate_wraps_legacy_url() {
        let mut data = AppData {
            app_title: "t".to_string(),
            images: vec![ImageGroup {
                id: "g".into(),
                variants: Vec::new(),
                url: Some("old.png".into()),
                name: "n".into(),
                audio_url: None,
                audio_text: None,
                hotspots: Vec::new(),
            }],
        };
        data.migrate();
        assert_eq!(data.images[0].variants, vec!["old.png".to_string()]);
        assert!(data.images[0].url.is_none());
    }

    #[test]
    fn test_migrate_is_idempotent() {
        let mut data = two_group_data();
        data.migrate();
        let once = data.clone();
        data.migrate();
        assert_eq!(data, once);
    }

    #[test]
    fn test_migrate_neither_field_yields_empty() {
        let mut data = AppData {
            app_title: "t".to_string(),
            images: vec![ImageGroup {
                id: "g".into(),
                variants: Vec::new(),
                url: None,
                name: "n".into(),
                audio_url: None,
                audio_text: None,
                hotspots: Vec::new(),
            }],
        };
        data.migrate();
        assert!(data.images[0].variants.is_empty());
    }

    #[test]
    fn test_delete_last_group_rejected() {
        let mut data = two_group_data();
        data.delete_group("g1").unwrap();
        let before = data.clone();
        assert!(data.delete_group("g2").is_err());
        assert_eq!(data, before);
    }

    #[test]
    fn test_remove_sole_variant_rejected() {
        let mut data = two_group_data();
        data.add_hotspot(
            "g1",
            Hotspot::new(
                "h1".into(),
                PercentRect::new(10.0, 10.0, 5.0, 5.0),
                "天".into(),
                "".into(),
            ),
        )
        .unwrap();

        let before = data.clone();
        assert!(data.remove_variant("g1", 0).is_err());
        // Rejection leaves the group and its hotspots unchanged.
        assert_eq!(data, before);
    }

    #[test]
    fn test_remove_variant_keeps_hotspots() {
        let mut data = two_group_data();
        data.add_variant("g1", "a2.png".into()).unwrap();
        data.add_hotspot(
            "g1",
            Hotspot::new(
                "h1".into(),
                PercentRect::new(10.0, 10.0, 5.0, 5.0),
                "天".into(),
                "".into(),
            ),
        )
        .unwrap();

        data.remove_variant("g1", 1).unwrap();
        let group = data.group("g1").unwrap();
        assert_eq!(group.variants, vec!["a.png".to_string()]);
        assert_eq!(group.hotspots.len(), 1);
        assert_eq!(group.hotspots[0].character, "天");
    }

    #[test]
    fn test_attach_audio_seeds_transcript_once() {
        let mut data = two_group_data();
        data.attach_audio("g1", "data:audio/mp3;base64,AA==".into())
            .unwrap();
        assert_eq!(
            data.group("g1").unwrap().audio_text.as_deref(),
            Some(DEFAULT_AUDIO_TEXT)
        );

        data.set_audio_text("g1", "spoken intro".into()).unwrap();
        data.attach_audio("g1", "data:audio/mp3;base64,BB==".into())
            .unwrap();
        // Replacing audio keeps an existing transcript.
        assert_eq!(
            data.group("g1").unwrap().audio_text.as_deref(),
            Some("spoken intro")
        );
    }

    #[test]
    fn test_detach_audio_clears_both_fields() {
        let mut data = two_group_data();
        data.attach_audio("g1", "data:audio/mp3;base64,AA==".into())
            .unwrap();
        data.detach_audio("g1").unwrap();
        let group = data.group("g1").unwrap();
        assert!(group.audio_url.is_none());
        assert!(group.audio_text.is_none());
    }

    #[test]
    fn test_camel_case_document_keys() {
        let data = two_group_data();
        let json = serde_json::to_string(&data).unwrap();
        assert!(json.contains("\"appTitle\""));

        let parsed: AppData = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, data);
    }

    #[test]
    fn test_demo_grid_shape() {
        let data = demo_data();
        assert_eq!(data.images.len(), 2);
        assert_eq!(data.images[0].hotspots.len(), 30);
        assert_eq!(data.images[0].variants.len(), 3);
        for h in &data.images[0].hotspots {
            assert!(h.width >= crate::models::hotspot::MIN_SIZE);
            assert!(h.height >= crate::models::hotspot::MIN_SIZE);
        }
    }
}
