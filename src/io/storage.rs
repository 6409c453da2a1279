// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Persisted document storage.
//!
//! The in-memory document is authoritative; this module mirrors it to
//! a JSON file under the user's config directory. Saving is
//! best-effort: failures are logged and never surfaced as errors, so
//! a missing or read-only backing store degrades to a session-only
//! document. Loading applies the legacy-field migration.

use crate::models::group::AppData;
use anyhow::Result;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "stele";
const FILENAME: &str = "appdata.json";

/// Location of the saved document.
pub fn store_path() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|d| d.join(APP_DIR).join(FILENAME))
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
}

/// Load the saved document, if one exists and parses.
pub fn load() -> Option<AppData> {
    let path = match store_path() {
        Ok(path) => path,
        Err(e) => {
            log::warn!("No usable store location: {e}");
            return None;
        }
    };
    if !path.exists() {
        return None;
    }
    match load_from(&path) {
        Ok(data) => {
            log::info!("Loaded document from {}", path.display());
            Some(data)
        }
        Err(e) => {
            log::error!("Failed to load document: {e:#}");
            None
        }
    }
}

/// Best-effort save of the current document.
pub fn save(data: &AppData) {
    let path = match store_path() {
        Ok(path) => path,
        Err(e) => {
            log::error!("Cannot save document: {e}");
            return;
        }
    };
    match save_to(&path, data) {
        Ok(_) => log::info!("Saved document to {}", path.display()),
        Err(e) => log::error!("Failed to save document: {e:#}"),
    }
}

pub fn load_from(path: &Path) -> Result<AppData> {
    let json = std::fs::read_to_string(path)?;
    let mut data: AppData = serde_json::from_str(&json)?;
    data.migrate();
    Ok(data)
}

pub fn save_to(path: &Path, data: &AppData) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string(data)?;
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::group::ImageGroup;
    use crate::util;

    #[test]
    fn test_save_load_roundtrip() {
        let data = AppData {
            app_title: "t".to_string(),
            images: vec![ImageGroup::new("g1".into(), "one".into(), "a.png".into())],
        };

        let path = std::env::temp_dir().join(format!("stele-test-{}.json", util::fresh_id()));
        save_to(&path, &data).unwrap();
        let loaded = load_from(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, data);
    }

    #[test]
    fn test_load_migrates_legacy_documents() {
        let json = r#"{
            "appTitle": "old",
            "images": [
                { "id": "g", "url": "legacy.png", "name": "n", "hotspots": [] }
            ]
        }"#;

        let path = std::env::temp_dir().join(format!("stele-test-{}.json", util::fresh_id()));
        std::fs::write(&path, json).unwrap();
        let loaded = load_from(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.images[0].variants, vec!["legacy.png".to_string()]);
        assert!(loaded.images[0].url.is_none());
    }
}
