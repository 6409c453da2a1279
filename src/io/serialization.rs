// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Document export and import.
//!
//! This module handles exporting and importing the whole document in
//! YAML and JSON formats, for curator backups and for moving kiosks
//! between machines. Imports run the same migration as the store.

use crate::models::group::AppData;
use anyhow::Result;
use std::path::Path;

/// Export the document to YAML format.
pub fn export_yaml(data: &AppData, path: &Path) -> Result<()> {
    let yaml = serde_yaml::to_string(data)?;
    std::fs::write(path, yaml)?;
    Ok(())
}

/// Export the document to JSON format.
pub fn export_json(data: &AppData, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(data)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Import a document from YAML format.
pub fn import_yaml(path: &Path) -> Result<AppData> {
    let yaml = std::fs::read_to_string(path)?;
    let mut data: AppData = serde_yaml::from_str(&yaml)?;
    data.migrate();
    Ok(data)
}

/// Import a document from JSON format.
pub fn import_json(path: &Path) -> Result<AppData> {
    let json = std::fs::read_to_string(path)?;
    let mut data: AppData = serde_json::from_str(&json)?;
    data.migrate();
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::group::demo_data;
    use crate::util;

    #[test]
    fn test_yaml_roundtrip() {
        let data = demo_data();
        let path = std::env::temp_dir().join(format!("stele-test-{}.yaml", util::fresh_id()));
        export_yaml(&data, &path).unwrap();
        let imported = import_yaml(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(imported, data);
    }

    #[test]
    fn test_json_roundtrip() {
        let data = demo_data();
        let path = std::env::temp_dir().join(format!("stele-test-{}.json", util::fresh_id()));
        export_json(&data, &path).unwrap();
        let imported = import_json(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(imported, data);
    }

    #[test]
    fn test_import_migrates_legacy_yaml() {
        let yaml = "appTitle: old\nimages:\n  - id: g\n    url: legacy.png\n    name: n\n";
        let path = std::env::temp_dir().join(format!("stele-test-{}.yaml", util::fresh_id()));
        std::fs::write(&path, yaml).unwrap();
        let imported = import_yaml(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(imported.images[0].variants, vec!["legacy.png".to_string()]);
        assert!(imported.images[0].url.is_none());
    }
}
