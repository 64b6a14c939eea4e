//! File-backed snapshot layer for the user collection.

use crate::core::{Result, StoreError, User};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Reads and writes the whole collection as a single pretty-printed JSON
/// array. A missing file is an empty collection, not an error. Every save
/// rewrites the file through a sibling temp file and rename, so a crash
/// mid-write never leaves a truncated store behind.
pub struct JsonSnapshot {
    path: PathBuf,
}

impl JsonSnapshot {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn load(&self) -> Result<Vec<User>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let data = fs::read_to_string(&self.path).map_err(|e| {
            StoreError::Io(format!("Failed to read {}: {}", self.path.display(), e))
        })?;
        serde_json::from_str(&data).map_err(|e| {
            StoreError::Parse(format!(
                "Malformed user store {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    pub fn save(&self, users: &[User]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| StoreError::Io(format!("Failed to create data directory: {}", e)))?;
            }
        }
        let serialized = serde_json::to_string_pretty(users)
            .map_err(|e| StoreError::Io(format!("Failed to serialize users: {}", e)))?;
        let temp_path = self.path.with_extension("tmp");
        let temp_file = File::create(&temp_path)
            .map_err(|e| StoreError::Io(format!("Failed to create temp file: {}", e)))?;
        let mut writer = BufWriter::new(temp_file);
        writer
            .write_all(serialized.as_bytes())
            .map_err(|e| StoreError::Io(format!("Failed to write users: {}", e)))?;
        writer
            .flush()
            .map_err(|e| StoreError::Io(format!("Failed to flush users: {}", e)))?;
        writer
            .get_mut()
            .sync_all()
            .map_err(|e| StoreError::Io(format!("Failed to sync users: {}", e)))?;
        fs::rename(&temp_path, &self.path)
            .map_err(|e| StoreError::Io(format!("Failed to rename user store: {}", e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;
    use tempfile::TempDir;

    fn user(id: u64, name: &str) -> User {
        User {
            id,
            name: name.to_string(),
            extra: Map::new(),
        }
    }

    #[test]
    fn missing_file_loads_as_empty_collection() {
        let temp_dir = TempDir::new().unwrap();
        let snapshot = JsonSnapshot::new(temp_dir.path().join("users.json"));
        assert!(!snapshot.exists());
        assert!(snapshot.load().unwrap().is_empty());
    }

    #[test]
    fn save_and_load_round_trip_preserves_order_and_fields() {
        let temp_dir = TempDir::new().unwrap();
        let snapshot = JsonSnapshot::new(temp_dir.path().join("users.json"));

        let mut extra = Map::new();
        extra.insert("role".to_string(), serde_json::json!("admin"));
        let users = vec![
            user(2, "Bob"),
            User {
                id: 1,
                name: "Alice".to_string(),
                extra,
            },
        ];

        snapshot.save(&users).unwrap();
        let loaded = snapshot.load().unwrap();
        assert_eq!(loaded, users);
    }

    #[test]
    fn store_file_is_pretty_printed() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("users.json");
        let snapshot = JsonSnapshot::new(&path);

        snapshot.save(&[user(1, "Diana")]).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("  {\n    \"id\": 1,\n    \"name\": \"Diana\"\n  }"));
    }

    #[test]
    fn malformed_store_is_a_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("users.json");
        std::fs::write(&path, "{not json").unwrap();

        let snapshot = JsonSnapshot::new(&path);
        match snapshot.load() {
            Err(StoreError::Parse(_)) => {}
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn save_leaves_no_temp_file_behind() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("users.json");
        let snapshot = JsonSnapshot::new(&path);

        snapshot.save(&[user(1, "Diana")]).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());
    }
}
