//! Condition profiles.
//!
//! Some ratings hinge on facts no symptom log captures: a sleep-study
//! diagnosis, a prescribed CPAP machine. The engine reads them through
//! [`ProfileProvider`]; [`ProfileBook`] is the file-backed implementation,
//! one JSON object keyed by diagnostic code.

use crate::{ConditionProfile, Error, Result};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

pub const PROFILES_FILE: &str = "condition_profiles.json";

/// Source of per-condition profiles.
pub trait ProfileProvider {
    fn profile(&self, diagnostic_code: &str) -> Option<ConditionProfile>;
}

/// Profiles keyed by diagnostic code.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileBook {
    profiles: BTreeMap<String, ConditionProfile>,
}

impl ProfileProvider for ProfileBook {
    fn profile(&self, diagnostic_code: &str) -> Option<ConditionProfile> {
        self.profiles.get(diagnostic_code).cloned()
    }
}

impl ProfileBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, diagnostic_code: &str) -> Option<&ConditionProfile> {
        self.profiles.get(diagnostic_code)
    }

    pub fn insert(&mut self, diagnostic_code: impl Into<String>, profile: ConditionProfile) {
        self.profiles.insert(diagnostic_code.into(), profile);
    }

    pub fn remove(&mut self, diagnostic_code: &str) -> Option<ConditionProfile> {
        self.profiles.remove(diagnostic_code)
    }

    /// Profile for `diagnostic_code`, created empty when missing.
    pub fn entry(&mut self, diagnostic_code: &str) -> &mut ConditionProfile {
        self.profiles.entry(diagnostic_code.to_string()).or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConditionProfile)> {
        self.profiles.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Load profiles with a shared lock.
    ///
    /// A missing file is an empty book. An unreadable or corrupt file is
    /// logged and treated as empty so analysis can still run on logs alone.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No profile file at {:?}, starting empty", path);
            return Ok(Self::default());
        }

        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!("Unable to open profile file {:?}: {}. Using empty profiles.", path, e);
                return Ok(Self::default());
            }
        };

        if let Err(e) = file.lock_shared() {
            tracing::warn!("Unable to lock profile file {:?}: {}. Using empty profiles.", path, e);
            return Ok(Self::default());
        }

        let mut contents = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
        file.unlock()?;
        if let Err(e) = read {
            tracing::warn!("Failed to read profile file {:?}: {}. Using empty profiles.", path, e);
            return Ok(Self::default());
        }

        match serde_json::from_str::<ProfileBook>(&contents) {
            Ok(book) => {
                tracing::debug!("Loaded {} condition profiles from {:?}", book.profiles.len(), path);
                Ok(book)
            }
            Err(e) => {
                tracing::warn!("Failed to parse profile file {:?}: {}. Using empty profiles.", path, e);
                Ok(Self::default())
            }
        }
    }

    /// Write the book atomically: temp file in the same directory, fsync,
    /// rename over the original.
    pub fn save(&self, path: &Path) -> Result<()> {
        let parent = path
            .parent()
            .ok_or_else(|| Error::Profile(format!("profile path {:?} has no parent", path)))?;
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        temp.as_file().lock_exclusive()?;
        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            serde_json::to_writer_pretty(&mut writer, self)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(path).map_err(|e| Error::Io(e.error))?;
        tracing::debug!("Saved {} condition profiles to {:?}", self.profiles.len(), path);
        Ok(())
    }

    /// Load, modify and save in one step.
    pub fn update<F>(path: &Path, f: F) -> Result<Self>
    where
        F: FnOnce(&mut ProfileBook) -> Result<()>,
    {
        let mut book = Self::load(path)?;
        f(&mut book)?;
        book.save(path)?;
        Ok(book)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profiles.json");

        let mut book = ProfileBook::new();
        book.insert(
            "6847",
            ConditionProfile {
                has_diagnosis: true,
                uses_breathing_device: true,
                device_type: Some("CPAP".into()),
                ..Default::default()
            },
        );
        book.save(&path).unwrap();

        let loaded = ProfileBook::load(&path).unwrap();
        assert_eq!(loaded, book);
        assert_eq!(
            loaded.profile("6847").and_then(|p| p.device_type),
            Some("CPAP".to_string())
        );
        assert!(loaded.profile("8100").is_none());
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let book = ProfileBook::load(&dir.path().join("absent.json")).unwrap();
        assert!(book.is_empty());
    }

    #[test]
    fn test_corrupt_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profiles.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(ProfileBook::load(&path).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_keys_survive_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profiles.json");
        let raw = json!({
            "6847": {"hasDiagnosis": true, "sleepStudyDate": "2023-11-02"}
        });
        std::fs::write(&path, raw.to_string()).unwrap();

        let book = ProfileBook::update(&path, |book| {
            book.entry("6847").uses_breathing_device = true;
            Ok(())
        })
        .unwrap();

        let profile = book.get("6847").unwrap();
        assert!(profile.uses_breathing_device);
        assert_eq!(profile.extra.get("sleepStudyDate"), Some(&json!("2023-11-02")));

        let reread: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(reread["6847"]["sleepStudyDate"], json!("2023-11-02"));
    }
}
