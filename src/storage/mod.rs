pub mod migration;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::goal::Goal;
use crate::core::profile::{UserProfile, UserSettings};
use self::migration::{RawGoal, migrate_goals};

pub const SCHEMA_VERSION: u32 = 1;

/// The persisted envelope: everything the application knows, in one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorageData {
    pub version: u32,
    pub profile: Option<UserProfile>,
    pub goals: Vec<Goal>,
    pub settings: UserSettings,
}

impl Default for StorageData {
    fn default() -> Self {
        Self {
            version: SCHEMA_VERSION,
            profile: None,
            goals: Vec::new(),
            settings: UserSettings::default(),
        }
    }
}

/// The envelope as read from disk: goals may still be in a legacy shape and
/// settings may be absent entirely.
#[derive(Debug, Deserialize)]
struct RawEnvelope {
    #[serde(default)]
    version: u32,
    #[serde(default)]
    profile: Option<UserProfile>,
    #[serde(default)]
    goals: Vec<RawGoal>,
    #[serde(default)]
    settings: Option<UserSettings>,
}

impl RawEnvelope {
    fn normalize(self, now: chrono::NaiveDateTime) -> StorageData {
        StorageData {
            version: if self.version == 0 {
                SCHEMA_VERSION
            } else {
                self.version
            },
            profile: self.profile,
            goals: migrate_goals(self.goals, now),
            settings: self.settings.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Error)]
enum StorageError {
    #[error("reading store file: {0}")]
    Io(#[from] std::io::Error),
    #[error("parsing store file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Fields of a partial save. `None` leaves the stored value untouched;
/// `profile` needs the extra level so it can also be cleared.
#[derive(Debug, Default)]
pub struct StoragePatch {
    pub profile: Option<Option<UserProfile>>,
    pub goals: Option<Vec<Goal>>,
    pub settings: Option<UserSettings>,
}

/// File-backed persistence gateway. Load never fails (corruption falls back
/// to the default envelope), save never propagates (failures are logged).
#[derive(Debug, Clone)]
pub struct Storage {
    path: PathBuf,
}

impl Storage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> StorageData {
        match self.read_envelope() {
            Ok(data) => data,
            Err(StorageError::Io(e)) if e.kind() == ErrorKind::NotFound => StorageData::default(),
            Err(e) => {
                log::error!("loading store failed, falling back to defaults: {}", e);
                StorageData::default()
            }
        }
    }

    fn read_envelope(&self) -> Result<StorageData, StorageError> {
        let content = std::fs::read_to_string(&self.path)?;
        let raw: RawEnvelope = serde_json::from_str(&content)?;
        Ok(raw.normalize(crate::core::now()))
    }

    /// Merge the patch over the currently stored envelope and write the
    /// union, with the version pinned to the current schema.
    pub fn save(&self, patch: StoragePatch) {
        let mut data = self.load();
        if let Some(profile) = patch.profile {
            data.profile = profile;
        }
        if let Some(goals) = patch.goals {
            data.goals = goals;
        }
        if let Some(settings) = patch.settings {
            data.settings = settings;
        }
        data.version = SCHEMA_VERSION;
        self.write(&data);
    }

    fn write(&self, data: &StorageData) {
        match serde_json::to_string_pretty(data) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&self.path, json) {
                    log::error!("failed to save store: {}", e);
                }
            }
            Err(e) => log::error!("failed to serialize store: {}", e),
        }
    }

    /// Serialize the full envelope for backup.
    pub fn export(&self) -> String {
        serde_json::to_string_pretty(&self.load()).unwrap_or_else(|e| {
            log::error!("failed to export store: {}", e);
            String::new()
        })
    }

    /// Restore an envelope from a backup string, running the same migration
    /// path as load. Returns false on malformed input or a failed write.
    pub fn import(&self, json: &str) -> bool {
        let raw: RawEnvelope = match serde_json::from_str(json) {
            Ok(raw) => raw,
            Err(e) => {
                log::error!("failed to import data: {}", e);
                return false;
            }
        };
        let mut data = raw.normalize(crate::core::now());
        data.version = SCHEMA_VERSION;
        match serde_json::to_string_pretty(&data) {
            Ok(json) => match std::fs::write(&self.path, json) {
                Ok(()) => true,
                Err(e) => {
                    log::error!("failed to write imported data: {}", e);
                    false
                }
            },
            Err(e) => {
                log::error!("failed to serialize imported data: {}", e);
                false
            }
        }
    }

    pub fn clear(&self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != ErrorKind::NotFound {
                log::error!("failed to clear store: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn scratch_storage(name: &str) -> Storage {
        let path = std::env::temp_dir().join(format!(
            "memento-{}-{}.json",
            name,
            crate::core::goal::new_id()
        ));
        Storage::new(path)
    }

    fn sample_goal() -> Goal {
        Goal::new(
            "Visit Japan",
            NaiveDate::from_ymd_opt(2027, 4, 1)
                .unwrap()
                .and_hms_opt(23, 59, 59)
                .unwrap(),
        )
    }

    #[test]
    fn missing_file_loads_defaults() {
        let storage = scratch_storage("missing");
        let data = storage.load();
        assert_eq!(data, StorageData::default());
        assert_eq!(data.version, SCHEMA_VERSION);
    }

    #[test]
    fn corrupt_file_loads_defaults() {
        let storage = scratch_storage("corrupt");
        std::fs::write(storage.path(), "{not json").unwrap();
        assert_eq!(storage.load(), StorageData::default());
        storage.clear();
    }

    #[test]
    fn save_then_load_round_trips() {
        let storage = scratch_storage("roundtrip");
        let goal = sample_goal();
        storage.save(StoragePatch {
            goals: Some(vec![goal.clone()]),
            ..Default::default()
        });

        let data = storage.load();
        assert_eq!(data.goals, vec![goal]);
        assert_eq!(data.version, SCHEMA_VERSION);
        // untouched fields keep defaults
        assert!(data.profile.is_none());
        assert_eq!(data.settings, UserSettings::default());
        storage.clear();
    }

    #[test]
    fn partial_save_merges_over_current() {
        let storage = scratch_storage("merge");
        storage.save(StoragePatch {
            goals: Some(vec![sample_goal()]),
            ..Default::default()
        });
        storage.save(StoragePatch {
            settings: Some(UserSettings {
                theme_id: "midnight".into(),
                background_image: None,
            }),
            ..Default::default()
        });

        let data = storage.load();
        assert_eq!(data.goals.len(), 1);
        assert_eq!(data.settings.theme_id, "midnight");
        storage.clear();
    }

    #[test]
    fn load_migrates_legacy_goals() {
        let storage = scratch_storage("legacy");
        std::fs::write(
            storage.path(),
            r#"{
                "version": 1,
                "profile": null,
                "goals": [{
                    "id": "old-1",
                    "title": "Old goal",
                    "deadlineISO": "2027-01-01T23:59:59"
                }]
            }"#,
        )
        .unwrap();

        let data = storage.load();
        assert_eq!(data.goals.len(), 1);
        assert_eq!(data.goals[0].id, "old-1");
        assert!(data.goals[0].sub_goals.is_empty());
        assert_eq!(data.settings, UserSettings::default());
        storage.clear();
    }

    #[test]
    fn load_accepts_offset_aware_instants() {
        // Envelope shape written by older installations: luxon-style ISO
        // strings with Z or numeric offsets on every instant field.
        let storage = scratch_storage("offsets");
        std::fs::write(
            storage.path(),
            r#"{
                "version": 1,
                "profile": {
                    "birthDateISO": "1990-01-01T00:00:00Z",
                    "sex": "male",
                    "lifeExpectancyYears": 80
                },
                "goals": [{
                    "id": "old-2",
                    "title": "Offset deadline",
                    "deadlineISO": "2027-01-01T23:59:59.000+01:00",
                    "completedAtISO": null
                }]
            }"#,
        )
        .unwrap();

        let data = storage.load();
        // one bad-looking instant must not collapse the whole store
        assert!(data.profile.is_some());
        assert_eq!(data.goals.len(), 1);
        assert_eq!(data.goals[0].id, "old-2");
        assert!(data.goals[0].completed_at.is_none());
        storage.clear();
    }

    #[test]
    fn import_rejects_malformed_input() {
        let storage = scratch_storage("badimport");
        assert!(!storage.import("not json at all"));
        assert!(storage.load().goals.is_empty());
    }

    #[test]
    fn export_import_round_trips() {
        let storage = scratch_storage("export");
        storage.save(StoragePatch {
            goals: Some(vec![sample_goal()]),
            ..Default::default()
        });
        let exported = storage.export();
        let before = storage.load();

        let other = scratch_storage("import");
        assert!(other.import(&exported));
        assert_eq!(other.load(), before);

        storage.clear();
        other.clear();
    }
}
