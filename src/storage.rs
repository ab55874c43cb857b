use crate::models::{EntryKey, Person, WeightEntry, WeightPoint};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info, warn};

pub const DEFAULT_DATA_PATH: &str = "data/weights.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("weight must be a positive finite number, got {0}")]
    InvalidWeight(f64),

    #[error("failed to read weight data from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse weight data in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write weight data to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode weight data: {0}")]
    Encode(#[from] serde_json::Error),
}

/// All recorded weights, one per person and day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredLog", into = "StoredLog")]
pub struct WeightLog {
    entries: BTreeMap<EntryKey, f64>,
}

impl WeightLog {
    /// Inserts or overwrites the weight for `person` on `date`, returning the
    /// weight it replaced.
    pub fn upsert(
        &mut self,
        person: Person,
        date: NaiveDate,
        weight: f64,
    ) -> Result<Option<f64>, StoreError> {
        validate_weight(weight)?;
        Ok(self.entries.insert(EntryKey::new(person, date), weight))
    }

    pub fn get(&self, key: EntryKey) -> Option<f64> {
        self.entries.get(&key).copied()
    }

    pub fn delete(&mut self, key: EntryKey) -> Option<f64> {
        self.entries.remove(&key)
    }

    /// The person's series, ascending by date.
    pub fn series(&self, person: Person) -> Vec<WeightPoint> {
        let first = EntryKey::new(person, NaiveDate::MIN);
        let last = EntryKey::new(person, NaiveDate::MAX);
        self.entries
            .range(first..=last)
            .map(|(key, weight)| WeightPoint::new(key.date, *weight))
            .collect()
    }

    pub fn entries(&self) -> impl Iterator<Item = WeightEntry> + '_ {
        self.entries.iter().map(|(key, weight)| WeightEntry {
            person: key.person,
            date: key.date,
            weight: *weight,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn validate_weight(weight: f64) -> Result<(), StoreError> {
    if weight.is_finite() && weight > 0.0 {
        Ok(())
    } else {
        Err(StoreError::InvalidWeight(weight))
    }
}

/// On-disk shape of the weight log.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoredLog {
    #[serde(default)]
    entries: Vec<WeightEntry>,
}

impl TryFrom<StoredLog> for WeightLog {
    type Error = StoreError;

    fn try_from(stored: StoredLog) -> Result<Self, Self::Error> {
        let mut log = WeightLog::default();
        for entry in stored.entries {
            log.upsert(entry.person, entry.date, entry.weight)?;
        }
        Ok(log)
    }
}

impl From<WeightLog> for StoredLog {
    fn from(log: WeightLog) -> Self {
        StoredLog {
            entries: log.entries().collect(),
        }
    }
}

/// Loads the log at `path`. A missing file is an empty log; anything else
/// that goes wrong is returned to the caller.
pub async fn load_data(path: &Path) -> Result<WeightLog, StoreError> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            info!(path = %path.display(), "no weight data yet, starting empty");
            return Ok(WeightLog::default());
        }
        Err(source) => {
            return Err(StoreError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let log: WeightLog = serde_json::from_slice(&bytes).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), entries = log.len(), "loaded weight data");
    Ok(log)
}

/// Writes the log next to `path` first and renames it into place.
pub async fn persist_data(path: &Path, log: &WeightLog) -> Result<(), StoreError> {
    let payload = serde_json::to_vec_pretty(log)?;
    let staging = staging_path(path);

    fs::write(&staging, payload)
        .await
        .map_err(|source| StoreError::Write {
            path: staging.clone(),
            source,
        })?;
    if let Err(source) = fs::rename(&staging, path).await {
        if let Err(err) = fs::remove_file(&staging).await {
            warn!(path = %staging.display(), %err, "failed to remove staging file");
        }
        return Err(StoreError::Write {
            path: path.to_path_buf(),
            source,
        });
    }

    debug!(path = %path.display(), entries = log.len(), "persisted weight data");
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "weights.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, d).unwrap()
    }

    fn temp_path(tag: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!(
            "weight_tracker_{tag}_{}_{}.json",
            std::process::id(),
            nanos
        ));
        path
    }

    #[test]
    fn upsert_overwrites_same_day() {
        let mut log = WeightLog::default();
        assert_eq!(log.upsert(Person::Me, day(3), 71.0).unwrap(), None);
        assert_eq!(log.upsert(Person::Me, day(3), 70.4).unwrap(), Some(71.0));

        assert_eq!(log.len(), 1);
        assert_eq!(log.series(Person::Me), vec![WeightPoint::new(day(3), 70.4)]);
    }

    #[test]
    fn upsert_rejects_non_positive_or_non_finite() {
        let mut log = WeightLog::default();
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                log.upsert(Person::Me, day(1), bad),
                Err(StoreError::InvalidWeight(_))
            ));
        }
        assert!(log.is_empty());
    }

    #[test]
    fn series_is_per_person_and_sorted() {
        let mut log = WeightLog::default();
        log.upsert(Person::Partner, day(9), 55.0).unwrap();
        log.upsert(Person::Me, day(5), 72.0).unwrap();
        log.upsert(Person::Me, day(2), 73.0).unwrap();
        log.upsert(Person::Partner, day(1), 56.0).unwrap();

        let dates: Vec<NaiveDate> = log.series(Person::Me).iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![day(2), day(5)]);
        let dates: Vec<NaiveDate> = log.series(Person::Partner).iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![day(1), day(9)]);
    }

    #[test]
    fn delete_removes_only_that_entry() {
        let mut log = WeightLog::default();
        log.upsert(Person::Me, day(1), 70.0).unwrap();
        log.upsert(Person::Partner, day(1), 55.0).unwrap();

        assert_eq!(log.delete(EntryKey::new(Person::Me, day(1))), Some(70.0));
        assert_eq!(log.delete(EntryKey::new(Person::Me, day(1))), None);
        assert_eq!(log.get(EntryKey::new(Person::Partner, day(1))), Some(55.0));
    }

    #[test]
    fn stored_duplicates_collapse_to_last() {
        let json = r#"{"entries":[
            {"person":"me","date":"2026-04-01","weight":70.0},
            {"person":"me","date":"2026-04-01","weight":69.5}
        ]}"#;
        let log: WeightLog = serde_json::from_str(json).unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log.get(EntryKey::new(Person::Me, day(1))), Some(69.5));
    }

    #[test]
    fn stored_invalid_weight_fails_to_parse() {
        let json = r#"{"entries":[{"person":"me","date":"2026-04-01","weight":-2.0}]}"#;
        assert!(serde_json::from_str::<WeightLog>(json).is_err());
    }

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let log = load_data(&temp_path("missing")).await.unwrap();
        assert!(log.is_empty());
    }

    #[tokio::test]
    async fn persist_then_load_restores_entries() {
        let path = temp_path("roundtrip");
        let mut log = WeightLog::default();
        log.upsert(Person::Me, day(1), 70.5).unwrap();
        log.upsert(Person::Partner, day(2), 54.2).unwrap();

        persist_data(&path, &log).await.unwrap();
        let loaded = load_data(&path).await.unwrap();
        assert_eq!(loaded, log);
        assert!(!staging_path(&path).exists());

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn corrupt_file_is_a_recoverable_error() {
        let path = temp_path("corrupt");
        std::fs::write(&path, b"{ not json").unwrap();

        let err = load_data(&path).await.unwrap_err();
        assert!(matches!(err, StoreError::Parse { .. }));
        assert!(err.to_string().contains(&path.display().to_string()));

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn persist_into_missing_directory_fails() {
        let mut path = temp_path("nodir");
        path.push("nested/weights.json");
        let err = persist_data(&path, &WeightLog::default()).await.unwrap_err();
        assert!(matches!(err, StoreError::Write { .. }));
    }

    #[tokio::test]
    async fn failed_rename_removes_staging_file() {
        let path = temp_path("occupied");
        std::fs::create_dir(&path).unwrap();

        let err = persist_data(&path, &WeightLog::default()).await.unwrap_err();
        assert!(matches!(err, StoreError::Write { .. }));
        assert!(!staging_path(&path).exists());

        let _ = std::fs::remove_dir(&path);
    }
}
