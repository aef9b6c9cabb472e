//! File-backed record store.
//!
//! Logs and measurements are appended to JSON Lines files under the data
//! directory with file locking. Readers skip lines they cannot parse instead
//! of failing the whole history.

use crate::{Error, Measurement, Result, SymptomLog};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const SYMPTOM_LOGS_FILE: &str = "symptom_logs.jsonl";
pub const MEASUREMENTS_FILE: &str = "measurements.jsonl";
pub const CHRONIC_SYMPTOMS_FILE: &str = "chronic_symptoms.json";

/// Read access to recorded history.
pub trait LogRepository {
    fn symptom_logs(&self) -> Result<Vec<SymptomLog>>;

    /// Symptom ids the user tracks as ongoing.
    fn chronic_symptoms(&self) -> Result<Vec<String>>;

    /// Measurements, optionally restricted to one type.
    fn measurements(&self, measurement_type: Option<&str>) -> Result<Vec<Measurement>>;
}

/// Append-only record sink.
pub trait RecordSink {
    fn append_log(&mut self, log: &SymptomLog) -> Result<()>;
    fn append_measurement(&mut self, measurement: &Measurement) -> Result<()>;
}

/// Counts from one import.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub logs: usize,
    pub measurements: usize,
    pub skipped: usize,
}

/// Object-shaped export: `{"symptomLogs": [...], "measurements": [...]}`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExportBundle {
    #[serde(default)]
    symptom_logs: Vec<Value>,
    #[serde(default)]
    measurements: Vec<Value>,
    #[serde(default)]
    chronic_symptoms: Vec<String>,
}

/// JSONL store rooted at a data directory.
#[derive(Clone, Debug)]
pub struct JsonlStore {
    dir: PathBuf,
}

impl JsonlStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn logs_path(&self) -> PathBuf {
        self.dir.join(SYMPTOM_LOGS_FILE)
    }

    pub fn measurements_path(&self) -> PathBuf {
        self.dir.join(MEASUREMENTS_FILE)
    }

    pub fn chronic_symptoms_path(&self) -> PathBuf {
        self.dir.join(CHRONIC_SYMPTOMS_FILE)
    }

    /// Replace the chronic symptom list atomically.
    pub fn set_chronic_symptoms(&self, ids: &[String]) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.chronic_symptoms_path();
        let temp = NamedTempFile::new_in(&self.dir)?;
        temp.as_file().lock_exclusive()?;
        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            serde_json::to_writer(&mut writer, ids)?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;
        temp.persist(&path).map_err(|e| Error::Io(e.error))?;
        tracing::debug!("Saved {} chronic symptoms", ids.len());
        Ok(())
    }

    /// Import a JSON export from the logging app.
    ///
    /// Accepts a bare array (items with `measurementType` are measurements,
    /// the rest symptom logs) or an object with `symptomLogs`,
    /// `measurements` and `chronicSymptoms` arrays. Items that do not
    /// deserialize are skipped and counted.
    pub fn import_json(&mut self, path: &Path) -> Result<ImportSummary> {
        let mut contents = String::new();
        File::open(path)?.read_to_string(&mut contents)?;

        let bundle = match serde_json::from_str::<Value>(&contents)? {
            Value::Array(items) => {
                let (measurements, symptom_logs): (Vec<Value>, Vec<Value>) = items
                    .into_iter()
                    .partition(|item| item.get("measurementType").is_some());
                ExportBundle {
                    symptom_logs,
                    measurements,
                    chronic_symptoms: Vec::new(),
                }
            }
            object @ Value::Object(_) => serde_json::from_value(object)?,
            _ => {
                return Err(Error::Other(format!(
                    "{:?} is neither a JSON array nor an export object",
                    path
                )))
            }
        };

        let mut summary = ImportSummary::default();
        for item in bundle.symptom_logs {
            match serde_json::from_value::<SymptomLog>(item) {
                Ok(log) => {
                    self.append_log(&log)?;
                    summary.logs += 1;
                }
                Err(e) => {
                    tracing::warn!("Skipping symptom log in {:?}: {}", path, e);
                    summary.skipped += 1;
                }
            }
        }
        for item in bundle.measurements {
            match serde_json::from_value::<Measurement>(item) {
                Ok(measurement) => {
                    self.append_measurement(&measurement)?;
                    summary.measurements += 1;
                }
                Err(e) => {
                    tracing::warn!("Skipping measurement in {:?}: {}", path, e);
                    summary.skipped += 1;
                }
            }
        }
        if !bundle.chronic_symptoms.is_empty() {
            let mut chronic = self.chronic_symptoms()?;
            for id in bundle.chronic_symptoms {
                if !chronic.contains(&id) {
                    chronic.push(id);
                }
            }
            self.set_chronic_symptoms(&chronic)?;
        }

        tracing::info!(
            "Imported {} logs and {} measurements from {:?} ({} skipped)",
            summary.logs,
            summary.measurements,
            path,
            summary.skipped
        );
        Ok(summary)
    }
}

fn append_line<T: Serialize>(path: &Path, record: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    file.lock_exclusive()?;

    let mut writer = std::io::BufWriter::new(&file);
    let line = serde_json::to_string(record)?;
    writer.write_all(line.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    drop(writer);

    file.unlock()?;
    Ok(())
}

/// Read every parseable line of a JSONL file; missing file is empty.
pub fn read_jsonl<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut records = Vec::new();
    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<T>(&line) {
            Ok(record) => records.push(record),
            Err(e) => tracing::warn!("Skipping {:?} line {}: {}", path, line_num + 1, e),
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} records from {:?}", records.len(), path);
    Ok(records)
}

impl RecordSink for JsonlStore {
    fn append_log(&mut self, log: &SymptomLog) -> Result<()> {
        append_line(&self.logs_path(), log)?;
        tracing::debug!("Appended symptom log {}", log.id);
        Ok(())
    }

    fn append_measurement(&mut self, measurement: &Measurement) -> Result<()> {
        append_line(&self.measurements_path(), measurement)?;
        tracing::debug!("Appended {} measurement {}", measurement.measurement_type, measurement.id);
        Ok(())
    }
}

impl LogRepository for JsonlStore {
    fn symptom_logs(&self) -> Result<Vec<SymptomLog>> {
        read_jsonl(&self.logs_path())
    }

    fn chronic_symptoms(&self) -> Result<Vec<String>> {
        let path = self.chronic_symptoms_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let contents = std::fs::read_to_string(&path)?;
        match serde_json::from_str::<Vec<String>>(&contents) {
            Ok(ids) => Ok(ids),
            Err(e) => {
                tracing::warn!("Failed to parse {:?}: {}. Treating as empty.", path, e);
                Ok(Vec::new())
            }
        }
    }

    fn measurements(&self, measurement_type: Option<&str>) -> Result<Vec<Measurement>> {
        let mut all: Vec<Measurement> = read_jsonl(&self.measurements_path())?;
        if let Some(wanted) = measurement_type {
            all.retain(|m| m.measurement_type == wanted);
        }
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_append_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonlStore::new(dir.path());

        let log = SymptomLog::new("migraine", Utc::now()).with_severity(7.0);
        store.append_log(&log).unwrap();
        store
            .append_measurement(
                &Measurement::new("blood-pressure", Utc::now())
                    .with_value("systolic", 150.0)
                    .with_value("diastolic", 95.0),
            )
            .unwrap();
        store
            .append_measurement(&Measurement::new("glucose", Utc::now()).with_value("value", 120.0))
            .unwrap();

        let logs = store.symptom_logs().unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].id, log.id);
        assert_eq!(store.measurements(None).unwrap().len(), 2);
        assert_eq!(store.measurements(Some("glucose")).unwrap().len(), 1);
    }

    #[test]
    fn test_corrupt_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonlStore::new(dir.path());
        store.append_log(&SymptomLog::new("migraine", Utc::now())).unwrap();
        {
            let mut file = OpenOptions::new().append(true).open(store.logs_path()).unwrap();
            writeln!(file, "{{ truncated").unwrap();
        }
        store.append_log(&SymptomLog::new("migraine", Utc::now())).unwrap();

        assert_eq!(store.symptom_logs().unwrap().len(), 2);
    }

    #[test]
    fn test_missing_files_are_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonlStore::new(dir.path().join("nothing-here"));
        assert!(store.symptom_logs().unwrap().is_empty());
        assert!(store.measurements(None).unwrap().is_empty());
        assert!(store.chronic_symptoms().unwrap().is_empty());
    }

    #[test]
    fn test_import_array_export() {
        let dir = tempfile::tempdir().unwrap();
        let export = dir.path().join("export.json");
        std::fs::write(
            &export,
            r#"[
                {"id": 17, "symptom": "migraine", "timestamp": 1717200000000, "severity": 8},
                {"id": "a", "symptomId": "tinnitus", "timestamp": "2024-05-30"},
                {"id": "b", "measurementType": "blood-pressure", "timestamp": "2024-05-30T08:00:00Z",
                 "values": {"systolic": 150, "diastolic": 100}},
                {"id": "c", "measurementType": "glucose", "values": {"value": "high"}}
            ]"#,
        )
        .unwrap();

        let mut store = JsonlStore::new(dir.path().join("data"));
        let summary = store.import_json(&export).unwrap();
        assert_eq!(
            summary,
            ImportSummary {
                logs: 2,
                measurements: 1,
                skipped: 1
            }
        );

        let logs = store.symptom_logs().unwrap();
        assert_eq!(logs[0].id, "17");
        assert_eq!(logs[0].symptom.as_deref(), Some("migraine"));
    }

    #[test]
    fn test_import_bundle_merges_chronic_symptoms() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonlStore::new(dir.path());
        store.set_chronic_symptoms(&["tinnitus".to_string()]).unwrap();

        let export = dir.path().join("bundle.json");
        std::fs::write(
            &export,
            r#"{"symptomLogs": [{"symptomId": "back-pain", "timestamp": "2024-05-01"}],
                "chronicSymptoms": ["tinnitus", "back-pain"]}"#,
        )
        .unwrap();

        let summary = store.import_json(&export).unwrap();
        assert_eq!(summary.logs, 1);
        assert_eq!(
            store.chronic_symptoms().unwrap(),
            vec!["tinnitus".to_string(), "back-pain".to_string()]
        );
    }

    #[test]
    fn test_import_rejects_scalars() {
        let dir = tempfile::tempdir().unwrap();
        let export = dir.path().join("bad.json");
        std::fs::write(&export, "42").unwrap();
        let mut store = JsonlStore::new(dir.path());
        assert!(store.import_json(&export).is_err());
    }
}
