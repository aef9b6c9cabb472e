//! Cache keys for callers that memoize analyses.
//!
//! The engine itself never caches. A caller that does must key on everything
//! a result depends on: the records, the profiles and the window.

use crate::profile::ProfileBook;
use crate::window::EvaluationWindow;
use crate::{Measurement, Result, SymptomLog};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoKey {
    /// SHA-256 over the serialized records and profiles, hex encoded.
    pub digest: String,
    pub days: u32,
    pub reference_time: DateTime<Utc>,
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

impl MemoKey {
    pub fn new(
        logs: &[SymptomLog],
        measurements: &[Measurement],
        profiles: Option<&ProfileBook>,
        window: &EvaluationWindow,
    ) -> Result<Self> {
        let mut hasher = Sha256::new();
        for log in logs {
            hasher.update(serde_json::to_vec(log)?);
            hasher.update(b"\n");
        }
        hasher.update(b"--measurements--\n");
        for measurement in measurements {
            hasher.update(serde_json::to_vec(measurement)?);
            hasher.update(b"\n");
        }
        hasher.update(b"--profiles--\n");
        if let Some(profiles) = profiles {
            hasher.update(serde_json::to_vec(profiles)?);
        }

        Ok(Self {
            digest: to_hex(&hasher.finalize()),
            days: window.days,
            reference_time: window.reference_time,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn window(days: u32) -> EvaluationWindow {
        EvaluationWindow::new(days, Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap())
    }

    #[test]
    fn test_same_inputs_same_key() {
        let logs = vec![SymptomLog::new("migraine", window(90).reference_time)];
        let a = MemoKey::new(&logs, &[], None, &window(90)).unwrap();
        let b = MemoKey::new(&logs, &[], None, &window(90)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.digest.len(), 64);
    }

    #[test]
    fn test_any_input_changes_key() {
        let logs = vec![SymptomLog::new("migraine", window(90).reference_time)];
        let base = MemoKey::new(&logs, &[], None, &window(90)).unwrap();

        assert_ne!(base, MemoKey::new(&logs, &[], None, &window(30)).unwrap());
        assert_ne!(base, MemoKey::new(&[], &[], None, &window(90)).unwrap());

        let mut book = ProfileBook::new();
        book.entry("6847").has_diagnosis = true;
        assert_ne!(base, MemoKey::new(&logs, &[], Some(&book), &window(90)).unwrap());
    }
}
