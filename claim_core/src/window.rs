//! Evaluation-window filtering.
//!
//! Slices logs and measurements to the look-back period and to the
//! identifiers a condition tracks. This is the only place the legacy symptom
//! identifier alias is consulted.

use crate::{Measurement, SymptomLog};
use chrono::{DateTime, Duration, FixedOffset, Utc};

const SECONDS_PER_DAY: i64 = 86_400;

/// Look-back period ending at a reference instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EvaluationWindow {
    pub days: u32,
    pub reference_time: DateTime<Utc>,
}

impl EvaluationWindow {
    pub fn new(days: u32, reference_time: DateTime<Utc>) -> Self {
        Self {
            days,
            reference_time,
        }
    }

    /// Earliest instant still inside the window (inclusive).
    pub fn cutoff(&self) -> DateTime<Utc> {
        self.reference_time - Duration::seconds(i64::from(self.days) * SECONDS_PER_DAY)
    }

    /// Both ends inclusive; records after the reference instant are outside.
    pub fn contains(&self, at: DateTime<FixedOffset>) -> bool {
        let at = at.with_timezone(&Utc);
        at >= self.cutoff() && at <= self.reference_time
    }

    /// Window length in 30-day months, never zero.
    pub fn months(&self) -> f64 {
        f64::from(self.days.max(1)) / 30.0
    }

    /// Window length in 365-day years, never zero.
    pub fn years(&self) -> f64 {
        f64::from(self.days.max(1)) / 365.0
    }

    /// Window length in weeks, never zero.
    pub fn weeks(&self) -> f64 {
        f64::from(self.days.max(1)) / 7.0
    }
}

/// A record the filter can place in time and match against a key set.
pub trait WindowRecord {
    fn occurred_at(&self) -> Option<DateTime<FixedOffset>>;

    /// Identifier matched against a condition's tracked keys.
    fn record_key(&self) -> Option<&str>;

    fn is_well_formed(&self) -> bool;
}

/// Resolve a log's symptom identifier.
///
/// `symptomId` wins; records written before the rename only carry `symptom`.
pub fn resolve_symptom_id(log: &SymptomLog) -> Option<&str> {
    log.symptom_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .or_else(|| log.symptom.as_deref().filter(|id| !id.is_empty()))
}

impl WindowRecord for SymptomLog {
    fn occurred_at(&self) -> Option<DateTime<FixedOffset>> {
        SymptomLog::occurred_at(self)
    }

    fn record_key(&self) -> Option<&str> {
        resolve_symptom_id(self)
    }

    fn is_well_formed(&self) -> bool {
        SymptomLog::is_well_formed(self)
    }
}

impl WindowRecord for Measurement {
    fn occurred_at(&self) -> Option<DateTime<FixedOffset>> {
        Measurement::occurred_at(self)
    }

    fn record_key(&self) -> Option<&str> {
        Some(self.measurement_type.as_str()).filter(|t| !t.is_empty())
    }

    fn is_well_formed(&self) -> bool {
        Measurement::is_well_formed(self)
    }
}

/// Keep records inside `window` whose key is in `keys` (when given).
///
/// Malformed records are dropped here so one bad entry cannot blank out a
/// condition's history.
pub fn filter_by_window<'r, R: WindowRecord>(
    records: &'r [R],
    keys: Option<&[&str]>,
    window: &EvaluationWindow,
) -> Vec<&'r R> {
    let mut excluded = 0usize;

    let kept: Vec<&R> = records
        .iter()
        .filter(|record| match keys {
            Some(keys) => record.record_key().is_some_and(|key| keys.contains(&key)),
            None => true,
        })
        .filter(|record| {
            if !record.is_well_formed() {
                excluded += 1;
                return false;
            }
            record.occurred_at().is_some_and(|at| window.contains(at))
        })
        .collect();

    if excluded > 0 {
        tracing::debug!("Excluded {} malformed records from window", excluded);
    }

    kept
}
