//! Metric aggregation.
//!
//! Each criteria table names an [`Aggregator`] that reduces the filtered logs
//! and measurements into a flat, ordered set of named [`Metrics`]. The
//! selector and rationale generator only ever read these metrics, so every
//! aggregator inserts every key it owns even for empty input: averages over
//! nothing are `Absent`, never `0`.
//!
//! "X days per Y" criteria count distinct calendar days (in the offset the
//! user logged in), never raw log counts.

mod cardiovascular;
mod digestive;
mod ear;
mod endocrine;
mod genitourinary;
mod infectious;
mod mental;
mod musculoskeletal;
mod neurological;
mod respiratory;
mod skin;

use crate::config::AggregationConfig;
use crate::window::{resolve_symptom_id, EvaluationWindow};
use crate::{ConditionProfile, Measurement, SymptomLog};
use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ============================================================================
// Metric values
// ============================================================================

/// One aggregated value.
#[derive(Clone, Debug, PartialEq)]
pub enum MetricValue {
    Count(u32),
    Number(f64),
    Flag(bool),
    Text(String),
    /// Nothing to aggregate, e.g. the mean of an empty set.
    Absent,
}

impl MetricValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetricValue::Count(n) => Some(f64::from(*n)),
            MetricValue::Number(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            MetricValue::Flag(b) => Some(*b),
            _ => None,
        }
    }

    /// True for a non-zero number, a set flag or non-empty text.
    pub fn is_positive(&self) -> bool {
        match self {
            MetricValue::Count(n) => *n > 0,
            MetricValue::Number(x) => *x > 0.0,
            MetricValue::Flag(b) => *b,
            MetricValue::Text(s) => !s.is_empty(),
            MetricValue::Absent => false,
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Count(n) => write!(f, "{}", n),
            MetricValue::Number(x) => f.write_str(&format_number(*x)),
            MetricValue::Flag(true) => f.write_str("yes"),
            MetricValue::Flag(false) => f.write_str("no"),
            MetricValue::Text(s) => f.write_str(s),
            MetricValue::Absent => f.write_str("not recorded"),
        }
    }
}

impl Serialize for MetricValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            MetricValue::Count(n) => serializer.serialize_u32(*n),
            MetricValue::Number(x) => serializer.serialize_f64(*x),
            MetricValue::Flag(b) => serializer.serialize_bool(*b),
            MetricValue::Text(s) => serializer.serialize_str(s),
            MetricValue::Absent => serializer.serialize_none(),
        }
    }
}

/// Whole numbers without decimals, everything else to one place.
pub fn format_number(x: f64) -> String {
    if (x - x.round()).abs() < 1e-9 {
        format!("{:.0}", x)
    } else {
        format!("{:.1}", x)
    }
}

/// Named aggregates for one condition, ordered by name.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Metrics(BTreeMap<String, MetricValue>);

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&MetricValue> {
        self.0.get(key)
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(MetricValue::as_f64)
    }

    pub fn flag(&self, key: &str) -> bool {
        self.get(key).and_then(MetricValue::as_flag).unwrap_or(false)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetricValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn set(&mut self, key: impl Into<String>, value: MetricValue) {
        self.0.insert(key.into(), value);
    }

    pub fn set_count(&mut self, key: impl Into<String>, n: usize) {
        let n = u32::try_from(n).unwrap_or(u32::MAX);
        self.set(key, MetricValue::Count(n));
    }

    /// `None` and non-finite values are stored as `Absent`.
    pub fn set_number(&mut self, key: impl Into<String>, x: Option<f64>) {
        let value = match x {
            Some(x) if x.is_finite() => MetricValue::Number(x),
            _ => MetricValue::Absent,
        };
        self.set(key, value);
    }

    pub fn set_flag(&mut self, key: impl Into<String>, flag: bool) {
        self.set(key, MetricValue::Flag(flag));
    }

    pub fn set_text(&mut self, key: impl Into<String>, text: Option<&str>) {
        let value = match text {
            Some(t) if !t.is_empty() => MetricValue::Text(t.to_string()),
            _ => MetricValue::Absent,
        };
        self.set(key, value);
    }
}

// ============================================================================
// Aggregator registry
// ============================================================================

/// Everything an aggregator may read.
#[derive(Clone, Copy, Debug)]
pub struct AggregationInput<'a> {
    pub logs: &'a [&'a SymptomLog],
    pub measurements: &'a [&'a Measurement],
    pub profile: Option<&'a ConditionProfile>,
    pub symptom_ids: &'a [&'static str],
    pub window: EvaluationWindow,
    pub config: AggregationConfig,
}

/// Reducer family a condition's table is evaluated against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Aggregator {
    Symptoms,
    Migraine,
    Episodes,
    Seizures,
    PeripheralNerve {
        nerve: &'static str,
    },
    RangeOfMotion {
        measurement: &'static str,
        values: &'static [&'static str],
    },
    Hypertension,
    Cardiac,
    Diabetes,
    Thyroid,
    Respiratory,
    SleepApnea,
    Voiding,
    Renal,
    Malignancy,
    Skin,
    MentalHealth,
    Hearing,
    Hiv,
    Hepatic,
}

impl Aggregator {
    pub fn aggregate(&self, input: &AggregationInput<'_>) -> Metrics {
        match *self {
            Aggregator::Symptoms => base_metrics(input.logs, input),
            Aggregator::Migraine => neurological::migraine(input),
            Aggregator::Episodes => musculoskeletal::episodes(input),
            Aggregator::Seizures => neurological::seizures(input),
            Aggregator::PeripheralNerve { nerve } => neurological::peripheral_nerve(input, nerve),
            Aggregator::RangeOfMotion {
                measurement,
                values,
            } => musculoskeletal::range_of_motion(input, measurement, values),
            Aggregator::Hypertension => cardiovascular::hypertension(input),
            Aggregator::Cardiac => cardiovascular::cardiac(input),
            Aggregator::Diabetes => endocrine::diabetes(input),
            Aggregator::Thyroid => endocrine::thyroid(input),
            Aggregator::Respiratory => respiratory::pulmonary(input),
            Aggregator::SleepApnea => respiratory::sleep_apnea(input),
            Aggregator::Voiding => genitourinary::voiding(input),
            Aggregator::Renal => genitourinary::renal(input),
            Aggregator::Malignancy => genitourinary::malignancy(input),
            Aggregator::Skin => skin::skin(input),
            Aggregator::MentalHealth => mental::mental_health(input),
            Aggregator::Hearing => ear::hearing(input),
            Aggregator::Hiv => infectious::hiv(input),
            Aggregator::Hepatic => digestive::hepatic(input),
        }
    }
}

// ============================================================================
// Shared reducers
// ============================================================================

/// Calendar day of a log in the offset it was recorded with.
pub fn local_day(log: &SymptomLog) -> Option<NaiveDate> {
    log.occurred_at().map(|at| at.date_naive())
}

pub fn distinct_days<'a, I>(logs: I) -> BTreeSet<NaiveDate>
where
    I: IntoIterator<Item = &'a SymptomLog>,
{
    logs.into_iter().filter_map(local_day).collect()
}

/// Arithmetic mean; `None` for an empty set.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Median; `None` for an empty set.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// A run of consecutive qualifying days.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Episode {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Episode {
    pub fn length(&self) -> u32 {
        u32::try_from((self.end - self.start).num_days() + 1).unwrap_or(0)
    }
}

/// Collapse consecutive days into episodes.
pub fn collapse_episodes(days: &BTreeSet<NaiveDate>) -> Vec<Episode> {
    let mut episodes: Vec<Episode> = Vec::new();
    for &day in days {
        match episodes.last_mut() {
            Some(current) if current.end.succ_opt() == Some(day) => current.end = day,
            _ => episodes.push(Episode {
                start: day,
                end: day,
            }),
        }
    }
    episodes
}

pub fn per_month(count: usize, window: &EvaluationWindow) -> f64 {
    count as f64 / window.months()
}

pub fn per_week(count: usize, window: &EvaluationWindow) -> f64 {
    count as f64 / window.weeks()
}

/// Loose truthiness for UI-written metadata (`true`, `"yes"`, `1`).
pub fn value_flag(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|x| x != 0.0),
        Some(Value::String(s)) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "yes" | "y" | "1"
        ),
        _ => false,
    }
}

pub fn value_number(value: Option<&Value>) -> Option<f64> {
    let x = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (x.is_finite() && x >= 0.0).then_some(x)
}

pub fn metadata_flag(log: &SymptomLog, key: &str) -> bool {
    value_flag(log.metadata.get(key))
}

pub fn metadata_number(log: &SymptomLog, key: &str) -> Option<f64> {
    value_number(log.metadata.get(key))
}

pub fn metadata_text<'a>(log: &'a SymptomLog, key: &str) -> Option<&'a str> {
    log.metadata.get(key).and_then(Value::as_str)
}

/// True when any of `keys` is set on the log.
pub fn any_flag(log: &SymptomLog, keys: &[&str]) -> bool {
    keys.iter().any(|key| metadata_flag(log, key))
}

/// True when the log's resolved symptom id is one of `ids`.
pub fn is_symptom(log: &SymptomLog, ids: &[&str]) -> bool {
    resolve_symptom_id(log).is_some_and(|id| ids.contains(&id))
}

/// Most recent measurement of a type.
pub fn latest_measurement<'a>(
    measurements: &[&'a Measurement],
    measurement_type: &str,
) -> Option<&'a Measurement> {
    measurements
        .iter()
        .copied()
        .filter(|m| m.measurement_type == measurement_type)
        .filter_map(|m| m.occurred_at().map(|at| (at, m)))
        .max_by_key(|(at, _)| *at)
        .map(|(_, m)| m)
}

/// One field of the most recent measurement of a type.
pub fn latest_value(measurements: &[&Measurement], measurement_type: &str, key: &str) -> Option<f64> {
    latest_measurement(measurements, measurement_type).and_then(|m| m.value(key))
}

/// Every recorded value of one field across measurements of a type.
pub fn measurement_values(
    measurements: &[&Measurement],
    measurement_type: &str,
    key: &str,
) -> Vec<f64> {
    measurements
        .iter()
        .filter(|m| m.measurement_type == measurement_type)
        .filter_map(|m| m.value(key))
        .collect()
}

pub fn has_measurement(measurements: &[&Measurement], measurement_type: &str) -> bool {
    measurements
        .iter()
        .any(|m| m.measurement_type == measurement_type)
}

fn is_incapacitating(log: &SymptomLog) -> bool {
    any_flag(log, &["incapacitating", "bedRest", "prescribedBedRest"])
}

fn is_medication(log: &SymptomLog) -> bool {
    any_flag(log, &["medication", "medicationTaken", "continuousMedication"])
}

/// Metrics every aggregator starts from.
pub(crate) fn base_metrics(logs: &[&SymptomLog], input: &AggregationInput<'_>) -> Metrics {
    let config = &input.config;
    let window = &input.window;
    let mut m = Metrics::new();

    let days = distinct_days(logs.iter().copied());
    m.set_count("logCount", logs.len());
    m.set_count("symptomDays", days.len());
    m.set_number("symptomDaysPerMonth", Some(per_month(days.len(), window)));

    let severities: Vec<f64> = logs.iter().filter_map(|l| l.severity).collect();
    m.set_number("avgSeverity", mean(&severities));
    m.set_number("maxSeverity", severities.iter().copied().reduce(f64::max));
    m.set_count(
        "flareUps",
        severities
            .iter()
            .filter(|s| **s >= config.flare_severity)
            .count(),
    );

    let severe_days = distinct_days(
        logs.iter()
            .copied()
            .filter(|l| l.severity.is_some_and(|s| s >= config.severe_severity)),
    );
    m.set_count("severeDays", severe_days.len());
    m.set_number("severeDaysPerMonth", Some(per_month(severe_days.len(), window)));

    let episodes = collapse_episodes(&days);
    m.set_count(
        "longestStreak",
        episodes.iter().map(Episode::length).max().unwrap_or(0) as usize,
    );
    m.set_count("symptomEpisodes", episodes.len());
    m.set_number(
        "symptomEpisodesPerMonth",
        Some(per_month(episodes.len(), window)),
    );

    let kinds: BTreeSet<&str> = logs.iter().filter_map(|l| resolve_symptom_id(l)).collect();
    m.set_count("distinctSymptoms", kinds.len());

    let medication_days = distinct_days(logs.iter().copied().filter(|l| is_medication(l)));
    m.set_count("medicationDays", medication_days.len());

    let bilateral_days = distinct_days(logs.iter().copied().filter(|l| {
        metadata_flag(l, "bilateral") || metadata_text(l, "side") == Some("both")
    }));
    m.set_count("bilateralDays", bilateral_days.len());

    let documented_days = distinct_days(
        logs.iter()
            .copied()
            .filter(|l| any_flag(l, &["ecgDocumented", "clinicianDocumented"])),
    );
    m.set_count("clinicallyDocumentedDays", documented_days.len());

    m.set_flag(
        "treatmentRefractory",
        logs.iter().any(|l| any_flag(l, &["noRelief", "treatmentRefractory"])),
    );
    m.set_flag(
        "hasDiagnosis",
        input.profile.is_some_and(|p| p.has_diagnosis),
    );

    for id in input.symptom_ids {
        let count = distinct_days(logs.iter().copied().filter(|l| is_symptom(l, &[id]))).len();
        m.set_count(format!("days.{}", id), count);
    }

    m
}

/// Incapacitating-episode metrics shared by several families.
///
/// Consecutive incapacitating days form one episode; the remaining symptom
/// days collapse into non-incapacitating episodes.
pub(crate) fn incapacitation_metrics(
    logs: &[&SymptomLog],
    window: &EvaluationWindow,
    m: &mut Metrics,
) {
    let all_days = distinct_days(logs.iter().copied());
    let incapacitated = distinct_days(logs.iter().copied().filter(|l| is_incapacitating(l)));
    let other: BTreeSet<NaiveDate> = all_days.difference(&incapacitated).copied().collect();

    let episodes = collapse_episodes(&incapacitated);
    m.set_count("incapacitatingEpisodes", episodes.len());
    m.set_count("incapacitatingDays", incapacitated.len());
    let weeks = incapacitated.len() as f64 / 7.0;
    m.set_number("incapacitatingWeeks", Some(weeks));
    m.set_number("incapacitatingWeeksPerYear", Some(weeks / window.years()));
    m.set_number(
        "incapacitatingEpisodesPerMonth",
        Some(per_month(episodes.len(), window)),
    );
    m.set_count("nonIncapacitatingEpisodes", collapse_episodes(&other).len());
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    pub fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    pub fn days_ago(days: i64) -> DateTime<Utc> {
        reference() - Duration::days(days)
    }

    pub fn window(days: u32) -> EvaluationWindow {
        EvaluationWindow::new(days, reference())
    }

    /// Run an aggregator over owned records.
    pub fn run(
        aggregator: Aggregator,
        symptom_ids: &[&'static str],
        logs: &[SymptomLog],
        measurements: &[Measurement],
        profile: Option<&ConditionProfile>,
        days: u32,
    ) -> Metrics {
        let log_refs: Vec<&SymptomLog> = logs.iter().collect();
        let measurement_refs: Vec<&Measurement> = measurements.iter().collect();
        let input = AggregationInput {
            logs: &log_refs,
            measurements: &measurement_refs,
            profile,
            symptom_ids,
            window: window(days),
            config: AggregationConfig::default(),
        };
        aggregator.aggregate(&input)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_mean_of_empty_is_absent() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[2.0, 4.0]), Some(3.0));

        let metrics = run(Aggregator::Symptoms, &["tinnitus"], &[], &[], None, 90);
        assert_eq!(metrics.get("avgSeverity"), Some(&MetricValue::Absent));
        assert_eq!(metrics.number("logCount"), Some(0.0));
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn test_days_are_distinct_not_raw_counts() {
        let logs = vec![
            SymptomLog::new("tinnitus", days_ago(1)),
            SymptomLog::new("tinnitus", days_ago(1) + chrono::Duration::hours(2)),
            SymptomLog::new("tinnitus", days_ago(3)),
        ];
        let metrics = run(Aggregator::Symptoms, &["tinnitus"], &logs, &[], None, 30);
        assert_eq!(metrics.number("logCount"), Some(3.0));
        assert_eq!(metrics.number("symptomDays"), Some(2.0));
        assert_eq!(metrics.number("days.tinnitus"), Some(2.0));
    }

    #[test]
    fn test_consecutive_days_collapse_into_episodes() {
        let day = |d: u32| NaiveDate::from_ymd_opt(2024, 5, d).unwrap();
        let days: BTreeSet<NaiveDate> = [1, 2, 3, 5, 7, 8].into_iter().map(day).collect();
        let episodes = collapse_episodes(&days);
        assert_eq!(episodes.len(), 3);
        assert_eq!(episodes[0].length(), 3);
        assert_eq!(episodes[1].length(), 1);
        assert_eq!(episodes[2].length(), 2);
    }

    #[test]
    fn test_incapacitating_streak_is_one_episode() {
        let logs: Vec<SymptomLog> = (10..15)
            .map(|d| SymptomLog::new("back-pain", days_ago(d)).with_meta("incapacitating", true))
            .chain(std::iter::once(SymptomLog::new("back-pain", days_ago(40))))
            .collect();
        let metrics = run(Aggregator::Episodes, &["back-pain"], &logs, &[], None, 90);
        assert_eq!(metrics.number("incapacitatingEpisodes"), Some(1.0));
        assert_eq!(metrics.number("incapacitatingDays"), Some(5.0));
        assert_eq!(metrics.number("nonIncapacitatingEpisodes"), Some(1.0));
    }

    #[test]
    fn test_incapacitating_weeks_scale_to_a_year() {
        let logs: Vec<SymptomLog> = (0..14)
            .map(|d| SymptomLog::new("back-pain", days_ago(d)).with_meta("bedRest", true))
            .collect();
        let year = run(Aggregator::Episodes, &["back-pain"], &logs, &[], None, 365);
        assert_eq!(year.number("incapacitatingWeeks"), Some(2.0));
        assert_eq!(year.number("incapacitatingWeeksPerYear"), Some(2.0));

        let quarter = run(Aggregator::Episodes, &["back-pain"], &logs, &[], None, 73);
        assert_eq!(quarter.number("incapacitatingWeeks"), Some(2.0));
        assert_eq!(quarter.number("incapacitatingWeeksPerYear"), Some(10.0));
    }

    #[test]
    fn test_metadata_truthiness() {
        assert!(value_flag(Some(&Value::from(true))));
        assert!(value_flag(Some(&Value::from("Yes"))));
        assert!(value_flag(Some(&Value::from(1))));
        assert!(!value_flag(Some(&Value::from("no"))));
        assert!(!value_flag(None));
        assert_eq!(value_number(Some(&Value::from("36"))), Some(36.0));
        assert_eq!(value_number(Some(&Value::from(-2))), None);
    }

    #[test]
    fn test_latest_measurement_by_time() {
        let older = Measurement::new("skin-bsa", days_ago(20)).with_value("percent", 10.0);
        let newer = Measurement::new("skin-bsa", days_ago(2)).with_value("percent", 25.0);
        let refs = vec![&newer, &older];
        let latest = latest_measurement(&refs, "skin-bsa").unwrap();
        assert_eq!(latest.value("percent"), Some(25.0));
    }

    #[test]
    fn test_metric_value_display() {
        assert_eq!(MetricValue::Number(2.0).to_string(), "2");
        assert_eq!(MetricValue::Number(2.25).to_string(), "2.2");
        assert_eq!(MetricValue::Absent.to_string(), "not recorded");
        assert_eq!(
            serde_json::to_string(&MetricValue::Absent).unwrap(),
            "null"
        );
    }
}
