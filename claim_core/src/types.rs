//! Core domain types for the claim evidence engine.
//!
//! This module defines the fundamental types used throughout the system:
//! - Symptom logs and measurements as produced by the logging UI
//! - Per-condition profiles supplied by the profile store
//! - Rating outcomes and body systems shared by the criteria tables

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Highest severity on the logging UI's ordinal scale.
pub const MAX_SEVERITY: f64 = 10.0;

// ============================================================================
// Timestamps
// ============================================================================

/// A timestamp exactly as stored by the logging UI.
///
/// Older exports stored epoch milliseconds, newer ones ISO strings. Parsing is
/// deferred so that one unreadable value only excludes its own record.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RawTimestamp {
    Millis(i64),
    Text(String),
}

impl RawTimestamp {
    /// Parse into a zoned instant, keeping the offset the user logged in.
    pub fn parse(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            RawTimestamp::Millis(ms) => {
                DateTime::<Utc>::from_timestamp_millis(*ms).map(|t| t.fixed_offset())
            }
            RawTimestamp::Text(text) => parse_timestamp(text),
        }
    }
}

impl From<DateTime<Utc>> for RawTimestamp {
    fn from(value: DateTime<Utc>) -> Self {
        RawTimestamp::Text(value.to_rfc3339())
    }
}

impl From<DateTime<FixedOffset>> for RawTimestamp {
    fn from(value: DateTime<FixedOffset>) -> Self {
        RawTimestamp::Text(value.to_rfc3339())
    }
}

/// Parse the textual timestamp shapes found in stored records.
///
/// Accepts RFC 3339, naive ISO date-times (UTC) and bare dates (midnight UTC).
pub fn parse_timestamp(text: &str) -> Option<DateTime<FixedOffset>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt);
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc().fixed_offset());
        }
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
}

/// Record ids were numbers in early exports and strings later.
fn deserialize_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn finite_non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

// ============================================================================
// Records
// ============================================================================

/// A dated symptom event.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SymptomLog {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symptom_id: Option<String>,

    /// Identifier field used before the `symptomId` rename. Historical
    /// records are never rewritten, so this is read forever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symptom: Option<String>,

    #[serde(default)]
    pub timestamp: Option<RawTimestamp>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<f64>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl SymptomLog {
    /// Create a log with a fresh id.
    pub fn new(symptom_id: impl Into<String>, occurred_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            symptom_id: Some(symptom_id.into()),
            timestamp: Some(occurred_at.into()),
            ..Self::default()
        }
    }

    pub fn with_severity(mut self, severity: f64) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// When the symptom happened, if the stored timestamp is readable.
    pub fn occurred_at(&self) -> Option<DateTime<FixedOffset>> {
        self.timestamp.as_ref().and_then(RawTimestamp::parse)
    }

    /// False for records the engine must exclude rather than trust.
    pub fn is_well_formed(&self) -> bool {
        let severity_ok = self
            .severity
            .map_or(true, |s| finite_non_negative(s) && s <= MAX_SEVERITY);
        severity_ok && self.occurred_at().is_some()
    }
}

/// A typed numeric reading such as blood pressure or HbA1c.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: String,

    #[serde(default)]
    pub measurement_type: String,

    #[serde(default)]
    pub timestamp: Option<RawTimestamp>,

    #[serde(default)]
    pub values: BTreeMap<String, f64>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Measurement {
    /// Create a measurement with a fresh id.
    pub fn new(measurement_type: impl Into<String>, taken_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            measurement_type: measurement_type.into(),
            timestamp: Some(taken_at.into()),
            ..Self::default()
        }
    }

    pub fn with_value(mut self, key: impl Into<String>, value: f64) -> Self {
        self.values.insert(key.into(), value);
        self
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn occurred_at(&self) -> Option<DateTime<FixedOffset>> {
        self.timestamp.as_ref().and_then(RawTimestamp::parse)
    }

    pub fn value(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    pub fn is_well_formed(&self) -> bool {
        !self.measurement_type.is_empty()
            && self.values.values().all(|v| finite_non_negative(*v))
            && self.occurred_at().is_some()
    }
}

// ============================================================================
// Profiles
// ============================================================================

/// Non-log context for a condition, edited outside the engine.
///
/// Only the named fields are interpreted; anything else is carried verbatim.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConditionProfile {
    #[serde(default)]
    pub has_diagnosis: bool,

    #[serde(default)]
    pub uses_breathing_device: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_type: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

// ============================================================================
// Rating outcomes
// ============================================================================

/// One supported rating, numeric or sentinel.
///
/// The sentinels are shared by every table rather than spelled per condition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RatingOutcome {
    Percent(u8),
    /// Inclusive span driven by a continuous metric.
    Range(u8, u8),
    RequiresEvaluation,
    ClinicalDiagnosisRequired,
    Residuals,
}

impl RatingOutcome {
    /// Ordering key used to compare tiers and competing tables.
    ///
    /// Sentinels rank below every numeric outcome, including 0%.
    pub fn rank(&self) -> i32 {
        match self {
            RatingOutcome::Percent(p) => i32::from(*p),
            RatingOutcome::Range(low, _) => i32::from(*low),
            _ => -1,
        }
    }

    /// Whether a schedule percent falls under this outcome, for highlighting.
    pub fn covers(&self, percent: u8) -> bool {
        match self {
            RatingOutcome::Percent(p) => *p == percent,
            RatingOutcome::Range(low, high) => (*low..=*high).contains(&percent),
            _ => false,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.rank() < 0
    }

    pub fn is_compensable(&self) -> bool {
        self.rank() > 0
    }
}

impl fmt::Display for RatingOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RatingOutcome::Percent(p) => write!(f, "{}", p),
            RatingOutcome::Range(low, high) => write!(f, "{}-{}", low, high),
            RatingOutcome::RequiresEvaluation => write!(f, "Requires Evaluation"),
            RatingOutcome::ClinicalDiagnosisRequired => write!(f, "Clinical Diagnosis Required"),
            RatingOutcome::Residuals => write!(f, "Residuals"),
        }
    }
}

impl Serialize for RatingOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ============================================================================
// Body systems
// ============================================================================

/// Grouping used for UI badges and the summary command.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "camelCase")]
pub enum BodySystem {
    Musculoskeletal,
    Neurological,
    MentalHealth,
    Cardiovascular,
    Respiratory,
    Digestive,
    Genitourinary,
    Endocrine,
    Skin,
    Ear,
    Infectious,
    Gynecological,
}

impl BodySystem {
    pub fn label(&self) -> &'static str {
        match self {
            BodySystem::Musculoskeletal => "Musculoskeletal",
            BodySystem::Neurological => "Neurological",
            BodySystem::MentalHealth => "Mental Health",
            BodySystem::Cardiovascular => "Cardiovascular",
            BodySystem::Respiratory => "Respiratory",
            BodySystem::Digestive => "Digestive",
            BodySystem::Genitourinary => "Genitourinary",
            BodySystem::Endocrine => "Endocrine",
            BodySystem::Skin => "Skin",
            BodySystem::Ear => "Ear & Hearing",
            BodySystem::Infectious => "Infectious & Immune",
            BodySystem::Gynecological => "Gynecological",
        }
    }
}

impl fmt::Display for BodySystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_timestamp_shapes() {
        assert!(parse_timestamp("2024-03-01T08:30:00Z").is_some());
        assert!(parse_timestamp("2024-03-01T08:30:00-05:00").is_some());
        assert!(parse_timestamp("2024-03-01T08:30:00.123").is_some());
        assert!(parse_timestamp("2024-03-01").is_some());
        assert!(parse_timestamp("last tuesday").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn test_offset_is_preserved() {
        let ts = parse_timestamp("2024-03-01T23:30:00-05:00").unwrap();
        assert_eq!(ts.date_naive(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    #[test]
    fn test_log_deserializes_legacy_shape() {
        let json = r#"{"id": 1700000000000, "symptom": "migraine", "timestamp": 1700000000000, "severity": 6}"#;
        let log: SymptomLog = serde_json::from_str(json).unwrap();
        assert_eq!(log.id, "1700000000000");
        assert_eq!(log.symptom.as_deref(), Some("migraine"));
        assert!(log.symptom_id.is_none());
        assert!(log.occurred_at().is_some());
    }

    #[test]
    fn test_out_of_range_severity_is_not_well_formed() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert!(SymptomLog::new("migraine", at).with_severity(7.0).is_well_formed());
        assert!(!SymptomLog::new("migraine", at).with_severity(11.0).is_well_formed());
        assert!(!SymptomLog::new("migraine", at).with_severity(f64::NAN).is_well_formed());

        let mut unreadable = SymptomLog::new("migraine", at);
        unreadable.timestamp = Some(RawTimestamp::Text("soon".into()));
        assert!(!unreadable.is_well_formed());
    }

    #[test]
    fn test_measurement_rejects_negative_values() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let good = Measurement::new("blood-pressure", at).with_value("systolic", 140.0);
        let bad = Measurement::new("blood-pressure", at).with_value("systolic", -5.0);
        assert!(good.is_well_formed());
        assert!(!bad.is_well_formed());
    }

    #[test]
    fn test_outcome_display_and_coverage() {
        assert_eq!(RatingOutcome::Percent(50).to_string(), "50");
        assert_eq!(RatingOutcome::Range(20, 39).to_string(), "20-39");
        assert_eq!(
            RatingOutcome::RequiresEvaluation.to_string(),
            "Requires Evaluation"
        );

        let range = RatingOutcome::Range(20, 39);
        assert!(range.covers(20));
        assert!(range.covers(30));
        assert!(range.covers(39));
        assert!(!range.covers(40));
        assert!(!RatingOutcome::Residuals.covers(0));
    }

    #[test]
    fn test_sentinels_rank_below_zero_percent() {
        assert!(RatingOutcome::Percent(0).rank() > RatingOutcome::RequiresEvaluation.rank());
        assert!(RatingOutcome::Residuals.is_sentinel());
        assert!(!RatingOutcome::Percent(0).is_compensable());
        assert_eq!(
            serde_json::to_string(&RatingOutcome::Percent(30)).unwrap(),
            "\"30\""
        );
    }

    #[test]
    fn test_profile_keeps_unknown_fields() {
        let json = r#"{"hasDiagnosis": true, "usesBreathingDevice": true, "deviceType": "cpap", "since": "2019"}"#;
        let profile: ConditionProfile = serde_json::from_str(json).unwrap();
        assert!(profile.has_diagnosis);
        assert_eq!(profile.device_type.as_deref(), Some("cpap"));
        assert_eq!(profile.extra.get("since"), Some(&Value::from("2019")));
    }
}
