//! Analysis facade.
//!
//! `filter -> aggregate -> select -> explain` for one condition or for the
//! whole registry. Results are recomputed on every call and never stored.

use crate::config::AggregationConfig;
use crate::criteria::{self, ConditionCriteria};
use crate::metrics::{AggregationInput, Metrics};
use crate::profile::ProfileProvider;
use crate::rationale::explain;
use crate::selector::select_rating;
use crate::window::{filter_by_window, EvaluationWindow};
use crate::{BodySystem, Error, Measurement, RatingOutcome, Result, SymptomLog};
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const DEFAULT_EVALUATION_DAYS: u32 = 90;

/// Knobs for one analysis run.
#[derive(Clone, Copy)]
pub struct AnalysisOptions<'p> {
    pub days: u32,
    pub reference_time: DateTime<Utc>,
    pub profiles: Option<&'p dyn ProfileProvider>,
    pub aggregation: AggregationConfig,
}

impl Default for AnalysisOptions<'_> {
    fn default() -> Self {
        Self {
            days: DEFAULT_EVALUATION_DAYS,
            reference_time: Utc::now(),
            profiles: None,
            aggregation: AggregationConfig::default(),
        }
    }
}

impl<'p> AnalysisOptions<'p> {
    pub fn new(days: u32, reference_time: DateTime<Utc>) -> Self {
        Self {
            days,
            reference_time,
            ..Self::default()
        }
    }

    pub fn with_profiles(mut self, profiles: &'p dyn ProfileProvider) -> Self {
        self.profiles = Some(profiles);
        self
    }

    pub fn with_aggregation(mut self, aggregation: AggregationConfig) -> Self {
        self.aggregation = aggregation;
        self
    }

    pub fn window(&self) -> EvaluationWindow {
        EvaluationWindow::new(self.days, self.reference_time)
    }
}

/// Determination for a condition with data.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis<'c> {
    pub condition: &'static str,
    pub diagnostic_code: &'static str,
    pub body_system: BodySystem,
    pub supported_rating: RatingOutcome,
    #[serde(skip_serializing_if = "no_table")]
    pub governing_table: &'static str,
    pub rating_rationale: Vec<String>,
    pub evidence: Vec<String>,
    pub gaps: Vec<String>,
    pub metrics: Metrics,
    pub criteria: &'c ConditionCriteria,
    pub disclaimer: &'static str,
    pub evaluation_days: u32,
}

fn no_table(table: &&str) -> bool {
    table.is_empty()
}

/// `{"hasData": false}` or the flattened [`Analysis`].
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult<'c> {
    pub has_data: bool,
    #[serde(flatten)]
    pub analysis: Option<Analysis<'c>>,
}

impl<'c> AnalysisResult<'c> {
    pub fn no_data() -> Self {
        Self {
            has_data: false,
            analysis: None,
        }
    }

    pub fn supported_rating(&self) -> Option<RatingOutcome> {
        self.analysis.as_ref().map(|a| a.supported_rating)
    }
}

/// Analyze one condition.
pub fn analyze_condition<'c>(
    criteria: &'c ConditionCriteria,
    logs: &[SymptomLog],
    measurements: &[Measurement],
    options: &AnalysisOptions<'_>,
) -> AnalysisResult<'c> {
    let window = options.window();
    let code = criteria.diagnostic_code;

    let logs = filter_by_window(logs, Some(criteria.symptom_ids), &window);
    let measurements = if criteria.measurement_types.is_empty() {
        Vec::new()
    } else {
        filter_by_window(measurements, Some(criteria.measurement_types), &window)
    };
    let profile = if criteria.profile_aware {
        options.profiles.and_then(|p| p.profile(code))
    } else {
        None
    };

    let diagnosed = profile.as_ref().is_some_and(|p| p.has_diagnosis);
    if logs.is_empty() && measurements.is_empty() && !diagnosed {
        tracing::debug!("DC {}: no records in the last {} days", code, window.days);
        return AnalysisResult::no_data();
    }

    let input = AggregationInput {
        logs: &logs,
        measurements: &measurements,
        profile: profile.as_ref(),
        symptom_ids: criteria.symptom_ids,
        window,
        config: options.aggregation,
    };
    let metrics = criteria.aggregator.aggregate(&input);
    let selection = select_rating(&metrics, criteria);
    let explanation = explain(&metrics, &selection, criteria, &window);

    tracing::info!(
        "DC {} ({}): {} logs, {} measurements -> {}",
        code,
        criteria.name,
        logs.len(),
        measurements.len(),
        selection.outcome
    );

    AnalysisResult {
        has_data: true,
        analysis: Some(Analysis {
            condition: criteria.name,
            diagnostic_code: code,
            body_system: criteria.body_system,
            supported_rating: selection.outcome,
            governing_table: selection.table,
            rating_rationale: explanation.rationale,
            evidence: explanation.evidence,
            gaps: explanation.gaps,
            metrics,
            criteria,
            disclaimer: criteria.disclaimer,
            evaluation_days: window.days,
        }),
    }
}

/// Analyze a registered diagnostic code.
pub fn analyze(
    diagnostic_code: &str,
    logs: &[SymptomLog],
    measurements: &[Measurement],
    options: &AnalysisOptions<'_>,
) -> Result<AnalysisResult<'static>> {
    let criteria = criteria::get(diagnostic_code)
        .ok_or_else(|| Error::UnknownCondition(diagnostic_code.to_string()))?;
    Ok(analyze_condition(criteria, logs, measurements, options))
}

/// Analyze every registered condition, in registry order.
pub fn analyze_all(
    logs: &[SymptomLog],
    measurements: &[Measurement],
    options: &AnalysisOptions<'_>,
) -> Vec<AnalysisResult<'static>> {
    criteria::all()
        .iter()
        .map(|c| analyze_condition(c, logs, measurements, options))
        .collect()
}

macro_rules! condition_analyzers {
    ($($name:ident => $code:literal),* $(,)?) => {
        /// Codes with a named `analyze_*_logs` wrapper.
        pub const NAMED_ANALYZERS: &[&str] = &[$($code),*];

        $(
            #[doc = concat!("Analyze diagnostic code ", $code, ".")]
            pub fn $name(
                logs: &[SymptomLog],
                measurements: &[Measurement],
                options: &AnalysisOptions<'_>,
            ) -> Result<AnalysisResult<'static>> {
                analyze($code, logs, measurements, options)
            }
        )*
    };
}

condition_analyzers! {
    analyze_lumbosacral_strain_logs => "5237",
    analyze_spine_arthritis_logs => "5242",
    analyze_spinal_stenosis_logs => "5238",
    analyze_intervertebral_disc_logs => "5243",
    analyze_knee_flexion_logs => "5260",
    analyze_knee_extension_logs => "5261",
    analyze_knee_instability_logs => "5257",
    analyze_shoulder_logs => "5201",
    analyze_degenerative_arthritis_logs => "5003",
    analyze_ankle_logs => "5271",
    analyze_foot_injury_logs => "5284",
    analyze_flatfoot_logs => "5276",
    analyze_fibromyalgia_logs => "5025",
    analyze_hip_flexion_logs => "5252",
    analyze_migraine_logs => "8100",
    analyze_epilepsy_logs => "8910",
    analyze_sciatic_nerve_logs => "8520",
    analyze_peroneal_nerve_logs => "8521",
    analyze_femoral_nerve_logs => "8526",
    analyze_median_nerve_logs => "8515",
    analyze_ulnar_nerve_logs => "8516",
    analyze_radial_nerve_logs => "8514",
    analyze_upper_radicular_logs => "8510",
    analyze_trigeminal_nerve_logs => "8205",
    analyze_multiple_sclerosis_logs => "8018",
    analyze_parkinsons_logs => "8004",
    analyze_myasthenia_gravis_logs => "8025",
    analyze_ptsd_logs => "9411",
    analyze_major_depression_logs => "9434",
    analyze_generalized_anxiety_logs => "9400",
    analyze_bipolar_logs => "9432",
    analyze_schizophrenia_logs => "9201",
    analyze_anxiety_unspecified_logs => "9413",
    analyze_adjustment_disorder_logs => "9440",
    analyze_ocd_logs => "9404",
    analyze_hypertension_logs => "7101",
    analyze_coronary_artery_disease_logs => "7005",
    analyze_myocardial_infarction_logs => "7006",
    analyze_hypertensive_heart_disease_logs => "7007",
    analyze_cardiomyopathy_logs => "7020",
    analyze_arrhythmia_logs => "7010",
    analyze_varicose_veins_logs => "7120",
    analyze_asthma_logs => "6602",
    analyze_copd_logs => "6604",
    analyze_sleep_apnea_logs => "6847",
    analyze_sinusitis_logs => "6513",
    analyze_respiratory_cancer_logs => "6819",
    analyze_gerd_logs => "7346",
    analyze_ibs_logs => "7319",
    analyze_ulcerative_colitis_logs => "7323",
    analyze_hemorrhoids_logs => "7336",
    analyze_hepatitis_c_logs => "7354",
    analyze_chronic_liver_disease_logs => "7345",
    analyze_digestive_cancer_logs => "7343",
    analyze_voiding_dysfunction_logs => "7542",
    analyze_genitourinary_cancer_logs => "7528",
    analyze_erectile_dysfunction_logs => "7522",
    analyze_kidney_disease_logs => "7530",
    analyze_diabetes_logs => "7913",
    analyze_hypothyroidism_logs => "7903",
    analyze_hyperthyroidism_logs => "7900",
    analyze_eczema_logs => "7806",
    analyze_psoriasis_logs => "7816",
    analyze_dermatophytosis_logs => "7813",
    analyze_hearing_loss_logs => "6100",
    analyze_tinnitus_logs => "6260",
    analyze_vestibular_logs => "6204",
    analyze_menieres_logs => "6205",
    analyze_hiv_logs => "6351",
    analyze_chronic_fatigue_logs => "6354",
    analyze_endometriosis_logs => "7629",
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::pct;
    use crate::profile::ProfileBook;
    use crate::ConditionProfile;
    use chrono::{Duration, TimeZone};

    fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn options() -> AnalysisOptions<'static> {
        AnalysisOptions::new(90, reference())
    }

    fn days_ago(days: i64) -> DateTime<Utc> {
        reference() - Duration::days(days)
    }

    /// Ten migraine logs, six prostrating, prolonged and costing work.
    fn migraine_history() -> Vec<SymptomLog> {
        (0..10)
            .map(|i| {
                let log = SymptomLog::new("migraine", days_ago(i * 8 + 1)).with_severity(6.0);
                if i < 6 {
                    log.with_meta("prostrating", true)
                        .with_meta("durationHours", 30)
                        .with_meta("missedWork", true)
                } else {
                    log
                }
            })
            .collect()
    }

    #[test]
    fn test_migraine_fifty_percent() {
        let result = analyze_migraine_logs(&migraine_history(), &[], &options()).unwrap();
        let analysis = result.analysis.unwrap();

        assert_eq!(analysis.supported_rating, pct(50));
        assert!(analysis
            .evidence
            .contains(&"6 qualifying prostrating attacks in period".to_string()));
        assert!(analysis.gaps.is_empty());
        assert_eq!(analysis.governing_table, "General");
    }

    #[test]
    fn test_zero_logs_has_no_data() {
        let result = analyze("8100", &[], &[], &options()).unwrap();
        assert!(!result.has_data);
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            serde_json::json!({"hasData": false})
        );
    }

    #[test]
    fn test_out_of_window_logs_have_no_data() {
        let logs = vec![SymptomLog::new("migraine", days_ago(120)).with_meta("prostrating", true)];
        let result = analyze("8100", &logs, &[], &options()).unwrap();
        assert!(!result.has_data);
    }

    #[test]
    fn test_logs_after_reference_time_have_no_data() {
        let logs: Vec<SymptomLog> = (1..=6)
            .map(|i| {
                SymptomLog::new("migraine", days_ago(-10 * i))
                    .with_meta("prostrating", true)
                    .with_meta("durationHours", 30)
                    .with_meta("missedWork", true)
            })
            .collect();
        let result = analyze("8100", &logs, &[], &options()).unwrap();
        assert!(!result.has_data);
        assert_eq!(result.supported_rating(), None);
    }

    #[test]
    fn test_untracked_symptoms_have_no_data() {
        let logs = vec![SymptomLog::new("tinnitus", days_ago(1))];
        assert!(!analyze("8100", &logs, &[], &options()).unwrap().has_data);
    }

    #[test]
    fn test_unknown_code_is_an_error() {
        let err = analyze("1234", &[], &[], &options()).unwrap_err();
        assert!(matches!(err, Error::UnknownCondition(code) if code == "1234"));
    }

    #[test]
    fn test_sleep_apnea_device_profile_without_logs() {
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
        let options = options().with_profiles(&book);

        let result = analyze_sleep_apnea_logs(&[], &[], &options).unwrap();
        assert!(result.has_data);
        assert_eq!(result.supported_rating(), Some(pct(50)));

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["supportedRating"], "50");
        assert_eq!(json["diagnosticCode"], "6847");
    }

    #[test]
    fn test_profile_without_diagnosis_is_not_data() {
        let mut book = ProfileBook::new();
        book.insert(
            "6847",
            ConditionProfile {
                uses_breathing_device: true,
                ..Default::default()
            },
        );
        let options = options().with_profiles(&book);
        assert!(!analyze("6847", &[], &[], &options).unwrap().has_data);
    }

    #[test]
    fn test_bsa_boundary() {
        let at = |bsa: f64| {
            vec![Measurement::new("skin-bsa", days_ago(3)).with_value("percent", bsa)]
        };
        let rating = |bsa: f64| {
            analyze_eczema_logs(&[], &at(bsa), &options())
                .unwrap()
                .supported_rating()
                .map(|r| r.to_string())
        };
        assert_eq!(rating(39.0).as_deref(), Some("20-39"));
        assert_eq!(rating(40.0).as_deref(), Some("40-100"));
        assert_eq!(rating(4.0).as_deref(), Some("0-4"));
    }

    #[test]
    fn test_analysis_is_deterministic() {
        let logs = migraine_history();
        let first = serde_json::to_string(&analyze("8100", &logs, &[], &options()).unwrap()).unwrap();
        let second = serde_json::to_string(&analyze("8100", &logs, &[], &options()).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_more_evidence_never_lowers_rating() {
        let mut logs: Vec<SymptomLog> = Vec::new();
        let mut last = -1;
        for i in 0..8 {
            logs.push(
                SymptomLog::new("migraine", days_ago(i * 10 + 1))
                    .with_meta("prostrating", true)
                    .with_meta("durationHours", 36)
                    .with_meta("missedWork", true),
            );
            let rank = analyze("8100", &logs, &[], &options())
                .unwrap()
                .supported_rating()
                .map(|r| r.rank())
                .unwrap_or(-1);
            assert!(rank >= last, "adding log {} lowered the rating", i);
            last = rank;
        }
        assert_eq!(last, 50);
    }

    #[test]
    fn test_window_boundary_is_inclusive() {
        let edge = reference() - Duration::seconds(90 * 86_400);
        let logs = vec![SymptomLog::new("migraine", edge)];
        assert!(analyze("8100", &logs, &[], &options()).unwrap().has_data);

        let logs = vec![SymptomLog::new("migraine", edge - Duration::seconds(1))];
        assert!(!analyze("8100", &logs, &[], &options()).unwrap().has_data);
    }

    #[test]
    fn test_every_registered_code_has_a_named_analyzer() {
        let registered: Vec<&str> = criteria::all().iter().map(|c| c.diagnostic_code).collect();
        for code in &registered {
            assert!(NAMED_ANALYZERS.contains(code), "no analyzer for {}", code);
        }
        assert_eq!(NAMED_ANALYZERS.len(), registered.len());
    }

    #[test]
    fn test_analyze_all_follows_registry_order() {
        let results = analyze_all(&migraine_history(), &[], &options());
        assert_eq!(results.len(), criteria::all().len());
        let with_data: Vec<&str> = results
            .iter()
            .filter_map(|r| r.analysis.as_ref())
            .map(|a| a.diagnostic_code)
            .collect();
        assert_eq!(with_data, vec!["8100"]);
    }
}
