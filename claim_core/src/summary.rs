//! Per-body-system rollup for dashboards.

use crate::analysis::AnalysisResult;
use crate::BodySystem;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BodySystemSummary {
    pub body_system: String,
    pub conditions_with_data: usize,
    /// Diagnostic codes with data, in input order.
    pub diagnostic_codes: Vec<&'static str>,
}

/// Count conditions with data per body system. No rating logic.
pub fn summarize_by_body_system(results: &[AnalysisResult<'_>]) -> Vec<BodySystemSummary> {
    let mut by_system: BTreeMap<BodySystem, BodySystemSummary> = BTreeMap::new();
    for analysis in results.iter().filter_map(|r| r.analysis.as_ref()) {
        let entry = by_system
            .entry(analysis.body_system)
            .or_insert_with(|| BodySystemSummary {
                body_system: analysis.body_system.label().to_string(),
                ..Default::default()
            });
        entry.conditions_with_data += 1;
        entry.diagnostic_codes.push(analysis.diagnostic_code);
    }
    by_system.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{analyze_all, AnalysisOptions};
    use crate::SymptomLog;
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn test_counts_conditions_with_data() {
        let reference = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let logs = vec![
            SymptomLog::new("migraine", reference - Duration::days(2)),
            SymptomLog::new("tinnitus", reference - Duration::days(3)),
            SymptomLog::new("nightmares", reference - Duration::days(4)),
        ];
        let results = analyze_all(&logs, &[], &AnalysisOptions::new(90, reference));
        let summary = summarize_by_body_system(&results);

        let neuro = summary.iter().find(|s| s.body_system == "Neurological").unwrap();
        assert_eq!(neuro.conditions_with_data, 1);
        assert_eq!(neuro.diagnostic_codes, vec!["8100"]);

        let ear = summary.iter().find(|s| s.body_system == "Ear & Hearing").unwrap();
        assert_eq!(ear.diagnostic_codes, vec!["6260", "6205"]);

        let mental = summary.iter().find(|s| s.body_system == "Mental Health").unwrap();
        assert_eq!(mental.diagnostic_codes, vec!["9411"]);
        assert!(summary.iter().all(|s| s.conditions_with_data > 0));
    }

    #[test]
    fn test_empty_results() {
        assert!(summarize_by_body_system(&[]).is_empty());
    }
}
