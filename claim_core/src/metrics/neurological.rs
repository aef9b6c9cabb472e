//! Headache, seizure and peripheral-nerve aggregators.

use super::*;

fn is_prostrating(log: &SymptomLog, config: &AggregationConfig) -> bool {
    metadata_flag(log, "prostrating")
        || log
            .severity
            .is_some_and(|s| s >= config.prostrating_severity)
}

fn is_prolonged(log: &SymptomLog) -> bool {
    metadata_flag(log, "multiDay") || metadata_number(log, "durationHours").is_some_and(|h| h > 24.0)
}

fn has_economic_impact(log: &SymptomLog) -> bool {
    any_flag(log, &["missedWork", "leftWorkEarly"])
        || metadata_text(log, "workImpact").is_some_and(|t| !t.is_empty() && t != "none")
}

pub(super) fn migraine(input: &AggregationInput<'_>) -> Metrics {
    let logs = input.logs;
    let config = &input.config;
    let mut m = base_metrics(logs, input);

    let prostrating: Vec<&SymptomLog> = logs
        .iter()
        .copied()
        .filter(|l| is_prostrating(l, config))
        .collect();
    let prolonged = prostrating.iter().filter(|l| is_prolonged(l)).count();
    let economic = prostrating.iter().filter(|l| has_economic_impact(l)).count();

    m.set_count("totalAttacks", logs.len());
    m.set_count("prostratingAttacks", prostrating.len());
    m.set_number(
        "prostratingPerMonth",
        Some(per_month(prostrating.len(), &input.window)),
    );
    m.set_count("prolongedAttacks", prolonged);
    m.set_count("economicImpactAttacks", economic);
    m.set_count("undocumentedImpactAttacks", prostrating.len() - economic);

    let durations: Vec<f64> = logs
        .iter()
        .filter_map(|l| metadata_number(l, "durationHours"))
        .collect();
    m.set_number("avgDurationHours", mean(&durations));

    m
}

pub(super) fn seizures(input: &AggregationInput<'_>) -> Metrics {
    let logs = input.logs;
    let mut m = base_metrics(logs, input);

    let is_major = |l: &SymptomLog| {
        metadata_text(l, "seizureType").is_some_and(|t| t.eq_ignore_ascii_case("major"))
            || metadata_flag(l, "generalized")
            || is_symptom(l, &["seizure-major", "grand-mal"])
    };
    let major = logs.iter().filter(|l| is_major(l)).count();
    let minor = logs.len() - major;

    m.set_count("majorSeizures", major);
    m.set_count("minorSeizures", minor);
    m.set_number("majorPerMonth", Some(per_month(major, &input.window)));
    m.set_number("minorPerWeek", Some(per_week(minor, &input.window)));
    m
}

/// Logs explicitly tagged with another nerve are not this nerve's evidence.
pub(super) fn peripheral_nerve(input: &AggregationInput<'_>, nerve: &str) -> Metrics {
    let logs: Vec<&SymptomLog> = input
        .logs
        .iter()
        .copied()
        .filter(|l| metadata_text(l, "nerve").map_or(true, |n| n.eq_ignore_ascii_case(nerve)))
        .collect();
    let mut m = base_metrics(&logs, input);

    let atrophy = logs.iter().any(|l| metadata_flag(l, "muscleAtrophy"));
    let complete = logs.iter().any(|l| metadata_flag(l, "completeParalysis"));
    let severities: Vec<f64> = logs.iter().filter_map(|l| l.severity).collect();
    let avg = mean(&severities);

    let grade = if logs.is_empty() {
        None
    } else if complete {
        Some(5.0)
    } else if atrophy || avg.is_some_and(|a| a >= 8.0) {
        Some(4.0)
    } else if avg.is_some_and(|a| a >= 6.0) {
        Some(3.0)
    } else if avg.is_some_and(|a| a >= 4.0) {
        Some(2.0)
    } else {
        Some(1.0)
    };

    m.set_text("nerve", Some(nerve));
    m.set_number("impairmentGrade", grade);
    m.set_flag("atrophyDocumented", atrophy);
    m.set_flag("completeParalysis", complete);
    m
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    #[test]
    fn test_prostrating_by_flag_or_severity() {
        let logs = vec![
            SymptomLog::new("migraine", days_ago(1)).with_meta("prostrating", true),
            SymptomLog::new("migraine", days_ago(2)).with_severity(9.0),
            SymptomLog::new("migraine", days_ago(3)).with_severity(5.0),
        ];
        let m = run(Aggregator::Migraine, &["migraine"], &logs, &[], None, 30);
        assert_eq!(m.number("totalAttacks"), Some(3.0));
        assert_eq!(m.number("prostratingAttacks"), Some(2.0));
        assert_eq!(m.number("prostratingPerMonth"), Some(2.0));
        assert_eq!(m.number("undocumentedImpactAttacks"), Some(2.0));
    }

    #[test]
    fn test_prolonged_and_economic_impact() {
        let logs = vec![SymptomLog::new("migraine", days_ago(4))
            .with_meta("prostrating", true)
            .with_meta("durationHours", 30)
            .with_meta("workImpact", "missed shift")];
        let m = run(Aggregator::Migraine, &["migraine"], &logs, &[], None, 90);
        assert_eq!(m.number("prolongedAttacks"), Some(1.0));
        assert_eq!(m.number("economicImpactAttacks"), Some(1.0));
        assert_eq!(m.number("avgDurationHours"), Some(30.0));
    }

    #[test]
    fn test_seizure_split() {
        let logs = vec![
            SymptomLog::new("seizure", days_ago(1)).with_meta("seizureType", "major"),
            SymptomLog::new("seizure", days_ago(2)),
            SymptomLog::new("seizure", days_ago(3)),
        ];
        let m = run(Aggregator::Seizures, &["seizure"], &logs, &[], None, 30);
        assert_eq!(m.number("majorSeizures"), Some(1.0));
        assert_eq!(m.number("minorSeizures"), Some(2.0));
    }

    #[test]
    fn test_nerve_filter_and_grade() {
        let logs = vec![
            SymptomLog::new("radiculopathy", days_ago(1))
                .with_severity(7.0)
                .with_meta("nerve", "sciatic"),
            SymptomLog::new("radiculopathy", days_ago(2))
                .with_severity(2.0)
                .with_meta("nerve", "median"),
        ];
        let m = run(
            Aggregator::PeripheralNerve { nerve: "sciatic" },
            &["radiculopathy"],
            &logs,
            &[],
            None,
            30,
        );
        assert_eq!(m.number("logCount"), Some(1.0));
        assert_eq!(m.number("impairmentGrade"), Some(3.0));
        assert!(!m.flag("atrophyDocumented"));
    }

    #[test]
    fn test_nerve_grade_absent_without_logs() {
        let m = run(
            Aggregator::PeripheralNerve { nerve: "sciatic" },
            &["radiculopathy"],
            &[],
            &[],
            None,
            30,
        );
        assert_eq!(m.get("impairmentGrade"), Some(&MetricValue::Absent));
    }
}
