//! Diabetes and thyroid aggregators.

use super::*;

const HYPOGLYCEMIC_MG_DL: f64 = 70.0;

pub(super) fn diabetes(input: &AggregationInput<'_>) -> Metrics {
    let logs = input.logs;
    let measurements = input.measurements;
    let mut m = base_metrics(logs, input);

    let glucose = measurement_values(measurements, "glucose", "value");
    let hba1c = latest_value(measurements, "hba1c", "value");

    m.set_flag("usesInsulin", logs.iter().any(|l| metadata_flag(l, "insulin")));
    m.set_flag(
        "oralHypoglycemic",
        logs.iter().any(|l| metadata_flag(l, "oralHypoglycemic")),
    );
    m.set_flag(
        "restrictedDiet",
        logs.iter().any(|l| metadata_flag(l, "restrictedDiet")),
    );
    m.set_flag(
        "regulationOfActivities",
        logs.iter().any(|l| metadata_flag(l, "activityRegulation")),
    );

    // A low reading and a logged reaction on the same day are one event.
    let mut low_days = distinct_days(
        logs.iter()
            .copied()
            .filter(|l| is_symptom(l, &["hypoglycemia"]) || metadata_flag(l, "hypoglycemic")),
    );
    low_days.extend(
        measurements
            .iter()
            .filter(|r| r.measurement_type == "glucose")
            .filter(|r| r.value("value").is_some_and(|g| g < HYPOGLYCEMIC_MG_DL))
            .filter_map(|r| r.occurred_at().map(|at| at.date_naive())),
    );
    m.set_count("hypoglycemicDays", low_days.len());

    let hospital = distinct_days(logs.iter().copied().filter(|l| metadata_flag(l, "hospitalized")));
    m.set_count("hospitalizations", collapse_episodes(&hospital).len());

    let visits = distinct_days(logs.iter().copied().filter(|l| metadata_flag(l, "providerVisit")));
    m.set_number(
        "providerVisitsPerMonth",
        Some(per_month(visits.len(), &input.window)),
    );
    m.set_number("avgGlucose", mean(&glucose));
    m.set_number("latestHba1c", hba1c);
    m
}

pub(super) fn thyroid(input: &AggregationInput<'_>) -> Metrics {
    let logs = input.logs;
    let mut m = base_metrics(logs, input);
    m.set_flag("myxedema", logs.iter().any(|l| metadata_flag(l, "myxedema")));
    m.set_flag(
        "continuousMedication",
        logs.iter()
            .any(|l| any_flag(l, &["continuousMedication", "medication"])),
    );
    m
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    #[test]
    fn test_diabetes_cross_source() {
        let logs = vec![
            SymptomLog::new("hypoglycemia", days_ago(1)).with_meta("insulin", true),
            SymptomLog::new("fatigue", days_ago(2)).with_meta("restrictedDiet", "yes"),
        ];
        let readings = vec![
            Measurement::new("glucose", days_ago(1)).with_value("value", 62.0),
            Measurement::new("glucose", days_ago(2)).with_value("value", 140.0),
            Measurement::new("hba1c", days_ago(20)).with_value("value", 7.4),
        ];
        let m = run(
            Aggregator::Diabetes,
            &["hypoglycemia", "fatigue"],
            &logs,
            &readings,
            None,
            90,
        );
        assert!(m.flag("usesInsulin"));
        assert!(m.flag("restrictedDiet"));
        assert_eq!(m.number("hypoglycemicDays"), Some(1.0));
        assert_eq!(m.number("avgGlucose"), Some(101.0));
        assert_eq!(m.number("latestHba1c"), Some(7.4));
    }

    #[test]
    fn test_hypoglycemic_days_merge_readings_and_logs() {
        let logs = vec![
            SymptomLog::new("hypoglycemia", days_ago(3)),
            SymptomLog::new("fatigue", days_ago(5)).with_meta("hypoglycemic", true),
        ];
        let readings = vec![
            Measurement::new("glucose", days_ago(3)).with_value("value", 55.0),
            Measurement::new("glucose", days_ago(3)).with_value("value", 64.0),
            Measurement::new("glucose", days_ago(9)).with_value("value", 68.0),
            Measurement::new("glucose", days_ago(10)).with_value("value", 70.0),
        ];
        let m = run(
            Aggregator::Diabetes,
            &["hypoglycemia", "fatigue"],
            &logs,
            &readings,
            None,
            90,
        );
        assert_eq!(m.number("hypoglycemicDays"), Some(3.0));
    }
}
