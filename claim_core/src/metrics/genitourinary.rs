//! Voiding dysfunction, kidney and genitourinary malignancy aggregators.

use super::*;

pub(super) fn voiding(input: &AggregationInput<'_>) -> Metrics {
    let logs = input.logs;
    let mut m = base_metrics(logs, input);

    let pads: Vec<f64> = logs
        .iter()
        .filter_map(|l| metadata_number(l, "padsPerDay"))
        .collect();
    let intervals: Vec<f64> = logs
        .iter()
        .filter_map(|l| metadata_number(l, "daytimeIntervalHours"))
        .collect();
    let nocturia: Vec<f64> = logs
        .iter()
        .filter_map(|l| metadata_number(l, "nighttimeVoids"))
        .collect();

    m.set_number("avgPadsPerDay", mean(&pads));
    m.set_flag("applianceUse", logs.iter().any(|l| metadata_flag(l, "appliance")));
    m.set_number("avgDaytimeInterval", mean(&intervals));
    m.set_number("avgNocturia", mean(&nocturia));
    m.set_flag(
        "catheterizationRequired",
        logs.iter().any(|l| metadata_flag(l, "catheterization")),
    );
    let obstruction = distinct_days(logs.iter().copied().filter(|l| {
        any_flag(l, &["hesitancy", "weakStream", "retention"]) || is_symptom(l, &["urinary-retention"])
    }));
    m.set_count("obstructionDays", obstruction.len());
    m
}

pub(super) fn renal(input: &AggregationInput<'_>) -> Metrics {
    let mut m = base_metrics(input.logs, input);
    let latest = latest_measurement(input.measurements, "egfr");
    m.set_number("egfr", latest.and_then(|r| r.value("value")));
    m.set_flag("labsOnFile", latest.is_some());
    m.set_flag(
        "onDialysis",
        input.logs.iter().any(|l| metadata_flag(l, "dialysis")),
    );
    m
}

pub(super) fn malignancy(input: &AggregationInput<'_>) -> Metrics {
    let mut m = base_metrics(input.logs, input);
    m.set_flag(
        "activeTreatment",
        input.logs.iter().any(|l| {
            any_flag(
                l,
                &["chemotherapy", "radiation", "surgery", "activeTreatment"],
            )
        }),
    );
    m
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    #[test]
    fn test_voiding_averages() {
        let logs = vec![
            SymptomLog::new("urinary-frequency", days_ago(1))
                .with_meta("daytimeIntervalHours", 1.0)
                .with_meta("nighttimeVoids", 4),
            SymptomLog::new("urinary-frequency", days_ago(2))
                .with_meta("daytimeIntervalHours", 2.0)
                .with_meta("nighttimeVoids", 6),
        ];
        let m = run(Aggregator::Voiding, &["urinary-frequency"], &logs, &[], None, 90);
        assert_eq!(m.number("avgDaytimeInterval"), Some(1.5));
        assert_eq!(m.number("avgNocturia"), Some(5.0));
        assert_eq!(m.get("avgPadsPerDay"), Some(&MetricValue::Absent));
    }

    #[test]
    fn test_renal_latest_egfr() {
        let readings = vec![
            Measurement::new("egfr", days_ago(50)).with_value("value", 50.0),
            Measurement::new("egfr", days_ago(5)).with_value("value", 28.0),
        ];
        let m = run(Aggregator::Renal, &[], &[], &readings, None, 90);
        assert_eq!(m.number("egfr"), Some(28.0));
        assert!(m.flag("labsOnFile"));
    }
}
