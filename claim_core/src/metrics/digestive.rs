//! Chronic liver disease aggregator.

use super::*;

const LIVER_PANEL: &str = "liver-panel";
const ALT_UPPER_LIMIT: f64 = 56.0;
const AST_UPPER_LIMIT: f64 = 40.0;
const LIVER_SPAN_CM: f64 = 16.0;

/// Combines fatigue and incapacitation logs with liver panel readings.
pub(super) fn hepatic(input: &AggregationInput<'_>) -> Metrics {
    let logs = input.logs;
    let measurements = input.measurements;
    let window = &input.window;
    let mut m = base_metrics(logs, input);
    incapacitation_metrics(logs, window, &mut m);

    let fatigue = distinct_days(logs.iter().copied().filter(|l| {
        is_symptom(l, &["fatigue", "malaise"]) || metadata_flag(l, "fatigue")
    }));
    let fatigue_per_month = per_month(fatigue.len(), window);
    m.set_number("fatigueDaysPerMonth", Some(fatigue_per_month));
    m.set_flag("dailyFatigue", fatigue_per_month >= 25.0);
    m.set_flag("weightLoss", logs.iter().any(|l| metadata_flag(l, "weightLoss")));

    let panels: Vec<&Measurement> = measurements
        .iter()
        .copied()
        .filter(|r| r.measurement_type == LIVER_PANEL)
        .collect();
    let enlarged = panels
        .iter()
        .any(|r| r.value("liverSpanCm").is_some_and(|cm| cm > LIVER_SPAN_CM))
        || logs.iter().any(|l| metadata_flag(l, "hepatomegaly"));
    let abnormal = panels
        .iter()
        .filter(|r| {
            r.value("alt").is_some_and(|v| v > ALT_UPPER_LIMIT)
                || r.value("ast").is_some_and(|v| v > AST_UPPER_LIMIT)
        })
        .count();

    m.set_flag("hepatomegaly", enlarged);
    m.set_count("abnormalLiverPanels", abnormal);
    m.set_flag("liverPanelOnFile", !panels.is_empty());
    m.set_flag(
        "dietaryRestriction",
        logs.iter().any(|l| metadata_flag(l, "restrictedDiet")),
    );
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
    fn test_hepatic_cross_source() {
        let logs: Vec<SymptomLog> = (0..28)
            .map(|d| SymptomLog::new("fatigue", days_ago(d)))
            .collect();
        let readings = vec![
            Measurement::new(LIVER_PANEL, days_ago(4))
                .with_value("alt", 90.0)
                .with_value("ast", 30.0),
            Measurement::new(LIVER_PANEL, days_ago(20)).with_value("alt", 40.0),
        ];
        let m = run(Aggregator::Hepatic, &["fatigue"], &logs, &readings, None, 30);
        assert!(m.flag("dailyFatigue"));
        assert_eq!(m.number("abnormalLiverPanels"), Some(1.0));
        assert!(m.flag("liverPanelOnFile"));
        assert!(!m.flag("hepatomegaly"));
    }
}
