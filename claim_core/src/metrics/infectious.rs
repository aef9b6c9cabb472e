//! HIV-related illness aggregator.

use super::*;

pub(super) fn hiv(input: &AggregationInput<'_>) -> Metrics {
    let logs = input.logs;
    let mut m = base_metrics(logs, input);

    m.set_flag(
        "onAntiretrovirals",
        logs.iter()
            .any(|l| any_flag(l, &["antiretroviral", "onAntiretrovirals"])),
    );
    m.set_number(
        "cd4Count",
        latest_value(input.measurements, "cd4", "value"),
    );
    m.set_count(
        "opportunisticInfections",
        logs.iter()
            .filter(|l| metadata_flag(l, "opportunisticInfection"))
            .count(),
    );

    let constitutional = distinct_days(logs.iter().copied().filter(|l| {
        is_symptom(l, &["fever", "night-sweats", "fatigue", "diarrhea"])
            || metadata_flag(l, "constitutional")
    }));
    m.set_count("constitutionalDays", constitutional.len());
    m.set_number(
        "constitutionalDaysPerMonth",
        Some(per_month(constitutional.len(), &input.window)),
    );
    m.set_flag("weightLoss", logs.iter().any(|l| metadata_flag(l, "weightLoss")));
    m.set_flag(
        "oralCandidiasis",
        logs.iter()
            .any(|l| is_symptom(l, &["oral-thrush"]) || metadata_flag(l, "oralCandidiasis")),
    );
    m
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    #[test]
    fn test_hiv_metrics() {
        let logs = vec![
            SymptomLog::new("fever", days_ago(1)).with_meta("antiretroviral", true),
            SymptomLog::new("night-sweats", days_ago(1)),
            SymptomLog::new("fatigue", days_ago(3)),
        ];
        let readings = vec![Measurement::new("cd4", days_ago(7)).with_value("value", 180.0)];
        let m = run(
            Aggregator::Hiv,
            &["fever", "night-sweats", "fatigue"],
            &logs,
            &readings,
            None,
            30,
        );
        assert!(m.flag("onAntiretrovirals"));
        assert_eq!(m.number("cd4Count"), Some(180.0));
        assert_eq!(m.number("constitutionalDays"), Some(2.0));
        assert!(!m.flag("oralCandidiasis"));
    }
}
