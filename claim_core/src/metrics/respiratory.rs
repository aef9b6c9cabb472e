//! Pulmonary function and sleep apnea aggregators.

use super::*;

const PFT: &str = "pulmonary-function";

pub(super) fn pulmonary(input: &AggregationInput<'_>) -> Metrics {
    let logs = input.logs;
    let window = &input.window;
    let mut m = base_metrics(logs, input);

    // The worst recent test governs.
    let fev1 = measurement_values(input.measurements, PFT, "fev1Percent")
        .into_iter()
        .reduce(f64::min);
    let ratio = measurement_values(input.measurements, PFT, "fev1FvcPercent")
        .into_iter()
        .reduce(f64::min);
    m.set_number("fev1Percent", fev1);
    m.set_number("fev1FvcPercent", ratio);
    m.set_flag("pftOnFile", has_measurement(input.measurements, PFT));

    let inhaler = distinct_days(
        logs.iter()
            .copied()
            .filter(|l| any_flag(l, &["inhaler", "bronchodilator"])),
    );
    m.set_count("inhalerDays", inhaler.len());
    m.set_number("inhalerDaysPerMonth", Some(per_month(inhaler.len(), window)));
    // Daily use: at least 25 of every 30 days.
    m.set_flag("dailyInhaler", per_month(inhaler.len(), window) >= 25.0);

    let steroid_days = distinct_days(
        logs.iter()
            .copied()
            .filter(|l| any_flag(l, &["oralSteroids", "systemicSteroids"])),
    );
    m.set_count("steroidCourses", collapse_episodes(&steroid_days).len());

    let visits = distinct_days(
        logs.iter()
            .copied()
            .filter(|l| any_flag(l, &["physicianVisit", "exacerbationVisit"])),
    );
    m.set_count("physicianVisits", visits.len());
    m.set_number("physicianVisitsPerMonth", Some(per_month(visits.len(), window)));
    m.set_flag(
        "respiratoryFailure",
        logs.iter().any(|l| metadata_flag(l, "respiratoryFailure")),
    );
    m
}

/// The qualifying 50% tier rests on device use from the profile, not on
/// log frequency.
pub(super) fn sleep_apnea(input: &AggregationInput<'_>) -> Metrics {
    let logs = input.logs;
    let mut m = base_metrics(logs, input);
    let profile = input.profile;

    let device_logged = logs
        .iter()
        .any(|l| any_flag(l, &["cpap", "breathingDevice"]));
    m.set_flag(
        "usesBreathingDevice",
        profile.is_some_and(|p| p.uses_breathing_device) || device_logged,
    );
    m.set_text("deviceType", profile.and_then(|p| p.device_type.as_deref()));

    let sleepy = distinct_days(logs.iter().copied().filter(|l| {
        metadata_flag(l, "hypersomnolence") || is_symptom(l, &["daytime-sleepiness"])
    }));
    m.set_count("daytimeHypersomnolenceDays", sleepy.len());
    m.set_number(
        "hypersomnolenceDaysPerMonth",
        Some(per_month(sleepy.len(), &input.window)),
    );
    m.set_flag(
        "chronicRespiratoryFailure",
        logs.iter()
            .any(|l| any_flag(l, &["respiratoryFailure", "corPulmonale", "carbonDioxideRetention"])),
    );
    m
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    #[test]
    fn test_worst_pft_governs() {
        let readings = vec![
            Measurement::new(PFT, days_ago(30)).with_value("fev1Percent", 70.0),
            Measurement::new(PFT, days_ago(3)).with_value("fev1Percent", 52.0),
        ];
        let m = run(Aggregator::Respiratory, &["wheezing"], &[], &readings, None, 90);
        assert_eq!(m.number("fev1Percent"), Some(52.0));
        assert_eq!(m.get("fev1FvcPercent"), Some(&MetricValue::Absent));
        assert!(m.flag("pftOnFile"));
    }

    #[test]
    fn test_steroid_courses_are_episodes() {
        let logs: Vec<SymptomLog> = [1, 2, 3, 20, 21]
            .into_iter()
            .map(|d| SymptomLog::new("wheezing", days_ago(d)).with_meta("oralSteroids", true))
            .collect();
        let m = run(Aggregator::Respiratory, &["wheezing"], &logs, &[], None, 90);
        assert_eq!(m.number("steroidCourses"), Some(2.0));
    }

    #[test]
    fn test_device_from_profile() {
        let profile = ConditionProfile {
            has_diagnosis: true,
            uses_breathing_device: true,
            device_type: Some("cpap".into()),
            ..Default::default()
        };
        let m = run(Aggregator::SleepApnea, &["daytime-sleepiness"], &[], &[], Some(&profile), 90);
        assert!(m.flag("usesBreathingDevice"));
        assert!(m.flag("hasDiagnosis"));
        assert_eq!(m.get("deviceType"), Some(&MetricValue::Text("cpap".into())));
    }
}
