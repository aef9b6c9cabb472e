//! Spine and joint aggregators.

use super::*;

fn activity_level(logs: &[&SymptomLog]) -> Option<f64> {
    let levels: Vec<f64> = logs
        .iter()
        .filter_map(|l| metadata_number(l, "activityLevel"))
        .collect();
    mean(&levels)
}

/// Episode-rated conditions (intervertebral disc, sinusitis, hepatitis-like).
pub(super) fn episodes(input: &AggregationInput<'_>) -> Metrics {
    let logs = input.logs;
    let mut m = base_metrics(logs, input);
    incapacitation_metrics(logs, &input.window, &mut m);
    m.set_number("activityLevel", activity_level(logs));
    m
}

pub(super) fn range_of_motion(
    input: &AggregationInput<'_>,
    measurement: &str,
    values: &[&str],
) -> Metrics {
    let logs = input.logs;
    let mut m = base_metrics(logs, input);
    incapacitation_metrics(logs, &input.window, &mut m);

    let latest = latest_measurement(input.measurements, measurement);
    for key in values {
        m.set_number(*key, latest.and_then(|r| r.value(key)));
    }
    m.set_flag("romOnFile", latest.is_some());

    let ankylosis = logs
        .iter()
        .filter_map(|l| metadata_number(l, "ankylosis"))
        .chain(latest.and_then(|r| r.value("ankylosis")))
        .reduce(f64::max);
    m.set_number("ankylosisGrade", ankylosis);

    let instability = logs
        .iter()
        .filter_map(|l| metadata_number(l, "instability"))
        .reduce(f64::max);
    m.set_number("instabilityGrade", instability);

    let painful = distinct_days(logs.iter().copied().filter(|l| metadata_flag(l, "painfulMotion")));
    m.set_count("painfulMotionDays", painful.len());

    let spasm = distinct_days(
        logs.iter()
            .copied()
            .filter(|l| any_flag(l, &["muscleSpasm", "guarding"])),
    );
    m.set_count("muscleSpasmDays", spasm.len());

    m
}
