//! Blood pressure and heart aggregators.

use super::*;

const BLOOD_PRESSURE: &str = "blood-pressure";

pub(super) fn hypertension(input: &AggregationInput<'_>) -> Metrics {
    let mut m = base_metrics(input.logs, input);

    let readings: Vec<&Measurement> = input
        .measurements
        .iter()
        .copied()
        .filter(|r| r.measurement_type == BLOOD_PRESSURE)
        .collect();
    let systolic: Vec<f64> = readings.iter().filter_map(|r| r.value("systolic")).collect();
    let diastolic: Vec<f64> = readings.iter().filter_map(|r| r.value("diastolic")).collect();
    let reading_days: BTreeSet<NaiveDate> = readings
        .iter()
        .filter_map(|r| r.occurred_at())
        .map(|at| at.date_naive())
        .collect();

    m.set_count("readingCount", readings.len());
    m.set_count("readingDays", reading_days.len());
    m.set_number("avgSystolic", mean(&systolic));
    m.set_number("avgDiastolic", mean(&diastolic));
    // "Predominantly" is read as the median reading.
    m.set_number("predominantSystolic", median(&systolic));
    m.set_number("predominantDiastolic", median(&diastolic));
    m.set_flag(
        "onMedication",
        input.logs.iter().any(|l| {
            any_flag(l, &["medication", "medicationTaken", "continuousMedication"])
        }) || readings.iter().any(|r| value_flag(r.metadata.get("onMedication"))),
    );
    m
}

/// Combines symptom logs with METs and ejection-fraction readings.
pub(super) fn cardiac(input: &AggregationInput<'_>) -> Metrics {
    let logs = input.logs;
    let measurements = input.measurements;
    let mut m = base_metrics(logs, input);

    let mets = measurement_values(measurements, "mets", "value")
        .into_iter()
        .chain(logs.iter().filter_map(|l| metadata_number(l, "mets")))
        .reduce(f64::min);
    let ejection = measurement_values(measurements, "ejection-fraction", "value")
        .into_iter()
        .reduce(f64::min);

    let chf = distinct_days(logs.iter().copied().filter(|l| {
        metadata_flag(l, "chfEpisode") || is_symptom(l, &["heart-failure", "chf-episode"])
    }));

    m.set_number("metsTolerance", mets);
    m.set_number("ejectionFraction", ejection);
    m.set_flag(
        "objectiveTesting",
        mets.is_some() || ejection.is_some() || has_measurement(measurements, "echocardiogram"),
    );
    m.set_count("chfEpisodes", collapse_episodes(&chf).len());
    m.set_flag("chronicChf", logs.iter().any(|l| metadata_flag(l, "chronicChf")));
    m.set_flag(
        "onMedication",
        logs.iter()
            .any(|l| any_flag(l, &["medication", "continuousMedication"])),
    );
    m.set_flag(
        "cardiacHypertrophy",
        logs.iter()
            .any(|l| any_flag(l, &["hypertrophy", "dilatation"])),
    );
    m
}
