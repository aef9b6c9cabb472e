//! Dermatitis-family aggregator.

use super::*;

const BSA: &str = "skin-bsa";

pub(super) fn skin(input: &AggregationInput<'_>) -> Metrics {
    let logs = input.logs;
    let mut m = base_metrics(logs, input);

    // A measured body-surface area wins over a value typed into a log.
    let measured = latest_measurement(input.measurements, BSA).and_then(|r| r.value("percent"));
    let logged = logs
        .iter()
        .filter_map(|l| {
            let at = l.occurred_at()?;
            metadata_number(l, "bodySurfaceArea").map(|bsa| (at, bsa))
        })
        .max_by_key(|(at, _)| *at)
        .map(|(_, bsa)| bsa);
    m.set_number("bodySurfaceArea", measured.or(logged));

    let systemic = distinct_days(
        logs.iter()
            .copied()
            .filter(|l| any_flag(l, &["systemicTherapy", "immunosuppressive"])),
    );
    m.set_number("systemicTherapyWeeks", Some(systemic.len() as f64 / 7.0));
    m.set_number(
        "systemicTherapyShare",
        Some(systemic.len() as f64 / f64::from(input.window.days.max(1))),
    );
    m.set_flag(
        "topicalTherapy",
        logs.iter().any(|l| metadata_flag(l, "topicalTherapy")),
    );
    m
}
