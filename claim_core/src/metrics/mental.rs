//! General Rating Formula for Mental Disorders aggregator.

use super::*;

fn flagged_days(logs: &[&SymptomLog], keys: &[&str]) -> usize {
    distinct_days(logs.iter().copied().filter(|l| any_flag(l, keys))).len()
}

pub(super) fn mental_health(input: &AggregationInput<'_>) -> Metrics {
    let logs = input.logs;
    let window = &input.window;
    let mut m = base_metrics(logs, input);

    let panic = logs
        .iter()
        .filter(|l| is_symptom(l, &["panic-attack"]) || metadata_flag(l, "panicAttack"))
        .count();
    m.set_number("panicAttacksPerWeek", Some(per_week(panic, window)));
    m.set_flag(
        "suicidalIdeation",
        logs.iter()
            .any(|l| is_symptom(l, &["suicidal-ideation"]) || metadata_flag(l, "suicidalIdeation")),
    );
    m.set_flag(
        "psychoticSymptoms",
        logs.iter()
            .any(|l| any_flag(l, &["hallucinations", "delusions", "psychotic"])),
    );

    m.set_count(
        "occupationalImpactDays",
        flagged_days(logs, &["missedWork", "occupationalImpact"]),
    );
    m.set_count(
        "socialImpactDays",
        flagged_days(logs, &["socialWithdrawal", "socialImpact"]),
    );
    m.set_count("memoryLossDays", flagged_days(logs, &["memoryLoss"]));
    m.set_flag(
        "selfCareNeglect",
        flagged_days(logs, &["hygieneNeglect", "selfCareNeglect"]) > 0,
    );
    m
}
