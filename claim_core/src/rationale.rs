//! Evidence, rationale and documentation gaps.
//!
//! Everything here is derived from the metrics and the selection; nothing in
//! this module can change the supported rating.

use crate::criteria::{metric_label, ConditionCriteria, Rule};
use crate::metrics::Metrics;
use crate::selector::Selection;
use crate::window::EvaluationWindow;
use crate::RatingOutcome;
use serde::Serialize;

/// Gap lists never exceed one blocking and one next-tier entry.
pub const MAX_GAPS: usize = 2;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Explanation {
    pub evidence: Vec<String>,
    pub rationale: Vec<String>,
    pub gaps: Vec<String>,
}

pub fn explain(
    metrics: &Metrics,
    selection: &Selection,
    criteria: &ConditionCriteria,
    window: &EvaluationWindow,
) -> Explanation {
    Explanation {
        evidence: evidence_lines(metrics, criteria),
        rationale: rationale_lines(metrics, selection, criteria, window),
        gaps: gap_lines(metrics, selection.outcome, criteria),
    }
}

/// Affirmative statements for metrics that are actually present.
pub fn evidence_lines(metrics: &Metrics, criteria: &ConditionCriteria) -> Vec<String> {
    criteria
        .evidence
        .iter()
        .filter_map(|line| {
            let value = metrics.get(line.metric).filter(|v| v.is_positive())?;
            Some(line.template.replace("{}", &value.to_string()))
        })
        .collect()
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// "Prostrating per month is 2 (at least 2)"
fn leaf_line(metrics: &Metrics, leaf: &Rule) -> Option<String> {
    let metric = leaf.metric()?;
    let value = metrics
        .get(metric)
        .map(ToString::to_string)
        .unwrap_or_else(|| "not recorded".to_string());
    Some(format!(
        "{} is {} ({})",
        capitalize(&metric_label(metric)),
        value,
        leaf.threshold_text()
    ))
}

fn rationale_lines(
    metrics: &Metrics,
    selection: &Selection,
    criteria: &ConditionCriteria,
    window: &EvaluationWindow,
) -> Vec<String> {
    let mut lines = vec![format!(
        "Evaluated over the last {} days ending {}",
        window.days,
        window.reference_time.format("%Y-%m-%d")
    )];

    if selection.via_prerequisite {
        if let Some(prerequisite) = &criteria.prerequisite {
            lines.push(prerequisite.reason.to_string());
        }
        return lines;
    }

    let Some(table) = selection
        .table_index()
        .and_then(|i| criteria.tables.get(i))
    else {
        return lines;
    };
    let tier = selection.tier(criteria);

    match (selection.via_floor, tier) {
        (false, Some(tier)) => {
            lines.push(format!(
                "Meets the {} percent criteria of {}: {}",
                selection.outcome, table.name, tier.summary
            ));
            if let Some(rule) = &tier.rule {
                lines.extend(
                    rule.satisfied_leaves(metrics)
                        .into_iter()
                        .filter_map(|leaf| leaf_line(metrics, leaf)),
                );
            }
        }
        (true, Some(tier)) => lines.push(format!(
            "No higher {} criteria are met; {} applies: {}",
            table.name,
            describe_outcome(selection.outcome),
            tier.summary
        )),
        (_, None) => lines.push(format!(
            "No {} criteria are met by the recorded evidence ({})",
            table.name, selection.outcome
        )),
    }

    for other in &selection.tables {
        if other.table != selection.table {
            lines.push(format!(
                "{} track supports {}",
                other.table,
                describe_outcome(other.outcome)
            ));
        }
    }

    if let Some((next, leaf)) = next_tier_shortfall(metrics, selection, criteria) {
        lines.push(format!(
            "Next level ({}) needs {}",
            describe_outcome(next),
            leaf.describe()
        ));
    }

    lines
}

fn describe_outcome(outcome: RatingOutcome) -> String {
    if outcome.is_sentinel() {
        outcome.to_string()
    } else {
        format!("{} percent", outcome)
    }
}

/// The tier just above the governing one and the first leaf it still lacks.
fn next_tier_shortfall<'c>(
    metrics: &Metrics,
    selection: &Selection,
    criteria: &'c ConditionCriteria,
) -> Option<(RatingOutcome, &'c Rule)> {
    let table = criteria.tables.get(selection.table_index()?)?;
    let current = selection.outcome.rank();
    let next = table
        .tiers
        .iter()
        .rev()
        .find(|tier| tier.outcome.rank() > current && tier.rule.is_some())?;
    let leaf = next.rule.as_ref()?.first_unmet_leaf(metrics)?;
    Some((next.outcome, leaf))
}

/// At most one blocking gap plus the gap for the lowest unlockable tier.
pub fn gap_lines(
    metrics: &Metrics,
    outcome: RatingOutcome,
    criteria: &ConditionCriteria,
) -> Vec<String> {
    let mut gaps = Vec::with_capacity(MAX_GAPS);

    if let Some(gap) = criteria
        .gaps
        .iter()
        .filter(|g| g.unlocks.is_none())
        .find(|g| g.when.holds(metrics))
    {
        gaps.push(gap.message.to_string());
    }

    let next = criteria
        .gaps
        .iter()
        .filter_map(|g| g.unlocks.map(|unlocks| (unlocks, g)))
        .filter(|(unlocks, g)| unlocks.rank() > outcome.rank() && g.when.holds(metrics))
        .min_by_key(|(unlocks, _)| unlocks.rank());
    if let Some((_, gap)) = next {
        gaps.push(gap.message.to_string());
    }

    gaps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria;
    use crate::metrics::MetricValue;
    use crate::selector::select_rating;
    use chrono::{TimeZone, Utc};

    fn window() -> EvaluationWindow {
        EvaluationWindow::new(90, Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap())
    }

    fn metrics(pairs: &[(&str, MetricValue)]) -> Metrics {
        let mut m = Metrics::new();
        for (k, v) in pairs {
            m.set(*k, v.clone());
        }
        m
    }

    #[test]
    fn test_evidence_only_for_positive_metrics() {
        let migraine = criteria::get("8100").unwrap();
        let m = metrics(&[
            ("prostratingAttacks", MetricValue::Count(4)),
            ("prolongedAttacks", MetricValue::Count(0)),
        ]);
        assert_eq!(
            evidence_lines(&m, migraine),
            vec!["4 qualifying prostrating attacks in period".to_string()]
        );
    }

    #[test]
    fn test_rationale_names_satisfied_leaves() {
        let migraine = criteria::get("8100").unwrap();
        let m = metrics(&[
            ("prostratingAttacks", MetricValue::Count(3)),
            ("prostratingPerMonth", MetricValue::Number(1.0)),
            ("prolongedAttacks", MetricValue::Count(0)),
        ]);
        let selection = select_rating(&m, migraine);
        let explanation = explain(&m, &selection, migraine, &window());

        assert!(explanation.rationale[0].contains("90 days ending 2024-06-01"));
        assert!(explanation
            .rationale
            .contains(&"Prostrating per month is 1 (at least 1)".to_string()));
        assert!(explanation
            .rationale
            .iter()
            .any(|l| l.starts_with("Next level (50 percent) needs prostrating per month at least 2")));
    }

    #[test]
    fn test_prerequisite_reason_is_the_rationale() {
        let apnea = criteria::get("6847").unwrap();
        let m = metrics(&[("hasDiagnosis", MetricValue::Flag(false))]);
        let selection = select_rating(&m, apnea);
        let explanation = explain(&m, &selection, apnea, &window());
        assert_eq!(explanation.rationale.len(), 2);
        assert!(explanation.rationale[1].contains("sleep study"));
        assert_eq!(explanation.gaps.len(), 1);
    }

    #[test]
    fn test_gaps_are_capped_and_ordered() {
        let diabetes = criteria::get("7913").unwrap();
        let m = metrics(&[
            ("usesInsulin", MetricValue::Flag(true)),
            ("restrictedDiet", MetricValue::Flag(true)),
            ("regulationOfActivities", MetricValue::Flag(false)),
            ("latestHba1c", MetricValue::Absent),
        ]);
        let selection = select_rating(&m, diabetes);
        assert_eq!(selection.outcome, RatingOutcome::Percent(20));

        let gaps = gap_lines(&m, selection.outcome, diabetes);
        assert_eq!(gaps.len(), MAX_GAPS);
        assert!(gaps[0].contains("HbA1c"));
        assert!(gaps[1].contains("regulation of activities"));
    }

    #[test]
    fn test_next_tier_gap_hidden_once_reached() {
        let migraine = criteria::get("8100").unwrap();
        let m = metrics(&[("undocumentedImpactAttacks", MetricValue::Count(2))]);
        assert_eq!(gap_lines(&m, RatingOutcome::Percent(30), migraine).len(), 1);
        assert!(gap_lines(&m, RatingOutcome::Percent(50), migraine).is_empty());
    }

    #[test]
    fn test_competing_tracks_are_listed() {
        let voiding = criteria::get("7542").unwrap();
        let m = metrics(&[
            ("avgPadsPerDay", MetricValue::Number(2.5)),
            ("obstructionDays", MetricValue::Count(2)),
        ]);
        let selection = select_rating(&m, voiding);
        let explanation = explain(&m, &selection, voiding, &window());
        assert_eq!(selection.table, "Continence");
        assert!(explanation
            .rationale
            .contains(&"Obstruction track supports 10 percent".to_string()));
        assert!(explanation
            .rationale
            .contains(&"Frequency track supports 0 percent".to_string()));
    }
}
