//! Declarative rating criteria.
//!
//! One [`ConditionCriteria`] per diagnostic code. Tables are data: the
//! selector walks them generically, so adding a condition means adding a
//! record here, never a new analysis function.

mod cardiovascular;
mod digestive;
mod ear;
mod endocrine;
mod genitourinary;
mod gynecological;
mod infectious;
mod mental;
mod musculoskeletal;
mod neurological;
mod respiratory;
mod skin;

use crate::error::{Error, Result};
use crate::metrics::{AggregationInput, Aggregator, MetricValue, Metrics};
use crate::window::EvaluationWindow;
use crate::{BodySystem, RatingOutcome};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

pub const DEFAULT_DISCLAIMER: &str = "This analysis summarizes your own logs against the published \
rating schedule. It is not a medical opinion or a VA decision; only a VA examiner and rating \
specialist can assign a rating.";

// ============================================================================
// Tier predicates
// ============================================================================

/// Predicate over aggregated metrics.
///
/// A metric that is missing or `Absent` never satisfies a comparison.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Rule {
    /// `metric >= min`
    Count { metric: &'static str, min: f64 },
    /// `metric > value`
    Exceeds { metric: &'static str, value: f64 },
    /// `min <= metric < max`; an open upper bound when `max` is `None`.
    Range {
        metric: &'static str,
        min: f64,
        max: Option<f64>,
    },
    /// `metric <= max`
    AtMost { metric: &'static str, max: f64 },
    /// At least `min` collapsed episodes.
    Episodes { metric: &'static str, min: u32 },
    /// A flag metric is set.
    Flag { metric: &'static str },
    /// Nothing positive recorded for the metric.
    Missing { metric: &'static str },
    All { rules: Vec<Rule> },
    Any { rules: Vec<Rule> },
}

pub fn count(metric: &'static str, min: f64) -> Rule {
    Rule::Count { metric, min }
}

pub fn exceeds(metric: &'static str, value: f64) -> Rule {
    Rule::Exceeds { metric, value }
}

pub fn range(metric: &'static str, min: f64, max: Option<f64>) -> Rule {
    Rule::Range { metric, min, max }
}

pub fn at_most(metric: &'static str, max: f64) -> Rule {
    Rule::AtMost { metric, max }
}

pub fn episodes(metric: &'static str, min: u32) -> Rule {
    Rule::Episodes { metric, min }
}

pub fn flag(metric: &'static str) -> Rule {
    Rule::Flag { metric }
}

pub fn missing(metric: &'static str) -> Rule {
    Rule::Missing { metric }
}

pub fn all_of(rules: Vec<Rule>) -> Rule {
    Rule::All { rules }
}

pub fn any_of(rules: Vec<Rule>) -> Rule {
    Rule::Any { rules }
}

impl Rule {
    pub fn holds(&self, metrics: &Metrics) -> bool {
        match self {
            Rule::Count { metric, min } => metrics.number(metric).is_some_and(|x| x >= *min),
            Rule::Exceeds { metric, value } => metrics.number(metric).is_some_and(|x| x > *value),
            Rule::Range { metric, min, max } => metrics
                .number(metric)
                .is_some_and(|x| x >= *min && max.map_or(true, |max| x < max)),
            Rule::AtMost { metric, max } => metrics.number(metric).is_some_and(|x| x <= *max),
            Rule::Episodes { metric, min } => metrics
                .number(metric)
                .is_some_and(|x| x >= f64::from(*min)),
            Rule::Flag { metric } => metrics.flag(metric),
            Rule::Missing { metric } => !metrics.get(metric).is_some_and(MetricValue::is_positive),
            Rule::All { rules } => rules.iter().all(|r| r.holds(metrics)),
            Rule::Any { rules } => rules.iter().any(|r| r.holds(metrics)),
        }
    }

    /// Metric a leaf reads; `None` for combinators.
    pub fn metric(&self) -> Option<&'static str> {
        match self {
            Rule::Count { metric, .. }
            | Rule::Exceeds { metric, .. }
            | Rule::Range { metric, .. }
            | Rule::AtMost { metric, .. }
            | Rule::Episodes { metric, .. }
            | Rule::Flag { metric }
            | Rule::Missing { metric } => Some(*metric),
            Rule::All { .. } | Rule::Any { .. } => None,
        }
    }

    /// Every metric referenced anywhere in the rule.
    pub fn metrics(&self) -> Vec<&'static str> {
        match self {
            Rule::All { rules } | Rule::Any { rules } => {
                rules.iter().flat_map(Rule::metrics).collect()
            }
            leaf => leaf.metric().into_iter().collect(),
        }
    }

    /// Leaves that hold, in declaration order.
    pub fn satisfied_leaves(&self, metrics: &Metrics) -> Vec<&Rule> {
        match self {
            Rule::All { rules } | Rule::Any { rules } => rules
                .iter()
                .flat_map(|r| r.satisfied_leaves(metrics))
                .collect(),
            leaf if leaf.holds(metrics) => vec![leaf],
            _ => Vec::new(),
        }
    }

    /// First leaf standing between the metrics and this rule.
    pub fn first_unmet_leaf(&self, metrics: &Metrics) -> Option<&Rule> {
        match self {
            Rule::All { rules } => rules.iter().find_map(|r| r.first_unmet_leaf(metrics)),
            Rule::Any { rules } => {
                if self.holds(metrics) {
                    None
                } else {
                    rules.first().and_then(|r| r.first_unmet_leaf(metrics))
                }
            }
            leaf if leaf.holds(metrics) => None,
            leaf => Some(leaf),
        }
    }

    /// Threshold wording for a leaf, e.g. "at least 2".
    pub fn threshold_text(&self) -> String {
        use crate::metrics::format_number as n;
        match self {
            Rule::Count { min, .. } => format!("at least {}", n(*min)),
            Rule::Exceeds { value, .. } => format!("above {}", n(*value)),
            Rule::Range {
                min,
                max: Some(max),
                ..
            } => format!("from {} to under {}", n(*min), n(*max)),
            Rule::Range { min, max: None, .. } => format!("at least {}", n(*min)),
            Rule::AtMost { max, .. } => format!("at most {}", n(*max)),
            Rule::Episodes { min, .. } => format!("at least {} episodes", min),
            Rule::Flag { .. } => "documented".to_string(),
            Rule::Missing { .. } => "not documented".to_string(),
            Rule::All { rules } => join_thresholds(rules, " and "),
            Rule::Any { rules } => join_thresholds(rules, " or "),
        }
    }

    /// "prostrating per month at least 2"
    pub fn describe(&self) -> String {
        match self.metric() {
            Some(metric) => format!("{} {}", metric_label(metric), self.threshold_text()),
            None => self.threshold_text(),
        }
    }
}

fn join_thresholds(rules: &[Rule], separator: &str) -> String {
    rules
        .iter()
        .map(Rule::describe)
        .collect::<Vec<_>>()
        .join(separator)
}

/// Human label for a metric key: `prostratingPerMonth` -> "prostrating per
/// month", `days.migraine` -> "migraine days".
pub fn metric_label(metric: &str) -> String {
    if let Some(symptom) = metric.strip_prefix("days.") {
        return format!("{} days", symptom.replace('-', " "));
    }
    let mut label = String::with_capacity(metric.len() + 8);
    for ch in metric.chars() {
        if ch.is_ascii_uppercase() {
            label.push(' ');
            label.push(ch.to_ascii_lowercase());
        } else {
            label.push(ch);
        }
    }
    label
}

// ============================================================================
// Tables
// ============================================================================

/// One row of a rating table.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingTier {
    pub outcome: RatingOutcome,
    pub summary: &'static str,
    pub criteria_description: &'static [&'static str],
    /// `None` for rows only reachable through the table floor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<Rule>,
}

impl RatingTier {
    pub fn new(outcome: RatingOutcome, summary: &'static str, rule: Rule) -> Self {
        Self {
            outcome,
            summary,
            criteria_description: &[],
            rule: Some(rule),
        }
    }

    /// A row the selector only lands on via the floor.
    pub fn floor(outcome: RatingOutcome, summary: &'static str) -> Self {
        Self {
            outcome,
            summary,
            criteria_description: &[],
            rule: None,
        }
    }

    pub fn described(mut self, criteria_description: &'static [&'static str]) -> Self {
        self.criteria_description = criteria_description;
        self
    }

    pub fn holds(&self, metrics: &Metrics) -> bool {
        self.rule.as_ref().is_some_and(|r| r.holds(metrics))
    }
}

/// Shorthand for numeric table rows.
pub fn pct(percent: u8) -> RatingOutcome {
    RatingOutcome::Percent(percent)
}

/// What a table yields when no tier predicate holds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", content = "outcome", rename_all = "camelCase")]
pub enum Floor {
    /// The table's explicit 0% row.
    ZeroPercent,
    /// The lowest compensable row.
    LowestCompensable,
    /// A sentinel, or a specific row of the table.
    Outcome(RatingOutcome),
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingTable {
    pub name: &'static str,
    pub tiers: Vec<RatingTier>,
    pub floor: Floor,
}

impl RatingTable {
    pub fn new(name: &'static str, floor: Floor, tiers: Vec<RatingTier>) -> Self {
        Self { name, tiers, floor }
    }

    /// Row the floor resolves to, when it resolves to a row.
    pub fn floor_tier(&self) -> Option<(usize, &RatingTier)> {
        let target = match self.floor {
            Floor::ZeroPercent => RatingOutcome::Percent(0),
            Floor::LowestCompensable => {
                return self
                    .tiers
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.outcome.is_compensable())
                    .last();
            }
            Floor::Outcome(outcome) => outcome,
        };
        self.tiers
            .iter()
            .enumerate()
            .find(|(_, t)| t.outcome == target)
    }

    /// Outcome the floor yields.
    pub fn floor_outcome(&self) -> Option<RatingOutcome> {
        match self.floor {
            Floor::Outcome(outcome) => Some(outcome),
            _ => self.floor_tier().map(|(_, t)| t.outcome),
        }
    }

    pub fn is_ordered(&self) -> bool {
        self.tiers
            .windows(2)
            .all(|pair| pair[0].outcome.rank() > pair[1].outcome.rank())
    }
}

// ============================================================================
// Evidence and gaps
// ============================================================================

/// Gate that must pass before any table is consulted.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Prerequisite {
    pub rule: Rule,
    pub otherwise: RatingOutcome,
    pub reason: &'static str,
}

/// Affirmative line emitted when `metric` is positive; `{}` is replaced with
/// the metric's value.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct EvidenceLine {
    pub metric: &'static str,
    pub template: &'static str,
}

pub fn evidence(metric: &'static str, template: &'static str) -> EvidenceLine {
    EvidenceLine { metric, template }
}

/// Missing-documentation warning.
///
/// `unlocks: None` marks a blocking gap reported at any rating; otherwise the
/// gap is only reported while the named outcome is above the current one.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GapRule {
    pub unlocks: Option<RatingOutcome>,
    pub when: Rule,
    pub message: &'static str,
}

pub fn blocking_gap(when: Rule, message: &'static str) -> GapRule {
    GapRule {
        unlocks: None,
        when,
        message,
    }
}

pub fn next_tier_gap(unlocks: RatingOutcome, when: Rule, message: &'static str) -> GapRule {
    GapRule {
        unlocks: Some(unlocks),
        when,
        message,
    }
}

// ============================================================================
// Condition criteria
// ============================================================================

/// Rating criteria for one diagnostic code.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionCriteria {
    pub diagnostic_code: &'static str,
    pub name: &'static str,
    pub cfr_reference: &'static str,
    pub body_system: BodySystem,
    pub symptom_ids: &'static [&'static str],
    pub measurement_types: &'static [&'static str],
    pub aggregator: Aggregator,
    /// First table is the primary schedule; the rest are alternate tracks.
    pub tables: Vec<RatingTable>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prerequisite: Option<Prerequisite>,
    #[serde(skip)]
    pub evidence: Vec<EvidenceLine>,
    #[serde(skip)]
    pub gaps: Vec<GapRule>,
    pub definitions: BTreeMap<&'static str, &'static str>,
    pub disclaimer: &'static str,
    /// Reads the externally edited condition profile.
    pub profile_aware: bool,
}

impl ConditionCriteria {
    pub fn new(
        diagnostic_code: &'static str,
        name: &'static str,
        cfr_reference: &'static str,
        body_system: BodySystem,
        aggregator: Aggregator,
    ) -> Self {
        Self {
            diagnostic_code,
            name,
            cfr_reference,
            body_system,
            symptom_ids: &[],
            measurement_types: &[],
            aggregator,
            tables: Vec::new(),
            prerequisite: None,
            evidence: Vec::new(),
            gaps: Vec::new(),
            definitions: BTreeMap::new(),
            disclaimer: DEFAULT_DISCLAIMER,
            profile_aware: false,
        }
    }

    pub fn symptoms(mut self, ids: &'static [&'static str]) -> Self {
        self.symptom_ids = ids;
        self
    }

    pub fn measurements(mut self, types: &'static [&'static str]) -> Self {
        self.measurement_types = types;
        self
    }

    pub fn table(mut self, table: RatingTable) -> Self {
        self.tables.push(table);
        self
    }

    pub fn prerequisite(
        mut self,
        rule: Rule,
        otherwise: RatingOutcome,
        reason: &'static str,
    ) -> Self {
        self.prerequisite = Some(Prerequisite {
            rule,
            otherwise,
            reason,
        });
        self
    }

    pub fn evidence(mut self, lines: Vec<EvidenceLine>) -> Self {
        self.evidence = lines;
        self
    }

    pub fn gaps(mut self, gaps: Vec<GapRule>) -> Self {
        self.gaps = gaps;
        self
    }

    pub fn define(mut self, term: &'static str, explanation: &'static str) -> Self {
        self.definitions.insert(term, explanation);
        self
    }

    pub fn disclaimer(mut self, disclaimer: &'static str) -> Self {
        self.disclaimer = disclaimer;
        self
    }

    pub fn profile_aware(mut self) -> Self {
        self.profile_aware = true;
        self
    }

    /// The primary schedule.
    pub fn ratings(&self) -> &[RatingTier] {
        self.tables.first().map(|t| t.tiers.as_slice()).unwrap_or(&[])
    }

    /// Keys the aggregator produces for this condition.
    pub fn metric_keys(&self) -> BTreeSet<String> {
        let window = EvaluationWindow::new(90, DateTime::<Utc>::default());
        let input = AggregationInput {
            logs: &[],
            measurements: &[],
            profile: None,
            symptom_ids: self.symptom_ids,
            window,
            config: Default::default(),
        };
        self.aggregator
            .aggregate(&input)
            .keys()
            .map(str::to_string)
            .collect()
    }

    /// Configuration defects; empty when the criteria are usable.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        let code = self.diagnostic_code;

        if code.is_empty() {
            problems.push(format!("{}: missing diagnostic code", self.name));
        }
        if self.symptom_ids.is_empty() && self.measurement_types.is_empty() && !self.profile_aware {
            problems.push(format!("{}: tracks no symptoms or measurements", code));
        }
        if self.tables.is_empty() {
            problems.push(format!("{}: no rating table", code));
        }

        for table in &self.tables {
            if table.tiers.is_empty() {
                problems.push(format!("{} {}: empty table", code, table.name));
                continue;
            }
            if !table.is_ordered() {
                problems.push(format!(
                    "{} {}: outcomes must be unique and descending",
                    code, table.name
                ));
            }
            match table.floor {
                Floor::Outcome(outcome) if outcome.is_sentinel() => {}
                _ if table.floor_tier().is_none() => problems.push(format!(
                    "{} {}: floor {:?} has no matching tier",
                    code, table.name, table.floor
                )),
                _ => {}
            }
            let floor_index = table.floor_tier().map(|(i, _)| i);
            for (i, tier) in table.tiers.iter().enumerate() {
                if tier.rule.is_none() && Some(i) != floor_index {
                    problems.push(format!(
                        "{} {}: tier {} is unreachable",
                        code, table.name, tier.outcome
                    ));
                }
            }
        }

        let keys = self.metric_keys();
        let mut referenced: Vec<&'static str> = Vec::new();
        for table in &self.tables {
            for tier in &table.tiers {
                if let Some(rule) = &tier.rule {
                    referenced.extend(rule.metrics());
                }
            }
        }
        if let Some(pre) = &self.prerequisite {
            referenced.extend(pre.rule.metrics());
            if !pre.otherwise.is_sentinel() {
                problems.push(format!("{}: prerequisite must yield a sentinel", code));
            }
        }
        for gap in &self.gaps {
            referenced.extend(gap.when.metrics());
        }
        referenced.extend(self.evidence.iter().map(|e| e.metric));

        for metric in referenced {
            if !keys.contains(metric) {
                problems.push(format!(
                    "{}: rule reads '{}' which {:?} never produces",
                    code, metric, self.aggregator
                ));
            }
        }

        problems
    }
}

// ============================================================================
// Registry
// ============================================================================

static REGISTRY: Lazy<Vec<ConditionCriteria>> = Lazy::new(build_registry);

static BY_CODE: Lazy<HashMap<&'static str, usize>> = Lazy::new(|| {
    REGISTRY
        .iter()
        .enumerate()
        .map(|(i, c)| (c.diagnostic_code, i))
        .collect()
});

fn build_registry() -> Vec<ConditionCriteria> {
    let mut all = Vec::new();
    all.extend(musculoskeletal::criteria());
    all.extend(neurological::criteria());
    all.extend(mental::criteria());
    all.extend(cardiovascular::criteria());
    all.extend(respiratory::criteria());
    all.extend(digestive::criteria());
    all.extend(genitourinary::criteria());
    all.extend(endocrine::criteria());
    all.extend(skin::criteria());
    all.extend(ear::criteria());
    all.extend(infectious::criteria());
    all.extend(gynecological::criteria());
    tracing::debug!("Built criteria registry with {} conditions", all.len());
    all
}

/// Every registered condition, in registry order.
pub fn all() -> &'static [ConditionCriteria] {
    &REGISTRY
}

/// Look up a condition by diagnostic code.
pub fn get(code: &str) -> Option<&'static ConditionCriteria> {
    BY_CODE.get(code).map(|&i| &REGISTRY[i])
}

/// Defects across the whole registry, including duplicate codes.
pub fn validate_registry() -> Vec<String> {
    let mut problems = Vec::new();
    let mut seen = BTreeSet::new();
    for criteria in all() {
        if !seen.insert(criteria.diagnostic_code) {
            problems.push(format!("{}: registered twice", criteria.diagnostic_code));
        }
        problems.extend(criteria.validate());
    }
    problems
}

/// Fail on the first defective condition in the registry.
pub fn ensure_valid() -> Result<()> {
    check_conditions(all())
}

fn check_conditions(conditions: &[ConditionCriteria]) -> Result<()> {
    let mut seen = BTreeSet::new();
    for criteria in conditions {
        let code = criteria.diagnostic_code;
        let problem = if seen.insert(code) {
            criteria.validate().into_iter().next()
        } else {
            Some(format!("{}: registered twice", code))
        };
        if let Some(problem) = problem {
            let detail = problem
                .strip_prefix(code)
                .map(|rest| rest.trim_start_matches(':').trim().to_string())
                .unwrap_or_else(|| problem.clone());
            return Err(Error::CriteriaDefect {
                code: code.to_string(),
                detail,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(pairs: &[(&str, MetricValue)]) -> Metrics {
        let mut m = Metrics::new();
        for (k, v) in pairs {
            m.set(*k, v.clone());
        }
        m
    }

    #[test]
    fn test_registry_validates() {
        let problems = validate_registry();
        assert!(problems.is_empty(), "criteria defects: {:#?}", problems);
        assert!(all().len() > 60);
    }

    #[test]
    fn test_defective_condition_is_an_error() {
        assert!(ensure_valid().is_ok());

        let untabled = ConditionCriteria::new(
            "9999",
            "Untabled",
            "38 CFR 4.0",
            BodySystem::Skin,
            Aggregator::Skin,
        )
        .symptoms(&["rash"]);
        match check_conditions(&[untabled]) {
            Err(Error::CriteriaDefect { code, detail }) => {
                assert_eq!(code, "9999");
                assert_eq!(detail, "no rating table");
            }
            other => panic!("expected a criteria defect, got {:?}", other),
        }

        let twice = [get("8100").unwrap().clone(), get("8100").unwrap().clone()];
        match check_conditions(&twice) {
            Err(Error::CriteriaDefect { code, detail }) => {
                assert_eq!(code, "8100");
                assert_eq!(detail, "registered twice");
            }
            other => panic!("expected a criteria defect, got {:?}", other),
        }
    }

    #[test]
    fn test_lookup_by_code() {
        let migraine = get("8100").unwrap();
        assert_eq!(migraine.name, "Migraine");
        assert_eq!(migraine.ratings()[0].outcome, pct(50));
        assert!(get("0000").is_none());
    }

    #[test]
    fn test_range_is_half_open() {
        let rule = range("bodySurfaceArea", 20.0, Some(40.0));
        assert!(rule.holds(&metrics(&[("bodySurfaceArea", MetricValue::Number(20.0))])));
        assert!(rule.holds(&metrics(&[("bodySurfaceArea", MetricValue::Number(39.0))])));
        assert!(!rule.holds(&metrics(&[("bodySurfaceArea", MetricValue::Number(40.0))])));
    }

    #[test]
    fn test_absent_metric_never_satisfies() {
        let m = metrics(&[("avgSeverity", MetricValue::Absent)]);
        assert!(!at_most("avgSeverity", 5.0).holds(&m));
        assert!(!count("missing", 0.0).holds(&m));
        assert!(missing("avgSeverity").holds(&m));
    }

    #[test]
    fn test_unmet_leaf_and_labels() {
        let rule = all_of(vec![count("prostratingPerMonth", 2.0), flag("chronicChf")]);
        let m = metrics(&[
            ("prostratingPerMonth", MetricValue::Number(3.0)),
            ("chronicChf", MetricValue::Flag(false)),
        ]);
        assert_eq!(rule.satisfied_leaves(&m).len(), 1);
        assert_eq!(
            rule.first_unmet_leaf(&m).map(Rule::describe).as_deref(),
            Some("chronic chf documented")
        );
        assert_eq!(metric_label("days.back-pain"), "back pain days");
    }

    #[test]
    fn test_validate_catches_defects() {
        let broken = ConditionCriteria::new(
            "9999",
            "Broken",
            "38 CFR 4.0",
            BodySystem::Skin,
            Aggregator::Symptoms,
        )
        .symptoms(&["rash"])
        .table(RatingTable::new(
            "General",
            Floor::ZeroPercent,
            vec![
                RatingTier::new(pct(10), "mild", count("noSuchMetric", 1.0)),
                RatingTier::new(pct(30), "worse", count("symptomDays", 5.0)),
            ],
        ));
        let problems = broken.validate();
        assert!(problems.iter().any(|p| p.contains("descending")));
        assert!(problems.iter().any(|p| p.contains("floor")));
        assert!(problems.iter().any(|p| p.contains("noSuchMetric")));
    }
}
