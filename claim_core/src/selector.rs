//! Rating selection.
//!
//! Walks a condition's tables against aggregated metrics:
//!
//! 1. A failing prerequisite short-circuits to its sentinel.
//! 2. Each table yields its first (most severe) tier whose rule holds, or its
//!    floor.
//! 3. With several tables the highest-ranked outcome wins; an earlier table
//!    wins a tie. Tracks are never summed.

use crate::criteria::{ConditionCriteria, RatingTable, RatingTier};
use crate::metrics::Metrics;
use crate::RatingOutcome;
use serde::Serialize;

/// What one table yields for a set of metrics.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableOutcome {
    pub table: &'static str,
    pub outcome: RatingOutcome,
    /// Row the outcome came from; `None` for a sentinel floor.
    pub tier_index: Option<usize>,
    pub via_floor: bool,
}

/// Result of selecting a rating across every table of a condition.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub outcome: RatingOutcome,
    /// Name of the governing table; empty when the prerequisite decided.
    pub table: &'static str,
    pub tier_index: Option<usize>,
    pub via_floor: bool,
    pub via_prerequisite: bool,
    /// Per-table results, in table order.
    pub tables: Vec<TableOutcome>,
}

impl Selection {
    /// Index of the governing table.
    pub fn table_index(&self) -> Option<usize> {
        self.tables.iter().position(|t| t.table == self.table)
    }

    /// Governing row of the governing table.
    pub fn tier<'c>(&self, criteria: &'c ConditionCriteria) -> Option<&'c RatingTier> {
        let table = criteria.tables.get(self.table_index()?)?;
        table.tiers.get(self.tier_index?)
    }
}

/// Outcome of a single table.
pub fn select_in_table(metrics: &Metrics, table: &RatingTable) -> TableOutcome {
    debug_assert!(
        table.is_ordered(),
        "table {} must list outcomes most to least severe",
        table.name
    );

    if let Some(index) = table.tiers.iter().position(|tier| tier.holds(metrics)) {
        return TableOutcome {
            table: table.name,
            outcome: table.tiers[index].outcome,
            tier_index: Some(index),
            via_floor: false,
        };
    }

    let floor_index = table.floor_tier().map(|(i, _)| i);
    let outcome = table
        .floor_outcome()
        .unwrap_or(RatingOutcome::RequiresEvaluation);
    TableOutcome {
        table: table.name,
        outcome,
        tier_index: floor_index,
        via_floor: true,
    }
}

/// Select the supported rating for `criteria`.
pub fn select_rating(metrics: &Metrics, criteria: &ConditionCriteria) -> Selection {
    if let Some(prerequisite) = &criteria.prerequisite {
        if !prerequisite.rule.holds(metrics) {
            tracing::debug!(
                "{}: prerequisite unmet, yielding {}",
                criteria.diagnostic_code,
                prerequisite.otherwise
            );
            return Selection {
                outcome: prerequisite.otherwise,
                table: "",
                tier_index: None,
                via_floor: false,
                via_prerequisite: true,
                tables: Vec::new(),
            };
        }
    }

    let tables: Vec<TableOutcome> = criteria
        .tables
        .iter()
        .map(|table| select_in_table(metrics, table))
        .collect();

    // Strict `>`: the first table wins ties.
    let mut best: Option<&TableOutcome> = None;
    for candidate in &tables {
        if best.map_or(true, |b| candidate.outcome.rank() > b.outcome.rank()) {
            best = Some(candidate);
        }
    }

    match best.cloned() {
        Some(best) => Selection {
            outcome: best.outcome,
            table: best.table,
            tier_index: best.tier_index,
            via_floor: best.via_floor,
            via_prerequisite: false,
            tables,
        },
        None => Selection {
            outcome: RatingOutcome::RequiresEvaluation,
            table: "",
            tier_index: None,
            via_floor: true,
            via_prerequisite: false,
            tables,
        },
    }
}
