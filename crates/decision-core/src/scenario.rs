//! Whole-scenario aggregation: land-use shares, metric deltas, per-parcel
//! deltas, and constraint checks between two parcel→action assignments.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use contracts::{
    ActionKind, ConstraintKind, ConstraintViolation, LandUsePercentages, LandUseShares,
    MetricKind, ParcelDelta, PersonaKey, ScenarioCompareResponse, ScenarioConstraints,
    ScenarioMetric, ScenarioPayload, ScenarioSide, WeightVector, SCHEMA_VERSION_V1,
};
use tracing::debug;

use crate::rounding::round2;

/// Aggregation functions behind the comparison metrics and per-parcel deltas.
pub trait ScenarioModel: Send + Sync {
    fn metric(
        &self,
        kind: MetricKind,
        scenario: ScenarioSide,
        assignment: &ScenarioPayload,
        weights: &WeightVector,
    ) -> f64;

    fn delta_utility(&self, parcel_id: &str, from: ActionKind, to: Option<ActionKind>) -> f64;
}

/// Fixed indicator values used until a real outcome model is plugged in.
#[derive(Debug, Clone, Copy, Default)]
pub struct BaselineScenarioModel;

pub const BASELINE_DELTA_UTILITY: f64 = 0.05;

impl ScenarioModel for BaselineScenarioModel {
    fn metric(
        &self,
        kind: MetricKind,
        scenario: ScenarioSide,
        _assignment: &ScenarioPayload,
        _weights: &WeightVector,
    ) -> f64 {
        let (a, b) = match kind {
            MetricKind::TotalRiskReduction => (0.62, 0.71),
            MetricKind::EconomicScore => (0.55, 0.5),
            MetricKind::EnvironmentalScore => (0.74, 0.8),
            MetricKind::SocialScore => (0.58, 0.61),
        };
        match scenario {
            ScenarioSide::ScenarioA => a,
            ScenarioSide::ScenarioB => b,
        }
    }

    fn delta_utility(&self, _parcel_id: &str, _from: ActionKind, _to: Option<ActionKind>) -> f64 {
        BASELINE_DELTA_UTILITY
    }
}

impl<T: ScenarioModel + ?Sized> ScenarioModel for Arc<T> {
    fn metric(
        &self,
        kind: MetricKind,
        scenario: ScenarioSide,
        assignment: &ScenarioPayload,
        weights: &WeightVector,
    ) -> f64 {
        (**self).metric(kind, scenario, assignment, weights)
    }

    fn delta_utility(&self, parcel_id: &str, from: ActionKind, to: Option<ActionKind>) -> f64 {
        (**self).delta_utility(parcel_id, from, to)
    }
}

fn action_counts(assignment: &ScenarioPayload) -> BTreeMap<ActionKind, usize> {
    let mut counts = BTreeMap::new();
    for parcel in &assignment.parcels {
        *counts.entry(parcel.action).or_insert(0) += 1;
    }
    counts
}

/// Unrounded share of parcels assigned `action`; 0 for an empty scenario.
pub fn action_share(assignment: &ScenarioPayload, action: ActionKind) -> f64 {
    let total = assignment.len().max(1);
    let count = assignment
        .parcels
        .iter()
        .filter(|parcel| parcel.action == action)
        .count();
    count as f64 / total as f64
}

/// Rounded share per action present. An empty scenario yields an empty map.
pub fn land_use_percentage(assignment: &ScenarioPayload) -> LandUseShares {
    let total = assignment.len().max(1) as f64;
    action_counts(assignment)
        .into_iter()
        .map(|(action, count)| (action, round2(count as f64 / total)))
        .collect()
}

pub fn build_metric(kind: MetricKind, scenario_a: f64, scenario_b: f64) -> ScenarioMetric {
    ScenarioMetric {
        label: kind.label().to_string(),
        scenario_a,
        scenario_b,
        delta: round2(scenario_b - scenario_a),
    }
}

pub fn compare_metrics(
    model: &dyn ScenarioModel,
    scenario_a: &ScenarioPayload,
    scenario_b: &ScenarioPayload,
    weights: &WeightVector,
) -> Vec<ScenarioMetric> {
    MetricKind::ALL
        .into_iter()
        .map(|kind| {
            build_metric(
                kind,
                model.metric(kind, ScenarioSide::ScenarioA, scenario_a, weights),
                model.metric(kind, ScenarioSide::ScenarioB, scenario_b, weights),
            )
        })
        .collect()
}

/// One record per parcel of scenario A, in A's order. Parcels only in B are not emitted.
pub fn parcel_deltas(
    model: &dyn ScenarioModel,
    scenario_a: &ScenarioPayload,
    scenario_b: &ScenarioPayload,
) -> Vec<ParcelDelta> {
    // First assignment wins, matching a front-to-back scan of B.
    let mut index_b = HashMap::with_capacity(scenario_b.len());
    for parcel in &scenario_b.parcels {
        index_b.entry(parcel.id.as_str()).or_insert(parcel.action);
    }

    scenario_a
        .parcels
        .iter()
        .map(|parcel| {
            let counterpart = index_b.get(parcel.id.as_str()).copied();
            ParcelDelta {
                parcel_id: parcel.id.clone(),
                scenario_a: parcel.action,
                scenario_b: counterpart,
                delta_utility: model.delta_utility(&parcel.id, parcel.action, counterpart),
            }
        })
        .collect()
}

/// Ids assigned in `scenario_b` but absent from `scenario_a`, in B's order.
pub fn parcels_only_in_b(
    scenario_a: &ScenarioPayload,
    scenario_b: &ScenarioPayload,
) -> Vec<String> {
    let ids_a = scenario_a
        .parcels
        .iter()
        .map(|parcel| parcel.id.as_str())
        .collect::<HashSet<_>>();
    let mut seen = HashSet::new();
    scenario_b
        .parcels
        .iter()
        .filter(|parcel| !ids_a.contains(parcel.id.as_str()) && seen.insert(parcel.id.as_str()))
        .map(|parcel| parcel.id.clone())
        .collect()
}

pub fn check_constraints(
    side: ScenarioSide,
    assignment: &ScenarioPayload,
    constraints: &ScenarioConstraints,
) -> Vec<ConstraintViolation> {
    let mut violations = Vec::new();

    let forest = action_share(assignment, ActionKind::Reforest);
    if forest < constraints.min_forest_pct {
        violations.push(ConstraintViolation {
            scenario: side,
            constraint: ConstraintKind::MinForestPct,
            limit: constraints.min_forest_pct,
            actual: round2(forest),
        });
    }

    let housing = action_share(assignment, ActionKind::Housing);
    if housing > constraints.max_housing_pct {
        violations.push(ConstraintViolation {
            scenario: side,
            constraint: ConstraintKind::MaxHousingPct,
            limit: constraints.max_housing_pct,
            actual: round2(housing),
        });
    }

    violations
}

/// First parcel id assigned more than once, if any.
pub fn find_duplicate_parcel(assignment: &ScenarioPayload) -> Option<&str> {
    let mut seen = HashSet::new();
    assignment
        .parcels
        .iter()
        .map(|parcel| parcel.id.as_str())
        .find(|id| !seen.insert(*id))
}

#[derive(Debug, Clone, Default)]
pub struct ScenarioComparator<M = BaselineScenarioModel> {
    model: M,
}

impl<M: ScenarioModel> ScenarioComparator<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    pub fn compare(
        &self,
        persona: PersonaKey,
        scenario_a: &ScenarioPayload,
        scenario_b: &ScenarioPayload,
        constraints: ScenarioConstraints,
        weights: &WeightVector,
    ) -> ScenarioCompareResponse {
        debug!(
            persona = %persona,
            parcels_a = scenario_a.len(),
            parcels_b = scenario_b.len(),
            "comparing scenarios"
        );

        let mut constraint_violations =
            check_constraints(ScenarioSide::ScenarioA, scenario_a, &constraints);
        constraint_violations.extend(check_constraints(
            ScenarioSide::ScenarioB,
            scenario_b,
            &constraints,
        ));

        ScenarioCompareResponse {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            persona,
            constraints,
            metrics: compare_metrics(&self.model, scenario_a, scenario_b, weights),
            land_use_percentages: LandUsePercentages {
                scenario_a: land_use_percentage(scenario_a),
                scenario_b: land_use_percentage(scenario_b),
            },
            parcel_deltas: parcel_deltas(&self.model, scenario_a, scenario_b),
            parcels_only_in_b: parcels_only_in_b(scenario_a, scenario_b),
            constraint_violations,
        }
    }
}
