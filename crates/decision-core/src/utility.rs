//! Weighted parcel utility and the action ranking built on top of it.

use contracts::{
    ActionKind, Confidence, Dimension, DimensionValues, ParcelRecommendation, ParcelRecord,
    ParcelScores, RecommendedAction, WeightVector,
};
use tracing::debug;

use crate::rounding::round2;

/// Utility gap between the reforest candidate and the buffer candidate.
pub const BUFFER_UTILITY_OFFSET: f64 = 0.05;
pub const BUFFER_EXPLANATION: &str = "Buffers reduce erosion along steep slopes.";

const REFOREST_DRIVERS: [&str; 2] = ["burn_severity", "slope"];
const BUFFER_DRIVERS: [&str; 2] = ["slope", "erosion"];

/// Per-dimension `score * weight`, unrounded.
pub fn utility_breakdown(scores: &ParcelScores, weights: &WeightVector) -> DimensionValues {
    let mut breakdown = DimensionValues::default();
    for dimension in Dimension::ALL {
        breakdown.set(dimension, scores.get(dimension) * weights.get(dimension));
    }
    breakdown
}

/// Dot product of scores and weights over the four dimensions.
pub fn base_utility(scores: &ParcelScores, weights: &WeightVector) -> f64 {
    utility_breakdown(scores, weights).sum()
}

/// Candidate actions in generation order (not sorted by utility).
/// Buffer is offset from the rounded reforest utility so the displayed gap is always 0.05.
pub fn rank_actions(
    scores: &ParcelScores,
    weights: &WeightVector,
    explanation: &str,
) -> Vec<RecommendedAction> {
    let utility = base_utility(scores, weights);
    let reforest = round2(utility);
    debug!(utility, reforest, "ranking parcel actions");

    vec![
        RecommendedAction {
            action: ActionKind::Reforest,
            utility: reforest,
            confidence: Confidence::Medium,
            explanation: explanation.to_string(),
            drivers: REFOREST_DRIVERS.iter().map(|d| d.to_string()).collect(),
        },
        RecommendedAction {
            action: ActionKind::Buffer,
            utility: round2(reforest - BUFFER_UTILITY_OFFSET),
            confidence: Confidence::Medium,
            explanation: BUFFER_EXPLANATION.to_string(),
            drivers: BUFFER_DRIVERS.iter().map(|d| d.to_string()).collect(),
        },
    ]
}

pub fn recommend_parcel(parcel: &ParcelRecord, weights: &WeightVector) -> ParcelRecommendation {
    ParcelRecommendation {
        parcel_id: parcel.parcel_id.clone(),
        ranked_actions: rank_actions(&parcel.scores, weights, &parcel.explanation),
        utility_breakdown: utility_breakdown(&parcel.scores, weights),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_scores() -> ParcelScores {
        ParcelScores::new(0.9, 0.4, 0.6, -0.12)
    }

    #[test]
    fn base_utility_is_dot_product() {
        let weights = WeightVector::new(0.35, 0.1, 0.35, -0.2);
        let expected = 0.9 * 0.35 + 0.4 * 0.1 + 0.6 * 0.35 + (-0.12 * -0.2);
        assert!((base_utility(&sample_scores(), &weights) - expected).abs() < 1e-12);
    }

    #[test]
    fn zero_dimensions_contribute_nothing() {
        let scores = ParcelScores::new(1.0, 0.0, 0.0, 0.0);
        let weights = WeightVector::new(0.5, 9.0, 9.0, 9.0);
        assert_eq!(base_utility(&scores, &weights), 0.5);
    }

    #[test]
    fn rank_actions_emits_reforest_then_buffer() {
        let weights = WeightVector::new(0.35, 0.1, 0.35, -0.2);
        let actions = rank_actions(&sample_scores(), &weights, "steep and burned");

        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].action, ActionKind::Reforest);
        assert_eq!(actions[0].explanation, "steep and burned");
        assert_eq!(actions[0].drivers, vec!["burn_severity", "slope"]);
        assert_eq!(actions[1].action, ActionKind::Buffer);
        assert_eq!(actions[1].explanation, BUFFER_EXPLANATION);
        assert_eq!(actions[1].drivers, vec!["slope", "erosion"]);
        assert!(actions
            .iter()
            .all(|action| action.confidence == Confidence::Medium));
        // 0.315 + 0.04 + 0.21 + 0.024 = 0.589
        assert_eq!(actions[0].utility, 0.59);
        assert_eq!(actions[1].utility, 0.54);
    }

    #[test]
    fn buffer_gap_survives_rounding_boundary() {
        // 0.015 rounds up to 0.02, while 0.015 - 0.05 would round to -0.04.
        let scores = ParcelScores::new(0.015, 0.0, 0.0, 0.0);
        let weights = WeightVector::new(1.0, 0.0, 0.0, 0.0);
        let actions = rank_actions(&scores, &weights, "");
        assert_eq!(actions[0].utility, 0.02);
        assert_eq!(actions[1].utility, -0.03);
    }

    #[test]
    fn breakdown_matches_products() {
        let weights = WeightVector::new(0.3, 0.3, 0.25, -0.15);
        let breakdown = utility_breakdown(&sample_scores(), &weights);
        assert_eq!(breakdown.env, 0.9 * 0.3);
        assert_eq!(breakdown.risk_penalty, -0.12 * -0.15);
    }
}
