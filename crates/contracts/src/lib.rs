//! v1 cross-boundary contracts for the decision core, HTTP API, and CLI.
//!
//! Persona keys, action keys, layer keys, and metric labels are part of the
//! observable contract: their serialized strings must never change.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod serde_action_or_unknown;

pub const SCHEMA_VERSION_V1: &str = "1.0";
pub const DEFAULT_HORIZON_YEARS: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown persona: {0}")]
pub struct UnknownPersonaError(pub String);

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PersonaKey {
    Hiker,
    Homebuyer,
    Farmer,
    Planner,
}

impl PersonaKey {
    pub const ALL: [PersonaKey; 4] = [Self::Hiker, Self::Homebuyer, Self::Farmer, Self::Planner];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hiker => "hiker",
            Self::Homebuyer => "homebuyer",
            Self::Farmer => "farmer",
            Self::Planner => "planner",
        }
    }
}

impl fmt::Display for PersonaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exact match only: no trimming, no case folding.
impl FromStr for PersonaKey {
    type Err = UnknownPersonaError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == value)
            .ok_or_else(|| UnknownPersonaError(value.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Reforest,
    Buffer,
    Recreation,
    Housing,
    Agriculture,
}

impl ActionKind {
    pub const ALL: [ActionKind; 5] = [
        Self::Reforest,
        Self::Buffer,
        Self::Recreation,
        Self::Housing,
        Self::Agriculture,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Reforest => "reforest",
            Self::Buffer => "buffer",
            Self::Recreation => "recreation",
            Self::Housing => "housing",
            Self::Agriculture => "agriculture",
        }
    }

    pub fn from_key(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.as_str() == value)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Env,
    Econ,
    Social,
    RiskPenalty,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [Self::Env, Self::Econ, Self::Social, Self::RiskPenalty];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Env => "env",
            Self::Econ => "econ",
            Self::Social => "social",
            Self::RiskPenalty => "risk_penalty",
        }
    }
}

/// One value per utility dimension. A dimension absent from the wire reads as 0.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DimensionValues {
    pub env: f64,
    pub econ: f64,
    pub social: f64,
    pub risk_penalty: f64,
}

/// Per-persona weights over the four dimensions.
pub type WeightVector = DimensionValues;

/// A parcel's externally supplied per-dimension scores.
pub type ParcelScores = DimensionValues;

impl DimensionValues {
    pub const fn new(env: f64, econ: f64, social: f64, risk_penalty: f64) -> Self {
        Self {
            env,
            econ,
            social,
            risk_penalty,
        }
    }

    pub fn get(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Env => self.env,
            Dimension::Econ => self.econ,
            Dimension::Social => self.social,
            Dimension::RiskPenalty => self.risk_penalty,
        }
    }

    pub fn set(&mut self, dimension: Dimension, value: f64) {
        let target = match dimension {
            Dimension::Env => &mut self.env,
            Dimension::Econ => &mut self.econ,
            Dimension::Social => &mut self.social,
            Dimension::RiskPenalty => &mut self.risk_penalty,
        };
        *target = value;
    }

    pub fn sum(&self) -> f64 {
        Dimension::ALL.iter().map(|dimension| self.get(*dimension)).sum()
    }
}

/// Slider values keyed by control name. Values are conventionally in [0, 1] but not clamped.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct ControlValues(pub BTreeMap<String, f64>);

impl ControlValues {
    pub fn get(&self, control: &str) -> Option<f64> {
        self.0.get(control).copied()
    }

    pub fn with(mut self, control: impl Into<String>, value: f64) -> Self {
        self.0.insert(control.into(), value);
        self
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for ControlValues {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(control, value)| (control.into(), value))
                .collect(),
        )
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PersonaControls {
    #[serde(default)]
    pub values: ControlValues,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PersonaSummary {
    pub persona: PersonaKey,
    pub display_name: String,
    pub default_horizon: u32,
    pub weights: WeightVector,
    pub slider_defaults: BTreeMap<String, f64>,
    pub visible_controls: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Centroid {
    pub lat: f64,
    pub lng: f64,
}

/// Parcel attributes as supplied by the parcel-data collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParcelRecord {
    pub parcel_id: String,
    pub area_ha: f64,
    pub centroid: Centroid,
    pub burn_class: String,
    pub burn_index: f64,
    #[serde(default)]
    pub risks: BTreeMap<String, f64>,
    pub recovery_stage: String,
    pub scores: ParcelScores,
    pub explanation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendedAction {
    pub action: ActionKind,
    pub utility: f64,
    pub confidence: Confidence,
    pub explanation: String,
    pub drivers: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BurnSeverity {
    pub class: String,
    pub index: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParcelDetailResponse {
    pub schema_version: String,
    pub parcel_id: String,
    pub centroid: Centroid,
    pub area_ha: f64,
    pub burn_severity: BurnSeverity,
    pub risks: BTreeMap<String, f64>,
    pub recovery_stage: String,
    pub scores: ParcelScores,
    pub recommended_actions: Vec<RecommendedAction>,
    pub persona: PersonaKey,
    pub horizon: u32,
}

fn default_horizon() -> u32 {
    DEFAULT_HORIZON_YEARS
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PersonaRecommendationRequest {
    /// Raw persona key; resolved against the catalog so unknown keys map to a typed error.
    pub persona: String,
    #[serde(default)]
    pub controls: PersonaControls,
    pub parcels: Vec<String>,
    #[serde(default = "default_horizon")]
    pub horizon: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParcelRecommendation {
    pub parcel_id: String,
    pub ranked_actions: Vec<RecommendedAction>,
    pub utility_breakdown: DimensionValues,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PersonaRecommendationResponse {
    pub schema_version: String,
    pub persona: PersonaKey,
    pub horizon: u32,
    pub weights: WeightVector,
    pub recommendations: Vec<ParcelRecommendation>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParcelFeature {
    pub id: String,
    pub geometry: Value,
    #[serde(default)]
    pub properties: Option<Value>,
}

fn default_include_recovery() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictRiskRequest {
    pub features: Vec<ParcelFeature>,
    #[serde(default = "default_include_recovery")]
    pub include_recovery: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskPrediction {
    pub id: String,
    pub reburn: f64,
    pub erosion: f64,
    pub flood: f64,
    pub recovery_stage: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictRiskResponse {
    pub schema_version: String,
    pub predictions: Vec<RiskPrediction>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MapLayer {
    Burn,
    Reburn,
    Erosion,
    Flood,
    Recovery,
    Recommendation,
}

impl MapLayer {
    pub const ALL: [MapLayer; 6] = [
        Self::Burn,
        Self::Reburn,
        Self::Erosion,
        Self::Flood,
        Self::Recovery,
        Self::Recommendation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Burn => "burn",
            Self::Reburn => "reburn",
            Self::Erosion => "erosion",
            Self::Flood => "flood",
            Self::Recovery => "recovery",
            Self::Recommendation => "recommendation",
        }
    }

    pub fn legend(self) -> &'static str {
        match self {
            Self::Burn => "Burn severity",
            Self::Reburn => "Reburn risk",
            Self::Erosion => "Erosion risk",
            Self::Flood => "Flood risk",
            Self::Recovery => "Recovery stage",
            Self::Recommendation => "Land-use",
        }
    }

    pub fn from_key(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|layer| layer.as_str() == value)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TileMetadata {
    pub layer: MapLayer,
    pub url: String,
    pub legend: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScenarioParcelAssignment {
    pub id: String,
    pub action: ActionKind,
}

/// Parcel id to action for one whole scenario, in submission order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScenarioPayload {
    #[serde(default)]
    pub parcels: Vec<ScenarioParcelAssignment>,
}

impl ScenarioPayload {
    pub fn len(&self) -> usize {
        self.parcels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parcels.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, ActionKind)> for ScenarioPayload {
    fn from_iter<I: IntoIterator<Item = (K, ActionKind)>>(iter: I) -> Self {
        Self {
            parcels: iter
                .into_iter()
                .map(|(id, action)| ScenarioParcelAssignment {
                    id: id.into(),
                    action,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScenarioConstraints {
    pub min_forest_pct: f64,
    pub max_housing_pct: f64,
    pub budget: f64,
}

fn default_compare_persona() -> String {
    PersonaKey::Planner.as_str().to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioCompareRequest {
    #[serde(default = "default_compare_persona")]
    pub persona: String,
    pub scenario_a: ScenarioPayload,
    pub scenario_b: ScenarioPayload,
    pub constraints: ScenarioConstraints,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    TotalRiskReduction,
    EconomicScore,
    EnvironmentalScore,
    SocialScore,
}

impl MetricKind {
    pub const ALL: [MetricKind; 4] = [
        Self::TotalRiskReduction,
        Self::EconomicScore,
        Self::EnvironmentalScore,
        Self::SocialScore,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::TotalRiskReduction => "Total risk reduction",
            Self::EconomicScore => "Economic score",
            Self::EnvironmentalScore => "Environmental score",
            Self::SocialScore => "Social score",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioMetric {
    pub label: String,
    pub scenario_a: f64,
    pub scenario_b: f64,
    pub delta: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParcelDelta {
    pub parcel_id: String,
    pub scenario_a: ActionKind,
    /// `None` serializes as `"unknown"`: the parcel has no assignment in scenario B.
    #[serde(with = "serde_action_or_unknown")]
    pub scenario_b: Option<ActionKind>,
    pub delta_utility: f64,
}

/// Action to rounded share of parcels. Only actions present in the scenario appear.
pub type LandUseShares = BTreeMap<ActionKind, f64>;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LandUsePercentages {
    pub scenario_a: LandUseShares,
    pub scenario_b: LandUseShares,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioSide {
    ScenarioA,
    ScenarioB,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    MinForestPct,
    MaxHousingPct,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConstraintViolation {
    pub scenario: ScenarioSide,
    pub constraint: ConstraintKind,
    pub limit: f64,
    pub actual: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioCompareResponse {
    pub schema_version: String,
    pub persona: PersonaKey,
    pub constraints: ScenarioConstraints,
    pub metrics: Vec<ScenarioMetric>,
    pub land_use_percentages: LandUsePercentages,
    pub parcel_deltas: Vec<ParcelDelta>,
    #[serde(default)]
    pub parcels_only_in_b: Vec<String>,
    #[serde(default)]
    pub constraint_violations: Vec<ConstraintViolation>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    UnknownPersona,
    ParcelNotFound,
    LayerNotFound,
    InvalidScenario,
    InternalError,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiError {
    pub schema_version: String,
    pub error_code: ErrorCode,
    pub message: String,
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(error_code: ErrorCode, message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            error_code,
            message: message.into(),
            details,
        }
    }
}
