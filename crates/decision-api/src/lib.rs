//! In-process decision facade with persona weighting, parcel scoring, scenario
//! comparison, and the HTTP server that exposes them.

mod config;
mod server;

use std::sync::Arc;

use contracts::{
    BurnSeverity, ControlValues, MapLayer, ParcelDetailResponse, PersonaKey,
    PersonaRecommendationRequest, PersonaRecommendationResponse, PersonaSummary,
    PredictRiskRequest, PredictRiskResponse, ScenarioCompareRequest, ScenarioCompareResponse,
    ScenarioSide, TileMetadata, WeightVector, SCHEMA_VERSION_V1,
};
use decision_core::scenario::find_duplicate_parcel;
use decision_core::utility::{rank_actions, recommend_parcel};
use decision_core::{
    BaselineScenarioModel, ParcelLookupError, ParcelSource, PersonaCatalog, RiskModel,
    ScenarioComparator, ScenarioModel, StubParcelSource, StubRiskModel, UnknownPersonaError,
};
use rayon::prelude::*;
use tracing::{debug, warn};

pub use config::{ConfigError, ServerConfig, DEFAULT_BIND_ADDR, DEFAULT_TILE_BASE_URL};
pub use server::{router, serve, ServerError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecisionError {
    #[error(transparent)]
    UnknownPersona(#[from] UnknownPersonaError),
    #[error(transparent)]
    ParcelLookup(#[from] ParcelLookupError),
    #[error("unknown map layer: {0}")]
    UnknownLayer(String),
    #[error("parcel {parcel_id} is assigned more than once in {scenario:?}")]
    DuplicateParcel {
        scenario: ScenarioSide,
        parcel_id: String,
    },
}

#[derive(Clone)]
pub struct DecisionApi {
    catalog: Arc<PersonaCatalog>,
    parcels: Arc<dyn ParcelSource>,
    risk_model: Arc<dyn RiskModel>,
    comparator: ScenarioComparator<Arc<dyn ScenarioModel>>,
    tile_base_url: String,
}

impl Default for DecisionApi {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DecisionApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecisionApi")
            .field("catalog", &self.catalog)
            .field("tile_base_url", &self.tile_base_url)
            .finish_non_exhaustive()
    }
}

impl DecisionApi {
    /// Standard personas with the stub parcel source, risk model, and baseline scenario model.
    pub fn new() -> Self {
        Self {
            catalog: Arc::new(PersonaCatalog::standard()),
            parcels: Arc::new(StubParcelSource),
            risk_model: Arc::new(StubRiskModel),
            comparator: ScenarioComparator::new(Arc::new(BaselineScenarioModel)),
            tile_base_url: DEFAULT_TILE_BASE_URL.to_string(),
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new().with_tile_base_url(config.tile_base_url.clone())
    }

    pub fn with_parcel_source(mut self, parcels: Arc<dyn ParcelSource>) -> Self {
        self.parcels = parcels;
        self
    }

    pub fn with_risk_model(mut self, risk_model: Arc<dyn RiskModel>) -> Self {
        self.risk_model = risk_model;
        self
    }

    pub fn with_scenario_model(mut self, model: Arc<dyn ScenarioModel>) -> Self {
        self.comparator = ScenarioComparator::new(model);
        self
    }

    pub fn with_tile_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.tile_base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn personas(&self) -> Vec<PersonaSummary> {
        self.catalog
            .personas()
            .map(|definition| definition.summary())
            .collect()
    }

    pub fn persona(&self, persona: &str) -> Result<PersonaSummary, DecisionError> {
        Ok(self.catalog.definition_for(persona)?.summary())
    }

    pub fn weights(
        &self,
        persona: &str,
        controls: &ControlValues,
    ) -> Result<WeightVector, DecisionError> {
        Ok(self.catalog.weights_for(persona, controls)?)
    }

    /// Scores one parcel with the persona's default sliders.
    pub fn parcel_detail(
        &self,
        parcel_id: &str,
        persona: PersonaKey,
        horizon: u32,
    ) -> Result<ParcelDetailResponse, DecisionError> {
        let parcel = self.parcels.fetch_parcel(parcel_id)?;
        let weights = self.catalog.weights(persona, &ControlValues::default());
        let recommended_actions = rank_actions(&parcel.scores, &weights, &parcel.explanation);

        Ok(ParcelDetailResponse {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            parcel_id: parcel.parcel_id,
            centroid: parcel.centroid,
            area_ha: parcel.area_ha,
            burn_severity: BurnSeverity {
                class: parcel.burn_class,
                index: parcel.burn_index,
            },
            risks: parcel.risks,
            recovery_stage: parcel.recovery_stage,
            scores: parcel.scores,
            recommended_actions,
            persona,
            horizon,
        })
    }

    /// Derives weights once, then scores each requested parcel in parallel.
    /// Parcels the source cannot resolve are skipped; output keeps request order.
    pub fn recommend(
        &self,
        request: &PersonaRecommendationRequest,
    ) -> Result<PersonaRecommendationResponse, DecisionError> {
        let persona = request.persona.parse::<PersonaKey>()?;
        let weights = self.catalog.weights(persona, &request.controls.values);

        let recommendations = request
            .parcels
            .par_iter()
            .filter_map(|parcel_id| match self.parcels.fetch_parcel(parcel_id) {
                Ok(parcel) => Some(recommend_parcel(&parcel, &weights)),
                Err(err) => {
                    warn!(parcel_id = %parcel_id, error = %err, "skipping parcel");
                    None
                }
            })
            .collect::<Vec<_>>();

        debug!(
            persona = %persona,
            requested = request.parcels.len(),
            scored = recommendations.len(),
            "recommendations built"
        );

        Ok(PersonaRecommendationResponse {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            persona,
            horizon: request.horizon,
            weights,
            recommendations,
        })
    }

    pub fn predict_risks(&self, request: &PredictRiskRequest) -> PredictRiskResponse {
        PredictRiskResponse {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            predictions: request
                .features
                .iter()
                .map(|feature| self.risk_model.predict(feature, request.include_recovery))
                .collect(),
        }
    }

    pub fn tile_metadata(
        &self,
        layer: &str,
        z: u32,
        x: u32,
        y: u32,
    ) -> Result<TileMetadata, DecisionError> {
        let layer = MapLayer::from_key(layer)
            .ok_or_else(|| DecisionError::UnknownLayer(layer.to_string()))?;
        Ok(TileMetadata {
            layer,
            url: format!(
                "{}/{}/{z}/{x}/{y}.pbf",
                self.tile_base_url,
                layer.as_str()
            ),
            legend: layer.legend().to_string(),
        })
    }

    /// Rejects scenarios that assign a parcel twice; constraints are reported, not enforced.
    pub fn compare(
        &self,
        request: &ScenarioCompareRequest,
    ) -> Result<ScenarioCompareResponse, DecisionError> {
        let persona = request.persona.parse::<PersonaKey>()?;
        for (side, scenario) in [
            (ScenarioSide::ScenarioA, &request.scenario_a),
            (ScenarioSide::ScenarioB, &request.scenario_b),
        ] {
            if let Some(parcel_id) = find_duplicate_parcel(scenario) {
                return Err(DecisionError::DuplicateParcel {
                    scenario: side,
                    parcel_id: parcel_id.to_string(),
                });
            }
        }

        let weights = self.catalog.weights(persona, &ControlValues::default());
        Ok(self.comparator.compare(
            persona,
            &request.scenario_a,
            &request.scenario_b,
            request.constraints,
            &weights,
        ))
    }
}

#[cfg(test)]
mod tests {
    use contracts::{
        ActionKind, Centroid, MetricKind, ParcelFeature, ParcelRecord, ParcelScores,
        PersonaControls, RiskPrediction, ScenarioConstraints, ScenarioPayload,
    };
    use decision_core::scenario::action_share;
    use decision_core::InMemoryParcelSource;

    use super::*;

    fn parcel(parcel_id: &str, env: f64) -> ParcelRecord {
        ParcelRecord {
            parcel_id: parcel_id.to_string(),
            area_ha: 4.0,
            centroid: Centroid {
                lat: 39.8,
                lng: -121.6,
            },
            burn_class: "moderate".to_string(),
            burn_index: 0.5,
            risks: Default::default(),
            recovery_stage: "early".to_string(),
            scores: ParcelScores::new(env, 0.2, 0.3, -0.1),
            explanation: format!("{parcel_id} explanation"),
        }
    }

    fn recommendation_request(parcels: &[&str]) -> PersonaRecommendationRequest {
        PersonaRecommendationRequest {
            persona: "hiker".to_string(),
            controls: PersonaControls::default(),
            parcels: parcels.iter().map(|id| id.to_string()).collect(),
            horizon: 5,
        }
    }

    #[test]
    fn recommend_skips_missing_parcels_and_keeps_order() {
        let source = InMemoryParcelSource::new([parcel("a", 0.1), parcel("c", 0.9)]);
        let api = DecisionApi::new().with_parcel_source(Arc::new(source));

        let response = api
            .recommend(&recommendation_request(&["c", "b", "a"]))
            .expect("hiker is known");
        let ids = response
            .recommendations
            .iter()
            .map(|rec| rec.parcel_id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["c", "a"]);
        assert_eq!(response.horizon, 5);
        assert_eq!(
            response.recommendations[0].ranked_actions[0].explanation,
            "c explanation"
        );
    }

    #[test]
    fn parcel_detail_maps_missing_parcel() {
        let api = DecisionApi::new().with_parcel_source(Arc::new(InMemoryParcelSource::default()));
        assert_eq!(
            api.parcel_detail("nope", PersonaKey::Hiker, 10).err(),
            Some(DecisionError::ParcelLookup(ParcelLookupError::NotFound(
                "nope".to_string()
            )))
        );
    }

    #[test]
    fn parcel_detail_reshapes_stub_parcel() {
        let detail = DecisionApi::new()
            .parcel_detail("p1", PersonaKey::Farmer, 10)
            .expect("stub parcel");
        assert_eq!(detail.burn_severity.class, "high");
        assert_eq!(detail.centroid.lat, 40.1);
        assert_eq!(detail.recommended_actions.len(), 2);
        assert_eq!(detail.persona, PersonaKey::Farmer);
    }

    #[test]
    fn tile_metadata_formats_url() {
        let api = DecisionApi::new().with_tile_base_url("https://tiles.test/");
        let tile = api.tile_metadata("erosion", 7, 21, 48).expect("known layer");
        assert_eq!(tile.url, "https://tiles.test/erosion/7/21/48.pbf");
        assert_eq!(tile.legend, "Erosion risk");
        assert_eq!(
            api.tile_metadata("lava", 1, 1, 1),
            Err(DecisionError::UnknownLayer("lava".to_string()))
        );
    }

    #[test]
    fn compare_rejects_duplicate_assignments() {
        let request = ScenarioCompareRequest {
            persona: "planner".to_string(),
            scenario_a: [("p1", ActionKind::Reforest)].into_iter().collect(),
            scenario_b: [("p1", ActionKind::Buffer), ("p1", ActionKind::Housing)]
                .into_iter()
                .collect::<ScenarioPayload>(),
            constraints: ScenarioConstraints {
                min_forest_pct: 0.0,
                max_housing_pct: 1.0,
                budget: 0.0,
            },
        };
        assert_eq!(
            DecisionApi::new().compare(&request).err(),
            Some(DecisionError::DuplicateParcel {
                scenario: ScenarioSide::ScenarioB,
                parcel_id: "p1".to_string(),
            })
        );
    }

    fn open_constraints() -> ScenarioConstraints {
        ScenarioConstraints {
            min_forest_pct: 0.0,
            max_housing_pct: 1.0,
            budget: 0.0,
        }
    }

    #[test]
    fn body_personas_must_be_known() {
        let api = DecisionApi::new();
        let mut request = recommendation_request(&["p1"]);
        request.persona = "tourist".to_string();
        assert_eq!(
            api.recommend(&request).err(),
            Some(DecisionError::UnknownPersona(UnknownPersonaError(
                "tourist".to_string()
            )))
        );

        let compare = ScenarioCompareRequest {
            persona: "Planner".to_string(),
            scenario_a: ScenarioPayload::default(),
            scenario_b: ScenarioPayload::default(),
            constraints: open_constraints(),
        };
        assert!(matches!(
            api.compare(&compare),
            Err(DecisionError::UnknownPersona(_))
        ));
    }

    /// Scores each side by its reforest share, scaled by the persona's env weight.
    struct ReforestShareModel;

    impl ScenarioModel for ReforestShareModel {
        fn metric(
            &self,
            kind: MetricKind,
            _scenario: ScenarioSide,
            assignment: &ScenarioPayload,
            weights: &WeightVector,
        ) -> f64 {
            match kind {
                MetricKind::EnvironmentalScore => {
                    action_share(assignment, ActionKind::Reforest) * weights.env
                }
                MetricKind::EconomicScore => action_share(assignment, ActionKind::Housing),
                _ => assignment.len() as f64,
            }
        }

        fn delta_utility(&self, _parcel_id: &str, from: ActionKind, to: Option<ActionKind>) -> f64 {
            match to {
                Some(to) if to == from => 0.0,
                Some(_) => 1.0,
                None => -1.0,
            }
        }
    }

    #[test]
    fn compare_uses_installed_scenario_model() {
        let api = DecisionApi::new().with_scenario_model(Arc::new(ReforestShareModel));
        let request = ScenarioCompareRequest {
            persona: "planner".to_string(),
            scenario_a: [
                ("p1", ActionKind::Reforest),
                ("p2", ActionKind::Housing),
                ("p3", ActionKind::Buffer),
            ]
            .into_iter()
            .collect(),
            scenario_b: [
                ("p1", ActionKind::Reforest),
                ("p2", ActionKind::Reforest),
                ("p3", ActionKind::Reforest),
                ("p4", ActionKind::Buffer),
            ]
            .into_iter()
            .collect(),
            constraints: open_constraints(),
        };

        let response = api.compare(&request).expect("valid scenarios");
        let env_weight = api
            .weights("planner", &ControlValues::default())
            .expect("planner is known")
            .env;

        let environmental = &response.metrics[2];
        assert_eq!(environmental.label, "Environmental score");
        assert!((environmental.scenario_a - env_weight / 3.0).abs() < 1e-12);
        assert!((environmental.scenario_b - 0.75 * env_weight).abs() < 1e-12);
        // 0.75 * 1/3 - 1/3 * 1/3 with the default planner priorities.
        assert_eq!(environmental.delta, 0.14);

        let economic = &response.metrics[1];
        assert!((economic.scenario_a - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(economic.scenario_b, 0.0);
        assert_eq!(economic.delta, -0.33);

        assert_eq!(response.metrics[0].scenario_a, 3.0);
        assert_eq!(response.metrics[0].scenario_b, 4.0);
        assert_eq!(response.metrics[0].delta, 1.0);

        let deltas = response
            .parcel_deltas
            .iter()
            .map(|delta| (delta.parcel_id.as_str(), delta.delta_utility))
            .collect::<Vec<_>>();
        assert_eq!(deltas, vec![("p1", 0.0), ("p2", 1.0), ("p3", 1.0)]);
        assert_eq!(response.parcels_only_in_b, vec!["p4"]);
    }

    struct FeatureCountRiskModel;

    impl RiskModel for FeatureCountRiskModel {
        fn predict(&self, feature: &ParcelFeature, include_recovery: bool) -> RiskPrediction {
            RiskPrediction {
                id: feature.id.clone(),
                reburn: feature.id.len() as f64,
                erosion: 0.0,
                flood: 1.0,
                recovery_stage: include_recovery.then(|| format!("stage-{}", feature.id)),
            }
        }
    }

    #[test]
    fn predict_risks_uses_installed_risk_model() {
        let api = DecisionApi::new().with_risk_model(Arc::new(FeatureCountRiskModel));
        let feature = |id: &str| ParcelFeature {
            id: id.to_string(),
            geometry: serde_json::json!({"type": "Point", "coordinates": [0.0, 0.0]}),
            properties: None,
        };
        let request = PredictRiskRequest {
            features: vec![feature("f1"), feature("north-ridge")],
            include_recovery: true,
        };

        let response = api.predict_risks(&request);
        assert_eq!(response.predictions.len(), 2);
        assert_eq!(response.predictions[1].id, "north-ridge");
        assert_eq!(response.predictions[1].reburn, 11.0);
        assert_eq!(
            response.predictions[0].recovery_stage.as_deref(),
            Some("stage-f1")
        );
    }
}
