use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, Query, Request, State};
use axum::http::header::{HeaderName, HeaderValue};
use axum::http::{Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use contracts::{
    ApiError, ControlValues, ErrorCode, ParcelDetailResponse, PersonaControls, PersonaKey,
    PersonaRecommendationRequest, PersonaRecommendationResponse, PersonaSummary,
    PredictRiskRequest, PredictRiskResponse, ScenarioCompareRequest, ScenarioCompareResponse,
    TileMetadata, WeightVector, DEFAULT_HORIZON_YEARS, SCHEMA_VERSION_V1,
};
use decision_core::ParcelLookupError;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{DecisionApi, DecisionError};

include!("error.rs");
include!("state.rs");
include!("routes/personas.rs");
include!("routes/parcels.rs");
include!("routes/scenarios.rs");
include!("util.rs");

pub async fn serve(addr: SocketAddr, api: DecisionApi) -> Result<(), ServerError> {
    let app = router(api);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "decision api listening");
    axum::serve(listener, app).await?;

    Ok(())
}

pub fn router(api: DecisionApi) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/personas", get(list_personas))
        .route("/api/v1/personas/{persona}", get(get_persona))
        .route("/api/v1/personas/{persona}/weights", post(persona_weights))
        .route("/api/v1/map_tiles", get(map_tiles))
        .route("/api/v1/parcel_details", get(parcel_details))
        .route("/api/v1/predict_risks", post(predict_risks))
        .route("/api/v1/recommend_actions", post(recommend_actions))
        .route("/api/v1/scenario_compare", post(scenario_compare))
        .layer(middleware::from_fn(cors_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState::new(api))
}

async fn cors_middleware(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        let mut response = Response::new(axum::body::Body::empty());
        *response.status_mut() = StatusCode::NO_CONTENT;
        apply_cors_headers(response.headers_mut());
        return response;
    }

    let mut response = next.run(request).await;
    apply_cors_headers(response.headers_mut());
    response
}
