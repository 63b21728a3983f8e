fn default_layer() -> String {
    "burn".to_string()
}

#[derive(Debug, Deserialize)]
struct MapTileQuery {
    #[serde(default = "default_layer")]
    layer: String,
    z: u32,
    x: u32,
    y: u32,
}

async fn map_tiles(
    State(state): State<AppState>,
    Query(query): Query<MapTileQuery>,
) -> Result<Json<TileMetadata>, HttpApiError> {
    let tile = state
        .api
        .tile_metadata(&query.layer, query.z, query.x, query.y)?;
    Ok(Json(tile))
}

#[derive(Debug, Deserialize)]
struct ParcelDetailQuery {
    parcel_id: String,
    persona: Option<String>,
    horizon: Option<u32>,
}

async fn parcel_details(
    State(state): State<AppState>,
    Query(query): Query<ParcelDetailQuery>,
) -> Result<Json<ParcelDetailResponse>, HttpApiError> {
    let persona = match query.persona.as_deref() {
        Some(raw) => parse_persona(raw)?,
        None => PersonaKey::Hiker,
    };
    let horizon = query.horizon.unwrap_or(DEFAULT_HORIZON_YEARS);

    let detail = state.api.parcel_detail(&query.parcel_id, persona, horizon)?;
    Ok(Json(detail))
}

async fn predict_risks(
    State(state): State<AppState>,
    Json(request): Json<PredictRiskRequest>,
) -> Json<PredictRiskResponse> {
    Json(state.api.predict_risks(&request))
}

async fn recommend_actions(
    State(state): State<AppState>,
    Json(request): Json<PersonaRecommendationRequest>,
) -> Result<Json<PersonaRecommendationResponse>, HttpApiError> {
    // Parcel sources are synchronous; keep them off the async workers.
    let response = tokio::task::spawn_blocking(move || state.api.recommend(&request))
        .await
        .map_err(|err| HttpApiError::internal("recommendation task failed", err.to_string()))??;
    Ok(Json(response))
}
