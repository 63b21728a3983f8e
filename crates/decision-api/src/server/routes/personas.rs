#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

#[derive(Debug, Serialize)]
struct PersonaListResponse {
    schema_version: String,
    personas: Vec<PersonaSummary>,
}

async fn list_personas(State(state): State<AppState>) -> Json<PersonaListResponse> {
    Json(PersonaListResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        personas: state.api.personas(),
    })
}

async fn get_persona(
    Path(persona): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<PersonaSummary>, HttpApiError> {
    Ok(Json(state.api.persona(&persona)?))
}

#[derive(Debug, Serialize)]
struct PersonaWeightsResponse {
    schema_version: String,
    persona: PersonaKey,
    controls: ControlValues,
    weights: WeightVector,
}

async fn persona_weights(
    Path(persona): Path<String>,
    State(state): State<AppState>,
    Json(controls): Json<PersonaControls>,
) -> Result<Json<PersonaWeightsResponse>, HttpApiError> {
    let key = parse_persona(&persona)?;
    let weights = state.api.weights(key.as_str(), &controls.values)?;

    Ok(Json(PersonaWeightsResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        persona: key,
        controls: controls.values,
        weights,
    }))
}
