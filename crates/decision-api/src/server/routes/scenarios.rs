async fn scenario_compare(
    State(state): State<AppState>,
    Json(request): Json<ScenarioCompareRequest>,
) -> Result<Json<ScenarioCompareResponse>, HttpApiError> {
    let response = state.api.compare(&request)?;
    info!(
        persona = %response.persona,
        violations = response.constraint_violations.len(),
        "scenario comparison served"
    );
    Ok(Json(response))
}
