#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("server io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug)]
struct HttpApiError {
    status: StatusCode,
    error: ApiError,
}

impl HttpApiError {
    fn unknown_persona(persona: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: ApiError::new(
                ErrorCode::UnknownPersona,
                "persona is not one of hiker, homebuyer, farmer, planner",
                Some(format!("persona={persona}")),
            ),
        }
    }

    fn internal(message: impl Into<String>, details: String) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: ApiError::new(ErrorCode::InternalError, message, Some(details)),
        }
    }

    fn from_decision(err: DecisionError) -> Self {
        match err {
            DecisionError::UnknownPersona(err) => Self::unknown_persona(&err.0),
            DecisionError::ParcelLookup(ParcelLookupError::NotFound(parcel_id)) => Self {
                status: StatusCode::NOT_FOUND,
                error: ApiError::new(
                    ErrorCode::ParcelNotFound,
                    "Parcel not found",
                    Some(format!("parcel_id={parcel_id}")),
                ),
            },
            DecisionError::ParcelLookup(other @ ParcelLookupError::Unavailable(_)) => Self {
                status: StatusCode::SERVICE_UNAVAILABLE,
                error: ApiError::new(
                    ErrorCode::InternalError,
                    "parcel source unavailable",
                    Some(other.to_string()),
                ),
            },
            DecisionError::UnknownLayer(layer) => Self {
                status: StatusCode::NOT_FOUND,
                error: ApiError::new(
                    ErrorCode::LayerNotFound,
                    "Layer not found",
                    Some(format!("layer={layer}")),
                ),
            },
            err @ DecisionError::DuplicateParcel { .. } => Self {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::new(
                    ErrorCode::InvalidScenario,
                    "each parcel may be assigned only once per scenario",
                    Some(err.to_string()),
                ),
            },
        }
    }
}

impl From<DecisionError> for HttpApiError {
    fn from(value: DecisionError) -> Self {
        Self::from_decision(value)
    }
}

impl IntoResponse for HttpApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}
