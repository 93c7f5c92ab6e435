use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use venturelens_core::VentureLensError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Pipeline(#[from] VentureLensError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Pipeline(err) => match err {
                VentureLensError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                VentureLensError::NotEntitled { .. } => StatusCode::FORBIDDEN,
                VentureLensError::MissingCredential { .. } => StatusCode::SERVICE_UNAVAILABLE,
                VentureLensError::FlowFailed { .. } => StatusCode::BAD_GATEWAY,
                VentureLensError::Cancelled => StatusCode::REQUEST_TIMEOUT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "Request failed");
        }

        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use venturelens_core::{FlowKind, Tier};

    #[test]
    fn pipeline_errors_map_to_status_codes() {
        let cases = [
            (
                VentureLensError::InvalidInput("idea text must not be empty".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                VentureLensError::NotEntitled {
                    flow: FlowKind::Pivot,
                    tier: Tier::Free,
                },
                StatusCode::FORBIDDEN,
            ),
            (
                VentureLensError::missing_credential("openai"),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                VentureLensError::FlowFailed {
                    flow: FlowKind::Pivot,
                    message: "Failed to generate pivot".into(),
                    cause: Box::new(VentureLensError::EmptyResponse),
                },
                StatusCode::BAD_GATEWAY,
            ),
            (VentureLensError::Cancelled, StatusCode::REQUEST_TIMEOUT),
            (VentureLensError::EmptyResponse, StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn flow_failure_message_is_user_facing() {
        let err = ApiError::from(VentureLensError::FlowFailed {
            flow: FlowKind::Roadmap,
            message: "Failed to generate roadmap".into(),
            cause: Box::new(VentureLensError::MalformedResponse("eof".into())),
        });
        assert_eq!(err.to_string(), "Failed to generate roadmap");
    }
}
