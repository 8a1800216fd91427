pub mod feed;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{error, warn};
use zmanim_core::ZmanimError;

/// Convert errors to plain-text HTTP responses.
///
/// Request problems (bad or missing location, malformed parameters) are 400s
/// carrying the error message; anything else is a 500.
pub struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self.0.downcast_ref::<ZmanimError>() {
            Some(err) if err.is_client_error() => {
                warn!(error = %err, "Rejected feed request");
                (StatusCode::BAD_REQUEST, err.to_string()).into_response()
            }
            _ => {
                error!(error = %self.0, "Feed generation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Internal Server Error: {}", self.0),
                )
                    .into_response()
            }
        }
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
