//! Request-level errors and their HTTP responses

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::store::StoreError;

/// Errors a route handler can end with
///
/// The response body only ever carries a generic message; the detail
/// goes to the log.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found")]
    NotFound,

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> &'static str {
        match self {
            AppError::NotFound => "Unable to locate that page. Check the URL.",
            AppError::StoreUnavailable(_) => {
                "The blog is temporarily unavailable. Please try again shortly."
            }
            AppError::Internal(_) => "Something went wrong while building this page.",
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => AppError::NotFound,
            StoreError::Unavailable(msg) => AppError::StoreUnavailable(msg),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(format!("{:#}", err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            AppError::NotFound => tracing::debug!("Responding 404"),
            _ => tracing::error!("Responding {}: {}", status.as_u16(), self),
        }

        let reason = status.canonical_reason().unwrap_or("Error");
        let body = format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>{code} {reason}</title></head>
<body>
<h1>{code} {reason}</h1>
<p>{message}</p>
<p><a href="/">Back to the front page</a></p>
</body>
</html>
"#,
            code = status.as_u16(),
            reason = reason,
            message = self.public_message(),
        );

        (status, Html(body)).into_response()
    }
}
