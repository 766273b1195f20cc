//! HTTP error mapping

use lca_advisory::{AdvisoryError, AdvisoryFailure};
use lca_core::ValidationError;
use lca_store::StoreError;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Rejection, Reply};

/// `{error, details?, fallback?}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Short summary
    pub error: String,
    /// Underlying cause
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// User-safe replacement text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,
}

impl ErrorBody {
    fn new(error: impl Into<String>, details: Option<String>) -> Self {
        Self {
            error: error.into(),
            details,
            fallback: None,
        }
    }
}

impl From<AdvisoryFailure> for ErrorBody {
    fn from(failure: AdvisoryFailure) -> Self {
        Self {
            error: failure.error,
            details: failure.details,
            fallback: failure.fallback,
        }
    }
}

/// Errors surfaced by request handlers
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Input failed coercion or domain checks
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Store lookup or persistence failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A stored result could not be rendered
    #[error("export failed: {0}")]
    Export(#[source] serde_json::Error),

    /// No result has been stored yet
    #[error("no results stored")]
    NoLatest,

    /// Request body has the wrong shape
    #[error("invalid request body: {0}")]
    BadRequest(String),

    /// Insight generation failed
    #[error("insights unavailable: {0}")]
    Insights(AdvisoryError),

    /// Suggestion generation failed
    #[error("suggestions unavailable: {0}")]
    Suggestions(AdvisoryError),

    /// A newer advisory request for the same subject was issued
    #[error("superseded by a newer request")]
    Superseded,
}

impl ApiError {
    /// HTTP status for this error
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Store(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            Self::NoLatest => StatusCode::NOT_FOUND,
            Self::Store(_) | Self::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Insights(_) | Self::Suggestions(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Superseded => StatusCode::CONFLICT,
        }
    }

    /// JSON body for this error
    #[must_use]
    pub fn body(&self) -> ErrorBody {
        match self {
            Self::Validation(e) => ErrorBody::new("Invalid project data", Some(e.to_string())),
            Self::BadRequest(msg) => ErrorBody::new("Invalid request body", Some(msg.clone())),
            Self::Store(e) if e.is_not_found() => {
                ErrorBody::new("Analysis result not found", Some(e.to_string()))
            }
            Self::Store(e) => ErrorBody::new("Storage failure", Some(e.to_string())),
            Self::Export(e) => ErrorBody::new("Export failed", Some(e.to_string())),
            Self::NoLatest => ErrorBody::new("Analysis result not found", Some(self.to_string())),
            Self::Insights(e) => AdvisoryFailure::insights(e).into(),
            Self::Suggestions(e) => AdvisoryFailure::suggestions(e).into(),
            Self::Superseded => ErrorBody::new("Request superseded", None),
        }
    }
}

impl Reply for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }
        warp::reply::with_status(warp::reply::json(&self.body()), status).into_response()
    }
}

/// Map warp's own rejections onto the JSON error shape
///
/// # Errors
/// Never; every rejection becomes a response.
pub async fn handle_rejection(err: Rejection) -> Result<Response, Infallible> {
    let (status, body) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, ErrorBody::new("Not found", None))
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (
            StatusCode::BAD_REQUEST,
            ErrorBody::new("Invalid request body", Some(e.to_string())),
        )
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        (
            StatusCode::PAYLOAD_TOO_LARGE,
            ErrorBody::new("Request body too large", None),
        )
    } else if err.find::<warp::reject::LengthRequired>().is_some() {
        (
            StatusCode::LENGTH_REQUIRED,
            ErrorBody::new("Content-Length required", None),
        )
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            ErrorBody::new("Method not allowed", None),
        )
    } else {
        tracing::error!(rejection = ?err, "Unhandled rejection");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorBody::new("Internal server error", None),
        )
    };
    Ok(warp::reply::with_status(warp::reply::json(&body), status).into_response())
}
