//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use fulfillment::FulfillmentError;
use graph::GraphError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Fulfillment pipeline error.
    Fulfillment(FulfillmentError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Fulfillment(err) => fulfillment_error_to_response(err),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn fulfillment_error_to_response(err: FulfillmentError) -> (StatusCode, String) {
    match &err {
        FulfillmentError::OrderNeverVisible(_) => (StatusCode::NOT_FOUND, err.to_string()),
        FulfillmentError::LineMappingNotFound { .. } => (StatusCode::CONFLICT, err.to_string()),
        FulfillmentError::AttemptsExhausted { .. } => {
            tracing::error!(error = %err, "fulfillment attempts exhausted");
            (StatusCode::SERVICE_UNAVAILABLE, err.to_string())
        }
        FulfillmentError::EmptyCart | FulfillmentError::InvalidQuantity(_) => {
            (StatusCode::BAD_REQUEST, err.to_string())
        }
        FulfillmentError::Graph(graph_err) => match graph_err {
            GraphError::UnknownCheckout(_) => (StatusCode::NOT_FOUND, err.to_string()),
            GraphError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, err.to_string()),
            GraphError::Transport(_) => {
                tracing::error!(error = %err, "graph transport failure");
                (StatusCode::BAD_GATEWAY, err.to_string())
            }
        },
    }
}

impl From<FulfillmentError> for ApiError {
    fn from(err: FulfillmentError) -> Self {
        ApiError::Fulfillment(err)
    }
}
