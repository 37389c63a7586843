//! Defines the app level error type and its conversion to JSON error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// The errors that may occur while building the dashboard.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The query string could not be parsed as `key=value` pairs.
    #[error("could not parse the query string \"{0}\"")]
    InvalidQueryString(String),

    /// The request to the bank data provider could not be sent, or the
    /// response body could not be read.
    ///
    /// Callers should pass in the original error as a string.
    #[error("could not reach the bank data provider: {0}")]
    ProviderUnavailable(String),

    /// The bank data provider answered with a non-success status.
    #[error("bank data provider request to {path} failed ({status}): {body}")]
    ProviderRequest {
        /// The API path that was requested.
        path: String,
        /// The HTTP status code of the response.
        status: u16,
        /// The response body, usually a JSON error object.
        body: String,
    },

    /// The bank data provider's response was not the expected JSON.
    #[error("could not parse the bank data provider response from {path}: {reason}")]
    InvalidProviderResponse {
        /// The API path that was requested.
        path: String,
        /// The parse error.
        reason: String,
    },

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        Error::ProviderUnavailable(value.to_string())
    }
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidQueryString(_) => StatusCode::BAD_REQUEST,
            Error::ProviderUnavailable(_)
            | Error::ProviderRequest { .. }
            | Error::InvalidProviderResponse { .. } => StatusCode::BAD_GATEWAY,
            Error::InvalidTimezoneError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = match &self {
            Error::InvalidQueryString(_) => self.to_string(),
            Error::ProviderUnavailable(_)
            | Error::ProviderRequest { .. }
            | Error::InvalidProviderResponse { .. } => {
                tracing::error!("bank data provider call failed: {self}");
                "Could not load your accounts from the bank data provider. Try again later."
                    .to_owned()
            }
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {error}");
                "An unexpected error occurred, check the server logs for more details.".to_owned()
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use super::Error;

    async fn response_json(error: Error) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn provider_failures_are_bad_gateway_without_details() {
        let (status, body) = response_json(Error::ProviderRequest {
            path: "/accounts/get".to_owned(),
            status: 400,
            body: "{\"error_code\":\"INVALID_ACCESS_TOKEN\"}".to_owned(),
        })
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        let message = body["error"].as_str().unwrap();
        assert!(!message.contains("INVALID_ACCESS_TOKEN"));
    }

    #[tokio::test]
    async fn invalid_query_string_is_bad_request() {
        let (status, body) = response_json(Error::InvalidQueryString("%%".to_owned())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("%%"));
    }

    #[tokio::test]
    async fn unexpected_errors_are_internal() {
        let (status, _) = response_json(Error::InvalidTimezoneError("Mars/Base".to_owned())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
