use crate::responses::ErrorBody;
use reqwest::StatusCode;
use thiserror::Error;

pub const SERVICE_UNAVAILABLE_MESSAGE: &str =
    "Service temporarily unavailable. Please try again later.";
pub const SERVER_ERROR_MESSAGE: &str =
    "Server error. Please contact support if the problem persists.";
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred";

#[derive(Error, Debug)]
pub enum ApiError {
    /// HTTP 503, whatever the body says.
    #[error("Service temporarily unavailable. Please try again later.")]
    ServiceUnavailable,

    /// Any other status of 500 or above.
    #[error("Server error. Please contact support if the problem persists.")]
    Server { status: u16 },

    /// A non-success status below 500, carrying the backend's own message when it sent one.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// The request never produced a response (connection refused, timeout, ...).
    #[error("{}", transport_message(.0))]
    Transport(#[from] reqwest::Error),

    #[error("Failed to deserialize the API response: {0}")]
    Deserialization(String),

    #[error("Failed to build the HTTP request: {0}")]
    RequestBuild(String),
}

impl ApiError {
    /// Maps a failed response onto the three user-facing buckets.
    pub fn classify(status: StatusCode, body: &str) -> Self {
        if status == StatusCode::SERVICE_UNAVAILABLE {
            return ApiError::ServiceUnavailable;
        }
        // Anything from 500 up, including nonstandard codes past 599.
        if status.as_u16() >= 500 {
            return ApiError::Server { status: status.as_u16() };
        }

        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(ErrorBody::into_message)
            .unwrap_or_else(|| format!("Request failed with status code {}", status.as_u16()));

        ApiError::Rejected {
            status: status.as_u16(),
            message,
        }
    }

    /// The HTTP status behind the error, when there was a response at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::ServiceUnavailable => Some(503),
            ApiError::Server { status } | ApiError::Rejected { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            ApiError::Deserialization(_) | ApiError::RequestBuild(_) => None,
        }
    }
}

fn transport_message(error: &reqwest::Error) -> String {
    let message = error.to_string();
    if message.trim().is_empty() {
        UNEXPECTED_ERROR_MESSAGE.to_string()
    } else {
        message
    }
}

impl From<serde_qs::Error> for ApiError {
    fn from(error: serde_qs::Error) -> Self {
        ApiError::RequestBuild(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_unavailable_ignores_the_body() {
        let err = ApiError::classify(
            StatusCode::SERVICE_UNAVAILABLE,
            r#"{"message":"database is rebuilding"}"#,
        );
        assert!(matches!(err, ApiError::ServiceUnavailable));
        assert_eq!(err.to_string(), SERVICE_UNAVAILABLE_MESSAGE);
    }

    #[test]
    fn other_server_errors_are_generic() {
        for status in [StatusCode::INTERNAL_SERVER_ERROR, StatusCode::BAD_GATEWAY] {
            let err = ApiError::classify(status, r#"{"message":"stack trace here"}"#);
            assert_eq!(err.to_string(), SERVER_ERROR_MESSAGE);
            assert_eq!(err.status(), Some(status.as_u16()));
        }
    }

    #[test]
    fn nonstandard_codes_above_599_are_server_errors() {
        let status = StatusCode::from_u16(600).unwrap();
        let err = ApiError::classify(status, r#"{"message":"internal leak"}"#);
        assert_eq!(err.to_string(), SERVER_ERROR_MESSAGE);
        assert_eq!(err.status(), Some(600));
    }

    #[test]
    fn client_errors_prefer_the_backend_message() {
        let err = ApiError::classify(StatusCode::NOT_FOUND, r#"{"message":"Token not found"}"#);
        assert_eq!(err.to_string(), "Token not found");

        let err = ApiError::classify(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"detail":"page_size must be <= 100"}"#,
        );
        assert_eq!(err.to_string(), "page_size must be <= 100");
    }

    #[test]
    fn client_errors_fall_back_to_the_status() {
        let err = ApiError::classify(StatusCode::BAD_REQUEST, "<html>nope</html>");
        assert_eq!(err.to_string(), "Request failed with status code 400");

        let err = ApiError::classify(StatusCode::BAD_REQUEST, r#"{"detail":[{"loc":["query"]}]}"#);
        assert_eq!(err.to_string(), "Request failed with status code 400");
    }
}
