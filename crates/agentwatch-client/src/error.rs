//! HTTP-specific error types.

use agentwatch_core::DashboardError;
use thiserror::Error;

/// Errors raised while talking to the monitoring service over HTTP.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Service returned an error response.
    #[error("API error: {status} - {message}")]
    Api {
        status: u16,
        message: String,
    },

    /// Response parsing failed.
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),
}

impl From<ClientError> for DashboardError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::Http(err) if err.is_decode() => DashboardError::Decode(err.to_string()),
            ClientError::Http(err) => DashboardError::Network(err.to_string()),
            ClientError::Api { status, message } => DashboardError::Status { status, body: message },
            ClientError::Parse(err) => DashboardError::Json(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentwatch_core::ErrorKind;

    #[test]
    fn test_conversion_into_dashboard_error() {
        let err: DashboardError = ClientError::Api {
            status: 404,
            message: "not found".to_string(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Status);

        let parse = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
        let err: DashboardError = ClientError::Parse(parse).into();
        assert!(matches!(err, DashboardError::Json(_)));
        assert_eq!(err.kind(), ErrorKind::Decode);
    }
}
