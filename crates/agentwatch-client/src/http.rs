//! Monitoring service over HTTP.
//!
//! Speaks the service's JSON contract with `reqwest`.

use crate::error::ClientError;
use agentwatch_core::{
    api::CaptureAck,
    config::Endpoint,
    model::{AuditRequest, AuditResponse, CaptureRequest, LogList},
    DashboardConfig, LogEntry, MonitorApi, MonitorSnapshot, Result,
};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, instrument};

/// HTTP backend for the dashboard controller.
#[derive(Debug, Clone)]
pub struct HttpMonitorApi {
    client: Client,
    config: DashboardConfig,
}

impl HttpMonitorApi {
    /// Create a new client with the given configuration.
    pub fn new(config: DashboardConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(ClientError::from)?;

        Ok(Self { client, config })
    }

    /// Create a client from environment variables.
    ///
    /// Reads `AGENTWATCH_BASE_URL`, `AGENTWATCH_TIMEOUT` and the
    /// `AGENTWATCH_*_PATH` overrides.
    pub fn from_env() -> Result<Self> {
        Self::new(DashboardConfig::from_env())
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: Endpoint) -> Result<T> {
        let url = self.config.endpoint(endpoint);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(ClientError::from)?;

        Ok(decode(response).await?)
    }

    async fn post_json<B: Serialize + ?Sized>(&self, endpoint: Endpoint, body: &B) -> Result<Response> {
        let url = self.config.endpoint(endpoint);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(ClientError::from)?;

        Ok(check_status(response).await?)
    }
}

/// Turn a non-success status into [`ClientError::Api`] carrying the body.
async fn check_status(response: Response) -> std::result::Result<Response, ClientError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let message = response.text().await.unwrap_or_default();
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> std::result::Result<T, ClientError> {
    let response = check_status(response).await?;
    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}

#[async_trait]
impl MonitorApi for HttpMonitorApi {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self))]
    async fn fetch_monitor(&self) -> Result<MonitorSnapshot> {
        self.get_json(Endpoint::Monitor).await
    }

    #[instrument(skip(self))]
    async fn fetch_logs(&self) -> Result<Vec<LogEntry>> {
        let list: LogList = self.get_json(Endpoint::Logs).await?;
        Ok(list.logs)
    }

    #[instrument(skip(self, request), fields(agent = %request.agent_name))]
    async fn capture(&self, request: CaptureRequest) -> Result<CaptureAck> {
        let response = self.post_json(Endpoint::Capture, &request).await?;
        let body = response.text().await.map_err(ClientError::from)?;

        // The ack format varies between service versions.
        if body.trim().is_empty() {
            return Ok(CaptureAck::Null);
        }
        Ok(serde_json::from_str(&body).unwrap_or(CaptureAck::String(body)))
    }

    #[instrument(skip(self, request), fields(agent = %request.agent_name))]
    async fn audit(&self, request: AuditRequest) -> Result<AuditResponse> {
        let response = self.post_json(Endpoint::Audit, &request).await?;
        Ok(decode(response).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentwatch_core::{DashboardError, ErrorKind};
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fixed_request() -> CaptureRequest {
        CaptureRequest {
            agent_name: "Alpha".to_string(),
            user_input: "ping".to_string(),
            agent_output: "pong".to_string(),
            timestamp: "2024-05-01T10:00:00.000Z".to_string(),
        }
    }

    fn api_for(server: &MockServer) -> HttpMonitorApi {
        HttpMonitorApi::new(DashboardConfig::new(server.uri()).with_timeout(5)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_monitor() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/monitor"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "total_logs": 10,
                "empty_inputs_found": 2,
                "logs_per_agent": {"Alpha": 6, "Beta": 4}
            })))
            .mount(&mock_server)
            .await;

        let snapshot = api_for(&mock_server).fetch_monitor().await.unwrap();
        assert_eq!(snapshot.total_logs, 10);
        assert_eq!(snapshot.agents_active(), 2);
    }

    #[tokio::test]
    async fn test_fetch_logs_accepts_both_output_keys() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get-logs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "logs": [
                    {"agent_name": "Alpha", "user_input": "a", "output": "hi",
                     "timestamp": "2024-05-01T10:00:00Z"},
                    {"agent_name": "Beta", "user_input": "b", "agent_output": "x", "output": "y",
                     "timestamp": "2024-05-01T10:01:00Z"}
                ]
            })))
            .mount(&mock_server)
            .await;

        let logs = api_for(&mock_server).fetch_logs().await.unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].output(), Some("hi"));
        assert_eq!(logs[1].output(), Some("x"));
    }

    #[tokio::test]
    async fn test_capture_posts_contract_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/capture-input"))
            .and(body_json(serde_json::json!({
                "agent_name": "Alpha",
                "user_input": "ping",
                "agent_output": "pong",
                "timestamp": "2024-05-01T10:00:00.000Z"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_string("Log captured"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let ack = api_for(&mock_server).capture(fixed_request()).await.unwrap();
        assert_eq!(ack, CaptureAck::String("Log captured".to_string()));
    }

    #[tokio::test]
    async fn test_audit_without_summary_key() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/reason"))
            .and(body_json(serde_json::json!({"agent_name": "Alpha"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&mock_server)
            .await;

        let response = api_for(&mock_server)
            .audit(AuditRequest { agent_name: "Alpha".to_string() })
            .await
            .unwrap();
        assert_eq!(response.summary, None);
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/monitor"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&mock_server)
            .await;

        let err = api_for(&mock_server).fetch_monitor().await.unwrap_err();
        match err {
            DashboardError::Status { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "maintenance");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get-logs"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>docs</html>"))
            .mount(&mock_server)
            .await;

        let err = api_for(&mock_server).fetch_logs().await.unwrap_err();
        assert!(matches!(err, DashboardError::Json(_)));
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[tokio::test]
    async fn test_unreachable_service_is_transport_error() {
        // Nothing listens on the discard port.
        let api = HttpMonitorApi::new(DashboardConfig::new("http://127.0.0.1:9").with_timeout(2)).unwrap();
        let err = api.capture(fixed_request()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let err = HttpMonitorApi::new(DashboardConfig::new("localhost:8000")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);

        let err = HttpMonitorApi::new(DashboardConfig::new("http://svc:8000").with_timeout(0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }
}
