//! Marketplace HTTP client
//!
//! Thin wrapper over `reqwest` with a fixed base URL, a JSON content type
//! and a mutable `X-API-Key` default header. No retry, no timeout, no
//! caching: a failed request is handed back to the caller as-is.

use crate::api::types::{
    Agent, AgentRegistration, AgentSearch, AgentsPage, Execution, ExecutionRequest,
    ExecutionsPage,
};
use crate::error::ApiError;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::sync::{PoisonError, RwLock};

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Parsed `GET /health` body
///
/// The body is read leniently: any 2xx counts as healthy, and the optional
/// identity claims are only used when the backend provides them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: Option<String>,
    /// Role claim for the presented key
    #[serde(default)]
    pub role: Option<String>,
    /// User id claim for the presented key
    #[serde(default)]
    pub user_id: Option<String>,
}

/// HTTP client for the marketplace API
#[derive(Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: RwLock<Option<HeaderValue>>,
}

impl ApiClient {
    /// Create a client rooted at `base_url` (e.g. `http://localhost:8080/api`)
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ApiError::InvalidRequest(format!("base URL {}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidRequest(format!(
                "base URL {} cannot carry a path",
                base_url
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url,
            api_key: RwLock::new(None),
        })
    }

    /// Base URL every endpoint is resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Install the `X-API-Key` header for subsequent requests
    ///
    /// An empty key clears the header. A key that cannot be sent as a
    /// header value is rejected and leaves the previous header in place.
    pub fn set_api_key(&self, key: &str) -> Result<(), ApiError> {
        if key.is_empty() {
            self.clear_api_key();
            return Ok(());
        }
        let value = header_value(key)?;
        *self.api_key.write().unwrap_or_else(PoisonError::into_inner) = Some(value);
        Ok(())
    }

    /// Remove the `X-API-Key` header
    pub fn clear_api_key(&self) {
        *self.api_key.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Whether an API key header is currently installed
    pub fn has_api_key(&self) -> bool {
        self.api_key
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// GET /health
    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        let builder = self.request(Method::GET, &["health"])?;
        let body = self.send_raw(builder).await?;
        Ok(serde_json::from_slice(&body).unwrap_or_default())
    }

    /// GET /agents
    pub async fn list_agents(&self, search: &AgentSearch) -> Result<AgentsPage, ApiError> {
        let builder = self
            .request(Method::GET, &["agents"])?
            .query(&search.query_pairs());
        self.send(builder).await
    }

    /// GET /agents/{agent_id}
    pub async fn get_agent(&self, agent_id: &str) -> Result<Agent, ApiError> {
        let builder = self.request(Method::GET, &["agents", agent_id])?;
        self.send(builder).await
    }

    /// POST /agents
    pub async fn create_agent(&self, agent: &AgentRegistration) -> Result<Value, ApiError> {
        let builder = self.request(Method::POST, &["agents"])?.json(agent);
        self.send(builder).await
    }

    /// PUT /agents/{agent_id}
    pub async fn update_agent(
        &self,
        agent_id: &str,
        agent: &AgentRegistration,
    ) -> Result<Value, ApiError> {
        let builder = self.request(Method::PUT, &["agents", agent_id])?.json(agent);
        self.send(builder).await
    }

    /// DELETE /agents/{agent_id}
    pub async fn delete_agent(&self, agent_id: &str) -> Result<Value, ApiError> {
        let builder = self.request(Method::DELETE, &["agents", agent_id])?;
        self.send(builder).await
    }

    /// POST /agents/{agent_id}/execute
    pub async fn execute_agent(
        &self,
        agent_id: &str,
        request: &ExecutionRequest,
    ) -> Result<Execution, ApiError> {
        let builder = self
            .request(Method::POST, &["agents", agent_id, "execute"])?
            .json(request);
        self.send(builder).await
    }

    /// GET /agents/{agent_id}/executions
    pub async fn list_executions(&self, agent_id: &str) -> Result<ExecutionsPage, ApiError> {
        let builder = self.request(Method::GET, &["agents", agent_id, "executions"])?;
        self.send(builder).await
    }

    /// GET /agents/{agent_id}/executions/{execution_id}
    pub async fn get_execution(
        &self,
        agent_id: &str,
        execution_id: &str,
    ) -> Result<Execution, ApiError> {
        let builder = self.request(
            Method::GET,
            &["agents", agent_id, "executions", execution_id],
        )?;
        self.send(builder).await
    }

    /// Resolve path segments against the base URL, percent-encoding each one
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidRequest(format!("cannot extend {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ApiError> {
        let url = self.endpoint(segments)?;
        tracing::debug!(method = %method, url = %url, "API request");

        let mut builder = self.http.request(method, url);
        let key = self
            .api_key
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(key) = key {
            builder = builder.header(API_KEY_HEADER, key);
        }
        Ok(builder)
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let body = self.send_raw(builder).await?;
        // Empty bodies (e.g. 204) decode as JSON null
        let body: &[u8] = if body.is_empty() { b"null" } else { &body };
        serde_json::from_slice(body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn send_raw(&self, builder: RequestBuilder) -> Result<Vec<u8>, ApiError> {
        let response = builder.send().await.map_err(|e| {
            tracing::warn!(error = %e, "API request failed to send");
            ApiError::Transport(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error body".to_string());
            tracing::warn!(
                status_code = status.as_u16(),
                error_body = %body,
                "API returned error status"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

/// Check that a key can travel in the `X-API-Key` header
pub fn header_value(key: &str) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(key)
        .map_err(|_| ApiError::InvalidRequest("API key contains invalid characters".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    #[test]
    fn test_endpoint_joins_segments() {
        let client = ApiClient::new("http://localhost:8080/api").unwrap();
        assert_eq!(
            client.endpoint(&["agents", "a-1", "executions"]).unwrap().as_str(),
            "http://localhost:8080/api/agents/a-1/executions"
        );

        let client = ApiClient::new("http://localhost:8080/api/").unwrap();
        assert_eq!(
            client.endpoint(&["health"]).unwrap().as_str(),
            "http://localhost:8080/api/health"
        );
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let client = ApiClient::new("http://localhost:8080").unwrap();
        assert_eq!(
            client.endpoint(&["agents", "a/b c"]).unwrap().as_str(),
            "http://localhost:8080/agents/a%2Fb%20c"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            ApiClient::new("not a url"),
            Err(ApiError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_set_and_clear_api_key() {
        let client = ApiClient::new("http://localhost:8080/api").unwrap();
        assert!(!client.has_api_key());
        client.set_api_key("test_key").unwrap();
        assert!(client.has_api_key());
        client.set_api_key("").unwrap();
        assert!(!client.has_api_key());
        client.set_api_key("abc").unwrap();
        client.clear_api_key();
        assert!(!client.has_api_key());
    }

    #[test]
    fn test_rejects_unencodable_key() {
        let client = ApiClient::new("http://localhost:8080/api").unwrap();
        assert!(client.set_api_key("line\nbreak").is_err());
        assert!(!client.has_api_key());
    }

    #[tokio::test]
    async fn test_api_key_header_attached() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/agents/a-1")
            .match_header("x-api-key", "test_key")
            .match_header("content-type", "application/json")
            .with_status(200)
            .with_body(r#"{"id": "a-1", "name": "Summarizer"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        client.set_api_key("test_key").unwrap();
        let agent = client.get_agent("a-1").await.unwrap();

        mock.assert_async().await;
        assert_eq!(agent.id, "a-1");
        assert_eq!(agent.name(), Some("Summarizer"));
    }

    #[tokio::test]
    async fn test_api_key_header_absent_after_clear() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/health")
            .match_header("x-api-key", Matcher::Missing)
            .with_status(200)
            .with_body(r#"{"status": "healthy"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        client.set_api_key("test_key").unwrap();
        client.clear_api_key();
        let health = client.health().await.unwrap();

        mock.assert_async().await;
        assert_eq!(health.status.as_deref(), Some("healthy"));
        assert_eq!(health.role, None);
    }

    #[tokio::test]
    async fn test_health_tolerates_non_json_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/health")
            .with_status(200)
            .with_body("OK")
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let health = client.health().await.unwrap();

        mock.assert_async().await;
        assert_eq!(health, HealthStatus::default());
    }

    #[tokio::test]
    async fn test_list_agents_sends_search_params() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/agents")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("capabilities".into(), "summarize_text".into()),
                Matcher::UrlEncoded("query".into(), "text tools".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"agents": [{"id": "a-1"}, {"id": "a-2"}], "count": 2}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let search = AgentSearch {
            capabilities: vec!["summarize_text".to_string()],
            query: Some("text tools".to_string()),
            ..Default::default()
        };
        let page = client.list_agents(&search).await.unwrap();

        mock.assert_async().await;
        let ids: Vec<_> = page.agents.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["a-1", "a-2"]);
    }

    #[tokio::test]
    async fn test_create_agent_posts_json() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/agents")
            .match_body(Matcher::PartialJson(json!({
                "name": "Summarizer",
                "auth_type": "none"
            })))
            .with_status(201)
            .with_body(r#"{"agent_id": "a-9", "status": "registered"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let registration = AgentRegistration {
            name: "Summarizer".to_string(),
            ..Default::default()
        };
        let created = client.create_agent(&registration).await.unwrap();

        mock.assert_async().await;
        assert_eq!(created["agent_id"], "a-9");
    }

    #[tokio::test]
    async fn test_status_error_keeps_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("DELETE", "/agents/a-1")
            .with_status(403)
            .with_body(r#"{"detail": "Only administrators can delete agents"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let err = client.delete_agent("a-1").await.unwrap_err();

        mock.assert_async().await;
        match err {
            ApiError::Status { status, body } => {
                assert_eq!(status, 403);
                assert!(body.contains("Only administrators"));
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_decode_error() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/agents/a-1/executions/e-1")
            .with_status(200)
            .with_body(r#"{"status": "completed"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let err = client.get_execution("a-1", "e-1").await.unwrap_err();

        mock.assert_async().await;
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn test_empty_body_decodes_as_null() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("DELETE", "/agents/a-1")
            .with_status(204)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let result = client.delete_agent("a-1").await.unwrap();

        mock.assert_async().await;
        assert_eq!(result, Value::Null);
    }

    #[tokio::test]
    async fn test_transport_error() {
        // Nothing listens on port 9 (discard) in the test environment
        let client = ApiClient::new("http://127.0.0.1:9").unwrap();
        let err = client.list_executions("a-1").await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }
}
