//! Store actions against a mocked backend

use agent_console::api::{
    Agent, AgentRegistration, AgentSearch, ApiClient, Execution, ExecutionRequest,
};
use agent_console::error::{ApiError, StoreError};
use agent_console::state::{GlobalError, Mutation, Role, Store};
use agent_console::storage::{KeyValueStore, MemoryStorage, API_KEY_STORAGE_KEY};
use mockito::{Matcher, Server};
use serde_json::{json, Map};
use std::sync::{Arc, Mutex};

fn store_for(server: &Server, storage: Arc<MemoryStorage>) -> Store {
    let api = ApiClient::new(&server.url()).unwrap();
    Store::new(api, storage)
}

fn registration() -> AgentRegistration {
    AgentRegistration {
        name: "Text Summarizer".to_string(),
        description: "Summarizes text".to_string(),
        version: "1.0.0".to_string(),
        author: "ExampleCorp".to_string(),
        api_endpoint: "https://api.example.com/summarize".to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_login_with_sentinel_key_is_admin() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/health")
        .match_header("x-api-key", "test_key")
        .with_status(200)
        .with_body(r#"{"status": "healthy"}"#)
        .create_async()
        .await;

    let storage = Arc::new(MemoryStorage::new());
    let store = store_for(&server, Arc::clone(&storage));
    let user = store.login("test_key").await.unwrap();

    mock.assert_async().await;
    assert_eq!(user.role, Role::Admin);
    assert_eq!(user.id, "user_id");
    assert!(store.is_authenticated());
    assert!(store.is_admin());
    assert_eq!(
        storage.get(API_KEY_STORAGE_KEY).unwrap(),
        Some("test_key".to_string())
    );
}

#[tokio::test]
async fn test_login_with_other_key_is_user() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/health")
        .with_status(200)
        .with_body(r#"{"status": "healthy"}"#)
        .create_async()
        .await;

    let store = store_for(&server, Arc::new(MemoryStorage::new()));
    let user = store.login("anything_else").await.unwrap();

    assert_eq!(user.role, Role::User);
    assert!(store.is_authenticated());
    assert!(!store.is_admin());
}

#[tokio::test]
async fn test_login_prefers_role_claim() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/health")
        .with_status(200)
        .with_body(r#"{"status": "healthy", "role": "admin", "user_id": "u-42"}"#)
        .create_async()
        .await;

    let store = store_for(&server, Arc::new(MemoryStorage::new()));
    let user = store.login("ops_key").await.unwrap();

    assert_eq!(user.role, Role::Admin);
    assert_eq!(user.id, "u-42");
}

#[tokio::test]
async fn test_failed_login_rolls_back_session() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/health")
        .with_status(401)
        .with_body(r#"{"detail": "Invalid API key"}"#)
        .create_async()
        .await;

    let storage = Arc::new(MemoryStorage::new());
    let store = store_for(&server, Arc::clone(&storage));
    let result = store.login("bad_key").await;

    assert!(matches!(result, Err(StoreError::InvalidApiKey)));
    assert_eq!(store.api_key(), "");
    assert!(store.user().is_none());
    assert!(!store.api().has_api_key());
    assert_eq!(storage.get(API_KEY_STORAGE_KEY).unwrap(), None);
    // Login never reports through the banner
    assert!(store.global_error().is_none());
    assert!(!store.loading());
}

#[tokio::test]
async fn test_fetch_agents_replaces_collection() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/agents")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"agents": [{"id": "a-1", "name": "One"}, {"id": "a-2", "name": "Two"}]}"#)
        .create_async()
        .await;

    let store = store_for(&server, Arc::new(MemoryStorage::new()));
    store.commit(Mutation::SetAgents(vec![Agent::new("stale")]));
    store.fetch_agents(&AgentSearch::default()).await;

    let ids: Vec<String> = store.read(|state| state.agents.iter().map(|a| a.id.clone()).collect());
    assert_eq!(ids, vec!["a-1", "a-2"]);
    assert_eq!(store.agent_by_id("a-2").unwrap().name(), Some("Two"));
    assert!(store.agent_by_id("stale").is_none());
    assert!(!store.loading());
}

#[tokio::test]
async fn test_fetch_agents_missing_field_is_empty() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/agents")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"total": 0}"#)
        .create_async()
        .await;

    let store = store_for(&server, Arc::new(MemoryStorage::new()));
    store.commit(Mutation::SetAgents(vec![Agent::new("stale")]));
    store.fetch_agents(&AgentSearch::default()).await;

    assert!(store.read(|state| state.agents.is_empty()));
    assert!(store.global_error().is_none());
}

#[tokio::test]
async fn test_fetch_agents_failure_keeps_collection() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/agents")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body("boom")
        .create_async()
        .await;

    let store = store_for(&server, Arc::new(MemoryStorage::new()));
    store.commit(Mutation::SetAgents(vec![Agent::new("kept")]));
    store.fetch_agents(&AgentSearch::text("summarize")).await;

    assert!(store.agent_by_id("kept").is_some());
    assert_eq!(
        store.global_error(),
        Some(GlobalError::new(
            "Failed to fetch agents",
            "Request failed with status code 500"
        ))
    );
    assert!(!store.loading());
}

#[tokio::test]
async fn test_fetch_agent_detail() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/agents/a-1")
        .with_status(200)
        .with_body(r#"{"id": "a-1", "name": "Summarizer", "status": "active"}"#)
        .create_async()
        .await;

    let store = store_for(&server, Arc::new(MemoryStorage::new()));
    store.fetch_agent_detail("a-1").await;

    let detail = store.read(|state| state.agent_detail.clone()).unwrap();
    assert_eq!(detail.status(), Some("active"));
}

#[tokio::test]
async fn test_create_agent_returns_raw_response() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/agents")
        .match_body(Matcher::PartialJson(json!({
            "name": "Text Summarizer",
            "auth_type": "none"
        })))
        .with_status(200)
        .with_body(
            r#"{"agent_id": "a-9", "status": "registered", "agent": {"id": "a-9", "name": "Text Summarizer"}}"#,
        )
        .create_async()
        .await;

    let store = store_for(&server, Arc::new(MemoryStorage::new()));
    let response = store.create_agent(&registration()).await.unwrap();

    mock.assert_async().await;
    assert_eq!(response["agent_id"], "a-9");
    assert_eq!(response["agent"]["name"], "Text Summarizer");
    // Mutating actions do not touch the collections
    assert!(store.read(|state| state.agents.is_empty()));
}

#[tokio::test]
async fn test_update_agent_failure_is_recorded_and_returned() {
    let mut server = Server::new_async().await;
    server
        .mock("PUT", "/agents/a-1")
        .with_status(403)
        .with_body(r#"{"detail": "forbidden"}"#)
        .create_async()
        .await;

    let store = store_for(&server, Arc::new(MemoryStorage::new()));
    let error = store.update_agent("a-1", &registration()).await.unwrap_err();

    assert_eq!(error.status(), Some(403));
    assert_eq!(
        store.global_error().map(|e| e.message),
        Some("Failed to update agent".to_string())
    );
}

#[tokio::test]
async fn test_delete_agent_failure_is_recorded_and_returned() {
    let mut server = Server::new_async().await;
    server
        .mock("DELETE", "/agents/a-1")
        .with_status(404)
        .with_body(r#"{"detail": "not found"}"#)
        .create_async()
        .await;

    let store = store_for(&server, Arc::new(MemoryStorage::new()));
    let result = store.delete_agent("a-1").await;

    assert!(matches!(result, Err(ApiError::Status { status: 404, .. })));
    assert_eq!(
        store.global_error(),
        Some(GlobalError::new(
            "Failed to delete agent",
            "Request failed with status code 404"
        ))
    );
    assert!(!store.loading());
}

#[tokio::test]
async fn test_execute_agent_and_fetch_executions() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/agents/a-1/execute")
        .match_body(Matcher::PartialJson(json!({
            "agent_id": "a-1",
            "input_data": {"text": "hello"}
        })))
        .with_status(200)
        .with_body(r#"{"id": "e-1", "agent_id": "a-1", "status": "completed"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/agents/a-1/executions")
        .with_status(200)
        .with_body(r#"{"executions": [{"id": "e-1", "status": "completed"}]}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/agents/a-1/executions/e-1")
        .with_status(200)
        .with_body(r#"{"id": "e-1", "result": {"summary": "hi"}}"#)
        .create_async()
        .await;

    let store = store_for(&server, Arc::new(MemoryStorage::new()));
    let mut input = Map::new();
    input.insert("text".to_string(), json!("hello"));
    let execution = store
        .execute_agent("a-1", &ExecutionRequest::new("a-1", input))
        .await
        .unwrap();
    assert_eq!(execution.id, "e-1");
    assert_eq!(execution.status(), Some("completed"));

    store.fetch_executions("a-1").await;
    assert_eq!(store.read(|state| state.executions.len()), 1);

    store.fetch_execution_detail("a-1", "e-1").await;
    let detail = store.read(|state| state.execution_detail.clone()).unwrap();
    assert_eq!(detail.result(), Some(&json!({"summary": "hi"})));
}

#[tokio::test]
async fn test_actions_commit_in_order() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/agents")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"agents": []}"#)
        .create_async()
        .await;

    let store = store_for(&server, Arc::new(MemoryStorage::new()));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);
    store.subscribe(move |mutation| log.lock().unwrap().push(mutation.name()));

    store.fetch_agents(&AgentSearch::default()).await;

    assert_eq!(
        *seen.lock().unwrap(),
        vec!["REQUEST_STARTED", "SET_AGENTS", "REQUEST_SETTLED"]
    );
}

#[tokio::test]
async fn test_overlapping_requests_keep_loading() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/agents/a-1")
        .with_status(200)
        .with_body(r#"{"id": "a-1"}"#)
        .create_async()
        .await;

    let store = store_for(&server, Arc::new(MemoryStorage::new()));
    let loading_after_first = Arc::new(Mutex::new(Vec::new()));
    let observer = store.clone();
    let log = Arc::clone(&loading_after_first);
    store.subscribe(move |mutation| {
        if matches!(mutation, Mutation::RequestSettled) {
            log.lock().unwrap().push(observer.loading());
        }
    });

    tokio::join!(
        store.fetch_agent_detail("a-1"),
        store.fetch_agent_detail("a-1")
    );

    // The first settle leaves the other request in flight
    assert_eq!(*loading_after_first.lock().unwrap(), vec![true, false]);
    assert!(!store.loading());
}

#[tokio::test]
async fn test_persisted_key_is_sent() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/agents/a-1/executions")
        .match_header("x-api-key", "persisted")
        .with_status(200)
        .with_body(r#"{"executions": []}"#)
        .create_async()
        .await;

    let storage = Arc::new(MemoryStorage::with_value(API_KEY_STORAGE_KEY, "persisted"));
    let store = store_for(&server, storage);
    store.fetch_executions("a-1").await;

    mock.assert_async().await;
    assert!(store.global_error().is_none());
}

#[tokio::test]
async fn test_create_agent_failure_is_recorded_and_returned() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/agents")
        .with_status(422)
        .with_body(r#"{"detail": "invalid agent"}"#)
        .create_async()
        .await;

    let store = store_for(&server, Arc::new(MemoryStorage::new()));
    let result = store.create_agent(&registration()).await;

    assert!(matches!(result, Err(ApiError::Status { status: 422, .. })));
    assert_eq!(
        store.global_error(),
        Some(GlobalError::new(
            "Failed to create agent",
            "Request failed with status code 422"
        ))
    );
    assert!(!store.loading());
}

#[tokio::test]
async fn test_execute_agent_failure_is_recorded_and_returned() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/agents/a-1/execute")
        .with_status(500)
        .with_body(r#"{"detail": "agent crashed"}"#)
        .create_async()
        .await;

    let store = store_for(&server, Arc::new(MemoryStorage::new()));
    let result = store
        .execute_agent("a-1", &ExecutionRequest::new("a-1", Map::new()))
        .await;

    assert!(matches!(result, Err(ApiError::Status { status: 500, .. })));
    assert_eq!(
        store.global_error(),
        Some(GlobalError::new(
            "Failed to execute agent",
            "Request failed with status code 500"
        ))
    );
    assert!(!store.loading());
}

#[tokio::test]
async fn test_fetch_executions_failure_keeps_collection() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/agents/a-1/executions")
        .with_status(500)
        .create_async()
        .await;

    let store = store_for(&server, Arc::new(MemoryStorage::new()));
    store.commit(Mutation::SetExecutions(vec![Execution::new("e-old")]));
    store.fetch_executions("a-1").await;

    let ids: Vec<String> =
        store.read(|state| state.executions.iter().map(|e| e.id.clone()).collect());
    assert_eq!(ids, vec!["e-old"]);
    assert_eq!(
        store.global_error(),
        Some(GlobalError::new(
            "Failed to fetch executions",
            "Request failed with status code 500"
        ))
    );
    assert!(!store.loading());
}

#[tokio::test]
async fn test_fetch_execution_detail_failure_keeps_detail() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/agents/a-1/executions/e-2")
        .with_status(404)
        .with_body(r#"{"detail": "Execution not found"}"#)
        .create_async()
        .await;

    let store = store_for(&server, Arc::new(MemoryStorage::new()));
    store.commit(Mutation::SetExecutionDetail(Some(Execution::new("e-1"))));
    store.fetch_execution_detail("a-1", "e-2").await;

    let detail = store.read(|state| state.execution_detail.clone());
    assert_eq!(detail.map(|e| e.id), Some("e-1".to_string()));
    assert_eq!(
        store.global_error(),
        Some(GlobalError::new(
            "Failed to fetch execution details",
            "Request failed with status code 404"
        ))
    );
    assert!(!store.loading());
}
