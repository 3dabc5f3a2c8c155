// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::io::Write;
use std::path::PathBuf;

use serde_json::{json, Value};
use tempfile::NamedTempFile;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ondemand_chat::api::{ContextField, GenerationConfig, QueryResult, ResponseMode};
use ondemand_chat::config::RunConfig;
use ondemand_chat::error::{ApiError, ChatError};
use ondemand_chat::workflow;

const SESSION_ID: &str = "sess-123";

fn run_config(server: &MockServer, mode: ResponseMode) -> RunConfig {
    RunConfig {
        api_key: "test-key".to_string(),
        base_url: server.uri(),
        external_user_id: "user-1".to_string(),
        query: "What is the capital of France?".to_string(),
        agent_ids: vec!["agent-a".to_string()],
        file_agent_ids: vec!["file-agent-1".to_string(), "file-agent-2".to_string()],
        media_file_path: None,
        context_metadata: vec![
            ContextField::new("userId", "1"),
            ContextField::new("name", "John"),
        ],
        generation: GenerationConfig {
            response_mode: mode,
            ..GenerationConfig::default()
        },
    }
}

async fn mount_session(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/chat/v1/sessions"))
        .and(header("apikey", "test-key"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": {
                "id": SESSION_ID,
                "contextMetadata": [{"key": "userId", "value": "1"}]
            }
        })))
        .expect(1)
        .mount(server)
        .await;
}

fn query_path() -> String {
    format!("/chat/v1/sessions/{}/query", SESSION_ID)
}

async fn request_body(server: &MockServer, url_path: &str) -> Value {
    let requests = server.received_requests().await.unwrap();
    let request = requests
        .iter()
        .find(|r| r.url.path() == url_path)
        .expect("request was not sent");
    serde_json::from_slice(&request.body).unwrap()
}

#[tokio::test]
async fn test_session_failure_aborts_before_query() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/v1/sessions"))
        .respond_with(ResponseTemplate::new(400).set_body_string("unknown agent"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(query_path()))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = workflow::run(&run_config(&server, ResponseMode::Sync))
        .await
        .unwrap_err();

    match err {
        ChatError::SessionCreation(ApiError::Status { status, body }) => {
            assert_eq!(status, 400);
            assert_eq!(body, "unknown agent");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_session_request_body() {
    let server = MockServer::start().await;
    mount_session(&server).await;
    Mock::given(method("POST"))
        .and(path(query_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
        .mount(&server)
        .await;

    workflow::run(&run_config(&server, ResponseMode::Sync))
        .await
        .unwrap();

    let body = request_body(&server, "/chat/v1/sessions").await;
    assert_eq!(
        body,
        json!({
            "agentIds": ["agent-a"],
            "externalUserId": "user-1",
            "contextMetadata": [
                {"key": "userId", "value": "1"},
                {"key": "name", "value": "John"}
            ]
        })
    );
}

#[tokio::test]
async fn test_sync_query_attaches_context_metadata() {
    let server = MockServer::start().await;
    mount_session(&server).await;
    Mock::given(method("POST"))
        .and(path(query_path()))
        .and(header("apikey", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Chat query submitted successfully",
            "data": {
                "sessionId": SESSION_ID,
                "messageId": "msg-1",
                "answer": "Paris",
                "metrics": {"totalTokens": 12},
                "status": "completed"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = workflow::run(&run_config(&server, ResponseMode::Sync))
        .await
        .unwrap();

    assert_eq!(result.answer(), Some("Paris"));
    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(
        value["data"]["contextMetadata"],
        json!([{"key": "userId", "value": "1"}, {"key": "name", "value": "John"}])
    );

    let body = request_body(&server, &query_path()).await;
    assert_eq!(body["query"], "What is the capital of France?");
    assert_eq!(body["responseMode"], "sync");
    assert_eq!(body["endpointId"], "predefined-openai-gpt4.1");
    assert_eq!(body["modelConfigs"]["temperature"], 0.7);
}

#[tokio::test]
async fn test_sync_query_error_status() {
    let server = MockServer::start().await;
    mount_session(&server).await;
    Mock::given(method("POST"))
        .and(path(query_path()))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = workflow::run(&run_config(&server, ResponseMode::Sync))
        .await
        .unwrap_err();
    match err {
        ChatError::QueryResponse(ApiError::Status { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_stream_query_reassembles_answer() {
    let server = MockServer::start().await;
    mount_session(&server).await;

    let feed = concat!(
        ": keep-alive\n",
        "\n",
        "data: {\"eventType\":\"fulfillment\",\"answer\":\"The capital \",\"sessionId\":\"sess-123\",\"messageId\":\"msg-9\"}\n",
        "\n",
        "data: {\"eventType\":\"metricsLog\",\"publicMetrics\":{\"inputTokens\":5}}\n",
        "data: {\"eventType\":\"fulfillment\",\"answer\":\"is Paris.\"}\n",
        "data: {broken\n",
        "data: {\"eventType\":\"metricsLog\",\"publicMetrics\":{\"totalTokens\":20}}\n",
        "data: [DONE]\n",
        "data: {\"eventType\":\"fulfillment\",\"answer\":\" ignored\"}\n",
    );
    Mock::given(method("POST"))
        .and(path(query_path()))
        .respond_with(ResponseTemplate::new(200).set_body_raw(feed, "text/event-stream"))
        .expect(1)
        .mount(&server)
        .await;

    let result = workflow::run(&run_config(&server, ResponseMode::Stream))
        .await
        .unwrap();

    let QueryResult::Streamed(response) = &result else {
        panic!("expected streamed result, got {result:?}");
    };
    assert_eq!(response.data.answer, "The capital is Paris.");
    assert_eq!(response.data.session_id.as_deref(), Some("sess-123"));
    assert_eq!(response.data.message_id.as_deref(), Some("msg-9"));
    assert_eq!(Value::Object(response.data.metrics.clone()), json!({"totalTokens": 20}));
    assert_eq!(response.data.status, "completed");
    assert_eq!(response.data.context_metadata.len(), 2);

    let body = request_body(&server, &query_path()).await;
    assert_eq!(body["responseMode"], "stream");
}

#[tokio::test]
async fn test_stream_query_error_status() {
    let server = MockServer::start().await;
    mount_session(&server).await;
    Mock::given(method("POST"))
        .and(path(query_path()))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
        .mount(&server)
        .await;

    let err = workflow::run(&run_config(&server, ResponseMode::Stream))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ChatError::QueryResponse(ApiError::Status { status: 401, .. })
    ));
}

#[tokio::test]
async fn test_no_media_path_skips_upload() {
    let server = MockServer::start().await;
    mount_session(&server).await;
    Mock::given(method("POST"))
        .and(path("/media/v1/public/file/raw"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(query_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
        .expect(1)
        .mount(&server)
        .await;

    workflow::run(&run_config(&server, ResponseMode::Sync))
        .await
        .unwrap();

    let body = request_body(&server, &query_path()).await;
    assert!(body.get("mediaId").is_none());
}

#[tokio::test]
async fn test_media_upload_then_query() {
    let server = MockServer::start().await;
    mount_session(&server).await;
    Mock::given(method("POST"))
        .and(path("/media/v1/public/file/raw"))
        .and(header("apikey", "test-key"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": {"id": "media-77", "name": "notes.txt"}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(query_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::TempDir::new().unwrap();
    let file_path: PathBuf = dir.path().join("notes.txt");
    std::fs::write(&file_path, b"meeting notes body").unwrap();

    let mut config = run_config(&server, ResponseMode::Sync);
    config.media_file_path = Some(file_path);
    workflow::run(&config).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let upload = requests
        .iter()
        .find(|r| r.url.path() == "/media/v1/public/file/raw")
        .unwrap();
    let content_type = upload.headers.get("content-type").unwrap().to_str().unwrap();
    assert!(content_type.starts_with("multipart/form-data"));

    let multipart = String::from_utf8_lossy(&upload.body);
    assert!(multipart.contains("name=\"file\"; filename=\"notes.txt\""));
    assert!(multipart.contains("meeting notes body"));
    assert!(multipart.contains("name=\"responseMode\"\r\n\r\nsync"));
    assert!(multipart.contains("name=\"name\"\r\n\r\nnotes.txt"));
    assert!(multipart.contains("name=\"agents\"\r\n\r\nfile-agent-1"));
    assert!(multipart.contains("name=\"agents\"\r\n\r\nfile-agent-2"));

    let body = request_body(&server, &query_path()).await;
    assert_eq!(body["mediaId"], "media-77");
}

#[tokio::test]
async fn test_media_upload_failure_aborts_before_query() {
    let server = MockServer::start().await;
    mount_session(&server).await;
    Mock::given(method("POST"))
        .and(path("/media/v1/public/file/raw"))
        .respond_with(ResponseTemplate::new(500).set_body_string("storage down"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(query_path()))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"data").unwrap();

    let mut config = run_config(&server, ResponseMode::Sync);
    config.media_file_path = Some(file.path().to_path_buf());
    let err = workflow::run(&config).await.unwrap_err();

    assert!(matches!(
        err,
        ChatError::MediaUpload(ApiError::Status { status: 500, .. })
    ));
}

#[tokio::test]
async fn test_media_upload_without_id_is_error() {
    let server = MockServer::start().await;
    mount_session(&server).await;
    Mock::given(method("POST"))
        .and(path("/media/v1/public/file/raw"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(query_path()))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let file = NamedTempFile::new().unwrap();
    let mut config = run_config(&server, ResponseMode::Sync);
    config.media_file_path = Some(file.path().to_path_buf());
    let err = workflow::run(&config).await.unwrap_err();

    assert!(matches!(
        err,
        ChatError::MediaUpload(ApiError::InvalidResponse(_))
    ));
}

#[tokio::test]
async fn test_unreachable_server_is_session_network_error() {
    let server = MockServer::start().await;
    let mut config = run_config(&server, ResponseMode::Sync);
    config.base_url = "http://127.0.0.1:9".to_string();

    let err = workflow::run(&config).await.unwrap_err();
    assert!(matches!(
        err,
        ChatError::SessionCreation(ApiError::Network(_))
    ));
}
