//! Client tests against an in-process backend.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use helix_api::{BackendClient, Error};
use helix_core::{
    ChatEndpoint, ChatRequest, ImageAttachment, Sender, SequenceDraft, TranscriptEntry,
};
use serde_json::{json, Value};

/// Multipart fields seen by the fake chat endpoint: (route, name, file name, body)
type Fields = Vec<(String, String, Option<String>, Vec<u8>)>;

#[derive(Default)]
struct Recorded {
    fields: Mutex<Fields>,
    saved: Mutex<Vec<Value>>,
}

async fn record_multipart(state: &Recorded, route: &str, mut multipart: Multipart) {
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let bytes = field.bytes().await.unwrap().to_vec();
        state
            .fields
            .lock()
            .unwrap()
            .push((route.to_string(), name, file_name, bytes));
    }
}

async fn chat(State(state): State<Arc<Recorded>>, multipart: Multipart) -> Json<Value> {
    record_multipart(&state, "chat", multipart).await;
    Json(json!({
        "message": {
            "text": "Based on your request, I have updated email sequence",
            "sender": "assistant",
            "reasoning": "Senior engineers value growth",
            "email_sequence": { "content": "Hi {name},", "should_update_workspace": true }
        }
    }))
}

async fn open_search(State(state): State<Arc<Recorded>>, multipart: Multipart) -> Json<Value> {
    record_multipart(&state, "open-search", multipart).await;
    Json(json!({ "message": { "text": "open results" } }))
}

fn record(id: &str, user_id: &str, content: &str) -> Value {
    json!({
        "id": id,
        "user_id": user_id,
        "org_id": "org_001",
        "name": format!("Sequence {}", id),
        "content": content,
        "messages": [{ "text": "hi", "sender": "user" }],
        "created_at": "2025-02-01T09:30:00.000001",
        "updated_at": "2025-02-02T10:00:00"
    })
}

async fn user_sequences(Path(user_id): Path<String>) -> Json<Value> {
    Json(json!([record("1", &user_id, "first"), record("2", &user_id, "second")]))
}

async fn org_sequences(Path(_org_id): Path<String>) -> Json<Value> {
    Json(json!([record("7", "user_002", "org wide")]))
}

async fn get_sequence(Path(id): Path<String>) -> impl IntoResponse {
    if id == "missing" {
        (StatusCode::NOT_FOUND, Json(json!({ "detail": "Sequence not found" }))).into_response()
    } else {
        Json(record(&id, "user_001", "body")).into_response()
    }
}

async fn save_sequence(
    State(state): State<Arc<Recorded>>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    if body["id"] == "explode" {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "detail": "Failed to store sequence: db down" })),
        )
            .into_response();
    }
    state.saved.lock().unwrap().push(body.clone());
    let mut stored = body;
    stored["created_at"] = json!("2025-03-01T00:00:00");
    stored["updated_at"] = json!("2025-03-01T00:00:00");
    Json(stored).into_response()
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

async fn spawn_backend() -> (BackendClient, Arc<Recorded>) {
    let state = Arc::new(Recorded::default());
    let router = Router::new()
        .route("/api/chat", post(chat))
        .route("/api/chat/open-search", post(open_search))
        .route("/api/sequences", post(save_sequence))
        .route("/api/sequences/user/{user_id}", get(user_sequences))
        .route("/api/sequences/org/{org_id}", get(org_sequences))
        .route("/api/sequences/{id}", get(get_sequence))
        .route("/api/health", get(health))
        .with_state(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    let client = BackendClient::new(&format!("http://{}", addr)).unwrap();
    (client, state)
}

fn chat_request(endpoint: ChatEndpoint, image: Option<ImageAttachment>) -> ChatRequest {
    ChatRequest {
        ticket: 1,
        endpoint,
        workspace: "1".into(),
        user_id: "user_001".into(),
        org_id: "org_001".into(),
        messages: vec![TranscriptEntry {
            text: "Create an outreach sequence".into(),
            sender: Sender::User,
        }],
        image,
    }
}

fn field<'a>(fields: &'a Fields, name: &str) -> Option<&'a (String, String, Option<String>, Vec<u8>)> {
    fields.iter().find(|(_, n, _, _)| n == name)
}

#[tokio::test]
async fn chat_posts_multipart_and_decodes_reply() {
    let (client, state) = spawn_backend().await;

    let response = client
        .chat(&chat_request(ChatEndpoint::Standard, None))
        .await
        .unwrap();
    assert_eq!(
        response.message.text,
        "Based on your request, I have updated email sequence"
    );
    let seq = response.message.email_sequence.unwrap();
    assert!(seq.should_update_workspace);
    assert_eq!(seq.content, "Hi {name},");

    let fields = state.fields.lock().unwrap();
    assert_eq!(field(&fields, "workspace").unwrap().3, b"1");
    assert_eq!(field(&fields, "user_id").unwrap().3, b"user_001");
    let messages: Value = serde_json::from_slice(&field(&fields, "messages").unwrap().3).unwrap();
    assert_eq!(
        messages,
        json!([{ "text": "Create an outreach sequence", "sender": "user" }])
    );
    assert!(field(&fields, "image").is_none());
}

#[tokio::test]
async fn chat_attaches_image_part() {
    let (client, state) = spawn_backend().await;
    let image = ImageAttachment {
        file_name: "profile.png".into(),
        bytes: vec![0x89, b'P', b'N', b'G'],
    };

    client
        .chat(&chat_request(ChatEndpoint::Standard, Some(image)))
        .await
        .unwrap();

    let fields = state.fields.lock().unwrap();
    let (_, _, file_name, bytes) = field(&fields, "image").unwrap();
    assert_eq!(file_name.as_deref(), Some("profile.png"));
    assert_eq!(bytes, &vec![0x89, b'P', b'N', b'G']);
}

#[tokio::test]
async fn open_search_endpoint_is_used() {
    let (client, state) = spawn_backend().await;
    let response = client
        .chat(&chat_request(ChatEndpoint::OpenSearch, None))
        .await
        .unwrap();
    assert_eq!(response.message.text, "open results");
    assert!(response.message.email_sequence.is_none());

    let fields = state.fields.lock().unwrap();
    assert!(fields.iter().all(|(route, _, _, _)| route == "open-search"));
}

#[tokio::test]
async fn lists_and_fetches_sequences() {
    let (client, _) = spawn_backend().await;

    let sequences = client.list_user_sequences("user_001").await.unwrap();
    assert_eq!(sequences.len(), 2);
    assert_eq!(sequences[1].content, "second");
    assert!(sequences[0].created_at.is_some());

    let org = client.list_org_sequences("org_001").await.unwrap();
    assert_eq!(org[0].user_id, "user_002");

    let one = client.get_sequence("42").await.unwrap();
    assert_eq!(one.id, "42");
}

#[tokio::test]
async fn missing_sequence_is_not_found() {
    let (client, _) = spawn_backend().await;
    let err = client.get_sequence("missing").await.unwrap_err();
    assert!(err.is_not_found());
    assert!(matches!(err, Error::NotFound(ref m) if m == "Sequence not found"));
}

#[tokio::test]
async fn save_posts_draft_and_returns_record() {
    let (client, state) = spawn_backend().await;
    let draft = SequenceDraft {
        id: "1".into(),
        user_id: "user_001".into(),
        org_id: "org_001".into(),
        name: "Sequence 1".into(),
        content: "Hi Jane".into(),
        messages: vec![TranscriptEntry {
            text: "hello".into(),
            sender: Sender::Assistant,
        }],
    };

    let stored = client.save_sequence(&draft).await.unwrap();
    assert_eq!(stored.content, "Hi Jane");
    assert!(stored.updated_at.is_some());

    let saved = state.saved.lock().unwrap();
    assert_eq!(saved[0]["content"], "Hi Jane");
    assert_eq!(saved[0]["messages"][0]["sender"], "assistant");
}

#[tokio::test]
async fn server_error_carries_detail() {
    let (client, _) = spawn_backend().await;
    let draft = SequenceDraft {
        id: "explode".into(),
        user_id: "user_001".into(),
        org_id: "org_001".into(),
        name: "Boom".into(),
        content: String::new(),
        messages: vec![],
    };

    let err = client.save_sequence(&draft).await.unwrap_err();
    assert!(err.is_server_error());
    assert_eq!(
        err.to_string(),
        "API error (500): Failed to store sequence: db down"
    );
}

#[tokio::test]
async fn unreachable_backend_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = BackendClient::new(&format!("http://{}", addr)).unwrap();
    let err = client.health().await.unwrap_err();
    assert!(matches!(err, Error::Http(_)));
}

#[tokio::test]
async fn health_reports_status() {
    let (client, _) = spawn_backend().await;
    assert_eq!(client.health().await.unwrap().status, "healthy");
}
