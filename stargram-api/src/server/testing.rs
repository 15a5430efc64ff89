//! Router state and request builders shared by the server tests.

use crate::server::{ServerState, routes};
use axum::{
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use serde_json::{Value, json};
use stargram_backend::{
    accounts::AccountService,
    client::{BackendClient, BackendConfig},
    files::FileStore,
    ids::IdSource,
    posts::PostRepository,
    publish::PublishOrchestrator,
    users::UserRepository,
};
use std::sync::Arc;
use tower::ServiceExt;

/// Nothing listens here; for requests that are rejected before reaching the backend.
pub(crate) const UNREACHABLE: &str = "http://127.0.0.1:9/v1";

const BOUNDARY: &str = "stargram-form-boundary";

pub(crate) fn state(endpoint: &str) -> ServerState {
    let config: BackendConfig = serde_json::from_value(json!({
        "endpoint": endpoint,
        "project_id": "stargram",
        "api_key": "key",
        "database_id": "main",
        "user_collection_id": "users",
        "post_collection_id": "posts",
        "storage_bucket_id": "media",
    }))
    .unwrap();
    let client = Arc::new(BackendClient::new(&config).unwrap());
    let ids = Arc::new(IdSource::default());
    let users = Arc::new(UserRepository::new(client.clone(), "users", ids.clone()));
    let posts = Arc::new(PostRepository::new(client.clone(), "posts", ids.clone()));
    let files = FileStore::new(client.clone(), "media", ids.clone());

    ServerState {
        accounts: Arc::new(AccountService::new(
            client.clone(),
            client,
            users.clone(),
            ids,
        )),
        users,
        posts: posts.clone(),
        publisher: Arc::new(PublishOrchestrator::new(files, posts)),
    }
}

pub(crate) async fn send(endpoint: &str, request: Request<Body>) -> (StatusCode, Value) {
    let response = routes()
        .with_state(state(endpoint))
        .oneshot(request)
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();

    (status, serde_json::from_slice(&body).unwrap())
}

pub(crate) fn text_part(name: &str, value: &str) -> Vec<u8> {
    format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
        .into_bytes()
}

pub(crate) fn file_part(name: &str, file_name: &str, bytes: &[u8]) -> Vec<u8> {
    let mut part = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
         Content-Type: image/png\r\n\r\n"
    )
    .into_bytes();
    part.extend_from_slice(bytes);
    part.extend_from_slice(b"\r\n");
    part
}

/// A multipart POST, signed in with `session` if given.
pub(crate) fn form_request(uri: &str, session: Option<&str>, parts: &[Vec<u8>]) -> Request<Body> {
    let mut body = parts.concat();
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let mut request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(session) = session {
        request = request.header(header::AUTHORIZATION, format!("Bearer {session}"));
    }

    request.body(Body::from(body)).unwrap()
}
