use axum::{
    Router,
    extract::{
        FromRef, Request,
        multipart::{MultipartError, MultipartRejection},
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use axum_extra::typed_header::TypedHeaderRejection;
use json::Json;
use serde::{Deserialize, Serialize};
use stargram_backend::{
    accounts::AccountService,
    error::{Error as BackendError, ErrorKind},
    posts::PostRepository,
    publish::PublishOrchestrator,
    users::UserRepository,
};
use stargram_common::model::{
    Id, auth::InvalidSessionSecretError, post::PostMarker, user::UserMarker,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

mod auth;
mod form;
mod json;
mod query;
mod routes;
#[cfg(test)]
mod testing;

pub type ServerRouter = Router<ServerState>;

#[derive(Clone, FromRef)]
pub struct ServerState {
    pub accounts: Arc<AccountService>,
    pub users: Arc<UserRepository>,
    pub posts: Arc<PostRepository>,
    pub publisher: Arc<PublishOrchestrator>,
}

pub fn routes() -> ServerRouter {
    routes::routes().fallback(fallback)
}

pub async fn fallback(request: Request) -> ServerError {
    ServerError::UnknownRoute(request.into_parts().0.uri)
}

pub type Result<T, E = ServerError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Unknown route requested: {0}")]
    UnknownRoute(Uri),
    #[error("Path rejected: {0}")]
    PathRejection(#[from] PathRejection),
    #[error("Query string rejected: {0}")]
    QueryRejection(#[from] QueryRejection),
    #[error("Incoming JSON rejected: {0}")]
    JsonRejection(#[from] JsonRejection),
    #[error("Incoming form rejected: {0}")]
    MultipartRejection(#[from] MultipartRejection),
    #[error("Incoming form could not be read: {0}")]
    Multipart(#[from] MultipartError),
    #[error("Unexpected form field: {0:?}")]
    UnexpectedFormField(String),
    #[error("JSON response could not be serialized: {0}")]
    JsonResponse(#[from] serde_json::Error),
    #[error("Authorization header was missing or invalid: {0}")]
    InvalidAuthorizationHeader(TypedHeaderRejection),
    #[error("The provided session could not be read: {0}")]
    InvalidSession(#[from] InvalidSessionSecretError),
    #[error("Provided session was invalid")]
    InvalidToken,
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("Post with id {0} was not found.")]
    PostByIdNotFound(Id<PostMarker>),
    #[error("User with id {0} was not found.")]
    UserByIdNotFound(Id<UserMarker>),
}

fn backend_status(err: &BackendError) -> StatusCode {
    match err.kind() {
        ErrorKind::Invalid => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
        ErrorKind::Backend => match err {
            BackendError::Identity(inner) if inner.status() == Some(StatusCode::CONFLICT) => {
                StatusCode::CONFLICT
            }
            _ => StatusCode::BAD_GATEWAY,
        },
        ErrorKind::Upload | ErrorKind::Resolve | ErrorKind::Write | ErrorKind::Delete => {
            StatusCode::BAD_GATEWAY
        }
    }
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::UnknownRoute(_)
            | ServerError::PathRejection(_)
            | ServerError::PostByIdNotFound(_)
            | ServerError::UserByIdNotFound(_) => StatusCode::NOT_FOUND,
            ServerError::InvalidAuthorizationHeader(rejection) if rejection.is_missing() => {
                StatusCode::UNAUTHORIZED
            }
            ServerError::InvalidToken => StatusCode::UNAUTHORIZED,
            ServerError::QueryRejection(_)
            | ServerError::JsonRejection(_)
            | ServerError::MultipartRejection(_)
            | ServerError::Multipart(_)
            | ServerError::UnexpectedFormField(_)
            | ServerError::InvalidAuthorizationHeader(_)
            | ServerError::InvalidSession(_) => StatusCode::BAD_REQUEST,
            ServerError::JsonResponse(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Backend(err) => backend_status(err),
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Serialize, Deserialize)]
struct ErrorResponse {
    status: u16,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();

        error!(error = %self, %status, "Replying with error");

        let error_response = ErrorResponse {
            status: status.as_u16(),
        };
        (status, Json(error_response)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use crate::server::{
        ServerError,
        testing::{UNREACHABLE, send},
    };
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode, header},
    };
    use serde_json::json;
    use stargram_backend::error::{BackendError, Error};
    use stargram_common::model::Id;

    #[tokio::test]
    async fn unknown_route() {
        let request = Request::get("/nowhere").body(Body::empty()).unwrap();

        assert_eq!(
            send(UNREACHABLE, request).await,
            (StatusCode::NOT_FOUND, json!({ "status": 404 }))
        );
    }

    #[tokio::test]
    async fn creating_requires_a_session() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/posts/create")
            .body(Body::empty())
            .unwrap();

        assert_eq!(
            send(UNREACHABLE, request).await,
            (StatusCode::UNAUTHORIZED, json!({ "status": 401 }))
        );
    }

    #[tokio::test]
    async fn malformed_session() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/auth/sign-out")
            .header(header::AUTHORIZATION, "Bearer  ")
            .body(Body::empty())
            .unwrap();

        let (status, _) = send(UNREACHABLE, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn invalid_sign_up_body() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/auth/sign-up")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({
                    "name": "Ada",
                    "username": "ada",
                    "email": "ada@example.org",
                    "password": "short",
                })
                .to_string(),
            ))
            .unwrap();

        assert_eq!(
            send(UNREACHABLE, request).await,
            (StatusCode::BAD_REQUEST, json!({ "status": 400 }))
        );
    }

    #[tokio::test]
    async fn invalid_limit() {
        let request = Request::get("/posts/recent?limit=lots")
            .body(Body::empty())
            .unwrap();

        let (status, _) = send(UNREACHABLE, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn backend_errors_map_to_statuses() {
        let upstream = || BackendError::api(StatusCode::SERVICE_UNAVAILABLE, "general", "down");

        let cases = [
            (Error::MissingImage, StatusCode::BAD_REQUEST),
            (Error::PostNotFound(Id::new("p1")), StatusCode::NOT_FOUND),
            (
                Error::Forbidden {
                    post: Id::new("p1"),
                    caller: Id::new("u2"),
                },
                StatusCode::FORBIDDEN,
            ),
            (Error::Unauthenticated, StatusCode::UNAUTHORIZED),
            (Error::Upload(upstream()), StatusCode::BAD_GATEWAY),
            (Error::Write(upstream()), StatusCode::BAD_GATEWAY),
            (
                Error::Identity(BackendError::api(
                    StatusCode::CONFLICT,
                    "user_already_exists",
                    "taken",
                )),
                StatusCode::CONFLICT,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ServerError::Backend(err).status(), status);
        }
    }
}
