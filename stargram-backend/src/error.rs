use reqwest::StatusCode;
use stargram_common::model::{
    Id, ModelValidationError, file::FileMarker, post::PostMarker, user::UserMarker,
};
use thiserror::Error;
use url::Url;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failure of a single call to the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Request to the backend failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Backend replied with {status} ({kind}): {message}")]
    Api {
        status: StatusCode,
        kind: String,
        message: String,
    },
    #[error("Backend reply could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("An object from the backend was invalid: {0}")]
    Data(#[from] ModelValidationError),
    #[error("The endpoint {0} cannot be used as a base url")]
    InvalidEndpoint(Url),
}

impl BackendError {
    #[must_use]
    pub fn api(status: StatusCode, kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            kind: kind.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            BackendError::Api { status, .. } => Some(*status),
            BackendError::Transport(err) => err.status(),
            BackendError::Decode(_) | BackendError::Data(_) | BackendError::InvalidEndpoint(_) => {
                None
            }
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("File {0} does not exist")]
    Missing(Id<FileMarker>),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Flat tag of an [`Error`], for callers that only branch on what went wrong.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
pub enum ErrorKind {
    Invalid,
    Upload,
    Resolve,
    Write,
    Delete,
    NotFound,
    Forbidden,
    Unauthenticated,
    Backend,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("The post has no image to upload")]
    MissingImage,
    #[error("Uploading the image failed: {0}")]
    Upload(#[source] BackendError),
    #[error("Resolving the image url failed: {0}")]
    Resolve(#[from] ResolveError),
    #[error("Writing the post failed: {0}")]
    Write(#[source] BackendError),
    #[error("Deleting failed: {0}")]
    Delete(#[source] BackendError),
    #[error("Post with id {0} was not found.")]
    PostNotFound(Id<PostMarker>),
    #[error("User {caller} may not change post {post}")]
    Forbidden {
        post: Id<PostMarker>,
        caller: Id<UserMarker>,
    },
    #[error("No valid session or credentials")]
    Unauthenticated,
    #[error("The identity provider rejected the request: {0}")]
    Identity(#[source] BackendError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl Error {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MissingImage => ErrorKind::Invalid,
            Error::Upload(_) => ErrorKind::Upload,
            Error::Resolve(_) => ErrorKind::Resolve,
            Error::Write(_) => ErrorKind::Write,
            Error::Delete(_) => ErrorKind::Delete,
            Error::PostNotFound(_) => ErrorKind::NotFound,
            Error::Forbidden { .. } => ErrorKind::Forbidden,
            Error::Unauthenticated => ErrorKind::Unauthenticated,
            Error::Identity(_) | Error::Backend(_) => ErrorKind::Backend,
        }
    }
}
