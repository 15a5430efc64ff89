//! What the application needs from the backend provider.
//!
//! [`crate::client::BackendClient`] implements every trait here against the
//! provider's REST API. Repositories and services only hold trait objects, so
//! tests can swap in fakes.

use crate::{error::BackendError, query::Query};
use async_trait::async_trait;
use serde_json::Value;
use stargram_common::model::{
    Id,
    auth::{Account, AccountMarker, EmailAddress, Password, Session, SessionSecret},
    file::{FileMarker, RenderOptions, StoredFile, UploadFile},
};
use url::Url;

/// Accounts and sessions.
#[async_trait]
pub trait Identity: Send + Sync {
    async fn create_account(
        &self,
        id: &Id<AccountMarker>,
        email: &EmailAddress,
        password: &Password,
        name: &str,
    ) -> Result<Account, BackendError>;

    async fn create_session(
        &self,
        email: &EmailAddress,
        password: &Password,
    ) -> Result<Session, BackendError>;

    async fn delete_session(&self, session: &SessionSecret) -> Result<(), BackendError>;

    /// `None` if the session is unknown or expired.
    async fn current_account(
        &self,
        session: &SessionSecret,
    ) -> Result<Option<Account>, BackendError>;
}

pub trait Avatars: Send + Sync {
    /// Url of a generated avatar showing the initials of `name`.
    fn initials_url(&self, name: &str) -> Url;
}

/// Schemaless documents grouped in collections.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn create_document(
        &self,
        collection: &str,
        id: &str,
        fields: Value,
    ) -> Result<Value, BackendError>;

    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        patch: Value,
    ) -> Result<Value, BackendError>;

    async fn get_document(&self, collection: &str, id: &str)
    -> Result<Option<Value>, BackendError>;

    async fn list_documents(
        &self,
        collection: &str,
        queries: &[Query],
    ) -> Result<Vec<Value>, BackendError>;

    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), BackendError>;
}

/// Binary files grouped in buckets.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn create_file(
        &self,
        bucket: &str,
        id: &Id<FileMarker>,
        file: &UploadFile,
    ) -> Result<StoredFile, BackendError>;

    async fn get_file(
        &self,
        bucket: &str,
        id: &Id<FileMarker>,
    ) -> Result<Option<StoredFile>, BackendError>;

    /// Pure url construction, does not check that the file exists.
    fn file_preview_url(&self, bucket: &str, id: &Id<FileMarker>, render: &RenderOptions) -> Url;

    async fn delete_file(&self, bucket: &str, id: &Id<FileMarker>) -> Result<(), BackendError>;
}
