//! In-memory stand-in for the backend, with switches to make calls fail.

use crate::{
    capability::{Avatars, BlobStore, DocumentStore, Identity},
    error::BackendError,
    query::Query,
};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use stargram_common::model::{
    Id,
    auth::{
        Account, AccountMarker, Caller, EmailAddress, Password, Session, SessionSecret,
    },
    file::{FileMarker, RenderOptions, StoredFile, UploadFile},
};
use std::{
    cmp::Ordering,
    collections::BTreeMap,
    sync::{Mutex, MutexGuard},
};
use time::{Duration, OffsetDateTime, format_description::well_known::Rfc3339};
use url::Url;

#[derive(Default)]
pub(crate) struct State {
    pub documents: BTreeMap<(String, String), Value>,
    pub files: BTreeMap<(String, String), StoredFile>,
    pub accounts: Vec<(Account, EmailAddress, Password)>,
    pub sessions: BTreeMap<String, Id<AccountMarker>>,
    pub clock: i64,
    pub deleted_files: Vec<Id<FileMarker>>,
    pub fail_upload: bool,
    pub fail_file_lookup: bool,
    pub fail_create_document: bool,
    /// Stores the document but replies with a body that lacks its fields.
    pub truncate_create_reply: bool,
    pub fail_update_document: bool,
    pub fail_delete_session: bool,
}

#[derive(Default)]
pub(crate) struct FakeBackend {
    state: Mutex<State>,
}

pub(crate) fn caller(user_id: &str) -> Caller {
    Caller {
        user_id: Id::new(user_id),
        session: "secret".parse().unwrap(),
    }
}

pub(crate) fn image(name: &str) -> UploadFile {
    UploadFile {
        name: name.to_owned(),
        content_type: Some("image/png".to_owned()),
        bytes: vec![0x89, b'P', b'N', b'G'],
    }
}

fn injected() -> BackendError {
    BackendError::api(
        StatusCode::SERVICE_UNAVAILABLE,
        "general_unknown",
        "injected failure",
    )
}

fn not_found(kind: &str) -> BackendError {
    BackendError::api(StatusCode::NOT_FOUND, kind, "not found")
}

fn compare(a: &Value, b: &Value, attribute: &str) -> Ordering {
    let key = |value: &Value| value.get(attribute).map(ToString::to_string);
    key(a).cmp(&key(b))
}

impl FakeBackend {
    pub fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn document_count(&self, collection: &str) -> usize {
        self.state()
            .documents
            .keys()
            .filter(|(stored_collection, _)| stored_collection == collection)
            .count()
    }

    pub fn has_file(&self, id: &Id<FileMarker>) -> bool {
        self.state()
            .files
            .keys()
            .any(|(_, stored_id)| stored_id == id.get())
    }

    pub fn insert_document(&self, collection: &str, id: &str, document: Value) {
        self.state()
            .documents
            .insert((collection.to_owned(), id.to_owned()), document);
    }
}

#[async_trait]
impl DocumentStore for FakeBackend {
    async fn create_document(
        &self,
        collection: &str,
        id: &str,
        fields: Value,
    ) -> Result<Value, BackendError> {
        let mut state = self.state();
        if state.fail_create_document {
            return Err(injected());
        }

        state.clock += 1;
        let created_at = (OffsetDateTime::UNIX_EPOCH + Duration::seconds(state.clock))
            .format(&Rfc3339)
            .unwrap();

        let mut document = fields;
        document["$id"] = Value::from(id);
        document["$createdAt"] = Value::from(created_at);
        state
            .documents
            .insert((collection.to_owned(), id.to_owned()), document.clone());

        if state.truncate_create_reply {
            return Ok(serde_json::json!({ "$id": id }));
        }

        Ok(document)
    }

    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        patch: Value,
    ) -> Result<Value, BackendError> {
        let mut state = self.state();
        if state.fail_update_document {
            return Err(injected());
        }

        let document = state
            .documents
            .get_mut(&(collection.to_owned(), id.to_owned()))
            .ok_or_else(|| not_found("document_not_found"))?;
        if let (Some(document), Value::Object(patch)) = (document.as_object_mut(), patch) {
            document.extend(patch);
        }

        Ok(document.clone())
    }

    async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Value>, BackendError> {
        Ok(self
            .state()
            .documents
            .get(&(collection.to_owned(), id.to_owned()))
            .cloned())
    }

    async fn list_documents(
        &self,
        collection: &str,
        queries: &[Query],
    ) -> Result<Vec<Value>, BackendError> {
        let mut documents: Vec<Value> = self
            .state()
            .documents
            .iter()
            .filter(|((stored_collection, _), _)| stored_collection == collection)
            .map(|(_, document)| document.clone())
            .collect();
        let mut limit = None;

        for query in queries {
            match query {
                Query::Equal { attribute, values } => documents
                    .retain(|document| document.get(attribute).is_some_and(|v| values.contains(v))),
                Query::OrderAsc(attribute) => documents.sort_by(|a, b| compare(a, b, attribute)),
                Query::OrderDesc(attribute) => documents.sort_by(|a, b| compare(b, a, attribute)),
                Query::Limit(max) => limit = Some(*max as usize),
            }
        }
        if let Some(limit) = limit {
            documents.truncate(limit);
        }

        Ok(documents)
    }

    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), BackendError> {
        self.state()
            .documents
            .remove(&(collection.to_owned(), id.to_owned()))
            .map(|_| ())
            .ok_or_else(|| not_found("document_not_found"))
    }
}

#[async_trait]
impl BlobStore for FakeBackend {
    async fn create_file(
        &self,
        bucket: &str,
        id: &Id<FileMarker>,
        file: &UploadFile,
    ) -> Result<StoredFile, BackendError> {
        let mut state = self.state();
        if state.fail_upload {
            return Err(injected());
        }

        let stored = StoredFile {
            id: id.clone(),
            name: file.name.clone(),
            mime_type: file.content_type.clone().unwrap_or_default(),
            size: file.bytes.len() as u64,
        };
        state
            .files
            .insert((bucket.to_owned(), id.get().to_owned()), stored.clone());

        Ok(stored)
    }

    async fn get_file(
        &self,
        bucket: &str,
        id: &Id<FileMarker>,
    ) -> Result<Option<StoredFile>, BackendError> {
        let state = self.state();
        if state.fail_file_lookup {
            return Err(injected());
        }

        Ok(state
            .files
            .get(&(bucket.to_owned(), id.get().to_owned()))
            .cloned())
    }

    fn file_preview_url(&self, bucket: &str, id: &Id<FileMarker>, render: &RenderOptions) -> Url {
        Url::parse(&format!(
            "https://files.example.org/{bucket}/{id}/preview?width={}&height={}&gravity={}&quality={}",
            render.width,
            render.height,
            render.gravity.as_str(),
            render.quality
        ))
        .unwrap()
    }

    async fn delete_file(&self, bucket: &str, id: &Id<FileMarker>) -> Result<(), BackendError> {
        let mut state = self.state();
        state.deleted_files.push(id.clone());

        state
            .files
            .remove(&(bucket.to_owned(), id.get().to_owned()))
            .map(|_| ())
            .ok_or_else(|| not_found("storage_file_not_found"))
    }
}

#[async_trait]
impl Identity for FakeBackend {
    async fn create_account(
        &self,
        id: &Id<AccountMarker>,
        email: &EmailAddress,
        password: &Password,
        name: &str,
    ) -> Result<Account, BackendError> {
        let mut state = self.state();
        if state.accounts.iter().any(|(_, known, _)| known == email) {
            return Err(BackendError::api(
                StatusCode::CONFLICT,
                "user_already_exists",
                "A user with the same email already exists.",
            ));
        }

        let account = Account {
            id: id.clone(),
            name: name.to_owned(),
            email: email.get().to_owned(),
        };
        state
            .accounts
            .push((account.clone(), email.clone(), password.clone()));

        Ok(account)
    }

    async fn create_session(
        &self,
        email: &EmailAddress,
        password: &Password,
    ) -> Result<Session, BackendError> {
        let mut state = self.state();
        let account_id = state
            .accounts
            .iter()
            .find(|(_, known_email, known_password)| known_email == email && known_password == password)
            .map(|(account, _, _)| account.id.clone())
            .ok_or_else(|| {
                BackendError::api(
                    StatusCode::UNAUTHORIZED,
                    "user_invalid_credentials",
                    "Invalid credentials.",
                )
            })?;

        state.clock += 1;
        let secret = format!("secret-{}", state.clock);
        state.sessions.insert(secret.clone(), account_id.clone());

        Ok(Session {
            id: Id::new(format!("session-{}", state.clock)),
            account_id,
            secret: secret.parse().unwrap(),
            expires_at: OffsetDateTime::UNIX_EPOCH + Duration::days(365 * 100),
        })
    }

    async fn delete_session(&self, session: &SessionSecret) -> Result<(), BackendError> {
        let mut state = self.state();
        if state.fail_delete_session {
            return Err(injected());
        }

        state
            .sessions
            .remove(session.get())
            .map(|_| ())
            .ok_or_else(|| {
                BackendError::api(StatusCode::UNAUTHORIZED, "general_unauthorized_scope", "")
            })
    }

    async fn current_account(
        &self,
        session: &SessionSecret,
    ) -> Result<Option<Account>, BackendError> {
        let state = self.state();
        let Some(account_id) = state.sessions.get(session.get()) else {
            return Ok(None);
        };

        Ok(state
            .accounts
            .iter()
            .find(|(account, _, _)| &account.id == account_id)
            .map(|(account, _, _)| account.clone()))
    }
}

impl Avatars for FakeBackend {
    fn initials_url(&self, name: &str) -> Url {
        Url::parse_with_params("https://files.example.org/avatars/initials", [("name", name)])
            .unwrap()
    }
}
