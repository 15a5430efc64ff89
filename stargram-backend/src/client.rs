use crate::{
    capability::{Avatars, BlobStore, DocumentStore, Identity},
    error::BackendError,
    query::Query,
    record::{AccountRecord, FileRecord, SessionRecord},
};
use async_trait::async_trait;
use reqwest::{
    Method, RequestBuilder, Response,
    multipart::{Form, Part},
};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Value, json};
use stargram_common::model::{
    Id,
    auth::{Account, AccountMarker, EmailAddress, Password, Session, SessionSecret},
    file::{FileMarker, RenderOptions, StoredFile, UploadFile},
};
use std::fmt::{Debug, Formatter};
use tracing::debug;
use url::Url;

pub const PROJECT_HEADER: &str = "X-Appwrite-Project";
pub const KEY_HEADER: &str = "X-Appwrite-Key";
pub const SESSION_HEADER: &str = "X-Appwrite-Session";

pub type Result<T, E = BackendError> = std::result::Result<T, E>;

/// Where the backend lives and which of its resources the application uses.
#[derive(Clone, Eq, PartialEq, Hash, Deserialize)]
pub struct BackendConfig {
    /// Including the api version, e.g. `https://cloud.example.org/v1`.
    pub endpoint: Url,
    pub project_id: String,
    pub api_key: String,
    pub database_id: String,
    pub user_collection_id: String,
    pub post_collection_id: String,
    pub storage_bucket_id: String,
}

impl Debug for BackendConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("endpoint", &self.endpoint.as_str())
            .field("project_id", &self.project_id)
            .field("api_key", &"[redacted]")
            .field("database_id", &self.database_id)
            .field("user_collection_id", &self.user_collection_id)
            .field("post_collection_id", &self.post_collection_id)
            .field("storage_bucket_id", &self.storage_bucket_id)
            .finish()
    }
}

#[derive(Copy, Clone, Debug)]
enum Auth<'a> {
    ApiKey,
    Session(&'a SessionSecret),
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(rename = "type", default)]
    kind: String,
}

#[derive(Deserialize)]
struct DocumentList {
    documents: Vec<Value>,
}

/// REST client for the backend provider.
pub struct BackendClient {
    http: reqwest::Client,
    endpoint: Url,
    project_id: String,
    api_key: String,
    database_id: String,
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        if config.endpoint.cannot_be_a_base() {
            return Err(BackendError::InvalidEndpoint(config.endpoint.clone()));
        }

        Ok(Self {
            http: reqwest::Client::new(),
            endpoint: config.endpoint.clone(),
            project_id: config.project_id.clone(),
            api_key: config.api_key.clone(),
            database_id: config.database_id.clone(),
        })
    }

    fn url<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        let mut url = self.endpoint.clone();
        // Checked in `new`.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn document_url(&self, collection: &str, id: Option<&str>) -> Url {
        let mut segments = vec![
            "databases",
            self.database_id.as_str(),
            "collections",
            collection,
            "documents",
        ];
        segments.extend(id);
        self.url(segments)
    }

    fn file_url(&self, bucket: &str, id: Option<&Id<FileMarker>>) -> Url {
        let mut segments = vec!["storage", "buckets", bucket, "files"];
        segments.extend(id.map(Id::get));
        self.url(segments)
    }

    fn request(&self, method: Method, url: Url, auth: Auth<'_>) -> RequestBuilder {
        let request = self
            .http
            .request(method, url)
            .header(PROJECT_HEADER, &self.project_id);

        match auth {
            Auth::ApiKey => request.header(KEY_HEADER, &self.api_key),
            Auth::Session(session) => request.header(SESSION_HEADER, session.get()),
        }
    }

    async fn send(request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.bytes().await?;
        let (kind, message) = match serde_json::from_slice::<ErrorBody>(&body) {
            Ok(error) => (error.kind, error.message),
            Err(_) => (String::new(), String::from_utf8_lossy(&body).into_owned()),
        };

        debug!(%status, %kind, %message, "Backend rejected request");
        Err(BackendError::api(status, kind, message))
    }

    async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
        let body = Self::send(request).await?.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn send_optional<T: DeserializeOwned>(request: RequestBuilder) -> Result<Option<T>> {
        match Self::send_json(request).await {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }
}

#[async_trait]
impl Identity for BackendClient {
    async fn create_account(
        &self,
        id: &Id<AccountMarker>,
        email: &EmailAddress,
        password: &Password,
        name: &str,
    ) -> Result<Account> {
        let body = json!({
            "userId": id.get(),
            "email": email.get(),
            "password": password.get(),
            "name": name,
        });
        let request = self
            .request(Method::POST, self.url(["users"]), Auth::ApiKey)
            .json(&body);

        let record: AccountRecord = Self::send_json(request).await?;
        Ok(record.into())
    }

    async fn create_session(&self, email: &EmailAddress, password: &Password) -> Result<Session> {
        let body = json!({ "email": email.get(), "password": password.get() });
        let request = self
            .request(
                Method::POST,
                self.url(["account", "sessions", "email"]),
                Auth::ApiKey,
            )
            .json(&body);

        let record: SessionRecord = Self::send_json(request).await?;
        Ok(record.try_into()?)
    }

    async fn delete_session(&self, session: &SessionSecret) -> Result<()> {
        let request = self.request(
            Method::DELETE,
            self.url(["account", "sessions", "current"]),
            Auth::Session(session),
        );

        Self::send(request).await?;
        Ok(())
    }

    async fn current_account(&self, session: &SessionSecret) -> Result<Option<Account>> {
        let request = self.request(Method::GET, self.url(["account"]), Auth::Session(session));

        match Self::send_json::<AccountRecord>(request).await {
            Ok(record) => Ok(Some(record.into())),
            Err(err) if err.is_unauthorized() => Ok(None),
            Err(err) => Err(err),
        }
    }
}

impl Avatars for BackendClient {
    fn initials_url(&self, name: &str) -> Url {
        let mut url = self.url(["avatars", "initials"]);
        url.query_pairs_mut()
            .append_pair("name", name)
            .append_pair("project", &self.project_id);
        url
    }
}

#[async_trait]
impl DocumentStore for BackendClient {
    async fn create_document(&self, collection: &str, id: &str, fields: Value) -> Result<Value> {
        let body = json!({ "documentId": id, "data": fields });
        let request = self
            .request(
                Method::POST,
                self.document_url(collection, None),
                Auth::ApiKey,
            )
            .json(&body);

        Self::send_json(request).await
    }

    async fn update_document(&self, collection: &str, id: &str, patch: Value) -> Result<Value> {
        let body = json!({ "data": patch });
        let request = self
            .request(
                Method::PATCH,
                self.document_url(collection, Some(id)),
                Auth::ApiKey,
            )
            .json(&body);

        Self::send_json(request).await
    }

    async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        let request = self.request(
            Method::GET,
            self.document_url(collection, Some(id)),
            Auth::ApiKey,
        );

        Self::send_optional(request).await
    }

    async fn list_documents(&self, collection: &str, queries: &[Query]) -> Result<Vec<Value>> {
        let queries = queries
            .iter()
            .map(|query| Ok(("queries[]", query.to_wire()?)))
            .collect::<Result<Vec<_>>>()?;
        let request = self
            .request(
                Method::GET,
                self.document_url(collection, None),
                Auth::ApiKey,
            )
            .query(&queries);

        let list: DocumentList = Self::send_json(request).await?;
        Ok(list.documents)
    }

    async fn delete_document(&self, collection: &str, id: &str) -> Result<()> {
        let request = self.request(
            Method::DELETE,
            self.document_url(collection, Some(id)),
            Auth::ApiKey,
        );

        Self::send(request).await?;
        Ok(())
    }
}

#[async_trait]
impl BlobStore for BackendClient {
    async fn create_file(
        &self,
        bucket: &str,
        id: &Id<FileMarker>,
        file: &UploadFile,
    ) -> Result<StoredFile> {
        let mut part = Part::bytes(file.bytes.clone()).file_name(file.name.clone());
        if let Some(content_type) = &file.content_type {
            part = part.mime_str(content_type)?;
        }
        let form = Form::new()
            .text("fileId", id.get().to_owned())
            .part("file", part);

        let request = self
            .request(Method::POST, self.file_url(bucket, None), Auth::ApiKey)
            .multipart(form);

        let record: FileRecord = Self::send_json(request).await?;
        Ok(record.into())
    }

    async fn get_file(&self, bucket: &str, id: &Id<FileMarker>) -> Result<Option<StoredFile>> {
        let request = self.request(Method::GET, self.file_url(bucket, Some(id)), Auth::ApiKey);

        let record: Option<FileRecord> = Self::send_optional(request).await?;
        Ok(record.map(StoredFile::from))
    }

    fn file_preview_url(&self, bucket: &str, id: &Id<FileMarker>, render: &RenderOptions) -> Url {
        let mut url = self.url(["storage", "buckets", bucket, "files", id.get(), "preview"]);
        url.query_pairs_mut()
            .append_pair("width", &render.width.to_string())
            .append_pair("height", &render.height.to_string())
            .append_pair("gravity", render.gravity.as_str())
            .append_pair("quality", &render.quality.to_string())
            .append_pair("project", &self.project_id);
        url
    }

    async fn delete_file(&self, bucket: &str, id: &Id<FileMarker>) -> Result<()> {
        let request = self.request(
            Method::DELETE,
            self.file_url(bucket, Some(id)),
            Auth::ApiKey,
        );

        Self::send(request).await?;
        Ok(())
    }
}
