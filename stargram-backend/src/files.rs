use crate::{
    capability::BlobStore,
    error::{Error, ResolveError, Result},
    ids::IdSource,
};
use stargram_common::model::{
    Id,
    file::{FileMarker, RenderOptions, StoredFile, UploadFile},
};
use std::sync::Arc;
use url::Url;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
pub enum DeleteOutcome {
    Deleted,
    AlreadyAbsent,
}

/// Post images in one bucket of the blob store.
pub struct FileStore {
    blobs: Arc<dyn BlobStore>,
    bucket: String,
    ids: Arc<IdSource>,
}

impl FileStore {
    #[must_use]
    pub fn new(blobs: Arc<dyn BlobStore>, bucket: impl Into<String>, ids: Arc<IdSource>) -> Self {
        Self {
            blobs,
            bucket: bucket.into(),
            ids,
        }
    }

    pub async fn upload(&self, file: &UploadFile) -> Result<StoredFile> {
        let id = self.ids.next();

        self.blobs
            .create_file(&self.bucket, &id, file)
            .await
            .map_err(Error::Upload)
    }

    /// Checks that the file exists before building its url.
    pub async fn resolve_url(&self, file_id: &Id<FileMarker>, render: &RenderOptions) -> Result<Url> {
        match self.blobs.get_file(&self.bucket, file_id).await {
            Ok(Some(_)) => Ok(self.blobs.file_preview_url(&self.bucket, file_id, render)),
            Ok(None) => Err(ResolveError::Missing(file_id.clone()).into()),
            Err(err) => Err(ResolveError::Backend(err).into()),
        }
    }

    pub async fn delete(&self, file_id: &Id<FileMarker>) -> Result<DeleteOutcome> {
        match self.blobs.delete_file(&self.bucket, file_id).await {
            Ok(()) => Ok(DeleteOutcome::Deleted),
            Err(err) if err.is_not_found() => Ok(DeleteOutcome::AlreadyAbsent),
            Err(err) => Err(Error::Delete(err)),
        }
    }
}
