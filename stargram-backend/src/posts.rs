use crate::{
    capability::DocumentStore,
    error::{BackendError, Error, Result},
    ids::IdSource,
    query::Query,
    record::{PostFields, PostPatchFields, PostRecord},
};
use serde_json::Value;
use stargram_common::model::{
    Id, ModelValidationError,
    post::{NewPost, Post, PostMarker, PostPatch},
    user::UserMarker,
};
use std::sync::Arc;
use tracing::warn;

pub const MAX_LIST_LIMIT: u32 = 100;

pub struct PostRepository {
    documents: Arc<dyn DocumentStore>,
    collection: String,
    ids: Arc<IdSource>,
}

fn decode(document: Value) -> Result<Post, BackendError> {
    let record: PostRecord = serde_json::from_value(document)?;
    Ok(Post::try_from(record)?)
}

fn is_missing_creator(err: &BackendError) -> bool {
    matches!(
        err,
        BackendError::Data(ModelValidationError::MissingCreator)
    )
}

impl PostRepository {
    #[must_use]
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        collection: impl Into<String>,
        ids: Arc<IdSource>,
    ) -> Self {
        Self {
            documents,
            collection: collection.into(),
            ids,
        }
    }

    pub async fn create(&self, post: &NewPost) -> Result<Post> {
        let id: Id<PostMarker> = self.ids.next();
        let fields = serde_json::to_value(PostFields::from(post))
            .map_err(|err| Error::Write(err.into()))?;

        let document = self
            .documents
            .create_document(&self.collection, id.get(), fields)
            .await
            .map_err(Error::Write)?;

        Ok(decode(document)?)
    }

    pub async fn update(&self, post_id: &Id<PostMarker>, patch: &PostPatch) -> Result<Post> {
        let fields = serde_json::to_value(PostPatchFields::from(patch))
            .map_err(|err| Error::Write(err.into()))?;

        let document = match self
            .documents
            .update_document(&self.collection, post_id.get(), fields)
            .await
        {
            Ok(document) => document,
            Err(err) if err.is_not_found() => return Err(Error::PostNotFound(post_id.clone())),
            Err(err) => return Err(Error::Write(err)),
        };

        Ok(decode(document)?)
    }

    /// A stored post without a creator counts as missing.
    pub async fn get_by_id(&self, post_id: &Id<PostMarker>) -> Result<Option<Post>> {
        let Some(document) = self
            .documents
            .get_document(&self.collection, post_id.get())
            .await?
        else {
            return Ok(None);
        };

        match decode(document) {
            Ok(post) => Ok(Some(post)),
            Err(err) if is_missing_creator(&err) => {
                warn!(post = %post_id, "Post has no creator");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Newest first.
    pub async fn list_recent(&self, limit: u32) -> Result<Vec<Post>> {
        self.list(&[
            Query::newest_first(),
            Query::Limit(limit.min(MAX_LIST_LIMIT)),
        ])
        .await
    }

    /// Newest first.
    pub async fn list_by_creator(&self, creator: &Id<UserMarker>, limit: u32) -> Result<Vec<Post>> {
        self.list(&[
            Query::equal("creator", creator.get()),
            Query::newest_first(),
            Query::Limit(limit.min(MAX_LIST_LIMIT)),
        ])
        .await
    }

    async fn list(&self, queries: &[Query]) -> Result<Vec<Post>> {
        let documents = self
            .documents
            .list_documents(&self.collection, queries)
            .await?;

        let mut posts = Vec::with_capacity(documents.len());
        for document in documents {
            match decode(document) {
                Ok(post) => posts.push(post),
                Err(err) if is_missing_creator(&err) => warn!("Skipping post without creator"),
                Err(err) => return Err(err.into()),
            }
        }

        Ok(posts)
    }

    pub async fn delete(&self, post_id: &Id<PostMarker>) -> Result<()> {
        match self
            .documents
            .delete_document(&self.collection, post_id.get())
            .await
        {
            Ok(()) => Ok(()),
            Err(err) if err.is_not_found() => Err(Error::PostNotFound(post_id.clone())),
            Err(err) => Err(Error::Write(err)),
        }
    }
}
