//! Publishing and editing posts.
//!
//! Each operation is a chain of remote steps. When a step after the upload
//! fails, the uploaded file is deleted again on a best-effort basis; a failed
//! delete is logged and the step's own error is returned.
//!
//! `edit` does not delete a freshly uploaded file when the final update
//! fails. That file stays in the bucket unreferenced.

use crate::{
    error::{Error, ErrorKind, Result},
    files::{DeleteOutcome, FileStore},
    posts::PostRepository,
};
use stargram_common::{
    model::{
        Id,
        auth::Caller,
        file::{FileMarker, RenderOptions, UploadFile},
        post::{NewPost, Post, PostDraft, PostImage, PostMarker, PostPatch},
    },
    tags::parse_tags,
};
use std::{
    fmt::{Display, Formatter},
    sync::Arc,
};
use tracing::{debug, warn};

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
enum Stage {
    Uploading,
    Resolving,
    Writing,
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let stage = match self {
            Stage::Uploading => "uploading",
            Stage::Resolving => "resolving",
            Stage::Writing => "writing",
        };
        f.write_str(stage)
    }
}

pub struct PublishOrchestrator {
    files: FileStore,
    posts: Arc<PostRepository>,
    render: RenderOptions,
}

impl PublishOrchestrator {
    #[must_use]
    pub fn new(files: FileStore, posts: Arc<PostRepository>) -> Self {
        Self {
            files,
            posts,
            render: RenderOptions::STANDARD,
        }
    }

    pub async fn publish(&self, caller: &Caller, draft: PostDraft) -> Result<Post> {
        let file = draft.file.ok_or(Error::MissingImage)?;
        let image = self.store_image(&file).await?;

        debug!(stage = %Stage::Writing, file = %image.id, "Publishing post");
        let new_post = NewPost {
            creator: caller.user_id.clone(),
            caption: draft.caption,
            location: draft.location,
            tags: parse_tags(&draft.tags),
            image,
        };

        match self.posts.create(&new_post).await {
            Ok(post) => {
                debug!(post = %post.id, "Published post");
                Ok(post)
            }
            Err(err) => {
                if err.kind() == ErrorKind::Write {
                    self.discard_image(&new_post.image.id).await;
                }
                Err(err)
            }
        }
    }

    /// Replaces caption, location and tags. The image is only replaced when
    /// the draft carries a file.
    pub async fn edit(
        &self,
        caller: &Caller,
        post_id: &Id<PostMarker>,
        draft: PostDraft,
    ) -> Result<Post> {
        let current = self.owned_post(caller, post_id).await?;

        let image = match &draft.file {
            Some(file) => Some(self.store_image(file).await?),
            None => None,
        };

        debug!(stage = %Stage::Writing, post = %post_id, "Updating post");
        let patch = PostPatch {
            caption: draft.caption,
            location: draft.location,
            tags: parse_tags(&draft.tags),
            image,
        };

        let updated = match self.posts.update(post_id, &patch).await {
            Ok(updated) => updated,
            Err(err) => {
                if let Some(image) = &patch.image {
                    warn!(file = %image.id, error = %err, "Update failed, keeping uploaded file");
                }
                return Err(err);
            }
        };

        if patch.image.is_some() && current.image.id != updated.image.id {
            self.discard_image(&current.image.id).await;
        }

        Ok(updated)
    }

    /// Deletes the post, then its image.
    pub async fn remove(&self, caller: &Caller, post_id: &Id<PostMarker>) -> Result<()> {
        let post = self.owned_post(caller, post_id).await?;

        self.posts.delete(post_id).await?;
        self.discard_image(&post.image.id).await;

        Ok(())
    }

    async fn owned_post(&self, caller: &Caller, post_id: &Id<PostMarker>) -> Result<Post> {
        let post = self
            .posts
            .get_by_id(post_id)
            .await?
            .ok_or_else(|| Error::PostNotFound(post_id.clone()))?;

        if post.creator != caller.user_id {
            return Err(Error::Forbidden {
                post: post_id.clone(),
                caller: caller.user_id.clone(),
            });
        }

        Ok(post)
    }

    async fn store_image(&self, file: &UploadFile) -> Result<PostImage> {
        debug!(stage = %Stage::Uploading, name = %file.name, "Storing image");
        let stored = self.files.upload(file).await?;

        debug!(stage = %Stage::Resolving, file = %stored.id, "Storing image");
        match self.files.resolve_url(&stored.id, &self.render).await {
            Ok(url) => Ok(PostImage { id: stored.id, url }),
            Err(err) => {
                self.discard_image(&stored.id).await;
                Err(err)
            }
        }
    }

    async fn discard_image(&self, file_id: &Id<FileMarker>) {
        match self.files.delete(file_id).await {
            Ok(DeleteOutcome::Deleted) => debug!(file = %file_id, "Deleted image"),
            Ok(DeleteOutcome::AlreadyAbsent) => debug!(file = %file_id, "Image was already gone"),
            Err(err) => warn!(file = %file_id, error = %err, "Could not delete image"),
        }
    }
}
