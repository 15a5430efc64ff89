use crate::{
    model::{
        Id,
        file::{FileMarker, UploadFile},
        user::UserMarker,
    },
    tags::TagSet,
};
use serde::Serialize;
use time::OffsetDateTime;
use url::Url;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct PostMarker;

/// The stored image of a post. Id and display url are only ever written together.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize)]
pub struct PostImage {
    pub id: Id<FileMarker>,
    pub url: Url,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize)]
pub struct Post {
    pub id: Id<PostMarker>,
    pub creator: Id<UserMarker>,
    pub caption: String,
    pub location: Option<String>,
    pub tags: TagSet,
    pub image: PostImage,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// A post submission as it comes out of the post form.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash)]
pub struct PostDraft {
    pub caption: String,
    pub location: Option<String>,
    /// Unparsed, see [`crate::tags::parse_tags`].
    pub tags: String,
    pub file: Option<UploadFile>,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct NewPost {
    pub creator: Id<UserMarker>,
    pub caption: String,
    pub location: Option<String>,
    pub tags: TagSet,
    pub image: PostImage,
}

/// Replaces the editable fields of a post. `image: None` keeps the current image.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct PostPatch {
    pub caption: String,
    pub location: Option<String>,
    pub tags: TagSet,
    pub image: Option<PostImage>,
}
