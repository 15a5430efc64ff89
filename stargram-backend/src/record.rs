use serde::{Deserialize, Serialize};
use stargram_common::{
    model::{
        ModelValidationError,
        auth::{Account, EmailAddress, Session},
        file::StoredFile,
        parse_timestamp, parse_url,
        post::{NewPost, Post, PostImage, PostPatch},
        user::{DisplayName, NewUser, User, UserHandle},
    },
    tags::{Tag, TagSet},
};

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
#[serde(untagged)]
pub(crate) enum CreatorRecord {
    Id(String),
    /// Relationship attributes come back expanded into the related document.
    Document {
        #[serde(rename = "$id")]
        id: String,
    },
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PostRecord {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "$createdAt")]
    pub created_at: String,
    pub caption: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub image_url: String,
    pub image_id: String,
    #[serde(default)]
    pub creator: Option<CreatorRecord>,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserRecord {
    #[serde(rename = "$id")]
    pub id: String,
    pub account_id: String,
    pub name: String,
    pub username: String,
    pub email: String,
    pub image_url: String,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
pub(crate) struct AccountRecord {
    #[serde(rename = "$id")]
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SessionRecord {
    #[serde(rename = "$id")]
    pub id: String,
    pub user_id: String,
    pub secret: String,
    pub expire: String,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FileRecord {
    #[serde(rename = "$id")]
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub size_original: u64,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ImageFields<'a> {
    pub image_url: &'a str,
    pub image_id: &'a str,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PostFields<'a> {
    pub creator: &'a str,
    pub caption: &'a str,
    pub location: Option<&'a str>,
    pub tags: Vec<&'a str>,
    #[serde(flatten)]
    pub image: ImageFields<'a>,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PostPatchFields<'a> {
    pub caption: &'a str,
    pub location: Option<&'a str>,
    pub tags: Vec<&'a str>,
    #[serde(flatten)]
    pub image: Option<ImageFields<'a>>,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserFields<'a> {
    pub account_id: &'a str,
    pub name: &'a str,
    pub username: &'a str,
    pub email: &'a str,
    pub image_url: &'a str,
}

fn tag_strs(tags: &TagSet) -> Vec<&str> {
    tags.iter().map(Tag::get).collect()
}

fn non_empty(location: Option<&str>) -> Option<&str> {
    location.filter(|location| !location.is_empty())
}

impl<'a> From<&'a PostImage> for ImageFields<'a> {
    fn from(value: &'a PostImage) -> Self {
        Self {
            image_url: value.url.as_str(),
            image_id: value.id.get(),
        }
    }
}

impl<'a> From<&'a NewPost> for PostFields<'a> {
    fn from(value: &'a NewPost) -> Self {
        Self {
            creator: value.creator.get(),
            caption: &value.caption,
            location: non_empty(value.location.as_deref()),
            tags: tag_strs(&value.tags),
            image: (&value.image).into(),
        }
    }
}

impl<'a> From<&'a PostPatch> for PostPatchFields<'a> {
    fn from(value: &'a PostPatch) -> Self {
        Self {
            caption: &value.caption,
            location: non_empty(value.location.as_deref()),
            tags: tag_strs(&value.tags),
            image: value.image.as_ref().map(ImageFields::from),
        }
    }
}

impl<'a> From<&'a NewUser> for UserFields<'a> {
    fn from(value: &'a NewUser) -> Self {
        Self {
            account_id: value.account_id.get(),
            name: value.name.get(),
            username: value.username.get(),
            email: value.email.get(),
            image_url: value.image_url.as_str(),
        }
    }
}

impl TryFrom<PostRecord> for Post {
    type Error = ModelValidationError;

    fn try_from(value: PostRecord) -> Result<Self, Self::Error> {
        let creator = match value.creator.ok_or(ModelValidationError::MissingCreator)? {
            CreatorRecord::Id(id) | CreatorRecord::Document { id } => id,
        };

        Ok(Self {
            id: value.id.into(),
            creator: creator.into(),
            caption: value.caption,
            location: value.location.filter(|location| !location.is_empty()),
            tags: value
                .tags
                .into_iter()
                .map(Tag::new)
                .collect::<Result<_, _>>()?,
            image: PostImage {
                id: value.image_id.into(),
                url: parse_url(&value.image_url)?,
            },
            created_at: parse_timestamp(&value.created_at)?,
        })
    }
}

impl TryFrom<UserRecord> for User {
    type Error = ModelValidationError;

    fn try_from(value: UserRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id.into(),
            account_id: value.account_id.into(),
            name: DisplayName::new(value.name)?,
            username: UserHandle::new(value.username)?,
            email: EmailAddress::new(value.email)?,
            image_url: parse_url(&value.image_url)?,
        })
    }
}

impl From<AccountRecord> for Account {
    fn from(value: AccountRecord) -> Self {
        Self {
            id: value.id.into(),
            name: value.name,
            email: value.email,
        }
    }
}

impl TryFrom<SessionRecord> for Session {
    type Error = ModelValidationError;

    fn try_from(value: SessionRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id.into(),
            account_id: value.user_id.into(),
            secret: value.secret.parse()?,
            expires_at: parse_timestamp(&value.expire)?,
        })
    }
}

impl From<FileRecord> for StoredFile {
    fn from(value: FileRecord) -> Self {
        Self {
            id: value.id.into(),
            name: value.name,
            mime_type: value.mime_type,
            size: value.size_original,
        }
    }
}
