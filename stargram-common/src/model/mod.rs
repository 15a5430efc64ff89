pub mod auth;
pub mod file;
pub mod post;
pub mod user;

use crate::{
    model::{
        auth::{InvalidEmailError, InvalidPasswordError, InvalidSessionSecretError},
        user::{InvalidDisplayNameError, InvalidUserHandleError},
    },
    tags::InvalidTagError,
};
use derive_where::derive_where;
use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Formatter},
    marker::PhantomData,
};
use thiserror::Error;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use url::Url;

#[derive(Clone, Eq, PartialEq, Debug, Hash, Error)]
pub enum ModelValidationError {
    #[error(transparent)]
    UserHandle(#[from] InvalidUserHandleError),
    #[error(transparent)]
    DisplayName(#[from] InvalidDisplayNameError),
    #[error(transparent)]
    Email(#[from] InvalidEmailError),
    #[error(transparent)]
    Password(#[from] InvalidPasswordError),
    #[error(transparent)]
    SessionSecret(#[from] InvalidSessionSecretError),
    #[error(transparent)]
    Tag(#[from] InvalidTagError),
    #[error(transparent)]
    Url(#[from] InvalidUrlError),
    #[error(transparent)]
    Timestamp(#[from] InvalidTimestampError),
    #[error("The post has no creator")]
    MissingCreator,
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The url is invalid: {0}")]
pub struct InvalidUrlError(String);

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The timestamp is not RFC 3339: {0}")]
pub struct InvalidTimestampError(String);

pub fn parse_url(url: &str) -> Result<Url, InvalidUrlError> {
    Url::parse(url).map_err(|_| InvalidUrlError(url.to_owned()))
}

pub fn parse_timestamp(timestamp: &str) -> Result<OffsetDateTime, InvalidTimestampError> {
    OffsetDateTime::parse(timestamp, &Rfc3339).map_err(|_| InvalidTimestampError(timestamp.to_owned()))
}

/// Opaque identifier of a stored object, typed by what it identifies.
#[derive_where(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id<Marker>(String, #[serde(skip)] PhantomData<Marker>);

impl<Marker> Id<Marker> {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into(), PhantomData)
    }

    #[must_use]
    pub fn get(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl<Marker> Display for Id<Marker> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl<Marker> From<String> for Id<Marker> {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl<Marker> From<&str> for Id<Marker> {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl<Marker> From<Id<Marker>> for String {
    fn from(value: Id<Marker>) -> Self {
        value.0
    }
}
