//! Free-text tag input.
//!
//! Users type tags as one comma separated string; whitespace carries no
//! meaning, so `"sunset, beach"` and `"sunset,beach"` produce the same tags.

use serde::{
    Deserialize, Deserializer, Serialize,
    de::{Error, Unexpected},
};
use std::{collections::BTreeSet, fmt::Display};
use thiserror::Error;

pub const TAG_SEPARATOR: char = ',';

pub type TagSet = BTreeSet<Tag>;

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Serialize)]
#[serde(transparent)]
pub struct Tag(String);

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The tag is empty or contains whitespace or a separator: {0:?}")]
pub struct InvalidTagError(String);

impl Tag {
    pub fn new(tag: String) -> Result<Self, InvalidTagError> {
        if tag.is_empty() || tag.contains(|c: char| c.is_whitespace() || c == TAG_SEPARATOR) {
            Err(InvalidTagError(tag))
        } else {
            Ok(Self(tag))
        }
    }

    #[must_use]
    pub fn get(&self) -> &str {
        &self.0
    }
}

impl Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl<'de> Deserialize<'de> for Tag {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let inner = String::deserialize(deserializer)?;
        Tag::new(inner).map_err(|err| Error::invalid_value(Unexpected::Str(&err.0), &"Tag"))
    }
}

/// Never fails. Empty segments are dropped, so blank input yields no tags.
#[must_use]
pub fn parse_tags(raw: &str) -> TagSet {
    let stripped: String = raw.chars().filter(|c| !c.is_whitespace()).collect();

    stripped
        .split(TAG_SEPARATOR)
        .filter(|segment| !segment.is_empty())
        .map(|segment| Tag(segment.to_owned()))
        .collect()
}
