use crate::model::Id;
use serde::Serialize;
use std::fmt::{Debug, Formatter};

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct FileMarker;

/// A file as submitted by the user, not yet stored anywhere.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct UploadFile {
    pub name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Debug for UploadFile {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadFile")
            .field("name", &self.name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize)]
pub struct StoredFile {
    pub id: Id<FileMarker>,
    pub name: String,
    pub mime_type: String,
    pub size: u64,
}

/// Crop anchor used when a preview has to be cut to the requested size.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub enum Gravity {
    #[default]
    Center,
    TopLeft,
    Top,
    TopRight,
    Left,
    Right,
    BottomLeft,
    Bottom,
    BottomRight,
}

impl Gravity {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Gravity::Center => "center",
            Gravity::TopLeft => "top-left",
            Gravity::Top => "top",
            Gravity::TopRight => "top-right",
            Gravity::Left => "left",
            Gravity::Right => "right",
            Gravity::BottomLeft => "bottom-left",
            Gravity::Bottom => "bottom",
            Gravity::BottomRight => "bottom-right",
        }
    }
}

/// Parameters a stored image is rendered with when resolving its display url.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
pub struct RenderOptions {
    pub width: u32,
    pub height: u32,
    pub gravity: Gravity,
    /// 0 to 100.
    pub quality: u8,
}

impl RenderOptions {
    /// What post images are displayed with.
    pub const STANDARD: RenderOptions = RenderOptions {
        width: 2000,
        height: 2000,
        gravity: Gravity::Top,
        quality: 100,
    };
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::STANDARD
    }
}
