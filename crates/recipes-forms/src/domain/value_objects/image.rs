//! Image staging value objects
//!
//! A recipe image is selected locally, checked against an [`ImagePolicy`] and
//! held on the draft until submit uploads it.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;
pub const ALLOWED_IMAGE_TYPES: [&str; 3] = ["image/gif", "image/jpeg", "image/png"];

/// A file selected by the user but not yet uploaded
#[derive(Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl ImageFile {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Content type inferred from the file extension
    pub fn guess_content_type(file_name: &str) -> Option<&'static str> {
        let ext = file_name.rsplit('.').next()?.to_ascii_lowercase();
        match ext.as_str() {
            "gif" => Some("image/gif"),
            "jpg" | "jpeg" => Some("image/jpeg"),
            "png" => Some("image/png"),
            "webp" => Some("image/webp"),
            "bmp" => Some("image/bmp"),
            _ => None,
        }
    }
}

impl fmt::Debug for ImageFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size", &self.size())
            .finish()
    }
}

/// Size and type limits for recipe images
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePolicy {
    pub max_bytes: u64,
    pub allowed_types: Vec<String>,
}

impl ImagePolicy {
    pub fn check(&self, file: &ImageFile) -> Result<(), ImageRejection> {
        if file.size() > self.max_bytes {
            return Err(ImageRejection::TooLarge {
                size: file.size(),
                max: self.max_bytes,
            });
        }

        if !self.allowed_types.iter().any(|t| t.eq_ignore_ascii_case(&file.content_type)) {
            return Err(ImageRejection::UnsupportedType {
                content_type: file.content_type.clone(),
                allowed: self.allowed_types.clone(),
            });
        }

        Ok(())
    }
}

impl Default for ImagePolicy {
    fn default() -> Self {
        Self {
            max_bytes: MAX_IMAGE_BYTES,
            allowed_types: ALLOWED_IMAGE_TYPES.iter().map(|t| t.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRejection {
    TooLarge { size: u64, max: u64 },
    UnsupportedType { content_type: String, allowed: Vec<String> },
}

impl std::error::Error for ImageRejection {}

impl fmt::Display for ImageRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooLarge { max, .. } => {
                write!(f, "Image size must not exceed {}MB", max / (1024 * 1024))
            }
            Self::UnsupportedType { allowed, .. } => {
                let names: Vec<&str> = allowed
                    .iter()
                    .map(|t| t.strip_prefix("image/").unwrap_or(t))
                    .collect();
                match names.split_last() {
                    Some((last, rest)) if !rest.is_empty() => {
                        write!(f, "Only {} and {} images are allowed", rest.join(", "), last)
                    }
                    Some((last, _)) => write!(f, "Only {} images are allowed", last),
                    None => write!(f, "Images are not accepted"),
                }
            }
        }
    }
}

/// Local preview handed to the renderer before upload
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImagePreview {
    pub file_name: String,
    pub data_url: String,
}

impl ImagePreview {
    pub fn from_file(file: &ImageFile) -> Self {
        Self {
            file_name: file.file_name.clone(),
            data_url: format!("data:{};base64,{}", file.content_type, STANDARD.encode(&file.data)),
        }
    }
}
