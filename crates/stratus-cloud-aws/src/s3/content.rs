//! Upload body sources

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use stratus_cloud::{CloudError, Result};

/// Where the bytes of an object come from
///
/// Serialized as exactly one of the `source`, `content` or `content_base64`
/// fields; deserializing zero or several of them fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ContentFields", into = "ContentFields")]
pub enum ContentSource {
    /// Local file, `~` expands to the home directory
    File(PathBuf),

    /// UTF-8 string uploaded as is
    Inline(String),

    /// Standard base64, decoded before upload
    InlineBase64(String),
}

/// Wire form of [`ContentSource`]
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ContentFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content_base64: Option<String>,
}

impl TryFrom<ContentFields> for ContentSource {
    type Error = CloudError;

    fn try_from(fields: ContentFields) -> Result<Self> {
        ContentSource::from_fields(fields.source, fields.content, fields.content_base64)
    }
}

impl From<ContentSource> for ContentFields {
    fn from(source: ContentSource) -> Self {
        match source {
            ContentSource::File(path) => ContentFields {
                source: Some(path),
                ..Default::default()
            },
            ContentSource::Inline(content) => ContentFields {
                content: Some(content),
                ..Default::default()
            },
            ContentSource::InlineBase64(encoded) => ContentFields {
                content_base64: Some(encoded),
                ..Default::default()
            },
        }
    }
}

impl ContentSource {
    /// Build from the three mutually exclusive loose fields
    ///
    /// Exactly one must be set.
    pub fn from_fields(
        source: Option<PathBuf>,
        content: Option<String>,
        content_base64: Option<String>,
    ) -> Result<Self> {
        match (source, content, content_base64) {
            (Some(path), None, None) => Ok(ContentSource::File(path)),
            (None, Some(content), None) => Ok(ContentSource::Inline(content)),
            (None, None, Some(encoded)) => Ok(ContentSource::InlineBase64(encoded)),
            (None, None, None) => Err(CloudError::validation(
                "must specify \"source\", \"content\", or \"content_base64\"",
            )),
            _ => Err(CloudError::validation(
                "only one of \"source\", \"content\", or \"content_base64\" may be set",
            )),
        }
    }

    /// Produce the upload body
    pub async fn resolve(&self) -> Result<Bytes> {
        match self {
            ContentSource::File(source) => {
                let path = expand_home(source)?;
                let data = tokio::fs::read(&path)
                    .await
                    .map_err(|source| CloudError::Io { path, source })?;
                Ok(Bytes::from(data))
            }
            ContentSource::Inline(content) => Ok(Bytes::copy_from_slice(content.as_bytes())),
            ContentSource::InlineBase64(encoded) => STANDARD
                .decode(encoded)
                .map(Bytes::from)
                .map_err(|e| CloudError::Validation(format!("error decoding content_base64: {}", e))),
        }
    }
}

/// Expand a leading `~` to the current user's home directory
pub fn expand_home(path: &Path) -> Result<PathBuf> {
    let Some(raw) = path.to_str() else {
        return Ok(path.to_path_buf());
    };

    if raw != "~" && !raw.starts_with("~/") {
        if raw.starts_with('~') {
            return Err(CloudError::Validation(format!(
                "cannot expand user-specific home dir in source ({})",
                raw
            )));
        }
        return Ok(path.to_path_buf());
    }

    let home = dirs::home_dir().ok_or_else(|| {
        CloudError::Validation(format!("cannot expand home dir in source ({}): home directory not found", raw))
    })?;

    match raw.strip_prefix("~/") {
        Some(rest) => Ok(home.join(rest)),
        None => Ok(home),
    }
}
