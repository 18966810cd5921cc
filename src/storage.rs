//! Blob storage for uploaded images and downloadable assets.
//!
//! Files live under a local directory and are served back by the router at
//! [`PUBLIC_MOUNT`]. Stored names are random so uploads never overwrite each other.

use std::{
    io,
    path::{Component, Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tokio::fs;
use utoipa::ToSchema;
use uuid::Uuid;

pub const PUBLIC_MOUNT: &str = "/uploads";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Folder {
    #[default]
    Images,
    Downloads,
}

impl Folder {
    pub fn as_str(self) -> &'static str {
        match self {
            Folder::Images => "images",
            Folder::Downloads => "downloads",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "images" => Some(Folder::Images),
            "downloads" => Some(Folder::Downloads),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct StoredFile {
    /// Publicly retrievable URL.
    pub url: String,
    /// Path relative to the storage root, e.g. `images/<uuid>.png`.
    pub path: String,
    pub size: u64,
}

#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
    public_prefix: String,
}

impl Storage {
    pub fn new(root: impl Into<PathBuf>, public_base_url: &str) -> Self {
        Self {
            root: root.into(),
            public_prefix: format!("{}{PUBLIC_MOUNT}/", public_base_url.trim_end_matches('/')),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn put(
        &self,
        folder: Folder,
        original_name: Option<&str>,
        bytes: &[u8],
    ) -> io::Result<StoredFile> {
        let dir = self.root.join(folder.as_str());
        fs::create_dir_all(&dir).await?;

        let file_name = match original_name.and_then(sanitized_extension) {
            Some(ext) => format!("{}.{ext}", Uuid::new_v4()),
            None => Uuid::new_v4().to_string(),
        };
        fs::write(dir.join(&file_name), bytes).await?;

        let path = format!("{}/{file_name}", folder.as_str());
        tracing::debug!(path = %path, size = bytes.len(), "stored upload");
        Ok(StoredFile {
            url: format!("{}{path}", self.public_prefix),
            size: bytes.len() as u64,
            path,
        })
    }

    /// Local path behind a URL this storage issued. `None` for foreign URLs or
    /// anything that would escape the root.
    pub fn path_for_url(&self, url: &str) -> Option<PathBuf> {
        let relative = Path::new(url.strip_prefix(&self.public_prefix)?);
        if relative.as_os_str().is_empty()
            || !relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)))
        {
            return None;
        }
        Some(self.root.join(relative))
    }

    /// Returns `false` when the URL is foreign or the file is already gone.
    pub async fn delete_url(&self, url: &str) -> io::Result<bool> {
        let Some(path) = self.path_for_url(url) else {
            return Ok(false);
        };
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Deletes every issued URL in `urls`, logging rather than failing.
    pub async fn discard<'u>(&self, urls: impl IntoIterator<Item = &'u str>) {
        for url in urls {
            if let Err(err) = self.delete_url(url).await {
                tracing::warn!(url = %url, error = %err, "failed to delete stored file");
            }
        }
    }
}

fn sanitized_extension(name: &str) -> Option<String> {
    let (_, ext) = name.rsplit_once('.')?;
    if ext.is_empty() || ext.len() > 10 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
