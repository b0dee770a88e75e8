//! # Local media store
//!
//! Avatars are decoded, downscaled and re-encoded as PNG, then written
//! content-addressed under a sharded tree: `ab/cd/abcd…ef.png`. The key hashes
//! the owner id with the image, so an identical re-upload by the same user
//! lands on the same file while two users never share one.

use std::io::{Cursor, ErrorKind};
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use domains::errors::{DomainError, Result};
use domains::models::UserId;
use domains::ports::MediaStorage;
use image::{DynamicImage, ImageFormat};
use mime::Mime;
use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::{debug, error};

/// Longest edge of a stored avatar, in pixels.
pub const AVATAR_EDGE: u32 = 256;

pub struct LocalMediaStore {
    /// Root directory for all uploads (e.g. "./data/uploads").
    root: PathBuf,
    /// Public URL prefix the root is served under (e.g. "/uploads").
    url_prefix: String,
}

impl LocalMediaStore {
    pub fn new(root: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        let url_prefix = url_prefix.into().trim_end_matches('/').to_owned();
        Self {
            root: root.into(),
            url_prefix,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// "ab/cd/<hash>.png"
    fn sharded(hash: &str) -> String {
        format!("{}/{}/{hash}.png", &hash[0..2], &hash[2..4])
    }

    /// Maps a public path back onto the upload tree, refusing anything that
    /// could escape it.
    fn resolve(&self, public_path: &str) -> Result<Option<PathBuf>> {
        let Some(relative) = public_path
            .strip_prefix(&self.url_prefix)
            .and_then(|rest| rest.strip_prefix('/'))
        else {
            return Ok(None);
        };
        let relative = Path::new(relative);
        if !relative.components().all(|c| matches!(c, Component::Normal(_))) {
            return Err(DomainError::validation("media path escapes the upload directory"));
        }
        Ok(Some(self.root.join(relative)))
    }
}

fn render_avatar(data: &[u8]) -> Result<Vec<u8>> {
    let decoded = image::load_from_memory(data)
        .map_err(|err| DomainError::validation(format!("profile picture could not be decoded: {err}")))?;
    let scaled = if decoded.width() > AVATAR_EDGE || decoded.height() > AVATAR_EDGE {
        decoded.thumbnail(AVATAR_EDGE, AVATAR_EDGE)
    } else {
        decoded
    };

    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(scaled.to_rgba8())
        .write_to(&mut out, ImageFormat::Png)
        .map_err(|err| DomainError::internal(format!("avatar encoding failed: {err}")))?;
    Ok(out.into_inner())
}

fn io_error(err: std::io::Error) -> DomainError {
    error!(error = %err, "media store I/O failure");
    DomainError::internal("media storage failure")
}

#[async_trait]
impl MediaStorage for LocalMediaStore {
    async fn store_avatar(&self, owner: UserId, data: Bytes, content_type: Mime) -> Result<String> {
        debug!(owner, %content_type, bytes = data.len(), "storing avatar");
        let png = tokio::task::spawn_blocking(move || render_avatar(&data))
            .await
            .map_err(|err| DomainError::internal(format!("avatar worker failed: {err}")))??;

        let hash = hex::encode(
            Sha256::new()
                .chain_update(owner.to_be_bytes())
                .chain_update(&png)
                .finalize(),
        );
        let relative = Self::sharded(&hash);
        let target = self.root.join(&relative);

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await.map_err(io_error)?;
        }
        if !fs::try_exists(&target).await.map_err(io_error)? {
            fs::write(&target, &png).await.map_err(io_error)?;
        }

        Ok(format!("{}/{relative}", self.url_prefix))
    }

    async fn remove(&self, public_path: &str) -> Result<()> {
        let Some(path) = self.resolve(public_path)? else {
            debug!(public_path, "not a local media path, nothing to remove");
            return Ok(());
        };
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_error(err)),
        }
    }
}
