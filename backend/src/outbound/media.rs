//! Filesystem `ImageStore` rooted at the configured media directory.
//!
//! Files are content addressed: `posts/<sha256 hex>.<ext>`. Uploading the
//! same image twice yields the same reference and rewrites identical bytes.
//! All access goes through a `cap_std` directory handle, so writes cannot
//! escape the media root.

use std::io;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::domain::ImageRef;
use crate::domain::forms::ValidImage;
use crate::domain::ports::{ImageStore, ImageStoreError};

const POSTS_DIR: &str = "posts";

/// Image store writing beneath a media root directory.
#[derive(Clone)]
pub struct CapStdImageStore {
    root: Arc<Dir>,
}

impl CapStdImageStore {
    /// Open (creating if needed) the media root and its `posts/` directory.
    ///
    /// # Errors
    ///
    /// Returns the I/O error when the directories cannot be created or
    /// opened.
    pub fn open(media_root: &Path) -> io::Result<Self> {
        let parent = media_root
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let name = media_root
            .file_name()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "media root has no name"))?;
        let parent_dir = Dir::open_ambient_dir(parent, ambient_authority())?;
        parent_dir.create_dir_all(name)?;
        let root = parent_dir.open_dir(name)?;
        root.create_dir_all(POSTS_DIR)?;
        Ok(Self {
            root: Arc::new(root),
        })
    }
}

/// Relative path an image is stored under.
pub fn image_path(image: &ValidImage) -> String {
    let digest = Sha256::digest(&image.bytes);
    format!(
        "{POSTS_DIR}/{}.{}",
        hex::encode(digest),
        image.format.extension()
    )
}

#[async_trait]
impl ImageStore for CapStdImageStore {
    async fn store(&self, image: &ValidImage) -> Result<ImageRef, ImageStoreError> {
        let path = image_path(image);
        let root = Arc::clone(&self.root);
        let bytes = image.bytes.clone();
        let target = path.clone();
        tokio::task::spawn_blocking(move || root.write(&target, bytes))
            .await
            .map_err(|err| ImageStoreError::io(format!("image write task failed: {err}")))?
            .map_err(|err| ImageStoreError::io(err.to_string()))?;
        debug!(%path, size = image.bytes.len(), "stored image");
        ImageRef::new(path).map_err(|err| ImageStoreError::io(err.to_string()))
    }
}
