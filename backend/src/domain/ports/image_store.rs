//! Port for storing uploaded post images.

use async_trait::async_trait;

use crate::domain::ImageRef;
use crate::domain::forms::ValidImage;

use super::define_port_error;

define_port_error! {
    /// Errors raised by image store adapters.
    pub enum ImageStoreError {
        /// The backing storage could not be written.
        Io { message: String } => "image store write failed: {message}",
    }
}

/// Port for persisting image bytes and returning a reference to them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist the image and return its path relative to the media root.
    async fn store(&self, image: &ValidImage) -> Result<ImageRef, ImageStoreError>;
}

/// Image store that accepts every image without keeping it.
///
/// Returned references follow the layout of real stores so rendering code
/// behaves the same.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureImageStore;

#[async_trait]
impl ImageStore for FixtureImageStore {
    async fn store(&self, image: &ValidImage) -> Result<ImageRef, ImageStoreError> {
        let name = format!("posts/fixture.{}", image.format.extension());
        ImageRef::new(name).map_err(|err| ImageStoreError::io(err.to_string()))
    }
}
