use std::fmt;
use std::sync::Arc;
use derive_more::*;
use glam::UVec2;
use image::RgbaImage;
use crate::AssetPath;

/// Identifies a decoded image within an [`ImageResolver`](crate::ImageResolver).
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash, Ord, PartialOrd, Display)]
#[display(fmt="image:{_0}")]
pub struct ImageId(pub(crate) u32);

/// Pixels of an image, decoded once and shared by every tile that references it.
pub struct DecodedImage {
    pub path: AssetPath,
    pub pixels: RgbaImage,
}

impl DecodedImage {
    pub fn size(&self) -> UVec2 {
        UVec2::new(self.pixels.width(), self.pixels.height())
    }
}

/**
 * Shareable reference to a [`DecodedImage`].
 * Handles compare equal when they came from the same canonical path.
 */
#[derive(Clone)]
pub struct ImageHandle {
    pub(crate) id: ImageId,
    pub(crate) image: Arc<DecodedImage>,
}

impl ImageHandle {

    pub fn id(&self) -> ImageId { self.id }

    pub fn path(&self) -> &AssetPath {
        &self.image.path
    }

    pub fn size(&self) -> UVec2 {
        self.image.size()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.image.pixels
    }

    /// True if both handles share the same decoded pixel data.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.image, &other.image)
    }
}

impl PartialEq for ImageHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ImageHandle {}

impl fmt::Debug for ImageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageHandle")
            .field("id", &self.id)
            .field("path", &self.image.path)
            .field("size", &self.size())
            .finish()
    }
}
