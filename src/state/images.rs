use std::collections::HashMap;
use std::fmt;

use iced::widget::image::Handle;
use image::{ImageBuffer, Rgba, RgbaImage};

use super::data::ImageRef;
use super::grid::GridAssignment;
use crate::media::loader::LoadError;

/// How much of an image is decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fidelity {
    /// Bounded preview for the source tray
    Thumbnail,
    /// Full resolution, only for images placed in the grid
    Full,
}

/// A decoded image, ready for display and for export
///
/// The RGBA pixels live once, inside the display handle, and are
/// borrowed from there by the rasterizer.
#[derive(Clone)]
pub struct LoadedImage {
    handle: Handle,
    width: u32,
    height: u32,
}

impl LoadedImage {
    pub fn from_rgba(pixels: RgbaImage) -> Self {
        let (width, height) = pixels.dimensions();
        Self {
            handle: Handle::from_rgba(width, height, pixels.into_raw()),
            width,
            height,
        }
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    /// Borrowed view of the decoded pixels
    pub fn pixels(&self) -> Option<ImageBuffer<Rgba<u8>, &[u8]>> {
        match &self.handle {
            Handle::Rgba {
                width,
                height,
                pixels,
                ..
            } => ImageBuffer::from_raw(*width, *height, &pixels[..]),
            _ => None,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

impl fmt::Debug for LoadedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

/// Load status of one image reference
#[derive(Debug, Clone)]
pub enum ImageStatus {
    Pending,
    Loaded(LoadedImage),
    /// Broken reference; displayed as an empty frame
    Failed(String),
}

/// Tracks every image the app has asked to load, per fidelity
#[derive(Debug, Default)]
pub struct ImageStore {
    entries: HashMap<(ImageRef, Fidelity), ImageStatus>,
}

impl ImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a reference; returns true when a load has to be started
    pub fn request(&mut self, reference: &ImageRef, fidelity: Fidelity) -> bool {
        let key = (reference.clone(), fidelity);
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, ImageStatus::Pending);
        true
    }

    /// Record the outcome of a load
    pub fn finish(
        &mut self,
        reference: ImageRef,
        fidelity: Fidelity,
        result: Result<LoadedImage, LoadError>,
    ) {
        let status = match result {
            Ok(image) => ImageStatus::Loaded(image),
            Err(e) => ImageStatus::Failed(e.to_string()),
        };
        self.entries.insert((reference, fidelity), status);
    }

    pub fn status(&self, reference: &ImageRef, fidelity: Fidelity) -> Option<&ImageStatus> {
        self.entries.get(&(reference.clone(), fidelity))
    }

    /// Decoded image, if loading succeeded
    pub fn loaded(&self, reference: &ImageRef, fidelity: Fidelity) -> Option<&LoadedImage> {
        match self.status(reference, fidelity) {
            Some(ImageStatus::Loaded(image)) => Some(image),
            _ => None,
        }
    }

    /// Best image available for a grid frame: full pixels, else the thumbnail
    pub fn display(&self, reference: &ImageRef) -> Option<&LoadedImage> {
        self.loaded(reference, Fidelity::Full)
            .or_else(|| self.loaded(reference, Fidelity::Thumbnail))
    }

    /// Whether the full-resolution load has finished, successfully or not
    ///
    /// Unknown references count as incomplete.
    pub fn is_complete(&self, reference: &ImageRef) -> bool {
        matches!(
            self.status(reference, Fidelity::Full),
            Some(ImageStatus::Loaded(_) | ImageStatus::Failed(_))
        )
    }

    pub fn pending_count(&self) -> usize {
        self.entries
            .values()
            .filter(|s| matches!(s, ImageStatus::Pending))
            .count()
    }

    /// Drop finished full-resolution images the grid no longer shows
    ///
    /// Thumbnails and loads still in flight are kept.
    pub fn evict_unused(&mut self, grid: &GridAssignment) {
        let before = self.entries.len();
        self.entries.retain(|(reference, fidelity), status| {
            *fidelity == Fidelity::Thumbnail
                || matches!(status, ImageStatus::Pending)
                || grid.displayed().any(|(_, shown)| shown == reference)
        });

        let evicted = before - self.entries.len();
        if evicted > 0 {
            log::debug!("Evicted {} full-resolution images", evicted);
        }
    }
}
