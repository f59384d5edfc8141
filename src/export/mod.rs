/// Export of the composed grid
///
/// - `mod.rs` - waiting for displayed images to finish loading
/// - `raster.rs` - drawing the grid into a PNG
/// - `download.rs` - handing the PNG to the user
///
/// An export first counts the images shown in the grid. Images already
/// complete are counted right away; each image still loading is tracked
/// until its load event arrives. Once everything has loaded the grid is
/// rasterized exactly once. There is no timeout: an image that never
/// finishes loading keeps the export waiting.

pub mod download;
pub mod raster;

use std::collections::HashMap;
use std::path::PathBuf;

use thiserror::Error;

use crate::state::data::ImageRef;
use crate::state::grid::GridAssignment;
use crate::state::images::ImageStore;

pub use download::{ArtifactSink, DownloadsFolder};
pub use raster::{PngRasterizer, Rasterizer, Scene};

/// Errors that can occur while producing or delivering the artifact
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExportError {
    /// Output canvas could not be created
    #[error("Invalid canvas: {0}")]
    Canvas(String),

    /// PNG encoding failed
    #[error("Failed to encode image: {0}")]
    Encode(String),

    /// Artifact could not be written
    #[error("Failed to save artifact: {0}")]
    Save(String),

    /// Background export task died
    #[error("Task join error: {0}")]
    Join(String),
}

/// Where an export stands after an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportProgress {
    /// Still waiting for `remaining` images
    Waiting { remaining: usize },
    /// All images loaded; rasterize now
    Ready,
    /// Already handed off to the rasterizer
    Finished,
}

/// Load-wait counter of one export request
#[derive(Debug, Clone)]
pub struct PendingExport {
    total: usize,
    completed: usize,
    /// Incomplete image elements per reference
    waiting: HashMap<ImageRef, usize>,
    fired: bool,
}

impl PendingExport {
    /// Start an export for what the grid currently shows
    pub fn begin(grid: &GridAssignment, images: &ImageStore) -> (Self, ExportProgress) {
        let mut export = Self {
            total: 0,
            completed: 0,
            waiting: HashMap::new(),
            fired: false,
        };

        for (_, reference) in grid.displayed() {
            export.total += 1;
            if images.is_complete(reference) {
                export.completed += 1;
            } else {
                *export.waiting.entry(reference.clone()).or_insert(0) += 1;
            }
        }

        let progress = export.advance();
        (export, progress)
    }

    /// A load event fired for `reference`
    pub fn image_loaded(&mut self, reference: &ImageRef) -> ExportProgress {
        if let Some(elements) = self.waiting.remove(reference) {
            self.completed += elements;
        }
        self.advance()
    }

    /// A load of `reference` failed; it never counts as loaded
    pub fn image_failed(&self, reference: &ImageRef) -> ExportProgress {
        if self.waiting.contains_key(reference) {
            log::warn!(
                "⚠️  {} failed to load; export stays pending ({} of {} images loaded)",
                reference,
                self.completed,
                self.total
            );
        }
        self.progress()
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn remaining(&self) -> usize {
        self.total - self.completed
    }

    fn progress(&self) -> ExportProgress {
        if self.fired {
            ExportProgress::Finished
        } else {
            ExportProgress::Waiting {
                remaining: self.remaining(),
            }
        }
    }

    /// Moves to `Ready` once, the first time every image is complete
    fn advance(&mut self) -> ExportProgress {
        if self.fired {
            return ExportProgress::Finished;
        }
        if self.completed == self.total {
            self.fired = true;
            return ExportProgress::Ready;
        }
        self.progress()
    }
}

/// Rasterize `scene` and deliver the result under `filename`
///
/// The sink is not touched when rasterization fails.
pub fn export_scene<R, S>(
    scene: &Scene,
    rasterizer: &R,
    sink: &S,
    filename: &str,
) -> Result<PathBuf, ExportError>
where
    R: Rasterizer + ?Sized,
    S: ArtifactSink + ?Sized,
{
    let bytes = rasterizer.rasterize(scene)?;
    sink.deliver(filename, &bytes)
}

/// Run `export_scene` on the blocking pool with the default rasterizer and sink
pub async fn export_async(
    scene: Scene,
    rasterizer: PngRasterizer,
    sink: DownloadsFolder,
    filename: String,
) -> Result<PathBuf, ExportError> {
    tokio::task::spawn_blocking(move || export_scene(&scene, &rasterizer, &sink, &filename))
        .await
        .map_err(|e| ExportError::Join(e.to_string()))?
}
