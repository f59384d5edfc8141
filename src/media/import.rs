use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::state::data::ImageRef;

/// Supported image file extensions
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp", "tif", "tiff"];

/// Result of a folder import
#[derive(Debug, Clone)]
pub struct ImportResult {
    pub folder: PathBuf,
    pub references: Vec<ImageRef>,
}

/// Scan a folder in the background for source images
pub async fn import_folder_async(folder: PathBuf) -> ImportResult {
    let scan_root = folder.clone();
    let references = tokio::task::spawn_blocking(move || scan_folder(&scan_root))
        .await
        .unwrap_or_else(|e| {
            log::error!("Folder scan task failed: {}", e);
            Vec::new()
        });

    ImportResult { folder, references }
}

/// Walk `folder` recursively and collect image files, sorted by path
pub fn scan_folder(folder: &Path) -> Vec<ImageRef> {
    log::info!("🔍 Scanning folder: {}", folder.display());

    let mut references: Vec<ImageRef> = WalkDir::new(folder)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| is_image_file(entry.path()))
        .map(|entry| ImageRef::new(entry.path().to_string_lossy()))
        .collect();

    references.sort();
    log::info!("✅ Found {} images in {}", references.len(), folder.display());
    references
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// Append `incoming` to `existing`, skipping references already present
///
/// Returns how many were added.
pub fn merge_sources(existing: &mut Vec<ImageRef>, incoming: Vec<ImageRef>) -> usize {
    let before = existing.len();
    for reference in incoming {
        if !existing.contains(&reference) {
            existing.push(reference);
        }
    }
    existing.len() - before
}
