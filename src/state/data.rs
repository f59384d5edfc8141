/// Shared data structures for the application state
///
/// These types flow between the drag/drop layer, the grid
/// and the image loader.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use url::Url;

/// Number of drop frames in the grid (3 columns x 2 rows)
pub const FRAME_COUNT: usize = 6;

/// Opaque reference to an image (URL or filesystem path)
///
/// Cheap to clone; the string is shared.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageRef(Arc<str>);

impl ImageRef {
    pub fn new(reference: impl AsRef<str>) -> Self {
        Self(Arc::from(reference.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for references the HTTP loader must fetch
    pub fn is_remote(&self) -> bool {
        let lower = self.0.to_ascii_lowercase();
        lower.starts_with("http://") || lower.starts_with("https://")
    }

    /// Local filesystem path for `file://` URLs and plain paths
    ///
    /// `file://` URLs are percent-decoded; a malformed one gives `None`.
    pub fn local_path(&self) -> Option<PathBuf> {
        if self.is_remote() {
            return None;
        }
        if self.0.get(..7).is_some_and(|scheme| scheme.eq_ignore_ascii_case("file://")) {
            return Url::parse(&self.0).ok()?.to_file_path().ok();
        }
        Some(PathBuf::from(&*self.0))
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ImageRef {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Identity of a drop frame
///
/// Only values in `0..FRAME_COUNT` can exist, so a frame index
/// never points outside the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameIndex(usize);

impl FrameIndex {
    pub fn new(index: usize) -> Option<Self> {
        (index < FRAME_COUNT).then_some(Self(index))
    }

    /// All frames in grid order
    pub fn all() -> impl Iterator<Item = FrameIndex> {
        (0..FRAME_COUNT).map(FrameIndex)
    }

    pub fn get(self) -> usize {
        self.0
    }

    pub fn column(self) -> usize {
        self.0 % crate::layout::COLUMNS
    }

    pub fn row(self) -> usize {
        self.0 / crate::layout::COLUMNS
    }
}

/// Capability tag a drop target matches against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Image,
}

/// Data carried by a drag gesture, consumed once on drop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragPayload {
    Image(ImageRef),
}

impl DragPayload {
    pub fn kind(&self) -> PayloadKind {
        match self {
            DragPayload::Image(_) => PayloadKind::Image,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_index_bounds() {
        assert!(FrameIndex::new(0).is_some());
        assert!(FrameIndex::new(5).is_some());
        assert!(FrameIndex::new(6).is_none());
        assert_eq!(FrameIndex::all().count(), FRAME_COUNT);
    }

    #[test]
    fn test_frame_index_row_column() {
        let frame = FrameIndex::new(4).unwrap();
        assert_eq!(frame.column(), 1);
        assert_eq!(frame.row(), 1);
    }

    #[test]
    fn test_reference_classification() {
        assert!(ImageRef::new("https://via.placeholder.com/150").is_remote());
        assert!(ImageRef::new("HTTP://example.com/a.png").is_remote());

        assert_eq!(ImageRef::new("https://example.com/a.png").local_path(), None);

        let plain = ImageRef::new("photos/b.jpg");
        assert!(!plain.is_remote());
        assert_eq!(plain.local_path(), Some(PathBuf::from("photos/b.jpg")));
    }

    #[cfg(unix)]
    #[test]
    fn test_file_url_is_percent_decoded() {
        let file_url = ImageRef::new("file:///tmp/a.png");
        assert_eq!(file_url.local_path(), Some(PathBuf::from("/tmp/a.png")));

        let spaced = ImageRef::new("file:///tmp/My%20Photo.png");
        assert_eq!(spaced.local_path(), Some(PathBuf::from("/tmp/My Photo.png")));
    }

    #[test]
    fn test_payload_kind() {
        let payload = DragPayload::Image(ImageRef::new("a.png"));
        assert_eq!(payload.kind(), PayloadKind::Image);
    }
}
