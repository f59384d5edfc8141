use std::sync::Arc;

use super::data::{FrameIndex, ImageRef, FRAME_COUNT};

/// The ordered mapping from frame index to displayed image.
///
/// Updates never touch the existing slots: `assign` builds a new
/// sequence and leaves `self` as it was, so two assignments can be
/// compared by identity to detect a change.
#[derive(Debug, Clone)]
pub struct GridAssignment {
    slots: Arc<[Option<ImageRef>; FRAME_COUNT]>,
}

impl Default for GridAssignment {
    fn default() -> Self {
        Self::new()
    }
}

impl GridAssignment {
    /// Create an empty grid (every frame blank)
    pub fn new() -> Self {
        Self {
            slots: Arc::new(Default::default()),
        }
    }

    /// Return a new grid with `frame` set to `reference`
    ///
    /// Any previous value in that slot is dropped; other slots are shared unchanged.
    pub fn assign(&self, frame: FrameIndex, reference: ImageRef) -> Self {
        let mut slots = (*self.slots).clone();
        slots[frame.get()] = Some(reference);
        Self {
            slots: Arc::new(slots),
        }
    }

    pub fn get(&self, frame: FrameIndex) -> Option<&ImageRef> {
        self.slots[frame.get()].as_ref()
    }

    #[cfg(test)]
    pub fn slots(&self) -> &[Option<ImageRef>] {
        &self.slots[..]
    }

    /// Always `FRAME_COUNT`
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Filled frames in grid order
    pub fn displayed(&self) -> impl Iterator<Item = (FrameIndex, &ImageRef)> {
        FrameIndex::all().filter_map(move |frame| self.get(frame).map(|r| (frame, r)))
    }

    /// Identity comparison: true when both values are the same sequence
    #[cfg(test)]
    pub fn same_as(&self, other: &GridAssignment) -> bool {
        Arc::ptr_eq(&self.slots, &other.slots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(i: usize) -> FrameIndex {
        FrameIndex::new(i).unwrap()
    }

    #[test]
    fn test_new_grid_is_empty() {
        let grid = GridAssignment::new();
        assert_eq!(grid.len(), FRAME_COUNT);
        assert!(grid.slots().iter().all(Option::is_none));
        assert_eq!(grid.displayed().count(), 0);
    }

    #[test]
    fn test_assign_sets_only_target_slot() {
        for index in FrameIndex::all() {
            let before = GridAssignment::new()
                .assign(frame((index.get() + 1) % FRAME_COUNT), ImageRef::new("other.png"));
            let after = before.assign(index, ImageRef::new("photo.png"));

            assert_eq!(after.get(index), Some(&ImageRef::new("photo.png")));
            for other in FrameIndex::all().filter(|f| *f != index) {
                assert_eq!(after.get(other), before.get(other));
            }
        }
    }

    #[test]
    fn test_assign_overwrites_previous_reference() {
        let grid = GridAssignment::new()
            .assign(frame(2), ImageRef::new("first.png"))
            .assign(frame(2), ImageRef::new("second.png"));

        assert_eq!(grid.get(frame(2)), Some(&ImageRef::new("second.png")));
        assert!(!grid.slots().iter().flatten().any(|r| r.as_str() == "first.png"));
    }

    #[test]
    fn test_assign_leaves_original_untouched() {
        let original = GridAssignment::new();
        let updated = original.assign(frame(0), ImageRef::new("a.png"));

        assert!(original.get(frame(0)).is_none());
        assert!(!original.same_as(&updated));
        assert!(original.same_as(&original.clone()));
    }

    #[test]
    fn test_length_is_fixed_after_many_drops() {
        let mut grid = GridAssignment::new();
        for n in 0..50 {
            grid = grid.assign(frame(n % FRAME_COUNT), ImageRef::new(format!("{}.png", n)));
            assert_eq!(grid.len(), FRAME_COUNT);
        }
        assert_eq!(grid.displayed().count(), FRAME_COUNT);
    }
}
