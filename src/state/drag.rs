/// Drag gesture lifecycle
///
/// A gesture starts on a source image, follows the pointer across the
/// drop frames, and ends on pointer release wherever that happens.
/// Only a release over a frame that accepts the payload produces a drop.

use super::data::{DragPayload, FrameIndex, ImageRef, PayloadKind};

/// Payload kinds a drop frame accepts
pub const FRAME_ACCEPTS: &[PayloadKind] = &[PayloadKind::Image];

/// Background tint of a drop frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameTint {
    /// No drag in progress
    Idle,
    /// A matching drag is in progress elsewhere
    CanDrop,
    /// A matching payload is hovering this frame
    Active,
}

impl FrameTint {
    /// RGB of the tint
    pub fn rgb(self) -> [u8; 3] {
        match self {
            FrameTint::Idle => [0xff, 0xff, 0xff],
            FrameTint::CanDrop => [0xf9, 0xf9, 0xf9],
            FrameTint::Active => [0xf0, 0xf0, 0xf0],
        }
    }
}

/// A completed drop: which frame received which image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropEvent {
    pub frame: FrameIndex,
    pub reference: ImageRef,
}

#[derive(Debug, Clone)]
struct Gesture {
    source: usize,
    payload: DragPayload,
}

/// State of the current drag gesture, if any
#[derive(Debug, Clone, Default)]
pub struct DragState {
    gesture: Option<Gesture>,
    hovered: Option<FrameIndex>,
}

impl DragState {
    /// Start dragging `payload` from the source tray slot `source`
    pub fn begin(&mut self, source: usize, payload: DragPayload) {
        self.gesture = Some(Gesture { source, payload });
    }

    /// Pointer entered a frame
    pub fn enter(&mut self, frame: FrameIndex) {
        self.hovered = Some(frame);
    }

    /// Pointer left a frame
    pub fn leave(&mut self, frame: FrameIndex) {
        if self.hovered == Some(frame) {
            self.hovered = None;
        }
    }

    /// End the gesture; yields a drop only over an accepting frame
    pub fn release(&mut self) -> Option<DropEvent> {
        let gesture = self.gesture.take()?;
        let frame = self.hovered?;

        if !FRAME_ACCEPTS.contains(&gesture.payload.kind()) {
            return None;
        }

        match gesture.payload {
            DragPayload::Image(reference) => Some(DropEvent { frame, reference }),
        }
    }

    #[cfg(test)]
    pub fn is_active(&self) -> bool {
        self.gesture.is_some()
    }

    /// Whether the source tray slot `source` is the one being dragged
    pub fn is_dragging(&self, source: usize) -> bool {
        self.gesture.as_ref().is_some_and(|g| g.source == source)
    }

    fn can_drop(&self) -> bool {
        self.gesture
            .as_ref()
            .is_some_and(|g| FRAME_ACCEPTS.contains(&g.payload.kind()))
    }

    pub fn frame_tint(&self, frame: FrameIndex) -> FrameTint {
        if !self.can_drop() {
            FrameTint::Idle
        } else if self.hovered == Some(frame) {
            FrameTint::Active
        } else {
            FrameTint::CanDrop
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(i: usize) -> FrameIndex {
        FrameIndex::new(i).unwrap()
    }

    fn payload(src: &str) -> DragPayload {
        DragPayload::Image(ImageRef::new(src))
    }

    #[test]
    fn test_release_over_frame_drops() {
        let mut drag = DragState::default();
        drag.begin(0, payload("a.png"));
        drag.enter(frame(3));

        let dropped = drag.release();
        assert_eq!(
            dropped,
            Some(DropEvent { frame: frame(3), reference: ImageRef::new("a.png") })
        );
        assert!(!drag.is_active());
    }

    #[test]
    fn test_release_outside_frames_drops_nothing() {
        let mut drag = DragState::default();
        drag.begin(1, payload("a.png"));
        drag.enter(frame(0));
        drag.leave(frame(0));

        assert_eq!(drag.release(), None);
        assert!(!drag.is_active());
    }

    #[test]
    fn test_release_without_gesture_is_ignored() {
        let mut drag = DragState::default();
        drag.enter(frame(2));
        assert_eq!(drag.release(), None);
    }

    #[test]
    fn test_leave_of_other_frame_keeps_hover() {
        let mut drag = DragState::default();
        drag.begin(0, payload("a.png"));
        drag.enter(frame(0));
        drag.enter(frame(1));
        drag.leave(frame(0));

        assert_eq!(drag.release().map(|d| d.frame), Some(frame(1)));
    }

    #[test]
    fn test_frame_tints_follow_gesture() {
        let mut drag = DragState::default();
        assert_eq!(drag.frame_tint(frame(0)), FrameTint::Idle);

        drag.begin(0, payload("a.png"));
        assert_eq!(drag.frame_tint(frame(0)), FrameTint::CanDrop);

        drag.enter(frame(0));
        assert_eq!(drag.frame_tint(frame(0)), FrameTint::Active);
        assert_eq!(drag.frame_tint(frame(1)), FrameTint::CanDrop);

        drag.release();
        assert_eq!(drag.frame_tint(frame(0)), FrameTint::Idle);
    }

    #[test]
    fn test_dragging_flag_tracks_source() {
        let mut drag = DragState::default();
        drag.begin(1, payload("b.png"));
        assert!(drag.is_dragging(1));
        assert!(!drag.is_dragging(0));

        drag.release();
        assert!(!drag.is_dragging(1));
    }
}
