use serde::{Deserialize, Serialize};

/// Whether the viewport is currently moving under the user's hands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GestureState {
    #[default]
    Idle,
    Dragging,
    Zooming,
}

/// Why the viewport came to rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Settle {
    /// A genuine user pan ended; the host is told about the new center
    UserDrag,
    /// A zoom gesture or zoom animation completed
    Zoom,
}

/// Total state machine over [`GestureState`].
///
/// Map SDKs commonly fire a drag-end shaped event as a side effect of a zoom
/// animation. Drag events arriving while a zoom is in flight are absorbed, and
/// an end event without a matching start is ignored, so a zoom never settles
/// as [`Settle::UserDrag`].
#[derive(Debug, Clone, Default)]
pub struct GestureTracker {
    state: GestureState,
    last_settle: Option<Settle>,
    spurious_ends: u64,
}

impl GestureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    /// True only while idle.
    pub fn is_settled(&self) -> bool {
        self.state == GestureState::Idle
    }

    pub fn last_settle(&self) -> Option<Settle> {
        self.last_settle
    }

    /// End events that had no matching start and were ignored.
    pub fn spurious_ends(&self) -> u64 {
        self.spurious_ends
    }

    pub fn start_drag(&mut self) {
        if self.state == GestureState::Idle {
            self.state = GestureState::Dragging;
        }
    }

    pub fn start_zoom(&mut self) {
        // A zoom supersedes an in-flight drag (pinch while panning)
        self.state = GestureState::Zooming;
    }

    pub fn end_drag(&mut self) -> Option<Settle> {
        match self.state {
            GestureState::Dragging => self.settle(Settle::UserDrag),
            GestureState::Zooming | GestureState::Idle => self.ignore("drag"),
        }
    }

    pub fn end_zoom(&mut self) -> Option<Settle> {
        match self.state {
            GestureState::Zooming => self.settle(Settle::Zoom),
            GestureState::Dragging | GestureState::Idle => self.ignore("zoom"),
        }
    }

    fn settle(&mut self, cause: Settle) -> Option<Settle> {
        self.state = GestureState::Idle;
        self.last_settle = Some(cause);
        Some(cause)
    }

    fn ignore(&mut self, kind: &str) -> Option<Settle> {
        self.spurious_ends += 1;
        log::debug!("ignoring {} end while {:?}", kind, self.state);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drag_cycle() {
        let mut tracker = GestureTracker::new();
        assert!(tracker.is_settled());
        tracker.start_drag();
        assert_eq!(tracker.state(), GestureState::Dragging);
        assert!(!tracker.is_settled());
        assert_eq!(tracker.end_drag(), Some(Settle::UserDrag));
        assert!(tracker.is_settled());
    }

    #[test]
    fn test_zoom_cycle() {
        let mut tracker = GestureTracker::new();
        tracker.start_zoom();
        assert!(!tracker.is_settled());
        assert_eq!(tracker.end_zoom(), Some(Settle::Zoom));
        assert_eq!(tracker.last_settle(), Some(Settle::Zoom));
    }

    #[test]
    fn test_drag_end_after_zoom_is_not_a_user_drag() {
        let mut tracker = GestureTracker::new();
        tracker.start_zoom();
        // Zoom animation fires drag-shaped events
        tracker.start_drag();
        assert_eq!(tracker.end_drag(), None);
        assert_eq!(tracker.state(), GestureState::Zooming);
        assert_eq!(tracker.end_zoom(), Some(Settle::Zoom));
        // Trailing drag-end after the zoom completed
        assert_eq!(tracker.end_drag(), None);
        assert_eq!(tracker.spurious_ends(), 2);
        assert_eq!(tracker.last_settle(), Some(Settle::Zoom));
    }

    #[test]
    fn test_pinch_during_drag_settles_as_zoom() {
        let mut tracker = GestureTracker::new();
        tracker.start_drag();
        tracker.start_zoom();
        assert_eq!(tracker.end_drag(), None);
        assert_eq!(tracker.end_zoom(), Some(Settle::Zoom));
        assert!(tracker.is_settled());
    }

    #[test]
    fn test_unmatched_ends_are_noops() {
        let mut tracker = GestureTracker::new();
        assert_eq!(tracker.end_zoom(), None);
        assert_eq!(tracker.end_drag(), None);
        tracker.start_drag();
        assert_eq!(tracker.end_zoom(), None);
        assert_eq!(tracker.state(), GestureState::Dragging);
    }
}
