/// Dirty-region tracker.
///
/// Holds the bounding box of every cell rectangle touched since the last
/// present, clamped to the viewport. Two states:
///
/// ```text
///   Clean          ──mark_dirty / mark_full_frame──▶  Pending(region)
///   Pending(r)     ──mark_dirty(s)──▶ Pending(r ∪ s)
///   Pending(r)     ──take_pending──▶  Clean, returns r
/// ```
///
/// A pending region only grows until it is taken.

use crate::domain::geometry::{ScreenRect, Viewport};

pub struct DirtyRegion {
    viewport: Viewport,
    pending: Option<ScreenRect>,
}

impl DirtyRegion {
    pub fn new(viewport: Viewport) -> Self {
        DirtyRegion { viewport, pending: None }
    }

    /// Grow the pending region to cover `(x, y, width, height)`.
    /// Rectangles entirely off-screen or with no extent are ignored.
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn mark_dirty(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.mark_rect(ScreenRect::new(x, y, width, height));
    }

    pub fn mark_rect(&mut self, rect: ScreenRect) {
        let Some(clamped) = rect.intersect(&self.viewport.full()) else { return };
        self.pending = Some(match self.pending {
            Some(r) => r.union(&clamped),
            None => clamped,
        });
    }

    /// Every cell's world mapping changed (camera move, level switch, reset).
    pub fn mark_full_frame(&mut self) {
        self.pending = Some(self.viewport.full());
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn peek(&self) -> Option<ScreenRect> {
        self.pending
    }

    pub fn take_pending(&mut self) -> Option<ScreenRect> {
        self.pending.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> DirtyRegion {
        DirtyRegion::new(Viewport::new(150, 40))
    }

    #[test]
    fn starts_clean() {
        let mut d = tracker();
        assert!(!d.is_pending());
        assert_eq!(d.take_pending(), None);
    }

    #[test]
    fn marks_union_into_bounding_box() {
        let mut d = tracker();
        d.mark_dirty(5, 0, 2, 1);
        d.mark_dirty(10, 3, 3, 3);
        assert_eq!(d.take_pending(), Some(ScreenRect::new(5, 0, 8, 6)));
        assert!(!d.is_pending());
    }

    #[test]
    fn clamps_to_viewport() {
        let mut d = tracker();
        d.mark_dirty(-2, 38, 4, 5);
        assert_eq!(d.peek(), Some(ScreenRect::new(0, 38, 2, 2)));
    }

    #[test]
    fn off_screen_and_empty_marks_are_ignored() {
        let mut d = tracker();
        d.mark_dirty(200, 0, 3, 3);
        d.mark_dirty(0, 0, 0, 5);
        d.mark_dirty(-10, -10, 5, 5);
        assert!(!d.is_pending());
    }

    #[test]
    fn never_shrinks_until_taken() {
        let mut d = tracker();
        d.mark_full_frame();
        d.mark_dirty(3, 3, 1, 1);
        assert_eq!(d.peek(), Some(ScreenRect::new(0, 0, 150, 40)));
    }
}
