/// Geometry shared by collision and rendering.
///
/// ## Coordinate systems
///
/// World space is Y-up: `y = 0` is the bottom of a level and a rectangle's
/// `y` is its lower edge. Screen space is the grid: origin top-left, Y-down.
///
/// ```text
///   screen_x = world_x - camera.x
///   screen_y = viewport.height - world_y + camera.y - item_height
/// ```
///
/// `camera.y` is the world row shown on the bottom screen line. All
/// world-to-screen conversions go through [`world_to_screen`].

// ══════════════════════════════════════════════════════════════
// World rectangles (f64)
// ══════════════════════════════════════════════════════════════

/// Axis-aligned box in world units. Used for obstacles and the entity hitbox.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect { x, y, width, height }
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[inline]
    pub fn top(&self) -> f64 {
        self.y + self.height
    }

    /// Half-open overlap of the horizontal spans.
    #[inline]
    pub fn overlaps_x(&self, other: &Rect) -> bool {
        spans_overlap(self.x, self.right(), other.x, other.right())
    }

    /// Half-open overlap of the vertical spans.
    #[inline]
    pub fn overlaps_y(&self, other: &Rect) -> bool {
        spans_overlap(self.y, self.top(), other.y, other.top())
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.overlaps_x(other) && self.overlaps_y(other)
    }
}

/// `[a_min, a_max)` against `[b_min, b_max)`. Touching edges do not overlap.
#[inline]
pub fn spans_overlap(a_min: f64, a_max: f64, b_min: f64, b_max: f64) -> bool {
    a_min < b_max && a_max > b_min
}

// ══════════════════════════════════════════════════════════════
// Screen rectangles (cells)
// ══════════════════════════════════════════════════════════════

/// Rectangle of grid cells. `right()` / `bottom()` are exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScreenRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl ScreenRect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        ScreenRect { x, y, width, height }
    }

    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Bounding box of both rectangles.
    pub fn union(&self, other: &ScreenRect) -> ScreenRect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        ScreenRect::new(x, y, right - x, bottom - y)
    }

    /// Overlapping part, or `None` when the rectangles are disjoint.
    pub fn intersect(&self, other: &ScreenRect) -> Option<ScreenRect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        let r = ScreenRect::new(x, y, right - x, bottom - y);
        if r.is_empty() { None } else { Some(r) }
    }
}

// ══════════════════════════════════════════════════════════════
// Camera / viewport
// ══════════════════════════════════════════════════════════════

/// Scroll offset of a level: world column at the left screen edge and
/// world row at the bottom screen edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Camera {
    pub x: i32,
    pub y: i32,
}

/// Size of the character grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub width: i32,
    pub height: i32,
}

impl Viewport {
    pub const fn new(width: i32, height: i32) -> Self {
        Viewport { width, height }
    }

    pub fn full(&self) -> ScreenRect {
        ScreenRect::new(0, 0, self.width, self.height)
    }

    pub fn area(&self) -> usize {
        (self.width.max(0) as usize) * (self.height.max(0) as usize)
    }
}

/// Screen position of the top-left cell of an item whose lower-left world
/// corner is `(x, y)` and which is `height` rows tall.
#[inline]
pub fn world_to_screen(x: i32, y: i32, height: i32, camera: Camera, viewport: Viewport) -> (i32, i32) {
    (x - camera.x, viewport.height - y + camera.y - height)
}

/// Screen cells covered by a `width x height` item at world `(x, y)`.
pub fn screen_rect_of(x: i32, y: i32, width: i32, height: i32, camera: Camera, viewport: Viewport) -> ScreenRect {
    let (sx, sy) = world_to_screen(x, y, height, camera, viewport);
    ScreenRect::new(sx, sy, width, height)
}

/// Clamp one camera axis to `[0, level_extent - view_extent]`, or 0 when the
/// level is narrower than the view.
#[inline]
pub fn clamp_axis(offset: i32, level_extent: i32, view_extent: i32) -> i32 {
    offset.clamp(0, (level_extent - view_extent).max(0))
}

/// Camera that puts an item one third in from the left edge and centres it
/// vertically, clamped to the level.
pub fn anchor_camera(
    x: i32,
    y: i32,
    height: i32,
    level_width: i32,
    level_height: i32,
    viewport: Viewport,
) -> Camera {
    let cx = x - viewport.width / 3;
    let cy = y + height / 2 - viewport.height / 2;
    Camera {
        x: clamp_axis(cx, level_width, viewport.width),
        y: clamp_axis(cy, level_height, viewport.height),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const VIEW: Viewport = Viewport::new(150, 40);

    #[test]
    fn bottom_left_item_lands_on_last_rows() {
        let (sx, sy) = world_to_screen(0, 0, 3, Camera::default(), VIEW);
        assert_eq!((sx, sy), (0, 37));
    }

    #[test]
    fn raising_camera_moves_items_down() {
        let cam = Camera { x: 10, y: 5 };
        let (sx, sy) = world_to_screen(10, 5, 1, cam, VIEW);
        assert_eq!((sx, sy), (0, 39));
    }

    #[test]
    fn touching_rects_do_not_overlap() {
        let ground = Rect::new(0.0, 0.0, 20.0, 3.0);
        let standing = Rect::new(5.0, 3.0, 3.0, 3.0);
        assert!(!standing.overlaps(&ground));
        let sunk = Rect::new(5.0, 2.9, 3.0, 3.0);
        assert!(sunk.overlaps(&ground));
    }

    #[test]
    fn union_and_intersect() {
        let a = ScreenRect::new(0, 0, 4, 2);
        let b = ScreenRect::new(3, 1, 4, 4);
        assert_eq!(a.union(&b), ScreenRect::new(0, 0, 7, 5));
        assert_eq!(a.intersect(&b), Some(ScreenRect::new(3, 1, 1, 1)));
        assert_eq!(a.intersect(&ScreenRect::new(10, 10, 1, 1)), None);
    }

    #[test]
    fn camera_anchor_keeps_entity_at_one_third() {
        let cam = anchor_camera(100, 3, 3, 200, 40, VIEW);
        assert_eq!(cam.x, 50);
        assert_eq!(cam.y, 0);
        let (sx, _) = world_to_screen(100, 3, 3, cam, VIEW);
        assert_eq!(sx, VIEW.width / 3);
    }

    #[test]
    fn camera_on_small_level_stays_at_origin() {
        let cam = anchor_camera(90, 30, 3, 100, 20, VIEW);
        assert_eq!(cam, Camera::default());
    }

    proptest! {
        #[test]
        fn anchored_camera_is_clamped(
            x in -500i32..1000,
            y in -500i32..1000,
            lw in 1i32..600,
            lh in 1i32..200,
        ) {
            let cam = anchor_camera(x, y, 3, lw, lh, VIEW);
            prop_assert!(cam.x >= 0 && cam.x <= (lw - VIEW.width).max(0));
            prop_assert!(cam.y >= 0 && cam.y <= (lh - VIEW.height).max(0));
        }

        #[test]
        fn union_contains_both(
            ax in -50i32..50, ay in -50i32..50, aw in 1i32..50, ah in 1i32..50,
            bx in -50i32..50, by in -50i32..50, bw in 1i32..50, bh in 1i32..50,
        ) {
            let a = ScreenRect::new(ax, ay, aw, ah);
            let b = ScreenRect::new(bx, by, bw, bh);
            let u = a.union(&b);
            prop_assert!(u.contains(ax, ay) && u.contains(a.right() - 1, a.bottom() - 1));
            prop_assert!(u.contains(bx, by) && u.contains(b.right() - 1, b.bottom() - 1));
        }
    }
}
