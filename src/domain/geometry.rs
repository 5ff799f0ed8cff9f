/// Axis-aligned rectangles in screen space.
///
/// Screen space: x grows right, y grows DOWN (row 0 is the top of the
/// screen). "Bottom" is therefore the larger y. All bodies, ladders and
/// decorative props are `Rect`s; girders are not (see `terrain`).

#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Rect { x, y, w, h }
    }

    /// Build a rect from the midpoint of its bottom edge.
    pub fn from_midbottom(cx: f32, bottom: f32, w: f32, h: f32) -> Self {
        Rect { x: cx - w / 2.0, y: bottom - h, w, h }
    }

    #[inline] pub fn left(&self) -> f32 { self.x }
    #[inline] pub fn right(&self) -> f32 { self.x + self.w }
    #[inline] pub fn top(&self) -> f32 { self.y }
    #[inline] pub fn bottom(&self) -> f32 { self.y + self.h }
    #[inline] pub fn center_x(&self) -> f32 { self.x + self.w / 2.0 }

    #[inline]
    pub fn set_bottom(&mut self, bottom: f32) {
        self.y = bottom - self.h;
    }

    #[inline]
    pub fn set_center_x(&mut self, cx: f32) {
        self.x = cx - self.w / 2.0;
    }

    /// Strict overlap: rects that only share an edge do NOT intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// Does the horizontal extent overlap the half-open span `[left, right)`?
    pub fn overlaps_span(&self, left: f32, right: f32) -> bool {
        self.right() > left && self.left() < right
    }

    /// Push the rect back inside `[min_x, max_x]` horizontally.
    /// Vertical position is never touched.
    pub fn clamp_x(&mut self, min_x: f32, max_x: f32) {
        if self.w >= max_x - min_x {
            self.x = min_x;
        } else if self.left() < min_x {
            self.x = min_x;
        } else if self.right() > max_x {
            self.x = max_x - self.w;
        }
    }
}
