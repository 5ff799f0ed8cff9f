/// Terrain: girders and ladders of one loaded level.
///
/// Girders live in an arena (`Terrain::girders`) and are referred to by
/// `GirderId`, an index into that arena. The arena is built once when a
/// level loads and replaced wholesale on the next load, so a handle held
/// by a barrel can never dangle mid-level.
///
/// List order of `girders` is authoring order and doubles as landing
/// priority: when two girders could both support a body, the earlier one
/// wins (see `physics::find_support`).

use super::geometry::Rect;

/// Opaque handle into `Terrain::girders`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct GirderId(usize);

/// A walkable surface segment: flat when `y_start == y_end`, otherwise a
/// straight slope between the two ends.
#[derive(Clone, Debug, PartialEq)]
pub struct Girder {
    /// Authoring label, unique within its level. Only shows up in logs.
    pub label: String,
    pub left: f32,
    pub right: f32,
    /// Surface height at `left`.
    pub y_start: f32,
    /// Surface height at `right`.
    pub y_end: f32,
}

impl Girder {
    pub fn new(label: &str, left: f32, width: f32, y_start: f32, y_end: f32) -> Self {
        Girder {
            label: label.to_string(),
            left,
            right: left + width,
            y_start,
            y_end,
        }
    }

    pub fn flat(label: &str, left: f32, width: f32, y: f32) -> Self {
        Girder::new(label, left, width, y, y)
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn center_x(&self) -> f32 {
        self.left + self.width() / 2.0
    }

    /// Horizontal direction that goes downhill: +1 right, -1 left,
    /// `None` for a flat girder. Larger y is lower on screen.
    pub fn downhill_dir(&self) -> Option<f32> {
        if self.y_start < self.y_end {
            Some(1.0)
        } else if self.y_start > self.y_end {
            Some(-1.0)
        } else {
            None
        }
    }
}

/// A climbable vertical strip. A "broken" ladder is simply one whose ends
/// do not meet a girder.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ladder {
    pub center_x: f32,
    pub top: f32,
    pub bottom: f32,
    pub width: f32,
}

impl Ladder {
    pub fn new(center_x: f32, top: f32, bottom: f32, width: f32) -> Self {
        Ladder { center_x, top, bottom, width }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.center_x - self.width / 2.0, self.top, self.width, self.bottom - self.top)
    }
}

/// Per-level terrain. Read-only while the level is being played.
#[derive(Clone, Debug, Default)]
pub struct Terrain {
    girders: Vec<Girder>,
    pub ladders: Vec<Ladder>,
}

impl Terrain {
    pub fn new(girders: Vec<Girder>, ladders: Vec<Ladder>) -> Self {
        Terrain { girders, ladders }
    }

    pub fn girders(&self) -> &[Girder] {
        &self.girders
    }

    /// Handle for the girder at authoring position `index`, if any.
    pub fn id_at(&self, index: usize) -> Option<GirderId> {
        (index < self.girders.len()).then_some(GirderId(index))
    }

    /// Resolve a handle issued by this arena.
    ///
    /// Handles are only minted by `id_at` / `iter`, and the arena is never
    /// shrunk in place, so this cannot go out of range for a live handle.
    pub fn girder(&self, id: GirderId) -> &Girder {
        &self.girders[id.0]
    }

    /// Girders with their handles, in authoring (priority) order.
    pub fn iter(&self) -> impl Iterator<Item = (GirderId, &Girder)> {
        self.girders.iter().enumerate().map(|(i, g)| (GirderId(i), g))
    }
}
