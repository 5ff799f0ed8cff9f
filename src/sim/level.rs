/// Level Catalog and loader.
///
/// Levels are code-defined: `level(index, width, height)` is a pure
/// function that builds the full description from the screen size. It is
/// called exactly once per load; the result is stored in the `Session`
/// and everything that needs level metadata (start position, spawn
/// interval, name) reads the stored value.
///
/// ## Layout conventions
///   - Surface heights are measured from the bottom of the screen so the
///     levels keep their shape on a different height.
///   - Ladders span from the upper girder's surface down to the lower
///     girder's surface, both read through `surface_height_at` at the
///     ladder's center line.
///   - A broken ladder is a short ladder that starts on a girder and ends
///     in the air.
///   - Girder list order is landing priority (see `physics::find_support`).

use crate::domain::geometry::Rect;
use crate::domain::physics::surface_height_at;
use crate::domain::terrain::{Girder, Ladder, Terrain};
use crate::sim::world::{Phase, Session};

pub const LEVEL_COUNT: usize = 2;

const LADDER_WIDTH: f32 = 18.0;
const KONG_SIZE: (f32, f32) = (55.0, 45.0);
const GOAL_SIZE: (f32, f32) = (25.0, 35.0);
const OIL_DRUM_SIZE: (f32, f32) = (35.0, 35.0);
const BASE_ROLL_SPEED: f32 = 2.2;

/// Where the player appears on load and after losing a life.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlayerStart {
    pub girder_index: usize,
    pub x: f32,
}

#[derive(Clone, Debug, Default)]
pub struct Level {
    pub name: String,
    pub terrain: Terrain,
    /// Antagonist platform rect; barrels spawn beside it.
    pub kong: Rect,
    pub goal: Rect,
    /// Decorative only, never collides.
    pub oil_drum: Rect,
    pub start: PlayerStart,
    pub spawn_interval_ms: f32,
    /// Index of the girder barrels are spawned onto.
    pub kong_girder: usize,
    pub roll_speed: f32,
}

impl Level {
    /// Feet position for the player start: the start offset on the start girder.
    /// Falls back to the bottom of the screen area if the index is out of range.
    pub fn start_position(&self, fallback_y: f32) -> (f32, f32) {
        let x = self.start.x;
        let y = self
            .terrain
            .id_at(self.start.girder_index)
            .map(|id| surface_height_at(self.terrain.girder(id), x))
            .unwrap_or(fallback_y);
        (x, y)
    }
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// Level supplier: `None` once the catalog is exhausted.
pub fn level(index: usize, width: f32, height: f32) -> Option<Level> {
    match index {
        0 => Some(rampage(width, height)),
        1 => Some(factory_floor(width, height)),
        _ => None,
    }
}

/// Load a level into the session. Preserves score and lives.
///
/// Resets the player to the level start, clears barrels, clears the goal
/// latch, restarts the spawn timer and enters intro stage 0. An exhausted
/// catalog puts the session in Victory and leaves the last level on screen.
pub fn load_level(session: &mut Session, level_idx: usize) {
    let Some(def) = level(level_idx, session.width, session.height) else {
        log::info!("no level {}: victory with score {}", level_idx + 1, session.score as u64);
        session.phase = Phase::Victory;
        return;
    };

    log::info!("loading level {}/{LEVEL_COUNT}: {}", level_idx + 1, def.name);
    for (_, g) in def.terrain.iter() {
        log::debug!("  girder {} [{:.0}, {:.0}) y {:.0} -> {:.0}", g.label, g.left, g.right, g.y_start, g.y_end);
    }
    session.level_index = level_idx;
    session.level = def;
    session.spawner.restart(session.level.spawn_interval_ms);
    session.reset_player();
    session.barrels.clear();
    session.level_won = false;
    session.begin_intro();
}

// ══════════════════════════════════════════════════════════════
// Catalog
// ══════════════════════════════════════════════════════════════

/// Ladder whose ends sit on the surfaces of `upper` and `lower` at `x`.
fn ladder_between(x: f32, upper: &Girder, lower: &Girder) -> Ladder {
    Ladder::new(x, surface_height_at(upper, x), surface_height_at(lower, x), LADDER_WIDTH)
}

/// Rect of `size` standing on `girder`, left edge at `x`.
fn prop_on(girder: &Girder, x: f32, size: (f32, f32)) -> Rect {
    let (w, h) = size;
    let bottom = surface_height_at(girder, x + w / 2.0);
    Rect::new(x, bottom - h, w, h)
}

/// 25m: five alternating slopes with the antagonist on the fourth.
fn rampage(width: f32, height: f32) -> Level {
    const SLOPE: f32 = 35.0;
    const KONG_GIRDER: usize = 4;

    let inner = width - 100.0;
    let g0 = Girder::flat("G0", 0.0, width, height - 60.0);
    let g1 = Girder::new("G1", 50.0, inner, height - 180.0 - SLOPE, height - 180.0);
    let g2 = Girder::new("G2", 50.0, inner, height - 300.0, height - 300.0 - SLOPE);
    let g3 = Girder::new("G3", 50.0, inner, height - 420.0 - SLOPE, height - 420.0);
    let g4 = Girder::new("G4_KONG", 50.0, inner, height - 540.0, height - 540.0 - SLOPE);
    let top_y = g4.y_start - 100.0;
    let top = Girder::flat("TOP", width / 2.0 - 70.0, 140.0, top_y);

    let kong = prop_on(&g4, 70.0, KONG_SIZE);
    let goal = Rect::new(top.center_x() - (GOAL_SIZE.0 / 2.0).floor(), top_y - GOAL_SIZE.1, GOAL_SIZE.0, GOAL_SIZE.1);
    let oil_drum = prop_on(&g0, 40.0, OIL_DRUM_SIZE);

    let broken_x = g1.center_x() - 90.0;
    let broken_bottom = surface_height_at(&g1, broken_x);
    let ladders = vec![
        ladder_between(g1.right - 30.0, &g1, &g0),
        Ladder::new(broken_x, broken_bottom - 50.0, broken_bottom, LADDER_WIDTH),
        ladder_between(g2.left + 30.0, &g2, &g1),
        ladder_between(g3.right - 30.0, &g3, &g2),
        ladder_between(g4.left + 30.0, &g4, &g3),
        ladder_between(top.center_x(), &top, &g4),
    ];

    Level {
        name: "25m - Rampage".into(),
        terrain: Terrain::new(vec![g0, g1, g2, g3, g4, top], ladders),
        kong,
        goal,
        oil_drum,
        start: PlayerStart { girder_index: 0, x: width / 10.0 },
        spawn_interval_ms: 2600.0,
        kong_girder: KONG_GIRDER,
        roll_speed: BASE_ROLL_SPEED,
    }
}

/// 50m: flat floors, two ladders up the middle, faster barrels.
fn factory_floor(width: f32, height: f32) -> Level {
    const KONG_GIRDER: usize = 2;

    let g0 = Girder::flat("L2G0", 0.0, width, height - 60.0);
    let g1 = Girder::flat("L2G1", width * 0.1, width * 0.8, height - 200.0);
    let g2 = Girder::flat("L2G2_KONG", width * 0.05, width * 0.9, height - 360.0);
    let g3 = Girder::flat("L2G3_PAULINE", width / 2.0 - 80.0, 160.0, height - 520.0);

    let kong = prop_on(&g2, width * 0.12, KONG_SIZE);
    let goal = Rect::new(
        g3.center_x() - (GOAL_SIZE.0 / 2.0).floor(),
        g3.y_start - GOAL_SIZE.1,
        GOAL_SIZE.0,
        GOAL_SIZE.1,
    );
    let oil_drum = prop_on(&g0, width - 70.0, OIL_DRUM_SIZE);

    let ladders = vec![
        ladder_between(g1.left + 40.0, &g1, &g0),
        ladder_between(g1.center_x() - 50.0, &g2, &g1),
        ladder_between(g1.center_x() + 50.0, &g2, &g1),
        ladder_between(g3.center_x(), &g3, &g2),
    ];

    Level {
        name: "50m - Factory Floor".into(),
        terrain: Terrain::new(vec![g0, g1, g2, g3], ladders),
        kong,
        goal,
        oil_drum,
        start: PlayerStart { girder_index: 0, x: width * 0.85 },
        spawn_interval_ms: 2300.0,
        kong_girder: KONG_GIRDER,
        roll_speed: BASE_ROLL_SPEED * 1.15,
    }
}
