/// Per-tick kinematics for the player and for barrels.
///
/// Pure functions over one body and the read-only terrain: no session,
/// no scoring, no events. The sim layer decides what a fall off the
/// screen or a collision *means*.
///
/// ## Player Truth Table
///
/// ### Horizontal
/// ┌──────────────────────────┬─────────────────────────────┐
/// │ Condition                 │ Effect                      │
/// ├──────────────────────────┼─────────────────────────────┤
/// │ climbing (last tick)      │ no horizontal movement      │
/// │ left / right held         │ ∓ player_speed (both = 0)   │
/// │ always                    │ clamp x to screen, never y  │
/// └──────────────────────────┴─────────────────────────────┘
///
/// ### Ladder (first ladder in contact, see `physics::ladder_contact`;
/// a grounded player holding down also grabs a ladder just under its feet)
/// ┌──────────────────────────┬─────────────────────────────┐
/// │ Condition                 │ Effect                      │
/// ├──────────────────────────┼─────────────────────────────┤
/// │ up, feet below top        │ y -= climb, climbing        │
/// │ down, feet < bottom+climb │ y += climb, climbing        │
/// │ any climb move            │ vy = 0, airborne, snap x    │
/// │ no climb move             │ idle on ladder: vy = 0      │
/// │ feet past top, or down    │ stop climbing, try landing  │
/// │ step reaches the bottom   │                             │
/// │ on a ladder at all        │ gravity does not apply      │
/// └──────────────────────────┴─────────────────────────────┘
///
/// ### Free fall (no ladder contact)
/// ┌──────────────────────────┬─────────────────────────────┐
/// │ always                    │ vy += gravity; y += vy      │
/// │ supported (player band)   │ snap to surface, vy = 0,    │
/// │                           │ grounded                    │
/// │ otherwise                 │ airborne                    │
/// └──────────────────────────┴─────────────────────────────┘
///
/// ## Barrel Truth Table
/// ┌──────────────────────────┬─────────────────────────────┐
/// │ Rolling                   │ x += speed·dir, bottom =    │
/// │                           │ surface(center x), vy = 0   │
/// │ Rolling, center ∉ span    │ → Falling, vy = unbind seed │
/// │ Falling                   │ vy += 0.6·gravity; y += vy  │
/// │ Falling, supported        │ → Rolling on that girder,   │
/// │ (barrel band, not the     │ vy = 0, dir = downhill      │
/// │ girder just left)         │ (flat keeps dir)            │
/// └──────────────────────────┴─────────────────────────────┘

use crate::config::PhysicsConfig;

use super::entity::{Barrel, BarrelMotion, FrameInput, Player};
use super::physics::{find_support, ladder_below, ladder_contact, surface_height_at};
use super::terrain::Terrain;

/// Spin per tick (degrees × dir) while rolling / while falling.
const ROLL_SPIN: f32 = 6.0;
const FALL_SPIN: f32 = 3.0;

// ── Player ──

/// Edge-triggered jump. Only from the ground and never from a ladder.
/// Returns true if the jump happened.
pub fn try_jump(player: &mut Player, input: &FrameInput, phys: &PhysicsConfig) -> bool {
    if !input.jump || !player.on_ground || player.on_ladder {
        return false;
    }
    player.vy = phys.jump_strength;
    player.on_ground = false;
    true
}

/// Advance the player by one tick. See truth table above.
pub fn step_player(
    player: &mut Player,
    input: &FrameInput,
    terrain: &Terrain,
    phys: &PhysicsConfig,
    screen_width: f32,
) {
    if !player.climbing {
        if input.left { player.rect.x -= phys.player_speed; }
        if input.right { player.rect.x += phys.player_speed; }
    }
    player.rect.clamp_x(0.0, screen_width);

    let grab = phys.ladder_grab_factor;
    let ladder = ladder_contact(&player.rect, &terrain.ladders, grab)
        .or_else(|| {
            // Standing on a ladder's top: down grabs it.
            let below = ladder_below(&player.rect, &terrain.ladders, grab, phys.player_landing_floor);
            below.filter(|_| input.down && player.on_ground)
        })
        .copied();
    player.on_ladder = ladder.is_some();

    let Some(ladder) = ladder else {
        player.climbing = false;
        free_fall(player, terrain, phys);
        return;
    };

    let climb = phys.climb_speed;
    let can_climb_up = player.rect.bottom() > ladder.top;
    let can_climb_down = player.rect.bottom() < ladder.bottom + climb;

    let mut moved_down = false;
    let moved = if input.up && can_climb_up {
        player.rect.y -= climb;
        true
    } else if input.down && can_climb_down {
        player.rect.y += climb;
        moved_down = true;
        true
    } else {
        false
    };

    if moved {
        player.vy = 0.0;
        player.on_ground = false;
        player.climbing = true;
        player.rect.set_center_x(ladder.center_x);
    } else {
        // Hanging still on the ladder: no gravity, no drift.
        player.climbing = false;
        player.vy = 0.0;
    }

    let past_top = player.rect.bottom() <= ladder.top;
    let reached_bottom = moved_down && player.rect.bottom() >= ladder.bottom;
    if player.climbing && (past_top || reached_bottom) {
        player.climbing = false;
        if let Some((_, surface)) = find_support(&player.rect, terrain, player.vy, &phys.player_band(), None) {
            player.rect.set_bottom(surface);
            player.on_ground = true;
            player.vy = 0.0;
        }
    }
}

/// Gravity, integration and landing (semi-implicit Euler, one step per tick).
fn free_fall(player: &mut Player, terrain: &Terrain, phys: &PhysicsConfig) {
    player.vy += phys.gravity;
    player.rect.y += player.vy;

    match find_support(&player.rect, terrain, player.vy, &phys.player_band(), None) {
        Some((_, surface)) => {
            player.rect.set_bottom(surface);
            player.vy = 0.0;
            player.on_ground = true;
        }
        None => player.on_ground = false,
    }
}

// ── Barrels ──

/// Advance one barrel by one tick. See truth table above.
pub fn step_barrel(barrel: &mut Barrel, terrain: &Terrain, roll_speed: f32, phys: &PhysicsConfig) {
    match barrel.motion {
        BarrelMotion::Rolling(id) => {
            let girder = terrain.girder(id);
            barrel.rect.x += roll_speed * barrel.dir;
            barrel.spin(ROLL_SPIN * barrel.dir);

            let cx = barrel.rect.center_x();
            barrel.rect.set_bottom(surface_height_at(girder, cx));
            barrel.vy = 0.0;

            if !(girder.left < cx && cx < girder.right) {
                barrel.motion = BarrelMotion::Falling { departed: Some(id) };
                barrel.vy = phys.barrel_unbind_velocity;
            }
        }
        BarrelMotion::Falling { departed } => {
            barrel.vy += phys.barrel_gravity();
            barrel.rect.y += barrel.vy;
            barrel.spin(FALL_SPIN * barrel.dir);

            // The girder just left stays excluded until the barrel is clear of its span.
            let departed = departed.filter(|id| {
                let g = terrain.girder(*id);
                barrel.rect.overlaps_span(g.left, g.right)
            });

            match find_support(&barrel.rect, terrain, barrel.vy, &phys.barrel_band(), departed) {
                Some((id, surface)) => {
                    barrel.rect.set_bottom(surface);
                    barrel.vy = 0.0;
                    barrel.motion = BarrelMotion::Rolling(id);
                    if let Some(dir) = terrain.girder(id).downhill_dir() {
                        barrel.dir = dir;
                    }
                }
                None => barrel.motion = BarrelMotion::Falling { departed },
            }
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
