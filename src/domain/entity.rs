/// Entities: Player and Barrel, plus the per-tick input intents.
/// State machines are small: the player is Grounded / Airborne / OnLadder,
/// a barrel is Rolling (bound to a girder) or Falling.

use super::geometry::Rect;
use super::terrain::GirderId;

pub const PLAYER_SIZE: f32 = 28.0;
pub const BARREL_SIZE: f32 = 22.0;

/// Frame input: held intents plus edge-triggered actions.
/// Movement = continuous (held key); jump / restart = fresh press only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub jump: bool,
    pub restart: bool,
}

/// Derived player state, for renderers and tests.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PlayerState {
    Grounded,
    Airborne,
    Climbing,
    OnLadderIdle,
}

#[derive(Clone, Debug)]
pub struct Player {
    pub rect: Rect,
    pub vy: f32,
    pub on_ground: bool,
    pub on_ladder: bool,
    pub climbing: bool,
}

impl Player {
    /// A grounded player whose feet are centered on `(x, surface_y)`.
    pub fn standing_at(x: f32, surface_y: f32) -> Self {
        Player {
            rect: Rect::from_midbottom(x, surface_y, PLAYER_SIZE, PLAYER_SIZE),
            vy: 0.0,
            on_ground: true,
            on_ladder: false,
            climbing: false,
        }
    }

    /// Reposition in place (respawn / level start). Only position,
    /// velocity and flags change.
    pub fn reset_to(&mut self, x: f32, surface_y: f32) {
        self.rect = Rect::from_midbottom(x, surface_y, self.rect.w, self.rect.h);
        self.vy = 0.0;
        self.on_ground = true;
        self.on_ladder = false;
        self.climbing = false;
    }

    /// Standing at a ladder's foot reads as Grounded.
    pub fn state(&self) -> PlayerState {
        if self.climbing {
            PlayerState::Climbing
        } else if self.on_ground {
            PlayerState::Grounded
        } else if self.on_ladder {
            PlayerState::OnLadderIdle
        } else {
            PlayerState::Airborne
        }
    }
}

/// Barrel motion: bound to a girder (exact slope following) or in free fall.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BarrelMotion {
    Rolling(GirderId),
    Falling {
        /// The girder just rolled off; ignored for landing until cleared.
        departed: Option<GirderId>,
    },
}

#[derive(Clone, Debug)]
pub struct Barrel {
    pub rect: Rect,
    /// +1 rolls right, -1 rolls left.
    pub dir: f32,
    pub vy: f32,
    pub motion: BarrelMotion,
    /// Cosmetic spin in degrees, [0, 360).
    pub roll_angle: f32,
}

impl Barrel {
    /// A barrel resting on `girder` with its bottom-center at `(x, surface_y)`.
    pub fn rolling_on(girder: GirderId, x: f32, surface_y: f32, dir: f32) -> Self {
        Barrel {
            rect: Rect::from_midbottom(x, surface_y, BARREL_SIZE, BARREL_SIZE),
            dir,
            vy: 0.0,
            motion: BarrelMotion::Rolling(girder),
            roll_angle: 0.0,
        }
    }

    pub fn is_rolling(&self) -> bool {
        matches!(self.motion, BarrelMotion::Rolling(_))
    }

    pub fn spin(&mut self, degrees: f32) {
        self.roll_angle = (self.roll_angle + degrees).rem_euclid(360.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_state_priority() {
        let mut p = Player::standing_at(60.0, 740.0);
        assert_eq!(p.state(), PlayerState::Grounded);
        p.on_ground = false;
        assert_eq!(p.state(), PlayerState::Airborne);
        p.on_ladder = true;
        assert_eq!(p.state(), PlayerState::OnLadderIdle);
        p.on_ground = true;
        assert_eq!(p.state(), PlayerState::Grounded);
        p.climbing = true;
        assert_eq!(p.state(), PlayerState::Climbing);
    }

    #[test]
    fn reset_keeps_size_and_clears_motion() {
        let mut p = Player::standing_at(60.0, 740.0);
        p.vy = 12.0;
        p.on_ground = false;
        p.climbing = true;
        p.reset_to(100.0, 600.0);
        assert_eq!(p.rect.center_x(), 100.0);
        assert_eq!(p.rect.bottom(), 600.0);
        assert_eq!(p.rect.w, PLAYER_SIZE);
        assert_eq!(p.vy, 0.0);
        assert!(p.on_ground && !p.climbing && !p.on_ladder);
    }

    #[test]
    fn spin_wraps_both_ways() {
        let t = crate::domain::terrain::Terrain::new(
            vec![crate::domain::terrain::Girder::flat("G", 0.0, 10.0, 0.0)],
            vec![],
        );
        let mut b = Barrel::rolling_on(t.id_at(0).unwrap(), 5.0, 0.0, -1.0);
        b.spin(-6.0);
        assert_eq!(b.roll_angle, 354.0);
        b.spin(12.0);
        assert_eq!(b.roll_angle, 6.0);
    }
}
