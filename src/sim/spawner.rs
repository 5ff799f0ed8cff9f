/// Barrel spawner: a millisecond timer plus a seeded coin for the side.
///
/// The timer advances on every tick whatever the phase; the session only
/// acts on a fire while Playing. `restart` is called on each level load.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::domain::entity::Barrel;
use crate::domain::physics::surface_height_at;
use crate::sim::level::Level;

/// Sideways offset of the spawn point, as a fraction of the antagonist's width.
const SPAWN_OFFSET: f32 = 0.6;

pub struct Spawner {
    interval_ms: f32,
    elapsed_ms: f32,
    rng: Pcg32,
}

impl Spawner {
    pub fn new(seed: u64) -> Self {
        Spawner {
            interval_ms: 0.0,
            elapsed_ms: 0.0,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn restart(&mut self, interval_ms: f32) {
        self.interval_ms = interval_ms;
        self.elapsed_ms = 0.0;
    }

    /// Advance by `dt_ms`. Returns true when the timer fires.
    /// A non-positive interval never fires.
    pub fn tick(&mut self, dt_ms: f32) -> bool {
        if !(self.interval_ms > 0.0) {
            return false;
        }
        self.elapsed_ms += dt_ms;
        if self.elapsed_ms >= self.interval_ms {
            self.elapsed_ms -= self.interval_ms;
            true
        } else {
            false
        }
    }

    /// +1 (right of the antagonist) or -1 (left), each with probability 1/2.
    pub fn pick_side(&mut self) -> f32 {
        if self.rng.random_bool(0.5) { 1.0 } else { -1.0 }
    }
}

/// A fresh barrel beside the antagonist, rolling on its girder.
///
/// Direction: downhill on a slope; on a flat girder, away from the
/// antagonist's center. `None` if the level's spawn girder does not exist.
pub fn spawn_barrel(level: &Level, side: f32) -> Option<Barrel> {
    let id = level.terrain.id_at(level.kong_girder)?;
    let girder = level.terrain.girder(id);
    let x = level.kong.center_x() + side * level.kong.w * SPAWN_OFFSET;
    let dir = girder
        .downhill_dir()
        .unwrap_or(if x > level.kong.center_x() { 1.0 } else { -1.0 });
    Some(Barrel::rolling_on(id, x, surface_height_at(girder, x), dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PhysicsConfig;
    use crate::domain::entity::BarrelMotion;
    use crate::domain::rules::step_barrel;
    use crate::domain::geometry::Rect;
    use crate::domain::terrain::{Girder, Terrain};
    use crate::sim::level::level;

    fn flat_kong_level() -> Level {
        Level {
            terrain: Terrain::new(vec![Girder::flat("K", 0.0, 600.0, 440.0)], vec![]),
            kong: Rect::new(72.0, 395.0, 55.0, 45.0),
            kong_girder: 0,
            ..Level::default()
        }
    }

    #[test]
    fn timer_fires_once_per_interval() {
        let mut s = Spawner::new(1);
        s.restart(100.0);
        let fires = (0..60).filter(|_| s.tick(10.0)).count();
        assert_eq!(fires, 6);
    }

    #[test]
    fn restart_resets_elapsed() {
        let mut s = Spawner::new(1);
        s.restart(100.0);
        for _ in 0..9 { s.tick(10.0); }
        s.restart(100.0);
        assert!(!s.tick(10.0));
    }

    #[test]
    fn zero_interval_never_fires() {
        let mut s = Spawner::new(1);
        s.restart(0.0);
        assert!((0..100).all(|_| !s.tick(16.0)));
    }

    #[test]
    fn same_seed_same_sides() {
        let mut a = Spawner::new(42);
        let mut b = Spawner::new(42);
        let sa: Vec<f32> = (0..32).map(|_| a.pick_side()).collect();
        let sb: Vec<f32> = (0..32).map(|_| b.pick_side()).collect();
        assert_eq!(sa, sb);
        assert!(sa.iter().all(|&s| s == 1.0 || s == -1.0));
        // 32 fair coin flips that all agree would be a broken coin
        assert!(sa.contains(&1.0) && sa.contains(&-1.0));
    }

    #[test]
    fn flat_spawn_right_rolls_right() {
        let l = flat_kong_level();
        let b = spawn_barrel(&l, 1.0).unwrap();
        assert_eq!(b.dir, 1.0);
        assert_eq!(b.rect.bottom(), 440.0);
        assert!((b.rect.center_x() - (99.5 + 33.0)).abs() < 1e-4);
        assert_eq!(b.motion, BarrelMotion::Rolling(l.terrain.id_at(0).unwrap()));
    }

    #[test]
    fn flat_spawn_rolls_to_the_end_then_drops() {
        let l = flat_kong_level();
        let phys = PhysicsConfig::default();
        let mut b = spawn_barrel(&l, 1.0).unwrap();
        assert_eq!(b.dir, 1.0);

        let mut rolled = 0;
        while b.is_rolling() && rolled < 400 {
            step_barrel(&mut b, &l.terrain, 2.0, &phys);
            rolled += 1;
            if b.is_rolling() {
                assert_eq!(b.rect.bottom(), 440.0);
            }
        }
        // (600 - 132.5) / 2 ticks to reach the right end
        assert!(rolled > 200, "rolled {rolled} ticks");
        assert!(!b.is_rolling());
        assert!(b.rect.center_x() >= 600.0);

        let mut last_vy = b.vy;
        let mut last_bottom = b.rect.bottom();
        for _ in 0..5 {
            step_barrel(&mut b, &l.terrain, 2.0, &phys);
            assert!(b.vy > last_vy);
            assert!(b.rect.bottom() > last_bottom);
            last_vy = b.vy;
            last_bottom = b.rect.bottom();
        }
        assert_eq!(b.dir, 1.0);
    }

    #[test]
    fn flat_spawn_left_rolls_left() {
        let b = spawn_barrel(&flat_kong_level(), -1.0).unwrap();
        assert_eq!(b.dir, -1.0);
    }

    #[test]
    fn sloped_spawn_rolls_downhill_on_either_side() {
        // 25m: the antagonist girder falls to the left
        let l = level(0, 600.0, 800.0).unwrap();
        for side in [1.0, -1.0] {
            let b = spawn_barrel(&l, side).unwrap();
            assert_eq!(b.dir, -1.0);
            let g = &l.terrain.girders()[l.kong_girder];
            assert!((b.rect.bottom() - surface_height_at(g, b.rect.center_x())).abs() < 1e-3);
        }
    }

    #[test]
    fn missing_spawn_girder_spawns_nothing() {
        let l = Level { kong_girder: 9, ..flat_kong_level() };
        assert!(spawn_barrel(&l, 1.0).is_none());
    }
}
