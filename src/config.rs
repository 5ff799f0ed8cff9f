/// Tunables, read from an optional `config.toml`.
///
/// Every tuned-by-feel constant of the simulation lives here so it can be
/// adjusted without a rebuild. A missing file, a missing key or a broken
/// document never stops the game: each falls back to the built-in value
/// and the problem goes to the log.

use serde::Deserialize;
use std::path::PathBuf;

use crate::domain::physics::SupportBand;

// ── Public Config Struct ──

#[derive(Clone, Debug, Default)]
pub struct GameConfig {
    pub physics: PhysicsConfig,
    pub session: SessionConfig,
    pub general: GeneralConfig,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PhysicsConfig {
    pub gravity: f32,
    pub jump_strength: f32,
    pub player_speed: f32,
    pub climb_speed: f32,
    pub barrel_gravity_factor: f32,
    pub barrel_unbind_velocity: f32,
    pub ladder_grab_factor: f32,
    pub player_landing_floor: f32,
    pub barrel_landing_floor: f32,
    pub landing_velocity_margin: f32,
    pub upward_landing_limit: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SessionConfig {
    pub initial_lives: u32,
    pub tick_rate_hz: u32,
    pub barrel_escape_bonus: f64,
    pub goal_bonus_base: f64,
    pub goal_bonus_per_level: f64,
    pub level_advance_pause_ms: f32,
    pub intro_stage_ms: Vec<f32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GeneralConfig {
    /// 0 = pick a seed from the clock at startup.
    pub seed: u64,
    /// Ring the terminal bell on hit / game over.
    pub bell: bool,
}

impl PhysicsConfig {
    /// Landing band for the player (narrow floor: half a girder's thickness).
    pub fn player_band(&self) -> SupportBand {
        SupportBand {
            floor: self.player_landing_floor,
            velocity_margin: self.landing_velocity_margin,
            upward_limit: self.upward_landing_limit,
        }
    }

    /// Landing band for barrels (wider floor, never lands while rising).
    pub fn barrel_band(&self) -> SupportBand {
        SupportBand {
            floor: self.barrel_landing_floor,
            velocity_margin: self.landing_velocity_margin,
            upward_limit: 0.0,
        }
    }

    pub fn barrel_gravity(&self) -> f32 {
        self.gravity * self.barrel_gravity_factor
    }
}

impl SessionConfig {
    /// Milliseconds of game time covered by one simulation step.
    pub fn tick_ms(&self) -> f32 {
        1000.0 / self.tick_rate_hz.max(1) as f32
    }
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    physics: TomlPhysics,
    #[serde(default)]
    session: TomlSession,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlPhysics {
    #[serde(default = "default_gravity")]
    gravity: f32,
    #[serde(default = "default_jump_strength")]
    jump_strength: f32,
    #[serde(default = "default_player_speed")]
    player_speed: f32,
    #[serde(default = "default_climb_speed")]
    climb_speed: f32,
    #[serde(default = "default_barrel_gravity_factor")]
    barrel_gravity_factor: f32,
    #[serde(default = "default_barrel_unbind_velocity")]
    barrel_unbind_velocity: f32,
    #[serde(default = "default_ladder_grab_factor")]
    ladder_grab_factor: f32,
    #[serde(default = "default_player_landing_floor")]
    player_landing_floor: f32,
    #[serde(default = "default_barrel_landing_floor")]
    barrel_landing_floor: f32,
    #[serde(default = "default_landing_velocity_margin")]
    landing_velocity_margin: f32,
    #[serde(default = "default_upward_landing_limit")]
    upward_landing_limit: f32,
}

#[derive(Deserialize, Debug)]
struct TomlSession {
    #[serde(default = "default_initial_lives")]
    initial_lives: u32,
    #[serde(default = "default_tick_rate_hz")]
    tick_rate_hz: u32,
    #[serde(default = "default_barrel_escape_bonus")]
    barrel_escape_bonus: f64,
    #[serde(default = "default_goal_bonus_base")]
    goal_bonus_base: f64,
    #[serde(default = "default_goal_bonus_per_level")]
    goal_bonus_per_level: f64,
    #[serde(default = "default_level_advance_pause_ms")]
    level_advance_pause_ms: f32,
    #[serde(default = "default_intro_stage_ms")]
    intro_stage_ms: Vec<f32>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default)]
    seed: u64,
    #[serde(default = "default_bell")]
    bell: bool,
}

// ── Defaults ──

/// Visual thickness of a girder; the player's landing floor is half of it.
pub const GIRDER_THICKNESS: f32 = 15.0;

fn default_gravity() -> f32 { 0.7 }
fn default_jump_strength() -> f32 { -15.0 }
fn default_player_speed() -> f32 { 3.5 }
fn default_climb_speed() -> f32 { 2.5 }
fn default_barrel_gravity_factor() -> f32 { 0.6 }     // floatier than the player
fn default_barrel_unbind_velocity() -> f32 { 0.5 }
fn default_ladder_grab_factor() -> f32 { 0.75 }
fn default_player_landing_floor() -> f32 { GIRDER_THICKNESS / 2.0 }
fn default_barrel_landing_floor() -> f32 { GIRDER_THICKNESS }
fn default_landing_velocity_margin() -> f32 { 2.0 }
fn default_upward_landing_limit() -> f32 { -0.1 }

fn default_initial_lives() -> u32 { 3 }
fn default_tick_rate_hz() -> u32 { 60 }
fn default_barrel_escape_bonus() -> f64 { 5.0 }
fn default_goal_bonus_base() -> f64 { 500.0 }
fn default_goal_bonus_per_level() -> f64 { 250.0 }
fn default_level_advance_pause_ms() -> f32 { 1200.0 }
fn default_intro_stage_ms() -> Vec<f32> { vec![1200.0, 1000.0, 800.0, 200.0] }

fn default_bell() -> bool { true }

impl Default for TomlPhysics {
    fn default() -> Self {
        TomlPhysics {
            gravity: default_gravity(),
            jump_strength: default_jump_strength(),
            player_speed: default_player_speed(),
            climb_speed: default_climb_speed(),
            barrel_gravity_factor: default_barrel_gravity_factor(),
            barrel_unbind_velocity: default_barrel_unbind_velocity(),
            ladder_grab_factor: default_ladder_grab_factor(),
            player_landing_floor: default_player_landing_floor(),
            barrel_landing_floor: default_barrel_landing_floor(),
            landing_velocity_margin: default_landing_velocity_margin(),
            upward_landing_limit: default_upward_landing_limit(),
        }
    }
}

impl Default for TomlSession {
    fn default() -> Self {
        TomlSession {
            initial_lives: default_initial_lives(),
            tick_rate_hz: default_tick_rate_hz(),
            barrel_escape_bonus: default_barrel_escape_bonus(),
            goal_bonus_base: default_goal_bonus_base(),
            goal_bonus_per_level: default_goal_bonus_per_level(),
            level_advance_pause_ms: default_level_advance_pause_ms(),
            intro_stage_ms: default_intro_stage_ms(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            seed: 0,
            bell: default_bell(),
        }
    }
}

impl From<TomlPhysics> for PhysicsConfig {
    fn from(t: TomlPhysics) -> Self {
        PhysicsConfig {
            gravity: t.gravity,
            jump_strength: t.jump_strength,
            player_speed: t.player_speed,
            climb_speed: t.climb_speed,
            barrel_gravity_factor: t.barrel_gravity_factor,
            barrel_unbind_velocity: t.barrel_unbind_velocity,
            ladder_grab_factor: t.ladder_grab_factor,
            player_landing_floor: t.player_landing_floor,
            barrel_landing_floor: t.barrel_landing_floor,
            landing_velocity_margin: t.landing_velocity_margin,
            upward_landing_limit: t.upward_landing_limit,
        }
    }
}

impl From<TomlSession> for SessionConfig {
    fn from(t: TomlSession) -> Self {
        // An empty stage list would make the intro unreachable-to-exit; keep the defaults.
        let intro_stage_ms = if t.intro_stage_ms.is_empty() {
            default_intro_stage_ms()
        } else {
            t.intro_stage_ms
        };
        SessionConfig {
            initial_lives: t.initial_lives,
            tick_rate_hz: t.tick_rate_hz.max(1),
            barrel_escape_bonus: t.barrel_escape_bonus,
            goal_bonus_base: t.goal_bonus_base,
            goal_bonus_per_level: t.goal_bonus_per_level,
            level_advance_pause_ms: t.level_advance_pause_ms,
            intro_stage_ms,
        }
    }
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        TomlPhysics::default().into()
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        TomlSession::default().into()
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            seed: 0,
            bell: default_bell(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// First `config.toml` found next to the executable, then in the CWD.
    pub fn load() -> Self {
        match read_config_text(&candidate_dirs()) {
            Some(text) => Self::parse(&text),
            None => GameConfig::default(),
        }
    }

    /// Parse a config document. Errors fall back to the full default set.
    pub fn parse(text: &str) -> Self {
        match toml::from_str::<TomlConfig>(text) {
            Ok(cfg) => Self::from_toml(cfg),
            Err(e) => {
                log::warn!("config.toml parse error: {e}; using default settings");
                GameConfig::default()
            }
        }
    }

    fn from_toml(cfg: TomlConfig) -> Self {
        GameConfig {
            physics: cfg.physics.into(),
            session: cfg.session.into(),
            general: GeneralConfig {
                seed: cfg.general.seed,
                bell: cfg.general.bell,
            },
        }
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Text of the first readable config.toml in the candidate directories.
fn read_config_text(search_dirs: &[PathBuf]) -> Option<String> {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if !path.exists() {
            continue;
        }
        match std::fs::read_to_string(&path) {
            Ok(text) => {
                log::info!("loaded {}", path.display());
                return Some(text);
            }
            Err(e) => log::warn!("could not read {}: {e}", path.display()),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let cfg = GameConfig::parse("");
        assert_eq!(cfg.physics, PhysicsConfig::default());
        assert_eq!(cfg.session, SessionConfig::default());
        assert_eq!(cfg.physics.gravity, 0.7);
        assert_eq!(cfg.physics.player_landing_floor, 7.5);
        assert_eq!(cfg.session.intro_stage_ms, vec![1200.0, 1000.0, 800.0, 200.0]);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let cfg = GameConfig::parse("[physics]\ngravity = 1.0\n\n[general]\nseed = 42\n");
        assert_eq!(cfg.physics.gravity, 1.0);
        assert_eq!(cfg.physics.climb_speed, 2.5);
        assert_eq!(cfg.general.seed, 42);
        assert!(cfg.general.bell);
        assert_eq!(cfg.session.initial_lives, 3);
    }

    #[test]
    fn malformed_document_falls_back() {
        let cfg = GameConfig::parse("[physics\ngravity = ");
        assert_eq!(cfg.physics, PhysicsConfig::default());
    }

    #[test]
    fn empty_intro_list_is_replaced() {
        let cfg = GameConfig::parse("[session]\nintro_stage_ms = []\n");
        assert_eq!(cfg.session.intro_stage_ms.len(), 4);
    }

    #[test]
    fn barrel_gravity_is_scaled() {
        let p = PhysicsConfig::default();
        assert!((p.barrel_gravity() - 0.42).abs() < 1e-6);
    }

    #[test]
    fn tick_ms_at_sixty_hz() {
        let s = SessionConfig::default();
        assert!((s.tick_ms() - 16.666_666).abs() < 1e-3);
    }
}
