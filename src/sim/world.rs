/// Session: the complete state of a running game.
///
/// One explicit object owns the loaded `Level`, the player, the barrel
/// collection and the scoring / lives / phase bookkeeping. Every
/// subsystem receives it by reference; nothing is global.
///
/// ## Phases
///
///   Intro ──(all stages elapsed)──▶ Playing
///   Playing ──(lives hit 0)──▶ Lost
///   Playing ──(goal touched)──▶ LevelAdvance ──(pause elapsed)──▶ Intro of next level
///                                             └─(catalog exhausted)─▶ Victory
///   Lost | Victory ──(restart)──▶ Intro of level 0
///
/// ## Renderer snapshot
///
/// `scene()` hands out a `SceneView`: borrowed, read-only, taken once per
/// frame after the step.

use crate::config::{GameConfig, PhysicsConfig, SessionConfig};
use crate::domain::entity::{Barrel, Player, PlayerState};
use crate::domain::geometry::Rect;
use crate::domain::terrain::{Girder, Ladder};
use crate::sim::level::{self, Level};
use crate::sim::spawner::Spawner;

/// Logical playfield size. Level layouts are authored against it.
pub const SCREEN_WIDTH: f32 = 600.0;
pub const SCREEN_HEIGHT: f32 = 800.0;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Intro,
    Playing,
    /// Goal reached; short pause before the next level loads.
    LevelAdvance,
    Lost,
    Victory,
}

/// Intro sub-stage bookkeeping. `cued` latches the one-shot cue of the
/// current stage.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct IntroState {
    pub stage: usize,
    pub elapsed_ms: f32,
    pub cued: bool,
}

pub struct Session {
    // ── Tunables ──
    pub physics: PhysicsConfig,
    pub rules: SessionConfig,
    pub width: f32,
    pub height: f32,

    // ── Level (stored once per load) ──
    pub level: Level,
    pub level_index: usize,

    // ── Entities ──
    pub player: Player,
    pub barrels: Vec<Barrel>,
    pub spawner: Spawner,

    // ── Meta ──
    pub phase: Phase,
    pub intro: IntroState,
    pub advance_ms: f32,
    /// Goal latch: set on the first goal overlap of a level.
    pub level_won: bool,
    pub score: f64,
    pub lives: u32,
    pub tick: u64,
}

// ── Construction ──

impl Session {
    /// A new game at level 0, intro stage 0.
    pub fn new(config: &GameConfig, seed: u64) -> Self {
        let mut session = Session {
            physics: config.physics.clone(),
            rules: config.session.clone(),
            width: SCREEN_WIDTH,
            height: SCREEN_HEIGHT,
            level: Level::default(),
            level_index: 0,
            player: Player::standing_at(0.0, SCREEN_HEIGHT),
            barrels: vec![],
            spawner: Spawner::new(seed),
            phase: Phase::Intro,
            intro: IntroState::default(),
            advance_ms: 0.0,
            level_won: false,
            score: 0.0,
            lives: config.session.initial_lives,
            tick: 0,
        };
        level::load_level(&mut session, 0);
        session
    }

    /// Back to the start: score, lives and level index reset, level 0 reloaded.
    pub fn restart(&mut self) {
        log::info!("restart (was score {}, level {})", self.score as u64, self.level_index + 1);
        self.score = 0.0;
        self.lives = self.rules.initial_lives;
        self.level_index = 0;
        level::load_level(self, 0);
    }

    /// Put the player back on the level start, in place.
    pub fn reset_player(&mut self) {
        let (x, y) = self.level.start_position(self.height);
        self.player.reset_to(x, y);
    }

    /// Enter intro stage 0 of the current level.
    pub fn begin_intro(&mut self) {
        self.phase = Phase::Intro;
        self.intro = IntroState::default();
    }
}

// ── Queries ──

impl Session {
    /// 1-based level number for display.
    pub fn level_number(&self) -> usize {
        self.level_index + 1
    }

    /// Text shown for the current intro stage ("" for the silent pause).
    pub fn intro_label(&self) -> String {
        match self.intro.stage {
            0 => format!("LEVEL {}", self.level_number()),
            1 => "READY!".to_string(),
            2 => "GO!!".to_string(),
            _ => String::new(),
        }
    }

    pub fn scene(&self) -> SceneView<'_> {
        SceneView {
            width: self.width,
            height: self.height,
            girders: self.level.terrain.girders(),
            ladders: &self.level.terrain.ladders,
            kong: self.level.kong,
            goal: self.level.goal,
            oil_drum: self.level.oil_drum,
            player: self.player.rect,
            player_state: self.player.state(),
            barrels: &self.barrels,
            phase: self.phase,
            intro_label: if self.phase == Phase::Intro { self.intro_label() } else { String::new() },
            score: self.score,
            lives: self.lives,
            level_name: &self.level.name,
            level_number: self.level_number(),
        }
    }
}

/// Everything a renderer may look at, and nothing it may change.
pub struct SceneView<'a> {
    pub width: f32,
    pub height: f32,
    pub girders: &'a [Girder],
    pub ladders: &'a [Ladder],
    pub kong: Rect,
    pub goal: Rect,
    pub oil_drum: Rect,
    pub player: Rect,
    pub player_state: PlayerState,
    /// Rects and roll angles.
    pub barrels: &'a [Barrel],
    pub phase: Phase,
    pub intro_label: String,
    pub score: f64,
    pub lives: u32,
    pub level_name: &'a str,
    pub level_number: usize,
}
