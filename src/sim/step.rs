/// The step function: advances the session by one fixed tick.
///
/// Processing order while Playing:
///   1. Spawn (if the spawner fired this tick)
///   2. Player (jump, then kinematics)
///   3. Barrels (all of them, then drop the ones that left the screen)
///   4. Damage: fall-off or barrel hit, at most one per tick
///   5. Goal latch
///   6. Continuous score
///
/// Spawn and barrel movement come before the collision test so a barrel
/// is never one tick behind what the player sees.
///
/// Other phases:
///   - Intro: fire the stage cue once, count the stage down, then Playing.
///   - LevelAdvance: count the pause down, then load the next level.
///   - Lost / Victory: only the restart command does anything.

use crate::domain::entity::FrameInput;
use crate::domain::rules;
use crate::sim::event::GameEvent;
use crate::sim::level::load_level;
use crate::sim::spawner::spawn_barrel;
use crate::sim::world::{Phase, Session};

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(session: &mut Session, input: FrameInput) -> Vec<GameEvent> {
    let mut events: Vec<GameEvent> = Vec::new();
    session.tick += 1;
    let dt_ms = session.rules.tick_ms();

    if input.restart && matches!(session.phase, Phase::Lost | Phase::Victory) {
        session.restart();
        return events;
    }

    let spawn_due = session.spawner.tick(dt_ms);

    match session.phase {
        Phase::Intro => resolve_intro(session, dt_ms, &mut events),
        Phase::Playing => {
            if spawn_due { resolve_spawn(session); }
            resolve_player(session, &input, &mut events);
            resolve_barrels(session);
            resolve_escaped_barrels(session);
            if !resolve_damage(session, &mut events) {
                resolve_goal(session, &mut events);
            }
            if session.phase == Phase::Playing {
                resolve_score(session, dt_ms);
            }
        }
        Phase::LevelAdvance => resolve_advance(session, dt_ms),
        Phase::Lost | Phase::Victory => {}
    }

    events
}

// ══════════════════════════════════════════════════════════════
// Intro / level advance
// ══════════════════════════════════════════════════════════════

fn resolve_intro(session: &mut Session, dt_ms: f32, events: &mut Vec<GameEvent>) {
    let intro = &mut session.intro;
    if !intro.cued {
        events.push(GameEvent::IntroCue(intro.stage));
        intro.cued = true;
    }

    intro.elapsed_ms += dt_ms;
    let duration = session.rules.intro_stage_ms.get(intro.stage).copied().unwrap_or(0.0);
    if intro.elapsed_ms > duration {
        intro.stage += 1;
        intro.elapsed_ms = 0.0;
        intro.cued = false;
        if intro.stage >= session.rules.intro_stage_ms.len() {
            log::info!("level {} playing", session.level_number());
            session.phase = Phase::Playing;
        }
    }
}

fn resolve_advance(session: &mut Session, dt_ms: f32) {
    session.advance_ms += dt_ms;
    if session.advance_ms >= session.rules.level_advance_pause_ms {
        session.advance_ms = 0.0;
        let next = session.level_index + 1;
        load_level(session, next);
    }
}

// ══════════════════════════════════════════════════════════════
// Entities
// ══════════════════════════════════════════════════════════════

fn resolve_spawn(session: &mut Session) {
    let side = session.spawner.pick_side();
    if let Some(barrel) = spawn_barrel(&session.level, side) {
        log::debug!("barrel spawned at x={:.1} dir={}", barrel.rect.center_x(), barrel.dir);
        session.barrels.push(barrel);
    }
}

fn resolve_player(session: &mut Session, input: &FrameInput, events: &mut Vec<GameEvent>) {
    if rules::try_jump(&mut session.player, input, &session.physics) {
        events.push(GameEvent::Jump);
    }
    rules::step_player(&mut session.player, input, &session.level.terrain, &session.physics, session.width);
}

fn resolve_barrels(session: &mut Session) {
    let terrain = &session.level.terrain;
    for barrel in session.barrels.iter_mut() {
        rules::step_barrel(barrel, terrain, session.level.roll_speed, &session.physics);
    }
}

/// Barrels whose top passed the bottom of the screen are gone, each worth a bonus.
fn resolve_escaped_barrels(session: &mut Session) {
    let height = session.height;
    let before = session.barrels.len();
    session.barrels.retain(|b| b.rect.top() <= height);
    let escaped = before - session.barrels.len();
    if escaped > 0 {
        session.score += session.rules.barrel_escape_bonus * escaped as f64;
        log::debug!("{escaped} barrel(s) off screen");
    }
}

// ══════════════════════════════════════════════════════════════
// Damage / goal / score
// ══════════════════════════════════════════════════════════════

/// Apply at most one damage event. Returns true if one was applied.
fn resolve_damage(session: &mut Session, events: &mut Vec<GameEvent>) -> bool {
    let player = session.player.rect;
    let fell_off = player.top() > session.height + player.h;

    let cause = if fell_off {
        "fell"
    } else if let Some(i) = session.barrels.iter().position(|b| b.rect.intersects(&player)) {
        session.barrels.swap_remove(i);
        "hit by barrel"
    } else {
        return false;
    };

    session.lives = session.lives.saturating_sub(1);
    events.push(GameEvent::Hit);
    log::info!("player {cause}, {} lives left", session.lives);

    if session.lives == 0 {
        session.phase = Phase::Lost;
        events.push(GameEvent::GameOver);
        log::info!(
            "game over on level {} with score {} after {} ticks",
            session.level_number(), session.score as u64, session.tick
        );
    } else {
        session.reset_player();
    }
    true
}

fn resolve_goal(session: &mut Session, events: &mut Vec<GameEvent>) {
    if session.level_won || !session.player.rect.intersects(&session.level.goal) {
        return;
    }
    session.level_won = true;
    let bonus = session.rules.goal_bonus_base
        + session.level_number() as f64 * session.rules.goal_bonus_per_level;
    session.score += bonus;
    session.phase = Phase::LevelAdvance;
    session.advance_ms = 0.0;
    events.push(GameEvent::LevelWon);
    log::info!("level {} cleared, bonus {bonus}", session.level_number());
}

/// Later levels score faster: one point per second per level number.
fn resolve_score(session: &mut Session, dt_ms: f32) {
    session.score += dt_ms as f64 / 1000.0 * session.level_number() as f64;
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
