/// Keyboard tracker: turns crossterm key events into one `FrameInput` per tick.
///
/// Terminals rarely report key releases, so a key counts as held until
/// `HOLD_TIMEOUT` passes without a Press/Repeat for it. When keyboard
/// enhancement is on, explicit Release events end the hold immediately.
///
/// Held keys drive movement and climbing; jump and restart fire on the
/// first press only.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::entity::FrameInput;

const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

// ── Key bindings ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
/// Up doubles as jump on its first press (a no-op while on a ladder).
const KEYS_JUMP: &[KeyCode] = &[KeyCode::Char(' '), KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const KEYS_RESTART: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc, KeyCode::Char('q'), KeyCode::Char('Q')];

pub struct InputState {
    /// Last Press/Repeat per key.
    last_active: HashMap<KeyCode, Instant>,
    /// Keys that went from released to held since the last `frame_input`.
    fresh: Vec<KeyCode>,
    quit: bool,
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh: Vec::with_capacity(8),
            quit: false,
            honor_release: false,
        }
    }

    /// Read every pending terminal event without blocking.
    pub fn drain_events(&mut self) {
        while event::poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.apply(key, Instant::now());
            }
        }
        self.expire(Instant::now());
    }

    /// Intents for one simulation tick. Consumes the fresh presses, so a
    /// press seen between two ticks triggers exactly one jump.
    pub fn frame_input(&mut self) -> FrameInput {
        let input = FrameInput {
            left: self.any_held(KEYS_LEFT),
            right: self.any_held(KEYS_RIGHT),
            up: self.any_held(KEYS_UP),
            down: self.any_held(KEYS_DOWN),
            jump: self.any_fresh(KEYS_JUMP),
            restart: self.any_fresh(KEYS_RESTART),
        };
        self.fresh.clear();
        input
    }

    /// Esc, Q or Ctrl-C seen.
    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    // ── Internal ──

    fn apply(&mut self, key: KeyEvent, now: Instant) {
        let ctrl_c = key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'));
        if key.kind != KeyEventKind::Release && (ctrl_c || KEYS_QUIT.contains(&key.code)) {
            self.quit = true;
        }

        match key.kind {
            KeyEventKind::Release => {
                if self.honor_release {
                    self.last_active.remove(&key.code);
                }
            }
            _ => {
                if !self.held_at(key.code, now) && !self.fresh.contains(&key.code) {
                    self.fresh.push(key.code);
                }
                self.last_active.insert(key.code, now);
            }
        }
    }

    fn expire(&mut self, now: Instant) {
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    fn held_at(&self, code: KeyCode, now: Instant) -> bool {
        self.last_active
            .get(&code)
            .is_some_and(|t| now.duration_since(*t) < HOLD_TIMEOUT)
    }

    fn any_held(&self, codes: &[KeyCode]) -> bool {
        let now = Instant::now();
        codes.iter().any(|c| self.held_at(*c, now))
    }

    fn any_fresh(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.fresh.contains(c))
    }
}
