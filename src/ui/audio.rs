/// Terminal "audio": every cue goes to the log, and the two cues that
/// matter most (hit, game over) ring the terminal bell.
///
/// Fire-and-forget: a bell that fails to write is simply not heard.

use std::io::{self, Write};

use crate::sim::event::{AudioSink, GameEvent};

pub struct TerminalBell {
    enabled: bool,
}

impl TerminalBell {
    pub fn new(enabled: bool) -> Self {
        TerminalBell { enabled }
    }

    fn ring(&self) {
        if !self.enabled {
            return;
        }
        let mut out = io::stdout();
        let _ = out.write_all(b"\x07").and_then(|_| out.flush());
    }
}

/// Does this cue ring the bell?
fn audible(event: GameEvent) -> bool {
    matches!(event, GameEvent::Hit | GameEvent::GameOver)
}

impl AudioSink for TerminalBell {
    fn play(&mut self, event: GameEvent) {
        log::debug!("cue {event:?}");
        if audible(event) {
            self.ring();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_hit_and_game_over_ring() {
        assert!(audible(GameEvent::Hit));
        assert!(audible(GameEvent::GameOver));
        assert!(!audible(GameEvent::Jump));
        assert!(!audible(GameEvent::IntroCue(2)));
        assert!(!audible(GameEvent::LevelWon));
    }

    #[test]
    fn disabled_bell_is_silent() {
        let mut bell = TerminalBell::new(false);
        bell.play(GameEvent::Hit);
    }
}
