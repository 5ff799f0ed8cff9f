/// Events emitted during a simulation step.
/// The presentation layer consumes these for sound cues; the simulation
/// never waits on, or even looks at, what a sink does with them.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameEvent {
    Jump,
    /// Player lost a life (barrel hit or fell off the bottom).
    Hit,
    /// First tick of intro sub-stage `n` (0 = level label, 1 = READY, 2 = GO, 3 = pause).
    IntroCue(usize),
    LevelWon,
    GameOver,
}

/// Fire-and-forget consumer of `GameEvent`s.
pub trait AudioSink {
    fn play(&mut self, event: GameEvent);
}

/// Hand a tick's events to a sink, in emission order.
pub fn dispatch(sink: &mut dyn AudioSink, events: &[GameEvent]) {
    for &ev in events {
        sink.play(ev);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Recorder(Vec<GameEvent>);

    struct Silent;

    impl AudioSink for Silent {
        fn play(&mut self, _event: GameEvent) {}
    }

    impl AudioSink for Recorder {
        fn play(&mut self, event: GameEvent) {
            self.0.push(event);
        }
    }

    #[test]
    fn dispatch_preserves_order() {
        let mut rec = Recorder(vec![]);
        dispatch(&mut rec, &[GameEvent::Jump, GameEvent::Hit, GameEvent::GameOver]);
        assert_eq!(rec.0, vec![GameEvent::Jump, GameEvent::Hit, GameEvent::GameOver]);
    }

    #[test]
    fn silent_sink_tolerates_anything() {
        dispatch(&mut Silent, &[GameEvent::IntroCue(0), GameEvent::LevelWon]);
    }
}
