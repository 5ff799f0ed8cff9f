/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::fs::File;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use config::GameConfig;
use sim::event::{dispatch, AudioSink};
use sim::step;
use sim::world::Session;
use ui::audio::TerminalBell;
use ui::input::InputState;
use ui::renderer::Renderer;

const FRAME_SLEEP: Duration = Duration::from_millis(2);
/// Ticks the clock may fall behind before the backlog is dropped.
const MAX_TICK_BACKLOG: u32 = 5;
const LOG_ENV: &str = "GIRDERCLIMB_LOG";
const DEFAULT_LOG_FILE: &str = "girderclimb.log";

fn main() {
    init_logging();

    let config = GameConfig::load();
    let seed = resolve_seed(config.general.seed);
    log::info!("seed {seed}, {} Hz", config.session.tick_rate_hz);

    let mut session = Session::new(&config, seed);
    let mut renderer = Renderer::new();

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let mut audio = TerminalBell::new(config.general.bell);
    let result = game_loop(&mut session, &mut renderer, &mut audio);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        log::error!("game loop stopped: {e}");
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Girder Climb!");
    println!("Final Score: {}", session.score as u64);
}

/// One simulation step per tick period; render every pass.
fn game_loop(
    session: &mut Session,
    renderer: &mut Renderer,
    audio: &mut dyn AudioSink,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    kb.honor_release = renderer.key_releases();
    let tick_rate = Duration::from_secs_f32(session.rules.tick_ms() / 1000.0);
    let mut last_tick = Instant::now();

    loop {
        kb.drain_events();
        if kb.quit_requested() {
            log::info!("quit");
            break;
        }

        let now = Instant::now();
        if now.duration_since(last_tick) >= tick_rate {
            let events = step::step(session, kb.frame_input());
            dispatch(audio, &events);
            last_tick = next_tick(last_tick, tick_rate, now);
        }

        renderer.render(&session.scene())?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

/// Tick deadlines advance in fixed steps, so render time does not slow the
/// game clock. After a stall (terminal suspended, slow frame) the clock
/// resyncs instead of replaying every missed tick.
fn next_tick(last_tick: Instant, tick_rate: Duration, now: Instant) -> Instant {
    let next = last_tick + tick_rate;
    if now.saturating_duration_since(next) > tick_rate * MAX_TICK_BACKLOG {
        now
    } else {
        next
    }
}

/// Log to a file: the terminal belongs to the renderer. Initialised before
/// the config loads so its warnings land in the log too.
fn init_logging() {
    let path = std::env::var(LOG_ENV).unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
    match File::create(&path) {
        Ok(file) => {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
                .target(env_logger::Target::Pipe(Box::new(file)))
                .init();
        }
        Err(e) => eprintln!("logging disabled: cannot create {path}: {e}"),
    }
}

/// 0 in the config means "different every run".
fn resolve_seed(configured: u64) -> u64 {
    if configured != 0 {
        return configured;
    }
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(1)
}
