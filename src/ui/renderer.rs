/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Rasterise the `SceneView` into the `front` buffer (grid of Cell)
///   2. Compare each cell with `back` (previous frame)
///   3. Queue terminal commands only for cells that changed, flush once
///   4. Swap front/back
///
/// The playfield is continuous (pixels, y down); `Viewport` scales it onto
/// the character grid, keeping its aspect for roughly 1:2 terminal cells.
///
/// Screen rows:
///   0          HUD (score, lives, level) - hidden in Victory
///   1..h-1     playfield
///   h-1        key help

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::entity::PlayerState;
use crate::domain::geometry::Rect;
use crate::domain::physics::surface_height_at;
use crate::sim::world::{Phase, SceneView};

// ── Palette ──

const BASE_BG: Color = Color::Rgb { r: 16, g: 16, b: 28 };
const GIRDER: Color = Color::Rgb { r: 230, g: 60, b: 90 };
const LADDER: Color = Color::Rgb { r: 80, g: 200, b: 230 };
const KONG: Color = Color::Rgb { r: 160, g: 90, b: 40 };
const GOAL: Color = Color::Rgb { r: 255, g: 120, b: 200 };
const OIL: Color = Color::Rgb { r: 60, g: 90, b: 220 };
const BARREL: Color = Color::Rgb { r: 200, g: 140, b: 60 };
const BARREL_FALLING: Color = Color::Rgb { r: 255, g: 170, b: 90 };
const TEXT_HI: Color = Color::Rgb { r: 255, g: 220, b: 50 };

/// Barrel glyph per quarter turn of its roll angle.
const BARREL_GLYPHS: [char; 4] = ['◐', '◓', '◑', '◒'];

/// Width/height of one terminal cell, roughly.
const CELL_ASPECT: f32 = 0.5;

const HUD_ROW: usize = 0;
const FIELD_ROW: usize = 1;
const HELP: &str = "←→ move  ↑↓ climb  SPACE jump  R restart  Q quit";

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: BASE_BG };

    /// Differs from every real cell; forces a full repaint when put in `back`.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color) -> Self {
        Cell { ch, fg, bg: BASE_BG }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            *self = FrameBuffer::new(w, h);
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: i32, y: i32, cell: Cell) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.cells[y as usize * self.width + x as usize] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    fn put_str(&mut self, x: i32, y: i32, s: &str, fg: Color) {
        for (i, ch) in s.chars().enumerate() {
            self.set(x + i as i32, y, Cell::new(ch, fg));
        }
    }

    fn put_centered(&mut self, center_col: i32, y: i32, s: &str, fg: Color) {
        let x = center_col - s.chars().count() as i32 / 2;
        self.put_str(x, y, s, fg);
    }

    fn fill(&mut self, (c0, c1, r0, r1): (i32, i32, i32, i32), ch: char, fg: Color) {
        for y in r0..r1 {
            for x in c0..c1 {
                self.set(x, y, Cell::new(ch, fg));
            }
        }
    }

    #[cfg(test)]
    fn row_text(&self, y: usize) -> String {
        (0..self.width).map(|x| self.get(x, y).ch).collect()
    }
}

// ── Viewport: playfield pixels → terminal cells ──

#[derive(Clone, Copy, Debug)]
struct Viewport {
    col0: i32,
    row0: i32,
    cols: i32,
    rows: i32,
    sx: f32,
    sy: f32,
}

impl Viewport {
    /// Largest aspect-correct playfield that fits between the HUD and help rows.
    fn fit(term_w: usize, term_h: usize, world_w: f32, world_h: f32) -> Self {
        let avail_rows = term_h.saturating_sub(FIELD_ROW + 1).max(1) as f32;
        let avail_cols = term_w.max(1) as f32;
        let cols_per_row = world_w / world_h / CELL_ASPECT;

        let (cols, rows) = if avail_rows * cols_per_row <= avail_cols {
            ((avail_rows * cols_per_row).floor().max(1.0), avail_rows)
        } else {
            (avail_cols, (avail_cols / cols_per_row).floor().max(1.0))
        };

        Viewport {
            col0: ((avail_cols - cols) / 2.0) as i32,
            row0: FIELD_ROW as i32,
            cols: cols as i32,
            rows: rows as i32,
            sx: cols / world_w,
            sy: rows / world_h,
        }
    }

    fn col(&self, x: f32) -> i32 {
        self.col0 + (x * self.sx).floor() as i32
    }

    fn row(&self, y: f32) -> i32 {
        self.row0 + (y * self.sy).floor() as i32
    }

    fn center_col(&self) -> i32 {
        self.col0 + self.cols / 2
    }

    /// Playfield x at the middle of terminal column `c`.
    fn x_at(&self, c: i32) -> f32 {
        ((c - self.col0) as f32 + 0.5) / self.sx
    }

    /// Cell range `(c0, c1, r0, r1)` (end-exclusive) covered by a body.
    /// The bottom row is the one *above* the row its feet stand on, so a
    /// body never overdraws the girder under it. Always at least one cell.
    fn cells_of(&self, r: &Rect) -> (i32, i32, i32, i32) {
        let c0 = self.col(r.left());
        let c1 = (self.col0 + (r.right() * self.sx).ceil() as i32).max(c0 + 1);
        let r1 = self.row(r.bottom());
        let r0 = self.row(r.top()).min(r1 - 1);
        (c0, c1, r0, r1)
    }
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
    /// Terminal accepted the keyboard enhancement push (reports key releases).
    key_releases: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
            key_releases: false,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(BASE_BG),
            Clear(ClearType::All)
        )?;
        // Optional: without it, held keys fall back to the hold timeout.
        self.key_releases = matches!(terminal::supports_keyboard_enhancement(), Ok(true))
            && execute!(
                self.writer,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )
            .is_ok();
        log::info!("key release events: {}", self.key_releases);
        self.sync_size()?;
        Ok(())
    }

    /// True once `init` has turned on key release reporting.
    pub fn key_releases(&self) -> bool {
        self.key_releases
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        if self.key_releases {
            execute!(self.writer, PopKeyboardEnhancementFlags)?;
            self.key_releases = false;
        }
        execute!(self.writer, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, scene: &SceneView) -> io::Result<()> {
        self.sync_size()?;

        if self.last_phase != Some(scene.phase) {
            self.back.cells.fill(Cell::INVALID);
            self.last_phase = Some(scene.phase);
        }

        self.front.clear();
        compose(&mut self.front, scene);
        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    /// Track terminal size; a change forces a full repaint.
    fn sync_size(&mut self) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        let (tw, th) = (tw as usize, th as usize);
        if tw != self.term_w || th != self.term_h {
            self.term_w = tw;
            self.term_h = th;
            self.front.resize(tw, th);
            self.back.resize(tw, th);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(BASE_BG), Clear(ClearType::All))?;
        }
        Ok(())
    }

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }
                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }
}

// ══════════════════════════════════════════════════════════════
// Scene composition (pure: SceneView → FrameBuffer)
// ══════════════════════════════════════════════════════════════

fn compose(fb: &mut FrameBuffer, scene: &SceneView) {
    let vp = Viewport::fit(fb.width, fb.height, scene.width, scene.height);

    compose_terrain(fb, &vp, scene);
    fb.fill(vp.cells_of(&scene.oil_drum), 'U', OIL);
    fb.fill(vp.cells_of(&scene.kong), 'K', KONG);
    fb.fill(vp.cells_of(&scene.goal), 'P', GOAL);

    for b in scene.barrels {
        let quarter = (b.roll_angle / 90.0) as usize % BARREL_GLYPHS.len();
        let color = if b.is_rolling() { BARREL } else { BARREL_FALLING };
        fb.fill(vp.cells_of(&b.rect), BARREL_GLYPHS[quarter], color);
    }

    let (glyph, color) = match scene.player_state {
        PlayerState::Grounded => ('@', Color::White),
        PlayerState::Airborne => ('@', TEXT_HI),
        PlayerState::Climbing | PlayerState::OnLadderIdle => ('&', LADDER),
    };
    fb.fill(vp.cells_of(&scene.player), glyph, color);

    if scene.phase != Phase::Victory {
        compose_hud(fb, scene);
    }
    compose_overlay(fb, &vp, scene);
    let help_row = fb.height as i32 - 1;
    fb.put_str(0, help_row, HELP, Color::DarkGrey);
}

/// Ladders first, then girder surfaces over them.
fn compose_terrain(fb: &mut FrameBuffer, vp: &Viewport, scene: &SceneView) {
    for l in scene.ladders {
        let c = vp.col(l.center_x);
        for r in vp.row(l.top)..vp.row(l.bottom) {
            fb.set(c, r, Cell::new('H', LADDER));
        }
    }

    for c in vp.col0..vp.col0 + vp.cols {
        let x = vp.x_at(c);
        for g in scene.girders.iter().filter(|g| x >= g.left && x < g.right) {
            fb.set(c, vp.row(surface_height_at(g, x)), Cell::new('=', GIRDER));
        }
    }
}

fn compose_hud(fb: &mut FrameBuffer, scene: &SceneView) {
    let hud = format!(
        "SCORE {:>7}   LIVES {}   LEVEL {}: {}",
        scene.score as u64, scene.lives, scene.level_number, scene.level_name
    );
    fb.put_str(0, HUD_ROW as i32, &hud, Color::White);
}

fn compose_overlay(fb: &mut FrameBuffer, vp: &Viewport, scene: &SceneView) {
    let cx = vp.center_col();
    let mid = vp.row0 + vp.rows / 2;
    let final_score = format!("Final Score: {}", scene.score as u64);

    match scene.phase {
        Phase::Intro if !scene.intro_label.is_empty() => {
            fb.put_centered(cx, mid, &scene.intro_label, TEXT_HI);
        }
        Phase::Lost => {
            fb.put_centered(cx, mid - 2, "GAME OVER!", Color::Red);
            fb.put_centered(cx, mid, &final_score, Color::White);
            fb.put_centered(cx, mid + 2, "Press R to Restart", Color::Green);
        }
        Phase::Victory => {
            fb.put_centered(cx, mid - 2, "CONGRATULATIONS!", TEXT_HI);
            fb.put_centered(cx, mid, &final_score, Color::White);
            fb.put_centered(cx, mid + 2, "Press R to Restart", Color::Green);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::sim::world::Session;

    fn frame(session: &Session) -> FrameBuffer {
        let mut fb = FrameBuffer::new(100, 50);
        compose(&mut fb, &session.scene());
        fb
    }

    fn all_text(fb: &FrameBuffer) -> String {
        (0..fb.height).map(|y| fb.row_text(y)).collect::<Vec<_>>().join("\n")
    }

    #[test]
    fn key_releases_off_until_init() {
        assert!(!Renderer::new().key_releases());
    }

    #[test]
    fn viewport_keeps_aspect_and_fits() {
        let vp = Viewport::fit(100, 50, 600.0, 800.0);
        assert_eq!(vp.rows, 48);
        assert_eq!(vp.cols, 72);
        assert!(vp.col0 + vp.cols <= 100);

        // narrow terminal: width is the limit
        let vp = Viewport::fit(30, 50, 600.0, 800.0);
        assert_eq!(vp.cols, 30);
        assert!(vp.rows <= 48);
    }

    #[test]
    fn body_stops_above_its_girder_row() {
        let vp = Viewport::fit(100, 50, 600.0, 800.0);
        let player = Rect::from_midbottom(60.0, 740.0, 28.0, 28.0);
        let (_, _, r0, r1) = vp.cells_of(&player);
        assert!(r0 < r1);
        assert_eq!(r1, vp.row(740.0));
    }

    #[test]
    fn intro_frame_shows_hud_label_and_terrain() {
        let s = Session::new(&GameConfig::default(), 1);
        let fb = frame(&s);
        assert!(fb.row_text(HUD_ROW).contains("LIVES 3"));
        assert!(fb.row_text(HUD_ROW).contains("25m - Rampage"));
        let text = all_text(&fb);
        assert!(text.contains("LEVEL 1"));
        assert!(text.contains('='));
        assert!(text.contains('H'));
        assert!(text.contains('@'));
        assert!(text.contains('K'));
    }

    #[test]
    fn player_is_drawn_on_the_floor() {
        let s = Session::new(&GameConfig::default(), 1);
        let fb = frame(&s);
        let vp = Viewport::fit(100, 50, 600.0, 800.0);
        let floor = vp.row(740.0) as usize;
        assert!(fb.row_text(floor - 1).contains('@'));
        assert!(fb.row_text(floor).contains('='));
    }

    #[test]
    fn lost_overlay() {
        let mut s = Session::new(&GameConfig::default(), 1);
        s.phase = Phase::Lost;
        s.score = 321.9;
        let text = all_text(&frame(&s));
        assert!(text.contains("GAME OVER!"));
        assert!(text.contains("Final Score: 321"));
        assert!(text.contains("Press R to Restart"));
    }

    #[test]
    fn victory_hides_hud() {
        let mut s = Session::new(&GameConfig::default(), 1);
        s.phase = Phase::Victory;
        let fb = frame(&s);
        assert!(!fb.row_text(HUD_ROW).contains("SCORE"));
        assert!(all_text(&fb).contains("CONGRATULATIONS!"));
    }
}
