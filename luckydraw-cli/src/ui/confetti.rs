use luckydraw_engine::DrawView;
use rand::Rng;
use ratatui::{buffer::Buffer, layout::Rect, style::Color, widgets::Widget};
use std::time::{Duration, Instant};

const PIECES: usize = 500;
const LIFETIME: Duration = Duration::from_secs(3);
const GLYPHS: [&str; 6] = ["*", "+", "o", "•", "◆", "▪"];
const COLORS: [Color; 7] = [
    Color::Red,
    Color::Yellow,
    Color::Green,
    Color::Cyan,
    Color::Blue,
    Color::Magenta,
    Color::LightRed,
];

#[derive(Debug, Clone)]
struct Piece {
    /// Horizontal position as a fraction of the width
    x: f32,
    /// Start height in rows above the top edge
    lead: f32,
    /// Rows per second
    speed: f32,
    drift: f32,
    glyph: &'static str,
    color: Color,
}

/// One-shot burst of falling pieces, shown when a winner settles.
#[derive(Debug, Default)]
pub struct Confetti {
    pieces: Vec<Piece>,
    started: Option<Instant>,
    /// Settle the last burst was fired for
    celebrated: u64,
}

impl Confetti {
    /// Fires one burst per new winner and clears the screen once the
    /// celebration is over.
    pub fn follow(&mut self, view: &DrawView, now: Instant) {
        if !view.celebrate {
            self.stop();
        } else if view.settle_count != self.celebrated {
            self.burst(now);
        }
        self.celebrated = view.settle_count;
    }

    pub fn burst(&mut self, now: Instant) {
        let mut rng = rand::thread_rng();
        self.pieces = (0..PIECES)
            .map(|_| Piece {
                x: rng.gen_range(0.0..1.0),
                lead: rng.gen_range(0.0..30.0),
                speed: rng.gen_range(8.0..24.0),
                drift: rng.gen_range(-0.05..0.05),
                glyph: GLYPHS[rng.gen_range(0..GLYPHS.len())],
                color: COLORS[rng.gen_range(0..COLORS.len())],
            })
            .collect();
        self.started = Some(now);
    }

    pub fn stop(&mut self) {
        self.pieces.clear();
        self.started = None;
    }

    pub fn is_active(&self, now: Instant) -> bool {
        self.started
            .is_some_and(|started| now.saturating_duration_since(started) < LIFETIME)
    }

    pub fn frame(&self, now: Instant) -> ConfettiFrame<'_> {
        let elapsed = self
            .started
            .map(|started| now.saturating_duration_since(started))
            .unwrap_or_default();

        ConfettiFrame {
            pieces: if self.is_active(now) { self.pieces.as_slice() } else { &[] },
            elapsed: elapsed.as_secs_f32(),
        }
    }
}

/// Confetti positions at one instant
pub struct ConfettiFrame<'a> {
    pieces: &'a [Piece],
    elapsed: f32,
}

impl Widget for ConfettiFrame<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        for piece in self.pieces {
            let row = piece.speed * self.elapsed - piece.lead;
            let col = (piece.x + piece.drift * self.elapsed) * f32::from(area.width);
            if row < 0.0 || col < 0.0 {
                continue;
            }

            let (row, col) = (row as u16, col as u16);
            if row >= area.height || col >= area.width {
                continue;
            }

            if let Some(cell) = buf.cell_mut((area.x + col, area.y + row)) {
                cell.set_symbol(piece.glyph).set_fg(piece.color);
            }
        }
    }
}
