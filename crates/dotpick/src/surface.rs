//! Terminal rendering of the dot field.
//!
//! Each terminal cell is a 2x4 grid of Braille dots, so the engine sees a
//! virtual pixel surface of `cell_width x cell_height` pixels per cell and
//! circles are rasterized onto the sub-cell dots.

use dotpick_core::{Area, Point, Rgba, Surface};
use ratatui::{
    style::{Color, Style},
    text::{Line, Span},
};

const BRAILLE_BASE: u32 = 0x2800;
const DOTS_X: u32 = 2;
const DOTS_Y: u32 = 4;

/// Bit for the dot at `(col, row)` within a Braille cell.
const fn braille_bit(col: u32, row: u32) -> u8 {
    match (col, row) {
        (0, 0) => 0x01,
        (0, 1) => 0x02,
        (0, 2) => 0x04,
        (1, 0) => 0x08,
        (1, 1) => 0x10,
        (1, 2) => 0x20,
        (0, 3) => 0x40,
        _ => 0x80,
    }
}

/// A [`Surface`] backed by a grid of Braille cells.
#[derive(Debug, Clone)]
pub struct TerminalSurface {
    columns: u16,
    rows: u16,
    cell_width: u32,
    cell_height: u32,
    /// Lit Braille dots per cell.
    dots: Vec<u8>,
    /// Color of the last circle that lit each cell.
    colors: Vec<(u8, u8, u8)>,
}

impl TerminalSurface {
    pub fn new(cell_width: u32, cell_height: u32) -> Self {
        Self {
            columns: 0,
            rows: 0,
            cell_width: cell_width.max(1),
            cell_height: cell_height.max(1),
            dots: Vec::new(),
            colors: Vec::new(),
        }
    }

    /// Match the surface to a terminal region of `columns x rows` cells.
    pub fn resize(&mut self, columns: u16, rows: u16) {
        if (columns, rows) == (self.columns, self.rows) {
            return;
        }
        self.columns = columns;
        self.rows = rows;
        let cells = usize::from(columns) * usize::from(rows);
        self.dots = vec![0; cells];
        self.colors = vec![(0, 0, 0); cells];
    }

    fn dot_pitch(&self) -> (f64, f64) {
        (
            f64::from(self.cell_width) / f64::from(DOTS_X),
            f64::from(self.cell_height) / f64::from(DOTS_Y),
        )
    }

    fn light(&mut self, dot_x: i64, dot_y: i64, color: (u8, u8, u8)) {
        let max_x = i64::from(self.columns) * i64::from(DOTS_X);
        let max_y = i64::from(self.rows) * i64::from(DOTS_Y);
        if dot_x < 0 || dot_y < 0 || dot_x >= max_x || dot_y >= max_y {
            return;
        }
        let (dot_x, dot_y) = (dot_x as u32, dot_y as u32);
        let cell = (dot_y / DOTS_Y) as usize * usize::from(self.columns) + (dot_x / DOTS_X) as usize;
        self.dots[cell] |= braille_bit(dot_x % DOTS_X, dot_y % DOTS_Y);
        self.colors[cell] = color;
    }

    /// Braille character shown in the cell at `(column, row)`, if any dot is lit.
    pub fn cell(&self, column: u16, row: u16) -> Option<(char, (u8, u8, u8))> {
        if column >= self.columns || row >= self.rows {
            return None;
        }
        let index = usize::from(row) * usize::from(self.columns) + usize::from(column);
        match self.dots[index] {
            0 => None,
            bits => char::from_u32(BRAILLE_BASE + u32::from(bits)).map(|ch| (ch, self.colors[index])),
        }
    }

    /// The frame as styled lines, one per terminal row.
    pub fn lines(&self) -> Vec<Line<'static>> {
        (0..self.rows)
            .map(|y| {
                let spans: Vec<Span> = (0..self.columns)
                    .map(|x| match self.cell(x, y) {
                        Some((ch, (r, g, b))) => {
                            Span::styled(ch.to_string(), Style::new().fg(Color::Rgb(r, g, b)))
                        }
                        None => Span::raw(" "),
                    })
                    .collect();
                Line::from(spans)
            })
            .collect()
    }
}

impl Surface for TerminalSurface {
    fn area(&self) -> Area {
        Area::new(
            f64::from(self.columns) * f64::from(self.cell_width),
            f64::from(self.rows) * f64::from(self.cell_height),
        )
    }

    fn clear(&mut self) {
        self.dots.fill(0);
    }

    fn draw_circle(&mut self, point: &Point, color: Rgba) {
        let rgb = color.over_black();
        if rgb == (0, 0, 0) {
            return;
        }
        let (pitch_x, pitch_y) = self.dot_pitch();
        let radius = point.z.max(0.0);

        // Dot centres sit at (i + 0.5) * pitch.
        let first_x = ((point.x - radius) / pitch_x - 0.5).ceil() as i64;
        let last_x = ((point.x + radius) / pitch_x - 0.5).floor() as i64;
        let first_y = ((point.y - radius) / pitch_y - 0.5).ceil() as i64;
        let last_y = ((point.y + radius) / pitch_y - 0.5).floor() as i64;

        let mut lit = false;
        for dot_y in first_y..=last_y {
            let dy = (dot_y as f64 + 0.5) * pitch_y - point.y;
            for dot_x in first_x..=last_x {
                let dx = (dot_x as f64 + 0.5) * pitch_x - point.x;
                if dx * dx + dy * dy <= radius * radius {
                    self.light(dot_x, dot_y, rgb);
                    lit = true;
                }
            }
        }

        // Circles smaller than a dot still show up as one dot.
        if !lit {
            self.light(
                (point.x / pitch_x).floor() as i64,
                (point.y / pitch_y).floor() as i64,
                rgb,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot(x: f64, y: f64, r: f64) -> Point {
        Point {
            z: r,
            ..Point::at(x, y)
        }
    }

    #[test]
    fn test_area_in_virtual_pixels() {
        let mut surface = TerminalSurface::new(8, 16);
        surface.resize(10, 5);
        assert_eq!(surface.area(), Area::new(80.0, 80.0));
    }

    #[test]
    fn test_small_circle_lights_one_dot() {
        let mut surface = TerminalSurface::new(8, 16);
        surface.resize(4, 4);
        surface.draw_circle(&dot(1.0, 1.0, 1.0), Rgba::WHITE);
        assert_eq!(surface.cell(0, 0), Some(('\u{2801}', (255, 255, 255))));
        assert_eq!(surface.cell(1, 0), None);
    }

    #[test]
    fn test_large_circle_fills_cell() {
        let mut surface = TerminalSurface::new(8, 16);
        surface.resize(3, 3);
        // Centre of cell (1, 1), covering all of its dot centres.
        surface.draw_circle(&dot(12.0, 24.0, 10.0), Rgba::WHITE);
        assert_eq!(surface.cell(1, 1).map(|(ch, _)| ch), Some('\u{28FF}'));
    }

    #[test]
    fn test_alpha_darkens_color() {
        let mut surface = TerminalSurface::new(8, 16);
        surface.resize(2, 2);
        surface.draw_circle(&dot(1.0, 1.0, 1.0), Rgba::WHITE.with_alpha(0.5));
        assert_eq!(surface.cell(0, 0).map(|(_, c)| c), Some((128, 128, 128)));
    }

    #[test]
    fn test_offscreen_circle_is_clipped() {
        let mut surface = TerminalSurface::new(8, 16);
        surface.resize(2, 2);
        surface.draw_circle(&dot(-50.0, 500.0, 4.0), Rgba::WHITE);
        assert!((0..2).all(|x| (0..2).all(|y| surface.cell(x, y).is_none())));
    }

    #[test]
    fn test_clear_and_lines() {
        let mut surface = TerminalSurface::new(8, 16);
        surface.resize(3, 2);
        surface.draw_circle(&dot(1.0, 1.0, 1.0), Rgba::WHITE);
        let lines = surface.lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].spans.len(), 3);
        assert_eq!(lines[0].spans[0].content, "\u{2801}");

        surface.clear();
        assert_eq!(surface.cell(0, 0), None);
    }
}
