//! Firework color palette.

use dotpick_core::Rgba;

/// Colors the firework discs cycle through.
pub const FIREWORK_COLORS: [Rgba; 4] = [
    Rgba::rgb(0xf3, 0x4d, 0x23),
    Rgba::rgb(0xff, 0xf1, 0x53),
    Rgba::rgb(0xb7, 0x47, 0xd5),
    Rgba::rgb(0x0c, 0xcd, 0x70),
];

/// Cycles through [`FIREWORK_COLORS`], advancing before each pick.
#[derive(Debug, Clone, Default)]
pub struct Palette {
    index: usize,
}

impl Palette {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance and return the next color.
    pub fn next_color(&mut self) -> Rgba {
        self.index = (self.index + 1) % FIREWORK_COLORS.len();
        FIREWORK_COLORS[self.index]
    }

    /// The color picked last, or the first color before any pick.
    pub fn current(&self) -> Rgba {
        FIREWORK_COLORS[self.index]
    }
}
