//! Colors with straight alpha.

use serde::{Deserialize, Serialize};

/// An sRGB color with an alpha channel in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);

    /// An opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Same color with a different alpha, clamped to `[0, 1]`.
    pub fn with_alpha(self, a: f64) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Parse `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#')?;
        if !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();

        match hex.len() {
            6 => Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Some(Self {
                r: channel(0)?,
                g: channel(2)?,
                b: channel(4)?,
                a: f64::from(channel(6)?) / 255.0,
            }),
            _ => None,
        }
    }

    /// Composite over an opaque black background.
    ///
    /// Terminals have no alpha, so translucency becomes darkening.
    pub fn over_black(&self) -> (u8, u8, u8) {
        let a = self.a.clamp(0.0, 1.0);
        let scale = |c: u8| (f64::from(c) * a).round() as u8;
        (scale(self.r), scale(self.g), scale(self.b))
    }
}

/// Fill color used for the dots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DotTheme {
    #[default]
    White,
    Cyan,
    Gold,
    Mint,
}

impl DotTheme {
    /// Cycle to the next theme.
    pub fn next(&self) -> Self {
        match self {
            DotTheme::White => DotTheme::Cyan,
            DotTheme::Cyan => DotTheme::Gold,
            DotTheme::Gold => DotTheme::Mint,
            DotTheme::Mint => DotTheme::White,
        }
    }

    /// The fill color for this theme.
    pub fn color(self) -> Rgba {
        match self {
            DotTheme::White => Rgba::WHITE,
            DotTheme::Cyan => Rgba::rgb(90, 220, 255),
            DotTheme::Gold => Rgba::rgb(255, 241, 83),
            DotTheme::Mint => Rgba::rgb(12, 205, 112),
        }
    }
}
