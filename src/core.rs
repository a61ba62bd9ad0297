//! Shared geometry and color vocabulary for the scene compiler and backends.

pub use kurbo::{Affine, BezPath, Point};

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

/// Straight (non-premultiplied) RGBA8 color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse `#rrggbb` or `#rgb`. Producer-emitted colors are untrusted, so
    /// this returns `None` instead of an error; callers substitute a palette
    /// default.
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.trim().strip_prefix('#')?;
        match hex.len() {
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                Some(Self::opaque(r, g, b))
            }
            3 => {
                let d = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok();
                let (r, g, b) = (d(0)?, d(1)?, d(2)?);
                Some(Self::opaque(r * 17, g * 17, b * 17))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_parses_long_form() {
        assert_eq!(
            Rgba8::from_hex("#3b82f6"),
            Some(Rgba8::opaque(0x3b, 0x82, 0xf6))
        );
    }

    #[test]
    fn hex_parses_short_form() {
        assert_eq!(Rgba8::from_hex("#fff"), Some(Rgba8::opaque(255, 255, 255)));
    }

    #[test]
    fn hex_rejects_garbage() {
        assert_eq!(Rgba8::from_hex("blue"), None);
        assert_eq!(Rgba8::from_hex("#12345"), None);
        assert_eq!(Rgba8::from_hex("#zzzzzz"), None);
    }
}
