//! RGBA colors for node backgrounds and effects

/// 8-bit RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Fully transparent black, the default node color
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    /// Create an opaque color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b, a: 255 }
    }

    /// Create a color with alpha
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color { r, g, b, a }
    }

    /// Parse `#rrggbb` or `#rrggbbaa` (leading `#` optional)
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();

        match hex.len() {
            6 => Some(Color::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Some(Color::rgba(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => None,
        }
    }

    /// Same color with a different alpha
    pub const fn with_alpha(self, a: u8) -> Self {
        Color { a, ..self }
    }

    /// Whether drawing with this color has no visible effect
    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// Normalized `[r, g, b, a]` in `0.0..=1.0`
    pub fn to_f32_array(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }

    /// Closest of the 16 basic ANSI colors (8-15 are the bright variants)
    pub fn to_ansi16(self) -> u8 {
        let (r, g, b) = (self.r, self.g, self.b);
        let index = u8::from(r >= 128) | u8::from(g >= 128) << 1 | u8::from(b >= 128) << 2;
        if r.max(g).max(b) > 191 {
            index + 8
        } else {
            index
        }
    }

    /// Closest index in the xterm 256-color palette
    pub fn to_ansi256(self) -> u8 {
        let (r, g, b) = (self.r, self.g, self.b);
        if r == g && g == b {
            if r < 8 {
                return 16;
            }
            if r > 248 {
                return 231;
            }
            return ((r - 8) / 10) + 232;
        }

        let r_idx = (r as u16 * 5 / 255) as u8;
        let g_idx = (g as u16 * 5 / 255) as u8;
        let b_idx = (b as u16 * 5 / 255) as u8;

        16 + 36 * r_idx + 6 * g_idx + b_idx
    }
}

impl From<(u8, u8, u8)> for Color {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Color::rgb(r, g, b)
    }
}

impl From<(u8, u8, u8, u8)> for Color {
    fn from((r, g, b, a): (u8, u8, u8, u8)) -> Self {
        Color::rgba(r, g, b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex() {
        assert_eq!(Color::from_hex("#ff8000"), Some(Color::rgb(255, 128, 0)));
        assert_eq!(
            Color::from_hex("10203040"),
            Some(Color::rgba(0x10, 0x20, 0x30, 0x40))
        );
        assert_eq!(Color::from_hex("#fff"), None);
        assert_eq!(Color::from_hex("#gg0000"), None);
    }

    #[test]
    fn test_to_ansi256() {
        assert_eq!(Color::rgb(0, 0, 0).to_ansi256(), 16);
        assert_eq!(Color::rgb(255, 255, 255).to_ansi256(), 231);
        assert_eq!(Color::rgb(255, 0, 0).to_ansi256(), 196);
    }

    #[test]
    fn test_to_ansi16() {
        assert_eq!(Color::rgb(0, 0, 0).to_ansi16(), 0);
        assert_eq!(Color::rgb(128, 128, 128).to_ansi16(), 7);
        assert_eq!(Color::rgb(255, 0, 0).to_ansi16(), 9);
        assert_eq!(Color::WHITE.to_ansi16(), 15);
    }

    #[test]
    fn test_default_is_transparent() {
        assert!(Color::default().is_transparent());
        assert_eq!(Color::WHITE.to_f32_array(), [1.0, 1.0, 1.0, 1.0]);
    }
}
