use serde::{Deserialize, Serialize};
use std::fmt;

/// RGBA color used for notification backgrounds and accents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// Perceived brightness check (YIQ weights). Light backgrounds want dark text.
    pub fn is_light(&self) -> bool {
        let darkness =
            1.0 - (0.299 * self.r as f32 + 0.587 * self.g as f32 + 0.114 * self.b as f32) / 255.0;
        darkness < 0.4
    }

    /// Hue-independent saturation and lightness in `0.0..=1.0` (HSL).
    pub fn saturation_lightness(&self) -> (f32, f32) {
        let r = self.r as f32 / 255.0;
        let g = self.g as f32 / 255.0;
        let b = self.b as f32 / 255.0;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let lightness = (max + min) / 2.0;
        let delta = max - min;
        let saturation = if delta == 0.0 {
            0.0
        } else {
            delta / (1.0 - (2.0 * lightness - 1.0).abs())
        };
        (saturation.clamp(0.0, 1.0), lightness)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::TRANSPARENT
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_transparent() {
            write!(f, "transparent")
        } else {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        }
    }
}

/// Text shade for a notification drawn on `background`.
///
/// A transparent background shows the platform's own notification surface, so
/// the platform default applies.
pub fn use_dark_text(background: Color, platform_dark_text: bool) -> bool {
    if background.is_transparent() {
        platform_dark_text
    } else {
        background.is_light()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_light_and_dark_backgrounds() {
        assert!(Color::WHITE.is_light());
        assert!(Color::rgb(250, 230, 120).is_light());
        assert!(!Color::BLACK.is_light());
        assert!(!Color::rgb(40, 40, 120).is_light());
    }

    #[test]
    fn test_transparent_follows_platform() {
        assert!(use_dark_text(Color::TRANSPARENT, true));
        assert!(!use_dark_text(Color::TRANSPARENT, false));
        assert!(!use_dark_text(Color::BLACK, true));
        assert!(use_dark_text(Color::WHITE, false));
    }

    #[test]
    fn test_saturation() {
        let (s, l) = Color::rgb(255, 0, 0).saturation_lightness();
        assert!((s - 1.0).abs() < 1e-4);
        assert!((l - 0.5).abs() < 1e-4);

        let (s, _) = Color::rgb(128, 128, 128).saturation_lightness();
        assert_eq!(s, 0.0);
    }

    #[test]
    fn test_display() {
        assert_eq!(Color::rgb(255, 16, 0).to_string(), "#ff1000");
        assert_eq!(Color::TRANSPARENT.to_string(), "transparent");
    }
}
