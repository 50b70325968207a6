use std::fmt;
use serde::{Deserialize, Serialize};
use crate::math::Vec3;

/// Linear RGB color with components in [0, 1]
///
/// Serialized as a `#rrggbb` hex string.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0.0, g: 0.0, b: 0.0 };

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Build from a packed `0xRRGGBB` value
    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f32 / 255.0,
            g: ((hex >> 8) & 0xff) as f32 / 255.0,
            b: (hex & 0xff) as f32 / 255.0,
        }
    }

    /// Parse `#rrggbb` or `rrggbb`
    pub fn parse(s: &str) -> Result<Self, String> {
        let digits = s.trim().trim_start_matches('#');
        if digits.len() != 6 {
            return Err(format!("expected 6 hex digits in color '{}'", s));
        }
        u32::from_str_radix(digits, 16)
            .map(Self::from_hex)
            .map_err(|e| format!("invalid color '{}': {}", s, e))
    }

    pub fn to_vec3(&self) -> Vec3 {
        Vec3::new(self.r, self.g, self.b)
    }

    fn to_hex(self) -> u32 {
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u32;
        (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }
}

impl TryFrom<String> for Rgb {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Rgb::parse(&value)
    }
}

impl From<Rgb> for String {
    fn from(color: Rgb) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.to_hex())
    }
}

fn default_fur_hue() -> Rgb {
    Rgb::from_hex(0xff6600)
}

fn default_min_intensity() -> f32 {
    0.5
}

/// How strand points are colored
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ColorMode {
    /// Source normal reused as a pseudo-color
    #[default]
    Normal,
    /// Fixed hue, brightening from `min_intensity` at the root towards the tip
    BaseHue {
        #[serde(default = "default_fur_hue")]
        color: Rgb,
        #[serde(default = "default_min_intensity")]
        min_intensity: f32,
    },
}

impl ColorMode {
    /// Color shared by both endpoints of segment `segment` of a strand
    pub fn segment_color(&self, normal: Vec3, segment: usize, segment_count: usize) -> Vec3 {
        match *self {
            ColorMode::Normal => normal,
            ColorMode::BaseHue { color, min_intensity } => {
                let t = segment as f32 / segment_count as f32;
                color.to_vec3().scale(min_intensity + (1.0 - min_intensity) * t)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        let c = Rgb::parse("#ff6600").unwrap();
        assert_eq!(c.r, 1.0);
        assert!((c.g - 0.4).abs() < 0.0001);
        assert_eq!(c.b, 0.0);

        assert_eq!(Rgb::parse("FF6600").unwrap(), c);
    }

    #[test]
    fn test_parse_rejects_bad_colors() {
        assert!(Rgb::parse("#fff").is_err());
        assert!(Rgb::parse("#gg0000").is_err());
    }

    #[test]
    fn test_display_round_trips_hex() {
        assert_eq!(Rgb::from_hex(0xff6600).to_string(), "#ff6600");
    }

    #[test]
    fn test_normal_mode_uses_normal() {
        let n = Vec3::new(0.0, 1.0, 0.0);
        assert_eq!(ColorMode::Normal.segment_color(n, 3, 5), n);
    }

    #[test]
    fn test_base_hue_brightens_towards_tip() {
        let mode = ColorMode::BaseHue { color: Rgb::new(1.0, 0.4, 0.0), min_intensity: 0.5 };
        let root = mode.segment_color(Vec3::UP, 0, 5);
        let tip = mode.segment_color(Vec3::UP, 4, 5);

        assert!((root.x - 0.5).abs() < 0.0001);
        assert!((tip.x - 0.9).abs() < 0.0001);
        assert!(tip.y > root.y);
    }
}
