use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static HEX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#?([0-9a-fA-F]{2})([0-9a-fA-F]{2})([0-9a-fA-F]{2})$").unwrap());

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid color: {0}")]
pub struct ColorError(pub String);

/// 8-bit RGB triple used for branch shading. Parsed from `#rrggbb` hex,
/// formatted back the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn parse(input: &str) -> Result<Self, ColorError> {
        let caps = HEX_RE
            .captures(input.trim())
            .ok_or_else(|| ColorError(input.to_string()))?;
        let channel = |idx: usize| u8::from_str_radix(&caps[idx], 16).unwrap_or(0);
        Ok(Self {
            r: channel(1),
            g: channel(2),
            b: channel(3),
        })
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Blend toward white by `t` in `[0, 1]`.
    pub fn lighten(self, t: f32) -> Self {
        let mix = |v: u8| {
            let v = v as f32;
            (v + (255.0 - v) * t).round().clamp(0.0, 255.0) as u8
        };
        Self {
            r: mix(self.r),
            g: mix(self.g),
            b: mix(self.b),
        }
    }

    /// Scale toward black by `t` in `[0, 1]`.
    pub fn darken(self, t: f32) -> Self {
        let mix = |v: u8| ((v as f32) * (1.0 - t)).round().clamp(0.0, 255.0) as u8;
        Self {
            r: mix(self.r),
            g: mix(self.g),
            b: mix(self.b),
        }
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}
