use serde::Serialize;

use crate::error::{FlagError, FlagResult};

/// One color with channels normalized to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    pub fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Parses an `AARRGGBB` hex token. A 6-digit `RRGGBB` token is accepted
    /// too and implies opaque alpha.
    pub fn parse_argb(s: &str) -> FlagResult<Self> {
        let s = s.trim();
        let s = s.strip_prefix('#').unwrap_or(s);

        fn hex_byte(pair: &str) -> FlagResult<u8> {
            u8::from_str_radix(pair, 16)
                .map_err(|_| FlagError::configuration(format!("invalid hex byte \"{pair}\"")))
        }

        // The pair slices are byte-indexed; a non-ASCII token whose byte
        // length happens to be 6 or 8 must fall through to the error arm
        // rather than slice mid-character.
        let (a, r, g, b) = match s.len() {
            6 if s.is_ascii() => {
                let r = hex_byte(&s[0..2])?;
                let g = hex_byte(&s[2..4])?;
                let b = hex_byte(&s[4..6])?;
                (255, r, g, b)
            }
            8 if s.is_ascii() => {
                let a = hex_byte(&s[0..2])?;
                let r = hex_byte(&s[2..4])?;
                let g = hex_byte(&s[4..6])?;
                let b = hex_byte(&s[6..8])?;
                (a, r, g, b)
            }
            _ => {
                return Err(FlagError::configuration(format!(
                    "color \"{s}\" must be AARRGGBB or RRGGBB (case-insensitive)"
                )));
            }
        };

        Ok(Self::rgba(
            (r as f64) / 255.0,
            (g as f64) / 255.0,
            (b as f64) / 255.0,
            (a as f64) / 255.0,
        ))
    }

    /// Canonical 8-digit uppercase `AARRGGBB` form. Parsing the result yields
    /// this color back.
    pub fn encode_argb(self) -> String {
        let [r, g, b, a] = self.to_rgba8();
        format!("{a:02X}{r:02X}{g:02X}{b:02X}")
    }

    /// Straight-alpha channel bytes for the rasterizer paint.
    pub fn to_rgba8(self) -> [u8; 4] {
        fn to_u8(x: f64) -> u8 {
            (x.clamp(0.0, 1.0) * 255.0).round() as u8
        }

        [to_u8(self.r), to_u8(self.g), to_u8(self.b), to_u8(self.a)]
    }
}

/// The three colors a badge is drawn with, in input order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColorSet {
    pub text: Rgba,
    pub flag: Rgba,
    pub border: Rgba,
}

impl ColorSet {
    /// Parses a comma-separated `AARRGGBB,AARRGGBB,AARRGGBB` triple
    /// (text, flag, border).
    pub fn parse(s: &str) -> FlagResult<Self> {
        let tokens: Vec<&str> = s.split(',').collect();
        if tokens.len() != 3 {
            return Err(FlagError::configuration(format!(
                "expected 3 comma-separated colors (text, flag, border), got {}",
                tokens.len()
            )));
        }
        Ok(Self {
            text: Rgba::parse_argb(tokens[0])?,
            flag: Rgba::parse_argb(tokens[1])?,
            border: Rgba::parse_argb(tokens[2])?,
        })
    }

    pub fn encode(self) -> String {
        format!(
            "{},{},{}",
            self.text.encode_argb(),
            self.flag.encode_argb(),
            self.border.encode_argb()
        )
    }
}
