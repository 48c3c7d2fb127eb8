//! Scales mapping data values to pixels and colors.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Default accent color.
pub const DEFAULT_COLOR: Rgb = Rgb {
    r: 0xff,
    g: 0x45,
    b: 0x00,
};

const WHITE: Rgb = Rgb {
    r: 0xff,
    g: 0xff,
    b: 0xff,
};

/// Domain lower bound as a fraction of the maximum, so small values stay tinted.
const COLOR_DOMAIN_FLOOR: f64 = -0.15;

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Default for Rgb {
    fn default() -> Self {
        DEFAULT_COLOR
    }
}

impl Rgb {
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// CSS functional notation, as written into `fill` attributes.
    pub fn to_css(&self) -> String {
        format!("rgb({}, {}, {})", self.r, self.g, self.b)
    }

    fn lerp(a: Rgb, b: Rgb, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let channel = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * t).round() as u8;
        Rgb {
            r: channel(a.r, b.r),
            g: channel(a.g, b.g),
            b: channel(a.b, b.b),
        }
    }
}

impl FromStr for Rgb {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidColor(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(invalid)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let expanded: String = match hex.len() {
            3 => hex.chars().flat_map(|c| [c, c]).collect(),
            6 => hex.to_string(),
            _ => return Err(invalid()),
        };
        let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).map_err(|_| invalid());
        Ok(Rgb {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }
}

impl TryFrom<String> for Rgb {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_hex()
    }
}

/// Linear color scale from white to the accent color.
#[derive(Debug, Clone, Copy)]
pub struct ColorScale {
    accent: Rgb,
    min: f64,
    max: f64,
}

impl ColorScale {
    /// Scale over `[-0.15 * max, max]`.
    pub fn new(accent: Rgb, max: u64) -> Self {
        let max = max as f64;
        Self {
            accent,
            min: COLOR_DOMAIN_FLOOR * max,
            max,
        }
    }

    pub fn color(&self, value: u64) -> Rgb {
        if self.max <= 0.0 {
            return self.accent;
        }
        let t = (value as f64 - self.min) / (self.max - self.min);
        Rgb::lerp(WHITE, self.accent, t)
    }
}

/// Continuous linear scale.
#[derive(Debug, Clone, Copy)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
    round: bool,
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self {
            domain,
            range,
            round: false,
        }
    }

    /// Round outputs to whole pixels.
    pub fn rounded(mut self) -> Self {
        self.round = true;
        self
    }

    pub fn map(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        // A collapsed domain maps everything to the middle of the range.
        let t = if d1 == d0 { 0.5 } else { (value - d0) / (d1 - d0) };
        let out = r0 + (r1 - r0) * t;
        if self.round {
            out.round()
        } else {
            out
        }
    }
}

/// Ordinal band scale: evenly spaced bands over a pixel range.
#[derive(Debug, Clone)]
pub struct BandScale<K> {
    domain: Vec<K>,
    start: f64,
    step: f64,
    bandwidth: f64,
}

impl<K: PartialEq> BandScale<K> {
    /// Bands over `range` with equal inner and outer `padding`, rounded to
    /// whole pixels and centered.
    pub fn new(domain: Vec<K>, range: (f64, f64), padding: f64) -> Self {
        let (r0, r1) = range;
        let n = domain.len() as f64;
        let step = ((r1 - r0) / (n - padding + padding * 2.0).max(1.0)).floor();
        let start = (r0 + (r1 - r0 - step * (n - padding)) * 0.5).round();
        let bandwidth = (step * (1.0 - padding)).round();
        Self {
            domain,
            start,
            step,
            bandwidth,
        }
    }

    pub fn position(&self, key: &K) -> Option<f64> {
        self.domain
            .iter()
            .position(|k| k == key)
            .map(|i| self.start + self.step * i as f64)
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn domain(&self) -> &[K] {
        &self.domain
    }
}
