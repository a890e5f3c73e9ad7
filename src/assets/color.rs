//! Color declarations normalized to 8-bit sRGB.
//!
//! Slot backgrounds and export settings may be written in any CSS Color 4 notation the template
//! author used (`color(display-p3 …)`, `lab()`, `oklch()`, `hsl()`, named colors and so on). The
//! rasterizer only speaks sRGB, so every declaration is converted here to the sRGB color it
//! renders as. Out-of-gamut colors are brought into gamut by reducing OKLCH chroma at constant
//! lightness and hue.

use serde::{Deserialize, Serialize};
use vello_cpu::peniko::color::{self, AlphaColor, ColorSpaceTag, DynamicColor, Hsl, Srgb};

use crate::foundation::core::Rgba8Premul;

/// Straight-alpha sRGB color with channels in `0..=1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColorDef {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl ColorDef {
    pub const WHITE: ColorDef = ColorDef {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };

    /// Channels taken as-is, not clamped.
    pub fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::rgba(
            f64::from(r) / 255.0,
            f64::from(g) / 255.0,
            f64::from(b) / 255.0,
            f64::from(a) / 255.0,
        )
    }

    /// Parse a textual color declaration.
    ///
    /// `#rgb`, `#rrggbb` and `#rrggbbaa` are read directly; everything else goes through the
    /// CSS Color 4 parser and is then mapped into sRGB.
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex);
        }
        let parsed = color::parse_color(&s.to_ascii_lowercase())
            .map_err(|e| format!("unrecognized color \"{s}\": {e}"))?;
        Ok(Self::from_dynamic(parsed))
    }

    /// `hsl()` from an object: hue in degrees, saturation and lightness in `0..=1`.
    pub fn hsla(h: f64, s: f64, l: f64, a: f64) -> Self {
        let hsl = AlphaColor::<Hsl>::new([
            h as f32,
            (s.clamp(0.0, 1.0) * 100.0) as f32,
            (l.clamp(0.0, 1.0) * 100.0) as f32,
            a.clamp(0.0, 1.0) as f32,
        ]);
        let [r, g, b, a] = hsl.convert::<Srgb>().components.map(f64::from);
        Self::rgba(r.clamp(0.0, 1.0), g.clamp(0.0, 1.0), b.clamp(0.0, 1.0), a)
    }

    fn from_dynamic(c: DynamicColor) -> Self {
        let [r, g, b, a] = c.to_alpha_color::<Srgb>().components.map(f64::from);
        let a = a.clamp(0.0, 1.0);
        if in_gamut([r, g, b]) {
            return Self::rgba(r.clamp(0.0, 1.0), g.clamp(0.0, 1.0), b.clamp(0.0, 1.0), a);
        }
        let [l, chroma, h, _] = c.convert(ColorSpaceTag::Oklch).components.map(f64::from);
        let h = if h.is_finite() { h } else { 0.0 };
        oklch_to_srgb(l, chroma.max(0.0), h, a)
    }

    /// Clamp, premultiply and quantize for the rasterizer.
    pub fn to_rgba8_premul(self) -> Rgba8Premul {
        let a = self.a.clamp(0.0, 1.0);
        let r = (self.r.clamp(0.0, 1.0) * a).clamp(0.0, 1.0);
        let g = (self.g.clamp(0.0, 1.0) * a).clamp(0.0, 1.0);
        let b = (self.b.clamp(0.0, 1.0) * a).clamp(0.0, 1.0);

        Rgba8Premul {
            r: to_u8(r),
            g: to_u8(g),
            b: to_u8(b),
            a: to_u8(a),
        }
    }

    pub fn to_straight_rgba8(self) -> [u8; 4] {
        [to_u8(self.r), to_u8(self.g), to_u8(self.b), to_u8(self.a)]
    }
}

fn to_u8(x: f64) -> u8 {
    (x.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl std::str::FromStr for ColorDef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<'de> Deserialize<'de> for ColorDef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            RgbaObj {
                r: f64,
                g: f64,
                b: f64,
                #[serde(default = "one")]
                a: f64,
            },
            HslaObj {
                h: f64,
                s: f64,
                l: f64,
                #[serde(default = "one")]
                a: f64,
            },
            Arr(Vec<f64>),
        }

        fn one() -> f64 {
            1.0
        }

        match Repr::deserialize(deserializer)? {
            Repr::Text(s) => ColorDef::parse(&s).map_err(serde::de::Error::custom),
            Repr::RgbaObj { r, g, b, a } => Ok(Self::rgba(r, g, b, a)),
            Repr::HslaObj { h, s, l, a } => Ok(Self::hsla(h, s, l, a)),
            Repr::Arr(v) => match v.as_slice() {
                [r, g, b] => Ok(Self::rgba(*r, *g, *b, 1.0)),
                [r, g, b, a] => Ok(Self::rgba(*r, *g, *b, *a)),
                _ => Err(serde::de::Error::custom(
                    "rgba array must have len 3 ([r,g,b]) or 4 ([r,g,b,a])",
                )),
            },
        }
    }
}

fn parse_hex(s: &str) -> Result<ColorDef, String> {
    fn hex_byte(pair: &str) -> Result<u8, String> {
        u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
    }

    if !s.is_ascii() {
        return Err(format!("unrecognized color \"#{s}\""));
    }

    let (r, g, b, a) = match s.len() {
        3 => {
            let d = |i: usize| hex_byte(&s[i..i + 1].repeat(2));
            (d(0)?, d(1)?, d(2)?, 255)
        }
        6 => (
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
            255,
        ),
        8 => (
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
            hex_byte(&s[6..8])?,
        ),
        _ => {
            return Err(format!(
                "unrecognized color \"#{s}\" (expected #RGB, #RRGGBB or #RRGGBBAA)"
            ));
        }
    };

    Ok(ColorDef::from_rgba8(r, g, b, a))
}

/// OKLab -> gamma-encoded sRGB, unclamped.
fn oklab_to_srgb(l: f64, a: f64, b: f64) -> [f64; 3] {
    let l_ = l + 0.396_337_777_4 * a + 0.215_803_757_3 * b;
    let m_ = l - 0.105_561_345_8 * a - 0.063_854_172_8 * b;
    let s_ = l - 0.089_484_177_5 * a - 1.291_485_548_0 * b;

    let (l3, m3, s3) = (l_ * l_ * l_, m_ * m_ * m_, s_ * s_ * s_);

    let r = 4.076_741_662_1 * l3 - 3.307_711_591_3 * m3 + 0.230_969_929_2 * s3;
    let g = -1.268_438_004_6 * l3 + 2.609_757_401_1 * m3 - 0.341_319_396_5 * s3;
    let bl = -0.004_196_086_3 * l3 - 0.703_418_614_7 * m3 + 1.707_614_701_0 * s3;

    [encode_srgb(r), encode_srgb(g), encode_srgb(bl)]
}

fn encode_srgb(linear: f64) -> f64 {
    if linear <= 0.003_130_8 {
        12.92 * linear
    } else {
        1.055 * linear.powf(1.0 / 2.4) - 0.055
    }
}

fn in_gamut(rgb: [f64; 3]) -> bool {
    const EPS: f64 = 1e-4;
    rgb.iter().all(|c| (-EPS..=1.0 + EPS).contains(c))
}

fn oklch_to_srgb(l: f64, c: f64, h_deg: f64, alpha: f64) -> ColorDef {
    let l = l.clamp(0.0, 1.0);
    let h = h_deg.to_radians();
    let at = |chroma: f64| oklab_to_srgb(l, chroma * h.cos(), chroma * h.sin());

    let mut rgb = at(c);
    if !in_gamut(rgb) {
        let (mut lo, mut hi) = (0.0, c);
        for _ in 0..24 {
            let mid = 0.5 * (lo + hi);
            if in_gamut(at(mid)) {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        rgb = at(lo);
    }

    ColorDef::rgba(
        rgb[0].clamp(0.0, 1.0),
        rgb[1].clamp(0.0, 1.0),
        rgb[2].clamp(0.0, 1.0),
        alpha,
    )
}

#[cfg(test)]
#[path = "../../tests/unit/assets/color.rs"]
mod tests;
