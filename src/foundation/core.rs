use crate::foundation::error::{YearframeError, YearframeResult};

pub use kurbo::{Affine, Point, Rect, Size, Vec2};

/// Calendar month in `1..=12`.
///
/// Slots, transforms and image assignments are all keyed by month.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct Month(u8);

impl Month {
    /// Number of months in a template.
    pub const COUNT: usize = 12;

    const ABBREV: [&'static str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];

    /// Build a month from its 1-based number.
    pub fn new(n: u8) -> YearframeResult<Self> {
        if (1..=12).contains(&n) {
            Ok(Self(n))
        } else {
            Err(YearframeError::validation(format!(
                "month must be in 1..=12, got {n}"
            )))
        }
    }

    /// Build a month from a 0-based list index (`0 -> January`).
    pub fn from_index(idx: usize) -> Option<Self> {
        (idx < Self::COUNT).then(|| Self(idx as u8 + 1))
    }

    /// 1-based month number.
    pub fn get(self) -> u8 {
        self.0
    }

    /// Three-letter English abbreviation.
    pub fn abbrev(self) -> &'static str {
        Self::ABBREV[usize::from(self.0 - 1)]
    }

    /// All months in ascending order.
    pub fn all() -> impl Iterator<Item = Month> {
        (1..=12u8).map(Month)
    }
}

impl TryFrom<u8> for Month {
    type Error = YearframeError;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        Self::new(n)
    }
}

impl From<Month> for u8 {
    fn from(m: Month) -> Self {
        m.0
    }
}

impl std::fmt::Display for Month {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Canonical template resolution in template pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    /// Default template resolution used by the built-in frames.
    pub const HD: Canvas = Canvas {
        width: 1920,
        height: 1080,
    };

    /// Validated constructor; both dimensions must be non-zero.
    pub fn new(width: u32, height: u32) -> YearframeResult<Self> {
        let c = Self { width, height };
        c.validate()?;
        Ok(c)
    }

    /// Check that both dimensions are non-zero.
    pub fn validate(self) -> YearframeResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(YearframeError::validation("canvas width/height must be > 0"));
        }
        Ok(())
    }

    /// Dimensions as a float size.
    pub fn size(self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }

    /// Full canvas rectangle anchored at the origin.
    pub fn rect(self) -> Rect {
        Rect::from_origin_size(Point::ORIGIN, self.size())
    }

    /// Multiply both dimensions by an integer factor, rejecting overflow.
    pub fn scaled(self, factor: u32) -> YearframeResult<Self> {
        let width = self.width.checked_mul(factor);
        let height = self.height.checked_mul(factor);
        match (width, height) {
            (Some(width), Some(height)) if factor > 0 => Ok(Self { width, height }),
            _ => Err(YearframeError::validation(format!(
                "canvas {}x{} cannot be scaled by {factor}",
                self.width, self.height
            ))),
        }
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8Premul {
    /// Channels in `[r, g, b, a]` order.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
