//! Style properties and values
//!
//! The animatable subset of CSS the landing page uses: transforms expressed as
//! separate axes (GSAP style `x`, `y`, `xPercent`, `yPercent`, `scale`),
//! opacity, and colors.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// An animatable style property
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Property {
    /// Horizontal translation
    X,
    /// Vertical translation
    Y,
    /// Horizontal translation as a percentage of the element's own width
    XPercent,
    /// Vertical translation as a percentage of the element's own height
    YPercent,
    /// Uniform scale
    Scale,
    Opacity,
    /// Text color
    Color,
    BackgroundColor,
    /// Offset applied while the element is pinned to the viewport
    PinOffset,
}

impl Property {
    /// The CSS-facing name of the property
    pub fn name(self) -> &'static str {
        match self {
            Property::X => "x",
            Property::Y => "y",
            Property::XPercent => "xPercent",
            Property::YPercent => "yPercent",
            Property::Scale => "scale",
            Property::Opacity => "opacity",
            Property::Color => "color",
            Property::BackgroundColor => "backgroundColor",
            Property::PinOffset => "pinOffset",
        }
    }

    /// Value the property has when neither inline nor authored styles set it
    pub fn initial_value(self) -> StyleValue {
        match self {
            Property::X | Property::Y | Property::PinOffset => StyleValue::Length(Length::px(0.0)),
            Property::XPercent | Property::YPercent => StyleValue::Number(0.0),
            Property::Scale | Property::Opacity => StyleValue::Number(1.0),
            Property::Color => StyleValue::Color(Color::WHITE),
            Property::BackgroundColor => StyleValue::Color(Color::TRANSPARENT),
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unit of a length value
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Px,
    /// Percentage of the element's own size along the axis
    Percent,
    /// Percentage of the viewport height
    Vh,
}

/// A length with a unit
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Length {
    pub value: f32,
    pub unit: Unit,
}

impl Length {
    pub const fn px(value: f32) -> Self {
        Self {
            value,
            unit: Unit::Px,
        }
    }

    pub const fn vh(value: f32) -> Self {
        Self {
            value,
            unit: Unit::Vh,
        }
    }

    pub const fn percent(value: f32) -> Self {
        Self {
            value,
            unit: Unit::Percent,
        }
    }

    /// Resolve to pixels given the viewport height and the element's own size
    pub fn to_px(self, viewport_height: f32, own_size: f32) -> f32 {
        match self.unit {
            Unit::Px => self.value,
            Unit::Vh => self.value / 100.0 * viewport_height,
            Unit::Percent => self.value / 100.0 * own_size,
        }
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = match self.unit {
            Unit::Px => "px",
            Unit::Percent => "%",
            Unit::Vh => "vh",
        };
        write!(f, "{}{}", round3(self.value), unit)
    }
}

/// RGBA color with components in 0.0..=1.0
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_hex(hex: u32) -> Self {
        let r = ((hex >> 16) & 0xFF) as f32 / 255.0;
        let g = ((hex >> 8) & 0xFF) as f32 / 255.0;
        let b = (hex & 0xFF) as f32 / 255.0;
        Self::rgb(r, g, b)
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.a = alpha;
        self
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`
    pub fn parse_hex(s: &str) -> Result<Self, CoreError> {
        let invalid = || CoreError::InvalidColor(s.to_string());
        let digits = s.strip_prefix('#').ok_or_else(invalid)?;
        let expanded: String = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            6 | 8 => digits.to_string(),
            _ => return Err(invalid()),
        };
        let raw = u32::from_str_radix(&expanded, 16).map_err(|_| invalid())?;
        if expanded.len() == 8 {
            Ok(Self::from_hex(raw >> 8).with_alpha((raw & 0xFF) as f32 / 255.0))
        } else {
            Ok(Self::from_hex(raw))
        }
    }

    /// Linear interpolation between two colors
    pub fn lerp(a: &Color, b: &Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        Color {
            r: a.r + (b.r - a.r) * t,
            g: a.g + (b.g - a.g) * t,
            b: a.b + (b.b - a.b) * t,
            a: a.a + (b.a - a.a) * t,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        write!(
            f,
            "#{:02x}{:02x}{:02x}{:02x}",
            channel(self.r),
            channel(self.g),
            channel(self.b),
            channel(self.a)
        )
    }
}

/// A concrete style value
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleValue {
    Number(f32),
    Length(Length),
    Color(Color),
}

impl StyleValue {
    /// Numeric payload for unitless values and pixel lengths
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            StyleValue::Number(n) => Some(*n),
            StyleValue::Length(Length {
                value,
                unit: Unit::Px,
            }) => Some(*value),
            _ => None,
        }
    }
}

impl FromStr for StyleValue {
    type Err = CoreError;

    /// Parse `0.9`, `-100`, `30px`, `-31vh`, `100%` or `#1a4d2e`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.starts_with('#') {
            return Color::parse_hex(s).map(StyleValue::Color);
        }
        let invalid = || CoreError::InvalidStyleValue(s.to_string());
        let (number, unit) = if let Some(n) = s.strip_suffix("px") {
            (n, Some(Unit::Px))
        } else if let Some(n) = s.strip_suffix("vh") {
            (n, Some(Unit::Vh))
        } else if let Some(n) = s.strip_suffix('%') {
            (n, Some(Unit::Percent))
        } else {
            (s, None)
        };
        let value: f32 = number.trim().parse().map_err(|_| invalid())?;
        if !value.is_finite() {
            return Err(invalid());
        }
        Ok(match unit {
            Some(unit) => StyleValue::Length(Length { value, unit }),
            None => StyleValue::Number(value),
        })
    }
}

impl fmt::Display for StyleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleValue::Number(n) => write!(f, "{}", round3(*n)),
            StyleValue::Length(l) => fmt::Display::fmt(l, f),
            StyleValue::Color(c) => fmt::Display::fmt(c, f),
        }
    }
}

impl From<f32> for StyleValue {
    fn from(value: f32) -> Self {
        StyleValue::Number(value)
    }
}

impl From<Length> for StyleValue {
    fn from(value: Length) -> Self {
        StyleValue::Length(value)
    }
}

impl From<Color> for StyleValue {
    fn from(value: Color) -> Self {
        StyleValue::Color(value)
    }
}

fn round3(v: f32) -> f32 {
    let rounded = (v * 1000.0).round() / 1000.0;
    // avoid printing "-0"
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_style_values() {
        assert_eq!("0.9".parse::<StyleValue>().unwrap(), StyleValue::Number(0.9));
        assert_eq!(
            "-31vh".parse::<StyleValue>().unwrap(),
            StyleValue::Length(Length::vh(-31.0))
        );
        assert_eq!(
            "30px".parse::<StyleValue>().unwrap(),
            StyleValue::Length(Length::px(30.0))
        );
        assert_eq!(
            "100%".parse::<StyleValue>().unwrap(),
            StyleValue::Length(Length::percent(100.0))
        );
        assert!("tall".parse::<StyleValue>().is_err());
    }

    #[test]
    fn test_parse_hex_colors() {
        let c = Color::parse_hex("#1a4d2e").unwrap();
        assert!((c.r - 0x1a as f32 / 255.0).abs() < 1e-6);
        assert!((c.a - 1.0).abs() < 1e-6);

        let short = Color::parse_hex("#fff").unwrap();
        assert_eq!(short, Color::WHITE);

        let translucent = Color::parse_hex("#00000080").unwrap();
        assert!((translucent.a - 128.0 / 255.0).abs() < 1e-6);

        assert!(Color::parse_hex("1a4d2e").is_err());
        assert!(Color::parse_hex("#12345").is_err());
    }

    #[test]
    fn test_length_resolution() {
        assert_eq!(Length::vh(-31.0).to_px(800.0, 0.0), -248.0);
        assert_eq!(Length::percent(100.0).to_px(800.0, 600.0), 600.0);
        assert_eq!(Length::px(12.0).to_px(800.0, 600.0), 12.0);
    }

    #[test]
    fn test_display_formatting() {
        let v = StyleValue::Length(Length::vh(-31.0));
        assert_eq!(v.to_string(), "-31vh");
        assert_eq!(StyleValue::Number(-0.0001).to_string(), "0");
        assert_eq!(StyleValue::Color(Color::WHITE).to_string(), "#ffffffff");
    }
}
