//! Animatable value types
//!
//! Linear interpolation for style values, and normalisation of relative
//! lengths to pixels so two ends of a transition always share a unit.

use realest_core::{Color, Length, Property, StyleValue, Unit};

/// Trait for values that can be linearly interpolated
pub trait Interpolate: Clone {
    /// Linearly interpolate between self and other by factor t (0.0 to 1.0)
    fn lerp(&self, other: &Self, t: f32) -> Self;

    /// Check if two values are approximately equal
    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool;
}

// ============================================================================
// f32 Implementation
// ============================================================================

impl Interpolate for f32 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self - other).abs() < epsilon
    }
}

// ============================================================================
// Color Implementation
// ============================================================================

impl Interpolate for Color {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Color::lerp(self, other, t)
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self.r - other.r).abs() < epsilon
            && (self.g - other.g).abs() < epsilon
            && (self.b - other.b).abs() < epsilon
            && (self.a - other.a).abs() < epsilon
    }
}

// ============================================================================
// StyleValue Implementation
// ============================================================================

impl Interpolate for StyleValue {
    /// Values of different kinds or units cannot blend; they switch at the end
    fn lerp(&self, other: &Self, t: f32) -> Self {
        match (self, other) {
            (StyleValue::Number(a), StyleValue::Number(b)) => StyleValue::Number(a.lerp(b, t)),
            (StyleValue::Length(a), StyleValue::Length(b)) if a.unit == b.unit => {
                StyleValue::Length(Length {
                    value: a.value.lerp(&b.value, t),
                    unit: a.unit,
                })
            }
            (StyleValue::Color(a), StyleValue::Color(b)) => StyleValue::Color(a.lerp(b, t)),
            _ if t >= 1.0 => *other,
            _ => *self,
        }
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        match (self, other) {
            (StyleValue::Number(a), StyleValue::Number(b)) => a.approx_eq(b, epsilon),
            (StyleValue::Length(a), StyleValue::Length(b)) => {
                a.unit == b.unit && a.value.approx_eq(&b.value, epsilon)
            }
            (StyleValue::Color(a), StyleValue::Color(b)) => a.approx_eq(b, epsilon),
            _ => false,
        }
    }
}

/// Resolve viewport- and element-relative lengths to pixels
///
/// Bare numbers on translation axes are read as pixels (`x: -100`).
pub fn normalize(
    property: Property,
    value: StyleValue,
    viewport_height: f32,
    own_size: f32,
) -> StyleValue {
    match value {
        StyleValue::Length(len) if len.unit != Unit::Px => {
            StyleValue::Length(Length::px(len.to_px(viewport_height, own_size)))
        }
        StyleValue::Number(n)
            if matches!(property, Property::X | Property::Y | Property::PinOffset) =>
        {
            StyleValue::Length(Length::px(n))
        }
        other => other,
    }
}
