//! Easing curves
//!
//! The power family used by the site (`power1` through `power4`, each with
//! `in`, `out` and `inOut` variants) plus linear (`none`). Every curve maps
//! `[0, 1]` onto `[0, 1]` monotonically with fixed endpoints.

use std::str::FromStr;

use crate::error::AnimationError;

/// Exponent class of a power curve
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Power {
    /// Quadratic
    P1,
    /// Cubic
    P2,
    /// Quartic
    P3,
    /// Quintic
    P4,
}

impl Power {
    fn exponent(self) -> i32 {
        match self {
            Power::P1 => 2,
            Power::P2 => 3,
            Power::P3 => 4,
            Power::P4 => 5,
        }
    }
}

/// An easing curve
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Easing {
    Linear,
    In(Power),
    Out(Power),
    InOut(Power),
}

impl Default for Easing {
    /// `power1.out`, the engine-wide default
    fn default() -> Self {
        Easing::Out(Power::P1)
    }
}

impl Easing {
    /// Map linear progress `t` to eased progress
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::In(p) => t.powi(p.exponent()),
            Easing::Out(p) => 1.0 - (1.0 - t).powi(p.exponent()),
            Easing::InOut(p) => {
                let k = p.exponent();
                if t < 0.5 {
                    0.5 * (2.0 * t).powi(k)
                } else {
                    1.0 - 0.5 * (2.0 - 2.0 * t).powi(k)
                }
            }
        }
    }
}

impl FromStr for Easing {
    type Err = AnimationError;

    /// Parse `none`, `linear`, `power2`, `power3.out`, `power2.in`, `power1.inOut`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AnimationError::InvalidEasing(s.to_string());
        let s = s.trim();
        if s == "none" || s == "linear" {
            return Ok(Easing::Linear);
        }
        let (family, mode) = s.split_once('.').unwrap_or((s, "out"));
        let power = match family {
            "power1" => Power::P1,
            "power2" => Power::P2,
            "power3" => Power::P3,
            "power4" => Power::P4,
            _ => return Err(invalid()),
        };
        match mode {
            "in" => Ok(Easing::In(power)),
            "out" => Ok(Easing::Out(power)),
            "inOut" => Ok(Easing::InOut(power)),
            _ => Err(invalid()),
        }
    }
}
