//! Scroll-linked triggers
//!
//! Maps a scroll offset onto timeline progress. A range starts when a point
//! on the trigger element meets a point on the viewport (`"top 80%"`: the
//! trigger's top edge crosses 80% down the viewport) and ends either the
//! same way or a fixed distance later (`"+=400%"`: four viewport heights).

use std::str::FromStr;

use realest_core::{Length, Unit};

use crate::error::{AnimationError, Result};

/// How quickly smoothed scrubbing closes the gap, per second of lag
const SMOOTHING_RATE: f32 = 4.0;

/// Point along an element or the viewport
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Edge {
    Top,
    Center,
    Bottom,
    /// Percentage of the size from the top
    Percent(f32),
    /// Pixels from the top
    Px(f32),
}

impl Edge {
    /// Distance from the top for a box of `size`
    pub fn resolve(self, size: f32) -> f32 {
        match self {
            Edge::Top => 0.0,
            Edge::Center => size / 2.0,
            Edge::Bottom => size,
            Edge::Percent(p) => p / 100.0 * size,
            Edge::Px(px) => px,
        }
    }
}

impl FromStr for Edge {
    type Err = AnimationError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || AnimationError::InvalidRange(s.to_string());
        let number = |n: &str| -> Result<f32> {
            let v: f32 = n.trim().parse().map_err(|_| invalid())?;
            if v.is_finite() {
                Ok(v)
            } else {
                Err(invalid())
            }
        };
        match s.trim() {
            "top" => Ok(Edge::Top),
            "center" => Ok(Edge::Center),
            "bottom" => Ok(Edge::Bottom),
            other => {
                if let Some(p) = other.strip_suffix('%') {
                    number(p).map(Edge::Percent)
                } else {
                    number(other.strip_suffix("px").unwrap_or(other)).map(Edge::Px)
                }
            }
        }
    }
}

/// Where the range starts: trigger edge meets viewport edge
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RangeStart {
    pub trigger: Edge,
    pub viewport: Edge,
}

impl RangeStart {
    pub const fn new(trigger: Edge, viewport: Edge) -> Self {
        Self { trigger, viewport }
    }

    /// Scroll offset at which the two edges meet
    pub fn resolve(&self, trigger_top: f32, trigger_height: f32, viewport_height: f32) -> f32 {
        trigger_top + self.trigger.resolve(trigger_height) - self.viewport.resolve(viewport_height)
    }
}

impl FromStr for RangeStart {
    type Err = AnimationError;

    /// Parse `"top top"`, `"top 80%"`, `"center bottom"`
    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some(trigger), Some(viewport), None) => Ok(Self {
                trigger: trigger.parse()?,
                viewport: viewport.parse()?,
            }),
            _ => Err(AnimationError::InvalidRange(s.to_string())),
        }
    }
}

/// Where the range ends
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RangeEnd {
    /// Edges meeting, like the start
    At(RangeStart),
    /// A distance past the start; percentages are of the viewport height
    Relative(Length),
}

impl RangeEnd {
    pub fn resolve(
        &self,
        start: f32,
        trigger_top: f32,
        trigger_height: f32,
        viewport_height: f32,
    ) -> f32 {
        match self {
            RangeEnd::At(edges) => edges.resolve(trigger_top, trigger_height, viewport_height),
            RangeEnd::Relative(distance) => {
                start + distance.to_px(viewport_height, viewport_height)
            }
        }
    }
}

impl FromStr for RangeEnd {
    type Err = AnimationError;

    /// Parse `"bottom bottom"`, `"+=400%"`, `"+=600"`, `"+=50vh"`
    fn from_str(s: &str) -> Result<Self> {
        let Some(rest) = s.trim().strip_prefix("+=") else {
            return s.parse().map(RangeEnd::At);
        };
        let invalid = || AnimationError::InvalidRange(s.to_string());
        let (number, unit) = if let Some(n) = rest.strip_suffix('%') {
            (n, Unit::Percent)
        } else if let Some(n) = rest.strip_suffix("vh") {
            (n, Unit::Vh)
        } else {
            (rest.strip_suffix("px").unwrap_or(rest), Unit::Px)
        };
        let value: f32 = number.trim().parse().map_err(|_| invalid())?;
        if !value.is_finite() || value < 0.0 {
            return Err(invalid());
        }
        Ok(RangeEnd::Relative(Length { value, unit }))
    }
}

/// How timeline progress follows scroll progress
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Scrub {
    /// Not linked; the timeline plays once when the range is entered
    Off,
    /// Progress tracks scroll exactly
    Instant,
    /// Progress eases toward scroll over roughly this many seconds
    Smooth(f32),
}

impl Scrub {
    /// `0` means instant, anything positive is a smoothing lag
    pub fn seconds(lag: f32) -> Self {
        if lag > 0.0 && lag.is_finite() {
            Scrub::Smooth(lag)
        } else {
            Scrub::Instant
        }
    }
}

/// Element whose position defines the scroll range
#[derive(Clone, Debug, PartialEq)]
pub enum TriggerTarget {
    /// The scope root the animation is bound under
    Scope,
    /// First element anywhere in the document with this marker
    Marker(String),
    /// The whole page, from offset zero to the page height
    Page,
}

/// Scroll linkage of one timeline
#[derive(Clone, Debug, PartialEq)]
pub struct ScrollTriggerSpec {
    pub trigger: TriggerTarget,
    pub start: RangeStart,
    pub end: RangeEnd,
    pub scrub: Scrub,
    /// Keep the scope root fixed in the viewport for the length of the range
    pub pin: bool,
}

impl ScrollTriggerSpec {
    /// Defaults to `"top bottom"` through `"bottom top"`, unscrubbed, unpinned
    pub fn new(trigger: TriggerTarget) -> Self {
        Self {
            trigger,
            start: RangeStart::new(Edge::Top, Edge::Bottom),
            end: RangeEnd::At(RangeStart::new(Edge::Bottom, Edge::Top)),
            scrub: Scrub::Off,
            pin: false,
        }
    }

    pub fn start(mut self, start: RangeStart) -> Self {
        self.start = start;
        self
    }

    pub fn end(mut self, end: RangeEnd) -> Self {
        self.end = end;
        self
    }

    pub fn scrub(mut self, scrub: Scrub) -> Self {
        self.scrub = scrub;
        self
    }

    pub fn pin(mut self, pin: bool) -> Self {
        self.pin = pin;
        self
    }

    /// Resolve to concrete offsets for a trigger box
    pub fn measure(
        &self,
        trigger_top: f32,
        trigger_height: f32,
        viewport_height: f32,
    ) -> ScrollRange {
        let start = self
            .start
            .resolve(trigger_top, trigger_height, viewport_height);
        let end = self
            .end
            .resolve(start, trigger_top, trigger_height, viewport_height);
        ScrollRange { start, end }
    }
}

/// A resolved scroll range in page offsets
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollRange {
    pub start: f32,
    pub end: f32,
}

impl ScrollRange {
    /// `(offset - start) / (end - start)`, clamped to `[0, 1]`
    pub fn progress(&self, offset: f32) -> f32 {
        if self.end <= self.start {
            return if offset >= self.start { 1.0 } else { 0.0 };
        }
        ((offset - self.start) / (self.end - self.start)).clamp(0.0, 1.0)
    }

    pub fn distance(&self) -> f32 {
        (self.end - self.start).max(0.0)
    }

    /// How far a pinned element is held down the page at `offset`
    pub fn pin_offset(&self, offset: f32) -> f32 {
        (offset - self.start).clamp(0.0, self.distance())
    }
}

/// Move `current` toward `target` for one frame of smoothed scrubbing
pub fn smooth_toward(current: f32, target: f32, dt: f32, lag: f32) -> f32 {
    if lag <= 0.0 || dt <= 0.0 {
        return if lag <= 0.0 { target } else { current };
    }
    let alpha = 1.0 - (-dt * SMOOTHING_RATE / lag).exp();
    let next = current + (target - current) * alpha;
    if (target - next).abs() < 1e-4 {
        target
    } else {
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_range_start() {
        let r: RangeStart = "top 80%".parse().unwrap();
        assert_eq!(r, RangeStart::new(Edge::Top, Edge::Percent(80.0)));
        let r: RangeStart = "center bottom".parse().unwrap();
        assert_eq!(r, RangeStart::new(Edge::Center, Edge::Bottom));
        let r: RangeStart = "top 120px".parse().unwrap();
        assert_eq!(r, RangeStart::new(Edge::Top, Edge::Px(120.0)));
        assert!("top".parse::<RangeStart>().is_err());
        assert!("top left".parse::<RangeStart>().is_err());
    }

    #[test]
    fn test_parse_range_end() {
        assert_eq!(
            "+=400%".parse::<RangeEnd>().unwrap(),
            RangeEnd::Relative(Length::percent(400.0))
        );
        assert_eq!(
            "+=600".parse::<RangeEnd>().unwrap(),
            RangeEnd::Relative(Length::px(600.0))
        );
        assert_eq!(
            "bottom bottom".parse::<RangeEnd>().unwrap(),
            RangeEnd::At(RangeStart::new(Edge::Bottom, Edge::Bottom))
        );
        assert!("+=lots".parse::<RangeEnd>().is_err());
    }

    #[test]
    fn test_pinned_range_spans_four_viewports() {
        let spec = ScrollTriggerSpec::new(TriggerTarget::Scope)
            .start("top top".parse().unwrap())
            .end("+=400%".parse().unwrap())
            .scrub(Scrub::seconds(1.0))
            .pin(true);
        let range = spec.measure(0.0, 800.0, 800.0);
        assert_eq!(range.start, 0.0);
        assert_eq!(range.end, 3200.0);
        assert_eq!(range.progress(1600.0), 0.5);
        assert_eq!(range.pin_offset(5000.0), 3200.0);
        assert_eq!(range.pin_offset(-10.0), 0.0);
    }

    #[test]
    fn test_spacer_range() {
        // A 900px spacer at 2000px: "top bottom" to "bottom bottom"
        let spec = ScrollTriggerSpec::new(TriggerTarget::Marker("data-spacer".into()))
            .start(RangeStart::new(Edge::Top, Edge::Bottom))
            .end(RangeEnd::At(RangeStart::new(Edge::Bottom, Edge::Bottom)));
        let range = spec.measure(2000.0, 900.0, 900.0);
        assert_eq!(range.start, 1100.0);
        assert_eq!(range.end, 2000.0);
        assert_eq!(range.progress(0.0), 0.0);
        assert_eq!(range.progress(1550.0), 0.5);
        assert_eq!(range.progress(9000.0), 1.0);
    }

    #[test]
    fn test_degenerate_range_steps() {
        let range = ScrollRange {
            start: 100.0,
            end: 100.0,
        };
        assert_eq!(range.progress(99.0), 0.0);
        assert_eq!(range.progress(100.0), 1.0);
    }

    #[test]
    fn test_smoothing_converges() {
        let mut current = 0.0;
        for _ in 0..480 {
            current = smooth_toward(current, 1.0, 1.0 / 120.0, 1.0);
        }
        assert_eq!(current, 1.0);

        // One frame moves part of the way only
        let step = smooth_toward(0.0, 1.0, 1.0 / 120.0, 1.0);
        assert!(step > 0.0 && step < 0.1);
        assert_eq!(smooth_toward(0.3, 1.0, 0.016, 0.0), 1.0);
    }
}
