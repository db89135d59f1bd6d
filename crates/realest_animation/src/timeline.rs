//! Declarative timelines
//!
//! A [`TimelineSpec`] is an ordered list of tweens (and labels) describing
//! how marked elements transition between style values. Compiling validates
//! the description and resolves every entry's position to an absolute start
//! time; binding against a document resolves markers to elements and
//! produces one [`Track`] per element and property.
//!
//! Sampling a [`BoundTimeline`] is a pure function of time: the same `t`
//! always yields the same values no matter what was sampled before.
//!
//! ```
//! use realest_animation::{Position, TimelineSpec, TweenSpec};
//! use realest_core::Property;
//!
//! let compiled = TimelineSpec::new()
//!     .add(TweenSpec::to("data-the").prop(Property::Opacity, 0.0).duration(1.0))
//!     .add(
//!         TweenSpec::to("data-real")
//!             .prop(Property::Scale, 0.9)
//!             .duration(1.5)
//!             .at(Position::Absolute(0.5)),
//!     )
//!     .compile()
//!     .unwrap();
//! assert_eq!(compiled.entries()[1].start, 0.5);
//! ```

use std::str::FromStr;

use realest_core::{Document, NodeId, Property, StyleValue};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::easing::Easing;
use crate::error::{AnimationError, Result};
use crate::values::{normalize, Interpolate};

/// Duration of a tween that does not set one, in seconds
pub const DEFAULT_DURATION: f32 = 0.5;

/// How a tween derives its start and end values
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TweenKind {
    /// From the current value to the given value
    To,
    /// From the given value to the current value; renders its start immediately
    From,
    /// Between two explicit values; renders its start immediately
    FromTo,
    /// Jump to the given value at the tween's start
    Set,
}

/// One property transitioned by a tween
#[derive(Clone, Debug, PartialEq)]
pub struct PropTween {
    pub property: Property,
    pub from: Option<StyleValue>,
    pub to: Option<StyleValue>,
}

/// Where an entry starts on its timeline
#[derive(Clone, Debug, PartialEq)]
pub enum Position {
    /// Seconds from the start of the timeline
    Absolute(f32),
    /// Offset from the end of the previous entry (`"+=0.5"`)
    AfterPrevious(f32),
    /// Offset from the start of the previous entry (`"<"`, `"<0.2"`)
    WithPrevious(f32),
    /// Offset from a named label (`"values"`, `"values+=0.5"`)
    Label(String, f32),
}

impl Default for Position {
    fn default() -> Self {
        Position::AfterPrevious(0.0)
    }
}

fn parse_offset(s: &str, original: &str) -> Result<f32> {
    let invalid = || AnimationError::InvalidPosition(original.to_string());
    let s = s.trim();
    if s.is_empty() {
        return Ok(0.0);
    }
    let (sign, number) = if let Some(n) = s.strip_prefix("+=") {
        (1.0, n)
    } else if let Some(n) = s.strip_prefix("-=") {
        (-1.0, n)
    } else {
        return Err(invalid());
    };
    let value: f32 = number.trim().parse().map_err(|_| invalid())?;
    if !value.is_finite() {
        return Err(invalid());
    }
    Ok(sign * value)
}

impl FromStr for Position {
    type Err = AnimationError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Position::default());
        }
        if let Some(rest) = trimmed.strip_prefix('<') {
            return parse_offset(rest, s).map(Position::WithPrevious);
        }
        if trimmed.starts_with("+=") || trimmed.starts_with("-=") {
            return parse_offset(trimmed, s).map(Position::AfterPrevious);
        }
        if let Ok(at) = trimmed.parse::<f32>() {
            if at.is_finite() {
                return Ok(Position::Absolute(at));
            }
            return Err(AnimationError::InvalidPosition(s.to_string()));
        }
        let split = trimmed
            .find("+=")
            .or_else(|| trimmed.find("-="))
            .unwrap_or(trimmed.len());
        let (name, offset) = trimmed.split_at(split);
        if name.is_empty() || name.contains(char::is_whitespace) {
            return Err(AnimationError::InvalidPosition(s.to_string()));
        }
        Ok(Position::Label(name.to_string(), parse_offset(offset, s)?))
    }
}

/// A single tween: one target marker, one or more properties
#[derive(Clone, Debug, PartialEq)]
pub struct TweenSpec {
    /// Marker attribute selecting the targets (`"data-letter"`)
    pub target: String,
    pub kind: TweenKind,
    pub props: SmallVec<[PropTween; 4]>,
    /// Seconds
    pub duration: f32,
    pub ease: Easing,
    /// Seconds between the starts of consecutive targets
    pub stagger: f32,
    /// Seconds added to the resolved start
    pub delay: f32,
    pub position: Position,
}

impl TweenSpec {
    fn new(kind: TweenKind, target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            kind,
            props: SmallVec::new(),
            duration: if kind == TweenKind::Set {
                0.0
            } else {
                DEFAULT_DURATION
            },
            ease: Easing::default(),
            stagger: 0.0,
            delay: 0.0,
            position: Position::default(),
        }
    }

    pub fn to(target: impl Into<String>) -> Self {
        Self::new(TweenKind::To, target)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from(target: impl Into<String>) -> Self {
        Self::new(TweenKind::From, target)
    }

    pub fn from_to(target: impl Into<String>) -> Self {
        Self::new(TweenKind::FromTo, target)
    }

    pub fn set(target: impl Into<String>) -> Self {
        Self::new(TweenKind::Set, target)
    }

    fn entry(&mut self, property: Property) -> &mut PropTween {
        let index = match self.props.iter().position(|p| p.property == property) {
            Some(index) => index,
            None => {
                self.props.push(PropTween {
                    property,
                    from: None,
                    to: None,
                });
                self.props.len() - 1
            }
        };
        &mut self.props[index]
    }

    /// Set the value a property is tweened to (or from, for `from` tweens)
    pub fn prop(mut self, property: Property, value: impl Into<StyleValue>) -> Self {
        let value = value.into();
        let kind = self.kind;
        let entry = self.entry(property);
        match kind {
            TweenKind::From => entry.from = Some(value),
            _ => entry.to = Some(value),
        }
        self
    }

    /// Set both ends of a property transition
    pub fn range(
        mut self,
        property: Property,
        from: impl Into<StyleValue>,
        to: impl Into<StyleValue>,
    ) -> Self {
        let entry = self.entry(property);
        entry.from = Some(from.into());
        entry.to = Some(to.into());
        self
    }

    pub fn duration(mut self, seconds: f32) -> Self {
        self.duration = seconds;
        self
    }

    pub fn ease(mut self, ease: Easing) -> Self {
        self.ease = ease;
        self
    }

    pub fn stagger(mut self, seconds: f32) -> Self {
        self.stagger = seconds;
        self
    }

    pub fn delay(mut self, seconds: f32) -> Self {
        self.delay = seconds;
        self
    }

    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    fn validate(&self, index: usize) -> Result<()> {
        let timing = |field: &'static str| AnimationError::InvalidTiming {
            index,
            target: self.target.clone(),
            field,
        };
        let properties = |reason: &'static str| AnimationError::InvalidProperties {
            index,
            target: self.target.clone(),
            reason,
        };

        for (field, value) in [
            ("duration", self.duration),
            ("stagger", self.stagger),
            ("delay", self.delay),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(timing(field));
            }
        }
        if self.props.is_empty() {
            return Err(properties("no properties to animate"));
        }
        for prop in &self.props {
            let complete = match self.kind {
                TweenKind::To | TweenKind::Set => prop.to.is_some(),
                TweenKind::From => prop.from.is_some(),
                TweenKind::FromTo => prop.from.is_some() && prop.to.is_some(),
            };
            if !complete {
                return Err(properties("property is missing a required value"));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
enum TimelineItem {
    Tween(TweenSpec),
    Label(String, Position),
}

/// An ordered, not yet validated timeline description
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TimelineSpec {
    items: Vec<TimelineItem>,
}

impl TimelineSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a tween
    pub fn add(mut self, tween: TweenSpec) -> Self {
        self.items.push(TimelineItem::Tween(tween));
        self
    }

    /// Define a label that later positions can refer to
    pub fn label(mut self, name: impl Into<String>, position: Position) -> Self {
        self.items.push(TimelineItem::Label(name.into(), position));
        self
    }

    /// Number of tweens
    pub fn len(&self) -> usize {
        self.items
            .iter()
            .filter(|item| matches!(item, TimelineItem::Tween(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Validate every tween and resolve positions to absolute start times
    pub fn compile(&self) -> Result<CompiledTimeline> {
        let mut labels: FxHashMap<String, f32> = FxHashMap::default();
        let mut entries = Vec::with_capacity(self.items.len());
        let mut prev_start = 0.0_f32;
        let mut prev_end = 0.0_f32;

        let resolve = |position: &Position,
                       labels: &FxHashMap<String, f32>,
                       prev_start: f32,
                       prev_end: f32|
         -> Result<f32> {
            Ok(match position {
                Position::Absolute(at) => *at,
                Position::AfterPrevious(offset) => prev_end + offset,
                Position::WithPrevious(offset) => prev_start + offset,
                Position::Label(name, offset) => {
                    labels
                        .get(name)
                        .copied()
                        .ok_or_else(|| AnimationError::UnknownLabel(name.clone()))?
                        + offset
                }
            })
        };

        for item in &self.items {
            match item {
                TimelineItem::Label(name, position) => {
                    let at = resolve(position, &labels, prev_start, prev_end)?;
                    if !at.is_finite() || at < 0.0 {
                        return Err(AnimationError::InvalidPosition(name.clone()));
                    }
                    labels.insert(name.clone(), at);
                }
                TimelineItem::Tween(tween) => {
                    let index = entries.len();
                    tween.validate(index)?;
                    let start = resolve(&tween.position, &labels, prev_start, prev_end)?;
                    if !start.is_finite() || start < 0.0 {
                        return Err(AnimationError::NegativeStart {
                            index,
                            target: tween.target.clone(),
                            start,
                        });
                    }
                    prev_start = start;
                    prev_end = start + tween.delay + tween.duration;
                    entries.push(CompiledEntry {
                        spec: tween.clone(),
                        start,
                    });
                }
            }
        }

        Ok(CompiledTimeline { entries, labels })
    }
}

/// A validated tween with its resolved start time
#[derive(Clone, Debug, PartialEq)]
pub struct CompiledEntry {
    pub spec: TweenSpec,
    /// Seconds from the start of the timeline, before delay and stagger
    pub start: f32,
}

/// A validated timeline, independent of any document
#[derive(Clone, Debug, Default)]
pub struct CompiledTimeline {
    entries: Vec<CompiledEntry>,
    labels: FxHashMap<String, f32>,
}

impl CompiledTimeline {
    pub fn entries(&self) -> &[CompiledEntry] {
        &self.entries
    }

    /// Resolved time of a label
    pub fn label(&self, name: &str) -> Option<f32> {
        self.labels.get(name).copied()
    }

    /// Start time of each of `count` targets of entry `index`
    ///
    /// Target `i` starts at `start + delay + i * stagger`.
    pub fn schedule(&self, index: usize, count: usize) -> Vec<f32> {
        let Some(entry) = self.entries.get(index) else {
            return Vec::new();
        };
        let base = entry.start + entry.spec.delay;
        (0..count)
            .map(|i| base + i as f32 * entry.spec.stagger)
            .collect()
    }

    /// Total duration when entry `i` has `counts[i]` targets
    ///
    /// Entries with no targets (or missing counts) do not contribute.
    pub fn duration_for(&self, counts: &[usize]) -> f32 {
        self.entries
            .iter()
            .zip(counts)
            .filter(|(_, &count)| count > 0)
            .map(|(entry, &count)| {
                entry.start
                    + entry.spec.delay
                    + (count - 1) as f32 * entry.spec.stagger
                    + entry.spec.duration
            })
            .fold(0.0, f32::max)
    }

    /// Resolve targets under `scope` and build per-property tracks
    ///
    /// Start values of `to` tweens are captured from the document now, so
    /// binding must happen before anything else writes to the targets.
    pub fn bind(&self, doc: &Document, scope: NodeId) -> Result<BoundTimeline> {
        let viewport_height = doc.viewport().height;
        let mut tracks: Vec<TrackBuilder> = Vec::new();
        let mut slots: FxHashMap<(NodeId, Property), usize> = FxHashMap::default();

        for (entry_index, entry) in self.entries.iter().enumerate() {
            let targets = doc.query_all(scope, &entry.spec.target);
            if targets.is_empty() {
                return Err(AnimationError::MissingTarget(entry.spec.target.clone()));
            }
            let starts = self.schedule(entry_index, targets.len());

            for (&node, start) in targets.iter().zip(starts) {
                let own_size = doc.base_layout(node).height;
                for prop in &entry.spec.props {
                    let property = prop.property;
                    let slot = *slots.entry((node, property)).or_insert_with(|| {
                        let base = doc.computed(node, property);
                        tracks.push(TrackBuilder {
                            node,
                            property,
                            base: normalize(property, base, viewport_height, own_size),
                            pending: Vec::new(),
                        });
                        tracks.len() - 1
                    });
                    tracks[slot].pending.push(PendingSegment {
                        order: entry_index,
                        kind: entry.spec.kind,
                        start,
                        duration: entry.spec.duration,
                        ease: entry.spec.ease,
                        from: prop
                            .from
                            .map(|v| normalize(property, v, viewport_height, own_size)),
                        to: prop
                            .to
                            .map(|v| normalize(property, v, viewport_height, own_size)),
                    });
                }
            }
        }

        let tracks: Vec<Track> = tracks.into_iter().map(TrackBuilder::finish).collect();
        let duration = tracks
            .iter()
            .flat_map(|t| t.segments.iter())
            .map(|s| s.start + s.duration)
            .fold(0.0, f32::max);

        Ok(BoundTimeline { tracks, duration })
    }
}

struct PendingSegment {
    order: usize,
    kind: TweenKind,
    start: f32,
    duration: f32,
    ease: Easing,
    from: Option<StyleValue>,
    to: Option<StyleValue>,
}

struct TrackBuilder {
    node: NodeId,
    property: Property,
    base: StyleValue,
    pending: Vec<PendingSegment>,
}

impl TrackBuilder {
    fn finish(mut self) -> Track {
        self.pending.sort_by(|a, b| {
            a.start
                .total_cmp(&b.start)
                .then_with(|| a.order.cmp(&b.order))
        });

        // Each segment starts where the one before it ended
        let mut running = self.base;
        let mut segments = Vec::with_capacity(self.pending.len());
        for p in self.pending {
            let (from, to) = match p.kind {
                TweenKind::To | TweenKind::Set => (running, p.to.unwrap_or(running)),
                TweenKind::From => (p.from.unwrap_or(running), running),
                TweenKind::FromTo => (p.from.unwrap_or(running), p.to.unwrap_or(running)),
            };
            segments.push(Segment {
                start: p.start,
                duration: p.duration,
                ease: p.ease,
                from,
                to,
                immediate: matches!(p.kind, TweenKind::From | TweenKind::FromTo),
            });
            running = to;
        }

        Track {
            node: self.node,
            property: self.property,
            base: self.base,
            segments,
        }
    }
}

/// One transition of one property on one element
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    pub start: f32,
    pub duration: f32,
    pub ease: Easing,
    pub from: StyleValue,
    pub to: StyleValue,
    /// Shows `from` before `start` is reached
    pub immediate: bool,
}

impl Segment {
    fn value_at(&self, t: f32) -> StyleValue {
        let progress = if self.duration <= 0.0 {
            1.0
        } else {
            ((t - self.start) / self.duration).clamp(0.0, 1.0)
        };
        self.from.lerp(&self.to, self.ease.apply(progress))
    }
}

/// All segments for one element property, sorted by start time
#[derive(Clone, Debug, PartialEq)]
pub struct Track {
    pub node: NodeId,
    pub property: Property,
    /// Value captured at bind time
    pub base: StyleValue,
    pub segments: Vec<Segment>,
}

impl Track {
    pub fn sample(&self, t: f32) -> StyleValue {
        let started = self.segments.partition_point(|s| s.start <= t);
        match started {
            0 => match self.segments.first() {
                Some(first) if first.immediate => first.from,
                _ => self.base,
            },
            n => self.segments[n - 1].value_at(t),
        }
    }
}

/// A timeline resolved against concrete elements
#[derive(Clone, Debug, PartialEq)]
pub struct BoundTimeline {
    tracks: Vec<Track>,
    duration: f32,
}

impl BoundTimeline {
    /// End of the last segment, in seconds
    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Every animated value at time `t` (clamped to the timeline)
    pub fn sample(&self, t: f32) -> Vec<(NodeId, Property, StyleValue)> {
        let t = t.clamp(0.0, self.duration);
        self.tracks
            .iter()
            .map(|track| (track.node, track.property, track.sample(t)))
            .collect()
    }

    /// Like [`sample`](Self::sample), with `None` for tracks that have not
    /// started at `t`
    ///
    /// A track starts once `t` passes its first segment's start, or at once
    /// when that segment renders its start up front. Callers leave
    /// unstarted properties to whatever the document showed before.
    pub fn sample_started(&self, t: f32) -> Vec<(NodeId, Property, Option<StyleValue>)> {
        let t = t.clamp(0.0, self.duration);
        self.tracks
            .iter()
            .map(|track| {
                let started = track
                    .segments
                    .first()
                    .is_some_and(|first| first.immediate || t > first.start);
                (track.node, track.property, started.then(|| track.sample(t)))
            })
            .collect()
    }

    /// Sample at a fraction of the total duration
    pub fn sample_progress(&self, progress: f32) -> Vec<(NodeId, Property, StyleValue)> {
        self.sample(progress.clamp(0.0, 1.0) * self.duration)
    }

    /// Distinct elements this timeline writes to, in first-touched order
    pub fn targets(&self) -> Vec<NodeId> {
        let mut nodes: Vec<NodeId> = Vec::new();
        for track in &self.tracks {
            if !nodes.contains(&track.node) {
                nodes.push(track.node);
            }
        }
        nodes
    }
}
