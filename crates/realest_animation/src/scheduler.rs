//! Animation engine
//!
//! Owns every registered animation, grouped into contexts, and writes their
//! sampled values into the document. Mount animations advance on
//! [`Engine::tick`]; scroll-linked animations follow [`Engine::set_scroll`]
//! (and, when smoothed, catch up on `tick`).
//!
//! Every write is recorded against its context with the inline value it
//! replaced, so reverting a context restores the document exactly.

use std::sync::{Arc, Mutex, MutexGuard, Weak};

use realest_core::{Document, Length, NodeId, Property, SharedDocument, StyleValue};
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use tracing::{debug, trace};

use crate::context::ScopedContext;
use crate::error::{AnimationError, Result};
use crate::scroll_trigger::{smooth_toward, ScrollRange, ScrollTriggerSpec, Scrub, TriggerTarget};
use crate::timeline::BoundTimeline;

new_key_type! {
    /// Handle to a group of animations reverted together
    pub struct ContextId;
    /// Handle to a registered animation
    pub struct AnimationId;
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Engine settings
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EngineConfig {
    /// Frame rate the host should tick at
    pub target_fps: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { target_fps: 120 }
    }
}

impl EngineConfig {
    /// Seconds per frame at the target rate
    pub fn frame_duration(&self) -> f32 {
        1.0 / self.target_fps.max(1) as f32
    }
}

/// What drives an animation's time
#[derive(Clone, Debug, PartialEq)]
pub enum Playback {
    /// Play once from the start as soon as it is registered
    OnMount,
    /// Follow the scroll position
    Scroll(ScrollTriggerSpec),
}

#[derive(Debug)]
struct ScrollDriver {
    spec: ScrollTriggerSpec,
    /// `None` for page-wide triggers
    trigger: Option<NodeId>,
    pin: Option<NodeId>,
    range: ScrollRange,
    /// Progress the scroll position asks for
    target: f32,
    /// Progress currently rendered
    displayed: f32,
    /// Unscrubbed triggers play once the range is entered
    entered: bool,
    time: f32,
}

#[derive(Debug)]
enum Driver {
    Play { time: f32, playing: bool },
    Scroll(ScrollDriver),
}

#[derive(Debug)]
struct Animation {
    context: ContextId,
    timeline: BoundTimeline,
    driver: Driver,
    /// Inline value each started track replaced, handed back when the
    /// playhead returns before the track's start
    displaced: FxHashMap<(NodeId, Property), Option<StyleValue>>,
}

impl Animation {
    fn current_time(&self) -> f32 {
        match &self.driver {
            Driver::Play { time, .. } => *time,
            Driver::Scroll(s) => match s.spec.scrub {
                Scrub::Off if s.entered => s.time,
                Scrub::Off => 0.0,
                _ => s.displayed * self.timeline.duration(),
            },
        }
    }

    fn is_active(&self) -> bool {
        match &self.driver {
            Driver::Play { playing, .. } => *playing,
            Driver::Scroll(s) => match s.spec.scrub {
                Scrub::Off => s.entered && s.time < self.timeline.duration(),
                Scrub::Instant => false,
                Scrub::Smooth(_) => s.displayed != s.target,
            },
        }
    }

    /// Advance by `dt` seconds; returns whether anything moved
    fn advance(&mut self, dt: f32) -> bool {
        let duration = self.timeline.duration();
        match &mut self.driver {
            Driver::Play { time, playing } if *playing => {
                *time = (*time + dt).min(duration);
                if *time >= duration {
                    *playing = false;
                }
                true
            }
            Driver::Scroll(s) => match s.spec.scrub {
                Scrub::Smooth(lag) if s.displayed != s.target => {
                    s.displayed = smooth_toward(s.displayed, s.target, dt, lag);
                    true
                }
                Scrub::Off if s.entered && s.time < duration => {
                    s.time = (s.time + dt).min(duration);
                    true
                }
                _ => false,
            },
            _ => false,
        }
    }

    /// Jump to where the animation is heading
    fn finish(&mut self) {
        let duration = self.timeline.duration();
        match &mut self.driver {
            Driver::Play { time, playing } => {
                *time = duration;
                *playing = false;
            }
            Driver::Scroll(s) => {
                s.displayed = s.target;
                if s.entered {
                    s.time = duration;
                }
            }
        }
    }
}

#[derive(Debug)]
struct ContextRecord {
    doc: SharedDocument,
    root: NodeId,
    label: String,
    animations: Vec<AnimationId>,
    /// Inline value each written property had before the context touched it
    originals: FxHashMap<(NodeId, Property), Option<StyleValue>>,
    pinned: Vec<NodeId>,
}

impl ContextRecord {
    /// Write a style, remembering what it replaced; unchanged values are skipped
    fn write(&mut self, doc: &mut Document, node: NodeId, property: Property, value: StyleValue) {
        let current = doc.style(node, property);
        if current == Some(value) {
            return;
        }
        self.originals.entry((node, property)).or_insert(current);
        doc.set_style(node, property, value);
    }

    /// Put back a value a started track displaced
    fn restore(
        &mut self,
        doc: &mut Document,
        node: NodeId,
        property: Property,
        value: Option<StyleValue>,
    ) {
        match value {
            Some(value) => self.write(doc, node, property, value),
            None if doc.style(node, property).is_some() => doc.remove_style(node, property),
            None => {}
        }
    }

    fn render(&mut self, animation: &mut Animation, offset: f32) {
        let t = animation.current_time();
        let doc = Arc::clone(&self.doc);
        let mut doc = lock(&doc);
        for (node, property, value) in animation.timeline.sample_started(t) {
            match value {
                Some(value) => {
                    animation
                        .displaced
                        .entry((node, property))
                        .or_insert_with(|| doc.style(node, property));
                    self.write(&mut doc, node, property, value);
                }
                None => {
                    if let Some(previous) = animation.displaced.remove(&(node, property)) {
                        self.restore(&mut doc, node, property, previous);
                    }
                }
            }
        }
        if let Driver::Scroll(ScrollDriver {
            pin: Some(pin),
            range,
            ..
        }) = &animation.driver
        {
            let held = StyleValue::Length(Length::px(range.pin_offset(offset)));
            self.write(&mut doc, *pin, Property::PinOffset, held);
        }
    }
}

/// Internal state of the engine
struct EngineInner {
    contexts: SlotMap<ContextId, ContextRecord>,
    animations: SlotMap<AnimationId, Animation>,
    scroll_offset: f32,
}

impl EngineInner {
    fn measure(doc: &Document, trigger: Option<NodeId>, spec: &ScrollTriggerSpec) -> ScrollRange {
        let viewport_height = doc.viewport().height;
        let (top, height) = match trigger {
            Some(node) => (doc.layout_top(node), doc.base_layout(node).height),
            None => (0.0, doc.page_height()),
        };
        spec.measure(top, height, viewport_height)
    }

    /// Re-measure every scroll range against current layout and re-render
    fn refresh(&mut self) {
        let offset = self.scroll_offset;
        let EngineInner {
            contexts,
            animations,
            ..
        } = self;

        for (_, animation) in animations.iter_mut() {
            let Some(ctx) = contexts.get_mut(animation.context) else {
                continue;
            };
            if let Driver::Scroll(s) = &mut animation.driver {
                let mut doc = lock(&ctx.doc);
                s.range = Self::measure(&doc, s.trigger, &s.spec);
                if let Some(pin) = s.pin {
                    if doc.reserved_space(pin) != s.range.distance() {
                        doc.reserve_space(pin, s.range.distance());
                    }
                }
                drop(doc);
                Self::follow(s, offset);
            }
            ctx.render(animation, offset);
        }
    }

    /// Update a scroll driver's target for `offset`
    fn follow(s: &mut ScrollDriver, offset: f32) {
        s.target = s.range.progress(offset);
        match s.spec.scrub {
            Scrub::Instant => s.displayed = s.target,
            Scrub::Smooth(_) => {}
            Scrub::Off => {
                if !s.entered && offset >= s.range.start {
                    s.entered = true;
                    s.time = 0.0;
                }
            }
        }
    }
}

/// The animation engine
///
/// Cheap to share behind an `Arc`; contexts hold a weak [`EngineHandle`] so
/// dropping the engine never leaks or panics.
pub struct Engine {
    inner: Arc<Mutex<EngineInner>>,
    config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(EngineInner {
                contexts: SlotMap::with_key(),
                animations: SlotMap::with_key(),
                scroll_offset: 0.0,
            })),
            config,
        }
    }

    pub fn config(&self) -> EngineConfig {
        self.config
    }

    /// Get a handle for passing to contexts
    pub fn handle(&self) -> EngineHandle {
        EngineHandle {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Open a context whose animations may only touch `root` and its
    /// descendants
    pub fn create_context(
        &self,
        doc: SharedDocument,
        root: NodeId,
        label: impl Into<String>,
    ) -> ScopedContext {
        let label = label.into();
        let id = lock(&self.inner).contexts.insert(ContextRecord {
            doc,
            root,
            label: label.clone(),
            animations: Vec::new(),
            originals: FxHashMap::default(),
            pinned: Vec::new(),
        });
        debug!(context = %label, "animation context created");
        ScopedContext::new(self.handle(), id, root)
    }

    /// Current scroll position of the page
    pub fn scroll_offset(&self) -> f32 {
        lock(&self.inner).scroll_offset
    }

    /// Move the page to `offset` and update every scroll-linked animation
    pub fn set_scroll(&self, offset: f32) {
        let mut inner = lock(&self.inner);
        inner.scroll_offset = offset;
        let EngineInner {
            contexts,
            animations,
            ..
        } = &mut *inner;

        for (_, animation) in animations.iter_mut() {
            let Driver::Scroll(s) = &mut animation.driver else {
                continue;
            };
            EngineInner::follow(s, offset);
            if let Some(ctx) = contexts.get_mut(animation.context) {
                ctx.render(animation, offset);
            }
        }
    }

    /// Re-measure scroll ranges after a layout change
    pub fn refresh(&self) {
        lock(&self.inner).refresh();
    }

    /// Advance all animations by `dt` seconds
    ///
    /// Returns true if any animations are still active (need another tick).
    pub fn tick(&self, dt: f32) -> bool {
        let mut inner = lock(&self.inner);
        let offset = inner.scroll_offset;
        let EngineInner {
            contexts,
            animations,
            ..
        } = &mut *inner;

        let mut active = false;
        for (_, animation) in animations.iter_mut() {
            if animation.advance(dt) {
                if let Some(ctx) = contexts.get_mut(animation.context) {
                    ctx.render(animation, offset);
                }
            }
            active |= animation.is_active();
        }
        trace!(dt, active, "engine tick");
        active
    }

    /// Jump every animation to where it is heading
    pub fn settle(&self) {
        let mut inner = lock(&self.inner);
        let offset = inner.scroll_offset;
        let EngineInner {
            contexts,
            animations,
            ..
        } = &mut *inner;

        for (_, animation) in animations.iter_mut() {
            animation.finish();
            if let Some(ctx) = contexts.get_mut(animation.context) {
                ctx.render(animation, offset);
            }
        }
    }

    /// Check if any animations are still active
    pub fn has_active_animations(&self) -> bool {
        lock(&self.inner)
            .animations
            .iter()
            .any(|(_, a)| a.is_active())
    }

    /// Number of open contexts
    pub fn context_count(&self) -> usize {
        lock(&self.inner).contexts.len()
    }

    /// Number of registered animations
    pub fn animation_count(&self) -> usize {
        lock(&self.inner).animations.len()
    }

    /// Number of scroll-linked animations listening to the page position
    pub fn listener_count(&self) -> usize {
        lock(&self.inner)
            .animations
            .iter()
            .filter(|(_, a)| matches!(a.driver, Driver::Scroll(_)))
            .count()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("contexts", &self.context_count())
            .field("animations", &self.animation_count())
            .finish()
    }
}

/// A weak handle to the engine
///
/// It won't prevent the engine from being dropped.
#[derive(Clone, Debug)]
pub struct EngineHandle {
    inner: Weak<Mutex<EngineInner>>,
}

impl std::fmt::Debug for EngineInner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineInner")
            .field("contexts", &self.contexts.len())
            .field("animations", &self.animations.len())
            .finish()
    }
}

impl EngineHandle {
    fn with_context<R>(
        &self,
        id: ContextId,
        f: impl FnOnce(&mut EngineInner) -> Result<R>,
    ) -> Result<R> {
        let inner = self.inner.upgrade().ok_or(AnimationError::ContextReverted)?;
        let mut guard = lock(&inner);
        if !guard.contexts.contains_key(id) {
            return Err(AnimationError::ContextReverted);
        }
        f(&mut guard)
    }

    /// Write a style now; it is restored when the context reverts
    pub(crate) fn set_style(
        &self,
        id: ContextId,
        node: NodeId,
        property: Property,
        value: StyleValue,
    ) -> Result<()> {
        self.with_context(id, |inner| {
            let ctx = inner
                .contexts
                .get_mut(id)
                .ok_or(AnimationError::ContextReverted)?;
            let doc = Arc::clone(&ctx.doc);
            let mut doc = lock(&doc);
            if !doc.contains(ctx.root, node) {
                return Err(AnimationError::OutOfScope);
            }
            ctx.write(&mut doc, node, property, value);
            Ok(())
        })
    }

    /// Register a bound timeline and render its first frame
    pub(crate) fn register(
        &self,
        id: ContextId,
        timeline: BoundTimeline,
        playback: Playback,
    ) -> Result<AnimationId> {
        self.with_context(id, |inner| {
            let ctx = inner
                .contexts
                .get_mut(id)
                .ok_or(AnimationError::ContextReverted)?;
            let doc = Arc::clone(&ctx.doc);
            let guard = lock(&doc);
            if timeline
                .targets()
                .iter()
                .any(|node| !guard.contains(ctx.root, *node))
            {
                return Err(AnimationError::OutOfScope);
            }

            let driver = match playback {
                Playback::OnMount => Driver::Play {
                    time: 0.0,
                    playing: timeline.duration() > 0.0,
                },
                Playback::Scroll(spec) => {
                    let trigger = match &spec.trigger {
                        TriggerTarget::Scope => Some(ctx.root),
                        TriggerTarget::Page => None,
                        TriggerTarget::Marker(marker) => Some(
                            guard
                                .query(guard.root(), marker)
                                .ok_or_else(|| AnimationError::MissingTarget(marker.clone()))?,
                        ),
                    };
                    let pin = spec.pin.then_some(ctx.root);
                    if let Some(pin) = pin {
                        ctx.pinned.push(pin);
                    }
                    Driver::Scroll(ScrollDriver {
                        spec,
                        trigger,
                        pin,
                        range: ScrollRange::default(),
                        target: 0.0,
                        displayed: 0.0,
                        entered: false,
                        time: 0.0,
                    })
                }
            };
            drop(guard);

            let scroll_linked = matches!(driver, Driver::Scroll(_));
            let animation_id = inner.animations.insert(Animation {
                context: id,
                timeline,
                driver,
                displaced: FxHashMap::default(),
            });
            if let Some(ctx) = inner.contexts.get_mut(id) {
                ctx.animations.push(animation_id);
                trace!(context = %ctx.label, scroll_linked, "animation registered");
            }

            if scroll_linked {
                // New pins shift everything below them
                inner.refresh();
                // A scrubbed timeline starts out at its scroll position
                if let Some(Driver::Scroll(s)) =
                    inner.animations.get_mut(animation_id).map(|a| &mut a.driver)
                {
                    s.displayed = s.target;
                }
            }
            let offset = inner.scroll_offset;
            let EngineInner {
                contexts,
                animations,
                ..
            } = inner;
            if let (Some(ctx), Some(animation)) =
                (contexts.get_mut(id), animations.get_mut(animation_id))
            {
                ctx.render(animation, offset);
            }
            Ok(animation_id)
        })
    }

    /// Number of animations registered in a context
    pub(crate) fn animation_count(&self, id: ContextId) -> usize {
        self.with_context(id, |inner| {
            Ok(inner
                .contexts
                .get(id)
                .map(|ctx| ctx.animations.len())
                .unwrap_or(0))
        })
        .unwrap_or(0)
    }

    /// Remove a context's animations and restore everything it wrote
    ///
    /// Returns false if the context was already reverted.
    pub(crate) fn revert(&self, id: ContextId) -> bool {
        let Some(inner) = self.inner.upgrade() else {
            return false;
        };
        let mut inner = lock(&inner);
        let Some(ctx) = inner.contexts.remove(id) else {
            return false;
        };
        for animation in &ctx.animations {
            inner.animations.remove(*animation);
        }

        let mut doc = lock(&ctx.doc);
        for ((node, property), original) in &ctx.originals {
            match original {
                Some(value) => doc.set_style(*node, *property, *value),
                None => doc.remove_style(*node, *property),
            }
        }
        for pin in &ctx.pinned {
            doc.release_space(*pin);
        }
        drop(doc);

        if !ctx.pinned.is_empty() {
            inner.refresh();
        }
        debug!(
            context = %ctx.label,
            restored = ctx.originals.len(),
            "animation context reverted"
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scroll_trigger::{Edge, RangeEnd, RangeStart};
    use crate::timeline::{Position, TimelineSpec, TweenSpec};
    use realest_core::{LayoutBox, Viewport};

    fn page() -> (SharedDocument, NodeId, NodeId) {
        let mut doc = Document::new(Viewport::new(1000.0, 800.0));
        let section = doc.create_element(doc.root(), "section", &["data-hero"]);
        doc.set_layout(
            section,
            LayoutBox {
                top: 0.0,
                height: 800.0,
            },
        );
        let title = doc.create_element(section, "h1", &["data-title"]);
        let below = doc.create_element(doc.root(), "section", &["data-below"]);
        doc.set_layout(
            below,
            LayoutBox {
                top: 800.0,
                height: 800.0,
            },
        );
        (doc.into_shared(), section, title)
    }

    fn below(doc: &SharedDocument) -> NodeId {
        let d = doc.lock().unwrap();
        d.query(d.root(), "data-below").unwrap()
    }

    fn fade_out(doc: &SharedDocument, scope: NodeId) -> BoundTimeline {
        TimelineSpec::new()
            .add(
                TweenSpec::to("data-title")
                    .prop(Property::Opacity, 0.0)
                    .duration(1.0),
            )
            .compile()
            .unwrap()
            .bind(&doc.lock().unwrap(), scope)
            .unwrap()
    }

    fn opacity(doc: &SharedDocument, node: NodeId) -> f32 {
        doc.lock()
            .unwrap()
            .computed(node, Property::Opacity)
            .as_f32()
            .unwrap()
    }

    #[test]
    fn test_mount_animation_plays_on_tick() {
        let engine = Engine::default();
        let (doc, section, title) = page();
        let ctx = engine.create_context(doc.clone(), section, "hero");
        ctx.add(fade_out(&doc, section), Playback::OnMount).unwrap();

        assert_eq!(opacity(&doc, title), 1.0);
        assert!(engine.tick(0.5));
        let mid = opacity(&doc, title);
        assert!(mid > 0.0 && mid < 1.0);
        assert!(!engine.tick(1.0));
        assert_eq!(opacity(&doc, title), 0.0);
        assert!(!engine.has_active_animations());
    }

    #[test]
    fn test_scroll_animation_follows_offset() {
        let engine = Engine::default();
        let (doc, section, title) = page();
        let ctx = engine.create_context(doc.clone(), section, "hero");
        let trigger = ScrollTriggerSpec::new(TriggerTarget::Scope)
            .start(RangeStart::new(Edge::Top, Edge::Top))
            .end(RangeEnd::Relative(Length::percent(100.0)))
            .scrub(Scrub::Instant);
        ctx.add(fade_out(&doc, section), Playback::Scroll(trigger))
            .unwrap();
        assert_eq!(engine.listener_count(), 1);

        engine.set_scroll(800.0);
        assert_eq!(opacity(&doc, title), 0.0);
        engine.set_scroll(0.0);
        assert_eq!(opacity(&doc, title), 1.0);
        // Same offset, same frame
        engine.set_scroll(400.0);
        let first = opacity(&doc, title);
        engine.set_scroll(700.0);
        engine.set_scroll(400.0);
        assert_eq!(opacity(&doc, title), first);
    }

    #[test]
    fn test_scrolling_back_hands_back_displaced_styles() {
        let engine = Engine::default();
        let (doc, section, title) = page();
        doc.lock()
            .unwrap()
            .set_style(title, Property::Scale, StyleValue::Number(0.8));
        let ctx = engine.create_context(doc.clone(), section, "hero");
        let late = TimelineSpec::new()
            .add(
                TweenSpec::to("data-title")
                    .prop(Property::Opacity, 0.0)
                    .prop(Property::Scale, 1.0)
                    .duration(0.5)
                    .at(Position::Absolute(0.5)),
            )
            .compile()
            .unwrap()
            .bind(&doc.lock().unwrap(), section)
            .unwrap();
        let trigger = ScrollTriggerSpec::new(TriggerTarget::Scope)
            .start(RangeStart::new(Edge::Top, Edge::Top))
            .end(RangeEnd::Relative(Length::percent(100.0)))
            .scrub(Scrub::Instant);
        ctx.add(late, Playback::Scroll(trigger)).unwrap();

        engine.set_scroll(100.0);
        let before = doc.lock().unwrap().snapshot();
        assert_eq!(doc.lock().unwrap().style(title, Property::Opacity), None);

        engine.set_scroll(700.0);
        assert!(opacity(&doc, title) < 1.0);

        // Inline styles, not just computed ones, match the first visit
        engine.set_scroll(100.0);
        let d = doc.lock().unwrap();
        assert_eq!(d.snapshot(), before);
        assert_eq!(d.style(title, Property::Scale), Some(StyleValue::Number(0.8)));
    }

    #[test]
    fn test_unscrubbed_trigger_plays_once_on_entry() {
        let engine = Engine::default();
        let (doc, section, title) = page();
        let ctx = engine.create_context(doc.clone(), section, "hero");
        let trigger = ScrollTriggerSpec::new(TriggerTarget::Marker("data-below".to_string()))
            .start(RangeStart::new(Edge::Top, Edge::Top))
            .scrub(Scrub::Off);
        ctx.add(fade_out(&doc, section), Playback::Scroll(trigger))
            .unwrap();

        // Before the range nothing is written
        engine.set_scroll(400.0);
        assert_eq!(doc.lock().unwrap().style(title, Property::Opacity), None);
        assert!(!engine.has_active_animations());

        // Entering starts the clock at zero
        engine.set_scroll(800.0);
        assert_eq!(opacity(&doc, title), 1.0);
        assert!(engine.has_active_animations());

        // Time, not scroll, moves it along
        assert!(engine.tick(0.5));
        let mid = opacity(&doc, title);
        assert!(mid > 0.0 && mid < 1.0);
        engine.set_scroll(900.0);
        assert_eq!(opacity(&doc, title), mid);
        engine.tick(1.0);
        assert_eq!(opacity(&doc, title), 0.0);
        assert!(!engine.has_active_animations());

        // Leaving the range does not reverse it
        engine.set_scroll(0.0);
        engine.settle();
        assert_eq!(opacity(&doc, title), 0.0);
    }

    #[test]
    fn test_smooth_scrub_catches_up() {
        let engine = Engine::default();
        let (doc, section, title) = page();
        let ctx = engine.create_context(doc.clone(), section, "hero");
        let trigger = ScrollTriggerSpec::new(TriggerTarget::Scope)
            .start(RangeStart::new(Edge::Top, Edge::Top))
            .end(RangeEnd::Relative(Length::percent(100.0)))
            .scrub(Scrub::Smooth(1.0));
        ctx.add(fade_out(&doc, section), Playback::Scroll(trigger))
            .unwrap();

        engine.set_scroll(800.0);
        assert_eq!(opacity(&doc, title), 1.0);
        assert!(engine.tick(1.0 / 120.0));
        assert!(opacity(&doc, title) < 1.0);
        engine.settle();
        assert_eq!(opacity(&doc, title), 0.0);
        assert!(!engine.has_active_animations());
    }

    #[test]
    fn test_pin_reserves_space_until_reverted() {
        let engine = Engine::default();
        let (doc, section, _) = page();
        let below = below(&doc);

        let mut ctx = engine.create_context(doc.clone(), section, "hero");
        let trigger = ScrollTriggerSpec::new(TriggerTarget::Scope)
            .start(RangeStart::new(Edge::Top, Edge::Top))
            .end(RangeEnd::Relative(Length::percent(400.0)))
            .scrub(Scrub::Instant)
            .pin(true);
        ctx.add(fade_out(&doc, section), Playback::Scroll(trigger))
            .unwrap();

        assert_eq!(doc.lock().unwrap().layout_top(below), 800.0 + 3200.0);
        engine.set_scroll(1600.0);
        assert_eq!(
            doc.lock().unwrap().style(section, Property::PinOffset),
            Some(StyleValue::Length(Length::px(1600.0)))
        );

        assert!(ctx.revert());
        let d = doc.lock().unwrap();
        assert_eq!(d.layout_top(below), 800.0);
        assert_eq!(d.style(section, Property::PinOffset), None);
    }

    #[test]
    fn test_revert_restores_prior_inline_values() {
        let engine = Engine::default();
        let (doc, section, title) = page();
        doc.lock()
            .unwrap()
            .set_style(title, Property::Opacity, StyleValue::Number(0.5));

        let mut ctx = engine.create_context(doc.clone(), section, "hero");
        ctx.set(title, Property::Scale, StyleValue::Number(2.0))
            .unwrap();
        ctx.add(fade_out(&doc, section), Playback::OnMount).unwrap();
        engine.settle();
        assert_eq!(opacity(&doc, title), 0.0);

        assert!(ctx.revert());
        assert!(!ctx.revert());
        let d = doc.lock().unwrap();
        assert_eq!(d.style(title, Property::Opacity), Some(StyleValue::Number(0.5)));
        assert_eq!(d.style(title, Property::Scale), None);
        drop(d);
        assert_eq!(engine.context_count(), 0);
        assert_eq!(engine.animation_count(), 0);
        assert_eq!(engine.listener_count(), 0);
    }

    #[test]
    fn test_writes_outside_scope_are_rejected() {
        let engine = Engine::default();
        let (doc, section, title) = page();
        let outside = below(&doc);
        let ctx = engine.create_context(doc.clone(), title, "title");
        assert_eq!(
            ctx.set(outside, Property::Opacity, StyleValue::Number(0.0)),
            Err(AnimationError::OutOfScope)
        );
        // Bound under the section, which is wider than this context's root
        let wide = TimelineSpec::new()
            .add(TweenSpec::to("data-hero").prop(Property::Opacity, 0.0))
            .compile()
            .unwrap()
            .bind(&doc.lock().unwrap(), section)
            .unwrap();
        assert_eq!(
            ctx.add(wide, Playback::OnMount),
            Err(AnimationError::OutOfScope)
        );
    }

    #[test]
    fn test_dropping_context_reverts() {
        let engine = Engine::default();
        let (doc, section, title) = page();
        {
            let ctx = engine.create_context(doc.clone(), section, "hero");
            ctx.add(fade_out(&doc, section), Playback::OnMount).unwrap();
            engine.settle();
            assert_eq!(opacity(&doc, title), 0.0);
        }
        assert_eq!(opacity(&doc, title), 1.0);
        assert_eq!(engine.context_count(), 0);
    }

    #[test]
    fn test_frame_duration() {
        let config = EngineConfig { target_fps: 120 };
        assert!((config.frame_duration() - 1.0 / 120.0).abs() < 1e-9);
    }
}
