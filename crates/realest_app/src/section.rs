//! Section controller
//!
//! Every animated section of the page is described by a declarative
//! [`SectionSpec`] and driven by one [`SectionController`]:
//!
//! ```text
//! Inactive --activate--> Activating --+--> Active --deactivate--> Deactivating --> Inactive
//!                                     |
//!                                     +--> Static(reason) --deactivate--> Inactive
//! ```
//!
//! A section that cannot animate (no engine, reduced motion, missing markup,
//! a malformed timeline) settles into `Static` without touching the
//! document, so the author's default styles are what the visitor sees.
//! Deactivating reverts the section's context, removing its animations and
//! scroll listeners and restoring every style it wrote.

use std::sync::{Mutex, MutexGuard};

use realest_animation::{
    AnimationError, BoundTimeline, CompiledTimeline, Engine, EngineAccess, Playback,
    ScopedContext, TimelineSpec, TriggerTarget,
};
use realest_core::{Document, MotionPreference, NodeId, Property, SharedDocument, StyleValue};
use tracing::{debug, warn};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

// =============================================================================
// Declarative description
// =============================================================================

/// A style written when the section activates, before any timeline is bound
///
/// Sections that slide over earlier content start hidden this way so nothing
/// flashes before their scroll-linked animations take over.
#[derive(Clone, Debug, PartialEq)]
pub struct InitialStyle {
    pub target: String,
    pub property: Property,
    pub value: StyleValue,
}

/// One timeline and what drives it
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationSpec {
    pub timeline: TimelineSpec,
    pub playback: Playback,
}

/// Everything a section needs to animate
#[derive(Clone, Debug, PartialEq)]
pub struct SectionSpec {
    pub name: String,
    /// Marker on the section's root element
    pub root: String,
    /// Markers that must exist under the root
    pub required: Vec<String>,
    pub initial: Vec<InitialStyle>,
    pub animations: Vec<AnimationSpec>,
}

impl SectionSpec {
    pub fn new(name: impl Into<String>, root: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
            required: Vec::new(),
            initial: Vec::new(),
            animations: Vec::new(),
        }
    }

    pub fn require(mut self, marker: impl Into<String>) -> Self {
        self.required.push(marker.into());
        self
    }

    /// Write `value` to every `target` under the root on activation
    pub fn initial(
        mut self,
        target: impl Into<String>,
        property: Property,
        value: impl Into<StyleValue>,
    ) -> Self {
        self.initial.push(InitialStyle {
            target: target.into(),
            property,
            value: value.into(),
        });
        self
    }

    pub fn animate(mut self, timeline: TimelineSpec, playback: Playback) -> Self {
        self.animations.push(AnimationSpec { timeline, playback });
        self
    }

    pub fn on_mount(self, timeline: TimelineSpec) -> Self {
        self.animate(timeline, Playback::OnMount)
    }

    /// Check everything against the document without writing to it
    fn prepare(&self, doc: &Document) -> Result<Prepared, StaticReason> {
        let root = doc
            .query(doc.root(), &self.root)
            .ok_or_else(|| self.missing(&self.root))?;

        for marker in &self.required {
            if doc.query(root, marker).is_none() {
                return Err(self.missing(marker));
            }
        }

        let mut initial = Vec::new();
        for style in &self.initial {
            let targets = doc.query_all(root, &style.target);
            if targets.is_empty() {
                return Err(self.missing(&style.target));
            }
            initial.extend(targets.into_iter().map(|node| (node, style.property, style.value)));
        }

        let mut timelines = Vec::with_capacity(self.animations.len());
        for animation in &self.animations {
            let compiled = animation.timeline.compile().map_err(|err| {
                warn!(section = %self.name, %err, "invalid timeline");
                StaticReason::InvalidTimeline
            })?;
            if let Some(entry) = compiled
                .entries()
                .iter()
                .find(|entry| doc.query(root, &entry.spec.target).is_none())
            {
                return Err(self.missing(&entry.spec.target));
            }
            if let Playback::Scroll(trigger) = &animation.playback {
                if let TriggerTarget::Marker(marker) = &trigger.trigger {
                    if doc.query(doc.root(), marker).is_none() {
                        return Err(self.missing(marker));
                    }
                }
            }
            timelines.push((compiled, animation.playback.clone()));
        }

        Ok(Prepared {
            root,
            initial,
            timelines,
        })
    }

    fn missing(&self, marker: &str) -> StaticReason {
        debug!(section = %self.name, marker, "section markup missing, rendering static");
        StaticReason::MissingTarget
    }
}

struct Prepared {
    root: NodeId,
    initial: Vec<(NodeId, Property, StyleValue)>,
    timelines: Vec<(CompiledTimeline, Playback)>,
}

// =============================================================================
// State machine
// =============================================================================

/// Why a section renders without animation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StaticReason {
    /// No rendering surface, or the engine failed to load
    NoEngine,
    /// The visitor asked for reduced motion
    ReducedMotion,
    /// The root or a target marker is absent
    MissingTarget,
    /// A timeline failed validation
    InvalidTimeline,
}

/// Lifecycle of a section
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SectionState {
    #[default]
    Inactive,
    /// Waiting for the engine
    Activating,
    Active,
    Static(StaticReason),
    /// Reverting its context
    Deactivating,
}

impl SectionState {
    pub fn is_active(self) -> bool {
        self == SectionState::Active
    }
}

#[derive(Default)]
struct ControllerInner {
    state: SectionState,
    /// Bumped on every activation and deactivation; a pending activation
    /// whose generation is stale must not touch the document
    generation: u64,
    context: Option<ScopedContext>,
}

/// Drives one section through its lifecycle
pub struct SectionController {
    spec: SectionSpec,
    inner: Mutex<ControllerInner>,
}

impl SectionController {
    pub fn new(spec: SectionSpec) -> Self {
        Self {
            spec,
            inner: Mutex::new(ControllerInner::default()),
        }
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn spec(&self) -> &SectionSpec {
        &self.spec
    }

    pub fn state(&self) -> SectionState {
        lock(&self.inner).state
    }

    /// Animations currently registered for this section
    pub fn animation_count(&self) -> usize {
        lock(&self.inner)
            .context
            .as_ref()
            .map_or(0, ScopedContext::animation_count)
    }

    /// Run `f` against the section's live context, if it has one
    pub fn with_context<R>(&self, f: impl FnOnce(&ScopedContext) -> R) -> Option<R> {
        lock(&self.inner).context.as_ref().map(f)
    }

    /// Mount the section
    ///
    /// Resolves to `Active` or `Static`, or to whatever state a concurrent
    /// [`deactivate`](Self::deactivate) left behind if it ran while the engine
    /// was loading. Calling this on a section that is not `Inactive` changes
    /// nothing.
    pub async fn activate<A>(
        &self,
        doc: &SharedDocument,
        engine: &A,
        motion: &dyn MotionPreference,
    ) -> SectionState
    where
        A: EngineAccess + ?Sized,
    {
        let generation = {
            let mut inner = lock(&self.inner);
            if inner.state != SectionState::Inactive {
                return inner.state;
            }
            if motion.prefers_reduced_motion() {
                debug!(section = %self.spec.name, "reduced motion, rendering static");
                inner.state = SectionState::Static(StaticReason::ReducedMotion);
                return inner.state;
            }
            inner.generation += 1;
            inner.state = SectionState::Activating;
            inner.generation
        };

        let engine = engine.acquire().await;

        let mut inner = lock(&self.inner);
        if inner.generation != generation || inner.state != SectionState::Activating {
            debug!(section = %self.spec.name, "activation cancelled");
            return inner.state;
        }
        // The preference may have flipped while the engine loaded
        if motion.prefers_reduced_motion() {
            inner.state = SectionState::Static(StaticReason::ReducedMotion);
            return inner.state;
        }
        let Some(engine) = engine else {
            debug!(section = %self.spec.name, "no animation engine, rendering static");
            inner.state = SectionState::Static(StaticReason::NoEngine);
            return inner.state;
        };

        inner.state = match self.build(doc, &engine) {
            Ok(context) => {
                inner.context = Some(context);
                debug!(section = %self.spec.name, "section active");
                SectionState::Active
            }
            Err(reason) => SectionState::Static(reason),
        };
        inner.state
    }

    /// Unmount the section, reverting everything it did
    ///
    /// Also cancels a pending activation. Returns false if the section was
    /// already inactive.
    pub fn deactivate(&self) -> bool {
        let mut inner = lock(&self.inner);
        inner.generation += 1;
        if inner.state == SectionState::Inactive {
            return false;
        }
        inner.state = SectionState::Deactivating;
        if let Some(mut context) = inner.context.take() {
            context.revert();
        }
        inner.state = SectionState::Inactive;
        debug!(section = %self.spec.name, "section deactivated");
        true
    }

    /// Create the context, write the initial styles and register timelines
    ///
    /// Nothing is written unless every check in [`SectionSpec::prepare`]
    /// passes.
    fn build(&self, doc: &SharedDocument, engine: &Engine) -> Result<ScopedContext, StaticReason> {
        let prepared = {
            let guard = lock(doc);
            self.spec.prepare(&guard)?
        };

        let context = engine.create_context(doc.clone(), prepared.root, self.spec.name.clone());
        let abort = |err: AnimationError| {
            warn!(section = %self.spec.name, %err, "section setup failed");
            StaticReason::MissingTarget
        };

        for (node, property, value) in prepared.initial {
            context.set(node, property, value).map_err(abort)?;
        }

        // Bind after the initial styles so `to` tweens start from them
        let bound: Vec<(BoundTimeline, Playback)> = {
            let guard = lock(doc);
            prepared
                .timelines
                .into_iter()
                .map(|(compiled, playback)| {
                    compiled
                        .bind(&guard, prepared.root)
                        .map(|timeline| (timeline, playback))
                })
                .collect::<Result<_, _>>()
                .map_err(abort)?
        };

        for (timeline, playback) in bound {
            context.add(timeline, playback).map_err(abort)?;
        }
        Ok(context)
    }
}

impl std::fmt::Debug for SectionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SectionController")
            .field("name", &self.spec.name)
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use realest_animation::{
        Edge, EngineCell, EngineConfig, EngineLoader, LoadError, RangeStart, ScrollTriggerSpec,
        Scrub, SurfaceLoader, TweenSpec,
    };
    use realest_core::{FixedMotionPreference, LayoutBox, Length, SharedMotionPreference, Viewport};
    use std::sync::Arc;
    use tokio::sync::Notify;

    fn page() -> (SharedDocument, NodeId, NodeId) {
        let mut doc = Document::new(Viewport::new(1000.0, 800.0));
        let section = doc.create_element(doc.root(), "section", &["data-demo"]);
        doc.set_layout(
            section,
            LayoutBox {
                top: 0.0,
                height: 800.0,
            },
        );
        let title = doc.create_element(section, "h2", &["data-demo-title"]);
        for _ in 0..3 {
            doc.create_element(section, "div", &["data-demo-item"]);
        }
        (doc.into_shared(), section, title)
    }

    fn demo_spec() -> SectionSpec {
        SectionSpec::new("demo", "data-demo")
            .require("data-demo-title")
            .initial("data-demo-item", Property::Opacity, 0.0)
            .on_mount(
                TimelineSpec::new().add(
                    TweenSpec::from("data-demo-title")
                        .prop(Property::Y, Length::px(40.0))
                        .duration(0.6),
                ),
            )
            .animate(
                TimelineSpec::new().add(
                    TweenSpec::to("data-demo-item")
                        .prop(Property::Opacity, 1.0)
                        .stagger(0.1),
                ),
                Playback::Scroll(
                    ScrollTriggerSpec::new(TriggerTarget::Scope)
                        .start(RangeStart::new(Edge::Top, Edge::Top))
                        .scrub(Scrub::Instant),
                ),
            )
    }

    fn engine_cell() -> EngineCell<SurfaceLoader> {
        EngineCell::new(SurfaceLoader::new(EngineConfig::default()))
    }

    #[tokio::test]
    async fn test_reduced_motion_leaves_document_untouched() {
        let (doc, _, _) = page();
        let before = doc.lock().unwrap().snapshot();
        let mutations = doc.lock().unwrap().mutation_count();
        let cell = engine_cell();

        let controller = SectionController::new(demo_spec());
        let state = controller
            .activate(&doc, &cell, &FixedMotionPreference(true))
            .await;
        assert_eq!(state, SectionState::Static(StaticReason::ReducedMotion));
        // The engine is never loaded for a static section
        assert_eq!(cell.load_count(), 0);

        // Rendering twice produces the same document
        assert!(controller.deactivate());
        controller
            .activate(&doc, &cell, &FixedMotionPreference(true))
            .await;
        let d = doc.lock().unwrap();
        assert_eq!(d.snapshot(), before);
        assert_eq!(d.mutation_count(), mutations);
    }

    #[tokio::test]
    async fn test_headless_host_renders_static() {
        let (doc, _, _) = page();
        let cell = EngineCell::new(SurfaceLoader::headless());
        let controller = SectionController::new(demo_spec());
        let state = controller
            .activate(&doc, &cell, &FixedMotionPreference(false))
            .await;
        assert_eq!(state, SectionState::Static(StaticReason::NoEngine));
        assert_eq!(controller.animation_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_markup_renders_static() {
        let (doc, _, _) = page();
        let mutations = doc.lock().unwrap().mutation_count();
        let cell = engine_cell();

        let spec = demo_spec().require("data-not-there");
        let controller = SectionController::new(spec);
        let state = controller
            .activate(&doc, &cell, &FixedMotionPreference(false))
            .await;
        assert_eq!(state, SectionState::Static(StaticReason::MissingTarget));
        assert_eq!(doc.lock().unwrap().mutation_count(), mutations);

        let engine = cell.get().unwrap();
        assert_eq!(engine.context_count(), 0);
        assert_eq!(engine.animation_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_timeline_renders_static() {
        let (doc, _, _) = page();
        let cell = engine_cell();
        let spec = SectionSpec::new("broken", "data-demo").on_mount(
            TimelineSpec::new().add(
                TweenSpec::to("data-demo-title")
                    .prop(Property::Opacity, 0.0)
                    .duration(-1.0),
            ),
        );
        let controller = SectionController::new(spec);
        let state = controller
            .activate(&doc, &cell, &FixedMotionPreference(false))
            .await;
        assert_eq!(state, SectionState::Static(StaticReason::InvalidTimeline));
    }

    #[tokio::test]
    async fn test_reactivation_does_not_accumulate() {
        let (doc, _, title) = page();
        let cell = engine_cell();
        let motion = FixedMotionPreference(false);
        let controller = SectionController::new(demo_spec());

        assert_eq!(
            controller.activate(&doc, &cell, &motion).await,
            SectionState::Active
        );
        let engine = cell.get().unwrap();
        assert_eq!(controller.animation_count(), 2);
        assert_eq!(engine.listener_count(), 1);
        // Activating again while active is a no-op
        controller.activate(&doc, &cell, &motion).await;
        assert_eq!(engine.animation_count(), 2);

        assert!(controller.deactivate());
        assert_eq!(controller.state(), SectionState::Inactive);
        assert_eq!(engine.context_count(), 0);
        assert_eq!(engine.animation_count(), 0);
        assert_eq!(engine.listener_count(), 0);
        assert_eq!(doc.lock().unwrap().style(title, Property::Y), None);

        controller.activate(&doc, &cell, &motion).await;
        assert_eq!(engine.context_count(), 1);
        assert_eq!(engine.animation_count(), 2);
        assert_eq!(engine.listener_count(), 1);
        assert!(controller.deactivate());
    }

    #[tokio::test]
    async fn test_initial_styles_hide_before_binding() {
        let (doc, section, _) = page();
        let cell = engine_cell();
        let controller = SectionController::new(demo_spec());
        controller
            .activate(&doc, &cell, &FixedMotionPreference(false))
            .await;

        let items = {
            let d = doc.lock().unwrap();
            d.query_all(section, "data-demo-item")
        };
        let d = doc.lock().unwrap();
        for item in &items {
            assert_eq!(d.computed(*item, Property::Opacity), StyleValue::Number(0.0));
        }
        drop(d);

        // Fully scrolled through, the items tween up from the hidden state
        let engine = cell.get().unwrap();
        engine.set_scroll(10_000.0);
        let d = doc.lock().unwrap();
        for item in &items {
            assert_eq!(d.computed(*item, Property::Opacity), StyleValue::Number(1.0));
        }
        drop(d);

        controller.deactivate();
        let d = doc.lock().unwrap();
        for item in &items {
            assert_eq!(d.style(*item, Property::Opacity), None);
        }
    }

    struct GatedLoader {
        gate: Arc<Notify>,
    }

    #[async_trait]
    impl EngineLoader for GatedLoader {
        fn surface_available(&self) -> bool {
            true
        }

        async fn load(&self) -> Result<Engine, LoadError> {
            self.gate.notified().await;
            Ok(Engine::default())
        }
    }

    #[tokio::test]
    async fn test_deactivate_during_load_cancels_activation() {
        let (doc, _, _) = page();
        let mutations = doc.lock().unwrap().mutation_count();
        let gate = Arc::new(Notify::new());
        let cell = EngineCell::new(GatedLoader { gate: gate.clone() });
        let controller = SectionController::new(demo_spec());
        let motion = FixedMotionPreference(false);

        let activation = controller.activate(&doc, &cell, &motion);
        let unmount = async {
            tokio::task::yield_now().await;
            assert_eq!(controller.state(), SectionState::Activating);
            assert!(controller.deactivate());
            gate.notify_one();
        };
        let (state, ()) = tokio::join!(activation, unmount);

        assert_eq!(state, SectionState::Inactive);
        assert_eq!(controller.animation_count(), 0);
        let engine = cell.get().unwrap();
        assert_eq!(engine.context_count(), 0);
        assert_eq!(doc.lock().unwrap().mutation_count(), mutations);
    }

    #[tokio::test]
    async fn test_motion_preference_is_read_per_activation() {
        let (doc, _, _) = page();
        let cell = engine_cell();
        let motion = SharedMotionPreference::new(true);
        let controller = SectionController::new(demo_spec());

        let state = controller.activate(&doc, &cell, &motion).await;
        assert_eq!(state, SectionState::Static(StaticReason::ReducedMotion));

        motion.set(false);
        controller.deactivate();
        assert_eq!(
            controller.activate(&doc, &cell, &motion).await,
            SectionState::Active
        );
    }
}
