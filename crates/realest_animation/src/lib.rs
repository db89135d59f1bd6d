//! Realest Animation System
//!
//! Declarative timelines, scroll-linked playback and scoped contexts for the
//! landing page's section animations.
//!
//! # Features
//!
//! - **Timelines**: Tweens with offsets, labels, delays and per-target stagger
//! - **Scroll Triggers**: Ranges measured from element and viewport edges, with
//!   instant or smoothed scrubbing and pinning
//! - **Scoped Contexts**: Every write is confined to one subtree and undone on
//!   revert
//! - **Lazy Engine**: Loaded once per process, shared by every section, never
//!   loaded on hosts without a surface

pub mod context;
pub mod easing;
pub mod error;
pub mod loader;
pub mod scheduler;
pub mod scroll_trigger;
pub mod timeline;
pub mod values;

pub use context::ScopedContext;
pub use easing::{Easing, Power};
pub use error::{AnimationError, Result};
pub use loader::{
    global_engine, set_global_engine, try_global_engine, EngineAccess, EngineCell, EngineLoader,
    LoadError, SurfaceLoader,
};
pub use scheduler::{AnimationId, ContextId, Engine, EngineConfig, EngineHandle, Playback};
pub use scroll_trigger::{
    Edge, RangeEnd, RangeStart, ScrollRange, ScrollTriggerSpec, Scrub, TriggerTarget,
};
pub use timeline::{
    BoundTimeline, CompiledEntry, CompiledTimeline, Position, PropTween, Segment, TimelineSpec,
    Track, TweenKind, TweenSpec, DEFAULT_DURATION,
};
pub use values::Interpolate;
