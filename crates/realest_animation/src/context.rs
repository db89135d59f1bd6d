//! Scoped animation contexts
//!
//! Everything a section sets up is registered through one [`ScopedContext`]:
//! immediate style writes, mount timelines and scroll-linked timelines. A
//! context may only touch its root element and that element's descendants,
//! and reverting it (explicitly or by dropping it) removes its animations and
//! listeners and restores every style it wrote.

use realest_core::{NodeId, Property, StyleValue};

use crate::error::{AnimationError, Result};
use crate::scheduler::{AnimationId, ContextId, EngineHandle, Playback};
use crate::timeline::BoundTimeline;

/// A group of animations confined to one subtree
#[derive(Debug)]
pub struct ScopedContext {
    handle: EngineHandle,
    id: ContextId,
    root: NodeId,
    reverted: bool,
}

impl ScopedContext {
    pub(crate) fn new(handle: EngineHandle, id: ContextId, root: NodeId) -> Self {
        Self {
            handle,
            id,
            root,
            reverted: false,
        }
    }

    pub fn id(&self) -> ContextId {
        self.id
    }

    /// The element this context is confined to
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn is_reverted(&self) -> bool {
        self.reverted
    }

    /// Write a style immediately
    pub fn set(&self, node: NodeId, property: Property, value: StyleValue) -> Result<()> {
        if self.reverted {
            return Err(AnimationError::ContextReverted);
        }
        self.handle.set_style(self.id, node, property, value)
    }

    /// Register a timeline bound under this context's root
    pub fn add(&self, timeline: BoundTimeline, playback: Playback) -> Result<AnimationId> {
        if self.reverted {
            return Err(AnimationError::ContextReverted);
        }
        self.handle.register(self.id, timeline, playback)
    }

    /// Number of animations currently registered
    pub fn animation_count(&self) -> usize {
        if self.reverted {
            return 0;
        }
        self.handle.animation_count(self.id)
    }

    /// Kill every animation and listener and restore all written styles
    ///
    /// Returns false if there was nothing left to revert.
    pub fn revert(&mut self) -> bool {
        if self.reverted {
            return false;
        }
        self.reverted = true;
        self.handle.revert(self.id)
    }
}

impl Drop for ScopedContext {
    fn drop(&mut self) {
        self.revert();
    }
}
