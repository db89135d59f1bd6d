//! Animation error types

use thiserror::Error;

/// Errors raised while describing, validating or binding animations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimationError {
    /// Easing name not recognised
    #[error("Unknown easing '{0}'")]
    InvalidEasing(String),

    /// Timeline position string could not be parsed
    #[error("Invalid timeline position '{0}'")]
    InvalidPosition(String),

    /// Scroll range expression could not be parsed
    #[error("Invalid scroll range '{0}'")]
    InvalidRange(String),

    /// A numeric field of a tween is negative or not finite
    #[error("Tween {index} on '{target}': {field} must be finite and non-negative")]
    InvalidTiming {
        index: usize,
        target: String,
        field: &'static str,
    },

    /// A tween transitions no properties, or lacks a required value
    #[error("Tween {index} on '{target}': {reason}")]
    InvalidProperties {
        index: usize,
        target: String,
        reason: &'static str,
    },

    /// A position refers to a label that was never defined
    #[error("Unknown label '{0}'")]
    UnknownLabel(String),

    /// A position resolves before the start of the timeline
    #[error("Tween {index} on '{target}' starts before the timeline ({start}s)")]
    NegativeStart {
        index: usize,
        target: String,
        start: f32,
    },

    /// No element carries the target marker inside the scope
    #[error("No element matches '{0}'")]
    MissingTarget(String),

    /// An element outside the context's root was targeted
    #[error("Element is outside the animation scope")]
    OutOfScope,

    /// The scoped context was already reverted, or its engine is gone
    #[error("Animation context has been reverted")]
    ContextReverted,
}

/// Result type for animation operations
pub type Result<T> = std::result::Result<T, AnimationError>;
