//! Motion preference gate
//!
//! The reduced-motion accessibility signal. Implementations are queried fresh
//! on every section activation; nothing here caches the answer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Environment variable consulted by [`EnvMotionPreference`]
pub const REDUCED_MOTION_ENV: &str = "REALEST_REDUCED_MOTION";

/// Source of the `prefers-reduced-motion` signal
pub trait MotionPreference: Send + Sync {
    /// Whether animations must be skipped in favour of the static appearance
    fn prefers_reduced_motion(&self) -> bool;
}

/// Reads [`REDUCED_MOTION_ENV`] on every call
///
/// `1`, `true`, `yes` and `reduce` (case-insensitive) mean reduced motion.
#[derive(Clone, Copy, Debug, Default)]
pub struct EnvMotionPreference;

impl MotionPreference for EnvMotionPreference {
    fn prefers_reduced_motion(&self) -> bool {
        std::env::var(REDUCED_MOTION_ENV)
            .map(|v| parse_flag(&v))
            .unwrap_or(false)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "reduce"
    )
}

/// A constant answer, e.g. from a configuration override
#[derive(Clone, Copy, Debug, Default)]
pub struct FixedMotionPreference(pub bool);

impl MotionPreference for FixedMotionPreference {
    fn prefers_reduced_motion(&self) -> bool {
        self.0
    }
}

/// A live flag that can change while the page is mounted, like a media query
#[derive(Clone, Debug, Default)]
pub struct SharedMotionPreference {
    reduced: Arc<AtomicBool>,
}

impl SharedMotionPreference {
    pub fn new(reduced: bool) -> Self {
        Self {
            reduced: Arc::new(AtomicBool::new(reduced)),
        }
    }

    pub fn set(&self, reduced: bool) {
        self.reduced.store(reduced, Ordering::Release);
    }
}

impl MotionPreference for SharedMotionPreference {
    fn prefers_reduced_motion(&self) -> bool {
        self.reduced.load(Ordering::Acquire)
    }
}

impl<T: MotionPreference + ?Sized> MotionPreference for Arc<T> {
    fn prefers_reduced_motion(&self) -> bool {
        (**self).prefers_reduced_motion()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_parsing() {
        assert!(parse_flag("1"));
        assert!(parse_flag("Reduce"));
        assert!(parse_flag(" true "));
        assert!(!parse_flag("0"));
        assert!(!parse_flag("no-preference"));
    }

    #[test]
    fn test_shared_preference_is_live() {
        let pref = SharedMotionPreference::new(false);
        let observer = pref.clone();
        assert!(!observer.prefers_reduced_motion());

        pref.set(true);
        assert!(observer.prefers_reduced_motion());
    }
}
