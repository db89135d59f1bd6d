//! The Realest Core
//!
//! Foundational primitives shared by the landing page crates:
//!
//! - **Document**: an in-memory, DOM-like element tree with marker attributes,
//!   layout boxes and inline styles, standing in for the host's rendering surface
//! - **Styles**: typed style properties and values (numbers, lengths, colors)
//! - **UI Store**: zustand-style client state for navigation and theme, with the
//!   theme flag persisted and mirrored onto the document
//! - **Motion Preference**: the reduced-motion accessibility gate
//! - **Query Client**: process-wide data-client defaults
//!
//! # Example
//!
//! ```rust
//! use realest_core::dom::{Document, Viewport};
//! use realest_core::style::{Property, StyleValue};
//!
//! let mut doc = Document::new(Viewport::new(1280.0, 800.0));
//! let root = doc.root();
//! let title = doc.create_element(root, "h1", &["data-title"]);
//!
//! doc.set_style(title, Property::Opacity, StyleValue::Number(0.0));
//! assert_eq!(doc.query(root, "data-title"), Some(title));
//! assert_eq!(doc.computed(title, Property::Opacity), StyleValue::Number(0.0));
//! ```

pub mod dom;
pub mod error;
pub mod motion;
pub mod query;
pub mod store;
pub mod style;

pub use dom::{Document, DocumentSnapshot, LayoutBox, NodeId, SharedDocument, Viewport};
pub use error::{CoreError, Result};
pub use motion::{
    EnvMotionPreference, FixedMotionPreference, MotionPreference, SharedMotionPreference,
};
pub use query::{query_client, MutationDefaults, QueryClient, QueryClientConfig, QueryDefaults};
pub use store::{
    JsonThemePersistence, MemoryThemePersistence, Store, SubscriptionHandle, ThemePersistence,
    UiState, UiStore, THEME_ATTRIBUTE,
};
pub use style::{Color, Length, Property, StyleValue, Unit};
