//! The Realest Landing Page
//!
//! The page's sections and the machinery that animates them:
//!
//! - **Section controller**: one state machine for every section, driven by a
//!   declarative [`SectionSpec`] (initial styles, mount timelines,
//!   scroll-linked timelines)
//! - **Sections**: the header, the pinned hero journey, the partners and
//!   projects slide-overs, the motto, about and footer
//! - **Page**: document composition and the [`LandingPage`] host that mounts
//!   sections, forwards scrolling and frames, and wires in the UI store
//! - **Config**: `realest.toml` site settings
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use realest_animation::global_engine;
//! use realest_app::{LandingPage, SiteConfig};
//! use realest_core::UiStore;
//!
//! let config = SiteConfig::default();
//! let ui = Arc::new(UiStore::new(config.theme_persistence()));
//! let page = LandingPage::new(config.viewport(), ui);
//!
//! page.mount_all(global_engine(), config.motion_preference().as_ref()).await;
//! page.scroll_to(1200.0);
//! while page.tick(1.0 / 120.0) {}
//! ```

pub mod config;
pub mod error;
pub mod page;
pub mod section;
pub mod sections;

pub use config::{SiteConfig, CONFIG_FILE};
pub use error::{AppError, Result};
pub use page::{build_document, LandingPage, PAGE_TITLE};
pub use section::{
    AnimationSpec, InitialStyle, SectionController, SectionSpec, SectionState, StaticReason,
};
