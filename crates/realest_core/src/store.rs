//! Realest Store - Zustand-inspired client state
//!
//! `Store<T>` holds keyed state instances outside any render tree and notifies
//! subscribers synchronously on every change. `UiStore` builds the site's
//! navigation/theme state on top of it:
//!
//! - `nav_open` is session-only
//! - `is_dark_mode` is persisted through a [`ThemePersistence`] and mirrored onto
//!   every attached document as the `data-theme` attribute before
//!   `toggle_theme()` returns
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use realest_core::dom::{Document, Viewport};
//! use realest_core::store::{MemoryThemePersistence, UiStore, THEME_ATTRIBUTE};
//!
//! let doc = Document::new(Viewport::default()).into_shared();
//! let store = UiStore::new(Arc::new(MemoryThemePersistence::default()));
//! store.attach_document(&doc);
//!
//! store.toggle_theme();
//! assert!(store.is_dark_mode());
//! assert_eq!(doc.lock().unwrap().root_attribute(THEME_ATTRIBUTE), Some("dark"));
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::dom::SharedDocument;
use crate::error::Result;

type Subscriber<T> = (u64, Box<dyn Fn(&T) + Send + Sync>);

/// A typed store for a specific state type
pub struct Store<T: Clone + Send + Sync + 'static> {
    /// State instances keyed by string ID
    instances: RwLock<FxHashMap<String, T>>,
    /// Subscribers for each instance
    subscribers: RwLock<FxHashMap<String, Vec<Subscriber<T>>>>,
    /// Factory function for creating default state
    default_factory: Box<dyn Fn() -> T + Send + Sync>,
    next_subscription: AtomicU64,
}

impl<T: Clone + Send + Sync + Default + 'static> Store<T> {
    /// Create a new store with Default as the factory
    pub fn new() -> Self {
        Self::with_factory(T::default)
    }
}

impl<T: Clone + Send + Sync + 'static> Store<T> {
    /// Create a new store with a custom factory function
    pub fn with_factory<F>(factory: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self {
            instances: RwLock::new(FxHashMap::default()),
            subscribers: RwLock::new(FxHashMap::default()),
            default_factory: Box::new(factory),
            next_subscription: AtomicU64::new(1),
        }
    }

    /// Get the state for a given key, creating it if it doesn't exist
    pub fn get(&self, key: &str) -> T {
        {
            let instances = self.instances.read().unwrap_or_else(|e| e.into_inner());
            if let Some(state) = instances.get(key) {
                return state.clone();
            }
        }

        let mut instances = self.instances.write().unwrap_or_else(|e| e.into_inner());
        instances
            .entry(key.to_string())
            .or_insert_with(|| (self.default_factory)())
            .clone()
    }

    /// Set the state for a given key
    pub fn set(&self, key: &str, state: T) {
        {
            let mut instances = self.instances.write().unwrap_or_else(|e| e.into_inner());
            instances.insert(key.to_string(), state.clone());
        }
        self.notify_subscribers(key, &state);
    }

    /// Update state and return a value
    pub fn update_with<F, R>(&self, key: &str, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        let (result, state) = {
            let mut instances = self.instances.write().unwrap_or_else(|e| e.into_inner());
            let state = instances
                .entry(key.to_string())
                .or_insert_with(|| (self.default_factory)());
            let result = f(state);
            (result, state.clone())
        };
        self.notify_subscribers(key, &state);
        result
    }

    /// Subscribe to state changes for a specific key
    pub fn subscribe<F>(&self, key: &str, callback: F) -> SubscriptionHandle
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = self.next_subscription.fetch_add(1, Ordering::Relaxed);
        let mut subscribers = self.subscribers.write().unwrap_or_else(|e| e.into_inner());
        subscribers
            .entry(key.to_string())
            .or_default()
            .push((id, Box::new(callback)));

        SubscriptionHandle {
            key: key.to_string(),
            id,
        }
    }

    /// Remove a subscription; returns false if it was already gone
    pub fn unsubscribe(&self, handle: &SubscriptionHandle) -> bool {
        let mut subscribers = self.subscribers.write().unwrap_or_else(|e| e.into_inner());
        let Some(subs) = subscribers.get_mut(&handle.key) else {
            return false;
        };
        let before = subs.len();
        subs.retain(|(id, _)| *id != handle.id);
        before != subs.len()
    }

    /// Number of live subscribers for a key
    pub fn subscriber_count(&self, key: &str) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .map_or(0, Vec::len)
    }

    fn notify_subscribers(&self, key: &str, state: &T) {
        let subscribers = self.subscribers.read().unwrap_or_else(|e| e.into_inner());
        if let Some(subs) = subscribers.get(key) {
            for (_, callback) in subs {
                callback(state);
            }
        }
    }
}

impl<T: Clone + Send + Sync + Default + 'static> Default for Store<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle for unsubscribing from store updates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionHandle {
    key: String,
    id: u64,
}

// =============================================================================
// THEME PERSISTENCE
// =============================================================================

/// Storage for the persisted theme flag
pub trait ThemePersistence: Send + Sync {
    /// Previously saved value, if any
    fn load(&self) -> Result<Option<bool>>;

    fn save(&self, is_dark_mode: bool) -> Result<()>;
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedTheme {
    is_dark_mode: bool,
}

/// Persists the theme flag as a small JSON document
#[derive(Debug, Clone)]
pub struct JsonThemePersistence {
    path: PathBuf,
}

impl JsonThemePersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ThemePersistence for JsonThemePersistence {
    fn load(&self) -> Result<Option<bool>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(&self.path)?;
        let persisted: PersistedTheme = serde_json::from_str(&raw)?;
        Ok(Some(persisted.is_dark_mode))
    }

    fn save(&self, is_dark_mode: bool) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let raw = serde_json::to_string_pretty(&PersistedTheme { is_dark_mode })?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }
}

/// In-memory persistence, shared between store instances to simulate reloads
#[derive(Debug, Default, Clone)]
pub struct MemoryThemePersistence {
    value: Arc<Mutex<Option<bool>>>,
}

impl ThemePersistence for MemoryThemePersistence {
    fn load(&self) -> Result<Option<bool>> {
        Ok(*self.value.lock().unwrap_or_else(|e| e.into_inner()))
    }

    fn save(&self, is_dark_mode: bool) -> Result<()> {
        *self.value.lock().unwrap_or_else(|e| e.into_inner()) = Some(is_dark_mode);
        Ok(())
    }
}

// =============================================================================
// UI STORE
// =============================================================================

/// Document-level attribute mirroring the theme flag
pub const THEME_ATTRIBUTE: &str = "data-theme";

const UI_KEY: &str = "ui";

/// Navigation and theme flags
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UiState {
    pub nav_open: bool,
    pub is_dark_mode: bool,
}

/// Client-side UI state for the site chrome
pub struct UiStore {
    store: Store<UiState>,
    persistence: Arc<dyn ThemePersistence>,
}

impl UiStore {
    /// Create the store, restoring the persisted theme flag
    pub fn new(persistence: Arc<dyn ThemePersistence>) -> Self {
        let restored = match persistence.load() {
            Ok(value) => value.unwrap_or(false),
            Err(err) => {
                tracing::warn!("Could not restore theme preference: {}", err);
                false
            }
        };
        let store = Store::new();
        store.set(
            UI_KEY,
            UiState {
                nav_open: false,
                is_dark_mode: restored,
            },
        );
        Self { store, persistence }
    }

    pub fn state(&self) -> UiState {
        self.store.get(UI_KEY)
    }

    pub fn nav_open(&self) -> bool {
        self.state().nav_open
    }

    /// Flip the navigation menu; returns the new value
    pub fn toggle_nav(&self) -> bool {
        self.store.update_with(UI_KEY, |s| {
            s.nav_open = !s.nav_open;
            s.nav_open
        })
    }

    pub fn is_dark_mode(&self) -> bool {
        self.state().is_dark_mode
    }

    /// Flip the theme; returns the new value
    pub fn toggle_theme(&self) -> bool {
        let dark = !self.is_dark_mode();
        self.set_dark_mode(dark);
        dark
    }

    /// Set the theme, mirroring it to attached documents and persisting it
    pub fn set_dark_mode(&self, dark: bool) {
        self.store.update_with(UI_KEY, |s| s.is_dark_mode = dark);
        if let Err(err) = self.persistence.save(dark) {
            tracing::warn!("Could not persist theme preference: {}", err);
        }
        tracing::debug!("Theme set to {}", if dark { "dark" } else { "light" });
    }

    /// Mirror the theme flag onto `doc` now and on every future change
    pub fn attach_document(&self, doc: &SharedDocument) -> SubscriptionHandle {
        apply_theme(doc, self.is_dark_mode());
        let weak = Arc::downgrade(doc);
        self.store.subscribe(UI_KEY, move |state| {
            if let Some(doc) = weak.upgrade() {
                apply_theme(&doc, state.is_dark_mode);
            }
        })
    }

    /// Run `callback` after every UI state change
    pub fn on_change<F>(&self, callback: F) -> SubscriptionHandle
    where
        F: Fn(&UiState) + Send + Sync + 'static,
    {
        self.store.subscribe(UI_KEY, callback)
    }

    pub fn unsubscribe(&self, handle: &SubscriptionHandle) -> bool {
        self.store.unsubscribe(handle)
    }
}

fn apply_theme(doc: &SharedDocument, dark: bool) {
    let mut doc = doc.lock().unwrap_or_else(|e| e.into_inner());
    if dark {
        doc.set_root_attribute(THEME_ATTRIBUTE, "dark");
    } else {
        doc.remove_root_attribute(THEME_ATTRIBUTE);
    }
}
