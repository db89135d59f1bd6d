//! Engine loading
//!
//! The engine is loaded lazily, at most once per process, and shared by
//! every section. Hosts without a rendering surface never load it and every
//! request resolves to `None`. A failed load is not remembered: the next
//! request tries again.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::scheduler::{Engine, EngineConfig};

/// Why an engine could not be produced
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    #[error("No rendering surface")]
    NoSurface,

    #[error("Engine failed to load: {0}")]
    Failed(String),
}

/// Produces the engine on first use
#[async_trait]
pub trait EngineLoader: Send + Sync {
    /// Whether this host can animate at all
    fn surface_available(&self) -> bool;

    async fn load(&self) -> Result<Engine, LoadError>;
}

/// Anything sections can ask for the shared engine
#[async_trait]
pub trait EngineAccess: Send + Sync {
    /// The loaded engine, or `None` when animation is unavailable
    async fn acquire(&self) -> Option<Arc<Engine>>;
}

/// Resolve-once holder for the engine
pub struct EngineCell<L> {
    loader: L,
    engine: OnceCell<Arc<Engine>>,
    loads: AtomicUsize,
}

impl<L: EngineLoader> EngineCell<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            engine: OnceCell::new(),
            loads: AtomicUsize::new(0),
        }
    }

    /// Load the engine if needed and return it
    ///
    /// Concurrent callers share a single in-flight load.
    pub async fn acquire(&self) -> Option<Arc<Engine>> {
        if !self.loader.surface_available() {
            return None;
        }
        let loaded = self
            .engine
            .get_or_try_init(|| async {
                self.loads.fetch_add(1, Ordering::SeqCst);
                let engine = self.loader.load().await?;
                debug!(config = ?engine.config(), "animation engine loaded");
                Ok::<_, LoadError>(Arc::new(engine))
            })
            .await;

        match loaded {
            Ok(engine) => Some(Arc::clone(engine)),
            Err(err) => {
                warn!(%err, "animation engine unavailable");
                None
            }
        }
    }

    /// The engine, if a load already succeeded
    pub fn get(&self) -> Option<Arc<Engine>> {
        self.engine.get().cloned()
    }

    /// Number of load attempts made so far
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }
}

#[async_trait]
impl<L: EngineLoader> EngineAccess for EngineCell<L> {
    async fn acquire(&self) -> Option<Arc<Engine>> {
        EngineCell::acquire(self).await
    }
}

#[async_trait]
impl<A: EngineAccess + ?Sized> EngineAccess for Arc<A> {
    async fn acquire(&self) -> Option<Arc<Engine>> {
        (**self).acquire().await
    }
}

/// Loader that builds an in-process engine when a surface exists
#[derive(Clone, Debug)]
pub struct SurfaceLoader {
    surface: bool,
    config: EngineConfig,
}

impl SurfaceLoader {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            surface: true,
            config,
        }
    }

    /// A host with nothing to draw on, such as pre-rendering
    pub fn headless() -> Self {
        Self {
            surface: false,
            config: EngineConfig::default(),
        }
    }
}

impl Default for SurfaceLoader {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

#[async_trait]
impl EngineLoader for SurfaceLoader {
    fn surface_available(&self) -> bool {
        self.surface
    }

    async fn load(&self) -> Result<Engine, LoadError> {
        if !self.surface {
            return Err(LoadError::NoSurface);
        }
        Ok(Engine::new(self.config))
    }
}

// ============================================================================
// Global Engine
// ============================================================================

static GLOBAL_ENGINE: OnceLock<EngineCell<SurfaceLoader>> = OnceLock::new();

/// Install the process-wide engine cell
///
/// Returns false (and leaves the existing cell in place) if one was already
/// installed.
pub fn set_global_engine(cell: EngineCell<SurfaceLoader>) -> bool {
    let installed = GLOBAL_ENGINE.set(cell).is_ok();
    if !installed {
        warn!("set_global_engine() called more than once");
    }
    installed
}

/// The process-wide engine cell, installing a default one on first use
pub fn global_engine() -> &'static EngineCell<SurfaceLoader> {
    GLOBAL_ENGINE.get_or_init(|| EngineCell::new(SurfaceLoader::default()))
}

/// The process-wide engine cell, if one has been installed
pub fn try_global_engine() -> Option<&'static EngineCell<SurfaceLoader>> {
    GLOBAL_ENGINE.get()
}
