//! Landing page composition
//!
//! [`build_document`] lays the sections out top to bottom; [`LandingPage`]
//! hosts the document, wires the UI store into it and drives one
//! [`SectionController`] per animated section. Sections mount and unmount
//! independently: one section falling back to static rendering never stops
//! another from animating.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Datelike;
use realest_animation::{Engine, EngineAccess};
use realest_core::{
    Document, MotionPreference, SharedDocument, SubscriptionHandle, UiStore, Viewport,
};
use tracing::{debug, info};

use crate::section::{SectionController, SectionState};
use crate::sections::{self, about, footer, header, motto, partners, projects, real_journey};

pub const PAGE_TITLE: &str = "THE REALEST \u{2014} Venture Capital for Humanity";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Build the full page markup with layout boxes
pub fn build_document(viewport: Viewport, year: i32) -> Document {
    let mut doc = Document::new(viewport);
    let root = doc.root();
    doc.set_attribute(root, "lang", "en");
    let title = doc.create_element(root, "title", &[]);
    doc.set_text(title, PAGE_TITLE);

    let body = doc.create_element(root, "body", &[]);
    let mut top = header::build(&mut doc, body, 0.0);
    let main = doc.create_element(body, "main", &[]);
    top = real_journey::build(&mut doc, main, top);
    top = partners::build(&mut doc, main, top);
    top = projects::build(&mut doc, main, top);
    top = motto::build(&mut doc, main, top);
    top = about::build(&mut doc, main, top);
    footer::build(&mut doc, body, top, year);
    doc
}

/// The mounted landing page
pub struct LandingPage {
    doc: SharedDocument,
    ui: Arc<UiStore>,
    controllers: Vec<SectionController>,
    engine: Mutex<Option<Arc<Engine>>>,
    subscriptions: Vec<SubscriptionHandle>,
}

impl LandingPage {
    pub fn new(viewport: Viewport, ui: Arc<UiStore>) -> Self {
        let year = chrono::Local::now().year();
        Self::from_document(build_document(viewport, year), ui)
    }

    /// Host an already built document
    pub fn from_document(doc: Document, ui: Arc<UiStore>) -> Self {
        let doc = doc.into_shared();
        let theme = ui.attach_document(&doc);

        header::sync_nav(&mut lock(&doc), ui.nav_open());
        let weak = Arc::downgrade(&doc);
        let nav = ui.on_change(move |state| {
            if let Some(doc) = weak.upgrade() {
                header::sync_nav(&mut lock(&doc), state.nav_open);
            }
        });

        let controllers = sections::animated()
            .into_iter()
            .map(SectionController::new)
            .collect();

        Self {
            doc,
            ui,
            controllers,
            engine: Mutex::new(None),
            subscriptions: vec![theme, nav],
        }
    }

    pub fn document(&self) -> &SharedDocument {
        &self.doc
    }

    pub fn ui(&self) -> &Arc<UiStore> {
        &self.ui
    }

    pub fn controllers(&self) -> &[SectionController] {
        &self.controllers
    }

    pub fn controller(&self, name: &str) -> Option<&SectionController> {
        self.controllers.iter().find(|c| c.name() == name)
    }

    /// Current state of every animated section, in page order
    pub fn states(&self) -> Vec<(&str, SectionState)> {
        self.controllers
            .iter()
            .map(|c| (c.name(), c.state()))
            .collect()
    }

    /// The engine driving the page, once a section has activated
    pub fn engine(&self) -> Option<Arc<Engine>> {
        lock(&self.engine).clone()
    }

    /// Activate every section
    pub async fn mount_all<A>(&self, engine: &A, motion: &dyn MotionPreference) -> Vec<SectionState>
    where
        A: EngineAccess + ?Sized,
    {
        let mut states = Vec::with_capacity(self.controllers.len());
        for controller in &self.controllers {
            states.push(controller.activate(&self.doc, engine, motion).await);
        }

        if states.iter().any(|s| s.is_active()) {
            let loaded = engine.acquire().await;
            *lock(&self.engine) = loaded;
        }
        let active = states.iter().filter(|s| s.is_active()).count();
        info!(active, total = states.len(), "landing page mounted");
        states
    }

    /// Deactivate every section, last mounted first
    pub fn unmount_all(&self) {
        for controller in self.controllers.iter().rev() {
            controller.deactivate();
        }
        debug!("landing page unmounted");
    }

    /// Furthest the page can scroll
    pub fn max_scroll(&self) -> f32 {
        let doc = lock(&self.doc);
        (doc.page_height() - doc.viewport().height).max(0.0)
    }

    /// Scroll the page, clamped to its extent; returns the applied offset
    pub fn scroll_to(&self, offset: f32) -> f32 {
        let offset = offset.clamp(0.0, self.max_scroll());
        if let Some(engine) = self.engine() {
            engine.set_scroll(offset);
        }
        offset
    }

    /// Advance animations by one frame; returns whether another is needed
    pub fn tick(&self, dt: f32) -> bool {
        self.engine().is_some_and(|engine| engine.tick(dt))
    }

    /// Jump every animation to where it is heading
    pub fn settle(&self) {
        if let Some(engine) = self.engine() {
            engine.settle();
        }
    }
}

impl Drop for LandingPage {
    fn drop(&mut self) {
        for handle in &self.subscriptions {
            self.ui.unsubscribe(handle);
        }
        self.unmount_all();
    }
}
