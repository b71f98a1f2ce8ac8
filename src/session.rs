use serde_json::Value;

use crate::config::Config;
use crate::edit;
use crate::error::{Result, SyncError};
use crate::layout::{EdgeRoute, LayoutResult};
use crate::measure::measure_pages;
use crate::model::{Document, Page};
use crate::render::{hit_test_edge, render_svg};
use crate::scheduler::{LayoutPass, LayoutScheduler};
use crate::store::DataService;
use crate::sync::{Snapshot, SyncController};
use crate::view::ViewState;

/// One open designer: the working document, its layout and the UI state.
///
/// Every document replacement requests exactly one layout pass, which runs
/// as soon as the replacement's page boxes have been measured.
pub struct Designer<S: DataService> {
    sync: SyncController<S>,
    scheduler: LayoutScheduler,
    view: ViewState,
    config: Config,
}

impl<S: DataService> Designer<S> {
    /// Loads the document from `service` and lays it out.
    pub fn open(service: S, config: Config) -> Result<Self> {
        let sync = SyncController::new(service, config.sync);
        Self::with_controller(sync, config)
    }

    /// Like [`Designer::open`] for a controller that already has a notifier
    /// or preview attached.
    pub fn with_controller(sync: SyncController<S>, config: Config) -> Result<Self> {
        let mut designer = Self {
            sync,
            scheduler: LayoutScheduler::new(),
            view: ViewState::default(),
            config,
        };
        let snapshot = designer.sync.load()?;
        designer.scheduler.request(snapshot.id);
        designer.relayout()?;
        Ok(designer)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn current(&self) -> Option<&Snapshot> {
        self.sync.current()
    }

    pub fn controller(&self) -> &SyncController<S> {
        &self.sync
    }

    pub fn scheduler(&self) -> &LayoutScheduler {
        &self.scheduler
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ViewState {
        &mut self.view
    }

    /// Re-fetches the document, e.g. after another client saved.
    pub fn reload(&mut self) -> Result<LayoutPass> {
        let snapshot = self.sync.load()?;
        self.scheduler.request(snapshot.id);
        self.relayout()
    }

    pub fn save(&mut self, candidate: &Document) -> Result<Snapshot> {
        self.save_value(candidate.to_value())
    }

    pub fn save_value(&mut self, candidate: Value) -> Result<Snapshot> {
        let snapshot = self.sync.save_value(candidate)?;
        self.scheduler.request(snapshot.id);
        self.relayout()?;
        Ok(snapshot)
    }

    /// Measures the current document's page boxes and signals the scheduler.
    pub fn relayout(&mut self) -> Result<LayoutPass> {
        let snapshot = self.sync.current().cloned().ok_or(SyncError::NotLoaded)?;
        let sizes = measure_pages(&snapshot.doc.pages, &self.config.theme, &self.config.layout);
        Ok(self.scheduler.measurement_ready(
            snapshot.id,
            &snapshot.doc.pages,
            &sizes,
            &self.config.layout,
        ))
    }

    pub fn layout(&self) -> Option<&LayoutResult> {
        self.scheduler.layout().map(|(_, layout)| layout)
    }

    /// SVG of the most recent layout, or `None` before the first pass.
    pub fn render(&self) -> Option<String> {
        let (id, layout) = self.scheduler.layout()?;
        let pages: &[Page] = match self.sync.current() {
            Some(snapshot) if snapshot.id == id => &snapshot.doc.pages,
            _ => &[],
        };
        Some(render_svg(layout, pages, &self.config.theme, &self.config.render))
    }

    /// Resolves a canvas click to an edge and opens its link editor.
    pub fn click(&mut self, x: f32, y: f32) -> Option<EdgeRoute> {
        let layout = self.layout()?;
        let edge = hit_test_edge(layout, x, y, self.config.render.edge_hit_tolerance)?.clone();
        self.view.click_edge(&edge);
        Some(edge)
    }

    pub fn add_page(&mut self, page: Page) -> Result<Snapshot> {
        let doc = self.document()?;
        let candidate = edit::add_page(&doc, page)?;
        self.save(&candidate)
    }

    pub fn add_link(
        &mut self,
        from: &str,
        to: &str,
        condition: Option<String>,
    ) -> Result<Snapshot> {
        let doc = self.document()?;
        let candidate = edit::add_link(&doc, from, to, condition)?;
        self.save(&candidate)
    }

    pub fn update_link(
        &mut self,
        from: &str,
        to: &str,
        condition: Option<String>,
    ) -> Result<Snapshot> {
        let doc = self.document()?;
        let candidate = edit::update_link(&doc, from, to, condition)?;
        let snapshot = self.save(&candidate)?;
        self.view.close();
        Ok(snapshot)
    }

    pub fn remove_link(&mut self, from: &str, to: &str) -> Result<Snapshot> {
        let doc = self.document()?;
        let candidate = edit::remove_link(&doc, from, to)?;
        let snapshot = self.save(&candidate)?;
        self.view.close();
        Ok(snapshot)
    }

    pub fn delete_list(&mut self, name: &str) -> Result<Snapshot> {
        let doc = self.document()?;
        let candidate = edit::delete_list(&doc, name)?;
        self.save(&candidate)
    }

    /// Saves an uploaded JSON file as the new document.
    pub fn upload(&mut self, text: &str) -> Result<Snapshot> {
        let candidate = edit::import_json(text)?;
        self.save_value(candidate)
    }

    fn document(&self) -> Result<std::sync::Arc<Document>> {
        self.sync
            .current()
            .map(|snapshot| snapshot.doc.clone())
            .ok_or(SyncError::NotLoaded)
    }
}
