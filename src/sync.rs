//! Load/save orchestration between the designer and the data service.
//!
//! The controller owns the only copy of the working document. Every accepted
//! save replaces it wholesale with the value the service stored; a rejected
//! save leaves it untouched. Each replacement gets a fresh [`DocumentId`] that
//! downstream consumers use to discard work started for an older document.

use std::sync::Arc;

use serde_json::Value;

use crate::config::SyncConfig;
use crate::error::{Result, SyncError};
use crate::model::Document;
use crate::store::DataService;

/// Identity of one loaded or saved document. Strictly increasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentId(pub u64);

/// A document together with the identity it was published under.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub id: DocumentId,
    pub doc: Arc<Document>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Unloaded,
    Loading,
    Loaded,
    Saving,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    LoadFailed,
    SaveFailed,
}

/// User-visible failure message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

/// Receives failure notices (an alert box in an interactive front end).
pub trait Notifier {
    fn notify(&self, notice: &Notice);
}

/// Reloads a sibling preview after a successful save.
pub trait PreviewReloader {
    fn reload_preview(&self) -> anyhow::Result<()>;
}

type Subscriber = Box<dyn FnMut(&Snapshot)>;

pub struct SyncController<S: DataService> {
    service: S,
    config: SyncConfig,
    state: SyncState,
    current: Option<Snapshot>,
    last_id: u64,
    notifier: Option<Box<dyn Notifier>>,
    preview: Option<Box<dyn PreviewReloader>>,
    subscribers: Vec<Subscriber>,
}

impl<S: DataService> SyncController<S> {
    pub fn new(service: S, config: SyncConfig) -> Self {
        Self {
            service,
            config,
            state: SyncState::Unloaded,
            current: None,
            last_id: 0,
            notifier: None,
            preview: None,
            subscribers: Vec::new(),
        }
    }

    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Some(Box::new(notifier));
        self
    }

    pub fn with_preview(mut self, preview: impl PreviewReloader + 'static) -> Self {
        self.preview = Some(Box::new(preview));
        self
    }

    /// Registers a consumer told about every document replacement.
    pub fn on_replace(&mut self, subscriber: impl FnMut(&Snapshot) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn config(&self) -> SyncConfig {
        self.config
    }

    pub fn current(&self) -> Option<&Snapshot> {
        self.current.as_ref()
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Fetches the document. On failure the controller stays without a
    /// document if it never had one, or keeps the one it had.
    pub fn load(&mut self) -> Result<Snapshot> {
        let previous = self.state;
        self.state = SyncState::Loading;
        match self.service.fetch() {
            Ok(doc) => {
                let snapshot = self.publish(doc);
                tracing::info!(
                    id = snapshot.id.0,
                    pages = snapshot.doc.pages.len(),
                    "loaded document"
                );
                Ok(snapshot)
            }
            Err(err) => {
                self.state = if previous == SyncState::Unloaded {
                    SyncState::Unloaded
                } else {
                    SyncState::Loaded
                };
                tracing::error!(error = %err, "load failed");
                self.notify(NoticeKind::LoadFailed, format!("Load failed: {err}"));
                Err(SyncError::Network(err))
            }
        }
    }

    pub fn save(&mut self, candidate: &Document) -> Result<Snapshot> {
        self.save_value(candidate.to_value())
    }

    /// Submits a raw candidate, e.g. an uploaded file, through the same
    /// validation path as any other save.
    pub fn save_value(&mut self, candidate: Value) -> Result<Snapshot> {
        if self.current.is_none() {
            return Err(SyncError::NotLoaded);
        }
        self.state = SyncState::Saving;
        match self.service.submit(candidate) {
            Ok(doc) => {
                let snapshot = self.publish(doc);
                tracing::info!(id = snapshot.id.0, "save accepted");
                if self.config.reloads_preview() {
                    self.reload_preview();
                }
                Ok(snapshot)
            }
            Err(err) => {
                self.state = SyncState::Loaded;
                tracing::warn!(error = %err, "save rejected");
                self.notify(NoticeKind::SaveFailed, format!("Save failed: {err}"));
                Err(SyncError::from_service(err))
            }
        }
    }

    fn publish(&mut self, doc: Arc<Document>) -> Snapshot {
        self.last_id += 1;
        let snapshot = Snapshot {
            id: DocumentId(self.last_id),
            doc,
        };
        self.current = Some(snapshot.clone());
        self.state = SyncState::Loaded;
        for subscriber in &mut self.subscribers {
            subscriber(&snapshot);
        }
        snapshot
    }

    fn reload_preview(&self) {
        let Some(preview) = &self.preview else {
            tracing::debug!("no preview attached");
            return;
        };
        if let Err(err) = preview.reload_preview() {
            tracing::warn!(error = %err, "preview reload failed");
        }
    }

    fn notify(&self, kind: NoticeKind, message: String) {
        if let Some(notifier) = &self.notifier {
            notifier.notify(&Notice { kind, message });
        }
    }
}
