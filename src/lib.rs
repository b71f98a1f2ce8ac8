//! Core of a page-flow designer.
//!
//! A [`model::Document`] of pages linked by `next` references is projected
//! into a graph, laid out left to right and drawn as SVG with a minimap.
//! Edits are submitted to a [`store::DataService`] that validates and persists
//! them; only accepted documents replace the working copy.

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod edit;
pub mod error;
pub mod layout;
pub mod logging;
pub mod measure;
pub mod model;
pub mod projector;
pub mod render;
pub mod scheduler;
pub mod schema;
pub mod session;
pub mod store;
pub mod sync;
pub mod text_metrics;
pub mod theme;
pub mod view;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, load_config};
pub use error::{EditError, SchemaError, ServiceError, SyncError};
pub use layout::{LayoutResult, compute_layout};
pub use model::{Document, Link, Page};
pub use projector::{AbstractGraph, project};
pub use session::Designer;
pub use store::{DataService, FileStore, MemoryStore};
pub use sync::{DocumentId, Snapshot, SyncController};
