use crate::config::LayoutConfig;
use crate::layout::{LayoutResult, compute_layout};
use crate::measure::NodeSize;
use crate::model::Page;
use crate::projector::project;
use crate::sync::DocumentId;

/// Outcome of a measurement-ready signal.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutPass {
    /// Layout ran for the active document.
    Completed(DocumentId),
    /// The signal belongs to a document that has since been replaced, or no
    /// layout was requested for it.
    Superseded { requested: Option<DocumentId>, signalled: DocumentId },
    /// Sizes do not line up with the page list that was measured.
    SizeMismatch { pages: usize, sizes: usize },
}

/// Runs project + layout once the rendering surface reports stable sizes.
///
/// A request names the document it is for; a later request replaces it
/// outright, so a signal that arrives for an older document does nothing.
#[derive(Debug, Default)]
pub struct LayoutScheduler {
    pending: Option<DocumentId>,
    active: Option<(DocumentId, LayoutResult)>,
    passes: usize,
}

impl LayoutScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `doc` as needing layout, superseding any earlier request.
    pub fn request(&mut self, doc: DocumentId) {
        if let Some(previous) = self.pending
            && previous != doc
        {
            tracing::debug!(previous = previous.0, next = doc.0, "superseded pending layout");
        }
        self.pending = Some(doc);
    }

    pub fn pending(&self) -> Option<DocumentId> {
        self.pending
    }

    /// Signals that `sizes` were measured against `pages` of document `doc`.
    pub fn measurement_ready(
        &mut self,
        doc: DocumentId,
        pages: &[Page],
        sizes: &[NodeSize],
        config: &LayoutConfig,
    ) -> LayoutPass {
        if self.pending != Some(doc) {
            tracing::debug!(signalled = doc.0, "ignoring stale measurement");
            return LayoutPass::Superseded {
                requested: self.pending,
                signalled: doc,
            };
        }
        if pages.len() != sizes.len() {
            tracing::warn!(
                pages = pages.len(),
                sizes = sizes.len(),
                "measurement does not match pages"
            );
            return LayoutPass::SizeMismatch {
                pages: pages.len(),
                sizes: sizes.len(),
            };
        }
        let graph = project(pages, sizes);
        let layout = compute_layout(&graph, config);
        self.pending = None;
        self.active = Some((doc, layout));
        self.passes += 1;
        LayoutPass::Completed(doc)
    }

    /// Most recent layout and the document it was computed for.
    pub fn layout(&self) -> Option<(DocumentId, &LayoutResult)> {
        self.active.as_ref().map(|(id, layout)| (*id, layout))
    }

    /// Number of completed layout passes.
    pub fn passes(&self) -> usize {
        self.passes
    }
}
