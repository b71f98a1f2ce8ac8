use std::fmt;

/// One problem found while validating a candidate document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaIssue {
    /// JSON-pointer-like location, e.g. `pages[2].next[0].if`.
    pub location: String,
    pub message: String,
}

impl SchemaIssue {
    pub fn new(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for SchemaIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.location.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.location, self.message)
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("document is not an object")]
    NotAnObject,

    #[error("document does not match schema: {0}")]
    Structure(#[from] serde_json::Error),

    #[error("schema validation failed ({} issue(s)): {}", .0.len(), join_issues(.0))]
    Invalid(Vec<SchemaIssue>),
}

impl SchemaError {
    pub fn issues(&self) -> Vec<SchemaIssue> {
        match self {
            SchemaError::NotAnObject => vec![SchemaIssue::new("", "document is not an object")],
            SchemaError::Structure(err) => vec![SchemaIssue::new("", err.to_string())],
            SchemaError::Invalid(issues) => issues.clone(),
        }
    }
}

fn join_issues(issues: &[SchemaIssue]) -> String {
    issues
        .iter()
        .map(|issue| issue.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Failures reported by the authoritative document store.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("validation failed: {0}")]
    Validation(#[from] SchemaError),

    #[error("write failed: {0}")]
    Persistence(#[source] std::io::Error),

    #[error("data service unavailable: {0}")]
    Unavailable(String),
}

/// An edit that cannot be applied to the current document.
#[derive(Debug, thiserror::Error)]
pub enum EditError {
    #[error("page {0} already exists")]
    DuplicatePage(String),

    #[error("page {0} does not exist")]
    UnknownPage(String),

    #[error("{from} already links to {to}")]
    DuplicateLink { from: String, to: String },

    #[error("{from} does not link to {to}")]
    UnknownLink { from: String, to: String },

    #[error("list {0} does not exist")]
    UnknownList(String),

    #[error("upload is not valid JSON: {0}")]
    Import(#[from] serde_json::Error),
}

/// Failures surfaced by the sync controller.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("no document loaded")]
    NotLoaded,

    #[error("save rejected: {0}")]
    Rejected(#[source] ServiceError),

    #[error("network error: {0}")]
    Network(#[source] ServiceError),

    #[error(transparent)]
    Edit(#[from] EditError),
}

impl SyncError {
    pub(crate) fn from_service(err: ServiceError) -> Self {
        match err {
            ServiceError::Unavailable(_) => SyncError::Network(err),
            other => SyncError::Rejected(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
