//! Authoritative document store.
//!
//! A submission is validated first, then written durably, and only then
//! published as the new canonical document. Readers hold an `Arc` of either the
//! old or the new document, never a half-written one.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::{Value, json};

use crate::error::ServiceError;
use crate::model::Document;
use crate::schema;

/// The server side of the sync protocol.
pub trait DataService {
    /// Current canonical document.
    fn fetch(&self) -> Result<Arc<Document>, ServiceError>;

    /// Validates and persists `candidate`, returning the value that was stored.
    fn submit(&self, candidate: Value) -> Result<Arc<Document>, ServiceError>;
}

impl<S: DataService + ?Sized> DataService for Arc<S> {
    fn fetch(&self) -> Result<Arc<Document>, ServiceError> {
        (**self).fetch()
    }

    fn submit(&self, candidate: Value) -> Result<Arc<Document>, ServiceError> {
        (**self).submit(candidate)
    }
}

/// JSON file backed store.
pub struct FileStore {
    path: PathBuf,
    current: RwLock<Arc<Document>>,
}

impl FileStore {
    /// Opens the document at `path`. The stored file must itself be valid.
    pub fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let contents = std::fs::read_to_string(&path)?;
        let raw: Value = serde_json::from_str(&contents)?;
        let doc = schema::validate(raw)?;
        tracing::info!(path = %path.display(), pages = doc.pages.len(), "opened document");
        Ok(Self {
            path,
            current: RwLock::new(Arc::new(doc)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DataService for FileStore {
    fn fetch(&self) -> Result<Arc<Document>, ServiceError> {
        Ok(self.current.read().clone())
    }

    fn submit(&self, candidate: Value) -> Result<Arc<Document>, ServiceError> {
        let doc = schema::validate(candidate).map_err(|err| {
            tracing::warn!(error = %err, "rejected document");
            ServiceError::from(err)
        })?;
        // Held across the write so two submissions cannot interleave their
        // disk and memory updates.
        let mut current = self.current.write();
        write_atomic(&self.path, &doc).map_err(|err| {
            tracing::error!(path = %self.path.display(), error = %err, "write file failed");
            ServiceError::Persistence(err)
        })?;
        let doc = Arc::new(doc);
        *current = doc.clone();
        tracing::info!(pages = doc.pages.len(), "persisted document");
        Ok(doc)
    }
}

fn write_atomic(path: &Path, doc: &Document) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut file, doc)?;
    file.write_all(b"\n")?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|err| err.error)?;
    Ok(())
}

/// In-memory store with the same validation contract as [`FileStore`].
#[derive(Default)]
pub struct MemoryStore {
    current: RwLock<Arc<Document>>,
}

impl MemoryStore {
    pub fn new(doc: Document) -> Self {
        Self {
            current: RwLock::new(Arc::new(doc)),
        }
    }
}

impl DataService for MemoryStore {
    fn fetch(&self) -> Result<Arc<Document>, ServiceError> {
        Ok(self.current.read().clone())
    }

    fn submit(&self, candidate: Value) -> Result<Arc<Document>, ServiceError> {
        let doc = Arc::new(schema::validate(candidate)?);
        *self.current.write() = doc.clone();
        Ok(doc)
    }
}

/// Transport-neutral response for the `/api/data` endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl ApiResponse {
    fn json(status: u16, body: String) -> Self {
        Self {
            status,
            content_type: "application/json",
            body,
        }
    }

    fn failure(status: u16, err: &str) -> Self {
        Self::json(status, json!({ "ok": false, "err": err }).to_string())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// `GET /api/data[?format=true]`. `format` pretty-prints for download.
pub fn get_data(service: &dyn DataService, format: bool) -> ApiResponse {
    match service.fetch() {
        Ok(doc) => {
            let body = if format {
                doc.to_pretty_json()
            } else {
                doc.to_value().to_string()
            };
            ApiResponse::json(200, body)
        }
        Err(err) => ApiResponse::failure(503, &err.to_string()),
    }
}

/// `PUT /api/data`. Validation failures answer 422, write failures 500.
pub fn put_data(service: &dyn DataService, body: &str) -> ApiResponse {
    let candidate: Value = match serde_json::from_str(body) {
        Ok(value @ Value::Object(_)) => value,
        Ok(_) | Err(_) => return ApiResponse::failure(400, "Payload must be a JSON object"),
    };
    match service.submit(candidate) {
        Ok(doc) => ApiResponse::json(200, doc.to_value().to_string()),
        Err(ServiceError::Validation(_)) => ApiResponse::failure(422, "Schema validation failed"),
        Err(ServiceError::Persistence(_)) => ApiResponse::failure(500, "Write file failed"),
        Err(ServiceError::Unavailable(msg)) => ApiResponse::failure(503, &msg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Page;

    fn store() -> MemoryStore {
        MemoryStore::new(Document::from_pages(vec![Page::new("/a")]))
    }

    #[test]
    fn get_formats_on_request() {
        let store = store();
        let compact = get_data(&store, false);
        let pretty = get_data(&store, true);
        assert_eq!(compact.status, 200);
        assert!(!compact.body.contains('\n'));
        assert!(pretty.body.contains('\n'));
        assert_eq!(pretty.content_type, "application/json");
        let a: Value = serde_json::from_str(&compact.body).unwrap();
        let b: Value = serde_json::from_str(&pretty.body).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn put_rejects_invalid_document_without_changing_state() {
        let store = store();
        let response = put_data(&store, r#"{ "pages": [{ "title": "no path" }] }"#);
        assert_eq!(response.status, 422);
        let body: Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(body["ok"], json!(false));
        assert_eq!(store.fetch().unwrap().pages[0].path, "/a");
    }

    #[test]
    fn put_rejects_non_object_payload() {
        assert_eq!(put_data(&store(), "[]").status, 400);
        assert_eq!(put_data(&store(), "not json").status, 400);
    }

    #[test]
    fn put_returns_canonical_document() {
        let store = store();
        let response = put_data(&store, r#"{ "pages": [{ "path": "/b" }] }"#);
        assert!(response.is_success());
        let body: Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(body["pages"][0]["next"], json!([]));
        assert_eq!(store.fetch().unwrap().pages[0].path, "/b");
    }

    #[test]
    fn failed_write_answers_500_and_keeps_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("form.json");
        std::fs::write(&path, r#"{ "pages": [{ "path": "/a" }] }"#).unwrap();
        let store = FileStore::open(&path).unwrap();
        std::fs::remove_dir_all(dir.path()).unwrap();

        let response = put_data(&store, r#"{ "pages": [{ "path": "/b" }] }"#);
        assert_eq!(response.status, 500);
        let body: Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(body["err"], json!("Write file failed"));
        assert_eq!(store.fetch().unwrap().page_paths(), vec!["/a"]);
        assert!(matches!(
            store.submit(json!({ "pages": [{ "path": "/c" }] })),
            Err(ServiceError::Persistence(_))
        ));
    }
}
