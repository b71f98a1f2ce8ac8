use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The full page/link/list/section/condition dataset.
///
/// A `Document` is never patched while it is shared: the controller hands out
/// `Arc<Document>` snapshots and replaces them wholesale after every accepted
/// save.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub pages: Vec<Page>,
    #[serde(default)]
    pub lists: Vec<List>,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller: Option<String>,
    #[serde(default)]
    pub components: Vec<Value>,
    #[serde(default)]
    pub next: Vec<Link>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A directed "next" reference, optionally guarded by a named condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub path: String,
    #[serde(rename = "if", default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct List {
    pub name: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub items: Vec<ListItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    pub text: String,
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub value: String,
}

impl Page {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn with_next(mut self, target: impl Into<String>) -> Self {
        self.next.push(Link::new(target));
        self
    }

    pub fn links_to(&self, target: &str) -> bool {
        self.next.iter().any(|link| link.path == target)
    }

    /// Text shown inside the page box: the path followed by one short line per
    /// component (its `name`, falling back to its `type`).
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![self.path.clone()];
        for component in &self.components {
            let line = component
                .get("name")
                .or_else(|| component.get("type"))
                .and_then(|v| v.as_str());
            if let Some(line) = line {
                lines.push(line.to_string());
            }
        }
        lines
    }
}

impl Link {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            condition: None,
        }
    }
}

impl Document {
    pub fn from_pages(pages: Vec<Page>) -> Self {
        Self {
            pages,
            ..Default::default()
        }
    }

    pub fn page(&self, path: &str) -> Option<&Page> {
        self.pages.iter().find(|page| page.path == path)
    }

    pub fn page_index(&self, path: &str) -> Option<usize> {
        self.pages.iter().position(|page| page.path == path)
    }

    pub fn has_page(&self, path: &str) -> bool {
        self.page(path).is_some()
    }

    pub fn page_paths(&self) -> Vec<&str> {
        self.pages.iter().map(|page| page.path.as_str()).collect()
    }

    pub fn list(&self, name: &str) -> Option<&List> {
        self.lists.iter().find(|list| list.name == name)
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|section| section.name == name)
    }

    pub fn condition(&self, name: &str) -> Option<&Condition> {
        self.conditions.iter().find(|condition| condition.name == name)
    }

    pub fn to_value(&self) -> Value {
        // Serializing plain data with string keys cannot fail.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn minimal_document_fills_defaults() {
        let doc: Document = serde_json::from_value(json!({ "pages": [{ "path": "/a" }] })).unwrap();
        assert_eq!(doc.pages.len(), 1);
        assert!(doc.pages[0].next.is_empty());
        assert!(doc.lists.is_empty());
    }

    #[test]
    fn link_condition_uses_if_key() {
        let link: Link = serde_json::from_value(json!({ "path": "/b", "if": "isAdult" })).unwrap();
        assert_eq!(link.condition.as_deref(), Some("isAdult"));
        let back = serde_json::to_value(&link).unwrap();
        assert_eq!(back, json!({ "path": "/b", "if": "isAdult" }));
    }

    #[test]
    fn unmodelled_fields_survive() {
        let raw = json!({
            "startPage": "/a",
            "pages": [{ "path": "/a", "options": { "x": 1 } }]
        });
        let doc: Document = serde_json::from_value(raw).unwrap();
        let back = doc.to_value();
        assert_eq!(back["startPage"], json!("/a"));
        assert_eq!(back["pages"][0]["options"], json!({ "x": 1 }));
    }

    #[test]
    fn summary_lines_start_with_path() {
        let mut page = Page::new("/details");
        page.components.push(json!({ "type": "TextField", "name": "fullName" }));
        page.components.push(json!({ "type": "Para" }));
        assert_eq!(page.summary_lines(), vec!["/details", "fullName", "Para"]);
    }
}
