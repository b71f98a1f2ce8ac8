//! Designer edits. Each one reads the current document and returns a new
//! candidate; nothing here mutates shared state; candidates only become the
//! working document once the data service accepts them.

use serde_json::Value;

use crate::error::EditError;
use crate::model::{Document, Link, Page};

pub fn add_page(doc: &Document, page: Page) -> Result<Document, EditError> {
    if doc.has_page(&page.path) {
        return Err(EditError::DuplicatePage(page.path));
    }
    let mut copy = doc.clone();
    copy.pages.push(page);
    Ok(copy)
}

/// Adds a `from -> to` link. Both pages must exist.
pub fn add_link(
    doc: &Document,
    from: &str,
    to: &str,
    condition: Option<String>,
) -> Result<Document, EditError> {
    if !doc.has_page(to) {
        return Err(EditError::UnknownPage(to.to_string()));
    }
    let mut copy = doc.clone();
    let page = page_mut(&mut copy, from)?;
    if page.links_to(to) {
        return Err(EditError::DuplicateLink {
            from: from.to_string(),
            to: to.to_string(),
        });
    }
    page.next.push(Link {
        path: to.to_string(),
        condition,
    });
    Ok(copy)
}

/// Replaces the condition on an existing link.
pub fn update_link(
    doc: &Document,
    from: &str,
    to: &str,
    condition: Option<String>,
) -> Result<Document, EditError> {
    let mut copy = doc.clone();
    let link = page_mut(&mut copy, from)?
        .next
        .iter_mut()
        .find(|link| link.path == to)
        .ok_or_else(|| EditError::UnknownLink {
            from: from.to_string(),
            to: to.to_string(),
        })?;
    link.condition = condition;
    Ok(copy)
}

pub fn remove_link(doc: &Document, from: &str, to: &str) -> Result<Document, EditError> {
    let mut copy = doc.clone();
    let page = page_mut(&mut copy, from)?;
    let before = page.next.len();
    page.next.retain(|link| link.path != to);
    if page.next.len() == before {
        return Err(EditError::UnknownLink {
            from: from.to_string(),
            to: to.to_string(),
        });
    }
    Ok(copy)
}

/// Removes a list and every page reference to it.
pub fn delete_list(doc: &Document, name: &str) -> Result<Document, EditError> {
    let idx = doc
        .lists
        .iter()
        .position(|list| list.name == name)
        .ok_or_else(|| EditError::UnknownList(name.to_string()))?;
    let mut copy = doc.clone();
    copy.lists.remove(idx);
    for page in &mut copy.pages {
        if page.list.as_deref() == Some(name) {
            page.list = None;
        }
    }
    Ok(copy)
}

/// Parses an uploaded file. The result still goes through schema validation
/// when it is saved.
pub fn import_json(text: &str) -> Result<Value, EditError> {
    Ok(serde_json::from_str(text)?)
}

fn page_mut<'a>(doc: &'a mut Document, path: &str) -> Result<&'a mut Page, EditError> {
    doc.pages
        .iter_mut()
        .find(|page| page.path == path)
        .ok_or_else(|| EditError::UnknownPage(path.to_string()))
}
