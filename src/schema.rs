//! Server-side validation of candidate documents.
//!
//! Validation runs in two passes. The structural pass is the typed model
//! itself: a candidate that cannot be deserialized into [`Document`] (missing
//! `pages`, a page without `path`, a list item without `value`, ...) is
//! rejected outright. The semantic pass then collects every cross-reference
//! and uniqueness problem instead of stopping at the first one.
//!
//! A dangling `next` target is deliberately not reported: pages may be
//! filtered out of a view and the graph projector drops such links.

use std::collections::HashSet;

use serde_json::Value;

use crate::error::{SchemaError, SchemaIssue};
use crate::model::Document;

const LIST_TYPES: [&str; 2] = ["string", "number"];

/// Validates `candidate` and returns the normalized canonical document.
pub fn validate(candidate: Value) -> Result<Document, SchemaError> {
    if !candidate.is_object() {
        return Err(SchemaError::NotAnObject);
    }
    let doc: Document = serde_json::from_value(candidate)?;
    let issues = check(&doc);
    if issues.is_empty() {
        Ok(doc)
    } else {
        Err(SchemaError::Invalid(issues))
    }
}

/// Semantic checks over an already well-typed document.
pub fn check(doc: &Document) -> Vec<SchemaIssue> {
    let mut issues = Vec::new();

    let mut paths = HashSet::new();
    for (idx, page) in doc.pages.iter().enumerate() {
        if page.path.trim().is_empty() {
            issues.push(SchemaIssue::new(format!("pages[{idx}].path"), "must not be empty"));
        }
        if !paths.insert(page.path.as_str()) {
            issues.push(SchemaIssue::new(
                format!("pages[{idx}].path"),
                format!("duplicate page path `{}`", page.path),
            ));
        }
    }

    unique_names(
        doc.lists.iter().map(|list| list.name.as_str()),
        "lists",
        &mut issues,
    );
    unique_names(
        doc.sections.iter().map(|section| section.name.as_str()),
        "sections",
        &mut issues,
    );
    unique_names(
        doc.conditions.iter().map(|condition| condition.name.as_str()),
        "conditions",
        &mut issues,
    );

    for (idx, list) in doc.lists.iter().enumerate() {
        if !LIST_TYPES.contains(&list.kind.as_str()) {
            issues.push(SchemaIssue::new(
                format!("lists[{idx}].type"),
                format!("must be one of {LIST_TYPES:?}, got `{}`", list.kind),
            ));
        }
        let mut texts = HashSet::new();
        let mut values = HashSet::new();
        for (item_idx, item) in list.items.iter().enumerate() {
            if !texts.insert(item.text.trim()) {
                issues.push(SchemaIssue::new(
                    format!("lists[{idx}].items[{item_idx}].text"),
                    "duplicate item text",
                ));
            }
            if !values.insert(value_key(&item.value)) {
                issues.push(SchemaIssue::new(
                    format!("lists[{idx}].items[{item_idx}].value"),
                    "duplicate item value",
                ));
            }
            if let Some(cond) = &item.condition
                && doc.condition(cond).is_none()
            {
                issues.push(SchemaIssue::new(
                    format!("lists[{idx}].items[{item_idx}].condition"),
                    format!("unknown condition `{cond}`"),
                ));
            }
        }
    }

    for (idx, page) in doc.pages.iter().enumerate() {
        if let Some(section) = &page.section
            && doc.section(section).is_none()
        {
            issues.push(SchemaIssue::new(
                format!("pages[{idx}].section"),
                format!("unknown section `{section}`"),
            ));
        }
        if let Some(list) = &page.list
            && doc.list(list).is_none()
        {
            issues.push(SchemaIssue::new(
                format!("pages[{idx}].list"),
                format!("unknown list `{list}`"),
            ));
        }
        for (link_idx, link) in page.next.iter().enumerate() {
            if let Some(cond) = &link.condition
                && doc.condition(cond).is_none()
            {
                issues.push(SchemaIssue::new(
                    format!("pages[{idx}].next[{link_idx}].if"),
                    format!("unknown condition `{cond}`"),
                ));
            }
        }
    }

    issues
}

fn unique_names<'a>(
    names: impl Iterator<Item = &'a str>,
    collection: &str,
    issues: &mut Vec<SchemaIssue>,
) {
    let mut seen = HashSet::new();
    for (idx, name) in names.enumerate() {
        if !seen.insert(name) {
            issues.push(SchemaIssue::new(
                format!("{collection}[{idx}].name"),
                format!("duplicate name `{name}`"),
            ));
        }
    }
}

fn value_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "pages": [
                { "path": "/start", "section": "you", "next": [{ "path": "/end", "if": "isAdult" }] },
                { "path": "/end", "list": "colours", "next": [{ "path": "/gone" }] }
            ],
            "sections": [{ "name": "you", "title": "About you" }],
            "conditions": [{ "name": "isAdult", "value": "age >= 18" }],
            "lists": [{
                "name": "colours",
                "title": "Colours",
                "type": "string",
                "items": [{ "text": "Red", "value": "red" }, { "text": "Blue", "value": "blue" }]
            }]
        })
    }

    #[test]
    fn accepts_valid_document_with_dangling_link() {
        let doc = validate(sample()).unwrap();
        assert_eq!(doc.pages.len(), 2);
    }

    #[test]
    fn rejects_missing_required_field() {
        let err = validate(json!({ "pages": [{ "next": [] }] })).unwrap_err();
        assert!(matches!(err, SchemaError::Structure(_)));
        let err = validate(json!({ "lists": [] })).unwrap_err();
        assert!(matches!(err, SchemaError::Structure(_)));
    }

    #[test]
    fn rejects_non_object() {
        assert!(matches!(validate(json!([1, 2])), Err(SchemaError::NotAnObject)));
    }

    #[test]
    fn collects_every_issue() {
        let mut raw = sample();
        raw["pages"][1]["path"] = json!("/start");
        raw["pages"][0]["next"][0]["if"] = json!("nope");
        raw["lists"][0]["items"][1]["value"] = json!("red");
        raw["lists"][0]["type"] = json!("colour");
        let Err(SchemaError::Invalid(issues)) = validate(raw) else {
            panic!("expected semantic issues");
        };
        let locations: Vec<&str> = issues.iter().map(|i| i.location.as_str()).collect();
        assert!(locations.contains(&"pages[1].path"));
        assert!(locations.contains(&"pages[0].next[0].if"));
        assert!(locations.contains(&"lists[0].items[1].value"));
        assert!(locations.contains(&"lists[0].type"));
    }

    #[test]
    fn item_text_duplicates_ignore_surrounding_whitespace() {
        let mut raw = sample();
        raw["lists"][0]["items"][1]["text"] = json!(" Red ");
        let Err(SchemaError::Invalid(issues)) = validate(raw) else {
            panic!("expected duplicate text");
        };
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].location, "lists[0].items[1].text");
    }
}
