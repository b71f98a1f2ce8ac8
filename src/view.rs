use std::fmt::Write as _;

use crate::layout::EdgeRoute;
use crate::model::Document;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SummaryTab {
    #[default]
    Model,
    Json,
    Paths,
}

/// Flyout panels. Only one is open at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Panel {
    AddPage,
    AddLink,
    EditSections,
    EditConditions,
    EditLists,
    Summary(SummaryTab),
    EditLink { source: String, target: String },
}

impl Panel {
    pub fn title(&self) -> &'static str {
        match self {
            Panel::AddPage => "Add Page",
            Panel::AddLink => "Add Link",
            Panel::EditSections => "Edit Sections",
            Panel::EditConditions => "Edit Conditions",
            Panel::EditLists => "Edit Lists",
            Panel::Summary(_) => "Summary",
            Panel::EditLink { .. } => "Edit Link",
        }
    }
}

/// Menu and flyout state of the designer. Independent of layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub menu_open: bool,
    pub panel: Option<Panel>,
}

impl ViewState {
    pub fn toggle_menu(&mut self) {
        self.menu_open = !self.menu_open;
    }

    /// Opens `panel`, replacing whichever flyout was open.
    pub fn open(&mut self, panel: Panel) {
        self.panel = Some(panel);
    }

    pub fn close(&mut self) {
        self.panel = None;
    }

    /// Opens the link editor for a clicked edge.
    pub fn click_edge(&mut self, edge: &EdgeRoute) {
        self.open(Panel::EditLink {
            source: edge.source.clone(),
            target: edge.target.clone(),
        });
    }

    /// The `(source, target)` pair the link editor is scoped to, if open.
    pub fn editing_link(&self) -> Option<(&str, &str)> {
        match &self.panel {
            Some(Panel::EditLink { source, target }) => Some((source.as_str(), target.as_str())),
            _ => None,
        }
    }

    pub fn select_tab(&mut self, tab: SummaryTab) {
        if let Some(Panel::Summary(current)) = &mut self.panel {
            *current = tab;
        }
    }
}

/// Text shown in one tab of the summary flyout.
pub fn summary(doc: &Document, tab: SummaryTab) -> String {
    match tab {
        SummaryTab::Model => data_model(doc),
        SummaryTab::Json => doc.to_pretty_json(),
        SummaryTab::Paths => {
            serde_json::to_string_pretty(&doc.page_paths()).unwrap_or_default()
        }
    }
}

/// Data model outline: every component field grouped by section.
fn data_model(doc: &Document) -> String {
    let mut out = String::new();
    let mut sections: Vec<Option<&str>> = vec![None];
    sections.extend(doc.sections.iter().map(|s| Some(s.name.as_str())));
    for section in sections {
        let fields: Vec<String> = doc
            .pages
            .iter()
            .filter(|page| page.section.as_deref() == section)
            .flat_map(|page| page.components.iter())
            .filter_map(|component| {
                let name = component.get("name")?.as_str()?;
                let kind = component.get("type").and_then(|t| t.as_str()).unwrap_or("?");
                Some(format!("{name}: {kind}"))
            })
            .collect();
        if fields.is_empty() {
            continue;
        }
        match section.and_then(|name| doc.section(name)) {
            Some(section) => {
                let _ = writeln!(out, "{} ({})", section.name, section.title);
                for field in fields {
                    let _ = writeln!(out, "  {field}");
                }
            }
            None => {
                for field in fields {
                    let _ = writeln!(out, "{field}");
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Point;
    use crate::model::{Page, Section};
    use serde_json::json;

    #[test]
    fn clicking_edge_scopes_editor_and_close_clears_it() {
        let mut view = ViewState::default();
        let edge = EdgeRoute {
            source: "/a".to_string(),
            target: "/b".to_string(),
            points: vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)],
        };
        view.click_edge(&edge);
        assert_eq!(view.editing_link(), Some(("/a", "/b")));
        view.close();
        assert_eq!(view.editing_link(), None);
        assert_eq!(view.panel, None);
    }

    #[test]
    fn opening_a_panel_replaces_the_previous_one() {
        let mut view = ViewState::default();
        view.toggle_menu();
        view.open(Panel::AddPage);
        view.open(Panel::Summary(SummaryTab::Model));
        view.select_tab(SummaryTab::Paths);
        assert!(view.menu_open);
        assert_eq!(view.panel, Some(Panel::Summary(SummaryTab::Paths)));
        assert_eq!(view.panel.as_ref().map(Panel::title), Some("Summary"));
    }

    #[test]
    fn summary_tabs() {
        let mut doc = Document::from_pages(vec![Page::new("/a"), Page::new("/b")]);
        doc.sections.push(Section {
            name: "you".to_string(),
            title: "About you".to_string(),
        });
        doc.pages[0].components.push(json!({ "type": "TextField", "name": "fullName" }));
        doc.pages[1].section = Some("you".to_string());
        doc.pages[1].components.push(json!({ "type": "DatePartsField", "name": "dob" }));

        let paths: Vec<String> = serde_json::from_str(&summary(&doc, SummaryTab::Paths)).unwrap();
        assert_eq!(paths, vec!["/a", "/b"]);
        let model = summary(&doc, SummaryTab::Model);
        assert!(model.contains("fullName: TextField"));
        assert!(model.contains("you (About you)\n  dob: DatePartsField"));
        assert!(summary(&doc, SummaryTab::Json).contains("\"pages\""));
    }
}
