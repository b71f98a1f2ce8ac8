use std::collections::HashSet;

use crate::measure::NodeSize;
use crate::model::Page;

#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
}

/// Layout input derived from the page list.
///
/// Nodes keep the page order; edges keep the order in which they were first
/// seen walking `pages[*].next`. Rebuilt from scratch on every projection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AbstractGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl AbstractGraph {
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn has_edge(&self, source: &str, target: &str) -> bool {
        self.edges
            .iter()
            .any(|edge| edge.source == source && edge.target == target)
    }
}

/// Projects pages and their measured boxes into an [`AbstractGraph`].
///
/// `sizes` is index-aligned with `pages`; a missing entry counts as an
/// unmeasured (zero) box. Links whose target is not among `pages` are dropped.
pub fn project(pages: &[Page], sizes: &[NodeSize]) -> AbstractGraph {
    let mut graph = AbstractGraph {
        nodes: Vec::with_capacity(pages.len()),
        edges: Vec::new(),
    };

    for (idx, page) in pages.iter().enumerate() {
        let size = sizes.get(idx).copied().unwrap_or_default();
        graph.nodes.push(GraphNode {
            id: page.path.clone(),
            label: page.path.clone(),
            width: size.width,
            height: size.height,
        });
    }

    let known: HashSet<&str> = pages.iter().map(|page| page.path.as_str()).collect();
    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    let mut dropped = 0usize;
    for page in pages {
        for link in &page.next {
            if !known.contains(link.path.as_str()) {
                dropped += 1;
                continue;
            }
            if !seen.insert((page.path.as_str(), link.path.as_str())) {
                continue;
            }
            graph.edges.push(GraphEdge {
                source: page.path.clone(),
                target: link.path.clone(),
            });
        }
    }

    if dropped > 0 {
        tracing::debug!(dropped, "skipped links to pages outside the current view");
    }
    graph
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sizes(n: usize) -> Vec<NodeSize> {
        vec![NodeSize::new(120.0, 60.0); n]
    }

    #[test]
    fn drops_dangling_links() {
        let pages = vec![
            Page::new("/start").with_next("/middle"),
            Page::new("/middle").with_next("/end").with_next("/missing"),
            Page::new("/end"),
        ];
        let graph = project(&pages, &sizes(3));
        let ids: Vec<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["/start", "/middle", "/end"]);
        assert_eq!(graph.edges.len(), 2);
        assert!(graph.has_edge("/start", "/middle"));
        assert!(graph.has_edge("/middle", "/end"));
        assert!(!graph.has_edge("/middle", "/missing"));
    }

    #[test]
    fn duplicate_links_collapse() {
        let pages = vec![
            Page::new("/a").with_next("/b").with_next("/b"),
            Page::new("/b"),
        ];
        let graph = project(&pages, &sizes(2));
        assert_eq!(graph.edges.len(), 1);
    }

    #[test]
    fn missing_sizes_default_to_zero() {
        let pages = vec![Page::new("/a"), Page::new("/b")];
        let graph = project(&pages, &sizes(1));
        assert_eq!(graph.nodes[0].width, 120.0);
        assert_eq!(graph.nodes[1].width, 0.0);
        assert_eq!(graph.nodes[1].label, "/b");
    }

    #[test]
    fn projection_is_deterministic() {
        let pages = vec![
            Page::new("/a").with_next("/c").with_next("/b"),
            Page::new("/b").with_next("/c"),
            Page::new("/c").with_next("/a"),
        ];
        assert_eq!(project(&pages, &sizes(3)), project(&pages, &sizes(3)));
    }
}
