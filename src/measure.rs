use serde::{Deserialize, Serialize};

use crate::config::LayoutConfig;
use crate::model::Page;
use crate::text_metrics;
use crate::theme::Theme;

/// Rendered pixel size of one page box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeSize {
    pub width: f32,
    pub height: f32,
}

impl NodeSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// A box that has not been laid out yet reports no area.
    pub fn is_measured(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// Measures the box each page renders as, index-aligned with `pages`.
///
/// This stands in for reading sizes back from a live rendering surface: the
/// box holds the page path plus one line per component, padded and clamped to
/// the configured minimum.
pub fn measure_pages(pages: &[Page], theme: &Theme, config: &LayoutConfig) -> Vec<NodeSize> {
    pages
        .iter()
        .map(|page| measure_page(page, theme, config))
        .collect()
}

pub fn measure_page(page: &Page, theme: &Theme, config: &LayoutConfig) -> NodeSize {
    let lines = page.summary_lines();
    let widest = lines
        .iter()
        .map(|line| text_metrics::text_width(line, theme.font_size, &theme.font_family))
        .fold(0.0f32, f32::max);
    let line_height = theme.font_size * config.label_line_height;
    let width = (widest + config.node_padding_x * 2.0).max(config.min_node_width);
    let height = (lines.len() as f32 * line_height + config.node_padding_y * 2.0)
        .max(config.min_node_height);
    NodeSize::new(width.ceil(), height.ceil())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn boxes_respect_minimum_size() {
        let config = LayoutConfig::default();
        let size = measure_page(&Page::new("/a"), &Theme::designer(), &config);
        assert!(size.width >= config.min_node_width);
        assert!(size.height >= config.min_node_height);
        assert!(size.is_measured());
    }

    #[test]
    fn components_make_boxes_taller() {
        let config = LayoutConfig::default();
        let theme = Theme::designer();
        let mut page = Page::new("/details");
        let bare = measure_page(&page, &theme, &config);
        for idx in 0..6 {
            page.components.push(json!({ "type": "TextField", "name": format!("field{idx}") }));
        }
        let full = measure_page(&page, &theme, &config);
        assert!(full.height > bare.height);
    }

    #[test]
    fn sizes_align_with_pages() {
        let pages = vec![Page::new("/a"), Page::new("/b"), Page::new("/c")];
        let sizes = measure_pages(&pages, &Theme::designer(), &LayoutConfig::default());
        assert_eq!(sizes.len(), pages.len());
    }

    #[test]
    fn zero_box_is_not_measured() {
        assert!(!NodeSize::default().is_measured());
    }
}
