use crate::config::RenderConfig;
use crate::layout::{EdgeRoute, LayoutResult, Point};
use crate::model::Page;
use crate::theme::Theme;
use anyhow::Result;
#[cfg(feature = "png")]
use anyhow::Context;
use std::fmt::Write as _;
use std::path::Path;

/// Renders the full canvas: edges under page boxes, then the minimap.
///
/// `pages` must be the page list the layout was computed from; page boxes are
/// matched to layout nodes by index.
pub fn render_svg(
    layout: &LayoutResult,
    pages: &[Page],
    theme: &Theme,
    config: &RenderConfig,
) -> String {
    let mut svg = String::new();
    let width = layout.width;
    let height = layout.height;

    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" class=\"visualisation\" width=\"{width:.2}\" height=\"{height:.2}\" viewBox=\"0 0 {width:.2} {height:.2}\">",
    );
    let _ = write!(
        svg,
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        escape_xml(&config.background)
    );
    let _ = write!(
        svg,
        "<defs><marker id=\"arrow\" viewBox=\"0 0 10 10\" refX=\"10\" refY=\"5\" markerWidth=\"6\" markerHeight=\"6\" orient=\"auto-start-reverse\"><path d=\"M 0 0 L 10 5 L 0 10 z\" fill=\"{}\"/></marker></defs>",
        theme.line_color
    );

    svg.push_str("<g class=\"lines\">");
    for edge in &layout.edges {
        let _ = write!(
            svg,
            "<polyline class=\"link\" data-source=\"{}\" data-target=\"{}\" points=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"2\" marker-end=\"url(#arrow)\"/>",
            escape_xml(&edge.source),
            escape_xml(&edge.target),
            points_attr(&edge.points, 1.0),
            theme.line_color
        );
    }
    svg.push_str("</g>");

    for (idx, node) in layout.nodes.iter().enumerate() {
        let lines = pages
            .get(idx)
            .filter(|page| page.path == node.id)
            .map(Page::summary_lines)
            .unwrap_or_else(|| vec![node.label.clone()]);
        let _ = write!(
            svg,
            "<g class=\"page\" id=\"{}\"><rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"4\" fill=\"{}\" stroke=\"{}\" stroke-width=\"2\"/>",
            escape_xml(&node.id),
            node.left,
            node.top,
            node.width,
            node.height,
            theme.page_fill,
            theme.page_border_color
        );
        svg.push_str(&text_lines_svg(node.left + 8.0, node.top + 8.0, &lines, theme));
        svg.push_str("</g>");
    }

    if config.show_minimap {
        svg.push_str(&render_minimap(layout, theme, config.minimap_scale));
    }

    svg.push_str("</svg>");
    svg
}

/// Scaled mirror of `layout`. Each node links to the full-size page box.
pub fn render_minimap(layout: &LayoutResult, theme: &Theme, scale: f32) -> String {
    let mut svg = String::new();
    let width = layout.width * scale;
    let height = layout.height * scale;
    let _ = write!(
        svg,
        "<svg class=\"minimap\" width=\"{width:.2}\" height=\"{height:.2}\" viewBox=\"0 0 {width:.2} {height:.2}\">"
    );
    let _ = write!(
        svg,
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\" stroke=\"{}\"/>",
        theme.minimap_background, theme.minimap_border
    );
    for edge in &layout.edges {
        let _ = write!(
            svg,
            "<polyline points=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"0.5\"/>",
            points_attr(&edge.points, scale),
            theme.line_color
        );
    }
    for node in &layout.nodes {
        let label = escape_xml(&node.label);
        let _ = write!(
            svg,
            "<a href=\"#{label}\" xlink:href=\"#{label}\"><rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\"><title>{label}</title></rect></a>",
            node.left * scale,
            node.top * scale,
            node.width * scale,
            node.height * scale,
            theme.minimap_node_fill
        );
    }
    svg.push_str("</svg>");
    svg
}

/// Finds the edge whose polyline passes within `tolerance` of `(x, y)`.
///
/// When several edges qualify the closest one wins; ties go to the edge drawn
/// last, which is the one on top.
pub fn hit_test_edge(layout: &LayoutResult, x: f32, y: f32, tolerance: f32) -> Option<&EdgeRoute> {
    let probe = Point::new(x, y);
    let mut best: Option<(f32, &EdgeRoute)> = None;
    for edge in &layout.edges {
        let distance = edge
            .points
            .windows(2)
            .map(|pair| segment_distance(probe, pair[0], pair[1]))
            .fold(f32::INFINITY, f32::min);
        if distance > tolerance {
            continue;
        }
        if best.is_none_or(|(d, _)| distance <= d) {
            best = Some((distance, edge));
        }
    }
    best.map(|(_, edge)| edge)
}

fn segment_distance(p: Point, a: Point, b: Point) -> f32 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq <= f32::EPSILON {
        0.0
    } else {
        (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0)
    };
    let (cx, cy) = (a.x + t * dx, a.y + t * dy);
    ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt()
}

fn points_attr(points: &[Point], scale: f32) -> String {
    points
        .iter()
        .map(|p| {
            let p = p.scaled(scale);
            format!("{:.2},{:.2}", p.x, p.y)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn text_lines_svg(x: f32, y: f32, lines: &[String], theme: &Theme) -> String {
    let mut text = String::new();
    let _ = write!(
        text,
        "<text x=\"{x:.2}\" y=\"{:.2}\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">",
        y + theme.font_size,
        escape_xml(&theme.font_family),
        theme.font_size,
        theme.page_text_color
    );
    let dy = theme.font_size * 1.5;
    for (idx, line) in lines.iter().enumerate() {
        let dy = if idx == 0 { 0.0 } else { dy };
        let _ = write!(text, "<tspan x=\"{x:.2}\" dy=\"{dy:.2}\">{}</tspan>", escape_xml(line));
    }
    text.push_str("</text>");
    text
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(
    svg: &str,
    output: &Path,
    render_cfg: &RenderConfig,
    theme: &Theme,
) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = theme
        .font_family
        .split(',')
        .next()
        .map(|family| family.trim().trim_matches('"').to_string())
        .unwrap_or_else(|| "sans-serif".to_string());
    if let Some(size) = usvg::Size::from_wh(render_cfg.width, render_cfg.height) {
        opt.default_size = size;
    }

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap
        .save_png(output)
        .with_context(|| format!("writing {}", output.display()))?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
