mod ranking;
mod routing;
pub(crate) mod types;
pub use types::*;
use ranking::*;
use routing::*;

use crate::config::{LayoutConfig, LayoutEngine};
use crate::projector::AbstractGraph;
use dagre_rust::{
    GraphConfig as DagreConfig, GraphEdge as DagreEdge, GraphNode as DagreNode,
    layout as dagre_layout,
};
use graphlib_rust::{Graph as DagreGraph, GraphOption};
use std::collections::HashSet;

/// Lays out a projected graph left to right.
///
/// Node positions come from the configured engine; edges are routed against
/// the final boxes; everything is then shifted so the drawing starts exactly
/// at the configured margins and the canvas bounds enclose all geometry plus
/// the same margins on the far side.
pub fn compute_layout(graph: &AbstractGraph, config: &LayoutConfig) -> LayoutResult {
    let sizes = sanitized_sizes(graph);

    let centers = match config.engine {
        LayoutEngine::Dagre => match assign_positions_dagre(graph, &sizes, config) {
            Some(centers) => centers,
            None => assign_positions_layered(graph, &sizes, config),
        },
        LayoutEngine::Layered => assign_positions_layered(graph, &sizes, config),
    };

    let nodes: Vec<NodePlacement> = graph
        .nodes
        .iter()
        .zip(sizes.iter().zip(centers.iter()))
        .map(|(node, ((width, height), (cx, cy)))| NodePlacement {
            id: node.id.clone(),
            label: node.label.clone(),
            left: cx - width / 2.0,
            top: cy - height / 2.0,
            width: *width,
            height: *height,
        })
        .collect();

    let edges = route_edges(graph, &nodes, config);
    let mut layout = LayoutResult {
        width: 0.0,
        height: 0.0,
        nodes,
        edges,
    };
    translate_to_margins(&mut layout, config);

    tracing::debug!(
        nodes = layout.nodes.len(),
        edges = layout.edges.len(),
        width = layout.width,
        height = layout.height,
        engine = ?config.engine,
        "computed layout"
    );
    layout
}

/// Clamps unmeasured or nonsensical sizes to zero so layout never fails on a
/// box that has not rendered yet.
fn sanitized_sizes(graph: &AbstractGraph) -> Vec<(f32, f32)> {
    let mut unmeasured = 0usize;
    let sizes = graph
        .nodes
        .iter()
        .map(|node| {
            let clamp = |v: f32| if v.is_finite() && v > 0.0 { v } else { 0.0 };
            let (w, h) = (clamp(node.width), clamp(node.height));
            if w == 0.0 || h == 0.0 {
                unmeasured += 1;
            }
            (w, h)
        })
        .collect();
    if unmeasured > 0 {
        tracing::warn!(unmeasured, "laying out boxes that have no measured size");
    }
    sizes
}

fn assign_positions_dagre(
    graph: &AbstractGraph,
    sizes: &[(f32, f32)],
    config: &LayoutConfig,
) -> Option<Vec<(f32, f32)>> {
    if graph.nodes.is_empty() {
        return None;
    }

    let mut dagre_graph: DagreGraph<DagreConfig, DagreNode, DagreEdge> =
        DagreGraph::new(Some(GraphOption {
            directed: Some(true),
            multigraph: Some(false),
            compound: Some(false),
        }));

    let mut graph_config = DagreConfig::default();
    graph_config.rankdir = Some("lr".to_string());
    graph_config.nodesep = Some(config.node_spacing);
    graph_config.ranksep = Some(config.rank_spacing);
    graph_config.marginx = Some(config.margin_x);
    graph_config.marginy = Some(config.margin_y);
    dagre_graph.set_graph(graph_config);

    for (order, (node, (width, height))) in graph.nodes.iter().zip(sizes).enumerate() {
        let mut dagre_node = DagreNode::default();
        dagre_node.width = *width;
        dagre_node.height = *height;
        dagre_node.order = Some(order);
        dagre_graph.set_node(node.id.clone(), Some(dagre_node));
    }

    let mut edge_set: HashSet<(&str, &str)> = HashSet::new();
    for edge in &graph.edges {
        if !edge_set.insert((edge.source.as_str(), edge.target.as_str())) {
            continue;
        }
        let edge_label = DagreEdge::default();
        let _ = dagre_graph.set_edge(&edge.source, &edge.target, Some(edge_label), None);
    }

    dagre_layout::run_layout(&mut dagre_graph);

    let mut centers = Vec::with_capacity(graph.nodes.len());
    for node in &graph.nodes {
        let dagre_node = dagre_graph.node(&node.id)?;
        if !dagre_node.x.is_finite() || !dagre_node.y.is_finite() {
            tracing::warn!(node = %node.id, "dagre produced no position, using layered engine");
            return None;
        }
        centers.push((dagre_node.x, dagre_node.y));
    }
    Some(centers)
}

/// Built-in layered placement: ranks become columns spaced by
/// `rank_spacing`; boxes inside a column are stacked with `node_spacing` and
/// every column is centred on the tallest one.
fn assign_positions_layered(
    graph: &AbstractGraph,
    sizes: &[(f32, f32)],
    config: &LayoutConfig,
) -> Vec<(f32, f32)> {
    let ranks = compute_ranks(graph);
    let mut buckets = rank_buckets(&ranks);
    order_rank_nodes(&mut buckets, graph, config.order_passes);

    let column_heights: Vec<f32> = buckets
        .iter()
        .map(|bucket| {
            let boxes: f32 = bucket.iter().map(|idx| sizes[*idx].1).sum();
            boxes + config.node_spacing * bucket.len().saturating_sub(1) as f32
        })
        .collect();
    let tallest = column_heights.iter().copied().fold(0.0f32, f32::max);

    let mut centers = vec![(0.0f32, 0.0f32); graph.nodes.len()];
    let mut column_left = config.margin_x;
    for (bucket, column_height) in buckets.iter().zip(&column_heights) {
        let column_width = bucket
            .iter()
            .map(|idx| sizes[*idx].0)
            .fold(0.0f32, f32::max);
        let cx = column_left + column_width / 2.0;
        let mut y = config.margin_y + (tallest - column_height) / 2.0;
        for idx in bucket {
            let height = sizes[*idx].1;
            centers[*idx] = (cx, y + height / 2.0);
            y += height + config.node_spacing;
        }
        column_left += column_width + config.rank_spacing;
    }
    centers
}

fn translate_to_margins(layout: &mut LayoutResult, config: &LayoutConfig) {
    let Some((min_x, min_y, max_x, max_y)) = layout.content_bounds() else {
        layout.width = config.margin_x * 2.0;
        layout.height = config.margin_y * 2.0;
        return;
    };
    let dx = config.margin_x - min_x;
    let dy = config.margin_y - min_y;
    for node in &mut layout.nodes {
        node.left += dx;
        node.top += dy;
    }
    for edge in &mut layout.edges {
        for point in &mut edge.points {
            point.x += dx;
            point.y += dy;
        }
    }
    layout.width = (max_x - min_x) + config.margin_x * 2.0;
    layout.height = (max_y - min_y) + config.margin_y * 2.0;
}

/// Serializable snapshot of a layout, keyed by page path.
#[derive(Debug, serde::Serialize)]
pub struct LayoutDump<'a> {
    pub width: f32,
    pub height: f32,
    pub engine: LayoutEngine,
    pub nodes: &'a [NodePlacement],
    pub edges: &'a [EdgeRoute],
}

impl<'a> LayoutDump<'a> {
    pub fn new(layout: &'a LayoutResult, config: &LayoutConfig) -> Self {
        Self {
            width: layout.width,
            height: layout.height,
            engine: config.engine,
            nodes: &layout.nodes,
            edges: &layout.edges,
        }
    }
}
