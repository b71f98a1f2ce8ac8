use std::collections::HashMap;

use crate::config::LayoutConfig;
use crate::projector::AbstractGraph;

use super::{EdgeRoute, NodePlacement, Point};

/// Centers closer than this share a rank column.
const COLUMN_TOLERANCE: f32 = 1.0;
/// Clearance kept between a routed line and a box it passes.
const NODE_CLEARANCE: f32 = 10.0;
/// Upper bound on nudges when a virtual point keeps landing on boxes.
const MAX_NUDGES: usize = 8;

/// A vertical band holding every box of one rank.
#[derive(Debug, Clone)]
pub(super) struct RankColumn {
    pub(super) left: f32,
    pub(super) right: f32,
    pub(super) center: f32,
    pub(super) members: Vec<usize>,
}

/// Recovers rank columns from box centers.
///
/// Layered layouts centre every box of a rank on the same x, so columns are
/// found by clustering centres rather than trusting an engine-specific rank
/// table. Returns the columns left to right and each node's column index.
pub(super) fn rank_columns(nodes: &[NodePlacement]) -> (Vec<RankColumn>, Vec<usize>) {
    let mut order: Vec<usize> = (0..nodes.len()).collect();
    order.sort_by(|a, b| {
        nodes[*a]
            .center()
            .x
            .partial_cmp(&nodes[*b].center().x)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.cmp(b))
    });

    let mut columns: Vec<RankColumn> = Vec::new();
    let mut column_of = vec![0usize; nodes.len()];
    for idx in order {
        let node = &nodes[idx];
        let cx = node.center().x;
        let joins = columns
            .last()
            .is_some_and(|col| (col.center - cx).abs() <= COLUMN_TOLERANCE);
        if !joins {
            columns.push(RankColumn {
                left: node.left,
                right: node.right(),
                center: cx,
                members: Vec::new(),
            });
        }
        let col_idx = columns.len() - 1;
        let col = &mut columns[col_idx];
        col.left = col.left.min(node.left);
        col.right = col.right.max(node.right());
        col.members.push(idx);
        column_of[idx] = col_idx;
    }
    (columns, column_of)
}

/// Routes every graph edge as a polyline between placed boxes.
///
/// Forward edges run from the source's right side to the target's left side,
/// crossing each skipped column horizontally at a y that clears its boxes
/// (one virtual point pair per column). Backward and same-column edges climb
/// through the inter-column gap to a dedicated lane above the graph, so they
/// never cut through boxes. Self links loop over their own box.
pub(super) fn route_edges(
    graph: &AbstractGraph,
    nodes: &[NodePlacement],
    config: &LayoutConfig,
) -> Vec<EdgeRoute> {
    let index: HashMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(idx, node)| (node.id.as_str(), idx))
        .collect();
    let (columns, column_of) = rank_columns(nodes);
    let top = nodes.iter().map(|n| n.top).fold(f32::INFINITY, f32::min);
    let gap = config.rank_spacing.max(2.0 * NODE_CLEARANCE);
    let mut lane = 0usize;

    let mut routes = Vec::with_capacity(graph.edges.len());
    for edge in &graph.edges {
        let (Some(&from), Some(&to)) = (
            index.get(edge.source.as_str()),
            index.get(edge.target.as_str()),
        ) else {
            continue;
        };
        let source = &nodes[from];
        let target = &nodes[to];
        let points = if from == to {
            self_loop(source, config)
        } else if column_of[to] > column_of[from] {
            let source_col = &columns[column_of[from]];
            let target_col = &columns[column_of[to]];
            let mut points = vec![
                Point::new(source.right(), source.center().y),
                Point::new(source_col.right, source.center().y),
            ];
            points.extend(skipped_crossings(
                source,
                target,
                &columns[column_of[from] + 1..column_of[to]],
                nodes,
            ));
            points.push(Point::new(target_col.left, target.center().y));
            points.push(Point::new(target.left, target.center().y));
            points
        } else {
            let lane_y = top - config.back_edge_lane_gap * (lane as f32 + 1.0);
            lane += 1;
            let exit_x = columns[column_of[from]].right + gap / 2.0;
            let entry_x = columns[column_of[to]].left - gap / 2.0;
            vec![
                Point::new(source.right(), source.center().y),
                Point::new(exit_x, source.center().y),
                Point::new(exit_x, lane_y),
                Point::new(entry_x, lane_y),
                Point::new(entry_x, target.center().y),
                Point::new(target.left, target.center().y),
            ]
        };
        routes.push(EdgeRoute {
            source: edge.source.clone(),
            target: edge.target.clone(),
            points: dedup(points),
        });
    }
    routes
}

fn skipped_crossings(
    source: &NodePlacement,
    target: &NodePlacement,
    skipped: &[RankColumn],
    nodes: &[NodePlacement],
) -> Vec<Point> {
    let start = Point::new(source.right(), source.center().y);
    let end = Point::new(target.left, target.center().y);
    let span = (end.x - start.x).max(f32::EPSILON);
    let mut points = Vec::with_capacity(skipped.len() * 2);
    for column in skipped {
        let t = ((column.center - start.x) / span).clamp(0.0, 1.0);
        let y = clear_y(start.y + (end.y - start.y) * t, column, nodes);
        points.push(Point::new(column.left, y));
        points.push(Point::new(column.right, y));
    }
    points
}

/// Moves `y` off any box of `column`, toward the nearer free edge.
fn clear_y(mut y: f32, column: &RankColumn, nodes: &[NodePlacement]) -> f32 {
    for _ in 0..MAX_NUDGES {
        let hit = column.members.iter().map(|idx| &nodes[*idx]).find(|node| {
            y > node.top - NODE_CLEARANCE && y < node.bottom() + NODE_CLEARANCE
        });
        let Some(node) = hit else {
            return y;
        };
        let above = node.top - NODE_CLEARANCE;
        let below = node.bottom() + NODE_CLEARANCE;
        y = if (y - above).abs() <= (below - y).abs() {
            above
        } else {
            below
        };
    }
    y
}

fn self_loop(node: &NodePlacement, config: &LayoutConfig) -> Vec<Point> {
    let rise = config.back_edge_lane_gap.max(NODE_CLEARANCE);
    let quarter = node.width / 4.0;
    let cx = node.center().x;
    vec![
        Point::new(cx + quarter, node.top),
        Point::new(cx + quarter, node.top - rise),
        Point::new(cx - quarter, node.top - rise),
        Point::new(cx - quarter, node.top),
    ]
}

fn dedup(mut points: Vec<Point>) -> Vec<Point> {
    points.dedup_by(|a, b| (a.x - b.x).abs() < 0.01 && (a.y - b.y).abs() < 0.01);
    points
}
