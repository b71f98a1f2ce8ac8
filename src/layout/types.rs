use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn scaled(self, factor: f32) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }
}

/// Placement of one page box, using top-left origin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodePlacement {
    pub id: String,
    pub label: String,
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl NodePlacement {
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left && x <= self.right() && y >= self.top && y <= self.bottom()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeRoute {
    pub source: String,
    pub target: String,
    pub points: Vec<Point>,
}

/// Positioned graph ready for rendering.
///
/// `nodes[i]` always describes the `i`-th node of the projected graph, which
/// is the `i`-th page of the document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LayoutResult {
    pub width: f32,
    pub height: f32,
    pub nodes: Vec<NodePlacement>,
    pub edges: Vec<EdgeRoute>,
}

impl LayoutResult {
    pub fn node(&self, id: &str) -> Option<&NodePlacement> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn edge(&self, source: &str, target: &str) -> Option<&EdgeRoute> {
        self.edges
            .iter()
            .find(|edge| edge.source == source && edge.target == target)
    }

    /// Extent of every node box and edge point, as `(min_x, min_y, max_x, max_y)`.
    pub fn content_bounds(&self) -> Option<(f32, f32, f32, f32)> {
        let mut bounds: Option<(f32, f32, f32, f32)> = None;
        let mut grow = |x0: f32, y0: f32, x1: f32, y1: f32| {
            bounds = Some(match bounds {
                None => (x0, y0, x1, y1),
                Some((a, b, c, d)) => (a.min(x0), b.min(y0), c.max(x1), d.max(y1)),
            });
        };
        for node in &self.nodes {
            grow(node.left, node.top, node.right(), node.bottom());
        }
        for edge in &self.edges {
            for p in &edge.points {
                grow(p.x, p.y, p.x, p.y);
            }
        }
        bounds
    }
}
