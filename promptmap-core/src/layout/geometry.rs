//! Canvas geometry for drawing laid out nodes and their edges

use serde::Serialize;

use super::LayoutConfig;
use crate::graph::Position;

pub fn edge_midpoint(source: Position, target: Position) -> Position {
    Position::new((source.x + target.x) / 2.0, (source.y + target.y) / 2.0)
}

/// Control points of a left-to-right cubic bezier between two handles
pub fn bezier_control_points(
    source: Position,
    target: Position,
    config: &LayoutConfig,
) -> (Position, Position) {
    let offset = config.horizontal_gap / 2.0;
    (
        Position::new(source.x + offset, source.y),
        Position::new(target.x - offset, target.y),
    )
}

/// Whether `point` falls inside the node box whose top-left corner is
/// `node`. Edges count as inside.
pub fn point_in_node(point: Position, node: Position, config: &LayoutConfig) -> bool {
    point.x >= node.x
        && point.x <= node.x + config.node_width
        && point.y >= node.y
        && point.y <= node.y + config.node_height
}

/// Box enclosing a set of nodes
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// Smallest box containing every node box, or `None` without positions
pub fn viewport_bounds(
    positions: impl IntoIterator<Item = Position>,
    config: &LayoutConfig,
) -> Option<Bounds> {
    positions.into_iter().fold(None, |bounds, Position { x, y }| {
        let right = x + config.node_width;
        let bottom = y + config.node_height;
        Some(match bounds {
            None => Bounds {
                min_x: x,
                min_y: y,
                max_x: right,
                max_y: bottom,
            },
            Some(b) => Bounds {
                min_x: b.min_x.min(x),
                min_y: b.min_y.min(y),
                max_x: b.max_x.max(right),
                max_y: b.max_y.max(bottom),
            },
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_midpoint() {
        let mid = edge_midpoint(Position::new(0.0, 0.0), Position::new(300.0, 100.0));
        assert_eq!(mid, Position::new(150.0, 50.0));
    }

    #[test]
    fn test_bezier_control_points() {
        let (first, second) = bezier_control_points(
            Position::new(250.0, 10.0),
            Position::new(400.0, 90.0),
            &LayoutConfig::default(),
        );
        assert_eq!(first, Position::new(275.0, 10.0));
        assert_eq!(second, Position::new(375.0, 90.0));
    }

    #[test]
    fn test_point_in_node() {
        let config = LayoutConfig::default();
        let node = Position::new(100.0, 100.0);
        assert!(point_in_node(Position::new(100.0, 100.0), node, &config));
        assert!(point_in_node(Position::new(350.0, 150.0), node, &config));
        assert!(!point_in_node(Position::new(351.0, 120.0), node, &config));
        assert!(!point_in_node(Position::new(120.0, 99.0), node, &config));
    }

    #[test]
    fn test_viewport_bounds() {
        let config = LayoutConfig::default();
        let bounds = viewport_bounds(
            [Position::new(0.0, 150.0), Position::new(400.0, 75.0)],
            &config,
        )
        .unwrap();
        assert_eq!(bounds.min_x, 0.0);
        assert_eq!(bounds.min_y, 75.0);
        assert_eq!(bounds.max_x, 650.0);
        assert_eq!(bounds.max_y, 200.0);
        assert_eq!(bounds.width(), 650.0);
        assert_eq!(bounds.height(), 125.0);

        assert_eq!(viewport_bounds(Vec::new(), &config), None);
    }
}
