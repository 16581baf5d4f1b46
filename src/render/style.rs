use crate::config::StyleConfig;

use super::{SceneEdge, SceneNode};

/// Resolved look of one node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodePaint {
    pub fill: String,
    pub radius: f64,
    pub label_color: String,
    pub font_size: f64,
    /// Halo around the label, drawn in the fill color.
    pub outline_width: f64,
    pub border_color: String,
    pub border_width: f64,
}

/// Resolved look of one edge.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgePaint {
    pub color: String,
    pub width: f64,
    pub arrow_scale: f64,
}

impl StyleConfig {
    pub fn node_paint(&self, node: &SceneNode) -> NodePaint {
        let fill = if node.selected {
            self.selected_color.clone()
        } else {
            self.node_color.clone()
        };
        let (border_color, border_width) = if node.selected {
            (self.selected_border_color.clone(), self.selected_border_width)
        } else {
            (fill.clone(), 0.0)
        };
        NodePaint {
            fill,
            radius: node.data.radius,
            label_color: self.label_color.clone(),
            font_size: self.font_size,
            outline_width: self.label_outline_width,
            border_color,
            border_width,
        }
    }

    pub fn edge_paint(&self, edge: &SceneEdge) -> EdgePaint {
        if edge.selected {
            EdgePaint {
                color: self.selected_color.clone(),
                width: self.selected_edge_width,
                arrow_scale: self.arrow_scale,
            }
        } else {
            EdgePaint {
                color: self.edge_color.clone(),
                width: edge.data.width,
                arrow_scale: self.arrow_scale,
            }
        }
    }
}
