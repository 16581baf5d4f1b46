use std::collections::HashSet;

use serde::Serialize;

use super::{GraphEdge, GraphNode, IntegrityError};

pub const DEFAULT_MIN_DEGREE: u32 = 1;

const MIN_NODE_RADIUS: f64 = 20.0;
const MAX_NODE_RADIUS: f64 = 60.0;
const RADIUS_PER_DEGREE: f64 = 3.0;

const MIN_EDGE_WIDTH: f64 = 0.5;
const MAX_EDGE_WIDTH: f64 = 5.0;
const WIDTH_PER_TRANSACTION: f64 = 0.5;

/// A node that survived pruning, with its visual radius.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualNode {
    pub id: String,
    pub label: String,
    pub degree: u32,
    pub radius: f64,
}

/// An edge between two surviving nodes, with its stroke width.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualEdge {
    pub source: String,
    pub target: String,
    pub weight: f64,
    pub count: u32,
    pub width: f64,
}

/// Pruned, styled graph ready for the renderer.
///
/// Only [`build`] constructs one, so every edge endpoint is guaranteed to be
/// in `nodes`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VisualGraph {
    nodes: Vec<VisualNode>,
    edges: Vec<VisualEdge>,
    /// Node count before pruning.
    source_nodes: usize,
    /// Edge count before pruning.
    source_edges: usize,
}

impl VisualGraph {
    pub fn nodes(&self) -> &[VisualNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[VisualEdge] {
        &self.edges
    }

    pub fn source_nodes(&self) -> usize {
        self.source_nodes
    }

    pub fn source_edges(&self) -> usize {
        self.source_edges
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Radius grows linearly with degree and is capped so hubs don't blow up the layout.
pub fn node_radius(degree: u32) -> f64 {
    (MIN_NODE_RADIUS + degree as f64 * RADIUS_PER_DEGREE).clamp(MIN_NODE_RADIUS, MAX_NODE_RADIUS)
}

/// Stroke width grows with transaction count, capped at 5.
pub fn edge_width(count: u32) -> f64 {
    (count as f64 * WIDTH_PER_TRANSACTION).clamp(MIN_EDGE_WIDTH, MAX_EDGE_WIDTH)
}

/// Prune nodes below `min_degree`, drop edges that lose an endpoint, and
/// annotate the survivors with their visual weights.
///
/// Edges are checked against the *unfiltered* node set first: an edge that
/// points at a node the engine never reported is an upstream fault, not
/// something pruning may hide.
pub fn build(
    nodes: &[GraphNode],
    edges: &[GraphEdge],
    min_degree: u32,
) -> Result<VisualGraph, IntegrityError> {
    let mut all_ids = HashSet::with_capacity(nodes.len());
    for node in nodes {
        if !all_ids.insert(node.id.as_str()) {
            return Err(IntegrityError::DuplicateNode(node.id.clone()));
        }
    }

    for edge in edges {
        for endpoint in [&edge.source, &edge.target] {
            if !all_ids.contains(endpoint.as_str()) {
                return Err(IntegrityError::DanglingEdge {
                    from: edge.source.clone(),
                    to: edge.target.clone(),
                    missing: endpoint.clone(),
                });
            }
        }
        if edge.count == 0 {
            return Err(IntegrityError::EmptyEdge {
                from: edge.source.clone(),
                to: edge.target.clone(),
            });
        }
    }

    let kept: Vec<&GraphNode> = nodes.iter().filter(|n| n.degree >= min_degree).collect();
    let kept_ids: HashSet<&str> = kept.iter().map(|n| n.id.as_str()).collect();

    let visual_nodes = kept
        .into_iter()
        .map(|n| VisualNode {
            id: n.id.clone(),
            label: n.label.clone(),
            degree: n.degree,
            radius: node_radius(n.degree),
        })
        .collect();

    let visual_edges = edges
        .iter()
        .filter(|e| kept_ids.contains(e.source.as_str()) && kept_ids.contains(e.target.as_str()))
        .map(|e| VisualEdge {
            source: e.source.clone(),
            target: e.target.clone(),
            weight: e.weight,
            count: e.count,
            width: edge_width(e.count),
        })
        .collect();

    Ok(VisualGraph {
        nodes: visual_nodes,
        edges: visual_edges,
        source_nodes: nodes.len(),
        source_edges: edges.len(),
    })
}
