//! Interactive graph surface.
//!
//! A [`Container`] is a named mount target. [`GraphHandle::mount`] claims it,
//! lays the graph out once and keeps the positioned scene plus the selection
//! listeners. Dropping or disposing the handle releases the container, so a
//! container never holds more than one live surface.

pub mod layout;
pub mod style;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{LayoutConfig, StyleConfig};
use crate::core::graph_model::{VisualEdge, VisualGraph, VisualNode};
use layout::{Point, Viewport};
use style::{EdgePaint, NodePaint};

/// Minimum distance, in pixels, at which a tap still hits an edge.
const EDGE_HIT_TOLERANCE: f64 = 4.0;

static NEXT_SURFACE_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(u64);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("container {container} already hosts a surface; dispose it before mounting again")]
    AlreadyMounted { container: String },
}

#[derive(Debug)]
struct ContainerState {
    name: String,
    viewport: Option<Viewport>,
    surface: Option<SurfaceId>,
}

/// Mount target for one graph surface.
///
/// Cloning shares the same target.
#[derive(Debug, Clone)]
pub struct Container {
    inner: Arc<Mutex<ContainerState>>,
}

impl Container {
    /// A container not yet attached to anything visible.
    pub fn detached(name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ContainerState {
                name: name.into(),
                viewport: None,
                surface: None,
            })),
        }
    }

    pub fn attached(name: impl Into<String>, viewport: Viewport) -> Self {
        let container = Self::detached(name);
        container.attach(viewport);
        container
    }

    pub fn attach(&self, viewport: Viewport) {
        self.lock().viewport = Some(viewport);
    }

    pub fn detach(&self) {
        self.lock().viewport = None;
    }

    pub fn name(&self) -> String {
        self.lock().name.clone()
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.lock().viewport
    }

    pub fn is_occupied(&self) -> bool {
        self.lock().surface.is_some()
    }

    fn lock(&self) -> MutexGuard<'_, ContainerState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn claim(&self) -> Result<SurfaceId, RenderError> {
        let mut state = self.lock();
        if state.surface.is_some() {
            return Err(RenderError::AlreadyMounted {
                container: state.name.clone(),
            });
        }
        let id = SurfaceId(NEXT_SURFACE_ID.fetch_add(1, Ordering::Relaxed));
        state.surface = Some(id);
        Ok(id)
    }

    fn release(&self, id: SurfaceId) {
        let mut state = self.lock();
        if state.surface == Some(id) {
            state.surface = None;
        }
    }
}

/// Payload handed to node listeners.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSelection {
    pub id: String,
    pub label: String,
    pub degree: u32,
}

/// Payload handed to edge listeners.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeSelection {
    pub source: String,
    pub target: String,
    pub weight: f64,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Selection {
    Node(NodeSelection),
    Edge(EdgeSelection),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type NodeListener = Box<dyn FnMut(&NodeSelection)>;
type EdgeListener = Box<dyn FnMut(&EdgeSelection)>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    node: Vec<(ListenerId, NodeListener)>,
    edge: Vec<(ListenerId, EdgeListener)>,
}

impl Listeners {
    fn next(&mut self) -> ListenerId {
        self.next_id += 1;
        ListenerId(self.next_id)
    }

    fn len(&self) -> usize {
        self.node.len() + self.edge.len()
    }

    fn clear(&mut self) {
        self.node.clear();
        self.edge.clear();
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneNode {
    pub data: VisualNode,
    pub position: Point,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneEdge {
    pub data: VisualEdge,
    pub source_index: usize,
    pub target_index: usize,
    pub selected: bool,
}

/// Positioned elements of one mounted surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    nodes: Vec<SceneNode>,
    edges: Vec<SceneEdge>,
    index: HashMap<String, usize>,
    viewport: Option<Viewport>,
    style: StyleConfig,
}

impl Scene {
    fn layout(
        graph: VisualGraph,
        config: &LayoutConfig,
        style: &StyleConfig,
        viewport: Option<Viewport>,
    ) -> Self {
        let index: HashMap<String, usize> = graph
            .nodes()
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect();

        let edges: Vec<SceneEdge> = graph
            .edges()
            .iter()
            .filter_map(|e| {
                Some(SceneEdge {
                    source_index: *index.get(&e.source)?,
                    target_index: *index.get(&e.target)?,
                    data: e.clone(),
                    selected: false,
                })
            })
            .collect();

        let pairs: Vec<(usize, usize)> = edges.iter().map(|e| (e.source_index, e.target_index)).collect();
        let raw = layout::place(graph.nodes().len(), &pairs, config);

        let positions = match viewport {
            Some(vp) if config.fit => {
                let radii: Vec<f64> = graph.nodes().iter().map(|n| n.radius).collect();
                layout::fit(&raw, &radii, vp, config.padding).unwrap_or_else(|| {
                    debug!("Viewport {vp:?} is not visible, keeping raw layout coordinates");
                    raw.clone()
                })
            }
            _ => raw,
        };

        let nodes = graph
            .nodes()
            .iter()
            .zip(positions)
            .map(|(n, position)| SceneNode {
                data: n.clone(),
                position,
                selected: false,
            })
            .collect();

        Self {
            nodes,
            edges,
            index,
            viewport,
            style: style.clone(),
        }
    }

    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[SceneEdge] {
        &self.edges
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    pub fn node(&self, id: &str) -> Option<&SceneNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn node_paint(&self, node: &SceneNode) -> NodePaint {
        self.style.node_paint(node)
    }

    pub fn edge_paint(&self, edge: &SceneEdge) -> EdgePaint {
        self.style.edge_paint(edge)
    }

    /// Segment for drawing `edge`, trimmed so it starts and ends at the node
    /// borders instead of the centers.
    pub fn edge_endpoints(&self, edge: &SceneEdge) -> (Point, Point) {
        let from = &self.nodes[edge.source_index];
        let to = &self.nodes[edge.target_index];
        let delta = to.position - from.position;
        let len = delta.length();
        if len <= from.data.radius + to.data.radius {
            return (from.position, to.position);
        }
        let dir = delta * (1.0 / len);
        (
            from.position + dir * from.data.radius,
            to.position - dir * to.data.radius,
        )
    }

    /// Topmost node under `point`, then nearest edge within tolerance.
    fn hit(&self, point: Point) -> Option<Hit> {
        if let Some(i) = self
            .nodes
            .iter()
            .rposition(|n| n.position.distance(point) <= n.data.radius)
        {
            return Some(Hit::Node(i));
        }
        self.edges
            .iter()
            .enumerate()
            .map(|(i, e)| {
                let (a, b) = self.edge_endpoints(e);
                (i, segment_distance(point, a, b), e.data.width / 2.0)
            })
            .filter(|(_, dist, half_width)| *dist <= half_width.max(EDGE_HIT_TOLERANCE))
            .min_by(|x, y| x.1.total_cmp(&y.1))
            .map(|(i, _, _)| Hit::Edge(i))
    }

    fn clear_selection(&mut self) {
        self.nodes.iter_mut().for_each(|n| n.selected = false);
        self.edges.iter_mut().for_each(|e| e.selected = false);
    }
}

enum Hit {
    Node(usize),
    Edge(usize),
}

fn segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len_sq = ab.x * ab.x + ab.y * ab.y;
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let ap = p - a;
    let t = ((ap.x * ab.x + ap.y * ab.y) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// A mounted graph surface. Owns the scene and the registered listeners.
pub struct GraphHandle {
    container: Container,
    surface: SurfaceId,
    scene: Scene,
    listeners: Listeners,
    released: bool,
}

impl std::fmt::Debug for GraphHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphHandle")
            .field("surface", &self.surface)
            .field("nodes", &self.scene.nodes.len())
            .field("edges", &self.scene.edges.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl GraphHandle {
    /// Claim `container` and lay `elements` out on it.
    ///
    /// Fails fast if the container still hosts a surface. A hidden or
    /// detached container still gets a full layout, just without viewport
    /// fitting.
    pub fn mount(
        container: &Container,
        elements: VisualGraph,
        style: &StyleConfig,
        layout: &LayoutConfig,
    ) -> Result<Self, RenderError> {
        let surface = container.claim()?;
        // From here on, Drop gives the container back on every exit path.
        let mut handle = Self {
            container: container.clone(),
            surface,
            scene: Scene {
                nodes: Vec::new(),
                edges: Vec::new(),
                index: HashMap::new(),
                viewport: None,
                style: style.clone(),
            },
            listeners: Listeners::default(),
            released: false,
        };

        let viewport = container.viewport();
        let (node_count, edge_count) = (elements.nodes().len(), elements.edges().len());
        handle.scene = Scene::layout(elements, layout, style, viewport);

        info!(
            "Mounted surface {:?} on {}: {node_count} nodes, {edge_count} edges",
            surface,
            container.name()
        );
        Ok(handle)
    }

    /// Tear this surface down, then mount `elements` on the same container.
    pub fn remount(
        self,
        elements: VisualGraph,
        style: &StyleConfig,
        layout: &LayoutConfig,
    ) -> Result<Self, RenderError> {
        let container = self.container.clone();
        self.dispose();
        Self::mount(&container, elements, style, layout)
    }

    /// Release listeners and give the container back.
    pub fn dispose(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        let listeners = self.listeners.len();
        self.listeners.clear();
        self.container.release(self.surface);
        info!(
            "Disposed surface {:?} on {} ({listeners} listeners released)",
            self.surface,
            self.container.name()
        );
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn on_node_select(&mut self, listener: impl FnMut(&NodeSelection) + 'static) -> ListenerId {
        let id = self.listeners.next();
        self.listeners.node.push((id, Box::new(listener)));
        id
    }

    pub fn on_edge_select(&mut self, listener: impl FnMut(&EdgeSelection) + 'static) -> ListenerId {
        let id = self.listeners.next();
        self.listeners.edge.push((id, Box::new(listener)));
        id
    }

    /// Returns false if `id` was not registered.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.node.retain(|(l, _)| *l != id);
        self.listeners.edge.retain(|(l, _)| *l != id);
        self.listeners.len() < before
    }

    /// Select a node by id and notify node listeners.
    pub fn select_node(&mut self, id: &str) -> Option<NodeSelection> {
        let index = *self.scene.index.get(id)?;
        Some(self.select_node_at(index))
    }

    /// Select the first edge from `source` to `target` and notify edge listeners.
    pub fn select_edge(&mut self, source: &str, target: &str) -> Option<EdgeSelection> {
        let index = self
            .scene
            .edges
            .iter()
            .position(|e| e.data.source == source && e.data.target == target)?;
        Some(self.select_edge_at(index))
    }

    /// Hit-test `point` in scene coordinates. Tapping empty space clears the selection.
    pub fn tap(&mut self, point: Point) -> Option<Selection> {
        match self.scene.hit(point) {
            Some(Hit::Node(i)) => Some(Selection::Node(self.select_node_at(i))),
            Some(Hit::Edge(i)) => Some(Selection::Edge(self.select_edge_at(i))),
            None => {
                self.scene.clear_selection();
                None
            }
        }
    }

    pub fn clear_selection(&mut self) {
        self.scene.clear_selection();
    }

    fn select_node_at(&mut self, index: usize) -> NodeSelection {
        self.scene.clear_selection();
        let node = &mut self.scene.nodes[index];
        node.selected = true;
        let payload = NodeSelection {
            id: node.data.id.clone(),
            label: node.data.label.clone(),
            degree: node.data.degree,
        };
        for (_, listener) in self.listeners.node.iter_mut() {
            listener(&payload);
        }
        payload
    }

    fn select_edge_at(&mut self, index: usize) -> EdgeSelection {
        self.scene.clear_selection();
        let edge = &mut self.scene.edges[index];
        edge.selected = true;
        let payload = EdgeSelection {
            source: edge.data.source.clone(),
            target: edge.data.target.clone(),
            weight: edge.data.weight,
            count: edge.data.count,
        };
        for (_, listener) in self.listeners.edge.iter_mut() {
            listener(&payload);
        }
        payload
    }
}

impl Drop for GraphHandle {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::graph_model::build;
    use crate::core::graph_model::tests::{edge, node};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn elements() -> VisualGraph {
        let nodes = vec![node("A", 3), node("B", 2), node("C", 2), node("D", 0)];
        let edges = vec![
            edge("A", "B", 2, 500.0),
            edge("B", "C", 1, 50.0),
            edge("C", "A", 6, 900.0),
        ];
        build(&nodes, &edges, 1).unwrap()
    }

    fn mount(container: &Container) -> Result<GraphHandle, RenderError> {
        GraphHandle::mount(
            container,
            elements(),
            &StyleConfig::default(),
            &LayoutConfig::default(),
        )
    }

    #[test]
    fn mount_places_every_element() {
        let container = Container::attached("graph", Viewport::new(800.0, 600.0));
        let handle = mount(&container).unwrap();
        let scene = handle.scene();
        assert_eq!(scene.nodes().len(), 3);
        assert_eq!(scene.edges().len(), 3);
        for n in scene.nodes() {
            assert!(n.position.x >= 0.0 && n.position.x <= 800.0);
            assert!(n.position.y >= 0.0 && n.position.y <= 600.0);
        }
        assert!(container.is_occupied());
    }

    #[test]
    fn second_mount_fails_fast() {
        let container = Container::attached("graph", Viewport::new(800.0, 600.0));
        let _first = mount(&container).unwrap();
        assert_eq!(
            mount(&container).unwrap_err(),
            RenderError::AlreadyMounted {
                container: "graph".into()
            }
        );
    }

    #[test]
    fn dispose_releases_container_and_listeners() {
        let container = Container::attached("graph", Viewport::new(800.0, 600.0));
        let hits = Rc::new(RefCell::new(0));
        let mut handle = mount(&container).unwrap();
        let counter = hits.clone();
        handle.on_node_select(move |_| *counter.borrow_mut() += 1);
        assert_eq!(Rc::strong_count(&hits), 2);

        handle.dispose();

        assert!(!container.is_occupied());
        assert_eq!(Rc::strong_count(&hits), 1);
        assert!(mount(&container).is_ok());
    }

    #[test]
    fn drop_releases_container() {
        let container = Container::attached("graph", Viewport::new(800.0, 600.0));
        {
            let _handle = mount(&container).unwrap();
            assert!(container.is_occupied());
        }
        assert!(!container.is_occupied());
    }

    #[test]
    fn remount_replaces_previous_surface() {
        let container = Container::attached("graph", Viewport::new(800.0, 600.0));
        let mut handle = mount(&container).unwrap();
        handle.on_edge_select(|_| {});
        let nodes = vec![node("X", 1), node("Y", 1)];
        let edges = vec![edge("X", "Y", 1, 10.0)];
        let handle = handle
            .remount(
                build(&nodes, &edges, 1).unwrap(),
                &StyleConfig::default(),
                &LayoutConfig::default(),
            )
            .unwrap();
        assert_eq!(handle.scene().nodes().len(), 2);
        assert_eq!(handle.listener_count(), 0);
        assert!(container.is_occupied());
    }

    #[test]
    fn hub_circles_stay_inside_viewport() {
        let nodes = vec![node("HUB", 20), node("B", 20), node("C", 20)];
        let edges = vec![edge("HUB", "B", 4, 100.0), edge("B", "C", 4, 100.0)];
        let container = Container::attached("graph", Viewport::new(800.0, 600.0));
        let handle = GraphHandle::mount(
            &container,
            build(&nodes, &edges, 1).unwrap(),
            &StyleConfig::default(),
            &LayoutConfig::default(),
        )
        .unwrap();

        for n in handle.scene().nodes() {
            let (p, r) = (n.position, n.data.radius);
            assert_eq!(r, 60.0);
            assert!(p.x - r >= 0.0 && p.x + r <= 800.0, "{} x={} r={r}", n.data.id, p.x);
            assert!(p.y - r >= 0.0 && p.y + r <= 600.0, "{} y={} r={r}", n.data.id, p.y);
        }
    }

    #[test]
    fn detached_container_still_lays_out() {
        let container = Container::detached("offscreen");
        let handle = mount(&container).unwrap();
        assert_eq!(handle.scene().nodes().len(), 3);
        assert!(handle.scene().viewport().is_none());
        assert!(handle.scene().nodes().iter().all(|n| n.position.x.is_finite()));
    }

    #[test]
    fn detaching_skips_viewport_fit() {
        let container = Container::attached("graph", Viewport::new(800.0, 600.0));
        container.detach();
        let handle = mount(&container).unwrap();
        let raw = layout::place(3, &[(0, 1), (1, 2), (2, 0)], &LayoutConfig::default());
        let placed: Vec<Point> = handle.scene().nodes().iter().map(|n| n.position).collect();
        assert_eq!(placed, raw);
    }

    #[test]
    fn zero_sized_viewport_is_not_an_error() {
        let container = Container::attached("hidden", Viewport::new(0.0, 0.0));
        assert!(mount(&container).is_ok());
    }

    #[test]
    fn node_listeners_fire_in_registration_order() {
        let container = Container::attached("graph", Viewport::new(800.0, 600.0));
        let mut handle = mount(&container).unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));
        let first = log.clone();
        handle.on_node_select(move |n| first.borrow_mut().push(format!("1:{}", n.id)));
        let second = log.clone();
        handle.on_node_select(move |n| second.borrow_mut().push(format!("2:{}", n.id)));

        let payload = handle.select_node("A").unwrap();

        assert_eq!(
            payload,
            NodeSelection {
                id: "A".into(),
                label: "A".into(),
                degree: 3,
            }
        );
        assert_eq!(*log.borrow(), vec!["1:A".to_string(), "2:A".to_string()]);
        assert!(handle.scene().node("A").unwrap().selected);
    }

    #[test]
    fn edge_selection_carries_full_payload() {
        let container = Container::attached("graph", Viewport::new(800.0, 600.0));
        let mut handle = mount(&container).unwrap();
        let seen = Rc::new(RefCell::new(None));
        let sink = seen.clone();
        handle.on_edge_select(move |e| *sink.borrow_mut() = Some(e.clone()));

        handle.select_edge("C", "A").unwrap();

        assert_eq!(
            *seen.borrow(),
            Some(EdgeSelection {
                source: "C".into(),
                target: "A".into(),
                weight: 900.0,
                count: 6,
            })
        );
        assert!(handle.select_edge("A", "C").is_none());
    }

    #[test]
    fn removed_listener_is_not_called() {
        let container = Container::attached("graph", Viewport::new(800.0, 600.0));
        let mut handle = mount(&container).unwrap();
        let hits = Rc::new(RefCell::new(0));
        let counter = hits.clone();
        let id = handle.on_node_select(move |_| *counter.borrow_mut() += 1);

        assert!(handle.remove_listener(id));
        assert!(!handle.remove_listener(id));
        handle.select_node("B");
        assert_eq!(*hits.borrow(), 0);
    }

    #[test]
    fn tap_hits_nodes_then_edges() {
        let container = Container::attached("graph", Viewport::new(800.0, 600.0));
        let mut handle = mount(&container).unwrap();

        let b = handle.scene().node("B").unwrap().position;
        assert!(matches!(handle.tap(b), Some(Selection::Node(n)) if n.id == "B"));

        let edge = handle.scene().edges()[0].clone();
        let (from, to) = handle.scene().edge_endpoints(&edge);
        let mid = Point::new((from.x + to.x) / 2.0, (from.y + to.y) / 2.0);
        assert!(matches!(handle.tap(mid), Some(Selection::Edge(_))));
        assert!(handle.scene().edges().iter().any(|e| e.selected));
        assert!(handle.scene().nodes().iter().all(|n| !n.selected));

        assert!(handle.tap(Point::new(-500.0, -500.0)).is_none());
        assert!(handle.scene().edges().iter().all(|e| !e.selected));
    }

    #[test]
    fn selecting_moves_highlight() {
        let container = Container::attached("graph", Viewport::new(800.0, 600.0));
        let mut handle = mount(&container).unwrap();
        handle.select_node("A");
        handle.select_node("C");
        let selected: Vec<&str> = handle
            .scene()
            .nodes()
            .iter()
            .filter(|n| n.selected)
            .map(|n| n.data.id.as_str())
            .collect();
        assert_eq!(selected, vec!["C"]);
        assert!(handle.select_node("D").is_none());
    }

    #[test]
    fn clearing_selection_drops_every_highlight() {
        let container = Container::attached("graph", Viewport::new(800.0, 600.0));
        let mut handle = mount(&container).unwrap();
        let calls = Rc::new(RefCell::new(0));
        let seen = Rc::clone(&calls);
        handle.on_node_select(move |_| *seen.borrow_mut() += 1);

        handle.select_node("A");
        handle.clear_selection();
        assert!(handle.scene().nodes().iter().all(|n| !n.selected));

        handle.select_edge("A", "B");
        handle.clear_selection();
        assert!(handle.scene().edges().iter().all(|e| !e.selected));
        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn edge_endpoints_stop_at_node_borders() {
        let container = Container::attached("graph", Viewport::new(800.0, 600.0));
        let handle = mount(&container).unwrap();
        let scene = handle.scene();
        for e in scene.edges() {
            let (from, _) = scene.edge_endpoints(e);
            let source = &scene.nodes()[e.source_index];
            let gap = from.distance(source.position);
            assert!(gap == 0.0 || (gap - source.data.radius).abs() < 1e-9);
        }
    }
}
