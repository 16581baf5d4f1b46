use dioxus::prelude::*;

use crate::core::GraphData;
use crate::core::graph_model::{self, VisualGraph};
use crate::render::layout::Viewport;
use crate::render::{Container, GraphHandle, Selection};
use crate::ui::format_amount;

#[component]
pub fn GraphPanel(data: ReadOnlySignal<GraphData>) -> Element {
    let config = crate::get_config();
    let mut min_degree = use_signal(|| config.graph.min_degree);
    let mut view = use_signal(|| None::<GraphHandle>);
    let mut selection = use_signal(|| None::<Selection>);
    let mut fault = use_signal(|| None::<String>);
    let container = use_hook(|| {
        Container::attached(
            "transaction-graph",
            Viewport::new(config.ui.viewport_width, config.ui.viewport_height),
        )
    });

    let model = use_memo(move || {
        let data = data.read();
        graph_model::build(&data.nodes, &data.edges, min_degree())
    });

    // Rebuild the surface whenever the pruned model changes.
    use_effect(move || {
        let elements: VisualGraph = match &*model.read() {
            Ok(graph) => graph.clone(),
            Err(e) => {
                tracing::error!("Graph data rejected: {e}");
                fault.set(Some(e.to_string()));
                return;
            }
        };
        fault.set(None);
        selection.set(None);

        tracing::info!(
            "Showing {} of {} nodes",
            elements.nodes().len(),
            elements.source_nodes()
        );

        let previous = view.write().take();
        let mounted = match previous {
            Some(handle) => handle.remount(elements, &config.style, &config.layout),
            None => GraphHandle::mount(&container, elements, &config.style, &config.layout),
        };

        match mounted {
            Ok(mut handle) => {
                handle.on_node_select(move |node| selection.set(Some(Selection::Node(node.clone()))));
                handle.on_edge_select(move |edge| selection.set(Some(Selection::Edge(edge.clone()))));
                view.set(Some(handle));
            }
            Err(e) => {
                tracing::error!("Failed to mount graph: {e}");
                fault.set(Some(e.to_string()));
            }
        }
    });

    let total_nodes = data.read().nodes.len();
    let total_edges = data.read().edges.len();
    let shown_nodes = model.read().as_ref().map(|g| g.nodes().len()).unwrap_or(0);
    let max_min_degree = config.graph.max_min_degree;

    rsx! {
        div {
            h2 { style: "color: #f7931a;", "🕸️ Transaction network" }

            div { style: "display: flex; gap: 16px; align-items: center; font-size: 12px; color: #aaa; margin-bottom: 8px;",
                Legend {}
                label {
                    "Min. degree: {min_degree} "
                    input {
                        r#type: "range",
                        min: "0",
                        max: "{max_min_degree}",
                        value: "{min_degree}",
                        oninput: move |evt| {
                            if let Ok(v) = evt.value().parse::<u32>() {
                                min_degree.set(v);
                            }
                        },
                    }
                }
                span { "💡 Click nodes or edges for details" }
            }

            if let Some(message) = fault() {
                div { style: "background: #3a0000; border-left: 3px solid #f5576c; padding: 8px; border-radius: 4px; margin-bottom: 8px;",
                    "⚠️ {message}"
                }
            }

            div { style: "display: flex; gap: 16px;",
                div { style: "flex: 3; background: #0f0f1e; border-radius: 4px;",
                    GraphCanvas { view, selection }
                }
                div { style: "flex: 1;",
                    SelectionDetail { selection }
                }
            }

            div { style: "display: flex; gap: 16px; font-size: 12px; color: #888; margin-top: 8px;",
                span { "Showing {shown_nodes} of {total_nodes} nodes" }
                span { "Total edges: {total_edges}" }
            }
        }
    }
}

#[component]
fn GraphCanvas(mut view: Signal<Option<GraphHandle>>, mut selection: Signal<Option<Selection>>) -> Element {
    let guard = view.read();
    let Some(handle) = guard.as_ref() else {
        return rsx! {
            p { style: "color: #666; padding: 12px;", "Laying out graph..." }
        };
    };
    let scene = handle.scene();
    let (width, height) = scene
        .viewport()
        .map(|vp| (vp.width, vp.height))
        .unwrap_or((800.0, 600.0));

    let edges = scene.edges().iter().map(|edge| {
        let (from, to) = scene.edge_endpoints(edge);
        let paint = scene.edge_paint(edge);
        let marker = if edge.selected { "url(#arrow-selected)" } else { "url(#arrow)" };
        let source = edge.data.source.clone();
        let target = edge.data.target.clone();
        rsx! {
            line {
                x1: "{from.x}",
                y1: "{from.y}",
                x2: "{to.x}",
                y2: "{to.y}",
                stroke: "{paint.color}",
                "stroke-width": "{paint.width}",
                "marker-end": "{marker}",
                style: "cursor: pointer;",
                onclick: move |_| {
                    if let Some(h) = view.write().as_mut() {
                        h.select_edge(&source, &target);
                    }
                },
            }
        }
    });

    let nodes = scene.nodes().iter().map(|node| {
        let paint = scene.node_paint(node);
        let id = node.data.id.clone();
        rsx! {
            g {
                style: "cursor: pointer;",
                onclick: move |_| {
                    if let Some(h) = view.write().as_mut() {
                        h.select_node(&id);
                    }
                },
                circle {
                    cx: "{node.position.x}",
                    cy: "{node.position.y}",
                    r: "{paint.radius}",
                    fill: "{paint.fill}",
                    stroke: "{paint.border_color}",
                    "stroke-width": "{paint.border_width}",
                }
                text {
                    x: "{node.position.x}",
                    y: "{node.position.y}",
                    fill: "{paint.label_color}",
                    stroke: "{paint.fill}",
                    "stroke-width": "{paint.outline_width}",
                    "paint-order": "stroke",
                    "font-size": "{paint.font_size}",
                    "text-anchor": "middle",
                    "dominant-baseline": "central",
                    "{node.data.label}"
                }
            }
        }
    });

    let style = &crate::get_config().style;
    let arrow = style.arrow_scale * 4.0;

    rsx! {
        svg {
            width: "100%",
            "viewBox": "0 0 {width} {height}",
            defs {
                ArrowMarker { id: "arrow", color: style.edge_color.clone(), size: arrow }
                ArrowMarker { id: "arrow-selected", color: style.selected_color.clone(), size: arrow }
            }
            // Clicks on empty canvas land here.
            rect {
                width: "{width}",
                height: "{height}",
                fill: "transparent",
                onclick: move |_| {
                    if let Some(h) = view.write().as_mut() {
                        h.clear_selection();
                    }
                    selection.set(None);
                },
            }
            {edges}
            {nodes}
        }
    }
}

#[component]
fn ArrowMarker(id: &'static str, color: String, size: f64) -> Element {
    rsx! {
        marker {
            id: "{id}",
            "viewBox": "0 0 10 10",
            "refX": "10",
            "refY": "5",
            "markerUnits": "userSpaceOnUse",
            "markerWidth": "{size}",
            "markerHeight": "{size}",
            orient: "auto",
            path { d: "M 0 0 L 10 5 L 0 10 z", fill: "{color}" }
        }
    }
}

#[component]
fn SelectionDetail(selection: Signal<Option<Selection>>) -> Element {
    rsx! {
        div { style: "background: #16213e; padding: 12px; border-radius: 4px; font-size: 13px;",
            {match selection() {
                None => rsx! {
                    p { style: "color: #666;", "Nothing selected." }
                },
                Some(Selection::Node(node)) => rsx! {
                    h3 { style: "margin-top: 0;", "👤 Account" }
                    p { "Account: {node.label}" }
                    p { "Degree: {node.degree} (number of transactions)" }
                },
                Some(Selection::Edge(edge)) => {
                    let amount = format_amount(edge.weight);
                    rsx! {
                        h3 { style: "margin-top: 0;", "💸 Transfers" }
                        p { "From: {edge.source}" }
                        p { "To: {edge.target}" }
                        p { "Transactions: {edge.count}" }
                        p { "Total amount: {amount}" }
                    }
                }
            }}
        }
    }
}

#[component]
fn Legend() -> Element {
    let style = &crate::get_config().style;
    rsx! {
        span { style: "display: flex; gap: 12px; align-items: center;",
            span {
                span { style: "display: inline-block; width: 10px; height: 10px; border-radius: 50%; background: {style.node_color}; margin-right: 4px;" }
                "Account"
            }
            span {
                span { style: "display: inline-block; width: 10px; height: 10px; border-radius: 50%; background: {style.selected_color}; margin-right: 4px;" }
                "Selected"
            }
            span { "→ Transfers (thickness = count)" }
        }
    }
}
