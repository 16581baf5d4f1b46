use dioxus::prelude::*;

use crate::core::{DetectionSummary, GraphStats, Stats};
use crate::ui::format_amount;

#[component]
pub fn Dashboard(stats: Stats, summary: DetectionSummary, graph_stats: GraphStats) -> Element {
    rsx! {
        div {
            h2 { style: "color: #f7931a;", "📊 Overview" }
            div { style: "display: grid; grid-template-columns: repeat(3, 1fr); gap: 8px;",
                StatCard { icon: "💳", value: stats.total_transactions.to_string(), caption: "Total transactions" }
                StatCard { icon: "⚠️", value: stats.total_fraudulent.to_string(), caption: "Fraudulent transactions" }
                StatCard { icon: "✅", value: stats.total_legitimate.to_string(), caption: "Legitimate transactions" }
                StatCard { icon: "💰", value: format_amount(stats.total_amount), caption: "Total amount" }
                StatCard { icon: "📈", value: format_amount(stats.avg_amount), caption: "Average amount" }
                StatCard { icon: "👥", value: stats.unique_accounts.to_string(), caption: "Unique accounts" }
            }

            h2 { style: "color: #f7931a; margin-top: 16px;", "🔍 Detection results" }
            div { style: "display: grid; grid-template-columns: repeat(3, 1fr); gap: 8px;",
                StatCard { icon: "🔄", value: summary.cycles_detected.to_string(), caption: "Circular money patterns" }
                StatCard { icon: "🔀", value: summary.structuring_detected.to_string(), caption: "Structuring (smurfing)" }
                StatCard { icon: "🎯", value: summary.high_risk_accounts.to_string(), caption: "High-centrality accounts" }
            }

            h2 { style: "color: #f7931a; margin-top: 16px;", "🕸️ Graph" }
            div { style: "background: #16213e; padding: 12px; border-radius: 4px; font-size: 13px;",
                p { "Nodes: {graph_stats.nodes}" }
                p { "Edges: {graph_stats.edges}" }
                p { "Density: {graph_stats.density:.4}" }
            }
        }
    }
}

#[component]
fn StatCard(icon: &'static str, value: String, caption: &'static str) -> Element {
    rsx! {
        div { style: "background: #16213e; padding: 12px; border-radius: 4px; display: flex; gap: 12px; align-items: center;",
            span { style: "font-size: 24px;", "{icon}" }
            div {
                div { style: "font-size: 18px; font-weight: bold;", "{value}" }
                div { style: "font-size: 11px; color: #888;", "{caption}" }
            }
        }
    }
}
