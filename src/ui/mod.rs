pub mod alerts;
pub mod dashboard;
pub mod graph;

use dioxus::prelude::*;

use crate::api::Snapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Dashboard,
    Graph,
    Alerts,
}

/// Root UI component.
#[component]
pub fn App() -> Element {
    let mut tab = use_signal(|| Tab::Dashboard);

    // Re-runs on `restart()`; the three API calls go out together.
    let mut snapshot = use_resource(move || async move {
        let Some(client) = crate::api_client() else {
            return Err("Detection engine client not initialized".to_string());
        };
        client.fetch_all().await.map_err(|e| {
            tracing::error!("Failed to load analysis: {e}");
            format!("{e}. Make sure the detection engine is running at {}", client.base_url())
        })
    });

    let loaded: Option<Result<Snapshot, String>> = snapshot.cloned();
    let alert_total = match &loaded {
        Some(Ok(s)) => s.report.total_alerts,
        _ => 0,
    };

    rsx! {
        div { class: "app",
            style: "font-family: monospace; background: #1a1a2e; color: #e0e0e0; min-height: 100vh; padding: 16px;",

            h1 { style: "color: #f7931a; margin-bottom: 4px;",
                "🔍 FraudLens"
            }
            p { style: "color: #888; margin-top: 0;",
                "Transaction-network analysis for money-laundering detection"
            }

            nav { style: "display: flex; gap: 8px; margin-bottom: 16px;",
                TabButton { label: "📊 Dashboard".to_string(), active: tab() == Tab::Dashboard, onclick: move |_| tab.set(Tab::Dashboard) }
                TabButton { label: "🕸️ Transaction Graph".to_string(), active: tab() == Tab::Graph, onclick: move |_| tab.set(Tab::Graph) }
                TabButton { label: format!("🚨 Alerts ({alert_total})"), active: tab() == Tab::Alerts, onclick: move |_| tab.set(Tab::Alerts) }
            }

            main {
                {match loaded {
                    None => rsx! {
                        p { style: "color: #666;", "Loading fraud analysis..." }
                    },
                    Some(Err(message)) => rsx! {
                        div { style: "background: #3a0000; border-left: 3px solid #f5576c; padding: 12px; border-radius: 4px;",
                            "⚠️ {message}"
                        }
                    },
                    Some(Ok(s)) => match tab() {
                        Tab::Dashboard => rsx! {
                            dashboard::Dashboard {
                                stats: s.stats,
                                summary: s.report.summary,
                                graph_stats: s.report.graph_stats,
                            }
                        },
                        Tab::Graph => rsx! {
                            graph::GraphPanel { data: s.graph }
                        },
                        Tab::Alerts => rsx! {
                            alerts::AlertsPanel { alerts: s.report.alerts }
                        },
                    },
                }}
            }

            footer { style: "margin-top: 16px;",
                button {
                    style: "background: #16213e; color: #f7931a; border: 1px solid #f7931a; padding: 6px 12px; border-radius: 4px; cursor: pointer;",
                    onclick: move |_| {
                        tracing::info!("Reloading analysis");
                        snapshot.restart();
                    },
                    "🔄 Reload analysis"
                }
            }
        }
    }
}

#[component]
fn TabButton(label: String, active: bool, onclick: EventHandler<MouseEvent>) -> Element {
    let (bg, fg) = if active {
        ("#f7931a", "#1a1a2e")
    } else {
        ("#16213e", "#e0e0e0")
    };
    rsx! {
        button {
            style: "background: {bg}; color: {fg}; border: none; padding: 8px 14px; border-radius: 4px; cursor: pointer;",
            onclick: move |evt| onclick.call(evt),
            "{label}"
        }
    }
}

/// Format a currency amount with thousands separators and two decimals.
pub fn format_amount(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{sign}${grouped}.{frac}")
}
