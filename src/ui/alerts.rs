use dioxus::prelude::*;

use crate::core::evidence::{CycleEvidence, EvidenceRow};
use crate::core::presentation::{self, AlertCard, AlertFilter, SortOrder};
use crate::core::{Alert, AlertKind, CentralityAlert, CycleAlert, StructuringAlert};
use crate::ui::format_amount;

#[component]
pub fn AlertsPanel(alerts: Vec<Alert>) -> Element {
    let config = crate::get_config();
    let mut filter = use_signal(|| config.ui.default_filter);
    let mut order = use_signal(|| config.ui.default_sort);

    if alerts.is_empty() {
        return rsx! {
            div { style: "text-align: center; padding: 32px;",
                div { style: "font-size: 32px;", "✅" }
                h3 { "No alerts detected" }
                p { style: "color: #888;", "All transactions look legitimate." }
            }
        };
    }

    let counts = presentation::count_by_kind(&alerts);
    let filters: Vec<(AlertFilter, String)> = std::iter::once(AlertFilter::All)
        .chain(AlertKind::ALL.into_iter().map(AlertFilter::Only))
        .map(|f| {
            let name = match f {
                AlertFilter::All => "All",
                AlertFilter::Only(AlertKind::Cycle) => "Cycles",
                AlertFilter::Only(AlertKind::Structuring) => "Structuring",
                AlertFilter::Only(AlertKind::HighCentrality) => "High centrality",
            };
            (f, format!("{name} ({})", counts.get(f)))
        })
        .collect();

    let cards = presentation::cards(&alerts, filter(), order());

    rsx! {
        div {
            h2 { style: "color: #f7931a;", "🚨 Detected fraud alerts ({alerts.len()})" }

            div { style: "display: flex; gap: 16px; margin-bottom: 12px; font-size: 13px;",
                label {
                    "Filter by type: "
                    select {
                        value: "{filter}",
                        onchange: move |evt| match evt.value().parse::<AlertFilter>() {
                            Ok(f) => filter.set(f),
                            Err(e) => tracing::warn!("{e}"),
                        },
                        for (f, text) in filters {
                            option { value: "{f}", selected: f == filter(), "{text}" }
                        }
                    }
                }
                label {
                    "Sort by: "
                    select {
                        value: "{order}",
                        onchange: move |evt| match evt.value().parse::<SortOrder>() {
                            Ok(o) => order.set(o),
                            Err(e) => tracing::warn!("{e}"),
                        },
                        for o in SortOrder::ALL {
                            option { value: "{o}", selected: o == order(), "{o.label()}" }
                        }
                    }
                }
            }

            {match cards {
                Ok(cards) => rsx! {
                    for card in cards {
                        AlertCardView { card }
                    }
                },
                Err(e) => rsx! {
                    div { style: "background: #3a0000; border-left: 3px solid #f5576c; padding: 8px; border-radius: 4px;",
                        "⚠️ Alert data rejected: {e}"
                    }
                },
            }}
        }
    }
}

#[component]
fn AlertCardView(card: AlertCard) -> Element {
    let kind = card.alert.kind();
    let level = card.level;
    let score = card.alert.risk_score();

    rsx! {
        div {
            style: "background: {level.color()}; border-left: 3px solid #f7931a; padding: 10px; margin: 6px 0; border-radius: 4px; font-size: 13px;",
            div { style: "display: flex; justify-content: space-between; font-weight: bold;",
                span { "{kind.emoji()} {kind.title()}" }
                span { "{level.emoji()} {level.label()} - {score}%" }
            }
            div { style: "margin-top: 6px;",
                {match &card.alert {
                    Alert::Cycle(alert) => rsx! {
                        CycleDetails { alert: alert.clone(), evidence: card.evidence.clone() }
                    },
                    Alert::Structuring(alert) => rsx! {
                        StructuringDetails { alert: alert.clone() }
                    },
                    Alert::HighCentrality(alert) => rsx! {
                        CentralityDetails { alert: alert.clone() }
                    },
                }}
            }
            div { style: "margin-top: 6px;",
                for warning in card.warnings.iter() {
                    span { style: "background: #5a3a00; color: #ffcc66; padding: 1px 6px; border-radius: 3px; margin-right: 6px; font-size: 11px;",
                        "{warning.text()}"
                    }
                }
            }
            p { style: "color: #aaa; font-size: 12px; margin-bottom: 0;",
                "ℹ️ {card.commentary}"
            }
        }
    }
}

#[component]
fn CycleDetails(alert: CycleAlert, evidence: Option<CycleEvidence>) -> Element {
    let origin = alert.accounts.first().cloned().unwrap_or_default();
    let chain = alert.accounts.join(" → ");
    let total = format_amount(alert.total_amount);
    let avg = format_amount(alert.avg_amount);

    rsx! {
        div { "Cycle: {chain} ↻ {origin}" }
        if let Some(evidence) = evidence.filter(|e| !e.is_empty()) {
            EvidenceTable { evidence }
        }
        div { "Total cycle amount: {total}" }
        div { "Average amount: {avg}" }
        div { "Amount variation: {alert.amount_variation}%" }
        div { "Time window: {alert.time_span_hours:.1} hours" }
    }
}

#[component]
fn EvidenceTable(evidence: CycleEvidence) -> Element {
    rsx! {
        div { style: "margin: 8px 0;",
            h4 { style: "margin: 4px 0;", "📋 Cycle transactions" }
            table { style: "width: 100%; border-collapse: collapse; font-size: 12px;",
                thead {
                    tr { style: "color: #888; text-align: left;",
                        th { "Step" }
                        th { "Transaction" }
                        th { "From" }
                        th { "" }
                        th { "To" }
                        th { "Amount" }
                        th { "Date/time" }
                    }
                }
                tbody {
                    for row in evidence.rows() {
                        {match row {
                            EvidenceRow::Step(step) => rsx! {
                                tr {
                                    td { "{step.step}" }
                                    td { style: "font-family: monospace;", "{step.transaction.id}" }
                                    td { "{step.from_account}" }
                                    td { "→" }
                                    td { "{step.to_account}" }
                                    td { {format_amount(step.transaction.amount)} }
                                    td { {step.transaction.timestamp.format("%d/%m/%Y %H:%M").to_string()} }
                                }
                            },
                            EvidenceRow::Missing(hop) => rsx! {
                                tr { style: "color: #666;",
                                    td { "{hop.step}" }
                                    td { "(no transaction)" }
                                    td { "{hop.from_account}" }
                                    td { "→" }
                                    td { "{hop.to_account}" }
                                    td { "" }
                                    td { "" }
                                }
                            },
                        }}
                    }
                    tr {
                        td { colspan: "7", style: "color: #f7931a; padding-top: 4px;",
                            "↻ Money returns to {evidence.returns_to}, closing the cycle"
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn StructuringDetails(alert: StructuringAlert) -> Element {
    let total = format_amount(alert.total_amount);
    let avg = format_amount(alert.avg_amount);
    rsx! {
        div { "Source account: {alert.account}" }
        div { "Number of transactions: {alert.num_transactions}" }
        div { "Total amount: {total}" }
        div { "Average amount: {avg}" }
        div { "Amount variation: {alert.amount_variation}%" }
        div { "Time window: {alert.time_window_hours:.1} hours" }
    }
}

#[component]
fn CentralityDetails(alert: CentralityAlert) -> Element {
    let total_in = format_amount(alert.total_in_amount);
    let total_out = format_amount(alert.total_out_amount);
    rsx! {
        div { "Account: {alert.account}" }
        div { "Betweenness centrality: {alert.betweenness}" }
        div { "Incoming transactions: {alert.in_degree}" }
        div { "Outgoing transactions: {alert.out_degree}" }
        div { "Total incoming: {total_in}" }
        div { "Total outgoing: {total_out}" }
    }
}
