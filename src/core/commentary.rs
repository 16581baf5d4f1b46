use serde::Serialize;

use super::{Alert, CentralityAlert, CycleAlert, StructuringAlert};

/// Cycle amounts this close together (percent spread) look engineered.
const NEAR_IDENTICAL_VARIATION: f64 = 10.0;
/// Cycles completing faster than this look engineered.
const RAPID_CYCLE_HOURS: f64 = 24.0;

/// A highlighted red flag shown next to an alert detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Warning {
    NearIdenticalAmounts,
    RapidTransfers,
    SimilarAmounts,
    BalancedBridge,
}

impl Warning {
    pub fn text(&self) -> &'static str {
        match self {
            Warning::NearIdenticalAmounts => "⚠️ Near-identical amounts",
            Warning::RapidTransfers => "⚠️ Very fast transfers",
            Warning::SimilarAmounts => "⚠️ Similar amounts",
            Warning::BalancedBridge => "⚠️ Balanced bridge: inflow ≈ outflow",
        }
    }
}

pub fn warnings(alert: &Alert) -> Vec<Warning> {
    let mut out = Vec::new();
    match alert {
        Alert::Cycle(a) => {
            if near_identical(a) {
                out.push(Warning::NearIdenticalAmounts);
            }
            if rapid(a) {
                out.push(Warning::RapidTransfers);
            }
        }
        Alert::Structuring(a) => {
            if a.similar_amounts {
                out.push(Warning::SimilarAmounts);
            }
        }
        Alert::HighCentrality(a) => {
            if a.is_balanced_bridge {
                out.push(Warning::BalancedBridge);
            }
        }
    }
    out
}

/// One-paragraph explanation of why the alert matters.
pub fn commentary(alert: &Alert) -> String {
    match alert {
        Alert::Cycle(a) => cycle_commentary(a),
        Alert::Structuring(a) => structuring_commentary(a),
        Alert::HighCentrality(a) => centrality_commentary(a),
    }
}

fn near_identical(alert: &CycleAlert) -> bool {
    alert.amount_variation < NEAR_IDENTICAL_VARIATION
}

fn rapid(alert: &CycleAlert) -> bool {
    alert.time_span_hours < RAPID_CYCLE_HOURS
}

fn cycle_commentary(alert: &CycleAlert) -> String {
    let base = "Money circulates between these accounts and returns to its origin.";
    if near_identical(alert) && rapid(alert) {
        format!(
            "{base} Similar amounts moved within a short time make this a highly suspicious money-laundering pattern."
        )
    } else {
        format!("{base} The circular pattern is suspicious but needs further investigation.")
    }
}

fn structuring_commentary(alert: &StructuringAlert) -> String {
    let similar = if alert.similar_amounts {
        "similar-sized "
    } else {
        ""
    };
    format!(
        "Multiple {similar}transactions in a short window to evade detection. \
         This pattern (smurfing) splits large sums to stay under bank reporting limits."
    )
}

fn centrality_commentary(alert: &CentralityAlert) -> String {
    let base = "This account acts as an intermediary in many transactions";
    if alert.is_balanced_bridge {
        format!(
            "{base}, with a suspicious balance between inflows and outflows. \
             Possible money mule or bridge account hiding the origin of funds."
        )
    } else {
        format!(
            "{base}. It may be a legitimate high-activity account or an intermediary for illicit operations."
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::evidence::tests::cycle;

    fn structuring(similar_amounts: bool) -> Alert {
        Alert::Structuring(StructuringAlert {
            account: "ACC0007".into(),
            num_transactions: 5,
            total_amount: 14000.0,
            avg_amount: 2800.0,
            amount_variation: 18.0,
            similar_amounts,
            time_window_hours: 4.0,
            risk_score: 75,
        })
    }

    fn centrality(is_balanced_bridge: bool) -> Alert {
        Alert::HighCentrality(CentralityAlert {
            account: "ACC0002".into(),
            betweenness: 0.21,
            in_degree: 8,
            out_degree: 9,
            total_in_amount: 52000.0,
            total_out_amount: 50000.0,
            is_balanced_bridge,
            risk_score: 65,
        })
    }

    #[test]
    fn fast_uniform_cycle_is_escalated() {
        let mut alert = cycle(&["A", "B", "C"], vec![]);
        alert.amount_variation = 3.0;
        alert.time_span_hours = 2.0;
        let alert = Alert::Cycle(alert);

        assert_eq!(
            warnings(&alert),
            vec![Warning::NearIdenticalAmounts, Warning::RapidTransfers]
        );
        assert!(commentary(&alert).contains("highly suspicious"));
    }

    #[test]
    fn slow_cycle_needs_investigation() {
        let mut alert = cycle(&["A", "B", "C"], vec![]);
        alert.amount_variation = 3.0;
        alert.time_span_hours = 30.0;
        let alert = Alert::Cycle(alert);

        assert_eq!(warnings(&alert), vec![Warning::NearIdenticalAmounts]);
        assert!(commentary(&alert).contains("further investigation"));
    }

    #[test]
    fn cycle_thresholds_are_exclusive() {
        let mut alert = cycle(&["A", "B"], vec![]);
        alert.amount_variation = 10.0;
        alert.time_span_hours = 24.0;
        assert!(warnings(&Alert::Cycle(alert)).is_empty());
    }

    #[test]
    fn structuring_mentions_similar_amounts_only_when_flagged() {
        assert!(commentary(&structuring(true)).contains("similar-sized"));
        assert!(!commentary(&structuring(false)).contains("similar-sized"));
        assert_eq!(warnings(&structuring(true)), vec![Warning::SimilarAmounts]);
        assert!(warnings(&structuring(false)).is_empty());
    }

    #[test]
    fn balanced_bridge_is_flagged() {
        assert_eq!(warnings(&centrality(true)), vec![Warning::BalancedBridge]);
        assert!(commentary(&centrality(true)).contains("money mule"));
        assert!(commentary(&centrality(false)).contains("legitimate"));
    }
}
