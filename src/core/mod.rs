pub mod commentary;
pub mod error;
pub mod evidence;
pub mod graph_model;
pub mod presentation;

use std::collections::HashSet;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub use error::IntegrityError;

/// A single transfer between two accounts, as reported by the detection engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub from_account: String,
    pub to_account: String,
    pub amount: f64,
    pub timestamp: NaiveDateTime,
}

/// Funds flowing through a closed loop of accounts back to the origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleAlert {
    /// Loop order. Not necessarily chronological.
    pub accounts: Vec<String>,
    pub transactions: Vec<Transaction>,
    pub total_amount: f64,
    pub avg_amount: f64,
    /// Percent spread between the largest and smallest amount.
    pub amount_variation: f64,
    pub time_span_hours: f64,
    #[serde(default)]
    pub num_transactions: Option<usize>,
    pub risk_score: u32,
}

/// Many transfers out of one account inside a short window (smurfing).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuringAlert {
    pub account: String,
    pub num_transactions: usize,
    pub total_amount: f64,
    pub avg_amount: f64,
    pub amount_variation: f64,
    pub similar_amounts: bool,
    pub time_window_hours: f64,
    pub risk_score: u32,
}

/// An account that sits on an unusual share of shortest paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CentralityAlert {
    pub account: String,
    pub betweenness: f64,
    pub in_degree: u32,
    pub out_degree: u32,
    pub total_in_amount: f64,
    pub total_out_amount: f64,
    pub is_balanced_bridge: bool,
    pub risk_score: u32,
}

/// Every alert the engine can emit. Unknown `type` tags fail to decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Alert {
    #[serde(rename = "cycle")]
    Cycle(CycleAlert),
    #[serde(rename = "structuring")]
    Structuring(StructuringAlert),
    #[serde(rename = "high_centrality")]
    HighCentrality(CentralityAlert),
}

/// Alert discriminant, used for filtering and counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Cycle,
    Structuring,
    HighCentrality,
}

impl AlertKind {
    pub const ALL: [AlertKind; 3] = [
        AlertKind::Cycle,
        AlertKind::Structuring,
        AlertKind::HighCentrality,
    ];

    /// Wire tag, as used by the API and the filter selector.
    pub fn tag(&self) -> &'static str {
        match self {
            AlertKind::Cycle => "cycle",
            AlertKind::Structuring => "structuring",
            AlertKind::HighCentrality => "high_centrality",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            AlertKind::Cycle => "Cycle Detected",
            AlertKind::Structuring => "Structuring (Smurfing)",
            AlertKind::HighCentrality => "High Centrality",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            AlertKind::Cycle => "🔄",
            AlertKind::Structuring => "🔀",
            AlertKind::HighCentrality => "🎯",
        }
    }
}

impl Alert {
    pub fn kind(&self) -> AlertKind {
        match self {
            Alert::Cycle(_) => AlertKind::Cycle,
            Alert::Structuring(_) => AlertKind::Structuring,
            Alert::HighCentrality(_) => AlertKind::HighCentrality,
        }
    }

    pub fn risk_score(&self) -> u32 {
        match self {
            Alert::Cycle(a) => a.risk_score,
            Alert::Structuring(a) => a.risk_score,
            Alert::HighCentrality(a) => a.risk_score,
        }
    }

    pub fn level(&self) -> AlertLevel {
        AlertLevel::from_score(self.risk_score())
    }

    /// Check the invariants the engine promises for this alert.
    pub fn validate(&self) -> Result<(), IntegrityError> {
        let score = self.risk_score();
        if score > 100 {
            return Err(IntegrityError::RiskScoreOutOfRange { score });
        }
        if let Alert::Cycle(cycle) = self {
            cycle.validate()?;
        }
        Ok(())
    }
}

impl Transaction {
    /// Amounts must be finite and non-negative.
    pub fn validate(&self) -> Result<(), IntegrityError> {
        if self.amount.is_finite() && self.amount >= 0.0 {
            Ok(())
        } else {
            Err(IntegrityError::InvalidAmount {
                transaction: self.id.clone(),
                amount: self.amount,
            })
        }
    }
}

impl CycleAlert {
    pub fn validate(&self) -> Result<(), IntegrityError> {
        if self.accounts.len() < 2 {
            return Err(IntegrityError::CycleTooShort {
                len: self.accounts.len(),
            });
        }
        let mut seen = HashSet::with_capacity(self.accounts.len());
        for account in &self.accounts {
            if !seen.insert(account.as_str()) {
                return Err(IntegrityError::DuplicateCycleAccount(account.clone()));
            }
        }
        self.transactions.iter().try_for_each(Transaction::validate)
    }
}

/// Risk tier, used for display emphasis only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertLevel {
    Critical, // ≥80
    High,     // ≥60
    Medium,   // ≥40
    Low,      // <40
}

impl AlertLevel {
    pub fn from_score(score: u32) -> Self {
        if score >= 80 {
            AlertLevel::Critical
        } else if score >= 60 {
            AlertLevel::High
        } else if score >= 40 {
            AlertLevel::Medium
        } else {
            AlertLevel::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AlertLevel::Critical => "CRITICAL",
            AlertLevel::High => "HIGH",
            AlertLevel::Medium => "MEDIUM",
            AlertLevel::Low => "LOW",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            AlertLevel::Critical => "🔴",
            AlertLevel::High => "🟠",
            AlertLevel::Medium => "🟡",
            AlertLevel::Low => "⚪",
        }
    }

    /// Card background for the tier.
    pub fn color(&self) -> &'static str {
        match self {
            AlertLevel::Critical => "#3a0000",
            AlertLevel::High => "#3a2600",
            AlertLevel::Medium => "#3a3a00",
            AlertLevel::Low => "#1a1a2e",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionSummary {
    pub cycles_detected: usize,
    pub structuring_detected: usize,
    pub high_risk_accounts: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphStats {
    pub nodes: usize,
    pub edges: usize,
    pub density: f64,
}

/// Body of `GET /api/analyze`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub total_alerts: usize,
    pub alerts: Vec<Alert>,
    pub summary: DetectionSummary,
    pub graph_stats: GraphStats,
}

impl AnalysisReport {
    pub fn validate(&self) -> Result<(), IntegrityError> {
        self.alerts.iter().try_for_each(Alert::validate)
    }
}

/// An account in the transaction network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub degree: u32,
}

/// All transfers from `source` to `target`, aggregated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    /// Summed amount.
    pub weight: f64,
    /// Number of transactions.
    pub count: u32,
}

/// Body of `GET /api/graph`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

/// Body of `GET /api/stats`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub total_transactions: usize,
    pub total_fraudulent: usize,
    pub total_legitimate: usize,
    pub total_amount: f64,
    pub avg_amount: f64,
    pub unique_accounts: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_cycle(accounts: &[&str], risk_score: u32) -> CycleAlert {
        CycleAlert {
            accounts: accounts.iter().map(|a| a.to_string()).collect(),
            transactions: vec![],
            total_amount: 0.0,
            avg_amount: 0.0,
            amount_variation: 0.0,
            time_span_hours: 0.0,
            num_transactions: None,
            risk_score,
        }
    }

    #[test]
    fn tier_boundaries() {
        assert_eq!(AlertLevel::from_score(79), AlertLevel::High);
        assert_eq!(AlertLevel::from_score(80), AlertLevel::Critical);
        assert_eq!(AlertLevel::from_score(60), AlertLevel::High);
        assert_eq!(AlertLevel::from_score(59), AlertLevel::Medium);
        assert_eq!(AlertLevel::from_score(40), AlertLevel::Medium);
        assert_eq!(AlertLevel::from_score(39), AlertLevel::Low);
        assert_eq!(AlertLevel::from_score(0), AlertLevel::Low);
        assert_eq!(AlertLevel::from_score(100), AlertLevel::Critical);
    }

    #[test]
    fn decodes_all_three_alert_kinds() {
        let json = r#"[
            {"type": "cycle", "accounts": ["ACC0001", "ACC0002"],
             "transactions": [{"id": "TXN000001", "from_account": "ACC0001",
                               "to_account": "ACC0002", "amount": 1200.5,
                               "timestamp": "2025-03-01T10:15:00"}],
             "total_amount": 1200.5, "avg_amount": 1200.5,
             "amount_variation": 0.0, "time_span_hours": 0.0,
             "num_transactions": 1, "risk_score": 55},
            {"type": "structuring", "account": "ACC0003", "num_transactions": 6,
             "total_amount": 17000.0, "avg_amount": 2833.33, "amount_variation": 12.5,
             "time_window_hours": 5.5, "similar_amounts": true, "risk_score": 95},
            {"type": "high_centrality", "account": "ACC0004", "betweenness": 0.1234,
             "in_degree": 7, "out_degree": 6, "total_in_amount": 40000.0,
             "total_out_amount": 38000.0, "is_balanced_bridge": true, "risk_score": 70}
        ]"#;
        let alerts: Vec<Alert> = serde_json::from_str(json).unwrap();
        let kinds: Vec<AlertKind> = alerts.iter().map(Alert::kind).collect();
        assert_eq!(
            kinds,
            vec![AlertKind::Cycle, AlertKind::Structuring, AlertKind::HighCentrality]
        );
        assert_eq!(alerts[1].level(), AlertLevel::Critical);
    }

    #[test]
    fn unknown_alert_tag_is_rejected() {
        let json = r#"{"type": "velocity", "account": "ACC0001", "risk_score": 10}"#;
        assert!(serde_json::from_str::<Alert>(json).is_err());
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let json = r#"{"type": "structuring", "account": "ACC0003", "risk_score": 60}"#;
        assert!(serde_json::from_str::<Alert>(json).is_err());
    }

    #[test]
    fn timestamp_with_fractional_seconds() {
        let json = r#"{"id": "T1", "from_account": "A", "to_account": "B",
                       "amount": 10.0, "timestamp": "2025-03-01T10:15:00.123456"}"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.timestamp.and_utc().timestamp_subsec_micros(), 123_456);
    }

    #[test]
    fn validate_rejects_out_of_range_score() {
        let alert = Alert::Cycle(make_cycle(&["A", "B"], 101));
        assert_eq!(
            alert.validate(),
            Err(IntegrityError::RiskScoreOutOfRange { score: 101 })
        );
    }

    #[test]
    fn validate_rejects_short_or_repeating_cycles() {
        assert_eq!(
            make_cycle(&["A"], 50).validate(),
            Err(IntegrityError::CycleTooShort { len: 1 })
        );
        assert_eq!(
            make_cycle(&["A", "B", "A"], 50).validate(),
            Err(IntegrityError::DuplicateCycleAccount("A".into()))
        );
        assert!(make_cycle(&["A", "B", "C"], 50).validate().is_ok());
    }

    #[test]
    fn validate_rejects_negative_or_nan_amounts() {
        use crate::core::evidence::tests::tx;

        let mut alert = make_cycle(&["A", "B"], 50);
        alert.transactions = vec![tx("T1", "A", "B", 0.0, 1), tx("T2", "B", "A", -5.0, 2)];
        assert_eq!(
            alert.validate(),
            Err(IntegrityError::InvalidAmount {
                transaction: "T2".into(),
                amount: -5.0,
            })
        );

        alert.transactions = vec![tx("T3", "A", "B", f64::NAN, 1)];
        assert!(matches!(
            Alert::Cycle(alert.clone()).validate(),
            Err(IntegrityError::InvalidAmount { transaction, .. }) if transaction == "T3"
        ));

        alert.transactions = vec![tx("T4", "A", "B", 125.5, 1)];
        assert!(alert.validate().is_ok());
    }

    #[test]
    fn kind_tags_match_wire_format() {
        for kind in AlertKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.tag()));
        }
    }
}
