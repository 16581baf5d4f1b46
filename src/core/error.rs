use thiserror::Error;

/// The detection engine handed us data that breaks its own contract.
///
/// These are never coerced into defaults: the caller gets the fault and
/// decides how to surface it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IntegrityError {
    #[error("edge {from} -> {to} references unknown node {missing}")]
    DanglingEdge {
        from: String,
        to: String,
        missing: String,
    },

    #[error("node id {0} appears more than once")]
    DuplicateNode(String),

    #[error("edge {from} -> {to} carries no transactions")]
    EmptyEdge { from: String, to: String },

    #[error("risk score {score} is outside 0..=100")]
    RiskScoreOutOfRange { score: u32 },

    #[error("cycle alert lists {len} account(s), at least 2 are required")]
    CycleTooShort { len: usize },

    #[error("cycle alert visits account {0} more than once")]
    DuplicateCycleAccount(String),

    #[error("transaction {transaction} has invalid amount {amount}")]
    InvalidAmount { transaction: String, amount: f64 },
}
