use serde::Serialize;
use tracing::debug;

use super::{CycleAlert, IntegrityError, Transaction};

/// One hop of a cycle backed by a concrete transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvidenceStep {
    /// 1-based position of the hop in the loop.
    pub step: usize,
    pub transaction: Transaction,
    pub from_account: String,
    pub to_account: String,
    /// True for the hop that returns to the first account.
    pub closes_cycle: bool,
}

/// An expected hop with no matching transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingHop {
    pub step: usize,
    pub from_account: String,
    pub to_account: String,
}

/// The ordered chain of hops demonstrating a circular money flow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleEvidence {
    /// Steps in loop order, not chronological order.
    pub steps: Vec<EvidenceStep>,
    /// Hops the engine listed but sent no transaction for.
    pub missing: Vec<MissingHop>,
    /// Where the money ends up: always the first account of the loop.
    pub returns_to: String,
}

/// One line of the evidence table, in loop order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EvidenceRow<'a> {
    Step(&'a EvidenceStep),
    Missing(&'a MissingHop),
}

impl EvidenceRow<'_> {
    pub fn step(&self) -> usize {
        match self {
            EvidenceRow::Step(s) => s.step,
            EvidenceRow::Missing(m) => m.step,
        }
    }
}

impl CycleEvidence {
    /// Matched steps and missing hops merged back into loop order.
    pub fn rows(&self) -> Vec<EvidenceRow<'_>> {
        let mut rows: Vec<EvidenceRow<'_>> = self
            .steps
            .iter()
            .map(EvidenceRow::Step)
            .chain(self.missing.iter().map(EvidenceRow::Missing))
            .collect();
        rows.sort_by_key(|r| r.step());
        rows
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.missing.is_empty() && !self.steps.is_empty()
    }

    pub fn total_amount(&self) -> f64 {
        self.steps.iter().map(|s| s.transaction.amount).sum()
    }
}

/// Rebuild the hop sequence of a cycle alert.
///
/// Hop order comes from `alert.accounts`. Timestamps only decide which
/// transaction backs a hop when several share the same account pair: the
/// earliest unconsumed one wins. Hops without a transaction are reported in
/// `missing` and left out of `steps`.
pub fn reconstruct(alert: &CycleAlert) -> Result<CycleEvidence, IntegrityError> {
    alert.validate()?;

    let accounts = &alert.accounts;
    let returns_to = accounts[0].clone();

    if alert.transactions.is_empty() {
        return Ok(CycleEvidence {
            steps: Vec::new(),
            missing: Vec::new(),
            returns_to,
        });
    }

    // Stable: equal timestamps keep their input order.
    let mut by_time: Vec<&Transaction> = alert.transactions.iter().collect();
    by_time.sort_by_key(|t| t.timestamp);
    let mut consumed = vec![false; by_time.len()];

    let n = accounts.len();
    let mut steps = Vec::with_capacity(n);
    let mut missing = Vec::new();

    for i in 0..n {
        let from = &accounts[i];
        let to = &accounts[(i + 1) % n];

        let found = by_time.iter().enumerate().position(|(j, t)| {
            !consumed[j] && &t.from_account == from && &t.to_account == to
        });

        match found {
            Some(j) => {
                consumed[j] = true;
                steps.push(EvidenceStep {
                    step: i + 1,
                    transaction: by_time[j].clone(),
                    from_account: from.clone(),
                    to_account: to.clone(),
                    closes_cycle: i + 1 == n,
                });
            }
            None => {
                debug!("Cycle hop {from} -> {to} has no matching transaction");
                missing.push(MissingHop {
                    step: i + 1,
                    from_account: from.clone(),
                    to_account: to.clone(),
                });
            }
        }
    }

    Ok(CycleEvidence {
        steps,
        missing,
        returns_to,
    })
}
