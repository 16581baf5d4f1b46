use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::commentary::{self, Warning};
use super::evidence::{self, CycleEvidence};
use super::{Alert, AlertKind, AlertLevel, IntegrityError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFilterError {
    #[error("unknown alert filter {0:?}")]
    Filter(String),
    #[error("unknown sort key {0:?}")]
    Sort(String),
}

/// Which alert kinds to show.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AlertFilter {
    #[default]
    All,
    Only(AlertKind),
}

impl AlertFilter {
    pub fn matches(&self, alert: &Alert) -> bool {
        match self {
            AlertFilter::All => true,
            AlertFilter::Only(kind) => alert.kind() == *kind,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            AlertFilter::All => "all",
            AlertFilter::Only(kind) => kind.tag(),
        }
    }
}

impl FromStr for AlertFilter {
    type Err = ParseFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(AlertFilter::All);
        }
        AlertKind::ALL
            .into_iter()
            .find(|k| k.tag() == s)
            .map(AlertFilter::Only)
            .ok_or_else(|| ParseFilterError::Filter(s.to_string()))
    }
}

impl TryFrom<String> for AlertFilter {
    type Error = ParseFilterError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AlertFilter> for String {
    fn from(value: AlertFilter) -> Self {
        value.key().to_string()
    }
}

impl fmt::Display for AlertFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Ordering by risk score. Ties always keep input order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SortOrder {
    #[default]
    RiskDesc,
    RiskAsc,
}

impl SortOrder {
    pub const ALL: [SortOrder; 2] = [SortOrder::RiskDesc, SortOrder::RiskAsc];

    pub fn key(&self) -> &'static str {
        match self {
            SortOrder::RiskDesc => "risk-desc",
            SortOrder::RiskAsc => "risk-asc",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortOrder::RiskDesc => "Risk: high to low ⬇️",
            SortOrder::RiskAsc => "Risk: low to high ⬆️",
        }
    }
}

impl FromStr for SortOrder {
    type Err = ParseFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortOrder::ALL
            .into_iter()
            .find(|o| o.key() == s)
            .ok_or_else(|| ParseFilterError::Sort(s.to_string()))
    }
}

impl TryFrom<String> for SortOrder {
    type Error = ParseFilterError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SortOrder> for String {
    fn from(value: SortOrder) -> Self {
        value.key().to_string()
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Filter then stably sort alerts by risk score. Input is left untouched.
pub fn present(alerts: &[Alert], filter: AlertFilter, order: SortOrder) -> Vec<&Alert> {
    let mut out: Vec<&Alert> = alerts.iter().filter(|a| filter.matches(a)).collect();
    match order {
        SortOrder::RiskDesc => out.sort_by(|a, b| b.risk_score().cmp(&a.risk_score())),
        SortOrder::RiskAsc => out.sort_by_key(|a| a.risk_score()),
    }
    out
}

/// Alert counts for the filter selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KindCounts {
    pub all: usize,
    pub cycle: usize,
    pub structuring: usize,
    pub high_centrality: usize,
}

impl KindCounts {
    pub fn get(&self, filter: AlertFilter) -> usize {
        match filter {
            AlertFilter::All => self.all,
            AlertFilter::Only(AlertKind::Cycle) => self.cycle,
            AlertFilter::Only(AlertKind::Structuring) => self.structuring,
            AlertFilter::Only(AlertKind::HighCentrality) => self.high_centrality,
        }
    }
}

pub fn count_by_kind(alerts: &[Alert]) -> KindCounts {
    alerts.iter().fold(KindCounts::default(), |mut acc, alert| {
        acc.all += 1;
        match alert.kind() {
            AlertKind::Cycle => acc.cycle += 1,
            AlertKind::Structuring => acc.structuring += 1,
            AlertKind::HighCentrality => acc.high_centrality += 1,
        }
        acc
    })
}

/// Everything the alert list needs to draw one alert.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertCard {
    pub alert: Alert,
    pub level: AlertLevel,
    pub warnings: Vec<Warning>,
    pub commentary: String,
    /// Present for cycle alerts only.
    pub evidence: Option<CycleEvidence>,
}

impl AlertCard {
    pub fn new(alert: &Alert) -> Result<Self, IntegrityError> {
        let evidence = match alert {
            Alert::Cycle(cycle) => Some(evidence::reconstruct(cycle)?),
            Alert::Structuring(_) | Alert::HighCentrality(_) => None,
        };
        Ok(Self {
            alert: alert.clone(),
            level: alert.level(),
            warnings: commentary::warnings(alert),
            commentary: commentary::commentary(alert),
            evidence,
        })
    }
}

/// [`present`] plus per-alert tier, commentary and cycle evidence.
pub fn cards(
    alerts: &[Alert],
    filter: AlertFilter,
    order: SortOrder,
) -> Result<Vec<AlertCard>, IntegrityError> {
    present(alerts, filter, order)
        .into_iter()
        .map(AlertCard::new)
        .collect()
}
