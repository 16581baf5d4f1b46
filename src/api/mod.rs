use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::ApiConfig;
use crate::core::{AnalysisReport, GraphData, IntegrityError, Stats};

pub const ANALYZE: &str = "/api/analyze";
pub const GRAPH: &str = "/api/graph";
pub const STATS: &str = "/api/stats";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error on {endpoint}: {source}")]
    Http {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} answered with status {status}")]
    Status {
        endpoint: &'static str,
        status: reqwest::StatusCode,
    },

    /// The engine is up but has nothing to analyze yet.
    #[error("{endpoint} reported: {message}")]
    Upstream {
        endpoint: &'static str,
        message: String,
    },

    #[error("malformed payload from {endpoint}: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("inconsistent data from the detection engine: {0}")]
    Integrity(#[from] IntegrityError),
}

/// Everything one refresh pulls from the detection engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub report: AnalysisReport,
    pub graph: GraphData,
    pub stats: Stats,
}

/// Read-only client for the detection engine's HTTP API.
#[derive(Debug, Clone)]
pub struct DetectorClient {
    base_url: String,
    client: Client,
}

impl DetectorClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|source| ApiError::Http {
                endpoint: "client",
                source,
            })?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn analyze(&self) -> Result<AnalysisReport, ApiError> {
        let report: AnalysisReport = self.get(ANALYZE).await?;
        report.validate()?;
        Ok(report)
    }

    pub async fn graph(&self) -> Result<GraphData, ApiError> {
        self.get(GRAPH).await
    }

    pub async fn stats(&self) -> Result<Stats, ApiError> {
        self.get(STATS).await
    }

    /// Issue the three queries concurrently; the first failure wins.
    pub async fn fetch_all(&self) -> Result<Snapshot, ApiError> {
        let (report, graph, stats) = tokio::try_join!(self.analyze(), self.graph(), self.stats())?;
        info!(
            "Fetched {} alerts, {} nodes, {} edges from {}",
            report.alerts.len(),
            graph.nodes.len(),
            graph.edges.len(),
            self.base_url
        );
        Ok(Snapshot {
            report,
            graph,
            stats,
        })
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &'static str) -> Result<T, ApiError> {
        let url = format!("{}{endpoint}", self.base_url);
        debug!("GET {url}");

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| ApiError::Http { endpoint, source })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::Status { endpoint, status });
        }

        let body = resp
            .text()
            .await
            .map_err(|source| ApiError::Http { endpoint, source })?;
        decode(endpoint, &body)
    }
}

/// Decode an API body, turning the engine's `{"error": ...}` reply into
/// [`ApiError::Upstream`].
pub fn decode<T: DeserializeOwned>(endpoint: &'static str, body: &str) -> Result<T, ApiError> {
    let value: Value =
        serde_json::from_str(body).map_err(|source| ApiError::Decode { endpoint, source })?;

    if let Some(message) = value.get("error").and_then(Value::as_str) {
        return Err(ApiError::Upstream {
            endpoint,
            message: message.to_string(),
        });
    }

    serde_json::from_value(value).map_err(|source| ApiError::Decode { endpoint, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Alert, AlertKind};

    const ANALYZE_BODY: &str = r#"{
        "total_alerts": 2,
        "alerts": [
            {"type": "cycle", "accounts": ["ACC0003", "ACC0007", "ACC0001"],
             "transactions": [
                {"id": "TXN000031", "from_account": "ACC0003", "to_account": "ACC0007",
                 "amount": 15000.0, "timestamp": "2025-02-11T14:00:00"},
                {"id": "TXN000032", "from_account": "ACC0007", "to_account": "ACC0001",
                 "amount": 14850.0, "timestamp": "2025-02-11T14:35:00"},
                {"id": "TXN000033", "from_account": "ACC0001", "to_account": "ACC0003",
                 "amount": 14700.5, "timestamp": "2025-02-11T15:10:00"}
             ],
             "total_amount": 44550.5, "avg_amount": 14850.17, "time_span_hours": 1.17,
             "num_transactions": 3, "amount_variation": 2.02, "risk_score": 85},
            {"type": "high_centrality", "account": "ACC0002", "betweenness": 0.0833,
             "in_degree": 4, "out_degree": 5, "total_in_amount": 20311.4,
             "total_out_amount": 19870.0, "is_balanced_bridge": true, "risk_score": 65}
        ],
        "summary": {"cycles_detected": 1, "structuring_detected": 0, "high_risk_accounts": 1},
        "graph_stats": {"nodes": 10, "edges": 27, "density": 0.3}
    }"#;

    const GRAPH_BODY: &str = r#"{
        "nodes": [
            {"id": "ACC0001", "label": "ACC0001", "degree": 5, "size": 20},
            {"id": "ACC0002", "label": "ACC0002", "degree": 9, "size": 28}
        ],
        "edges": [
            {"source": "ACC0001", "target": "ACC0002", "weight": 4210.5, "count": 2}
        ]
    }"#;

    const STATS_BODY: &str = r#"{
        "total_transactions": 30, "total_fraudulent": 8, "total_legitimate": 22,
        "total_amount": 184523.11, "avg_amount": 6150.77, "unique_accounts": 20
    }"#;

    #[test]
    fn decodes_analysis_report() {
        let report: AnalysisReport = decode(ANALYZE, ANALYZE_BODY).unwrap();
        assert_eq!(report.total_alerts, 2);
        assert_eq!(report.alerts[0].kind(), AlertKind::Cycle);
        assert_eq!(report.summary.cycles_detected, 1);
        assert!(report.validate().is_ok());
        match &report.alerts[0] {
            Alert::Cycle(c) => assert_eq!(c.num_transactions, Some(3)),
            other => panic!("expected cycle, got {:?}", other.kind()),
        }
    }

    #[test]
    fn decodes_graph_and_ignores_extra_fields() {
        let graph: GraphData = decode(GRAPH, GRAPH_BODY).unwrap();
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.edges[0].count, 2);
    }

    #[test]
    fn decodes_stats() {
        let stats: Stats = decode(STATS, STATS_BODY).unwrap();
        assert_eq!(stats.total_transactions, 30);
        assert_eq!(stats.unique_accounts, 20);
    }

    #[test]
    fn error_body_is_upstream_fault() {
        let err = decode::<Stats>(STATS, r#"{"error": "No data loaded"}"#).unwrap_err();
        assert!(matches!(
            err,
            ApiError::Upstream { endpoint: STATS, ref message } if message == "No data loaded"
        ));
    }

    #[test]
    fn unknown_alert_type_fails_decode() {
        let body = ANALYZE_BODY.replace("\"high_centrality\"", "\"velocity\"");
        let err = decode::<AnalysisReport>(ANALYZE, &body).unwrap_err();
        assert!(matches!(err, ApiError::Decode { endpoint: ANALYZE, .. }));
    }

    #[test]
    fn garbage_body_fails_decode() {
        assert!(matches!(
            decode::<GraphData>(GRAPH, "<html>502</html>"),
            Err(ApiError::Decode { .. })
        ));
    }

    #[test]
    fn client_trims_trailing_slash() {
        let config = ApiConfig {
            base_url: "http://engine:8000/".into(),
            timeout_seconds: 5,
        };
        let client = DetectorClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "http://engine:8000");
    }
}
