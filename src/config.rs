use serde::Deserialize;
use std::path::Path;

use crate::core::graph_model::DEFAULT_MIN_DEGREE;
use crate::core::presentation::{AlertFilter, SortOrder};

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub graph: GraphConfig,
    pub layout: LayoutConfig,
    pub style: StyleConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GraphConfig {
    /// Nodes with fewer transactions than this are hidden.
    pub min_degree: u32,
    /// Upper bound of the min-degree slider.
    pub max_min_degree: u32,
}

/// Force-directed placement parameters.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LayoutConfig {
    /// Upper bound on annealing rounds. More rounds, steadier layout.
    pub iterations: u32,
    /// Largest step a node may take in the first round.
    pub initial_temperature: f64,
    /// Per-round multiplier on the temperature, in (0, 1).
    pub cooling_factor: f64,
    /// Stop once the temperature falls below this.
    pub min_temperature: f64,
    /// Push between every pair of nodes. Higher spreads the graph out.
    pub node_repulsion: f64,
    /// Length every edge spring relaxes towards.
    pub ideal_edge_length: f64,
    /// Spring softness. Lower pulls connected nodes harder towards the ideal length.
    pub edge_elasticity: f64,
    /// Pull towards the layout center, keeps disconnected parts from drifting.
    pub gravity: f64,
    /// Margin kept around the graph when fitting it to the viewport.
    pub padding: f64,
    /// Scale and center the result into the viewport.
    pub fit: bool,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct StyleConfig {
    pub node_color: String,
    pub label_color: String,
    pub font_size: f64,
    pub label_outline_width: f64,
    pub edge_color: String,
    pub arrow_scale: f64,
    pub selected_color: String,
    pub selected_border_width: f64,
    pub selected_border_color: String,
    pub selected_edge_width: f64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct UiConfig {
    pub default_filter: AlertFilter,
    pub default_sort: SortOrder,
    pub viewport_width: f64,
    pub viewport_height: f64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".into(),
            timeout_seconds: 30,
        }
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            min_degree: DEFAULT_MIN_DEGREE,
            max_min_degree: 10,
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            iterations: 300,
            initial_temperature: 200.0,
            cooling_factor: 0.95,
            min_temperature: 1.0,
            node_repulsion: 8000.0,
            ideal_edge_length: 50.0,
            edge_elasticity: 100.0,
            gravity: 80.0,
            padding: 30.0,
            fit: true,
        }
    }
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            node_color: "#667eea".into(),
            label_color: "#fff".into(),
            font_size: 10.0,
            label_outline_width: 2.0,
            edge_color: "#cbd5e0".into(),
            arrow_scale: 1.5,
            selected_color: "#f5576c".into(),
            selected_border_width: 3.0,
            selected_border_color: "#fff".into(),
            selected_edge_width: 4.0,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            default_filter: AlertFilter::All,
            default_sort: SortOrder::RiskDesc,
            viewport_width: 1100.0,
            viewport_height: 650.0,
        }
    }
}

impl Config {
    /// Load config from a TOML file. Falls back to defaults if file doesn't exist.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!("Config file {} not found, using defaults", path.display());
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(config) => {
                    tracing::info!("Config loaded from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {e}, using defaults", path.display());
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read {}: {e}, using defaults", path.display());
                Self::default()
            }
        }
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }
}
