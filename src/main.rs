mod api;
mod config;
mod core;
mod render;
mod ui;

use tracing_subscriber::EnvFilter;

use crate::api::DetectorClient;
use crate::config::Config;

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("fraudlens=info".parse().expect("static directive")),
        )
        .init();

    tracing::info!("🔍 FraudLens starting...");

    // Load configuration
    let config = Config::load("config.toml");
    tracing::info!("Config: {:?}", config);

    let client = match DetectorClient::new(&config.api) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("Failed to build detection engine client: {e}");
            std::process::exit(1);
        }
    };
    tracing::info!("Detection engine at {}", client.base_url());

    // Store config and client in globals so the Dioxus app can grab them
    UI_CONFIG.set(config).ok();
    UI_CLIENT.set(client).ok();

    // Launch Dioxus desktop app (blocks)
    dioxus::LaunchBuilder::desktop()
        .with_cfg(
            dioxus::desktop::Config::new().with_window(
                dioxus::desktop::tao::window::WindowBuilder::new()
                    .with_title("🔍 FraudLens")
                    .with_inner_size(dioxus::desktop::tao::dpi::LogicalSize::new(1280.0, 900.0)),
            ),
        )
        .launch(ui::App);
}

/// Global config for UI access.
static UI_CONFIG: std::sync::OnceLock<Config> = std::sync::OnceLock::new();

/// Shared API client for UI access.
static UI_CLIENT: std::sync::OnceLock<DetectorClient> = std::sync::OnceLock::new();

/// Get the global config.
pub fn get_config() -> &'static Config {
    UI_CONFIG.get_or_init(Config::default)
}

/// Get the detection engine client, if `main` managed to build one.
pub fn api_client() -> Option<&'static DetectorClient> {
    UI_CLIENT.get()
}
