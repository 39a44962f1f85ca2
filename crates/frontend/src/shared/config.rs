use contracts::system::config::AppConfig;
use gloo_net::http::Request;

const CONFIG_PATH: &str = "/config.toml";

/// Load configuration for the app
///
/// Search order:
/// 1. `config.toml` served next to the bundle
/// 2. Falls back to the embedded default config
pub async fn load_config() -> anyhow::Result<AppConfig> {
    match fetch_config().await {
        Ok(config) => {
            log::info!("Loaded config from {}", CONFIG_PATH);
            Ok(config)
        }
        Err(e) => {
            log::warn!("{} not usable ({:#}), using embedded defaults", CONFIG_PATH, e);
            AppConfig::embedded()
        }
    }
}

async fn fetch_config() -> anyhow::Result<AppConfig> {
    let response = Request::get(CONFIG_PATH).send().await?;
    if !response.ok() {
        anyhow::bail!("HTTP {}", response.status());
    }
    let text = response.text().await?;
    AppConfig::from_toml(&text)
}
