use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub identity: IdentityConfig,
    pub storage: StorageConfig,
    pub service: ServiceConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct IdentityConfig {
    /// Web API key of the identity project.
    pub api_key: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub bucket: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub analyse_url: String,
    pub chat_url: String,
}

/// Default configuration embedded in the bundle
pub const DEFAULT_CONFIG: &str = r#"
[identity]
api_key = ""

[storage]
bucket = "pdf-rag-883ef.appspot.com"

[service]
analyse_url = "https://pineapple-backend-rag.onrender.com/analyse"
chat_url = "https://rag-pdf-2-ew54.onrender.com/chat"
"#;

impl AppConfig {
    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn embedded() -> anyhow::Result<Self> {
        Self::from_toml(DEFAULT_CONFIG)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_loads() {
        let config = AppConfig::embedded();
        assert!(config.is_ok());
        let config = config.unwrap();
        assert_eq!(config.storage.bucket, "pdf-rag-883ef.appspot.com");
        assert!(config.service.chat_url.ends_with("/chat"));
    }

    #[test]
    fn test_missing_section_is_an_error() {
        assert!(AppConfig::from_toml("[identity]\napi_key = \"k\"\n").is_err());
    }
}
