use serde::{Deserialize, Serialize};

/// Scheduler configuration, loaded from a TOML file. Every field has a
/// default so an empty file (or a missing one handled by the caller) yields
/// a runnable setup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Seconds between monitor passes.
    #[serde(default = "default_check_interval_secs")]
    pub check_interval_secs: u64,

    /// IANA zone the business-hours calendar runs in.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl ServerConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            check_interval_secs: default_check_interval_secs(),
            timezone: default_timezone(),
        }
    }
}

fn default_database_url() -> String {
    "sqlite://data/doctrack.db?mode=rwc".to_string()
}

fn default_check_interval_secs() -> u64 {
    3600
}

fn default_timezone() -> String {
    "Asia/Manila".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config: ServerConfig = toml::from_str("").unwrap();
        assert_eq!(config.database_url, "sqlite://data/doctrack.db?mode=rwc");
        assert_eq!(config.check_interval_secs, 3600);
        assert_eq!(config.timezone, "Asia/Manila");
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config: ServerConfig = toml::from_str("check_interval_secs = 900").unwrap();
        assert_eq!(config.check_interval_secs, 900);
        assert_eq!(config.timezone, "Asia/Manila");
    }
}
