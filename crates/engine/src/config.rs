//! Engine configuration from the environment.

use std::path::PathBuf;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub server_host: String,
    pub server_port: u16,
    /// JSON world seed loaded into the store at startup.
    pub world_seed_path: Option<PathBuf>,
    /// When false the store reports its delta procedures as unavailable.
    pub store_procedures: bool,
    /// Comma-separated origins, or `*`. CORS is off when unset.
    pub cors_allowed_origins: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            server_host: DEFAULT_HOST.to_string(),
            server_port: DEFAULT_PORT,
            world_seed_path: None,
            store_procedures: true,
            cors_allowed_origins: None,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let server_port = match non_empty("SERVER_PORT").or_else(|| non_empty("PORT")) {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "Invalid server port, using {}", DEFAULT_PORT);
                DEFAULT_PORT
            }),
            None => DEFAULT_PORT,
        };

        let store_procedures = match non_empty("STORE_PROCEDURES") {
            Some(raw) => parse_flag(&raw).unwrap_or_else(|| {
                tracing::warn!(value = %raw, "Invalid STORE_PROCEDURES, keeping procedures on");
                true
            }),
            None => true,
        };

        Self {
            server_host: non_empty("SERVER_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            server_port,
            world_seed_path: non_empty("WORLD_SEED_PATH").map(PathBuf::from),
            store_procedures,
            cors_allowed_origins: non_empty("CORS_ALLOWED_ORIGINS"),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> EngineConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EngineConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(config(&[]), EngineConfig::default());
        assert_eq!(config(&[]).bind_address(), "0.0.0.0:3000");
    }

    #[test]
    fn port_falls_back_to_port_variable() {
        assert_eq!(config(&[("PORT", "8080")]).server_port, 8080);
        assert_eq!(
            config(&[("SERVER_PORT", "9000"), ("PORT", "8080")]).server_port,
            9000
        );
        assert_eq!(config(&[("SERVER_PORT", "not-a-port")]).server_port, 3000);
    }

    #[test]
    fn procedures_can_be_disabled() {
        assert!(!config(&[("STORE_PROCEDURES", "false")]).store_procedures);
        assert!(!config(&[("STORE_PROCEDURES", "0")]).store_procedures);
        assert!(config(&[("STORE_PROCEDURES", "maybe")]).store_procedures);
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = config(&[("WORLD_SEED_PATH", "  "), ("CORS_ALLOWED_ORIGINS", "")]);
        assert!(config.world_seed_path.is_none());
        assert!(config.cors_allowed_origins.is_none());
    }
}
