// ⚙️ Server configuration - read from the environment

use anyhow::{Context, Result};
use std::net::SocketAddr;

/// Origins allowed when CORS_ORIGINS is unset: local dev plus GitHub Pages.
pub const DEFAULT_ORIGINS: &str =
    "http://localhost:8080,http://127.0.0.1:5500,https://martinezworldwide.github.io,https://*.github.io";

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,

    /// Allowed origins; a single "*" means any origin
    pub allowed_origins: Vec<String>,

    /// tracing-subscriber EnvFilter directive
    pub log_filter: String,
}

impl ServerConfig {
    /// Load from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary lookup (tests pass a map here)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = match (non_blank("FLAGGED_BIND_ADDR"), non_blank("PORT")) {
            (Some(addr), _) => addr
                .trim()
                .parse()
                .with_context(|| format!("Invalid FLAGGED_BIND_ADDR: {}", addr))?,
            (None, Some(port)) => {
                let port: u16 = port
                    .trim()
                    .parse()
                    .with_context(|| format!("Invalid PORT: {}", port))?;
                SocketAddr::from(([0, 0, 0, 0], port))
            }
            (None, None) => DEFAULT_BIND_ADDR
                .parse()
                .context("Invalid default bind address")?,
        };

        let origins = non_blank("CORS_ORIGINS").unwrap_or_else(|| DEFAULT_ORIGINS.to_string());

        Ok(ServerConfig {
            bind_addr,
            allowed_origins: split_origins(&origins),
            log_filter: non_blank("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        })
    }

    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect()
}

/// Match an origin against a pattern that may hold one `*` wildcard,
/// e.g. `https://*.github.io`.
pub fn origin_matches(pattern: &str, origin: &str) -> bool {
    match pattern.split_once('*') {
        None => pattern == origin,
        Some((prefix, suffix)) => {
            origin.len() > prefix.len() + suffix.len()
                && origin.starts_with(prefix)
                && origin.ends_with(suffix)
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig> {
        let env: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.allowed_origins.len(), 4);
        assert_eq!(config.log_filter, "info");
        assert!(!config.allows_any_origin());
    }

    #[test]
    fn test_port_fallback() {
        let config = load(&[("PORT", "10000")]).unwrap();
        assert_eq!(config.bind_addr.port(), 10000);

        let config = load(&[("PORT", "10000"), ("FLAGGED_BIND_ADDR", "127.0.0.1:3000")]).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:3000".parse().unwrap());
    }

    #[test]
    fn test_invalid_values_are_errors() {
        assert!(load(&[("PORT", "eighty")]).is_err());
        assert!(load(&[("FLAGGED_BIND_ADDR", "localhost")]).is_err());
    }

    #[test]
    fn test_origin_list_parsing() {
        let config = load(&[("CORS_ORIGINS", " https://a.example , ,https://b.example ")]).unwrap();
        assert_eq!(
            config.allowed_origins,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );

        assert!(load(&[("CORS_ORIGINS", "*")]).unwrap().allows_any_origin());
    }

    #[test]
    fn test_origin_wildcard_matching() {
        assert!(origin_matches("https://*.github.io", "https://someone.github.io"));
        assert!(!origin_matches("https://*.github.io", "https://.github.io"));
        assert!(!origin_matches("https://*.github.io", "http://someone.github.io"));
        assert!(origin_matches("http://localhost:8080", "http://localhost:8080"));
        assert!(!origin_matches("http://localhost:8080", "http://localhost:8081"));
    }
}
