use std::fs;

use axum::http::HeaderName;
use serde::Deserialize;

use crate::realip::DEFAULT_MAX_CHAIN_ENTRIES;

const MAX_CHAIN_ENTRIES_LIMIT: usize = 1024;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub proxy: ProxyConfig,
    pub real_ip: RealIpConfig,
}

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let raw = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path, "config not found, using defaults");
                String::new()
            }
            Err(err) => {
                return Err(anyhow::anyhow!("failed to read config {path}: {err}"));
            }
        };
        Self::parse(&raw).map_err(|err| anyhow::anyhow!("failed to load config {path}: {err}"))
    }

    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let mut cfg: Config = if raw.trim().is_empty() {
            Config::default()
        } else {
            toml::from_str(raw)?
        };
        cfg.apply_defaults();
        cfg.validate()?;
        Ok(cfg)
    }

    fn apply_defaults(&mut self) {
        let defaults = Config::default();
        if self.server.listen.trim().is_empty() {
            self.server.listen = defaults.server.listen;
        }
        if self.proxy.target.trim().is_empty() {
            self.proxy.target = defaults.proxy.target;
        }
        let real_ip = &mut self.real_ip;
        if real_ip.forwarded_for_header.trim().is_empty() {
            real_ip.forwarded_for_header = defaults.real_ip.forwarded_for_header;
        }
        if real_ip.connecting_ip_header.trim().is_empty() {
            real_ip.connecting_ip_header = defaults.real_ip.connecting_ip_header;
        }
        if real_ip.real_ip_header.trim().is_empty() {
            real_ip.real_ip_header = defaults.real_ip.real_ip_header;
        }
        if real_ip.max_chain_entries == 0 {
            real_ip.max_chain_entries = defaults.real_ip.max_chain_entries;
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        let real_ip = &self.real_ip;
        for (key, value) in [
            ("real_ip.forwarded_for_header", &real_ip.forwarded_for_header),
            ("real_ip.connecting_ip_header", &real_ip.connecting_ip_header),
            ("real_ip.real_ip_header", &real_ip.real_ip_header),
        ] {
            if HeaderName::from_bytes(value.trim().as_bytes()).is_err() {
                anyhow::bail!("{key} is not a valid header name: {value}");
            }
        }
        if real_ip.max_chain_entries > MAX_CHAIN_ENTRIES_LIMIT {
            anyhow::bail!("real_ip.max_chain_entries must be within 1..={MAX_CHAIN_ENTRIES_LIMIT}");
        }
        Ok(())
    }

    pub fn print_config(&self) {
        tracing::info!("config: {:?}", self);
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    pub target: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            target: "http://127.0.0.1:1234".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RealIpConfig {
    #[serde(alias = "excludednets")]
    pub excluded_nets: Vec<String>,
    pub forwarded_for_header: String,
    pub connecting_ip_header: String,
    pub real_ip_header: String,
    pub max_chain_entries: usize,
}

impl Default for RealIpConfig {
    fn default() -> Self {
        Self {
            excluded_nets: Vec::new(),
            forwarded_for_header: "X-Forwarded-For".to_string(),
            connecting_ip_header: "Cf-Connecting-Ip".to_string(),
            real_ip_header: "X-Real-Ip".to_string(),
            max_chain_entries: DEFAULT_MAX_CHAIN_ENTRIES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let cfg = Config::parse("").unwrap();
        assert_eq!(cfg.server.listen, "0.0.0.0:8080");
        assert_eq!(cfg.proxy.target, "http://127.0.0.1:1234");
        assert!(cfg.real_ip.excluded_nets.is_empty());
        assert_eq!(cfg.real_ip.forwarded_for_header, "X-Forwarded-For");
        assert_eq!(cfg.real_ip.connecting_ip_header, "Cf-Connecting-Ip");
        assert_eq!(cfg.real_ip.real_ip_header, "X-Real-Ip");
        assert_eq!(cfg.real_ip.max_chain_entries, DEFAULT_MAX_CHAIN_ENTRIES);
    }

    #[test]
    fn parses_real_ip_table() {
        let raw = r#"
            [server]
            listen = "127.0.0.1:9000"

            [real_ip]
            excluded_nets = ["10.0.0.0/8", "::1/128"]
            connecting_ip_header = "True-Client-Ip"
            max_chain_entries = 16
        "#;
        let cfg = Config::parse(raw).unwrap();
        assert_eq!(cfg.server.listen, "127.0.0.1:9000");
        assert_eq!(cfg.real_ip.excluded_nets, vec!["10.0.0.0/8", "::1/128"]);
        assert_eq!(cfg.real_ip.connecting_ip_header, "True-Client-Ip");
        assert_eq!(cfg.real_ip.real_ip_header, "X-Real-Ip");
        assert_eq!(cfg.real_ip.max_chain_entries, 16);
    }

    #[test]
    fn accepts_lowercase_excludednets_key() {
        let raw = r#"
            [real_ip]
            excludednets = ["127.0.0.1/24"]
        "#;
        let cfg = Config::parse(raw).unwrap();
        assert_eq!(cfg.real_ip.excluded_nets, vec!["127.0.0.1/24"]);
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let raw = r#"
            [server]
            listen = " "

            [real_ip]
            real_ip_header = ""
            max_chain_entries = 0
        "#;
        let cfg = Config::parse(raw).unwrap();
        assert_eq!(cfg.server.listen, "0.0.0.0:8080");
        assert_eq!(cfg.real_ip.real_ip_header, "X-Real-Ip");
        assert_eq!(cfg.real_ip.max_chain_entries, DEFAULT_MAX_CHAIN_ENTRIES);
    }

    #[test]
    fn rejects_invalid_header_name() {
        let raw = r#"
            [real_ip]
            forwarded_for_header = "X Forwarded For"
        "#;
        let err = Config::parse(raw).unwrap_err();
        assert!(err.to_string().contains("real_ip.forwarded_for_header"));
    }

    #[test]
    fn rejects_oversized_chain_limit() {
        let raw = r#"
            [real_ip]
            max_chain_entries = 100000
        "#;
        assert!(Config::parse(raw).is_err());
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(Config::parse("[real_ip\nexcluded_nets = 3").is_err());
    }

    #[test]
    fn missing_file_uses_defaults() {
        let cfg = Config::load("/nonexistent/realip-gate.toml").unwrap();
        assert_eq!(cfg.server.listen, "0.0.0.0:8080");
    }
}
