//! Echo proxy configuration.
//!
//! # Design
//! The file is plain JSON and every section is optional, so `{}` is a valid
//! config that listens on `127.0.0.1:8080` and blocks nothing. Redirect keys
//! are lowercased while parsing; two keys that differ only by case are an
//! error.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde::{de, Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Captures kept in memory when the config does not say otherwise.
pub const MAX_CAPTURED: usize = 1000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub proxy: Listen,
    pub block: Block,
    /// Lowercased destination host -> replacement host.
    #[serde(deserialize_with = "lowercase_keys")]
    pub redirect: HashMap<String, String>,
    /// Most recent requests kept for `/__captured`; older ones are dropped.
    pub capture_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            proxy: Listen::default(),
            block: Block::default(),
            redirect: HashMap::new(),
            capture_limit: MAX_CAPTURED,
        }
    }
}

fn lowercase_keys<'de, D>(deserializer: D) -> Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, String>::deserialize(deserializer)?;
    let mut rules = HashMap::with_capacity(raw.len());
    for (from, to) in raw {
        let key = from.to_ascii_lowercase();
        if rules.insert(key, to).is_some() {
            return Err(de::Error::custom(format!(
                "redirect for {from:?} is defined more than once"
            )));
        }
    }
    Ok(rules)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Listen {
    pub lhost: String,
    pub lport: u16,
}

impl Default for Listen {
    fn default() -> Self {
        Self {
            lhost: "127.0.0.1".to_string(),
            lport: 8080,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Block {
    /// Client address prefixes, matched against `ip:port`.
    pub hosts: Vec<String>,
    /// Destination hosts, matched exactly (case-insensitive).
    pub sites: Vec<String>,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.proxy.lhost, self.proxy.lport)
    }

    pub fn is_client_blocked(&self, client: &str) -> bool {
        self.block.hosts.iter().any(|prefix| client.starts_with(prefix.as_str()))
    }

    pub fn is_site_blocked(&self, host: &str) -> bool {
        self.block.sites.iter().any(|site| site.eq_ignore_ascii_case(host))
    }

    pub fn redirect_for(&self, host: &str) -> Option<&str> {
        self.redirect
            .get(&host.to_ascii_lowercase())
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_uses_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.listen_addr(), "127.0.0.1:8080");
    }

    #[test]
    fn parses_every_section() {
        let config: Config = serde_json::from_str(
            r#"{
                "proxy": {"lhost": "0.0.0.0", "lport": 3128},
                "block": {"hosts": ["10.0."], "sites": ["ads.example.com"]},
                "redirect": {"old.example.com": "new.example.com"}
            }"#,
        )
        .unwrap();
        assert_eq!(config.listen_addr(), "0.0.0.0:3128");
        assert!(config.is_client_blocked("10.0.3.4:5555"));
        assert!(!config.is_client_blocked("127.0.0.1:5555"));
        assert!(config.is_site_blocked("ADS.example.com"));
        assert!(!config.is_site_blocked("example.com"));
        assert_eq!(config.redirect_for("old.example.com"), Some("new.example.com"));
        assert_eq!(config.redirect_for("other.example.com"), None);
    }

    #[test]
    fn partial_listen_section_keeps_other_default() {
        let config: Config = serde_json::from_str(r#"{"proxy": {"lport": 9000}}"#).unwrap();
        assert_eq!(config.listen_addr(), "127.0.0.1:9000");
    }

    #[test]
    fn redirect_keys_are_case_insensitive() {
        let config: Config =
            serde_json::from_str(r#"{"redirect": {"Old.Example.COM": "new.example.com"}}"#).unwrap();
        assert_eq!(config.redirect_for("old.example.com"), Some("new.example.com"));
        assert_eq!(config.redirect_for("OLD.example.com"), Some("new.example.com"));
    }

    #[test]
    fn redirect_keys_differing_only_by_case_are_rejected() {
        let result: Result<Config, _> = serde_json::from_str(
            r#"{"redirect": {"a.example.com": "one", "A.example.com": "two"}}"#,
        );
        let err = result.unwrap_err().to_string();
        assert!(err.contains("defined more than once"), "{err}");
    }

    #[test]
    fn capture_limit_defaults_and_overrides() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.capture_limit, MAX_CAPTURED);
        let config: Config = serde_json::from_str(r#"{"capture_limit": 5}"#).unwrap();
        assert_eq!(config.capture_limit, 5);
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Config::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
