// config.rs — server configuration (spec §6 "CLI")
//
// The teacher configures itself through a live cvar console
// (myq2-common/src/cvar.rs); this server has no console to attach to, so
// configuration is a single TOML file read at startup, in the style
// `nethercore-systems-nethercore` (and `project-flowstate-flowstate`) use
// `serde`/`toml`/`clap` for their own config and CLI surfaces.

use std::path::PathBuf;

use clap::Parser;
use serde::Deserialize;

#[derive(Debug, Parser)]
#[command(name = "bancho-server", about = "Realtime game-chat and multiplayer coordination server")]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "bancho.toml")]
    pub config: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// TCP ports to listen on.
    pub ports: Vec<u16>,
    /// Domain name advertised in switch-server / invite packets.
    pub domain: String,
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub maintenance: bool,
    /// Whether the server treats all logins as supporter (dev/local use).
    #[serde(default)]
    pub free_supporter: bool,
    /// Menu icon as `image_url|click_url`.
    #[serde(default)]
    pub menu_icon: Option<String>,
    #[serde(default)]
    pub autojoin_channels: Vec<String>,
    /// Oldest client cohort accepted; logins below this are rejected.
    pub min_client_version: i32,
    /// Newest client cohort accepted; logins above this are rejected.
    pub max_client_version: i32,
    /// Static body returned for the HTTP health probe (spec §6).
    #[serde(default = "default_probe_body")]
    pub http_probe_body: String,
}

fn default_probe_body() -> String {
    "<html><body>bancho-server is up</body></html>".to_string()
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ServerConfig {
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn version_in_range(&self, requested: i32) -> bool {
        requested >= self.min_client_version && requested <= self.max_client_version
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_config() {
        let toml = r#"
            ports = [13381]
            domain = "bancho.local"
            min_client_version = 323
            max_client_version = 20130815
        "#;
        let cfg: ServerConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.ports, vec![13381]);
        assert!(!cfg.debug);
        assert!(cfg.version_in_range(1700));
        assert!(!cfg.version_in_range(100));
    }
}
