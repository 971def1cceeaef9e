//! Configuration file handling.
//!
//! Settings come from built-in defaults, then the TOML config file, then
//! `JARVIS_BRIDGE__*` environment variables (`__` separates sections, e.g.
//! `JARVIS_BRIDGE__SERVER__PORT=5050`).

use std::env;
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

pub const APP_NAME: &str = "jarvis-bridge";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub print: PrintConfig,
    pub notifications: NotificationsConfig,
    pub power: PowerConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Host name or IP put into the advertised mobile URL. Detected from the
    /// outbound network route when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advertise_host: Option<String>,
    /// Answer cross-origin requests from any origin.
    pub cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            advertise_host: None,
            cors: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrintConfig {
    /// File printed when a request names none.
    pub default_path: String,
}

impl Default for PrintConfig {
    fn default() -> Self {
        Self {
            default_path: "test.txt".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationsConfig {
    /// Title used when a notification is posted without one.
    pub default_title: String,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            default_title: "Jarvis".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerConfig {
    /// Seconds between a shutdown request and the shutdown, where the
    /// platform's shutdown command supports a delay.
    pub delay_secs: u32,
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self { delay_secs: 5 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Base URL of a bridge running with this configuration, as seen from
    /// the same machine.
    pub fn local_base_url(&self) -> String {
        let host = self.server.host.trim();
        match host.parse::<IpAddr>() {
            Ok(ip) if ip.is_unspecified() => format!("http://127.0.0.1:{}", self.server.port),
            Ok(ip) => format!("http://{}", SocketAddr::new(ip, self.server.port)),
            Err(_) if host.is_empty() => format!("http://127.0.0.1:{}", self.server.port),
            Err(_) => format!("http://{}:{}", host, self.server.port),
        }
    }

    /// Socket address the server binds to. `server.host` must be an IPv4 or
    /// IPv6 literal.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .server
            .host
            .trim()
            .parse()
            .with_context(|| format!("invalid bind address '{}'", self.server.host))?;
        Ok(SocketAddr::new(ip, self.server.port))
    }
}

/// Load the configuration, layering the file at `path` (if present) and the
/// environment over the defaults.
pub fn load(path: &Path) -> Result<AppConfig> {
    let built = Config::builder()
        .add_source(
            File::from(path)
                .format(FileFormat::Toml)
                .required(false),
        )
        .add_source(
            Environment::with_prefix(&env_prefix())
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .with_context(|| format!("reading config {}", path.display()))?;

    built
        .try_deserialize()
        .with_context(|| format!("parsing config {}", path.display()))
}

/// Write the default configuration to `path`, creating parent directories.
pub fn write_default(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating config directory {}", parent.display()))?;
    }

    let toml = toml::to_string_pretty(&AppConfig::default())
        .context("serializing default config to TOML")?;
    let body = format!(
        "# Configuration for {APP_NAME}\n# File: {}\n\n{toml}",
        path.display()
    );
    fs::write(path, body).with_context(|| format!("writing config file to {}", path.display()))
}

/// Resolve the config file path from an optional override.
///
/// A directory override means `<dir>/config.toml`. Paths are shell-expanded.
pub fn resolve_path(override_path: Option<&Path>) -> Result<PathBuf> {
    match override_path {
        Some(path) => {
            let expanded = expand_path(path)?;
            if expanded.is_dir() {
                Ok(expanded.join("config.toml"))
            } else {
                Ok(expanded)
            }
        }
        None => Ok(default_config_dir()?.join("config.toml")),
    }
}

fn expand_path(path: &Path) -> Result<PathBuf> {
    match path.to_str() {
        Some(text) => {
            let expanded = shellexpand::full(text).context("expanding path")?;
            Ok(PathBuf::from(expanded.to_string()))
        }
        None => Ok(path.to_path_buf()),
    }
}

fn default_config_dir() -> Result<PathBuf> {
    if let Some(dir) = env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir).join(APP_NAME));
    }

    if let Some(dir) = dirs::config_dir() {
        return Ok(dir.join(APP_NAME));
    }

    dirs::home_dir()
        .map(|home| home.join(".config").join(APP_NAME))
        .ok_or_else(|| anyhow!("unable to determine configuration directory"))
}

fn env_prefix() -> String {
    APP_NAME
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_prefix() {
        assert_eq!(env_prefix(), "JARVIS_BRIDGE");
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5000);
        assert!(config.server.cors);
        assert_eq!(config.print.default_path, "test.txt");
        assert_eq!(config.notifications.default_title, "Jarvis");
        assert_eq!(config.power.delay_secs, 5);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[server]\nport = 5050\nadvertise_host = \"desk.lan\"\n\n[print]\ndefault_path = \"todo.txt\"\n",
        )
        .unwrap();

        let config = load(&path).unwrap();
        assert_eq!(config.server.port, 5050);
        assert_eq!(config.server.advertise_host.as_deref(), Some("desk.lan"));
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.print.default_path, "todo.txt");
        assert_eq!(config.notifications.default_title, "Jarvis");
    }

    #[test]
    fn test_default_file_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        write_default(&path).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("# Configuration for jarvis-bridge"));

        let config = load(&path).unwrap();
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn test_resolve_directory_override() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = resolve_path(Some(dir.path())).unwrap();
        assert_eq!(resolved, dir.path().join("config.toml"));
    }

    #[test]
    fn test_local_base_url() {
        let mut config = AppConfig::default();
        assert_eq!(config.local_base_url(), "http://127.0.0.1:5000");
        config.server.host = "192.168.0.4".to_string();
        config.server.port = 8000;
        assert_eq!(config.local_base_url(), "http://192.168.0.4:8000");
    }

    #[test]
    fn test_ipv6_hosts_are_bracketed() {
        let mut config = AppConfig::default();
        config.server.host = "::1".to_string();
        assert_eq!(config.local_base_url(), "http://[::1]:5000");
        assert_eq!(config.bind_addr().unwrap().to_string(), "[::1]:5000");

        config.server.host = "::".to_string();
        assert_eq!(config.local_base_url(), "http://127.0.0.1:5000");
        assert_eq!(config.bind_addr().unwrap().to_string(), "[::]:5000");
    }

    #[test]
    fn test_bind_addr() {
        let config = AppConfig::default();
        assert_eq!(config.bind_addr().unwrap().to_string(), "0.0.0.0:5000");

        let mut config = AppConfig::default();
        config.server.host = "not an address".to_string();
        assert!(config.bind_addr().is_err());
    }
}
