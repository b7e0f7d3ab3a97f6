use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Maximum file size for uploads (in bytes)
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: u64,

    /// Open the landing page in a browser once the server is listening
    #[serde(default = "default_open_browser")]
    pub open_browser: bool,

    /// Delay before the browser is opened (in milliseconds)
    #[serde(default = "default_browser_delay_ms")]
    pub browser_delay_ms: u64,

    /// Directory for the log file (defaults to the working directory)
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_max_upload_size() -> u64 {
    100 * 1024 * 1024 // 100 MB
}

fn default_open_browser() -> bool {
    true
}

fn default_browser_delay_ms() -> u64 {
    1250
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_upload_size: default_max_upload_size(),
            open_browser: default_open_browser(),
            browser_delay_ms: default_browser_delay_ms(),
            log_dir: None,
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        Ok(config)
    }

    pub fn browser_delay(&self) -> Duration {
        Duration::from_millis(self.browser_delay_ms)
    }

    /// Log file for a server bound to `ip:port`, e.g. `server_127.0.0.1_8085.log`.
    pub fn log_file(&self, ip: IpAddr, port: u16) -> PathBuf {
        let name = format!("server_{}_{}.log", ip, port);
        match &self.log_dir {
            Some(dir) => dir.join(name),
            None => PathBuf::from(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.max_upload_size, 100 * 1024 * 1024);
        assert!(config.open_browser);
        assert_eq!(config.browser_delay(), Duration::from_millis(1250));
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn test_from_file_partial() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("dirshare.toml");
        std::fs::write(&path, "max_upload_size = 1024\nopen_browser = false\n").unwrap();

        let config = Config::from_file(&path).unwrap();

        assert_eq!(config.max_upload_size, 1024);
        assert!(!config.open_browser);
        assert_eq!(config.browser_delay_ms, 1250);
    }

    #[test]
    fn test_from_file_invalid() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("dirshare.toml");
        std::fs::write(&path, "max_upload_size = \"lots\"\n").unwrap();

        assert!(Config::from_file(&path).is_err());
    }

    #[test]
    fn test_log_file_name() {
        let ip: IpAddr = "127.0.0.1".parse().unwrap();
        let config = Config::default();
        assert_eq!(
            config.log_file(ip, 8085),
            PathBuf::from("server_127.0.0.1_8085.log")
        );

        let config = Config {
            log_dir: Some(PathBuf::from("/var/log/dirshare")),
            ..Config::default()
        };
        assert_eq!(
            config.log_file(ip, 9000),
            PathBuf::from("/var/log/dirshare/server_127.0.0.1_9000.log")
        );
    }
}
