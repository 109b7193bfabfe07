use std::io::ErrorKind;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8080,
            worker_threads: Some(4),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
    /// Run pending migrations when the server starts.
    #[serde(default = "default_true")]
    pub auto_migrate: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            max_lifetime_secs: default_max_lifetime(),
            acquire_timeout_secs: default_acquire_timeout(),
            sqlx_logging: false,
            auto_migrate: true,
        }
    }
}

/// Knobs for the in-process metric histories, the periodic incident scan and
/// the system metric collector.
#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    #[serde(default = "default_scan_interval")]
    pub scan_interval_secs: u64,
    #[serde(default = "default_anomaly_capacity")]
    pub anomaly_history_capacity: usize,
    #[serde(default = "default_anomaly_warmup")]
    pub anomaly_warmup: usize,
    #[serde(default = "default_incident_capacity")]
    pub incident_history_capacity: usize,
    /// Distinct metric names kept per analyzer; the stalest is dropped past it.
    #[serde(default = "default_max_metrics")]
    pub max_metrics: usize,
    /// Sample process and host metrics into the analyzers.
    #[serde(default = "default_true")]
    pub collect_system_metrics: bool,
    #[serde(default = "default_collect_interval")]
    pub collect_interval_secs: u64,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            scan_interval_secs: default_scan_interval(),
            anomaly_history_capacity: default_anomaly_capacity(),
            anomaly_warmup: default_anomaly_warmup(),
            incident_history_capacity: default_incident_capacity(),
            max_metrics: default_max_metrics(),
            collect_system_metrics: true,
            collect_interval_secs: default_collect_interval(),
        }
    }
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    2
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_idle_timeout() -> u64 {
    600
}

fn default_max_lifetime() -> u64 {
    3600
}

fn default_acquire_timeout() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_scan_interval() -> u64 {
    60
}

fn default_anomaly_capacity() -> usize {
    1000
}

fn default_anomaly_warmup() -> usize {
    30
}

fn default_incident_capacity() -> usize {
    100
}

fn default_max_metrics() -> usize {
    256
}

fn default_collect_interval() -> u64 {
    60
}

/// `CONFIG_PATH`, or `config.toml` in the working directory.
pub fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

/// Parse `path`, or return defaults when it does not exist. Unreadable or
/// malformed files are errors.
pub fn load_file_or_default(path: &str) -> Result<AppConfig> {
    match std::fs::read_to_string(path) {
        Ok(content) => load_from_str(&content).with_context(|| format!("invalid config file {path}")),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(e) => Err(anyhow::Error::new(e).context(format!("cannot read config file {path}"))),
    }
}

pub fn load_from_str(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load [`config_path`] (defaults when the file is absent), apply the
    /// `SERVER_HOST`, `SERVER_PORT` and `DATABASE_URL` fallbacks, validate.
    pub fn load_or_env() -> Result<Self> {
        Self::load_or_env_from(&config_path())
    }

    pub fn load_or_env_from(path: &str) -> Result<Self> {
        let mut cfg = load_file_or_default(path)?;
        if let Ok(host) = std::env::var("SERVER_HOST") {
            cfg.server.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            cfg.server.port = port;
        }
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.database.normalize_from_env();
        self.database.validate()?;
        self.monitoring.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }
}

impl DatabaseConfig {
    /// Config for a given URL with every other field at its default.
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn normalize_from_env(&mut self) {
        // Fall back to DATABASE_URL when the TOML leaves the URL out
        if self.url.trim().is_empty() {
            if let Ok(url) = std::env::var("DATABASE_URL") {
                self.url = url;
            }
        }
    }

    pub fn is_sqlite(&self) -> bool {
        self.url.to_lowercase().starts_with("sqlite:")
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!("database.url is empty; set it in config.toml or DATABASE_URL"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://") || self.is_sqlite()) {
            return Err(anyhow!("database.url must start with postgres://, postgresql:// or sqlite:"));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections must be >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections must be >= min_connections"));
        }
        if self.connect_timeout_secs == 0 || self.acquire_timeout_secs == 0 {
            return Err(anyhow!("database timeouts must be positive seconds"));
        }
        Ok(())
    }
}

impl MonitoringConfig {
    pub fn validate(&self) -> Result<()> {
        if self.scan_interval_secs == 0 || self.collect_interval_secs == 0 {
            return Err(anyhow!("monitoring intervals must be >= 1 second"));
        }
        if self.anomaly_history_capacity == 0 || self.incident_history_capacity == 0 {
            return Err(anyhow!("monitoring history capacities must be >= 1"));
        }
        if self.anomaly_history_capacity < self.anomaly_warmup {
            return Err(anyhow!(
                "monitoring.anomaly_history_capacity ({}) must be >= anomaly_warmup ({})",
                self.anomaly_history_capacity,
                self.anomaly_warmup
            ));
        }
        if self.max_metrics == 0 {
            return Err(anyhow!("monitoring.max_metrics must be >= 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_config(tag: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("taskdesk_cfg_{}_{tag}.toml", std::process::id()));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn parses_full_config() {
        let cfg = load_from_str(
            r#"
            [server]
            host = "0.0.0.0"
            port = 9000
            worker_threads = 2

            [database]
            url = "postgres://u:p@localhost:5432/tasks"
            max_connections = 5
            min_connections = 1
            auto_migrate = false

            [monitoring]
            scan_interval_secs = 15
            max_metrics = 32
            collect_system_metrics = false
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.server.worker_threads, Some(2));
        assert_eq!(cfg.database.max_connections, 5);
        assert!(!cfg.database.auto_migrate);
        assert_eq!(cfg.monitoring.scan_interval_secs, 15);
        assert_eq!(cfg.monitoring.anomaly_history_capacity, 1000);
        assert_eq!(cfg.monitoring.max_metrics, 32);
        assert!(!cfg.monitoring.collect_system_metrics);
        assert_eq!(cfg.monitoring.collect_interval_secs, 60);
    }

    #[test]
    fn empty_file_uses_defaults() {
        let cfg = load_from_str("").unwrap();
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.port, 8080);
        assert!(cfg.database.auto_migrate);
        assert_eq!(cfg.monitoring.anomaly_warmup, 30);
        assert_eq!(cfg.monitoring.incident_history_capacity, 100);
        assert_eq!(cfg.monitoring.max_metrics, 256);
        assert!(cfg.monitoring.collect_system_metrics);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join(format!("taskdesk_cfg_{}_absent.toml", std::process::id()));
        let cfg = load_file_or_default(&path.to_string_lossy()).unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert!(cfg.database.url.is_empty());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let path = temp_config(
            "broken",
            r#"
            [server]
            host = "0.0.0.0"
            port = "not-a-number"

            [database]
            url = "postgres://prod/db"
            "#,
        );
        let res = load_file_or_default(&path.to_string_lossy());
        let _ = std::fs::remove_file(&path);
        assert!(res.is_err());
    }

    #[test]
    fn load_or_env_reports_broken_file() {
        let path = temp_config("broken_env", "[server\nport = 1");
        let res = AppConfig::load_or_env_from(&path.to_string_lossy());
        let _ = std::fs::remove_file(&path);
        let err = res.unwrap_err();
        assert!(err.to_string().contains("invalid config file"));
    }

    #[test]
    fn load_or_env_keeps_file_database_url() {
        let path = temp_config(
            "valid",
            r#"
            [database]
            url = "sqlite://tmp/from_file.db?mode=rwc"
            "#,
        );
        let res = AppConfig::load_or_env_from(&path.to_string_lossy());
        let _ = std::fs::remove_file(&path);
        assert_eq!(res.unwrap().database.url, "sqlite://tmp/from_file.db?mode=rwc");
    }

    #[test]
    fn server_normalize_fills_workers_and_host() {
        let mut s = ServerConfig {
            host: " ".into(),
            port: 80,
            worker_threads: Some(0),
        };
        s.normalize().unwrap();
        assert_eq!(s.host, "127.0.0.1");
        assert_eq!(s.worker_threads, Some(4));

        let mut zero = ServerConfig {
            port: 0,
            ..ServerConfig::default()
        };
        assert!(zero.normalize().is_err());
    }

    #[test]
    fn database_url_schemes() {
        assert!(DatabaseConfig::with_url("postgres://localhost/db").validate().is_ok());
        assert!(DatabaseConfig::with_url("sqlite://tmp/tasks.db?mode=rwc").validate().is_ok());
        assert!(DatabaseConfig::with_url("mysql://localhost/db").validate().is_err());
        assert!(DatabaseConfig::with_url("").validate().is_err());
    }

    #[test]
    fn database_pool_bounds() {
        let mut cfg = DatabaseConfig::with_url("postgres://localhost/db");
        cfg.min_connections = 4;
        cfg.max_connections = 2;
        assert!(cfg.validate().is_err());
        cfg.min_connections = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn monitoring_rejects_zero_interval() {
        let cfg = MonitoringConfig {
            scan_interval_secs: 0,
            ..MonitoringConfig::default()
        };
        assert!(cfg.validate().is_err());
        let cfg = MonitoringConfig {
            collect_interval_secs: 0,
            ..MonitoringConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn monitoring_rejects_capacity_below_warmup() {
        let cfg = MonitoringConfig {
            anomaly_history_capacity: 20,
            anomaly_warmup: 30,
            ..MonitoringConfig::default()
        };
        assert!(cfg.validate().is_err());
        let cfg = MonitoringConfig {
            anomaly_history_capacity: 30,
            anomaly_warmup: 30,
            ..MonitoringConfig::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn monitoring_rejects_zero_max_metrics() {
        let cfg = MonitoringConfig {
            max_metrics: 0,
            ..MonitoringConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
