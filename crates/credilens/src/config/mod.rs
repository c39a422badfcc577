use std::env;
use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_STORAGE_DIR: &str = "data";
pub const DEFAULT_VIEWER_ROUTE: &str = "/viewer";

/// Distinguishes runtime behavior for different stages of a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the analysis tooling.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub storage: StorageConfig,
    pub analysis: AnalysisConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("CREDILENS_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let root = env::var("CREDILENS_STORAGE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_STORAGE_DIR));
        if root.as_os_str().is_empty() {
            return Err(ConfigError::EmptyStorageDir);
        }

        let viewer_route =
            env::var("CREDILENS_VIEWER_ROUTE").unwrap_or_else(|_| DEFAULT_VIEWER_ROUTE.to_string());
        if !viewer_route.starts_with('/') {
            return Err(ConfigError::InvalidViewerRoute {
                value: viewer_route,
            });
        }

        let log_level = env::var("CREDILENS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            storage: StorageConfig { root },
            analysis: AnalysisConfig {
                scoring_config: optional_path("CREDILENS_SCORING_CONFIG"),
                ratio_table: optional_path("CREDILENS_RATIO_TABLE"),
                viewer_route,
            },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

fn optional_path(key: &str) -> Option<PathBuf> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Where derived artifacts are written.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub root: PathBuf,
}

impl StorageConfig {
    pub fn outputs_dir(&self) -> PathBuf {
        self.root.join("outputs")
    }
}

/// Overrides for the ratio table and scoring configuration. `None` selects
/// the versions shipped with the crate.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub scoring_config: Option<PathBuf>,
    pub ratio_table: Option<PathBuf>,
    pub viewer_route: String,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    EmptyStorageDir,
    InvalidViewerRoute { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyStorageDir => {
                write!(f, "CREDILENS_STORAGE_DIR must not be empty")
            }
            ConfigError::InvalidViewerRoute { value } => write!(
                f,
                "CREDILENS_VIEWER_ROUTE must start with '/', found '{}'",
                value
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("CREDILENS_ENV");
        env::remove_var("CREDILENS_LOG_LEVEL");
        env::remove_var("CREDILENS_STORAGE_DIR");
        env::remove_var("CREDILENS_SCORING_CONFIG");
        env::remove_var("CREDILENS_RATIO_TABLE");
        env::remove_var("CREDILENS_VIEWER_ROUTE");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.storage.root, PathBuf::from("data"));
        assert_eq!(config.storage.outputs_dir(), PathBuf::from("data/outputs"));
        assert_eq!(config.analysis.viewer_route, "/viewer");
        assert!(config.analysis.scoring_config.is_none());
        assert!(config.analysis.ratio_table.is_none());
        assert_eq!(config.telemetry.log_level, "info");
    }

    #[test]
    fn reads_overrides_from_env() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("CREDILENS_ENV", "CI");
        env::set_var("CREDILENS_STORAGE_DIR", "/tmp/credilens");
        env::set_var("CREDILENS_SCORING_CONFIG", "config/custom.yaml");
        env::set_var("CREDILENS_RATIO_TABLE", "  ");
        env::set_var("CREDILENS_VIEWER_ROUTE", "/docs/view");

        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.environment, AppEnvironment::Test);
        assert_eq!(config.storage.root, PathBuf::from("/tmp/credilens"));
        assert_eq!(
            config.analysis.scoring_config,
            Some(PathBuf::from("config/custom.yaml"))
        );
        assert!(config.analysis.ratio_table.is_none());
        assert_eq!(config.analysis.viewer_route, "/docs/view");
        reset_env();
    }

    #[test]
    fn rejects_relative_viewer_route() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("CREDILENS_VIEWER_ROUTE", "viewer");

        match AppConfig::load() {
            Err(ConfigError::InvalidViewerRoute { value }) => assert_eq!(value, "viewer"),
            other => panic!("expected invalid viewer route, got {other:?}"),
        }
        reset_env();
    }
}
