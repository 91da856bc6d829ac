use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub airtable: AirtableConfig,
    pub widget: WidgetConfig,
    pub logging: LoggingConfig,
}

/// Backend connection settings. Credential and table identifiers are
/// optional on purpose: their absence must degrade lookups to typed
/// per-request failures, never fail startup.
#[derive(Clone, Debug)]
pub struct AirtableConfig {
    pub api_key: Option<SecretString>,
    pub base_id: Option<String>,
    pub quotations_table: Option<String>,
    pub clients_table: Option<String>,
    pub advisors_table: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
    pub retry_delay_ms: u64,
}

#[derive(Clone, Debug)]
pub struct WidgetConfig {
    /// Serves canned reference data instead of the live backend. Always
    /// set explicitly (config, env or host call), never inferred from the
    /// runtime environment.
    pub mock_mode: bool,
    pub default_container_id: String,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

/// The three backend tables the widget touches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AirtableTable {
    Quotations,
    Clients,
    Advisors,
}

impl AirtableTable {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quotations => "quotations",
            Self::Clients => "clients",
            Self::Advisors => "advisors",
        }
    }
}

/// A lookup or write could not even be attempted because the backend
/// configuration is incomplete.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("missing backend configuration: {0}")]
pub struct MissingBackendConfig(pub String);

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub api_key: Option<String>,
    pub base_id: Option<String>,
    pub quotations_table: Option<String>,
    pub clients_table: Option<String>,
    pub advisors_table: Option<String>,
    pub mock_mode: Option<bool>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            airtable: AirtableConfig {
                api_key: None,
                base_id: None,
                quotations_table: None,
                clients_table: None,
                advisors_table: None,
                base_url: "https://api.airtable.com/v0".to_string(),
                timeout_secs: 10,
                retry_delay_ms: 1_000,
            },
            widget: WidgetConfig {
                mock_mode: false,
                default_container_id: "cotizacion-root".to_string(),
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AirtableConfig {
    /// Resolves the base URL for one table, or names the first missing
    /// piece of configuration.
    pub fn table_url(&self, table: AirtableTable) -> Result<String, MissingBackendConfig> {
        let base_id = self
            .base_id
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| MissingBackendConfig("base id".to_string()))?;

        let table_id = match table {
            AirtableTable::Quotations => self.quotations_table.as_deref(),
            AirtableTable::Clients => self.clients_table.as_deref(),
            AirtableTable::Advisors => self.advisors_table.as_deref(),
        }
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| {
            MissingBackendConfig(format!("{} table id", table.as_str()))
        })?;

        Ok(format!("{}/{}/{}", self.base_url.trim_end_matches('/'), base_id, table_id))
    }

    pub fn api_key(&self) -> Result<&SecretString, MissingBackendConfig> {
        self.api_key.as_ref().ok_or_else(|| MissingBackendConfig("api key".to_string()))
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from("cotizador.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(airtable) = patch.airtable {
            if let Some(api_key_value) = airtable.api_key {
                self.airtable.api_key = Some(api_key_value.into());
            }
            if let Some(base_id) = airtable.base_id {
                self.airtable.base_id = Some(base_id);
            }
            if let Some(quotations_table) = airtable.quotations_table {
                self.airtable.quotations_table = Some(quotations_table);
            }
            if let Some(clients_table) = airtable.clients_table {
                self.airtable.clients_table = Some(clients_table);
            }
            if let Some(advisors_table) = airtable.advisors_table {
                self.airtable.advisors_table = Some(advisors_table);
            }
            if let Some(base_url) = airtable.base_url {
                self.airtable.base_url = base_url;
            }
            if let Some(timeout_secs) = airtable.timeout_secs {
                self.airtable.timeout_secs = timeout_secs;
            }
            if let Some(retry_delay_ms) = airtable.retry_delay_ms {
                self.airtable.retry_delay_ms = retry_delay_ms;
            }
        }

        if let Some(widget) = patch.widget {
            if let Some(mock_mode) = widget.mock_mode {
                self.widget.mock_mode = mock_mode;
            }
            if let Some(default_container_id) = widget.default_container_id {
                self.widget.default_container_id = default_container_id;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("COTIZADOR_AIRTABLE_API_KEY") {
            self.airtable.api_key = Some(value.into());
        }
        if let Some(value) = read_env("COTIZADOR_AIRTABLE_BASE_ID") {
            self.airtable.base_id = Some(value);
        }
        if let Some(value) = read_env("COTIZADOR_AIRTABLE_QUOTATIONS_TABLE") {
            self.airtable.quotations_table = Some(value);
        }
        if let Some(value) = read_env("COTIZADOR_AIRTABLE_CLIENTS_TABLE") {
            self.airtable.clients_table = Some(value);
        }
        if let Some(value) = read_env("COTIZADOR_AIRTABLE_ADVISORS_TABLE") {
            self.airtable.advisors_table = Some(value);
        }
        if let Some(value) = read_env("COTIZADOR_AIRTABLE_BASE_URL") {
            self.airtable.base_url = value;
        }
        if let Some(value) = read_env("COTIZADOR_AIRTABLE_TIMEOUT_SECS") {
            self.airtable.timeout_secs = parse_u64("COTIZADOR_AIRTABLE_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("COTIZADOR_AIRTABLE_RETRY_DELAY_MS") {
            self.airtable.retry_delay_ms = parse_u64("COTIZADOR_AIRTABLE_RETRY_DELAY_MS", &value)?;
        }

        if let Some(value) = read_env("COTIZADOR_WIDGET_MOCK_MODE") {
            self.widget.mock_mode = parse_bool("COTIZADOR_WIDGET_MOCK_MODE", &value)?;
        }

        if let Some(value) = read_env("COTIZADOR_LOGGING_LEVEL") {
            self.logging.level = value;
        }
        if let Some(value) = read_env("COTIZADOR_LOGGING_FORMAT") {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(api_key_value) = overrides.api_key {
            self.airtable.api_key = Some(api_key_value.into());
        }
        if let Some(base_id) = overrides.base_id {
            self.airtable.base_id = Some(base_id);
        }
        if let Some(quotations_table) = overrides.quotations_table {
            self.airtable.quotations_table = Some(quotations_table);
        }
        if let Some(clients_table) = overrides.clients_table {
            self.airtable.clients_table = Some(clients_table);
        }
        if let Some(advisors_table) = overrides.advisors_table {
            self.airtable.advisors_table = Some(advisors_table);
        }
        if let Some(mock_mode) = overrides.mock_mode {
            self.widget.mock_mode = mock_mode;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.airtable.base_url.trim().is_empty() {
            return Err(ConfigError::Validation("airtable base_url must not be empty".into()));
        }
        if self.airtable.timeout_secs == 0 {
            return Err(ConfigError::Validation("airtable timeout_secs must be positive".into()));
        }
        if self.widget.default_container_id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "widget default_container_id must not be empty".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    airtable: Option<AirtablePatch>,
    widget: Option<WidgetPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct AirtablePatch {
    api_key: Option<String>,
    base_id: Option<String>,
    quotations_table: Option<String>,
    clients_table: Option<String>,
    advisors_table: Option<String>,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
    retry_delay_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct WidgetPatch {
    mock_mode: Option<bool>,
    default_container_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

fn resolve_config_path(requested: Option<&Path>) -> Option<PathBuf> {
    match requested {
        Some(path) if path.exists() => Some(path.to_path_buf()),
        Some(_) => None,
        None => {
            let default = PathBuf::from("cotizador.toml");
            default.exists().then_some(default)
        }
    }
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;
    toml::from_str(&raw)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidEnvOverride {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::io::Write;
    use std::sync::{Mutex, OnceLock};

    use super::{AirtableTable, AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    // Tests that read or mutate the process environment serialize on
    // this lock so a leaked COTIZADOR_* variable cannot bleed between
    // them.
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn defaults_have_no_credentials_and_compact_logging() {
        let config = AppConfig::default();
        assert!(config.airtable.api_key.is_none());
        assert_eq!(config.logging.format, LogFormat::Compact);
        assert!(!config.widget.mock_mode);
    }

    #[test]
    fn env_overrides_win_over_the_file_patch() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("COTIZADOR_AIRTABLE_BASE_ID", "appFromEnv");
        env::set_var("COTIZADOR_WIDGET_MOCK_MODE", "true");

        let result = (|| -> Result<(), String> {
            let mut file = tempfile::NamedTempFile::new().map_err(|err| err.to_string())?;
            writeln!(
                file,
                "[airtable]\nbase_id = \"appFromFile\"\n\n[widget]\nmock_mode = false\n"
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(file.path().to_path_buf()),
                require_file: true,
                overrides: ConfigOverrides::default(),
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.airtable.base_id.as_deref() == Some("appFromEnv"),
                "env base id should override the file patch",
            )?;
            ensure(config.widget.mock_mode, "env mock mode should override the file patch")?;
            Ok(())
        })();

        clear_vars(&["COTIZADOR_AIRTABLE_BASE_ID", "COTIZADOR_WIDGET_MOCK_MODE"]);
        result
    }

    #[test]
    fn invalid_numeric_env_override_is_rejected() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("COTIZADOR_AIRTABLE_TIMEOUT_SECS", "pronto");

        let result = (|| -> Result<(), String> {
            let outcome = AppConfig::load(LoadOptions::default());
            ensure(
                matches!(outcome, Err(ConfigError::InvalidEnvOverride { .. })),
                "non-numeric timeout override should be rejected",
            )?;
            Ok(())
        })();

        clear_vars(&["COTIZADOR_AIRTABLE_TIMEOUT_SECS"]);
        result
    }

    #[test]
    fn file_patch_fills_backend_settings() {
        let _guard = env_lock().lock().expect("env lock");
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            "[airtable]\napi_key = \"key\"\nbase_id = \"app123\"\nclients_table = \"tblC\"\n\
             \n[widget]\nmock_mode = true\n"
        )
        .expect("write config");

        let config = AppConfig::load(LoadOptions {
            config_path: Some(file.path().to_path_buf()),
            require_file: true,
            overrides: ConfigOverrides::default(),
        })
        .expect("config should load");

        assert_eq!(config.airtable.base_id.as_deref(), Some("app123"));
        assert!(config.widget.mock_mode);
        assert_eq!(
            config.airtable.table_url(AirtableTable::Clients).expect("clients url"),
            "https://api.airtable.com/v0/app123/tblC"
        );
    }

    #[test]
    fn missing_required_file_is_an_error() {
        let _guard = env_lock().lock().expect("env lock");
        let error = AppConfig::load(LoadOptions {
            config_path: Some("definitely-missing.toml".into()),
            require_file: true,
            overrides: ConfigOverrides::default(),
        })
        .expect_err("should fail");

        assert!(matches!(error, super::ConfigError::MissingConfigFile(_)));
    }

    #[test]
    fn explicit_overrides_win_over_defaults() {
        let _guard = env_lock().lock().expect("env lock");
        let config = AppConfig::load(LoadOptions {
            overrides: ConfigOverrides {
                base_id: Some("appXYZ".to_string()),
                quotations_table: Some("tblQ".to_string()),
                mock_mode: Some(true),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .expect("config should load");

        assert!(config.widget.mock_mode);
        assert_eq!(
            config.airtable.table_url(AirtableTable::Quotations).expect("quotations url"),
            "https://api.airtable.com/v0/appXYZ/tblQ"
        );
    }

    #[test]
    fn missing_table_id_names_the_gap_instead_of_failing_startup() {
        let config = AppConfig::default();

        let gap = config.airtable.table_url(AirtableTable::Advisors).expect_err("gap");
        assert_eq!(gap.0, "base id");

        let mut config = AppConfig::default();
        config.airtable.base_id = Some("app123".to_string());
        let gap = config.airtable.table_url(AirtableTable::Advisors).expect_err("gap");
        assert_eq!(gap.0, "advisors table id");
    }

    #[test]
    fn log_format_parses_known_names_only() {
        assert_eq!("pretty".parse::<LogFormat>().expect("pretty"), LogFormat::Pretty);
        assert!("verbose".parse::<LogFormat>().is_err());
    }
}
