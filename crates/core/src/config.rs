use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub site: SiteConfig,
    pub analysis: AnalysisConfig,
    pub sessions: SessionsConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct SiteConfig {
    pub public_base_url: String,
    pub community_url: String,
    pub results_delay_ms: u64,
    pub templates_dir: PathBuf,
    pub static_dir: PathBuf,
}

#[derive(Clone, Debug)]
pub struct AnalysisConfig {
    pub tick_ms: u64,
    pub step_percent: u8,
}

#[derive(Clone, Debug)]
pub struct SessionsConfig {
    pub ttl_secs: u64,
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

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub log_level: Option<String>,
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub results_delay_ms: Option<u64>,
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
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

pub const DEFAULT_CONFIG_FILES: [&str; 2] = ["energia.toml", "config/energia.toml"];

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://energia.db".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 8080,
                graceful_shutdown_secs: 15,
            },
            site: SiteConfig {
                public_base_url: "http://127.0.0.1:8080".to_string(),
                community_url: "https://chat.whatsapp.com/your-invite-link".to_string(),
                results_delay_ms: 1500,
                templates_dir: PathBuf::from("templates/site"),
                static_dir: PathBuf::from("static"),
            },
            analysis: AnalysisConfig { tick_ms: 1000, step_percent: 20 },
            sessions: SessionsConfig { ttl_secs: 3600 },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl FromStr for LogFormat {
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

impl ServerConfig {
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.graceful_shutdown_secs)
    }
}

impl SiteConfig {
    pub fn results_delay(&self) -> Duration {
        Duration::from_millis(self.results_delay_ms)
    }

    /// Absolute link for an offer page, used as the share url.
    pub fn offer_url(&self, offer_id: &str) -> String {
        format!("{}/offerte/{offer_id}", self.public_base_url.trim_end_matches('/'))
    }
}

impl AnalysisConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

impl SessionsConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
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
                options.config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILES[0]));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(database) = patch.database {
            merge(&mut self.database.url, database.url);
            merge(&mut self.database.max_connections, database.max_connections);
            merge(&mut self.database.timeout_secs, database.timeout_secs);
        }
        if let Some(server) = patch.server {
            merge(&mut self.server.bind_address, server.bind_address);
            merge(&mut self.server.port, server.port);
            merge(&mut self.server.graceful_shutdown_secs, server.graceful_shutdown_secs);
        }
        if let Some(site) = patch.site {
            merge(&mut self.site.public_base_url, site.public_base_url);
            merge(&mut self.site.community_url, site.community_url);
            merge(&mut self.site.results_delay_ms, site.results_delay_ms);
            merge(&mut self.site.templates_dir, site.templates_dir);
            merge(&mut self.site.static_dir, site.static_dir);
        }
        if let Some(analysis) = patch.analysis {
            merge(&mut self.analysis.tick_ms, analysis.tick_ms);
            merge(&mut self.analysis.step_percent, analysis.step_percent);
        }
        if let Some(sessions) = patch.sessions {
            merge(&mut self.sessions.ttl_secs, sessions.ttl_secs);
        }
        if let Some(logging) = patch.logging {
            merge(&mut self.logging.level, logging.level);
            merge(&mut self.logging.format, logging.format);
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        merge(&mut self.database.url, read_env("ENERGIA_DATABASE_URL"));
        merge(&mut self.database.max_connections, env_number("ENERGIA_DATABASE_MAX_CONNECTIONS")?);
        merge(&mut self.database.timeout_secs, env_number("ENERGIA_DATABASE_TIMEOUT_SECS")?);

        merge(&mut self.server.bind_address, read_env("ENERGIA_SERVER_BIND_ADDRESS"));
        merge(&mut self.server.port, env_number("ENERGIA_SERVER_PORT")?);
        merge(
            &mut self.server.graceful_shutdown_secs,
            env_number("ENERGIA_SERVER_GRACEFUL_SHUTDOWN_SECS")?,
        );

        merge(&mut self.site.public_base_url, read_env("ENERGIA_SITE_PUBLIC_BASE_URL"));
        merge(&mut self.site.community_url, read_env("ENERGIA_SITE_COMMUNITY_URL"));
        merge(&mut self.site.results_delay_ms, env_number("ENERGIA_SITE_RESULTS_DELAY_MS")?);
        merge(
            &mut self.site.templates_dir,
            read_env("ENERGIA_SITE_TEMPLATES_DIR").map(PathBuf::from),
        );
        merge(&mut self.site.static_dir, read_env("ENERGIA_SITE_STATIC_DIR").map(PathBuf::from));

        merge(&mut self.analysis.tick_ms, env_number("ENERGIA_ANALYSIS_TICK_MS")?);
        merge(&mut self.analysis.step_percent, env_number("ENERGIA_ANALYSIS_STEP_PERCENT")?);

        merge(&mut self.sessions.ttl_secs, env_number("ENERGIA_SESSIONS_TTL_SECS")?);

        // The short LOG_ spellings are accepted as aliases.
        let log_level = read_env("ENERGIA_LOGGING_LEVEL").or_else(|| read_env("ENERGIA_LOG_LEVEL"));
        merge(&mut self.logging.level, log_level);
        let log_format =
            read_env("ENERGIA_LOGGING_FORMAT").or_else(|| read_env("ENERGIA_LOG_FORMAT"));
        merge(&mut self.logging.format, log_format.map(|value| value.parse()).transpose()?);

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        merge(&mut self.database.url, overrides.database_url);
        merge(&mut self.logging.level, overrides.log_level);
        merge(&mut self.server.bind_address, overrides.bind_address);
        merge(&mut self.server.port, overrides.port);
        merge(&mut self.site.results_delay_ms, overrides.results_delay_ms);
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_database(&self.database)?;
        validate_server(&self.server)?;
        validate_site(&self.site)?;
        validate_analysis(&self.analysis)?;
        validate_sessions(&self.sessions)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

/// First config file that exists: the explicit path, else the default locations.
pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    DEFAULT_CONFIG_FILES.iter().map(PathBuf::from).find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_database(database: &DatabaseConfig) -> Result<(), ConfigError> {
    let url = database.url.trim();
    let sqlite_url =
        url.starts_with("sqlite://") || url.starts_with("sqlite::") || url == ":memory:";
    if !sqlite_url {
        return Err(ConfigError::Validation(
            "database.url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)"
                .to_string(),
        ));
    }

    if database.max_connections == 0 {
        return Err(ConfigError::Validation(
            "database.max_connections must be greater than zero".to_string(),
        ));
    }

    if database.timeout_secs == 0 || database.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "database.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.bind_address.trim().is_empty() {
        return Err(ConfigError::Validation("server.bind_address must not be empty".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_site(site: &SiteConfig) -> Result<(), ConfigError> {
    for (key, value) in
        [("site.public_base_url", &site.public_base_url), ("site.community_url", &site.community_url)]
    {
        if !value.starts_with("http://") && !value.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "{key} must start with http:// or https://"
            )));
        }
    }

    if site.results_delay_ms > 60_000 {
        return Err(ConfigError::Validation(
            "site.results_delay_ms must be in range 0..=60000".to_string(),
        ));
    }

    Ok(())
}

fn validate_analysis(analysis: &AnalysisConfig) -> Result<(), ConfigError> {
    if analysis.step_percent == 0 || analysis.step_percent > 100 {
        return Err(ConfigError::Validation(
            "analysis.step_percent must be in range 1..=100".to_string(),
        ));
    }

    if analysis.tick_ms > 60_000 {
        return Err(ConfigError::Validation(
            "analysis.tick_ms must be in range 0..=60000".to_string(),
        ));
    }

    Ok(())
}

fn validate_sessions(sessions: &SessionsConfig) -> Result<(), ConfigError> {
    if sessions.ttl_secs == 0 {
        return Err(ConfigError::Validation(
            "sessions.ttl_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn merge<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn env_number<T: FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    read_env(key)
        .map(|value| {
            value.parse::<T>().map_err(|_| ConfigError::InvalidEnvOverride {
                key: key.to_string(),
                value,
            })
        })
        .transpose()
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    database: Option<DatabasePatch>,
    server: Option<ServerPatch>,
    site: Option<SitePatch>,
    analysis: Option<AnalysisPatch>,
    sessions: Option<SessionsPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabasePatch {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct SitePatch {
    public_base_url: Option<String>,
    community_url: Option<String>,
    results_delay_ms: Option<u64>,
    templates_dir: Option<PathBuf>,
    static_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct AnalysisPatch {
    tick_ms: Option<u64>,
    step_percent: Option<u8>,
}

#[derive(Debug, Default, Deserialize)]
struct SessionsPatch {
    ttl_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};
    use std::time::Duration;

    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

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
    fn defaults_pass_validation() -> Result<(), String> {
        let config = AppConfig::default();
        config.validate().map_err(|err| format!("defaults should be valid: {err}"))?;

        ensure(config.analysis.tick() == Duration::from_secs(1), "default tick is one second")?;
        ensure(config.analysis.step_percent == 20, "default step is twenty percent")?;
        ensure(
            config.site.results_delay() == Duration::from_millis(1500),
            "default results delay is 1500ms",
        )?;
        ensure(
            config.site.offer_url("42") == "http://127.0.0.1:8080/offerte/42",
            "offer url is built from the public base url",
        )
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TEST_ENERGIA_COMMUNITY", "https://chat.whatsapp.com/from-env");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("energia.toml");
            fs::write(
                &path,
                r#"
[site]
community_url = "${TEST_ENERGIA_COMMUNITY}"
public_base_url = "https://energia.example/"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.site.community_url == "https://chat.whatsapp.com/from-env",
                "community url should be interpolated from the environment",
            )?;
            ensure(
                config.site.offer_url("7") == "https://energia.example/offerte/7",
                "trailing slash on the base url is ignored",
            )
        })();

        clear_vars(&["TEST_ENERGIA_COMMUNITY"]);
        result
    }

    #[test]
    fn missing_interpolation_variable_is_reported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(&["TEST_ENERGIA_UNSET"]);

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let path = dir.path().join("energia.toml");
        fs::write(&path, "[database]\nurl = \"${TEST_ENERGIA_UNSET}\"\n")
            .map_err(|err| err.to_string())?;

        let error = match AppConfig::load(LoadOptions {
            config_path: Some(path),
            ..LoadOptions::default()
        }) {
            Ok(_) => return Err("expected interpolation failure".to_string()),
            Err(error) => error,
        };
        ensure(
            matches!(error, ConfigError::MissingEnvInterpolation { ref var } if var == "TEST_ENERGIA_UNSET"),
            "error should name the missing variable",
        )
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("ENERGIA_LOG_LEVEL", "warn");
        env::set_var("ENERGIA_LOG_FORMAT", "json");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Json),
                "json logging format should be set from env var",
            )
        })();

        clear_vars(&["ENERGIA_LOG_LEVEL", "ENERGIA_LOG_FORMAT"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("ENERGIA_DATABASE_URL", "sqlite://from-env.db");
        env::set_var("ENERGIA_ANALYSIS_TICK_MS", "250");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("energia.toml");
            fs::write(
                &path,
                r#"
[database]
url = "sqlite://from-file.db"

[analysis]
tick_ms = 500
step_percent = 25

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    database_url: Some("sqlite://from-override.db".to_string()),
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.database.url == "sqlite://from-override.db",
                "override database url should win",
            )?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            ensure(config.analysis.tick_ms == 250, "env tick should win over the file")?;
            ensure(config.analysis.step_percent == 25, "file step should win over defaults")
        })();

        clear_vars(&["ENERGIA_DATABASE_URL", "ENERGIA_ANALYSIS_TICK_MS"]);
        result
    }

    #[test]
    fn validation_fails_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("ENERGIA_ANALYSIS_STEP_PERCENT", "0");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            ensure(
                matches!(
                    error,
                    ConfigError::Validation(ref message) if message.contains("analysis.step_percent")
                ),
                "validation failure should mention analysis.step_percent",
            )
        })();

        clear_vars(&["ENERGIA_ANALYSIS_STEP_PERCENT"]);
        result
    }

    #[test]
    fn malformed_numeric_env_override_is_rejected() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("ENERGIA_SERVER_PORT", "not-a-port");

        let result = match AppConfig::load(LoadOptions::default()) {
            Ok(_) => Err("expected env override failure".to_string()),
            Err(error) => ensure(
                matches!(error, ConfigError::InvalidEnvOverride { ref key, .. } if key == "ENERGIA_SERVER_PORT"),
                "error should name the offending variable",
            ),
        };

        clear_vars(&["ENERGIA_SERVER_PORT"]);
        result
    }

    #[test]
    fn non_sqlite_database_url_is_rejected() -> Result<(), String> {
        let mut config = AppConfig::default();
        config.database.url = "postgres://localhost/energia".to_string();

        match config.validate() {
            Ok(()) => Err("postgres url should be rejected".to_string()),
            Err(error) => ensure(
                error.to_string().contains("database.url"),
                "validation failure should mention database.url",
            ),
        }
    }

    #[test]
    fn required_missing_file_is_an_error() -> Result<(), String> {
        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let path = dir.path().join("absent.toml");

        match AppConfig::load(LoadOptions {
            config_path: Some(path),
            require_file: true,
            ..LoadOptions::default()
        }) {
            Ok(_) => Err("missing file should fail when required".to_string()),
            Err(error) => ensure(
                matches!(error, ConfigError::MissingConfigFile(_)),
                "error should be MissingConfigFile",
            ),
        }
    }
}
