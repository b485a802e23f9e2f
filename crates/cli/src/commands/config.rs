use std::env;
use std::fs;
use std::path::Path;

use energia_core::config::{resolve_config_path, AppConfig, LoadOptions};
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = resolve_config_path(None);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for (key_path, env_keys, value) in effective_fields(&config) {
        let source =
            field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref());
        lines.push(render_line(key_path, &value, source));
    }

    lines.join("\n")
}

fn effective_fields(config: &AppConfig) -> Vec<(&'static str, &'static [&'static str], String)> {
    vec![
        ("database.url", &["ENERGIA_DATABASE_URL"], config.database.url.clone()),
        (
            "database.max_connections",
            &["ENERGIA_DATABASE_MAX_CONNECTIONS"],
            config.database.max_connections.to_string(),
        ),
        (
            "database.timeout_secs",
            &["ENERGIA_DATABASE_TIMEOUT_SECS"],
            config.database.timeout_secs.to_string(),
        ),
        ("server.bind_address", &["ENERGIA_SERVER_BIND_ADDRESS"], config.server.bind_address.clone()),
        ("server.port", &["ENERGIA_SERVER_PORT"], config.server.port.to_string()),
        (
            "server.graceful_shutdown_secs",
            &["ENERGIA_SERVER_GRACEFUL_SHUTDOWN_SECS"],
            config.server.graceful_shutdown_secs.to_string(),
        ),
        (
            "site.public_base_url",
            &["ENERGIA_SITE_PUBLIC_BASE_URL"],
            config.site.public_base_url.clone(),
        ),
        ("site.community_url", &["ENERGIA_SITE_COMMUNITY_URL"], config.site.community_url.clone()),
        (
            "site.results_delay_ms",
            &["ENERGIA_SITE_RESULTS_DELAY_MS"],
            config.site.results_delay_ms.to_string(),
        ),
        (
            "site.templates_dir",
            &["ENERGIA_SITE_TEMPLATES_DIR"],
            config.site.templates_dir.display().to_string(),
        ),
        (
            "site.static_dir",
            &["ENERGIA_SITE_STATIC_DIR"],
            config.site.static_dir.display().to_string(),
        ),
        ("analysis.tick_ms", &["ENERGIA_ANALYSIS_TICK_MS"], config.analysis.tick_ms.to_string()),
        (
            "analysis.step_percent",
            &["ENERGIA_ANALYSIS_STEP_PERCENT"],
            config.analysis.step_percent.to_string(),
        ),
        ("sessions.ttl_secs", &["ENERGIA_SESSIONS_TTL_SECS"], config.sessions.ttl_secs.to_string()),
        (
            "logging.level",
            &["ENERGIA_LOGGING_LEVEL", "ENERGIA_LOG_LEVEL"],
            config.logging.level.clone(),
        ),
        (
            "logging.format",
            &["ENERGIA_LOGGING_FORMAT", "ENERGIA_LOG_FORMAT"],
            format!("{:?}", config.logging.format).to_lowercase(),
        ),
    ]
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
