use std::path::Path;

use energia_core::config::{AppConfig, LoadOptions};
use energia_db::{connect_with_config, migrations, ping, DbPool};
use serde::Serialize;

use crate::commands::CommandResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

impl DoctorCheck {
    fn new(name: &'static str, status: CheckStatus, details: impl Into<String>) -> Self {
        Self { name, status, details: details.into() }
    }
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { 1 };

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck::new(
                "config_validation",
                CheckStatus::Pass,
                "configuration loaded and validated",
            ));
            checks.extend(check_database(&config));
            checks.push(check_directory("templates_dir", &config.site.templates_dir));
            checks.push(check_directory("static_dir", &config.site.static_dir));
        }
        Err(error) => {
            checks.push(DoctorCheck::new("config_validation", CheckStatus::Fail, error.to_string()));
            for name in ["database_connectivity", "schema_migrations", "templates_dir", "static_dir"]
            {
                checks.push(DoctorCheck::new(
                    name,
                    CheckStatus::Skipped,
                    "skipped because configuration did not load",
                ));
            }
        }
    }

    summarize(checks)
}

fn summarize(checks: Vec<DoctorCheck>) -> DoctorReport {
    let any_failed = checks.iter().any(|check| check.status == CheckStatus::Fail);
    let (overall_status, summary) = if any_failed {
        (CheckStatus::Fail, "doctor: one or more readiness checks failed")
    } else {
        (CheckStatus::Pass, "doctor: all readiness checks passed")
    };

    DoctorReport { overall_status, summary: summary.to_string(), checks }
}

/// Connectivity and schema state, in that order. Schema is skipped when the database is unreachable.
fn check_database(config: &AppConfig) -> [DoctorCheck; 2] {
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return [
                DoctorCheck::new(
                    "database_connectivity",
                    CheckStatus::Fail,
                    format!("failed to initialize async runtime: {error}"),
                ),
                DoctorCheck::new(
                    "schema_migrations",
                    CheckStatus::Skipped,
                    "skipped because the async runtime did not start",
                ),
            ];
        }
    };

    runtime.block_on(async {
        let pool = match connect_with_config(&config.database).await {
            Ok(pool) => pool,
            Err(error) => {
                return [
                    DoctorCheck::new(
                        "database_connectivity",
                        CheckStatus::Fail,
                        format!("failed to connect to database: {error}"),
                    ),
                    DoctorCheck::new(
                        "schema_migrations",
                        CheckStatus::Skipped,
                        "skipped because the database is unreachable",
                    ),
                ];
            }
        };

        let connectivity = match ping(&pool).await {
            Ok(()) => DoctorCheck::new(
                "database_connectivity",
                CheckStatus::Pass,
                format!("connected using `{}`", config.database.url),
            ),
            Err(error) => DoctorCheck::new(
                "database_connectivity",
                CheckStatus::Fail,
                format!("database query failed: {error}"),
            ),
        };
        let schema = check_schema(&pool).await;

        pool.close().await;
        [connectivity, schema]
    })
}

async fn check_schema(pool: &DbPool) -> DoctorCheck {
    let applied = match migrations::applied_versions(pool).await {
        Ok(applied) => applied,
        Err(error) => {
            return DoctorCheck::new(
                "schema_migrations",
                CheckStatus::Fail,
                format!("could not read applied migrations: {error}"),
            );
        }
    };

    let pending: Vec<String> = migrations::MIGRATOR
        .iter()
        .filter(|migration| !migration.migration_type.is_down_migration())
        .filter(|migration| !applied.contains(&migration.version))
        .map(|migration| migration.version.to_string())
        .collect();

    if pending.is_empty() {
        DoctorCheck::new(
            "schema_migrations",
            CheckStatus::Pass,
            format!("{} migrations applied", applied.len()),
        )
    } else {
        DoctorCheck::new(
            "schema_migrations",
            CheckStatus::Fail,
            format!("pending migrations {}; run `energia migrate`", pending.join(", ")),
        )
    }
}

fn check_directory(name: &'static str, path: &Path) -> DoctorCheck {
    if path.is_dir() {
        DoctorCheck::new(name, CheckStatus::Pass, format!("found `{}`", path.display()))
    } else {
        DoctorCheck::new(
            name,
            CheckStatus::Skipped,
            format!("`{}` not found; the server falls back to bundled assets", path.display()),
        )
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
