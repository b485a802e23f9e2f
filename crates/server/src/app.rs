use std::path::Path;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::Router;
use energia_core::config::AppConfig;
use energia_core::errors::{ApplicationError, InterfaceError};
use energia_core::offers::{OfferCatalog, OfferMatcher, StaticOfferMatcher};
use energia_core::wizard::{EnergyQuestionnaire, WizardState};
use energia_core::{AnalysisEngine, SimulatedAnalysisEngine, WizardEngine};
use energia_db::{DbPool, SqlOfferCatalog};
use tera::Tera;
use tower_http::services::ServeDir;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::analyzer::AnalyzerSession;
use crate::session::SessionStore;
use crate::{api, health, site};

const EMBEDDED_TEMPLATES: [(&str, &str); 7] = [
    ("base.html", include_str!("../../../templates/site/base.html")),
    ("index.html", include_str!("../../../templates/site/index.html")),
    ("question.html", include_str!("../../../templates/site/question.html")),
    ("summary.html", include_str!("../../../templates/site/summary.html")),
    ("offer.html", include_str!("../../../templates/site/offer.html")),
    ("analyzer.html", include_str!("../../../templates/site/analyzer.html")),
    ("error.html", include_str!("../../../templates/site/error.html")),
];

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db_pool: DbPool,
    pub templates: Arc<Tera>,
    pub wizard: Arc<WizardEngine<EnergyQuestionnaire>>,
    pub wizard_sessions: SessionStore<WizardState>,
    pub analyzer_sessions: SessionStore<AnalyzerSession>,
    pub catalog: Arc<dyn OfferCatalog>,
    pub matcher: Arc<dyn OfferMatcher>,
    pub analysis: Arc<dyn AnalysisEngine>,
}

impl AppState {
    pub fn new(config: AppConfig, db_pool: DbPool, templates: Arc<Tera>) -> Self {
        let ttl = config.sessions.ttl();
        let analysis =
            SimulatedAnalysisEngine::new(config.analysis.tick(), config.analysis.step_percent);

        Self {
            catalog: Arc::new(SqlOfferCatalog::new(db_pool.clone())),
            matcher: Arc::new(StaticOfferMatcher),
            analysis: Arc::new(analysis),
            wizard: Arc::new(WizardEngine::default()),
            wizard_sessions: SessionStore::new("wizard", ttl),
            analyzer_sessions: SessionStore::new("analyzer", ttl),
            config: Arc::new(config),
            db_pool,
            templates,
        }
    }
}

/// Site templates from `templates_dir`, with the bundled copies filling any gap.
pub fn init_templates(templates_dir: &Path) -> Arc<Tera> {
    let pattern = format!("{}/**/*.html", templates_dir.display());
    let mut tera = match Tera::new(&pattern) {
        Ok(tera) => tera,
        Err(error) => {
            warn!(
                event_name = "system.templates.filesystem_unavailable",
                correlation_id = "bootstrap",
                templates_dir = %templates_dir.display(),
                error = %error,
                "site templates could not be loaded from disk, using bundled templates"
            );
            Tera::default()
        }
    };

    let loaded: Vec<String> = tera.get_template_names().map(str::to_owned).collect();
    let missing: Vec<(&str, &str)> = EMBEDDED_TEMPLATES
        .iter()
        .copied()
        .filter(|(name, _)| !loaded.iter().any(|loaded| loaded == name))
        .collect();
    if let Err(error) = tera.add_raw_templates(missing) {
        error!(
            event_name = "system.templates.embedded_failed",
            correlation_id = "bootstrap",
            error = %error,
            "bundled site templates failed to compile"
        );
    }

    info!(
        event_name = "system.templates.ready",
        correlation_id = "bootstrap",
        from_disk = loaded.len(),
        "site templates initialized"
    );
    Arc::new(tera)
}

pub fn router(state: AppState) -> Router {
    let static_dir = ServeDir::new(&state.config.site.static_dir);
    let db_pool = state.db_pool.clone();

    Router::new()
        .merge(site::routes())
        .merge(api::routes())
        .with_state(state)
        .merge(health::router(db_pool))
        .nest_service("/static", static_dir)
}

pub fn correlation_id() -> String {
    format!("req-{}", Uuid::new_v4())
}

pub fn interface_status(error: &InterfaceError) -> StatusCode {
    match error {
        InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        InterfaceError::NotFound { .. } => StatusCode::NOT_FOUND,
        InterfaceError::Conflict { .. } => StatusCode::CONFLICT,
        InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Maps an application failure for the visitor and records it.
pub fn reject(
    error: ApplicationError,
    correlation_id: &str,
    event_name: &'static str,
) -> InterfaceError {
    let detail = error.to_string();
    let mapped = error.into_interface(correlation_id);
    match mapped {
        InterfaceError::ServiceUnavailable { .. } | InterfaceError::Internal { .. } => error!(
            event_name,
            correlation_id,
            error = %detail,
            "request failed"
        ),
        _ => warn!(event_name, correlation_id, error = %detail, "request rejected"),
    }
    mapped
}

#[cfg(test)]
pub(crate) mod testing {
    use energia_core::config::AppConfig;
    use energia_db::{connect_with_settings, migrations, CatalogSeedDataset};

    use super::{init_templates, AppState};

    /// In-memory catalog with the demo seed, no results delay and instant analysis ticks.
    pub async fn seeded_state() -> AppState {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        CatalogSeedDataset::load(&pool).await.expect("seed");

        let mut config = AppConfig::default();
        config.site.results_delay_ms = 0;
        config.site.public_base_url = "https://energia.example".to_string();
        config.analysis.tick_ms = 0;
        let templates = init_templates(&config.site.templates_dir);

        AppState::new(config, pool, templates)
    }
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use energia_core::errors::InterfaceError;
    use tower::ServiceExt;

    use super::testing::seeded_state;
    use super::{init_templates, interface_status, router};

    #[test]
    fn bundled_templates_cover_every_page() {
        let tera = init_templates(std::path::Path::new("no/such/templates"));
        let names: Vec<&str> = tera.get_template_names().collect();

        for page in ["index.html", "question.html", "summary.html", "offer.html", "error.html"] {
            assert!(names.contains(&page), "missing template {page}");
        }
    }

    #[test]
    fn interface_errors_map_to_http_statuses() {
        let not_found =
            InterfaceError::NotFound { message: "x".into(), correlation_id: "c".into() };
        let busy = InterfaceError::Conflict { message: "x".into(), correlation_id: "c".into() };
        let down =
            InterfaceError::ServiceUnavailable { message: "x".into(), correlation_id: "c".into() };

        assert_eq!(interface_status(&not_found), StatusCode::NOT_FOUND);
        assert_eq!(interface_status(&busy), StatusCode::CONFLICT);
        assert_eq!(interface_status(&down), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn router_serves_pages_api_and_health() {
        let app = router(seeded_state().await);

        for (uri, expected) in [
            ("/", StatusCode::OK),
            ("/health", StatusCode::OK),
            ("/offerte/42", StatusCode::OK),
            ("/api/v1/offerte/42", StatusCode::OK),
            ("/api/v1/offerte/404", StatusCode::NOT_FOUND),
            ("/questionario", StatusCode::SEE_OTHER),
        ] {
            let response = app
                .clone()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
                .await
                .expect("router responds");
            assert_eq!(response.status(), expected, "unexpected status for {uri}");
        }
    }

    #[tokio::test]
    async fn offer_page_through_router_lists_components_and_payment_label() {
        let app = router(seeded_state().await);

        let response = app
            .oneshot(Request::builder().uri("/offerte/42").body(Body::empty()).expect("request"))
            .await
            .expect("router responds");
        let body = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let html = String::from_utf8(body.to_vec()).expect("utf8");

        assert!(html.contains("Luce Sicura 24"));
        assert_eq!(html.matches("class=\"component\"").count(), 2);
        assert_eq!(html.matches("class=\"payment-card\"").count(), 1);
        assert!(html.contains("Bonifico Bancario"));
    }
}
