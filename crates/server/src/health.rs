use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use energia_db::{ping, DbPool, SqlOfferCatalog};
use serde::Serialize;
use tracing::warn;

#[derive(Clone)]
pub struct HealthState {
    db_pool: DbPool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

impl HealthCheck {
    fn new(status: &'static str, detail: impl Into<String>) -> Self {
        Self { status, detail: detail.into() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub database: HealthCheck,
    pub catalog: HealthCheck,
    pub checked_at: String,
}

pub fn router(db_pool: DbPool) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { db_pool })
}

/// Ready when the database answers and the offer tables are readable. An empty catalog is
/// reported but does not make the service unready.
pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let database = database_check(&state.db_pool).await;
    let catalog = if database.status == "ready" {
        catalog_check(&state.db_pool).await
    } else {
        HealthCheck::new("skipped", "database unreachable")
    };
    let ready = database.status == "ready" && catalog.status != "degraded";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck::new("ready", "energia-server runtime initialized"),
        database,
        catalog,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

async fn database_check(pool: &DbPool) -> HealthCheck {
    match ping(pool).await {
        Ok(()) => HealthCheck::new("ready", "database query succeeded"),
        Err(error) => {
            warn!(
                event_name = "system.health.database_degraded",
                correlation_id = "health",
                error = %error,
                "offer catalog database is unreachable"
            );
            HealthCheck::new("degraded", format!("database query failed: {error}"))
        }
    }
}

async fn catalog_check(pool: &DbPool) -> HealthCheck {
    match SqlOfferCatalog::new(pool.clone()).count_offers().await {
        Ok(0) => HealthCheck::new("empty", "no offers loaded; run `energia seed` for demo data"),
        Ok(count) => HealthCheck::new("ready", format!("{count} offers in catalog")),
        Err(error) => {
            warn!(
                event_name = "system.health.catalog_degraded",
                correlation_id = "health",
                error = %error,
                "offer tables are not readable"
            );
            HealthCheck::new("degraded", format!("offer tables not readable: {error}"))
        }
    }
}
