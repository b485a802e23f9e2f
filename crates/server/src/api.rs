//! JSON API.
//!
//! - `GET    /api/v1/offerte/{id}`                  offer detail
//! - `GET    /api/v1/offerte/{id}/share`            share payload plus clipboard fallback notice
//! - `POST   /api/v1/analisi`                       open a bill analyzer session
//! - `GET    /api/v1/analisi/{id}`                  files, previews and run status
//! - `POST   /api/v1/analisi/{id}/files`            add file descriptors
//! - `DELETE /api/v1/analisi/{id}/files/{index}`    remove one file
//! - `POST   /api/v1/analisi/{id}/run`              start the simulated analysis

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use energia_core::analysis::AddReport;
use energia_core::domain::analysis::SelectedFile;
use energia_core::errors::{ApplicationError, DomainError, InterfaceError};
use energia_core::offers::{SharePayload, CLIPBOARD_NOTICE};
use energia_core::{load_offer, OfferView};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::analyzer::{AnalyzerSession, AnalyzerSnapshot};
use crate::app::{correlation_id, interface_status, reject, AppState};
use crate::session::parse_session_id;

#[derive(Debug)]
pub struct ApiError(InterfaceError);

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub correlation_id: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.0.user_message().to_string(),
            correlation_id: self.0.correlation_id().to_string(),
        };
        (interface_status(&self.0), Json(body)).into_response()
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/offerte/{id}", get(offer_detail))
        .route("/api/v1/offerte/{id}/share", get(offer_share))
        .route("/api/v1/analisi", post(create_analysis))
        .route("/api/v1/analisi/{id}", get(analysis_status))
        .route("/api/v1/analisi/{id}/files", post(add_files))
        .route("/api/v1/analisi/{id}/files/{index}", delete(remove_file))
        .route("/api/v1/analisi/{id}/run", post(run_analysis))
}

fn fail(error: ApplicationError, correlation_id: &str, event_name: &'static str) -> ApiError {
    ApiError(reject(error, correlation_id, event_name))
}

// ---------------------------------------------------------------------------
// Offers
// ---------------------------------------------------------------------------

async fn fetch_offer(state: &AppState, raw_id: &str) -> Result<OfferView, ApiError> {
    let correlation_id = correlation_id();
    load_offer(state.catalog.as_ref(), raw_id)
        .await
        .map_err(|error| fail(error.into(), &correlation_id, "api.offer.load_failed"))
}

async fn offer_detail(
    Path(raw_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<OfferView>, ApiError> {
    fetch_offer(&state, &raw_id).await.map(Json)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ShareResponse {
    pub payload: SharePayload,
    pub fallback_notice: String,
}

async fn offer_share(
    Path(raw_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ShareResponse>, ApiError> {
    let view = fetch_offer(&state, &raw_id).await?;
    let url = state.config.site.offer_url(&view.detail.offer_id.to_string());

    Ok(Json(ShareResponse {
        payload: SharePayload::for_offer(Some(&view.detail), url),
        fallback_notice: CLIPBOARD_NOTICE.to_string(),
    }))
}

// ---------------------------------------------------------------------------
// Bill analyzer
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedSession {
    pub session_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct AddFilesRequest {
    pub files: Vec<SelectedFile>,
}

#[derive(Debug, Serialize)]
pub struct AddFilesResponse {
    pub report: AddReport,
    pub snapshot: AnalyzerSnapshot,
}

#[derive(Debug, Deserialize)]
pub struct RunRequest {
    #[serde(default)]
    pub accepted_terms: bool,
}

fn session_id_or_fail(raw: &str, correlation_id: &str) -> Result<Uuid, ApiError> {
    parse_session_id(raw).ok_or_else(|| {
        fail(
            ApplicationError::SessionNotFound(raw.to_string()),
            correlation_id,
            "api.analysis.session_missing",
        )
    })
}

fn missing_session(raw: &str, correlation_id: &str) -> ApiError {
    fail(ApplicationError::SessionNotFound(raw.to_string()), correlation_id, "api.analysis.session_missing")
}

async fn create_analysis(State(state): State<AppState>) -> (StatusCode, Json<CreatedSession>) {
    let session_id = state.analyzer_sessions.create(AnalyzerSession::default()).await;
    info!(
        event_name = "api.analysis.session_created",
        session_id = %session_id,
        "analyzer session created"
    );
    (StatusCode::CREATED, Json(CreatedSession { session_id }))
}

async fn analysis_status(
    Path(raw): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<AnalyzerSnapshot>, ApiError> {
    let correlation_id = correlation_id();
    let session_id = session_id_or_fail(&raw, &correlation_id)?;

    state
        .analyzer_sessions
        .read(session_id, |session| session.snapshot(session_id))
        .await
        .map(Json)
        .ok_or_else(|| missing_session(&raw, &correlation_id))
}

async fn add_files(
    Path(raw): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<AddFilesRequest>,
) -> Result<Json<AddFilesResponse>, ApiError> {
    let correlation_id = correlation_id();
    let session_id = session_id_or_fail(&raw, &correlation_id)?;

    let response = state
        .analyzer_sessions
        .update(session_id, |session| {
            let report = session.selection.add(request.files, &session.previews);
            AddFilesResponse { report, snapshot: session.snapshot(session_id) }
        })
        .await
        .ok_or_else(|| missing_session(&raw, &correlation_id))?;

    info!(
        event_name = "api.analysis.files_added",
        session_id = %session_id,
        accepted = response.report.accepted,
        rejected = response.report.rejected.len(),
        oversized = response.report.oversized.len(),
        "files added to analyzer selection"
    );
    Ok(Json(response))
}

async fn remove_file(
    Path((raw, index)): Path<(String, usize)>,
    State(state): State<AppState>,
) -> Result<Json<AnalyzerSnapshot>, ApiError> {
    let correlation_id = correlation_id();
    let session_id = session_id_or_fail(&raw, &correlation_id)?;

    let removed = state
        .analyzer_sessions
        .update(session_id, |session| {
            session
                .selection
                .remove(index, &session.previews)
                .map(|_| session.snapshot(session_id))
        })
        .await
        .ok_or_else(|| missing_session(&raw, &correlation_id))?;

    removed.map(Json).ok_or_else(|| {
        fail(
            ApplicationError::Domain(DomainError::InvariantViolation(format!(
                "no selected file at position {index}"
            ))),
            &correlation_id,
            "api.analysis.remove_out_of_range",
        )
    })
}

async fn run_analysis(
    Path(raw): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<RunRequest>,
) -> Result<(StatusCode, Json<AnalyzerSnapshot>), ApiError> {
    let correlation_id = correlation_id();
    let session_id = session_id_or_fail(&raw, &correlation_id)?;

    let started = state
        .analyzer_sessions
        .update(session_id, |session| {
            session
                .begin_run(request.accepted_terms)
                .map(|pending| (pending, session.snapshot(session_id)))
        })
        .await
        .ok_or_else(|| missing_session(&raw, &correlation_id))?;

    let (pending, snapshot) = started
        .map_err(|rejection| fail(rejection.into(), &correlation_id, "api.analysis.run_rejected"))?;
    pending.spawn(state.analysis.clone(), session_id);

    Ok((StatusCode::ACCEPTED, Json(snapshot)))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use axum::response::Response;
    use axum::Router;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::app::router;
    use crate::app::testing::seeded_state;

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Response {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .expect("request"),
            None => builder.body(Body::empty()).expect("request"),
        };
        app.clone().oneshot(request).await.expect("router responds")
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    async fn open_session(app: &Router) -> String {
        let response = send(app, Method::POST, "/api/v1/analisi", None).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        json_body(response).await["session_id"].as_str().expect("session id").to_string()
    }

    async fn add(app: &Router, session: &str, files: Value) -> Value {
        let response = send(
            app,
            Method::POST,
            &format!("/api/v1/analisi/{session}/files"),
            Some(json!({ "files": files })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        json_body(response).await
    }

    #[tokio::test]
    async fn offer_detail_returns_full_view() {
        let app = router(seeded_state().await);

        let response = send(&app, Method::GET, "/api/v1/offerte/42", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;

        assert_eq!(body["detail"]["name"], "Luce Sicura 24");
        assert_eq!(body["components"].as_array().map(Vec::len), Some(2));
        assert_eq!(body["payment_methods"][0]["code"], "01");
    }

    #[tokio::test]
    async fn offer_errors_carry_message_and_status() {
        let app = router(seeded_state().await);

        let missing = send(&app, Method::GET, "/api/v1/offerte/404", None).await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        let body = json_body(missing).await;
        assert_eq!(body["error"], "Nessuna offerta trovata con ID: 404");
        assert!(body["correlation_id"].as_str().is_some_and(|id| id.starts_with("req-")));

        let no_detail = send(&app, Method::GET, "/api/v1/offerte/99", None).await;
        assert_eq!(no_detail.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(no_detail).await["error"], "Nessun dettaglio trovato per l'offerta 99");
    }

    #[tokio::test]
    async fn share_payload_uses_offer_name_and_public_url() {
        let app = router(seeded_state().await);

        let response = send(&app, Method::GET, "/api/v1/offerte/42/share", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;

        assert_eq!(body["payload"]["title"], "Luce Sicura 24");
        assert_eq!(body["payload"]["url"], "https://energia.example/offerte/42");
        assert_eq!(body["fallback_notice"], "Link copiato negli appunti!");
    }

    #[tokio::test]
    async fn adding_files_filters_types_and_flags_oversized() {
        let app = router(seeded_state().await);
        let session = open_session(&app).await;

        let body = add(
            &app,
            &session,
            json!([
                { "name": "bolletta.jpg", "mime_type": "image/jpeg", "size_bytes": 20_000 },
                { "name": "note.txt", "mime_type": "text/plain", "size_bytes": 10 },
                { "name": "grande.pdf", "mime_type": "application/pdf", "size_bytes": 11_000_000 }
            ]),
        )
        .await;

        assert_eq!(body["report"]["accepted"], 2);
        assert_eq!(body["report"]["rejected"], json!(["note.txt"]));
        assert_eq!(body["report"]["oversized"], json!(["grande.pdf"]));
        assert_eq!(body["snapshot"]["files"][0]["preview"]["kind"], "owned");
        assert_eq!(body["snapshot"]["files"][1]["preview"]["src"], "/static/icons/pdf-icon.svg");
        assert_eq!(body["snapshot"]["status"]["state"], "idle");
    }

    #[tokio::test]
    async fn removing_a_file_keeps_remaining_order() {
        let app = router(seeded_state().await);
        let session = open_session(&app).await;
        add(
            &app,
            &session,
            json!([
                { "name": "a.pdf", "mime_type": "application/pdf", "size_bytes": 1 },
                { "name": "b.png", "mime_type": "image/png", "size_bytes": 1 },
                { "name": "c.pdf", "mime_type": "application/pdf", "size_bytes": 1 }
            ]),
        )
        .await;

        let response =
            send(&app, Method::DELETE, &format!("/api/v1/analisi/{session}/files/1"), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let names: Vec<&str> = body["files"]
            .as_array()
            .expect("files")
            .iter()
            .filter_map(|file| file["name"].as_str())
            .collect();
        assert_eq!(names, vec!["a.pdf", "c.pdf"]);

        let out_of_range =
            send(&app, Method::DELETE, &format!("/api/v1/analisi/{session}/files/5"), None).await;
        assert_eq!(out_of_range.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn run_preconditions_are_enforced() {
        let app = router(seeded_state().await);
        let session = open_session(&app).await;
        let run_uri = format!("/api/v1/analisi/{session}/run");

        let no_files =
            send(&app, Method::POST, &run_uri, Some(json!({ "accepted_terms": true }))).await;
        assert_eq!(no_files.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(no_files).await["error"], "Seleziona almeno un file da analizzare");

        add(&app, &session, json!([{ "name": "a.pdf", "mime_type": "application/pdf", "size_bytes": 1 }]))
            .await;
        let no_terms =
            send(&app, Method::POST, &run_uri, Some(json!({ "accepted_terms": false }))).await;
        assert_eq!(no_terms.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(no_terms).await["error"],
            "Accetta i termini e le condizioni per procedere"
        );
    }

    #[tokio::test]
    async fn run_completes_with_simulated_result() {
        let app = router(seeded_state().await);
        let session = open_session(&app).await;
        add(&app, &session, json!([{ "name": "a.pdf", "mime_type": "application/pdf", "size_bytes": 1 }]))
            .await;

        let started = send(
            &app,
            Method::POST,
            &format!("/api/v1/analisi/{session}/run"),
            Some(json!({ "accepted_terms": true })),
        )
        .await;
        assert_eq!(started.status(), StatusCode::ACCEPTED);
        assert_eq!(json_body(started).await["status"]["state"], "running");

        let mut status = Value::Null;
        for _ in 0..50 {
            let response =
                send(&app, Method::GET, &format!("/api/v1/analisi/{session}"), None).await;
            status = json_body(response).await;
            if status["status"]["state"] == "complete" {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert_eq!(status["status"]["state"], "complete");
        assert_eq!(status["max_saving"], 150);
        assert_eq!(status["status"]["result"]["matching_offers_count"], 25);
    }

    #[tokio::test]
    async fn second_run_while_running_is_a_conflict() {
        let mut state = seeded_state().await;
        state.analysis = std::sync::Arc::new(energia_core::SimulatedAnalysisEngine::new(
            Duration::from_secs(60),
            20,
        ));
        let app = router(state);
        let session = open_session(&app).await;
        add(&app, &session, json!([{ "name": "a.pdf", "mime_type": "application/pdf", "size_bytes": 1 }]))
            .await;
        let run_uri = format!("/api/v1/analisi/{session}/run");

        let first = send(&app, Method::POST, &run_uri, Some(json!({ "accepted_terms": true }))).await;
        let second = send(&app, Method::POST, &run_uri, Some(json!({ "accepted_terms": true }))).await;

        assert_eq!(first.status(), StatusCode::ACCEPTED);
        assert_eq!(second.status(), StatusCode::CONFLICT);
        assert_eq!(json_body(second).await["error"], "Analisi già in corso");
    }

    #[tokio::test]
    async fn unknown_analyzer_session_is_not_found() {
        let app = router(seeded_state().await);

        let response = send(&app, Method::GET, "/api/v1/analisi/ignota", None).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["error"], "Sessione scaduta o inesistente.");
    }
}
