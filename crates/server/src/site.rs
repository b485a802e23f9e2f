//! HTML pages.
//!
//! - `GET  /`                         home page with service description, FAQ and community invite
//! - `GET  /questionario`             starts a questionnaire session
//! - `GET  /questionario/{session}`   current question
//! - `POST /questionario/{session}`   answer, or go back
//! - `GET  /riepilogo`                recommended offers for the profile in the query
//! - `GET  /offerte/{id}`             offer detail page
//! - `GET  /analisi`                  bill analyzer shell, driven by the JSON API

use axum::{
    extract::{Path, RawQuery, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use energia_core::content::{CommunityInvite, FAQ_ENTRIES, SERVICE_DESCRIPTION};
use energia_core::domain::offer::OfferView;
use energia_core::domain::question::QuestionKind;
use energia_core::errors::{ApplicationError, InterfaceError};
use energia_core::offers::{profile_highlights, RecommendedOffer};
use energia_core::wizard::{QuestionnaireDefinition, WizardEvent, WizardState};
use energia_core::{load_offer, Profile, WizardError};
use serde::{Deserialize, Serialize};
use tera::Context;
use tracing::info;
use uuid::Uuid;

use crate::app::{correlation_id, interface_status, reject, AppState};
use crate::session::parse_session_id;

type PageResult = Result<Response, (StatusCode, Html<String>)>;

const FALLBACK_ERROR_HTML: &str =
    "<!doctype html><html lang=\"it\"><body><h1>Errore</h1><p>Si è verificato un errore imprevisto.</p></body></html>";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home_page))
        .route("/questionario", get(start_questionnaire))
        .route("/questionario/{session}", get(question_page).post(answer_question))
        .route("/riepilogo", get(summary_page))
        .route("/offerte/{id}", get(offer_page))
        .route("/analisi", get(analyzer_page))
}

fn render(state: &AppState, template: &str, context: &Context) -> Result<Html<String>, (StatusCode, Html<String>)> {
    state.templates.render(template, context).map(Html).map_err(|error| {
        let failure = reject(
            ApplicationError::Configuration(format!("template `{template}`: {error:?}")),
            &correlation_id(),
            "site.template.render_failed",
        );
        (interface_status(&failure), Html(FALLBACK_ERROR_HTML.to_string()))
    })
}

/// Full-page alert with a single way out: back to the previous page.
fn error_page(state: &AppState, error: &InterfaceError) -> (StatusCode, Html<String>) {
    let mut context = Context::new();
    context.insert("message", error.user_message());
    context.insert("correlation_id", error.correlation_id());

    let status = interface_status(error);
    match render(state, "error.html", &context) {
        Ok(html) => (status, html),
        Err(fallback) => fallback,
    }
}

fn session_missing(state: &AppState, raw: &str, correlation_id: &str) -> (StatusCode, Html<String>) {
    let mapped = reject(
        ApplicationError::SessionNotFound(raw.to_string()),
        correlation_id,
        "site.questionnaire.session_missing",
    );
    error_page(state, &mapped)
}

async fn home_page(State(state): State<AppState>) -> PageResult {
    let mut context = Context::new();
    context.insert("service", &SERVICE_DESCRIPTION);
    context.insert("faq", &FAQ_ENTRIES);
    context.insert("community", &CommunityInvite::new(state.config.site.community_url.clone()));

    Ok(render(&state, "index.html", &context)?.into_response())
}

async fn analyzer_page(State(state): State<AppState>) -> PageResult {
    let mut context = Context::new();
    context.insert("step_percent", &state.config.analysis.step_percent);

    Ok(render(&state, "analyzer.html", &context)?.into_response())
}

// ---------------------------------------------------------------------------
// Questionnaire
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct OptionView {
    id: String,
    label: String,
    selected: bool,
}

#[derive(Debug, Serialize)]
struct QuestionView {
    session_id: String,
    question_id: String,
    position: usize,
    total: usize,
    progress_percent: usize,
    prompt: String,
    kind: &'static str,
    options: Vec<OptionView>,
    placeholder: String,
    value: String,
    can_go_back: bool,
}

fn question_view(state: &AppState, session_id: Uuid, wizard: &WizardState) -> Option<QuestionView> {
    let index = wizard.current_index()?;
    let question = state.wizard.current_question(wizard)?;
    let total = state.wizard.questionnaire().question_count();
    let recorded = wizard.profile.get(&question.id.0).unwrap_or_default().to_string();

    let (kind, options, placeholder) = match &question.kind {
        QuestionKind::Choice { options } => (
            "choice",
            options
                .iter()
                .map(|option| OptionView {
                    id: option.id.clone(),
                    label: option.label.clone(),
                    selected: option.id == recorded,
                })
                .collect(),
            String::new(),
        ),
        QuestionKind::Freeform { placeholder, .. } => ("freeform", Vec::new(), placeholder.clone()),
    };

    Some(QuestionView {
        session_id: session_id.to_string(),
        question_id: question.id.0.clone(),
        position: index + 1,
        total,
        progress_percent: (index + 1) * 100 / total.max(1),
        prompt: question.prompt.clone(),
        kind,
        options,
        placeholder,
        value: recorded,
        can_go_back: index > 0,
    })
}

fn results_redirect(profile: &Profile) -> Response {
    Redirect::to(&format!("/riepilogo?{}", profile.to_query())).into_response()
}

fn render_question(
    state: &AppState,
    session_id: Uuid,
    wizard: &WizardState,
    validation_error: Option<&str>,
) -> PageResult {
    let Some(view) = question_view(state, session_id, wizard) else {
        return Ok(results_redirect(&wizard.profile));
    };
    let mut context = Context::new();
    context.insert("question", &view);
    context.insert("error", &validation_error);

    let html = render(state, "question.html", &context)?;
    let status = if validation_error.is_some() { StatusCode::UNPROCESSABLE_ENTITY } else { StatusCode::OK };
    Ok((status, html).into_response())
}

async fn start_questionnaire(State(state): State<AppState>) -> Response {
    let session_id = state.wizard_sessions.create(state.wizard.initial_state()).await;
    info!(
        event_name = "site.questionnaire.started",
        session_id = %session_id,
        "questionnaire session created"
    );
    Redirect::to(&format!("/questionario/{session_id}")).into_response()
}

async fn question_page(Path(raw): Path<String>, State(state): State<AppState>) -> PageResult {
    let correlation_id = correlation_id();
    let Some(session_id) = parse_session_id(&raw) else {
        return Err(session_missing(&state, &raw, &correlation_id));
    };
    let Some(wizard) = state.wizard_sessions.read(session_id, WizardState::clone).await else {
        return Err(session_missing(&state, &raw, &correlation_id));
    };

    render_question(&state, session_id, &wizard, None)
}

#[derive(Debug, Deserialize)]
pub struct AnswerForm {
    pub action: String,
    pub option_id: Option<String>,
    pub value: Option<String>,
}

impl AnswerForm {
    fn into_event(self) -> Option<WizardEvent> {
        match self.action.as_str() {
            "choose" => Some(WizardEvent::OptionChosen { option_id: self.option_id.unwrap_or_default() }),
            "submit" => Some(WizardEvent::TextSubmitted { value: self.value.unwrap_or_default() }),
            "back" => Some(WizardEvent::BackRequested),
            _ => None,
        }
    }
}

async fn answer_question(
    Path(raw): Path<String>,
    State(state): State<AppState>,
    Form(form): Form<AnswerForm>,
) -> PageResult {
    let correlation_id = correlation_id();
    let Some(session_id) = parse_session_id(&raw) else {
        return Err(session_missing(&state, &raw, &correlation_id));
    };
    let Some(event) = form.into_event() else {
        let mapped = reject(
            ApplicationError::Domain(energia_core::DomainError::InvariantViolation(
                "unknown questionnaire action".to_string(),
            )),
            &correlation_id,
            "site.questionnaire.bad_action",
        );
        return Err(error_page(&state, &mapped));
    };

    let engine = state.wizard.clone();
    let applied = state
        .wizard_sessions
        .update(session_id, |current| {
            let result = engine.apply(current, &event);
            if let Ok(outcome) = &result {
                *current = outcome.to.clone();
            }
            result.map(|outcome| (outcome, current.clone())).map_err(|error| (error, current.clone()))
        })
        .await;

    match applied {
        None => Err(session_missing(&state, &raw, &correlation_id)),
        Some(Ok((outcome, wizard))) => {
            if let Some(query) = outcome.results_query() {
                info!(
                    event_name = "site.questionnaire.completed",
                    session_id = %session_id,
                    answers = wizard.profile.len(),
                    "questionnaire completed"
                );
                return Ok(Redirect::to(&format!("/riepilogo?{query}")).into_response());
            }
            Ok(Redirect::to(&format!("/questionario/{session_id}")).into_response())
        }
        Some(Err((WizardError::Validation { message, .. }, wizard))) => {
            render_question(&state, session_id, &wizard, Some(&message))
        }
        Some(Err((other, _))) => {
            let mapped = reject(other.into(), &correlation_id, "site.questionnaire.rejected");
            Err(error_page(&state, &mapped))
        }
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct OfferCard {
    id: u32,
    name: String,
    description: String,
    badge: &'static str,
    annual_price_eur: u32,
    duration_months: u32,
    features: Vec<String>,
}

impl From<&RecommendedOffer> for OfferCard {
    fn from(offer: &RecommendedOffer) -> Self {
        Self {
            id: offer.id,
            name: offer.name.clone(),
            description: offer.description.clone(),
            badge: offer.plan.badge(),
            annual_price_eur: offer.annual_price_eur,
            duration_months: offer.duration_months,
            features: offer.feature_labels(),
        }
    }
}

async fn summary_page(RawQuery(query): RawQuery, State(state): State<AppState>) -> PageResult {
    let profile = Profile::from_query(query.as_deref().unwrap_or_default());
    tokio::time::sleep(state.config.site.results_delay()).await;

    let offers: Vec<OfferCard> = state.matcher.rank(&profile).iter().map(OfferCard::from).collect();
    let highlights = profile_highlights(state.wizard.questionnaire(), &profile);
    info!(
        event_name = "site.results.rendered",
        correlation_id = %correlation_id(),
        answers = profile.len(),
        offers = offers.len(),
        "results page rendered"
    );

    let mut context = Context::new();
    context.insert("offers", &offers);
    context.insert("highlights", &highlights);
    Ok(render(&state, "summary.html", &context)?.into_response())
}

// ---------------------------------------------------------------------------
// Offer detail
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct IntervalView {
    band: String,
    price: String,
    unit: &'static str,
}

#[derive(Debug, Serialize)]
struct ComponentView {
    name: String,
    description: String,
    kind: String,
    macro_area: String,
    intervals: Vec<IntervalView>,
}

#[derive(Debug, Serialize)]
struct PaymentView {
    code: String,
    label: String,
    description: Option<String>,
}

#[derive(Debug, Serialize)]
struct OfferPageView {
    id: i64,
    name: String,
    description: String,
    market: String,
    client: String,
    pricing: &'static str,
    duration_months: u32,
    guaranteed: bool,
    single_offer: bool,
    valid_from: String,
    valid_until: String,
    components: Vec<ComponentView>,
    payment_methods: Vec<PaymentView>,
}

/// Prices use the Italian decimal comma.
fn format_price(price: rust_decimal::Decimal) -> String {
    price.normalize().to_string().replace('.', ",")
}

fn offer_page_view(view: &OfferView) -> OfferPageView {
    let detail = &view.detail;
    OfferPageView {
        id: detail.offer_id.0,
        name: detail.name.clone(),
        description: detail.description.clone(),
        market: detail.market_label().to_string(),
        client: detail.client_label().to_string(),
        pricing: detail.pricing_type.label(),
        duration_months: detail.duration_months,
        guaranteed: detail.guaranteed,
        single_offer: detail.single_offer,
        valid_from: detail.valid_from.format("%d/%m/%Y").to_string(),
        valid_until: detail.valid_until.format("%d/%m/%Y").to_string(),
        components: view
            .components
            .iter()
            .map(|component| ComponentView {
                name: component.name.clone(),
                description: component.description.clone(),
                kind: component.kind.clone(),
                macro_area: component.macro_area.clone(),
                intervals: component
                    .intervals
                    .iter()
                    .map(|interval| IntervalView {
                        band: interval.band.clone(),
                        price: format_price(interval.price),
                        unit: interval.unit.label(),
                    })
                    .collect(),
            })
            .collect(),
        payment_methods: view
            .payment_methods
            .iter()
            .map(|method| PaymentView {
                code: method.code.clone(),
                label: method.label().to_string(),
                description: method.description.clone(),
            })
            .collect(),
    }
}

async fn offer_page(Path(raw_id): Path<String>, State(state): State<AppState>) -> PageResult {
    let correlation_id = correlation_id();
    let view = load_offer(state.catalog.as_ref(), &raw_id).await.map_err(|error| {
        let mapped = reject(error.into(), &correlation_id, "site.offer.load_failed");
        error_page(&state, &mapped)
    })?;
    info!(
        event_name = "site.offer.rendered",
        correlation_id = %correlation_id,
        offer_id = %view.detail.offer_id,
        components = view.components.len(),
        "offer page rendered"
    );

    let mut context = Context::new();
    context.insert("offer", &offer_page_view(&view));
    Ok(render(&state, "offer.html", &context)?.into_response())
}
