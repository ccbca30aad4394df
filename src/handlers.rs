use crate::controller::{LookupOutcome, LookupPayController, PaymentOutcome};
use crate::errors::PortalError;
use crate::models::{LookupForm, ViewState};
use crate::page;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

/// Shared application state.
pub struct AppState {
    /// The single Lookup-and-Pay controller behind the portal page.
    pub controller: LookupPayController,
}

/// Builds the portal router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/", get(portal_page))
        .route("/estado", get(view_state))
        .route("/buscar", post(lookup))
        .route("/pagar", post(pay))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                // The only body the portal accepts is the one-field lookup form
                .layer(RequestBodyLimitLayer::new(16 * 1024)),
        )
}

/// GET /health
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "rust-tax-portal",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

fn render(status: StatusCode, view: &ViewState) -> Response {
    (status, Html(page::render(view))).into_response()
}

/// 409 page for a request turned away by the in-flight guard. The state is
/// rendered as it is; the busy notice is not stored in it.
fn render_busy(view: &ViewState) -> Response {
    let notice = PortalError::Busy.user_message();
    (
        StatusCode::CONFLICT,
        Html(page::render_with_notice(view, Some(notice))),
    )
        .into_response()
}

/// GET /
pub async fn portal_page(State(state): State<Arc<AppState>>) -> Response {
    render(StatusCode::OK, &state.controller.view())
}

/// GET /estado
///
/// Current view state as JSON.
pub async fn view_state(State(state): State<Arc<AppState>>) -> Json<ViewState> {
    Json(state.controller.view())
}

/// POST /buscar
///
/// Runs a lookup for the submitted ID and renders the resulting page.
/// The ID is forwarded as typed; there is no format validation.
pub async fn lookup(State(state): State<Arc<AppState>>, Form(form): Form<LookupForm>) -> Response {
    tracing::info!("POST /buscar - dni: {}", form.dni);

    state.controller.set_input(form.dni.clone());
    match state.controller.lookup(&form.dni).await {
        LookupOutcome::Rejected => render_busy(&state.controller.view()),
        LookupOutcome::Found | LookupOutcome::Failed => {
            render(StatusCode::OK, &state.controller.view())
        }
    }
}

/// POST /pagar
///
/// Initiates payment for the loaded taxpayer. A payment link answers with
/// `303 See Other` so the browser leaves the portal for the processor.
pub async fn pay(State(state): State<Arc<AppState>>) -> Response {
    tracing::info!("POST /pagar");

    match state.controller.initiate_payment().await {
        PaymentOutcome::Navigate(link) => Redirect::to(&link).into_response(),
        PaymentOutcome::Rejected => render_busy(&state.controller.view()),
        PaymentOutcome::Failed | PaymentOutcome::Skipped => {
            render(StatusCode::OK, &state.controller.view())
        }
    }
}
