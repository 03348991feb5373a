use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::Html,
};
use minijinja::{context, Environment};
use once_cell::sync::Lazy;
use tracing::{error, info_span, Instrument};
use uuid::Uuid;

use crate::{
    config::CREDENTIAL_VAR,
    web::{
        types::{ExampleResponse, ReplyRequest, ReplyResponse, StatusResponse},
        AppState,
    },
};

const INDEX_TEMPLATE: &str = "index.html";

static PAGES: Lazy<Environment<'static>> = Lazy::new(|| {
    let mut env = Environment::new();
    env.add_template(
        INDEX_TEMPLATE,
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/index.html")),
    )
    .expect("invalid index template");
    env
});

pub async fn index(State(state): State<AppState>) -> Result<Html<String>, StatusCode> {
    let connector = state.reviews.connector();
    PAGES
        .get_template(INDEX_TEMPLATE)
        .and_then(|tpl| {
            tpl.render(context! {
                configured => connector.is_configured(),
                model => connector.active_model_id(),
                credential_var => CREDENTIAL_VAR,
            })
        })
        .map(Html)
        .map_err(|err| {
            error!("failed to render index page: {err}");
            StatusCode::INTERNAL_SERVER_ERROR
        })
}

pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let connector = state.reviews.connector();
    Json(StatusResponse {
        configured: connector.is_configured(),
        model: connector.active_model_id().map(str::to_string),
    })
}

pub async fn example(State(state): State<AppState>) -> Json<ExampleResponse> {
    Json(ExampleResponse {
        review: state.reviews.example(),
    })
}

pub async fn reply(
    State(state): State<AppState>,
    Json(req): Json<ReplyRequest>,
) -> Json<ReplyResponse> {
    let span = info_span!("reply", request_id = %Uuid::new_v4());
    let out = state.reviews.process(&req.review).instrument(span).await;

    Json(ReplyResponse {
        sentiment: out.status,
        reply: out.reply,
    })
}
