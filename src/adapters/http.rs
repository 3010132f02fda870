use {
    crate::{
        AppState,
        adapters::api_errors::ApiError,
        domain::{error::PipelineError, outcome::Outcome, request::DebitRequest},
    },
    axum::{
        Json, Router,
        extract::{DefaultBodyLimit, State},
        routing::{get, post},
    },
};

const MAX_BODY_BYTES: usize = 64 * 1024;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "ok" }))
        .route("/cashin", post(cashin_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

/// Runs one cash-in to completion and answers with the outcome.
///
/// The invocation runs on its own task: if the caller goes away the response
/// is dropped, but polling and notification still finish.
pub async fn cashin_handler(
    State(state): State<AppState>,
    Json(request): Json<DebitRequest>,
) -> Result<Json<Outcome>, ApiError> {
    let processor = state.processor.clone();
    let shutdown = state.shutdown.clone();
    let invocation =
        tokio::spawn(async move { processor.handle_until(request, shutdown).await });

    let outcome = invocation.await.map_err(PipelineError::from)??;
    Ok(Json(outcome))
}
