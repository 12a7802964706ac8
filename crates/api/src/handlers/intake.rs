//! Handlers for `/intake`: stream a decomposition of free prose, then
//! commit the drafts the author accepted.

use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use futures::{Stream, StreamExt};
use lorekeeper_core::intake::{CommitReport, CommitRequest};
use serde::Deserialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::services::IntakeService;
use crate::state::AppState;

/// Body of `POST /intake/decompose`.
#[derive(Debug, Deserialize)]
pub struct DecomposeRequest {
    pub text: String,
    /// Free-form guidance appended to the prompt ("focus on the villains").
    #[serde(default)]
    pub hints: Option<String>,
}

/// POST /api/v1/intake/decompose
///
/// Server-sent events, in order:
///
/// ```text
/// event: chunk    {"text": "..."}      zero or more raw model deltas
/// event: result   CommitRequest        drafts annotated with merge targets
/// event: error    {"message": "..."}   instead of result on failure
/// event: done     {}
/// ```
///
/// Empty or oversized text answers 400 and a missing model 503, both
/// before the stream opens.
pub async fn decompose(
    State(state): State<AppState>,
    Json(input): Json<DecomposeRequest>,
) -> AppResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let stream =
        IntakeService::from_state(&state).decompose(&input.text, input.hints.as_deref())?;

    let events = stream.map(|event| {
        Ok::<_, Infallible>(
            Event::default()
                .event(event.name())
                .data(event.data().to_string()),
        )
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

/// POST /api/v1/intake/commit
///
/// Always 200 once the body parses; per-item failures are listed in
/// `errors` of the report.
pub async fn commit(
    State(state): State<AppState>,
    Json(request): Json<CommitRequest>,
) -> AppResult<Json<DataResponse<CommitReport>>> {
    let report = IntakeService::from_state(&state).commit(request).await?;
    Ok(Json(DataResponse::new(report)))
}
