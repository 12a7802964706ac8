//! Handlers for `/export`. Responses are file attachments, not JSON
//! envelopes; errors still use the standard error envelope.

use axum::extract::{Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};

use crate::error::AppResult;
use crate::query::{parse_id_list, ExportBibleParams, ExportChaptersParams};
use crate::services::export::ExportedFile;
use crate::services::ExportService;
use crate::state::AppState;

const DEFAULT_CHAPTER_FORMAT: &str = "markdown";
const DEFAULT_BIBLE_FORMAT: &str = "markdown";

impl IntoResponse for ExportedFile {
    fn into_response(self) -> Response {
        let disposition = format!("attachment; filename=\"{}\"", self.filename);
        (
            [
                (CONTENT_TYPE, self.content_type.to_string()),
                (CONTENT_DISPOSITION, disposition),
            ],
            self.bytes,
        )
            .into_response()
    }
}

/// GET /api/v1/export/chapters?format=&volume_id=&ids=1,2
///
/// `ids` takes priority over `volume_id`; with neither, every chapter is
/// exported in reading order.
pub async fn export_chapters(
    State(state): State<AppState>,
    Query(params): Query<ExportChaptersParams>,
) -> AppResult<ExportedFile> {
    let ids = match params.ids.as_deref() {
        Some(raw) => parse_id_list(raw)?,
        None => Vec::new(),
    };
    let format = params.format.as_deref().unwrap_or(DEFAULT_CHAPTER_FORMAT);

    ExportService::new(&state.pool)
        .export_chapters(format, params.volume_id, &ids)
        .await
}

/// GET /api/v1/export/bible?format=markdown|json
pub async fn export_bible(
    State(state): State<AppState>,
    Query(params): Query<ExportBibleParams>,
) -> AppResult<ExportedFile> {
    let format = params.format.as_deref().unwrap_or(DEFAULT_BIBLE_FORMAT);
    ExportService::new(&state.pool).export_bible(format).await
}
