//! Annotation record handlers.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use framemark_models::{AnnotationRecord, VideoId};
use framemark_store::AnnotationStore;

use crate::error::ApiResult;
use crate::state::AppState;

/// Current annotation record for a video; an empty record if none was
/// saved yet. Legacy records are normalized before they go out.
pub async fn get_annotation(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> ApiResult<Json<AnnotationRecord>> {
    let video_id = VideoId::from(video_id);
    let mut record = state.library.load(&video_id).await?;
    record.normalize_legacy_status();
    Ok(Json(record))
}

/// Save response.
#[derive(Serialize)]
pub struct SaveResponse {
    pub success: bool,
}

/// Full-record upsert. The path is authoritative for the video id; the
/// store stamps `last_modified`.
pub async fn save_annotation(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    Json(record): Json<AnnotationRecord>,
) -> ApiResult<Json<SaveResponse>> {
    let video_id = VideoId::from(video_id);
    state.library.save(&video_id, &record).await?;
    Ok(Json(SaveResponse { success: true }))
}
