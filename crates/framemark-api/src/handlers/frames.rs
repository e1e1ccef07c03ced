//! Frame image handler.

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};

use framemark_models::VideoId;
use framemark_store::FrameSource;

use crate::error::ApiResult;
use crate::state::AppState;

/// Raw image bytes for one frame.
pub async fn get_frame(
    State(state): State<AppState>,
    Path((video_id, frame_id)): Path<(String, String)>,
) -> ApiResult<Response> {
    let bytes = state
        .library
        .load_frame(&VideoId::from(video_id), &frame_id)
        .await?;

    Ok((
        [
            (header::CONTENT_TYPE, "image/jpeg"),
            (header::CACHE_CONTROL, "public, max-age=3600"),
        ],
        bytes,
    )
        .into_response())
}
