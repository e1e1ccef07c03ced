//! Video listing and frame sequence handlers.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use framemark_models::{sort_videos, Video, VideoId};
use framemark_store::VideoLibrary;

use crate::error::ApiResult;
use crate::state::AppState;

/// List all videos in sidebar order.
pub async fn list_videos(State(state): State<AppState>) -> ApiResult<Json<Vec<Video>>> {
    let mut videos = state.library.list_videos().await?;
    sort_videos(&mut videos);
    Ok(Json(videos))
}

/// Frame sequence response.
#[derive(Serialize)]
pub struct FrameSequenceResponse {
    pub video_id: VideoId,
    pub frames: Vec<String>,
}

/// Ordered frame filenames for one video.
pub async fn get_frame_sequence(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> ApiResult<Json<FrameSequenceResponse>> {
    let video_id = VideoId::from(video_id);
    let frames = state.library.frame_sequence(&video_id).await?;
    Ok(Json(FrameSequenceResponse { video_id, frames }))
}
