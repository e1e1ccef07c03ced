//! Filesystem-backed storage.
//!
//! Layout:
//! - `{frames_dir}/{video_id}/*.jpg` — one directory per video, frame
//!   order is filename order
//! - `{annotations_dir}/{video_id}.json` — one record per video
//!
//! Saves write the full record to a `.tmp` sibling and rename it into
//! place, so a crashed save never leaves a truncated record behind.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info};

use framemark_models::{AnnotationRecord, Video, VideoId, VideoStatus};

use crate::error::{StoreError, StoreResult};
use crate::traits::{AnnotationStore, FrameSource, VideoLibrary};

/// Frame image extension the library recognizes.
const FRAME_EXTENSION: &str = ".jpg";

/// Filesystem video library and annotation store.
#[derive(Debug, Clone)]
pub struct FsLibrary {
    frames_dir: PathBuf,
    annotations_dir: PathBuf,
}

impl FsLibrary {
    /// Open a library rooted at `frames_dir`.
    ///
    /// The frames directory must exist; the annotations directory is
    /// created if missing.
    pub fn new(frames_dir: impl Into<PathBuf>, annotations_dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let frames_dir = frames_dir.into();
        let annotations_dir = annotations_dir.into();

        if !frames_dir.is_dir() {
            return Err(StoreError::config_error(format!(
                "frames directory not found: {}",
                frames_dir.display()
            )));
        }
        std::fs::create_dir_all(&annotations_dir)?;

        Ok(Self {
            frames_dir,
            annotations_dir,
        })
    }

    pub fn frames_dir(&self) -> &Path {
        &self.frames_dir
    }

    pub fn annotations_dir(&self) -> &Path {
        &self.annotations_dir
    }

    fn video_dir(&self, video_id: &VideoId) -> StoreResult<PathBuf> {
        validate_component(video_id.as_str())?;
        Ok(self.frames_dir.join(video_id.as_str()))
    }

    fn annotation_path(&self, video_id: &VideoId) -> StoreResult<PathBuf> {
        validate_component(video_id.as_str())?;
        Ok(self.annotations_dir.join(format!("{}.json", video_id)))
    }

    /// Sorted frame filenames within one video directory.
    async fn scan_frames(&self, dir: &Path) -> StoreResult<Vec<String>> {
        let mut frames = Vec::new();
        let mut entries = tokio::fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(FRAME_EXTENSION) {
                frames.push(name);
            }
        }
        frames.sort();
        Ok(frames)
    }
}

#[async_trait]
impl VideoLibrary for FsLibrary {
    async fn list_videos(&self) -> StoreResult<Vec<Video>> {
        let mut videos = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.frames_dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let id = VideoId::from_string(entry.file_name().to_string_lossy().into_owned());
            let frames = self.scan_frames(&entry.path()).await?;

            let mut record = self.load(&id).await?;
            record.normalize_legacy_status();

            videos.push(Video {
                frame_count: frames.len(),
                selected_count: record.selected_frames.len(),
                annotated: record.is_annotated(),
                completed: record.status == Some(VideoStatus::Done),
                status: record.status,
                difficulty: record.difficulty,
                id,
            });
        }

        debug!(count = videos.len(), "Listed videos");
        Ok(videos)
    }

    async fn frame_sequence(&self, video_id: &VideoId) -> StoreResult<Vec<String>> {
        let dir = self.video_dir(video_id)?;
        if !dir.is_dir() {
            return Err(StoreError::video_not_found(video_id.as_str()));
        }
        self.scan_frames(&dir).await
    }
}

#[async_trait]
impl AnnotationStore for FsLibrary {
    async fn load(&self, video_id: &VideoId) -> StoreResult<AnnotationRecord> {
        let path = self.annotation_path(video_id)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let record: AnnotationRecord = serde_json::from_slice(&bytes)?;
                Ok(record)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(AnnotationRecord::empty(video_id.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, video_id: &VideoId, record: &AnnotationRecord) -> StoreResult<()> {
        let path = self.annotation_path(video_id)?;

        let mut stamped = record.clone();
        stamped.video_id = video_id.clone();
        stamped.last_modified = Some(Utc::now());

        let json = serde_json::to_vec_pretty(&stamped)?;

        let tmp_path = path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, &json).await?;
        tokio::fs::rename(&tmp_path, &path).await?;

        info!(
            video_id = %video_id,
            selected = stamped.selected_frames.len(),
            "Saved annotation record"
        );
        Ok(())
    }
}

#[async_trait]
impl FrameSource for FsLibrary {
    async fn load_frame(&self, video_id: &VideoId, frame_id: &str) -> StoreResult<Vec<u8>> {
        validate_component(frame_id)?;
        let path = self.video_dir(video_id)?.join(frame_id);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::frame_not_found(format!("{}/{}", video_id, frame_id)))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Reject identifiers that could escape the library root.
fn validate_component(s: &str) -> StoreResult<()> {
    if s.is_empty() || s == "." || s == ".." || s.contains('/') || s.contains('\\') {
        return Err(StoreError::invalid_id(s));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use framemark_models::{HistoryAction, VideoStatus};
    use tempfile::TempDir;

    fn library_with(videos: &[(&str, usize)]) -> (TempDir, FsLibrary) {
        let root = TempDir::new().unwrap();
        let frames_dir = root.path().join("frames");
        std::fs::create_dir(&frames_dir).unwrap();
        for (id, count) in videos {
            let dir = frames_dir.join(id);
            std::fs::create_dir(&dir).unwrap();
            for i in 0..*count {
                std::fs::write(dir.join(format!("frame_{:06}.jpg", i)), b"jpeg").unwrap();
            }
            // Non-frame files are ignored by the scan
            std::fs::write(dir.join("notes.txt"), b"ignored").unwrap();
        }
        let library = FsLibrary::new(&frames_dir, root.path().join("annotations")).unwrap();
        (root, library)
    }

    #[tokio::test]
    async fn test_list_videos_counts_and_flags() {
        let (_root, library) = library_with(&[("vid_a", 3), ("vid_b", 2)]);

        let mut record = AnnotationRecord::empty(VideoId::from("vid_a"));
        record.selected_frames.push("frame_000001".to_string());
        library.save(&VideoId::from("vid_a"), &record).await.unwrap();

        let mut videos = library.list_videos().await.unwrap();
        videos.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));

        assert_eq!(videos.len(), 2);
        assert_eq!(videos[0].frame_count, 3);
        assert_eq!(videos[0].selected_count, 1);
        assert!(videos[0].annotated);
        assert!(!videos[1].annotated);
    }

    #[tokio::test]
    async fn test_frame_sequence_sorted_and_filtered() {
        let (_root, library) = library_with(&[("vid_a", 3)]);
        let frames = library.frame_sequence(&VideoId::from("vid_a")).await.unwrap();
        assert_eq!(
            frames,
            vec!["frame_000000.jpg", "frame_000001.jpg", "frame_000002.jpg"]
        );
    }

    #[tokio::test]
    async fn test_frame_sequence_unknown_video() {
        let (_root, library) = library_with(&[]);
        let err = library
            .frame_sequence(&VideoId::from("missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::VideoNotFound(_)));
    }

    #[tokio::test]
    async fn test_load_defaults_when_absent() {
        let (_root, library) = library_with(&[("vid_a", 1)]);
        let record = library.load(&VideoId::from("vid_a")).await.unwrap();
        assert!(record.selected_frames.is_empty());
        assert!(record.history.is_empty());
        assert_eq!(record.status, None);
    }

    #[tokio::test]
    async fn test_save_roundtrip_stamps_and_cleans_up() {
        let (_root, library) = library_with(&[("vid_a", 1)]);
        let id = VideoId::from("vid_a");

        let mut record = AnnotationRecord::empty(id.clone());
        record.selected_frames.push("frame_000000".to_string());
        record.push_history(HistoryAction::Select {
            frame: "frame_000000".to_string(),
        });
        record.status = Some(VideoStatus::Review);

        library.save(&id, &record).await.unwrap();

        let loaded = library.load(&id).await.unwrap();
        assert_eq!(loaded.selected_frames, record.selected_frames);
        assert_eq!(loaded.history.len(), 1);
        assert_eq!(loaded.status, Some(VideoStatus::Review));
        assert!(loaded.last_modified.is_some());

        // Atomic write leaves no temp file behind
        let leftovers: Vec<_> = std::fs::read_dir(library.annotations_dir())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn test_load_frame_bytes() {
        let (_root, library) = library_with(&[("vid_a", 1)]);
        let bytes = library
            .load_frame(&VideoId::from("vid_a"), "frame_000000.jpg")
            .await
            .unwrap();
        assert_eq!(bytes, b"jpeg");

        let err = library
            .load_frame(&VideoId::from("vid_a"), "frame_999999.jpg")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::FrameNotFound(_)));
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let (_root, library) = library_with(&[("vid_a", 1)]);
        let err = library
            .load_frame(&VideoId::from("vid_a"), "../secret")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidId(_)));

        let err = library.load(&VideoId::from("../vid_a")).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidId(_)));
    }
}
