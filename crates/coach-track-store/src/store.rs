use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use racing_coach_contracts::{SegmentKind, TrackSegment};
use racing_coach_reference_store::FileStorage;
use tokio::sync::RwLock;

use crate::remote::{validate_segments, RemoteTrackSource};

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect()
}

/// The degenerate fallback used when no metadata is available for a
/// track: the whole lap treated as one segment (spec §4.6).
fn degenerate_segments(track_name: &str) -> Vec<TrackSegment> {
    vec![TrackSegment {
        name: format!("{track_name}_full_lap"),
        start_fraction: 0.0,
        end_fraction: 1.0,
        kind: SegmentKind::Straight,
        description: "degenerate single-segment fallback".to_string(),
    }]
}

/// Three-tier track metadata lookup: in-memory cache, local on-disk
/// cache, optional remote source, falling soft to a single-segment
/// representation (spec §4.6).
pub struct TrackStore {
    memory: RwLock<HashMap<String, Vec<TrackSegment>>>,
    disk: FileStorage,
    remote: Option<Arc<dyn RemoteTrackSource>>,
}

impl TrackStore {
    pub async fn new(base_dir: &Path, remote: Option<Arc<dyn RemoteTrackSource>>) -> anyhow::Result<Self> {
        Ok(Self {
            memory: RwLock::new(HashMap::new()),
            disk: FileStorage::new(base_dir).await?,
            remote,
        })
    }

    pub async fn segments(&self, track_name: &str) -> Vec<TrackSegment> {
        if let Some(cached) = self.memory.read().await.get(track_name) {
            return cached.clone();
        }

        if let Some(segments) = self.load_from_disk(track_name).await {
            self.memory
                .write()
                .await
                .insert(track_name.to_string(), segments.clone());
            return segments;
        }

        if let Some(segments) = self.fetch_from_remote(track_name).await {
            return segments;
        }

        let segments = degenerate_segments(track_name);
        self.memory
            .write()
            .await
            .insert(track_name.to_string(), segments.clone());
        segments
    }

    async fn load_from_disk(&self, track_name: &str) -> Option<Vec<TrackSegment>> {
        let path = self.disk.base_dir().join(format!("{}.json", sanitize(track_name)));
        let content = self.disk.read_to_string_opt(&path).await.ok()??;

        match serde_json::from_str::<Vec<TrackSegment>>(&content) {
            Ok(segments) if validate_segments(&segments).is_ok() => Some(segments),
            _ => {
                tracing::warn!(track = %track_name, "quarantining corrupt track metadata file");
                let _ = self.disk.quarantine(&path).await;
                None
            }
        }
    }

    async fn fetch_from_remote(&self, track_name: &str) -> Option<Vec<TrackSegment>> {
        let remote = self.remote.as_ref()?;
        let segments = match remote.fetch_segments(track_name).await {
            Ok(segments) => segments,
            Err(err) => {
                tracing::warn!(track = %track_name, %err, "remote track metadata source failed");
                return None;
            }
        };

        if let Err(reason) = validate_segments(&segments) {
            tracing::warn!(track = %track_name, %reason, "remote track metadata failed validation");
            return None;
        }

        let path = self.disk.base_dir().join(format!("{}.json", sanitize(track_name)));
        if let Ok(content) = serde_json::to_string_pretty(&segments) {
            let _ = self.disk.write_atomic(&path, &content).await;
        }
        self.memory
            .write()
            .await
            .insert(track_name.to_string(), segments.clone());

        Some(segments)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct StaticRemote(Vec<TrackSegment>);

    #[async_trait]
    impl RemoteTrackSource for StaticRemote {
        async fn fetch_segments(&self, _track_name: &str) -> anyhow::Result<Vec<TrackSegment>> {
            Ok(self.0.clone())
        }
    }

    struct FailingRemote;

    #[async_trait]
    impl RemoteTrackSource for FailingRemote {
        async fn fetch_segments(&self, _track_name: &str) -> anyhow::Result<Vec<TrackSegment>> {
            Err(anyhow::anyhow!("unreachable"))
        }
    }

    fn segment(name: &str) -> TrackSegment {
        TrackSegment {
            name: name.to_string(),
            start_fraction: 0.0,
            end_fraction: 0.2,
            kind: SegmentKind::Corner,
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn no_metadata_falls_back_to_degenerate_segment() {
        let dir = tempfile::tempdir().unwrap();
        let store = TrackStore::new(dir.path(), None).await.unwrap();
        let segments = store.segments("unknown_track").await;
        assert_eq!(segments.len(), 1);
        assert!((segments[0].start_fraction - 0.0).abs() < f32::EPSILON);
        assert!((segments[0].end_fraction - 1.0).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn remote_result_is_cached_to_disk_and_memory() {
        let dir = tempfile::tempdir().unwrap();
        let remote: Arc<dyn RemoteTrackSource> = Arc::new(StaticRemote(vec![segment("turn_1")]));
        let store = TrackStore::new(dir.path(), Some(remote)).await.unwrap();

        let first = store.segments("monza").await;
        assert_eq!(first.len(), 1);

        let cached_path = dir.path().join("monza.json");
        assert!(cached_path.exists());
    }

    #[tokio::test]
    async fn failing_remote_falls_back_to_degenerate_segment() {
        let dir = tempfile::tempdir().unwrap();
        let remote: Arc<dyn RemoteTrackSource> = Arc::new(FailingRemote);
        let store = TrackStore::new(dir.path(), Some(remote)).await.unwrap();

        let segments = store.segments("spa").await;
        assert_eq!(segments.len(), 1);
    }
}
