use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::record::SessionRecord;
use racing_coach_reference_store::FileStorage;

/// Best-effort remote upload of an exported session record. Its absence
/// (or failure) must never block shutdown (spec §4.17).
#[async_trait]
pub trait SessionUploader: Send + Sync {
    async fn upload(&self, path: &Path) -> Result<()>;
}

/// Writes `SessionRecord`s to disk with the same atomic-write discipline
/// as the Reference Lap Store, then hands off to an optional uploader.
pub struct HistoryExporter {
    storage: FileStorage,
    uploader: Option<Arc<dyn SessionUploader>>,
}

impl HistoryExporter {
    pub async fn new(base_dir: &Path, uploader: Option<Arc<dyn SessionUploader>>) -> Result<Self> {
        Ok(Self {
            storage: FileStorage::new(base_dir).await?,
            uploader,
        })
    }

    /// Persists the record and, if an uploader is configured, attempts a
    /// best-effort upload. Upload failure is logged, never propagated.
    pub async fn export(&self, record: &SessionRecord) -> Result<()> {
        let path = self.storage.base_dir().join(format!("{}.json", record.session_id));
        let content = serde_json::to_string_pretty(record)?;
        self.storage.write_atomic(&path, &content).await?;

        if let Some(uploader) = &self.uploader {
            if let Err(err) = uploader.upload(&path).await {
                tracing::warn!(%err, session_id = %record.session_id, "session upload failed, keeping local copy");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use racing_coach_contracts::{SessionDescriptor, SessionKind};
    use racing_coach_mistake_tracker::SessionSummary;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn descriptor() -> SessionDescriptor {
        SessionDescriptor {
            track_display_name: "Spa".into(),
            track_config_name: "spa_gp".into(),
            car_screen_name: "gt3".into(),
            driver_identity: "driver1".into(),
            session_kind: SessionKind::Practice,
            weather: "clear".into(),
            session_start_timestamp_s: 0.0,
        }
    }

    struct FailingUploader;

    #[async_trait]
    impl SessionUploader for FailingUploader {
        async fn upload(&self, _path: &Path) -> Result<()> {
            anyhow::bail!("network unreachable")
        }
    }

    struct RecordingUploader {
        called: Arc<AtomicBool>,
    }

    #[async_trait]
    impl SessionUploader for RecordingUploader {
        async fn upload(&self, _path: &Path) -> Result<()> {
            self.called.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn export_writes_a_readable_record() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = HistoryExporter::new(dir.path(), None).await.unwrap();
        let record = SessionRecord::new(
            "session-1",
            descriptor(),
            Vec::new(),
            HashMap::new(),
            SessionSummary::default(),
        );
        exporter.export(&record).await.unwrap();

        let path = dir.path().join("session-1.json");
        assert!(path.exists());
    }

    #[tokio::test]
    async fn failed_upload_does_not_fail_export() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = HistoryExporter::new(dir.path(), Some(Arc::new(FailingUploader))).await.unwrap();
        let record = SessionRecord::new(
            "session-2",
            descriptor(),
            Vec::new(),
            HashMap::new(),
            SessionSummary::default(),
        );
        assert!(exporter.export(&record).await.is_ok());
    }

    #[tokio::test]
    async fn uploader_is_invoked_when_configured() {
        let dir = tempfile::tempdir().unwrap();
        let called = Arc::new(AtomicBool::new(false));
        let exporter = HistoryExporter::new(
            dir.path(),
            Some(Arc::new(RecordingUploader { called: called.clone() })),
        )
        .await
        .unwrap();
        let record = SessionRecord::new(
            "session-3",
            descriptor(),
            Vec::new(),
            HashMap::new(),
            SessionSummary::default(),
        );
        exporter.export(&record).await.unwrap();
        assert!(called.load(Ordering::SeqCst));
    }
}
