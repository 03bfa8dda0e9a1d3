use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use racing_coach_contracts::{ReferenceLap, ReferenceRole};

use crate::storage::FileStorage;

/// Reference Lap Store (spec §4.5): one file per (track, car), holding
/// every role's `ReferenceLap` as a JSON map.
pub struct ReferenceStore {
    storage: FileStorage,
}

impl ReferenceStore {
    pub async fn new(base_dir: &Path) -> Result<Self> {
        Ok(Self {
            storage: FileStorage::new(base_dir).await?,
        })
    }

    /// Loads every role's reference for (track, car). Missing files yield
    /// an empty map; corrupt files are quarantined and also yield an
    /// empty map (spec §4.5).
    pub async fn load(&self, track: &str, car: &str) -> Result<HashMap<ReferenceRole, ReferenceLap>> {
        let path = self.path_for(track, car);
        let Some(content) = self.storage.read_to_string_opt(&path).await? else {
            return Ok(HashMap::new());
        };

        match serde_json::from_str::<HashMap<ReferenceRole, ReferenceLap>>(&content) {
            Ok(map) => Ok(map),
            Err(err) => {
                tracing::warn!(?path, %err, "quarantining corrupt reference file");
                self.storage.quarantine(&path).await?;
                Ok(HashMap::new())
            }
        }
    }

    /// Writes one role's reference atomically, read-modify-write against
    /// whatever else is already stored for this (track, car).
    pub async fn save(&self, track: &str, car: &str, role: ReferenceRole, reference: ReferenceLap) -> Result<()> {
        let mut map = self.load(track, car).await?;
        map.insert(role, reference);

        let path = self.path_for(track, car);
        let content = serde_json::to_string_pretty(&map)?;
        self.storage.write_atomic(&path, &content).await
    }

    /// Lists every (track, car) pair with a reference file on disk.
    pub async fn list(&self) -> Result<Vec<(String, String)>> {
        let files = self.storage.list_json_files().await?;
        Ok(files
            .into_iter()
            .filter_map(|path| track_car_from_filename(&path))
            .collect())
    }

    fn path_for(&self, track: &str, car: &str) -> PathBuf {
        self.storage
            .base_dir()
            .join(format!("{}__{}.json", sanitize(track), sanitize(car)))
    }
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect()
}

fn track_car_from_filename(path: &Path) -> Option<(String, String)> {
    let stem = path.file_stem()?.to_str()?;
    let (track, car) = stem.split_once("__")?;
    Some((track.to_string(), car.to_string()))
}
