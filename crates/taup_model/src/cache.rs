//! Serialization cache (C12): a bincode snapshot of the conversions, both
//! wave types' model samples, branch inputs, and up-going tables, keyed by
//! model identity and invalidated by source file timestamps.
//!
//! Locking uses no new dependency: a sentinel `.lock` file created with
//! `OpenOptions::create_new` stands in for an exclusive write lock; readers
//! do not lock (the blob is replaced atomically by a rename in
//! [`write_snapshot`], so a reader either sees the old file or the new one,
//! never a partial write).

use crate::branch::BranchInput;
use crate::error::ModelError;
use crate::phases::PhaseExtras;
use crate::upgoing::UpGoingTable;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Plain-data mirror of [`taup_tables::ModelConversions`] so this crate's
/// snapshot format doesn't require `taup_tables` to depend on serde.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConversionsSnapshot {
    pub radius_km: f64,
    pub reference_velocity_km_s: f64,
}

impl From<taup_tables::ModelConversions> for ConversionsSnapshot {
    fn from(c: taup_tables::ModelConversions) -> Self {
        Self { radius_km: c.radius_km(), reference_velocity_km_s: c.reference_velocity_km_s() }
    }
}

impl From<ConversionsSnapshot> for taup_tables::ModelConversions {
    fn from(s: ConversionsSnapshot) -> Self {
        taup_tables::ModelConversions::new(s.radius_km, s.reference_velocity_km_s)
    }
}

/// Everything C11 needs to reconstruct a model without re-reading source
/// tables: C1 conversions, C6 branch inputs, and C5 up-going tables for
/// both wave types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSnapshot {
    pub format_version: u32,
    pub conversions: ConversionsSnapshot,
    pub p_samples: Vec<crate::earth_model::ModelSample>,
    pub s_samples: Vec<crate::earth_model::ModelSample>,
    pub branches: Vec<BranchInput>,
    pub p_upgoing: UpGoingTable,
    pub s_upgoing: UpGoingTable,
}

/// Current snapshot format version. Bumped whenever the shape of
/// [`ModelSnapshot`] changes; a mismatch is a [`ModelError::SerializationMismatch`],
/// not a fatal error, since the caller falls back to rebuilding from source.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Read a cached snapshot if it exists, is newer than every file in
/// `dependencies`, and has a matching format version. Returns `Ok(None)`
/// on any of those misses so the caller rebuilds from source silently.
pub fn read_snapshot(
    snapshot_path: &Path,
    dependencies: &[PathBuf],
) -> Result<Option<ModelSnapshot>, ModelError> {
    let snapshot_meta = match fs::metadata(snapshot_path) {
        Ok(meta) => meta,
        Err(_) => return Ok(None),
    };
    let snapshot_mtime = snapshot_meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);

    for dep in dependencies {
        let dep_mtime = fs::metadata(dep)?.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        if dep_mtime > snapshot_mtime {
            return Ok(None);
        }
    }

    let bytes = fs::read(snapshot_path)?;
    let snapshot: ModelSnapshot = match bincode::deserialize(&bytes) {
        Ok(s) => s,
        Err(e) => {
            log::warn!("model cache snapshot unreadable, rebuilding: {e}");
            return Ok(None);
        }
    };
    if snapshot.format_version != SNAPSHOT_FORMAT_VERSION {
        log::warn!(
            "model cache snapshot format {} != current {}, rebuilding",
            snapshot.format_version,
            SNAPSHOT_FORMAT_VERSION
        );
        return Ok(None);
    }
    Ok(Some(snapshot))
}

/// Write `snapshot` to `snapshot_path` under an exclusive lock, replacing
/// any existing file. The write goes to a temp file in the same directory
/// and is renamed into place so concurrent readers never observe a partial
/// write.
pub fn write_snapshot(snapshot_path: &Path, snapshot: &ModelSnapshot) -> Result<(), ModelError> {
    let lock = acquire_exclusive_lock(snapshot_path)?;
    let result = (|| {
        let bytes = bincode::serialize(snapshot)
            .map_err(|e| ModelError::ModelReadFailure(format!("snapshot encode failed: {e}")))?;
        let tmp_path = snapshot_path.with_extension("tmp");
        {
            let mut tmp = File::create(&tmp_path)?;
            tmp.write_all(&bytes)?;
            tmp.sync_all()?;
        }
        fs::rename(&tmp_path, snapshot_path)?;
        Ok(())
    })();
    drop(lock);
    result
}

/// Read a serialized phase-extras blob alongside a model snapshot, used
/// when a loader's `read_stats` flag is set. A missing or corrupt blob is a
/// miss (`Ok(None)`), not an error, since phase extras are optional
/// enrichment a session can run without.
pub fn read_extras(path: &Path) -> Result<Option<PhaseExtras>, ModelError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(_) => return Ok(None),
    };
    match bincode::deserialize(&bytes) {
        Ok(extras) => Ok(Some(extras)),
        Err(e) => {
            log::warn!("phase extras blob at {} unreadable, ignoring: {e}", path.display());
            Ok(None)
        }
    }
}

/// An advisory exclusive lock held via a sentinel `.lock` file, removed
/// when dropped.
struct ExclusiveLock {
    path: PathBuf,
}

impl Drop for ExclusiveLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

fn acquire_exclusive_lock(snapshot_path: &Path) -> Result<ExclusiveLock, ModelError> {
    let lock_path = snapshot_path.with_extension("lock");
    match OpenOptions::new().write(true).create_new(true).open(&lock_path) {
        Ok(_) => Ok(ExclusiveLock { path: lock_path }),
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Err(ModelError::ModelReadFailure(
            format!("model cache is locked for writing: {}", lock_path.display()),
        )),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::branch::WaveType;
    use crate::earth_model::ModelSample;
    use tempfile::tempdir;

    fn sample_snapshot() -> ModelSnapshot {
        ModelSnapshot {
            format_version: SNAPSHOT_FORMAT_VERSION,
            conversions: ConversionsSnapshot { radius_km: 6371.0, reference_velocity_km_s: 4.5 },
            p_samples: vec![ModelSample { z_flat: 0.0, p: 10.0, upgoing_index: Some(0) }],
            s_samples: vec![ModelSample { z_flat: 0.0, p: 18.0, upgoing_index: Some(0) }],
            branches: vec![BranchInput::from_legacy_tables(
                "P".into(),
                "P".into(),
                vec![WaveType::P],
                1,
                1,
                vec![0.8, 0.6, 0.4],
                vec![600.0, 480.0, 340.0],
                5.0,
                95.0,
            )],
            p_upgoing: UpGoingTable::new(vec![0.8, 0.6], vec![0.0, 4.0], vec![]).unwrap(),
            s_upgoing: UpGoingTable::new(vec![0.8, 0.6], vec![0.0, 4.0], vec![]).unwrap(),
        }
    }

    #[test]
    fn writes_and_reads_back_a_snapshot() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("model.hed");
        fs::write(&source, b"source").unwrap();
        let snapshot_path = dir.path().join("model.cache");

        let snapshot = sample_snapshot();
        write_snapshot(&snapshot_path, &snapshot).unwrap();

        let loaded = read_snapshot(&snapshot_path, &[source]).unwrap().unwrap();
        assert_eq!(loaded, snapshot);
    }

    #[test]
    fn stale_snapshot_is_reported_as_a_miss() {
        let dir = tempdir().unwrap();
        let snapshot_path = dir.path().join("model.cache");
        write_snapshot(&snapshot_path, &sample_snapshot()).unwrap();

        std::thread::sleep(std::time::Duration::from_millis(10));
        let source = dir.path().join("model.hed");
        fs::write(&source, b"newer source").unwrap();

        let result = read_snapshot(&snapshot_path, &[source]).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn missing_snapshot_is_a_miss_not_an_error() {
        let dir = tempdir().unwrap();
        let snapshot_path = dir.path().join("absent.cache");
        let result = read_snapshot(&snapshot_path, &[]).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn missing_extras_blob_is_a_miss_not_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.extras");
        assert!(read_extras(&path).unwrap().is_none());
    }

    #[test]
    fn reads_back_a_written_extras_blob() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.extras");
        let extras = PhaseExtras::default();
        fs::write(&path, bincode::serialize(&extras).unwrap()).unwrap();
        assert_eq!(read_extras(&path).unwrap(), Some(extras));
    }
}
