//! Model loading (§6 `open`): resolves a cached model snapshot and its
//! optional phase-extras blob for a named model, without re-reading any
//! legacy source table — producing the snapshot from source tables is the
//! table generator's job, an external collaborator this engine only
//! consumes the output of.

use crate::error::EngineError;
use std::path::{Path, PathBuf};
use taup_model::{Model, ModelError, PhaseExtras, Tolerances};

/// Which optional auxiliary data a loader should also resolve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpenFlags {
    pub read_stats: bool,
    pub read_ellipticity: bool,
    pub read_topography: bool,
}

/// Open `model_name` from its cached snapshot at `serialized_path`.
///
/// `model_path`, if given, is an additional staleness dependency: the
/// snapshot is rejected as stale if any dependency is newer (see
/// [`taup_model::cache::read_snapshot`]). `flags.read_stats` additionally
/// loads a phase-extras blob alongside the snapshot (same stem, `.extras`
/// extension); `read_ellipticity`/`read_topography` are acknowledged here
/// but resolved by the caller through `taup_core::session::AuxiliaryData`,
/// since that data keys off receiver geometry rather than the model.
pub fn open(
    model_name: &str,
    model_path: Option<&Path>,
    serialized_path: &Path,
    flags: OpenFlags,
    tolerances: Tolerances,
) -> Result<Model, EngineError> {
    let dependencies: Vec<PathBuf> = model_path.map(|p| vec![p.to_path_buf()]).unwrap_or_default();
    let snapshot = taup_model::cache::read_snapshot(serialized_path, &dependencies)?.ok_or_else(|| {
        EngineError::Model(ModelError::ModelReadFailure(format!(
            "no usable cached snapshot for model {model_name:?} at {}",
            serialized_path.display()
        )))
    })?;

    let extras = if flags.read_stats {
        let extras_path = serialized_path.with_extension("extras");
        taup_model::cache::read_extras(&extras_path)?.unwrap_or_default()
    } else {
        PhaseExtras::default()
    };

    Ok(Model::from_snapshot(snapshot, extras, tolerances)?)
}
