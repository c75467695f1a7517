//! Earth-model layer, branch reference data, phase extras, and the
//! serialization cache shared by every session of a given model.
//!
//! This crate owns everything a session treats as immutable and shareable:
//! once a [`Model`] is built, every session opened against it borrows the
//! same branch array, up-going tables, and phase extras.

pub mod branch;
pub mod cache;
pub mod earth_model;
pub mod error;
pub mod legacy;
pub mod phases;
pub mod tolerances;
pub mod topography;
pub mod upgoing;

pub use branch::{BranchInput, DiffractedInfo, SurfaceFocusBranch, TurningShell, WaveType};
pub use cache::{ConversionsSnapshot, ModelSnapshot, SNAPSHOT_FORMAT_VERSION};
pub use earth_model::{EarthModel, LastFound, ModelSample};
pub use error::ModelError;
pub use phases::{AddOnEntry, DiffractionEntry, LinearSegment, PhaseExtras, PhaseGroup, PhaseStatCurves};
pub use tolerances::Tolerances;
pub use topography::TopographyGrid;
pub use upgoing::{UpGoingAtDepth, UpGoingRecord, UpGoingTable};

use taup_tables::ModelConversions;

/// A fully loaded, immutable Earth model: normalization constants, both
/// wave types' depth/slowness search layers and up-going tables, the
/// surface-focus branch array, and the phase extras. Shared by reference
/// across every session opened against it.
pub struct Model {
    conversions: ModelConversions,
    p_model: EarthModel,
    s_model: EarthModel,
    p_upgoing: UpGoingTable,
    s_upgoing: UpGoingTable,
    branches: Vec<SurfaceFocusBranch>,
    extras: PhaseExtras,
    tolerances: Tolerances,
}

impl Model {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        conversions: ModelConversions,
        p_model: EarthModel,
        s_model: EarthModel,
        p_upgoing: UpGoingTable,
        s_upgoing: UpGoingTable,
        branches: Vec<SurfaceFocusBranch>,
        extras: PhaseExtras,
        tolerances: Tolerances,
    ) -> Self {
        Self {
            conversions,
            p_model,
            s_model,
            p_upgoing,
            s_upgoing,
            branches,
            extras,
            tolerances,
        }
    }

    /// Rebuild a model from a cached snapshot, re-deriving every spline
    /// basis (cheap and deterministic) rather than persisting it.
    pub fn from_snapshot(
        snapshot: ModelSnapshot,
        extras: PhaseExtras,
        tolerances: Tolerances,
    ) -> Result<Self, ModelError> {
        let conversions: ModelConversions = snapshot.conversions.into();
        let p_model = EarthModel::new(snapshot.p_samples, tolerances)?;
        let s_model = EarthModel::new(snapshot.s_samples, tolerances)?;
        let branches = snapshot
            .branches
            .into_iter()
            .map(SurfaceFocusBranch::from_input)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(
            conversions,
            p_model,
            s_model,
            snapshot.p_upgoing,
            snapshot.s_upgoing,
            branches,
            extras,
            tolerances,
        ))
    }

    /// Snapshot the reloadable parts of this model (everything but the
    /// phase extras, which the auxiliary loader owns and re-reads itself).
    pub fn to_snapshot(&self) -> ModelSnapshot {
        ModelSnapshot {
            format_version: SNAPSHOT_FORMAT_VERSION,
            conversions: self.conversions.into(),
            p_samples: self.p_model.samples().to_vec(),
            s_samples: self.s_model.samples().to_vec(),
            branches: self
                .branches
                .iter()
                .map(|b| {
                    BranchInput::from_generated_tables(
                        b.phase_code().to_string(),
                        b.segment_code().to_string(),
                        b.legs().to_vec(),
                        b.sign(),
                        b.mantle_count(),
                        b.p_grid().to_vec(),
                        b.tau().to_vec(),
                        b.x_range().0,
                        b.x_range().1,
                        b.diffracted().cloned(),
                        b.add_on_phase().map(str::to_string),
                        b.reflection_type().map(str::to_string),
                        b.turning_shell().cloned(),
                    )
                })
                .collect(),
            p_upgoing: self.p_upgoing.clone(),
            s_upgoing: self.s_upgoing.clone(),
        }
    }

    pub fn conversions(&self) -> ModelConversions {
        self.conversions
    }

    pub fn model_for(&self, wave: WaveType) -> &EarthModel {
        match wave {
            WaveType::P => &self.p_model,
            WaveType::S => &self.s_model,
        }
    }

    pub fn upgoing_for(&self, wave: WaveType) -> &UpGoingTable {
        match wave {
            WaveType::P => &self.p_upgoing,
            WaveType::S => &self.s_upgoing,
        }
    }

    pub fn branches(&self) -> &[SurfaceFocusBranch] {
        &self.branches
    }

    pub fn extras(&self) -> &PhaseExtras {
        &self.extras
    }

    pub fn tolerances(&self) -> Tolerances {
        self.tolerances
    }
}
