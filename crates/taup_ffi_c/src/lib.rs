//! C-facing adapter types for the taup travel-time engine.
//!
//! A model is opened once into an opaque handle; every `taup_travel_times`
//! call recomputes a [`taup_core::Session`] for the requested depth and
//! evaluates one geometry against it. Unlike `taup_core::Session`, this
//! handle carries no borrowed lifetime — callers that query the same depth
//! repeatedly pay a small recompute cost per call rather than this crate
//! smuggling a self-referential `Session<'static>` across the ABI boundary.

use std::ffi::CStr;
use std::os::raw::c_char;
use std::path::{Path, PathBuf};
use std::ptr;

use taup_core::{
    ArrivalRecord, EngineError, OpenFlags, PhaseFilter, ReceiverGeometry, Session, SessionOptions,
};
use taup_model::{Model, ModelError, Tolerances};

/// ABI version for downstream bindings.
pub const TAUP_API_VERSION: u32 = 1;

/// Fixed UTF-8 buffer capacity for phase codes in C-compatible structs.
/// Phase codes in this engine (`PKIKP`, `PcP`, `pwP`, ...) are short; any
/// code that would not fit is truncated rather than rejected, since it is
/// only a display label in the FFI arrival record.
pub const TAUP_PHASE_CODE_CAPACITY: usize = 16;

/// C-facing status codes.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaupStatus {
    Ok = 0,
    InvalidConfig = 1,
    ModelReadFailure = 2,
    ModelMalformed = 3,
    DepthOutOfRange = 4,
    PhaseListInvalid = 5,
    TauIntegralFailure = 6,
    NullPointer = 7,
    BufferTooSmall = 8,
    Internal = 255,
}

impl From<&EngineError> for TaupStatus {
    fn from(value: &EngineError) -> Self {
        match value {
            EngineError::DepthOutOfRange { .. } => Self::DepthOutOfRange,
            EngineError::PhaseListInvalid(_) => Self::PhaseListInvalid,
            EngineError::TauIntegralFailure(_) => Self::TauIntegralFailure,
            EngineError::Branch(_) => Self::TauIntegralFailure,
            EngineError::Model(ModelError::ModelReadFailure(_)) => Self::ModelReadFailure,
            EngineError::Model(_) => Self::ModelMalformed,
            _ => Self::Internal,
        }
    }
}

/// Opaque handle to a loaded [`Model`]. Owned by the caller from
/// [`taup_model_open`] until passed to [`taup_model_free`].
pub type TaupModelHandle = Model;

/// C-compatible session options (§4.5, §3 Arrival record association
/// window).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaupSessionOptions {
    pub return_all_phases: u8,
    pub return_back_branches: u8,
    pub tectonic: u8,
    pub alpha: f64,
    pub w_min: f64,
}

impl From<TaupSessionOptions> for SessionOptions {
    fn from(value: TaupSessionOptions) -> Self {
        Self {
            return_all_phases: value.return_all_phases != 0,
            return_back_branches: value.return_back_branches != 0,
            tectonic: value.tectonic != 0,
            alpha: value.alpha,
            w_min: value.w_min,
        }
    }
}

/// C-compatible receiver geometry. `kind = 0` selects the `Distance`
/// variant (`delta_deg`/`azimuth_deg`, `azimuth_deg` NaN meaning "none");
/// `kind = 1` selects `Geodetic` (source/receiver lat/lon).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaupGeometry {
    pub kind: u8,
    pub delta_deg: f64,
    pub azimuth_deg: f64,
    pub source_lat_deg: f64,
    pub source_lon_deg: f64,
    pub receiver_lat_deg: f64,
    pub receiver_lon_deg: f64,
    pub receiver_elev_km: f64,
}

impl TryFrom<TaupGeometry> for ReceiverGeometry {
    type Error = TaupStatus;

    fn try_from(value: TaupGeometry) -> Result<Self, Self::Error> {
        match value.kind {
            0 => Ok(ReceiverGeometry::Distance {
                delta_deg: value.delta_deg,
                azimuth_deg: if value.azimuth_deg.is_nan() { None } else { Some(value.azimuth_deg) },
                receiver_elev_km: value.receiver_elev_km,
            }),
            1 => Ok(ReceiverGeometry::Geodetic {
                source_lat_deg: value.source_lat_deg,
                source_lon_deg: value.source_lon_deg,
                receiver_lat_deg: value.receiver_lat_deg,
                receiver_lon_deg: value.receiver_lon_deg,
                receiver_elev_km: value.receiver_elev_km,
            }),
            _ => Err(TaupStatus::InvalidConfig),
        }
    }
}

/// C-compatible dressed arrival (§3 Arrival record). `spread_s`,
/// `observability`, and `association_window_s` are NaN when the underlying
/// `Option<f64>` is `None` (no phase statistics were loaded or applicable).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaupArrival {
    pub phase_code_utf8: [u8; TAUP_PHASE_CODE_CAPACITY],
    pub time_s: f64,
    pub dt_ddelta_s_per_deg: f64,
    pub dt_dz_s_per_km: f64,
    pub ddelta_dp: f64,
    pub ray_parameter_s_per_rad: f64,
    pub spread_s: f64,
    pub observability: f64,
    pub association_window_s: f64,
    pub is_regional: u8,
    pub is_depth_sensitive: u8,
    pub can_use_for_location: u8,
    pub down_weight: u8,
    pub is_add_on: u8,
}

impl From<&ArrivalRecord> for TaupArrival {
    fn from(value: &ArrivalRecord) -> Self {
        Self {
            phase_code_utf8: encode_c_utf8_truncating(&value.phase_code),
            time_s: value.time_s,
            dt_ddelta_s_per_deg: value.dt_ddelta_s_per_deg,
            dt_dz_s_per_km: value.dt_dz_s_per_km,
            ddelta_dp: value.ddelta_dp,
            ray_parameter_s_per_rad: value.ray_parameter_s_per_rad,
            spread_s: value.spread_s.unwrap_or(f64::NAN),
            observability: value.observability.unwrap_or(f64::NAN),
            association_window_s: value.association_window_s.unwrap_or(f64::NAN),
            is_regional: u8::from(value.is_regional),
            is_depth_sensitive: u8::from(value.is_depth_sensitive),
            can_use_for_location: u8::from(value.can_use_for_location),
            down_weight: u8::from(value.down_weight),
            is_add_on: u8::from(value.is_add_on),
        }
    }
}

/// Open a model from its cached snapshot (internal, pointer-free).
pub fn taup_model_open_internal(
    model_name: &str,
    model_path: Option<&Path>,
    serialized_path: &Path,
    read_stats: bool,
) -> Result<Model, TaupStatus> {
    let flags = OpenFlags { read_stats, read_ellipticity: false, read_topography: false };
    taup_core::open_model(model_name, model_path, serialized_path, flags, Tolerances::default())
        .map_err(|err| TaupStatus::from(&err))
}

/// Recompute a session at `depth_km` and evaluate one geometry (internal,
/// pointer-free).
pub fn taup_travel_times_internal(
    model: &Model,
    depth_km: f64,
    options: SessionOptions,
    geometry: ReceiverGeometry,
) -> Result<Vec<ArrivalRecord>, TaupStatus> {
    let session = Session::new_session(
        model,
        depth_km,
        PhaseFilter::All,
        options,
        taup_core::AuxiliaryData::default(),
    )
    .map_err(|err| TaupStatus::from(&err))?;
    Ok(session.get_tt(geometry))
}

/// Return ABI version of the exported C API.
#[unsafe(no_mangle)]
pub extern "C" fn taup_api_version() -> u32 {
    TAUP_API_VERSION
}

/// Open a model and produce an owned handle.
///
/// # Safety
/// `model_name`, `serialized_path`, and `out_handle` must be valid, non-null
/// pointers; `model_name`/`model_path`/`serialized_path` must be NUL-
/// terminated UTF-8 C strings. `model_path` may be null (no extra staleness
/// dependency beyond the cache file itself).
#[unsafe(no_mangle)]
pub unsafe extern "C" fn taup_model_open(
    model_name: *const c_char,
    model_path: *const c_char,
    serialized_path: *const c_char,
    read_stats: u8,
    out_handle: *mut *mut TaupModelHandle,
) -> TaupStatus {
    ffi_boundary(|| {
        if model_name.is_null() || serialized_path.is_null() || out_handle.is_null() {
            return TaupStatus::NullPointer;
        }

        // SAFETY: pointer checked non-null above; caller guarantees a valid
        // NUL-terminated C string for the duration of this call.
        let name = match unsafe { CStr::from_ptr(model_name) }.to_str() {
            Ok(s) => s,
            Err(_) => return TaupStatus::InvalidConfig,
        };
        // SAFETY: same as above.
        let serialized = match unsafe { CStr::from_ptr(serialized_path) }.to_str() {
            Ok(s) => PathBuf::from(s),
            Err(_) => return TaupStatus::InvalidConfig,
        };
        let model_path_buf = if model_path.is_null() {
            None
        } else {
            // SAFETY: pointer checked non-null just above.
            match unsafe { CStr::from_ptr(model_path) }.to_str() {
                Ok(s) => Some(PathBuf::from(s)),
                Err(_) => return TaupStatus::InvalidConfig,
            }
        };

        match taup_model_open_internal(name, model_path_buf.as_deref(), &serialized, read_stats != 0) {
            Ok(model) => {
                // SAFETY: pointer checked non-null above; we write one pointer value.
                unsafe { *out_handle = Box::into_raw(Box::new(model)) };
                TaupStatus::Ok
            }
            Err(status) => {
                // SAFETY: pointer checked non-null above.
                unsafe { *out_handle = ptr::null_mut() };
                status
            }
        }
    })
}

/// Evaluate travel times for one source depth and receiver geometry.
///
/// `out_arrivals` must point to a buffer of at least `*out_count` elements
/// on entry; on success `*out_count` is set to the number of arrivals
/// written (which may be fewer than the buffer's capacity, never more). If
/// the buffer is too small, returns [`TaupStatus::BufferTooSmall`] and sets
/// `*out_count` to the required capacity without writing any elements.
///
/// # Safety
/// `handle`, `out_arrivals`, and `out_count` must be valid, non-null
/// pointers; `out_arrivals` must point to at least `*out_count`
/// (pre-call) contiguous, writable [`TaupArrival`] slots.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn taup_travel_times(
    handle: *const TaupModelHandle,
    depth_km: f64,
    options: TaupSessionOptions,
    geometry: TaupGeometry,
    out_arrivals: *mut TaupArrival,
    out_count: *mut usize,
) -> TaupStatus {
    ffi_boundary(|| {
        if handle.is_null() || out_arrivals.is_null() || out_count.is_null() {
            return TaupStatus::NullPointer;
        }

        let geometry = match ReceiverGeometry::try_from(geometry) {
            Ok(g) => g,
            Err(status) => return status,
        };

        // SAFETY: pointer checked non-null above; only borrowed for this call.
        let model_ref = unsafe { &*handle };
        // SAFETY: pointer checked non-null above; read once, not retained.
        let capacity = unsafe { *out_count };

        let arrivals = match taup_travel_times_internal(model_ref, depth_km, options.into(), geometry) {
            Ok(a) => a,
            Err(status) => return status,
        };

        if arrivals.len() > capacity {
            // SAFETY: pointer checked non-null above.
            unsafe { *out_count = arrivals.len() };
            return TaupStatus::BufferTooSmall;
        }

        for (i, arrival) in arrivals.iter().enumerate() {
            // SAFETY: `i < arrivals.len() <= capacity`, and the caller
            // guaranteed `out_arrivals` has room for `capacity` elements.
            unsafe { *out_arrivals.add(i) = TaupArrival::from(arrival) };
        }
        // SAFETY: pointer checked non-null above.
        unsafe { *out_count = arrivals.len() };
        TaupStatus::Ok
    })
}

/// Destroy a model handle allocated by [`taup_model_open`].
///
/// # Safety
/// `handle` must be either null or a pointer returned by `taup_model_open`
/// and not yet freed.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn taup_model_free(handle: *mut TaupModelHandle) -> TaupStatus {
    ffi_boundary(|| {
        if handle.is_null() {
            return TaupStatus::Ok;
        }
        // SAFETY: ownership transferred back from a pointer created by
        // `Box::into_raw` in `taup_model_open`.
        unsafe { drop(Box::from_raw(handle)) };
        TaupStatus::Ok
    })
}

fn ffi_boundary(f: impl FnOnce() -> TaupStatus) -> TaupStatus {
    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(f)) {
        Ok(status) => status,
        Err(_) => TaupStatus::Internal,
    }
}

fn encode_c_utf8_truncating(input: &str) -> [u8; TAUP_PHASE_CODE_CAPACITY] {
    let mut out = [0_u8; TAUP_PHASE_CODE_CAPACITY];
    let bytes = input.as_bytes();
    let end = bytes.len().min(TAUP_PHASE_CODE_CAPACITY - 1);
    // Back off to a char boundary so truncation never splits a multi-byte
    // UTF-8 sequence (phase codes are ASCII in practice, but this keeps the
    // buffer valid UTF-8 regardless).
    let mut end = end;
    while end > 0 && !input.is_char_boundary(end) {
        end -= 1;
    }
    out[..end].copy_from_slice(&bytes[..end]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use taup_model::{BranchInput, ConversionsSnapshot, ModelSample, ModelSnapshot, UpGoingTable, WaveType};

    fn sample_snapshot() -> ModelSnapshot {
        ModelSnapshot {
            format_version: taup_model::SNAPSHOT_FORMAT_VERSION,
            conversions: ConversionsSnapshot { radius_km: 6371.0, reference_velocity_km_s: 4.5 },
            p_samples: vec![
                ModelSample { z_flat: 0.0, p: 1.0, upgoing_index: Some(0) },
                ModelSample { z_flat: -0.05, p: 0.1, upgoing_index: Some(1) },
            ],
            s_samples: vec![
                ModelSample { z_flat: 0.0, p: 1.8, upgoing_index: Some(0) },
                ModelSample { z_flat: -0.05, p: 0.2, upgoing_index: Some(1) },
            ],
            branches: vec![BranchInput::from_legacy_tables(
                "P".into(),
                "P".into(),
                vec![WaveType::P],
                1,
                1,
                vec![0.9, 0.7, 0.5, 0.3, 0.1],
                vec![1000.0, 902.0, 787.5, 656.0, 507.5],
                0.1,
                1.2,
            )],
            p_upgoing: UpGoingTable::new(
                vec![0.9, 0.7, 0.5, 0.3, 0.1],
                vec![0.0; 5],
                vec![taup_model::UpGoingRecord { depth_flat: -0.05, tau: vec![0.0; 5], distance: vec![0.0; 5] }],
            )
            .unwrap(),
            s_upgoing: UpGoingTable::new(
                vec![0.9, 0.7, 0.5, 0.3, 0.1],
                vec![0.0; 5],
                vec![taup_model::UpGoingRecord { depth_flat: -0.05, tau: vec![0.0; 5], distance: vec![0.0; 5] }],
            )
            .unwrap(),
        }
    }

    fn write_sample_cache() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.cache");
        taup_model::cache::write_snapshot(&path, &sample_snapshot()).unwrap();
        (dir, path)
    }

    #[test]
    fn status_maps_from_engine_error() {
        let status = TaupStatus::from(&EngineError::DepthOutOfRange { depth_km: -1.0 });
        assert_eq!(status, TaupStatus::DepthOutOfRange);
    }

    #[test]
    fn geometry_conversion_treats_nan_azimuth_as_none() {
        let geometry = TaupGeometry {
            kind: 0,
            delta_deg: 30.0,
            azimuth_deg: f64::NAN,
            source_lat_deg: 0.0,
            source_lon_deg: 0.0,
            receiver_lat_deg: 0.0,
            receiver_lon_deg: 0.0,
            receiver_elev_km: 0.0,
        };
        let converted = ReceiverGeometry::try_from(geometry).unwrap();
        assert!(matches!(converted, ReceiverGeometry::Distance { azimuth_deg: None, .. }));
    }

    #[test]
    fn geometry_conversion_rejects_unknown_kind() {
        let geometry = TaupGeometry {
            kind: 9,
            delta_deg: 30.0,
            azimuth_deg: 0.0,
            source_lat_deg: 0.0,
            source_lon_deg: 0.0,
            receiver_lat_deg: 0.0,
            receiver_lon_deg: 0.0,
            receiver_elev_km: 0.0,
        };
        assert_eq!(ReceiverGeometry::try_from(geometry).unwrap_err(), TaupStatus::InvalidConfig);
    }

    #[test]
    fn encode_truncates_long_phase_codes_without_panicking() {
        let long = "P".repeat(64);
        let buf = encode_c_utf8_truncating(&long);
        assert_eq!(buf.len(), TAUP_PHASE_CODE_CAPACITY);
    }

    #[test]
    fn open_internal_fails_for_missing_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.cache");
        let err = taup_model_open_internal("ak135", None, &path, false).unwrap_err();
        assert_eq!(err, TaupStatus::ModelReadFailure);
    }

    #[test]
    fn open_internal_succeeds_from_a_written_snapshot() {
        let (_dir, path) = write_sample_cache();
        let model = taup_model_open_internal("ak135", None, &path, false).unwrap();
        assert_eq!(model.branches().len(), 1);
    }

    #[test]
    fn travel_times_internal_round_trips_through_the_session_layer() {
        let (_dir, path) = write_sample_cache();
        let model = taup_model_open_internal("ak135", None, &path, false).unwrap();
        let options = SessionOptions::default();
        let geometry = ReceiverGeometry::Distance { delta_deg: 40.0, azimuth_deg: None, receiver_elev_km: 0.0 };
        let arrivals = taup_travel_times_internal(&model, 50.0, options, geometry).unwrap();
        assert!(!arrivals.is_empty());
    }

    #[test]
    fn ffi_lifecycle_open_query_free() {
        let (_dir, path) = write_sample_cache();
        let model_name = std::ffi::CString::new("ak135").unwrap();
        let serialized = std::ffi::CString::new(path.to_str().unwrap()).unwrap();

        let mut handle: *mut TaupModelHandle = ptr::null_mut();
        // SAFETY: valid C strings and output pointer created in this scope.
        let open_status = unsafe {
            taup_model_open(model_name.as_ptr(), ptr::null(), serialized.as_ptr(), 0, &mut handle)
        };
        assert_eq!(open_status, TaupStatus::Ok);
        assert!(!handle.is_null());

        let options = TaupSessionOptions {
            return_all_phases: 1,
            return_back_branches: 1,
            tectonic: 0,
            alpha: 4.0,
            w_min: 1.0,
        };
        let geometry = TaupGeometry {
            kind: 0,
            delta_deg: 40.0,
            azimuth_deg: f64::NAN,
            source_lat_deg: 0.0,
            source_lon_deg: 0.0,
            receiver_lat_deg: 0.0,
            receiver_lon_deg: 0.0,
            receiver_elev_km: 0.0,
        };
        let mut buf = [TaupArrival {
            phase_code_utf8: [0; TAUP_PHASE_CODE_CAPACITY],
            time_s: 0.0,
            dt_ddelta_s_per_deg: 0.0,
            dt_dz_s_per_km: 0.0,
            ddelta_dp: 0.0,
            ray_parameter_s_per_rad: 0.0,
            spread_s: f64::NAN,
            observability: f64::NAN,
            association_window_s: f64::NAN,
            is_regional: 0,
            is_depth_sensitive: 0,
            can_use_for_location: 0,
            down_weight: 0,
            is_add_on: 0,
        }; 16];
        let mut count = buf.len();
        // SAFETY: handle valid and non-null, buffer has `count` writable slots.
        let query_status =
            unsafe { taup_travel_times(handle, 50.0, options, geometry, buf.as_mut_ptr(), &mut count) };
        assert_eq!(query_status, TaupStatus::Ok);
        assert!(count > 0 && count <= buf.len());

        // SAFETY: handle was returned by `taup_model_open` and not yet freed.
        let free_status = unsafe { taup_model_free(handle) };
        assert_eq!(free_status, TaupStatus::Ok);
    }

    #[test]
    fn ffi_open_rejects_null_output_pointer() {
        let (_dir, path) = write_sample_cache();
        let model_name = std::ffi::CString::new("ak135").unwrap();
        let serialized = std::ffi::CString::new(path.to_str().unwrap()).unwrap();
        // SAFETY: intentionally passing a null out-pointer to verify validation.
        let status =
            unsafe { taup_model_open(model_name.as_ptr(), ptr::null(), serialized.as_ptr(), 0, ptr::null_mut()) };
        assert_eq!(status, TaupStatus::NullPointer);
    }

    #[test]
    fn ffi_query_reports_buffer_too_small_without_overrunning() {
        let (_dir, path) = write_sample_cache();
        let model = taup_model_open_internal("ak135", None, &path, false).unwrap();
        let options = TaupSessionOptions {
            return_all_phases: 1,
            return_back_branches: 1,
            tectonic: 0,
            alpha: 4.0,
            w_min: 1.0,
        };
        let geometry = TaupGeometry {
            kind: 0,
            delta_deg: 40.0,
            azimuth_deg: f64::NAN,
            source_lat_deg: 0.0,
            source_lon_deg: 0.0,
            receiver_lat_deg: 0.0,
            receiver_lon_deg: 0.0,
            receiver_elev_km: 0.0,
        };
        let mut count = 0usize;
        let mut dummy: [TaupArrival; 0] = [];
        // SAFETY: handle borrowed from a live `Model`; zero-capacity buffer
        // is only dereferenced if count were nonzero, which it is not.
        let status = unsafe {
            taup_travel_times(&model, 50.0, options, geometry, dummy.as_mut_ptr(), &mut count)
        };
        assert_eq!(status, TaupStatus::BufferTooSmall);
        assert!(count > 0);
    }
}
