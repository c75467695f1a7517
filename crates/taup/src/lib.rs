//! Convenience facade over the taup seismic travel-time engine.
//!
//! Provides a global model singleton and high-level functions that accept
//! a source depth and receiver geometry directly, removing the need to
//! manage a [`taup_core::Session`]'s borrowed lifetime by hand.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use taup::*;
//! use taup_core::{OpenFlags, ReceiverGeometry};
//! use taup_model::Tolerances;
//! use std::path::Path;
//!
//! let model = taup_core::open_model(
//!     "ak135",
//!     None,
//!     Path::new("ak135.cache"),
//!     OpenFlags::default(),
//!     Tolerances::default(),
//! )?;
//! init(model)?;
//!
//! let arrivals = travel_times(
//!     10.0,
//!     ReceiverGeometry::Distance { delta_deg: 30.0, azimuth_deg: None, receiver_elev_km: 0.0 },
//! )?;
//! println!("first arrival: {} at {:.3}s", arrivals[0].phase_code, arrivals[0].time_s);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod convenience;
pub mod error;
pub mod global;

pub use convenience::{TravelTimeService, plot, travel_times, travel_times_for_phases};
pub use error::TaupError;
pub use global::{init, is_initialized};

// Re-export core types so callers don't need to depend on taup_core/taup_model directly.
pub use taup_core::{
    ArrivalRecord, EngineError, OpenFlags, PhaseFilter, PlotPoint, ReceiverGeometry, Session, SessionOptions,
};
pub use taup_model::{Model, ModelError, Tolerances};
