//! Session orchestration layer: opens a source depth against a shared
//! [`taup_model::Model`], recomputes every branch once, and evaluates
//! dressed arrivals (and plot sweeps) against it.

pub mod arrival;
pub mod error;
pub mod open;
pub mod plot;
pub mod session;

pub use arrival::{ArrivalRecord, ReceiverGeometry};
pub use error::EngineError;
pub use open::{OpenFlags, open as open_model};
pub use plot::{PlotPoint, plot};
pub use session::{AuxiliaryData, PhaseFilter, Session, SessionOptions};
