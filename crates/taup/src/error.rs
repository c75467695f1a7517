use std::error::Error;
use std::fmt::{Display, Formatter};

use taup_core::EngineError;

/// Unified error type for the convenience facade.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum TaupError {
    /// [`crate::init`] has not been called yet.
    NotInitialized,
    /// [`crate::init`] was called more than once.
    AlreadyInitialized,
    /// Error from the underlying engine (model loading or session
    /// construction).
    Engine(EngineError),
}

impl Display for TaupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotInitialized => write!(f, "engine not initialized; call taup::init() first"),
            Self::AlreadyInitialized => write!(f, "engine already initialized"),
            Self::Engine(e) => write!(f, "engine error: {e}"),
        }
    }
}

impl Error for TaupError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Engine(e) => Some(e),
            _ => None,
        }
    }
}

impl From<EngineError> for TaupError {
    fn from(e: EngineError) -> Self {
        Self::Engine(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_not_initialized() {
        let e = TaupError::NotInitialized;
        assert!(e.to_string().contains("not initialized"));
    }

    #[test]
    fn display_already_initialized() {
        let e = TaupError::AlreadyInitialized;
        assert!(e.to_string().contains("already initialized"));
    }

    #[test]
    fn from_engine_error() {
        let e: TaupError = EngineError::DepthOutOfRange { depth_km: -1.0 }.into();
        assert!(matches!(e, TaupError::Engine(_)));
    }
}
