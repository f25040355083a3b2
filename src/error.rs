use thiserror::Error;

#[derive(Debug, Error)]
pub enum DialMateError {
    /// An assembled object failed contract validation after clamping.
    /// This indicates an internal construction defect, not bad user input.
    #[error("Contract violation: {0}")]
    Contract(String),

    /// Caller-supplied calibration input rejected at the boundary.
    #[error("Invalid calibration input: {0}")]
    Input(String),
}
