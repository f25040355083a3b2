//! Shared value types and numeric bounds for the dial-in engines.
//!
//! Every object the synthesizer or the calibration engine produces is built
//! from these types and must satisfy the bounds declared here. The types are
//! flat records with serde derives; the persisted representation of a
//! `Recommendation` or `CalibrationResponse` is exactly its validated field
//! set (absent optional fields are omitted).
//!
//! Construction sites clamp values into range; `validate_*` functions exist
//! for the caller-facing boundary and as a defect check on assembled output.

mod types;
mod validation;

pub use types::*;
pub use validation::*;
