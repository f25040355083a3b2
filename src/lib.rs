//! dialmate: espresso dial-in recommendation and calibration engine.
//!
//! Three cooperating, stateless, pure-function components:
//!
//! - the freshness classifier maps days-since-roast to an adjustment window
//! - the recipe synthesizer builds a validated `Recommendation` from machine
//!   constraints, roast-level baselines, and freshness offsets
//! - the calibration engine turns one shot's feedback into at most two
//!   parameter changes, until the terminal "dialed in" response
//!
//! Record lookup, persistence, HTTP, and prose enhancement all live with the
//! caller; the crate receives resolved plain values and returns plain values.

pub mod calibrate;
pub mod contract;
pub mod enhance;
mod error;
pub mod freshness;
pub mod recipe;

pub use calibrate::calibrate;
pub use enhance::apply_enhancement;
pub use error::DialMateError;
pub use recipe::{synthesize, SynthesisInput, ENGINE_VERSION};

/// Install the tracing subscriber for the embedding application. Filter via
/// `RUST_LOG`, defaulting to `info`.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
