//! Recipe synthesis: machine + bean + freshness -> validated recommendation.
//!
//! # Architecture
//!
//! - **Baselines**: roast-level starting parameters (exhaustive table)
//! - **Notes**: machine-family guidance rules, loaded from TOML at compile
//!   time (or from a custom file)
//! - **Engine**: combines machine constraints, baselines, an optional saved
//!   baseline recipe, and freshness offsets into a `Recommendation`
//!
//! The engine is a pure function; identical inputs produce identical output.
//!
//! # Example
//!
//! ```ignore
//! use dialmate::recipe::{synthesize, SynthesisInput};
//!
//! let rec = synthesize(&SynthesisInput {
//!     machine,
//!     bean,
//!     roast_override: None,
//!     freshness: Some(FreshnessContext::DaysOffRoast(2)),
//!     baseline: None,
//!     grinder: None,
//! })?;
//!
//! println!("grind {:?}, {}g in, {}g out", rec.grinder.setting_value,
//!     rec.target.dose_g, rec.target.yield_g);
//! ```

mod baselines;
mod engine;
mod notes;

pub use baselines::{baseline_for, RoastBaseline};
pub use engine::{synthesize, SynthesisInput, ENGINE_VERSION};
pub use notes::{default_rules, load_rules, notes_for_machine, MachineNoteRule, NotesConfig};
