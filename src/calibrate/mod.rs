//! Shot-feedback calibration: one iteration of the dial-in loop.
//!
//! # Architecture
//!
//! - **Classification**: timing, taste, and visual findings are each reduced
//!   to a single issue by fixed priority rules
//! - **Resolution**: an ordered pipeline of candidate steps fills a two-slot
//!   change accumulator; the two-change cap is structural, not counted
//! - **Terminal state**: zero changes means the shot is dialed in and the
//!   caller should save the recipe as a baseline
//!
//! The engine is stateless across iterations; the caller persists the merged
//! recipe and supplies the iteration number.

mod engine;

pub use engine::calibrate;
