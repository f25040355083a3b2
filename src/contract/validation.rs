//! Numeric bounds and validation for contract types.
//!
//! Bounds are fixed by the contract, not configurable. Engines clamp into
//! these ranges at every mutation point; `validate_recommendation` and
//! `validate_calibration_response` exist as defect checks on assembled
//! output and must never fail for internally-consistent construction.

use crate::error::DialMateError;

use super::types::{CalibrationInput, CalibrationResponse, Recommendation, RecommendationTarget};

pub const DOSE_RANGE_G: (f64, f64) = (5.0, 25.0);
pub const YIELD_RANGE_G: (f64, f64) = (10.0, 80.0);
pub const TIME_RANGE_S: (f64, f64) = (15.0, 60.0);
pub const TEMP_RANGE_C: (f64, f64) = (85.0, 100.0);
pub const PRESSURE_RANGE_BAR: (f64, f64) = (1.0, 15.0);

/// Measurement bounds accepted from shot feedback.
pub const SHOT_TIME_RANGE_S: (f64, f64) = (5.0, 120.0);
pub const ACTUAL_YIELD_RANGE_G: (f64, f64) = (5.0, 100.0);

/// Maximum number of changes a calibration round may propose.
pub const MAX_CHANGES: usize = 2;

pub fn clamp(n: f64, min: f64, max: f64) -> f64 {
    n.max(min).min(max)
}

fn in_range(n: f64, range: (f64, f64)) -> bool {
    n >= range.0 && n <= range.1
}

fn check(field: &str, n: f64, range: (f64, f64)) -> Result<(), DialMateError> {
    if in_range(n, range) {
        Ok(())
    } else {
        Err(DialMateError::Contract(format!(
            "{} {} out of range ({}-{})",
            field, n, range.0, range.1
        )))
    }
}

pub fn validate_target(target: &RecommendationTarget) -> Result<(), DialMateError> {
    check("dose_g", target.dose_g, DOSE_RANGE_G)?;
    check("yield_g", target.yield_g, YIELD_RANGE_G)?;
    check("time_s", target.time_s, TIME_RANGE_S)?;
    if let Some(temp) = target.temp_c {
        check("temp_c", temp, TEMP_RANGE_C)?;
    }
    if let Some(pressure) = target.pressure_bar {
        check("pressure_bar", pressure, PRESSURE_RANGE_BAR)?;
    }
    Ok(())
}

pub fn validate_recommendation(rec: &Recommendation) -> Result<(), DialMateError> {
    validate_target(&rec.target)?;
    check("confidence", rec.confidence, (0.0, 1.0))?;
    if rec.version.is_empty() {
        return Err(DialMateError::Contract("version must not be empty".to_string()));
    }
    Ok(())
}

/// Boundary check on caller-supplied shot feedback. Unlike engine output,
/// a failure here is a user-facing input error.
pub fn validate_calibration_input(input: &CalibrationInput) -> Result<(), DialMateError> {
    if let Some(t) = input.shot_time_s {
        if !in_range(t, SHOT_TIME_RANGE_S) {
            return Err(DialMateError::Input(format!(
                "shot_time_s {} out of range ({}-{}s)",
                t, SHOT_TIME_RANGE_S.0, SHOT_TIME_RANGE_S.1
            )));
        }
    }
    if let Some(y) = input.actual_yield_g {
        if !in_range(y, ACTUAL_YIELD_RANGE_G) {
            return Err(DialMateError::Input(format!(
                "actual_yield_g {} out of range ({}-{}g)",
                y, ACTUAL_YIELD_RANGE_G.0, ACTUAL_YIELD_RANGE_G.1
            )));
        }
    }
    Ok(())
}

pub fn validate_calibration_response(resp: &CalibrationResponse) -> Result<(), DialMateError> {
    if resp.changes.len() > MAX_CHANGES {
        return Err(DialMateError::Contract(format!(
            "{} changes proposed, maximum is {}",
            resp.changes.len(),
            MAX_CHANGES
        )));
    }
    let t = &resp.new_target;
    if let Some(dose) = t.dose_g {
        check("new_target.dose_g", dose, DOSE_RANGE_G)?;
    }
    if let Some(yield_g) = t.yield_g {
        check("new_target.yield_g", yield_g, YIELD_RANGE_G)?;
    }
    if let Some(time) = t.time_s {
        check("new_target.time_s", time, TIME_RANGE_S)?;
    }
    if let Some(temp) = t.temp_c {
        check("new_target.temp_c", temp, TEMP_RANGE_C)?;
    }
    if let Some(pressure) = t.pressure_bar {
        check("new_target.pressure_bar", pressure, PRESSURE_RANGE_BAR)?;
    }
    Ok(())
}
