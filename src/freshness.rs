//! Freshness classification: days off roast -> adjustment window.
//!
//! CO2 retained after roasting first raises extraction resistance (fresh
//! beans want a coarser grind and a preinfusion pause), then as beans age
//! past the peak window soluble compounds decline (old beans want a finer
//! grind and shorter ratios). The five-window table encodes that
//! non-monotonic behavior; the offsets are modulated by roast level because
//! light roasts retain more CO2 and dark roasts degas and fade faster.

use serde::Serialize;
use tracing::debug;

use crate::contract::RoastLevel;

/// Freshness windows by days since roast. Total partition: every
/// non-negative day count maps to exactly one window.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FreshnessWindow {
    VeryFresh,
    Resting,
    Peak,
    Fading,
    Stale,
}

/// Offsets applied on top of the roast-level baseline, plus the rationale
/// for them. `grind_offset` is in grinder-scale units, positive = coarser.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FreshnessAdjustment {
    pub window: FreshnessWindow,
    pub days_off_roast: u32,
    pub grind_offset: f64,
    pub dose_offset_g: f64,
    pub yield_offset_g: f64,
    pub time_offset_s: f64,
    pub temp_offset_c: f64,
    pub preinfusion_recommended: bool,
    pub notes: Vec<String>,
}

/// Window thresholds are inclusive upper bounds.
pub fn classify_window(days_off_roast: u32) -> FreshnessWindow {
    match days_off_roast {
        0..=4 => FreshnessWindow::VeryFresh,
        5..=7 => FreshnessWindow::Resting,
        8..=21 => FreshnessWindow::Peak,
        22..=35 => FreshnessWindow::Fading,
        _ => FreshnessWindow::Stale,
    }
}

/// Compute the freshness adjustment for a day count and roast level.
pub fn adjustment_for(days_off_roast: u32, roast_level: RoastLevel) -> FreshnessAdjustment {
    let window = classify_window(days_off_roast);
    let is_light = roast_level == RoastLevel::Light;
    let is_dark = matches!(roast_level, RoastLevel::Dark | RoastLevel::MediumDark);

    debug!(
        "Freshness window for {} days ({:?} roast): {:?}",
        days_off_roast, roast_level, window
    );

    match window {
        FreshnessWindow::VeryFresh => FreshnessAdjustment {
            window,
            days_off_roast,
            grind_offset: if is_light { 2.0 } else { 1.0 },
            dose_offset_g: 0.0,
            yield_offset_g: 0.0,
            time_offset_s: if is_light { 3.0 } else { 2.0 },
            temp_offset_c: 0.0,
            preinfusion_recommended: true,
            notes: vec![
                format!(
                    "Beans are very fresh ({} days). High CO2 causes channeling.",
                    days_off_roast
                ),
                "Grind slightly coarser than usual to allow gas escape.".to_string(),
                "Use a longer preinfusion (5-8 seconds) if your machine supports it.".to_string(),
                if is_light {
                    "Light roasts retain more CO2, so consider waiting 2-3 more days.".to_string()
                } else {
                    "Consider resting beans for another few days for best results.".to_string()
                },
                "Expect crema to be very thick and bubbly.".to_string(),
            ],
        },

        FreshnessWindow::Resting => FreshnessAdjustment {
            window,
            days_off_roast,
            grind_offset: if is_light { 1.0 } else { 0.0 },
            dose_offset_g: 0.0,
            yield_offset_g: 0.0,
            time_offset_s: 1.0,
            temp_offset_c: 0.0,
            preinfusion_recommended: is_light,
            notes: vec![
                format!(
                    "Beans are resting ({} days). Almost at peak freshness.",
                    days_off_roast
                ),
                if is_light {
                    "Light roasts may still have some CO2, so grind slightly coarser.".to_string()
                } else {
                    "Should be approaching ideal extraction window.".to_string()
                },
                "Flavours will continue to develop over the next few days.".to_string(),
            ],
        },

        FreshnessWindow::Peak => FreshnessAdjustment {
            window,
            days_off_roast,
            grind_offset: 0.0,
            dose_offset_g: 0.0,
            yield_offset_g: 0.0,
            time_offset_s: 0.0,
            temp_offset_c: 0.0,
            preinfusion_recommended: false,
            notes: vec![
                format!(
                    "Beans are at peak freshness ({} days). Ideal for espresso.",
                    days_off_roast
                ),
                "Standard recipe applies, no freshness adjustments needed.".to_string(),
                if is_dark {
                    "Dark roasts peak earlier; best consumed within 14-18 days.".to_string()
                } else {
                    "Use your baseline recipe for best results.".to_string()
                },
            ],
        },

        FreshnessWindow::Fading => FreshnessAdjustment {
            window,
            days_off_roast,
            grind_offset: if is_dark { -2.0 } else { -1.0 },
            dose_offset_g: 0.5,
            yield_offset_g: if is_dark { -4.0 } else { -2.0 },
            time_offset_s: -2.0,
            temp_offset_c: if is_dark { 1.0 } else { 0.0 },
            preinfusion_recommended: false,
            notes: vec![
                format!(
                    "Beans are fading ({} days). Freshness declining.",
                    days_off_roast
                ),
                "Grind finer to compensate for reduced solubility.".to_string(),
                if is_dark {
                    "Dark roasts fade faster, so grind noticeably finer.".to_string()
                } else {
                    "Consider a slightly higher dose to maintain body.".to_string()
                },
                "Pull shorter ratios to preserve remaining flavour.".to_string(),
                "Expect muted acidity and less complex flavour profile.".to_string(),
            ],
        },

        FreshnessWindow::Stale => FreshnessAdjustment {
            window,
            days_off_roast,
            grind_offset: -2.0,
            dose_offset_g: 1.0,
            yield_offset_g: -4.0,
            time_offset_s: -3.0,
            temp_offset_c: 1.0,
            preinfusion_recommended: false,
            notes: vec![
                format!(
                    "Beans are stale ({} days). Flavour significantly degraded.",
                    days_off_roast
                ),
                "Grind much finer and increase dose to extract remaining flavour.".to_string(),
                "Pull shorter shots (1:1.5 ratio) for best clarity.".to_string(),
                "Strongly recommend purchasing fresher beans for optimal results.".to_string(),
                "These beans may taste flat, papery, or woody.".to_string(),
            ],
        },
    }
}
