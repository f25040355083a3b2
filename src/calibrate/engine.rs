//! Calibration resolution: analyze one shot's feedback against the active
//! recommendation and propose at most two parameter changes.

use tracing::debug;

use crate::contract::{
    clamp, validate_calibration_input, validate_calibration_response, CalibrationInput,
    CalibrationResponse, MachineProfile, PartialTarget, RecipeChange, Recommendation,
    SettingValue, TasteTag, VisualIssue, MAX_CHANGES, TEMP_RANGE_C,
};
use crate::error::DialMateError;

/// Grind setting assumed when the active recommendation carries a label the
/// engine cannot read numerically.
const FALLBACK_GRIND: f64 = 15.0;

/// Default brew temperature assumed when the target carries none.
const DEFAULT_TEMP_C: f64 = 93.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimingIssue {
    Fast,
    Slow,
    Ok,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TasteIssue {
    Sour,
    Bitter,
    Weak,
    Astringent,
    Ok,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisualFinding {
    Channeling,
    Spritzing,
    Ok,
}

/// Shot time against target: more than 5s under is fast, more than 5s over
/// is slow. An absent measurement reads as ok.
fn classify_timing(input: &CalibrationInput, current: &Recommendation) -> TimingIssue {
    let Some(shot_time) = input.shot_time_s else {
        return TimingIssue::Ok;
    };
    let target = current.target.time_s;
    if shot_time < target - 5.0 {
        TimingIssue::Fast
    } else if shot_time > target + 5.0 {
        TimingIssue::Slow
    } else {
        TimingIssue::Ok
    }
}

/// First match wins: a balanced or perfect tag clears the axis outright.
fn classify_taste(input: &CalibrationInput) -> TasteIssue {
    let has = |tag: TasteTag| input.taste.contains(&tag);
    if has(TasteTag::Balanced) || has(TasteTag::Perfect) {
        TasteIssue::Ok
    } else if has(TasteTag::Sour) {
        TasteIssue::Sour
    } else if has(TasteTag::Bitter) {
        TasteIssue::Bitter
    } else if has(TasteTag::Astringent) {
        TasteIssue::Astringent
    } else if has(TasteTag::Weak) {
        TasteIssue::Weak
    } else {
        TasteIssue::Ok
    }
}

/// Channeling takes priority over spritzing when both are reported.
fn classify_visual(input: &CalibrationInput) -> VisualFinding {
    if input.visual_issues.contains(&VisualIssue::Channeling) {
        VisualFinding::Channeling
    } else if input.visual_issues.contains(&VisualIssue::Spritzing) {
        VisualFinding::Spritzing
    } else {
        VisualFinding::Ok
    }
}

/// Two-slot change accumulator. Pushes past capacity are dropped, which
/// makes the two-change cap hold by construction.
#[derive(Debug, Default)]
struct ChangeSet {
    changes: Vec<RecipeChange>,
}

impl ChangeSet {
    fn push(&mut self, change: RecipeChange) {
        if self.changes.len() < MAX_CHANGES {
            self.changes.push(change);
        }
    }

    fn is_full(&self) -> bool {
        self.changes.len() >= MAX_CHANGES
    }

    fn has_parameter(&self, parameter: &str) -> bool {
        self.changes.iter().any(|c| c.parameter == parameter)
    }
}

fn grind_change(direction: &str, step: f64, new_grind: f64, reason: String) -> RecipeChange {
    let step_word = if step == 1.0 { "step" } else { "steps" };
    RecipeChange {
        parameter: "grind".to_string(),
        direction: direction.to_string(),
        amount: format!("{} {} {} (to {})", step, step_word, direction, new_grind),
        reason,
    }
}

/// Process one round of shot feedback against the active recommendation.
///
/// Never proposes more than two changes. `new_target` carries only the
/// fields that changed, for the caller to merge; all numeric changes are
/// clamped to machine and contract bounds before being reported.
pub fn calibrate(
    current: &Recommendation,
    input: &CalibrationInput,
    machine: &MachineProfile,
    iteration: u32,
) -> Result<CalibrationResponse, DialMateError> {
    validate_calibration_input(input)?;

    let (grind_min, grind_max) = machine.grind_range();
    let (dose_min, dose_max) = machine.dose_range();
    let current_grind = current
        .grinder
        .setting_value
        .as_number()
        .unwrap_or(FALLBACK_GRIND);

    // Coarse-scaled grinders need a bigger move to produce a perceptible
    // change in the cup
    let step = if grind_max - grind_min > 20.0 { 2.0 } else { 1.0 };

    let timing = classify_timing(input, current);
    let taste = classify_taste(input);
    let visual = classify_visual(input);

    debug!(
        "Calibration iteration {}: timing={:?}, taste={:?}, visual={:?}",
        iteration, timing, taste, visual
    );

    let mut changes = ChangeSet::default();
    let mut new_target = PartialTarget::default();
    let mut new_grind: Option<f64> = None;

    // Step 1: timing is the most impactful axis; channeling also resolves
    // through a finer grind
    if timing == TimingIssue::Fast || visual == VisualFinding::Channeling {
        let grind = clamp(current_grind - step, grind_min, grind_max);
        new_grind = Some(grind);
        let reason = if timing == TimingIssue::Fast {
            format!(
                "Shot ran too fast ({}s vs target {}s).",
                input.shot_time_s.unwrap_or_default(),
                current.target.time_s
            )
        } else {
            "Channeling detected, finer grind helps create more even resistance.".to_string()
        };
        changes.push(grind_change("finer", step, grind, reason));
    } else if timing == TimingIssue::Slow {
        let grind = clamp(current_grind + step, grind_min, grind_max);
        new_grind = Some(grind);
        changes.push(grind_change(
            "coarser",
            step,
            grind,
            format!(
                "Shot ran too slow ({}s vs target {}s).",
                input.shot_time_s.unwrap_or_default(),
                current.target.time_s
            ),
        ));
    }

    // Step 2: taste, unless the slots are already spent. A grind change from
    // step 1 pushes taste fixes onto a secondary parameter.
    if !changes.is_full() {
        let current_temp = current.target.temp_c.unwrap_or(DEFAULT_TEMP_C);
        match taste {
            TasteIssue::Sour if timing != TimingIssue::Fast => {
                if !changes.has_parameter("grind") {
                    let grind = clamp(current_grind - step, grind_min, grind_max);
                    new_grind = Some(grind);
                    changes.push(grind_change(
                        "finer",
                        step,
                        grind,
                        "Sour taste indicates under-extraction. Finer grind increases contact time."
                            .to_string(),
                    ));
                } else if machine.supports_temp_control && current_temp < TEMP_RANGE_C.1 {
                    let temp = clamp(current_temp + 1.0, TEMP_RANGE_C.0, TEMP_RANGE_C.1);
                    new_target.temp_c = Some(temp);
                    changes.push(RecipeChange {
                        parameter: "temperature".to_string(),
                        direction: "increase".to_string(),
                        amount: format!("+1°C (to {}°C)", temp),
                        reason: "Higher temperature helps extract more from under-extracted coffee."
                            .to_string(),
                    });
                }
            }
            TasteIssue::Bitter if timing != TimingIssue::Slow => {
                if !changes.has_parameter("grind") {
                    let grind = clamp(current_grind + step, grind_min, grind_max);
                    new_grind = Some(grind);
                    changes.push(grind_change(
                        "coarser",
                        step,
                        grind,
                        "Bitter taste indicates over-extraction. Coarser grind reduces contact time."
                            .to_string(),
                    ));
                } else if machine.supports_temp_control && current_temp > TEMP_RANGE_C.0 {
                    let temp = clamp(current_temp - 1.0, TEMP_RANGE_C.0, TEMP_RANGE_C.1);
                    new_target.temp_c = Some(temp);
                    changes.push(RecipeChange {
                        parameter: "temperature".to_string(),
                        direction: "decrease".to_string(),
                        amount: format!("-1°C (to {}°C)", temp),
                        reason: "Lower temperature reduces extraction to counter bitterness."
                            .to_string(),
                    });
                }
            }
            TasteIssue::Weak => {
                if !changes.has_parameter("grind") {
                    let dose = clamp(current.target.dose_g + 1.0, dose_min, dose_max);
                    new_target.dose_g = Some(dose);
                    changes.push(RecipeChange {
                        parameter: "dose".to_string(),
                        direction: "increase".to_string(),
                        amount: format!("+1g (to {}g)", dose),
                        reason: "Weak body, more coffee grounds will increase strength and body."
                            .to_string(),
                    });
                } else {
                    let yield_g = (current.target.yield_g - 4.0).max(current.target.dose_g);
                    new_target.yield_g = Some(yield_g);
                    changes.push(RecipeChange {
                        parameter: "yield".to_string(),
                        direction: "decrease".to_string(),
                        amount: format!("-4g (to {}g)", yield_g),
                        reason: "Shorter ratio concentrates flavour for more body.".to_string(),
                    });
                }
            }
            TasteIssue::Astringent => {
                if !changes.has_parameter("grind") {
                    let grind = clamp(current_grind + step, grind_min, grind_max);
                    new_grind = Some(grind);
                    changes.push(grind_change(
                        "coarser",
                        step,
                        grind,
                        "Astringency often comes from channeling or over-extraction. Try coarser grind."
                            .to_string(),
                    ));
                }
            }
            _ => {}
        }
    }

    // Step 3: spritzing is a puck-prep problem, not a recipe problem
    if !changes.is_full() && visual == VisualFinding::Spritzing {
        changes.push(RecipeChange {
            parameter: "prep".to_string(),
            direction: "improve".to_string(),
            amount: "Better distribution + WDT".to_string(),
            reason: "Spritzing indicates uneven puck, use WDT tool and ensure even distribution."
                .to_string(),
        });
    }

    let changes = changes.changes;

    // Terminal state: nothing to change, the shot is dialed in
    if changes.is_empty() {
        let response = CalibrationResponse {
            changes,
            new_target: PartialTarget::default(),
            new_grind: None,
            explanation:
                "Your shot is dialled in. Save this as your baseline for this bean and machine combination."
                    .to_string(),
            iteration,
        };
        validate_calibration_response(&response)?;
        return Ok(response);
    }

    let explanation = if changes.len() == 1 {
        format!("Make one change: {}. {}", changes[0].amount, changes[0].reason)
    } else {
        format!(
            "Make two changes: (1) {} - {} (2) {} - {}",
            changes[0].amount, changes[0].reason, changes[1].amount, changes[1].reason
        )
    };

    let response = CalibrationResponse {
        changes,
        new_target,
        new_grind: new_grind.map(SettingValue::Number),
        explanation,
        iteration,
    };
    validate_calibration_response(&response)?;
    Ok(response)
}
