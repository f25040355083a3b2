//! The recipe synthesizer: combines machine capability constraints,
//! roast-level baselines, an optional saved baseline recipe, and freshness
//! offsets into a validated `Recommendation`.

use tracing::debug;

use crate::contract::{
    clamp, validate_recommendation, BaselineRecipe, BeanContext, FreshnessContext, Grinder,
    GrinderSetting, MachineProfile, NextAdjustments, Recommendation, RecommendationTarget,
    RoastLevel, SettingValue, AdjustmentType, DOSE_RANGE_G, TEMP_RANGE_C, TIME_RANGE_S,
    YIELD_RANGE_G,
};
use crate::error::DialMateError;
use crate::freshness::{adjustment_for, FreshnessAdjustment};

use super::baselines::{baseline_for, RoastBaseline};
use super::notes::{default_rules, notes_for_machine};

/// Version tag stamped on every recommendation, for forward compatibility
/// of stored objects.
pub const ENGINE_VERSION: &str = "2.0.0";

/// Everything the synthesizer needs, resolved to plain values by the caller.
#[derive(Debug, Clone)]
pub struct SynthesisInput {
    pub machine: MachineProfile,
    pub bean: BeanContext,
    /// Takes precedence over the bean's roast-level signal
    pub roast_override: Option<RoastLevel>,
    pub freshness: Option<FreshnessContext>,
    pub baseline: Option<BaselineRecipe>,
    pub grinder: Option<Grinder>,
}

/// Position the base grind within the machine's grind range at a
/// roast-dependent fraction, apply the roast grind bias, clamp and round.
fn base_grind(machine: &MachineProfile, roast_level: RoastLevel, baseline: &RoastBaseline) -> f64 {
    let (min, max) = machine.grind_range();
    let position = match roast_level {
        RoastLevel::Light => 0.35,
        RoastLevel::Medium => 0.5,
        RoastLevel::MediumDark => 0.6,
        RoastLevel::Dark => 0.7,
    };
    let raw = min + (max - min) * position + baseline.grind_bias;
    clamp(raw, min, max).round()
}

/// Generate a deterministic, structured recommendation.
///
/// Pure function of its inputs: no I/O, no clock reads, no randomness.
/// The assembled object is validated against the contract before being
/// returned; a validation failure indicates a construction defect and is
/// surfaced as `Err`, never silently repaired.
pub fn synthesize(input: &SynthesisInput) -> Result<Recommendation, DialMateError> {
    let roast_level = input
        .roast_override
        .unwrap_or_else(|| RoastLevel::from_signal(input.bean.roast_level.as_deref()));
    let roast_baseline = baseline_for(roast_level);

    let days_off_roast = input.freshness.as_ref().map(FreshnessContext::days_off_roast);
    let freshness_adj: Option<FreshnessAdjustment> =
        days_off_roast.map(|days| adjustment_for(days, roast_level));

    let (grind_min, grind_max) = input.machine.grind_range();
    let (dose_min, dose_max) = input.machine.dose_range();

    debug!(
        "Synthesizing for '{}' on '{}' (roast={:?}, days_off_roast={:?})",
        input.bean.name, input.machine.name, roast_level, days_off_roast
    );

    // Starting point: saved baseline recipe if present, else roast defaults
    let mut dose_g;
    let mut grind_setting;
    let mut time_s;
    let mut temp_c;
    if let Some(saved) = &input.baseline {
        dose_g = saved.dose_g;
        grind_setting = saved
            .grind_setting_value()
            .unwrap_or_else(|| base_grind(&input.machine, roast_level, &roast_baseline));
        time_s = saved.time_s;
        temp_c = saved.temp_c.unwrap_or(roast_baseline.temp_c);
    } else {
        dose_g = clamp(roast_baseline.dose_g, dose_min, dose_max);
        grind_setting = base_grind(&input.machine, roast_level, &roast_baseline);
        time_s = roast_baseline.time_s;
        temp_c = roast_baseline.temp_c;
    }

    // Freshness offsets
    if let Some(adj) = &freshness_adj {
        grind_setting = clamp((grind_setting + adj.grind_offset).round(), grind_min, grind_max);
        dose_g = clamp(dose_g + adj.dose_offset_g, dose_min, dose_max);
        time_s = (time_s + adj.time_offset_s).max(TIME_RANGE_S.0);
        if input.machine.supports_temp_control {
            temp_c = clamp(temp_c + adj.temp_offset_c, TEMP_RANGE_C.0, TEMP_RANGE_C.1);
        }
    }

    let yield_offset = freshness_adj.as_ref().map_or(0.0, |a| a.yield_offset_g);
    let yield_g = (dose_g * roast_baseline.ratio + yield_offset).round();

    // Rationale: bean/roast, roast-level notes, freshness notes, baseline
    // note, machine-family notes, in that order
    let mut rationale = vec![format!(
        "{} by {} is a {} roast.",
        input.bean.name,
        input.bean.roaster,
        roast_level.hyphenated()
    )];
    rationale.extend(roast_baseline.notes.iter().map(|n| n.to_string()));
    if let Some(adj) = &freshness_adj {
        rationale.extend(adj.notes.iter().cloned());
    }
    if let Some(saved) = &input.baseline {
        rationale.push(format!(
            "Starting from your saved baseline (grind {}, {}g dose).",
            saved.grind_setting, saved.dose_g
        ));
    }
    rationale.extend(notes_for_machine(&default_rules(), &input.machine.name));

    // Prep steps
    let mut prep = vec![
        format!("Dose {}g of freshly ground coffee.", dose_g),
        "Distribute evenly in the basket using WDT or tapping.".to_string(),
        "Tamp firmly and level (about 15kg of pressure).".to_string(),
    ];
    let preinfusion = freshness_adj
        .as_ref()
        .is_some_and(|a| a.preinfusion_recommended);
    if preinfusion && input.machine.supports_preinfusion {
        prep.push("Use 5-8 second preinfusion to allow CO2 to escape from fresh beans.".to_string());
    }

    let expected_taste: Vec<String> = match roast_level {
        RoastLevel::Light => ["Bright acidity", "Fruity or floral notes", "Light body", "Clean finish"],
        RoastLevel::Medium => ["Balanced sweetness", "Chocolate and caramel", "Medium body", "Mild acidity"],
        RoastLevel::MediumDark => ["Chocolate and toffee", "Low acidity", "Full body", "Smooth finish"],
        RoastLevel::Dark => ["Smoky and bold", "Dark chocolate", "Heavy body", "Minimal acidity"],
    }
    .iter()
    .map(|s| s.to_string())
    .collect();

    // Grinder notes: external grinder first, then built-in, then generic
    let mut grinder_notes = Vec::new();
    if let Some(grinder) = &input.grinder {
        grinder_notes.push(format!("Using {} {}.", grinder.brand, grinder.model));
        match grinder.adjustment_type {
            AdjustmentType::Stepped => {
                grinder_notes.push("Stepped grinder, adjust in whole clicks.".to_string());
            }
            AdjustmentType::Stepless => {
                grinder_notes
                    .push("Stepless grinder, make small, incremental adjustments.".to_string());
            }
            AdjustmentType::Digital => {}
        }
    } else if input.machine.has_builtin_grinder {
        grinder_notes.push(format!("Using {} built-in grinder.", input.machine.name));
    }
    if grinder_notes.is_empty() {
        grinder_notes.push(format!(
            "Set grind to {} on your {}.",
            grind_setting, input.machine.name
        ));
    }

    // Confidence: base plus a bump for each signal the caller supplied
    let mut confidence: f64 = 0.6;
    if input.baseline.is_some() {
        confidence += 0.2;
    }
    if days_off_roast.is_some() {
        confidence += 0.1;
    }
    if input.grinder.is_some() {
        confidence += 0.05;
    }
    let confidence = (confidence.min(0.95) * 100.0).round() / 100.0;

    // Fixed-step suggestions for the five failure categories, roughly 3% of
    // the grind range per step, never less than one unit
    let step = ((grind_max - grind_min) * 0.03).round().max(1.0);
    let step_word = if step == 1.0 { "step" } else { "steps" };
    let next_adjustments = NextAdjustments {
        if_fast: vec![
            format!(
                "Grind {} {} finer (to {}).",
                step,
                step_word,
                clamp(grind_setting - step, grind_min, grind_max)
            ),
            "If still fast, increase dose by 0.5g.".to_string(),
        ],
        if_slow: vec![
            format!(
                "Grind {} {} coarser (to {}).",
                step,
                step_word,
                clamp(grind_setting + step, grind_min, grind_max)
            ),
            "If still slow, decrease dose by 0.5g.".to_string(),
        ],
        if_sour: vec![
            format!("Grind {} {} finer to increase extraction.", step, step_word),
            if input.machine.supports_temp_control {
                format!("Increase temperature by 1°C (to {}°C).", temp_c + 1.0)
            } else {
                "If possible, increase water temperature.".to_string()
            },
        ],
        if_bitter: vec![
            format!("Grind {} {} coarser to reduce extraction.", step, step_word),
            if input.machine.supports_temp_control {
                format!("Decrease temperature by 1°C (to {}°C).", temp_c - 1.0)
            } else {
                "Reduce contact time by pulling a shorter shot.".to_string()
            },
        ],
        if_weak: vec![
            "Increase dose by 1g.".to_string(),
            format!("Reduce yield by 2-4g (aim for {}g).", (yield_g - 4.0).max(dose_g)),
        ],
    };

    let target = RecommendationTarget {
        dose_g: clamp((dose_g * 10.0).round() / 10.0, DOSE_RANGE_G.0, DOSE_RANGE_G.1),
        yield_g: clamp(yield_g, YIELD_RANGE_G.0, YIELD_RANGE_G.1),
        time_s: clamp(time_s, TIME_RANGE_S.0, TIME_RANGE_S.1),
        temp_c: input.machine.supports_temp_control.then_some(temp_c),
        pressure_bar: input.machine.supports_pressure_control.then_some(9.0),
    };

    let recommendation = Recommendation {
        target,
        grinder: GrinderSetting {
            setting_value: SettingValue::Number(grind_setting),
            micro_adjustment: None,
            notes: grinder_notes,
        },
        prep,
        expected_taste,
        next_adjustments,
        confidence,
        rationale,
        version: ENGINE_VERSION.to_string(),
    };

    validate_recommendation(&recommendation)?;
    Ok(recommendation)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_machine() -> MachineProfile {
        MachineProfile {
            id: "m1".to_string(),
            name: "Sage Barista Pro".to_string(),
            grind_min: Some(1.0),
            grind_max: Some(30.0),
            espresso_min: Some(8.0),
            espresso_max: Some(15.0),
            dose_min_g: Some(14.0),
            dose_max_g: Some(20.0),
            has_builtin_grinder: true,
            supports_temp_control: false,
            supports_pressure_control: false,
            supports_preinfusion: false,
        }
    }

    fn make_bean(roast: &str) -> BeanContext {
        BeanContext {
            name: "Kiamabara AA".to_string(),
            roaster: "Square Mile".to_string(),
            roast_level: Some(roast.to_string()),
        }
    }

    fn make_input(roast: &str) -> SynthesisInput {
        SynthesisInput {
            machine: make_machine(),
            bean: make_bean(roast),
            roast_override: None,
            freshness: None,
            baseline: None,
            grinder: None,
        }
    }

    #[test]
    fn test_light_roast_baseline_recipe() {
        // Espresso range [8,15], light roast: 8 + 7*0.35 - 1 = 9.45 -> 9
        let rec = synthesize(&make_input("light")).unwrap();
        assert_eq!(rec.grinder.setting_value, SettingValue::Number(9.0));
        assert_eq!(rec.target.dose_g, 18.0);
        assert_eq!(rec.target.yield_g, 40.0);
        assert_eq!(rec.target.time_s, 28.0);
        assert_eq!(rec.target.temp_c, None);
        assert_eq!(rec.target.pressure_bar, None);
        assert_eq!(rec.version, ENGINE_VERSION);
    }

    #[test]
    fn test_very_fresh_light_roast_coarsens_and_slows() {
        let mut input = make_input("light");
        input.freshness = Some(FreshnessContext::DaysOffRoast(2));
        let rec = synthesize(&input).unwrap();
        assert_eq!(rec.grinder.setting_value, SettingValue::Number(11.0));
        assert_eq!(rec.target.dose_g, 18.0);
        assert_eq!(rec.target.yield_g, 40.0);
        assert_eq!(rec.target.time_s, 31.0);
        assert!(rec.rationale.iter().any(|r| r.contains("very fresh")));
    }

    #[test]
    fn test_roast_override_takes_precedence() {
        let mut input = make_input("light");
        input.roast_override = Some(RoastLevel::Dark);
        let rec = synthesize(&input).unwrap();
        // Dark: 8 + 7*0.7 + 1 = 13.9 -> 14; dose 17, yield round(17*1.8)=31
        assert_eq!(rec.grinder.setting_value, SettingValue::Number(14.0));
        assert_eq!(rec.target.dose_g, 17.0);
        assert_eq!(rec.target.yield_g, 31.0);
        assert_eq!(rec.target.time_s, 25.0);
    }

    #[test]
    fn test_missing_grind_range_uses_fallback() {
        let mut input = make_input("medium");
        input.machine.grind_min = None;
        input.machine.grind_max = None;
        input.machine.espresso_min = None;
        input.machine.espresso_max = None;
        let rec = synthesize(&input).unwrap();
        // Fallback [1,30], medium: 1 + 29*0.5 + 0 = 15.5 -> 16
        assert_eq!(rec.grinder.setting_value, SettingValue::Number(16.0));
    }

    #[test]
    fn test_baseline_recipe_overrides_starting_point() {
        let mut input = make_input("light");
        input.baseline = Some(BaselineRecipe {
            dose_g: 17.5,
            yield_g: 38.0,
            time_s: 30.0,
            grind_setting: "12".to_string(),
            temp_c: None,
        });
        let rec = synthesize(&input).unwrap();
        assert_eq!(rec.grinder.setting_value, SettingValue::Number(12.0));
        assert_eq!(rec.target.dose_g, 17.5);
        assert_eq!(rec.target.time_s, 30.0);
        // Yield still derived from dose and roast ratio: round(17.5*2.2)=39
        assert_eq!(rec.target.yield_g, 39.0);
        assert!(rec
            .rationale
            .iter()
            .any(|r| r.contains("saved baseline")));
    }

    #[test]
    fn test_unparseable_baseline_grind_falls_back_to_computed() {
        let mut input = make_input("light");
        input.baseline = Some(BaselineRecipe {
            dose_g: 18.0,
            yield_g: 40.0,
            time_s: 28.0,
            grind_setting: "just past burr touch".to_string(),
            temp_c: None,
        });
        let rec = synthesize(&input).unwrap();
        assert_eq!(rec.grinder.setting_value, SettingValue::Number(9.0));
    }

    #[test]
    fn test_temp_and_pressure_only_when_supported() {
        let mut input = make_input("medium");
        input.machine.supports_temp_control = true;
        input.machine.supports_pressure_control = true;
        let rec = synthesize(&input).unwrap();
        assert_eq!(rec.target.temp_c, Some(93.0));
        assert_eq!(rec.target.pressure_bar, Some(9.0));
    }

    #[test]
    fn test_preinfusion_step_needs_machine_support() {
        let mut input = make_input("light");
        input.freshness = Some(FreshnessContext::DaysOffRoast(2));
        let rec = synthesize(&input).unwrap();
        assert!(!rec.prep.iter().any(|p| p.contains("preinfusion")));

        input.machine.supports_preinfusion = true;
        let rec = synthesize(&input).unwrap();
        assert!(rec.prep.iter().any(|p| p.contains("preinfusion")));
    }

    #[test]
    fn test_machine_family_note_included() {
        let rec = synthesize(&make_input("medium")).unwrap();
        assert!(rec
            .rationale
            .iter()
            .any(|r| r.contains("one click at a time")));
    }

    #[test]
    fn test_grinder_notes_priority() {
        // External grinder descriptor wins over the built-in grinder
        let mut input = make_input("medium");
        input.grinder = Some(Grinder {
            brand: "Niche".to_string(),
            model: "Zero".to_string(),
            adjustment_type: AdjustmentType::Stepless,
        });
        let rec = synthesize(&input).unwrap();
        assert!(rec.grinder.notes[0].contains("Niche Zero"));
        assert!(rec.grinder.notes[1].contains("Stepless"));

        // Built-in grinder naming
        input.grinder = None;
        let rec = synthesize(&input).unwrap();
        assert_eq!(rec.grinder.notes, vec!["Using Sage Barista Pro built-in grinder.".to_string()]);

        // Generic fallback
        input.machine.has_builtin_grinder = false;
        let rec = synthesize(&input).unwrap();
        assert!(rec.grinder.notes[0].starts_with("Set grind to"));
    }

    #[test]
    fn test_confidence_accumulates_and_caps() {
        let base = synthesize(&make_input("medium")).unwrap().confidence;
        assert_eq!(base, 0.6);

        let mut input = make_input("medium");
        input.freshness = Some(FreshnessContext::DaysOffRoast(10));
        assert_eq!(synthesize(&input).unwrap().confidence, 0.7);

        input.baseline = Some(BaselineRecipe {
            dose_g: 18.0,
            yield_g: 36.0,
            time_s: 27.0,
            grind_setting: "10".to_string(),
            temp_c: None,
        });
        assert_eq!(synthesize(&input).unwrap().confidence, 0.9);

        input.grinder = Some(Grinder {
            brand: "DF64".to_string(),
            model: "Gen 2".to_string(),
            adjustment_type: AdjustmentType::Stepless,
        });
        assert_eq!(synthesize(&input).unwrap().confidence, 0.95);
    }

    #[test]
    fn test_next_adjustments_reference_computed_grind() {
        let rec = synthesize(&make_input("light")).unwrap();
        // Range 7 units: step = max(1, round(0.21)) = 1
        assert!(rec.next_adjustments.if_fast[0].contains("1 step finer (to 8)"));
        assert!(rec.next_adjustments.if_slow[0].contains("1 step coarser (to 10)"));
        assert_eq!(rec.next_adjustments.if_weak.len(), 2);
    }

    #[test]
    fn test_stale_beans_shorten_recipe() {
        let mut input = make_input("medium");
        input.freshness = Some(FreshnessContext::DaysOffRoast(50));
        let rec = synthesize(&input).unwrap();
        // Medium base: grind 12 (8+3.5 -> 11.5 -> 12), stale -2 -> 10
        assert_eq!(rec.grinder.setting_value, SettingValue::Number(10.0));
        // Dose 18+1=19, yield round(19*2.0 - 4) = 34, time 27-3=24
        assert_eq!(rec.target.dose_g, 19.0);
        assert_eq!(rec.target.yield_g, 34.0);
        assert_eq!(rec.target.time_s, 24.0);
    }

    #[test]
    fn test_roast_date_context_derives_days() {
        use chrono::NaiveDate;
        let mut input = make_input("light");
        input.freshness = Some(FreshnessContext::RoastDate {
            roasted_on: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            today: NaiveDate::from_ymd_opt(2025, 6, 3).unwrap(),
        });
        let rec = synthesize(&input).unwrap();
        // 2 days -> very_fresh, same as the explicit day count
        assert_eq!(rec.target.time_s, 31.0);
    }

    #[test]
    fn test_targets_stay_in_contract_bounds() {
        // Sweep machines and roasts; every output must satisfy the contract
        let roasts = ["light", "medium", "medium-dark", "dark"];
        let ranges = [
            (Some(8.0), Some(15.0)),
            (Some(1.0), Some(40.0)),
            (None, None),
        ];
        let days = [None, Some(0), Some(6), Some(14), Some(30), Some(100)];
        for roast in roasts {
            for (lo, hi) in ranges {
                for d in days {
                    let mut input = make_input(roast);
                    input.machine.espresso_min = lo;
                    input.machine.espresso_max = hi;
                    input.machine.grind_min = None;
                    input.machine.grind_max = None;
                    input.freshness = d.map(FreshnessContext::DaysOffRoast);
                    let rec = synthesize(&input).unwrap();
                    let (gmin, gmax) = input.machine.grind_range();
                    let grind = rec.grinder.setting_value.as_number().unwrap();
                    assert!(grind >= gmin && grind <= gmax);
                }
            }
        }
    }

    #[test]
    fn test_identical_inputs_identical_output() {
        let mut input = make_input("light");
        input.freshness = Some(FreshnessContext::DaysOffRoast(2));
        let a = synthesize(&input).unwrap();
        let b = synthesize(&input).unwrap();
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }
}
