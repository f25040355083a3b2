//! Type definitions shared by the recipe synthesizer and calibration engine.
//!
//! Input records arrive from the caller's record store already resolved;
//! output types are serialized to the caller verbatim.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// =============================================================================
// INPUT RECORD TYPES (supplied by the caller)
// =============================================================================

/// Capability description of an espresso machine.
///
/// Grind ranges are optional because many machines ship without a numbered
/// scale; `grind_range()` encodes the fallback chain the engines rely on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MachineProfile {
    pub id: String,
    /// Display name, also used for machine-family guidance matching
    pub name: String,
    /// Full grinder scale range, if the machine has one
    #[serde(default)]
    pub grind_min: Option<f64>,
    #[serde(default)]
    pub grind_max: Option<f64>,
    /// Espresso-specific sub-range of the grinder scale, preferred over the
    /// full range when present
    #[serde(default)]
    pub espresso_min: Option<f64>,
    #[serde(default)]
    pub espresso_max: Option<f64>,
    /// Recommended dose range for the stock basket
    #[serde(default)]
    pub dose_min_g: Option<f64>,
    #[serde(default)]
    pub dose_max_g: Option<f64>,
    #[serde(default)]
    pub has_builtin_grinder: bool,
    #[serde(default)]
    pub supports_temp_control: bool,
    #[serde(default)]
    pub supports_pressure_control: bool,
    #[serde(default)]
    pub supports_preinfusion: bool,
}

impl MachineProfile {
    /// Grind value range used for all setting math: espresso sub-range if
    /// present, else the full scale, else the `[1, 30]` fallback.
    pub fn grind_range(&self) -> (f64, f64) {
        let min = self.espresso_min.or(self.grind_min).unwrap_or(FALLBACK_GRIND_MIN);
        let max = self.espresso_max.or(self.grind_max).unwrap_or(FALLBACK_GRIND_MAX);
        (min, max)
    }

    /// Dose range, defaulting to 14-20g when the record carries none.
    pub fn dose_range(&self) -> (f64, f64) {
        (
            self.dose_min_g.unwrap_or(DEFAULT_DOSE_MIN_G),
            self.dose_max_g.unwrap_or(DEFAULT_DOSE_MAX_G),
        )
    }
}

const FALLBACK_GRIND_MIN: f64 = 1.0;
const FALLBACK_GRIND_MAX: f64 = 30.0;
const DEFAULT_DOSE_MIN_G: f64 = 14.0;
const DEFAULT_DOSE_MAX_G: f64 = 20.0;

/// A coffee bean as the caller knows it. `roast_level` is a free-text signal
/// ("Medium-Dark", "omni/light", ...) normalized via `RoastLevel::from_signal`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BeanContext {
    pub name: String,
    pub roaster: String,
    #[serde(default)]
    pub roast_level: Option<String>,
}

/// Canonical roast levels. Closed set; every lookup table in the crate
/// matches exhaustively over it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RoastLevel {
    Light,
    Medium,
    MediumDark,
    Dark,
}

impl RoastLevel {
    /// Normalize a free-text roast signal using case/punctuation-insensitive
    /// substring matching. Priority order prevents false positives
    /// ("medium dark" must not match as plain medium or dark). An absent or
    /// unrecognized signal falls back to `Medium` by design.
    pub fn from_signal(raw: Option<&str>) -> RoastLevel {
        let Some(raw) = raw else {
            return RoastLevel::Medium;
        };
        let l: String = raw
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .collect();
        if l.contains("light") {
            RoastLevel::Light
        } else if l.contains("mediumdark") || l.contains("meddark") {
            RoastLevel::MediumDark
        } else if l.contains("dark") {
            RoastLevel::Dark
        } else if l.contains("medium") || l.contains("med") {
            RoastLevel::Medium
        } else {
            RoastLevel::Medium
        }
    }

    /// Display form used in prose ("medium-dark roast").
    pub fn hyphenated(&self) -> &'static str {
        match self {
            RoastLevel::Light => "light",
            RoastLevel::Medium => "medium",
            RoastLevel::MediumDark => "medium-dark",
            RoastLevel::Dark => "dark",
        }
    }
}

/// Freshness context: either an explicit day count or a roast date plus the
/// caller's "today". The engines never read the wall clock themselves.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum FreshnessContext {
    DaysOffRoast(u32),
    RoastDate { roasted_on: NaiveDate, today: NaiveDate },
}

impl FreshnessContext {
    /// Whole days since roast, floored at zero.
    pub fn days_off_roast(&self) -> u32 {
        match self {
            FreshnessContext::DaysOffRoast(days) => *days,
            FreshnessContext::RoastDate { roasted_on, today } => {
                today.signed_duration_since(*roasted_on).num_days().max(0) as u32
            }
        }
    }
}

/// How a grinder's collar adjusts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentType {
    Stepped,
    Stepless,
    Digital,
}

/// External grinder descriptor. Only the fields the engines consume; the
/// record store's scale metadata stays with the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Grinder {
    pub brand: String,
    pub model: String,
    pub adjustment_type: AdjustmentType,
}

/// A previously saved, user-confirmed successful recipe for the same
/// bean + machine. Displaces the roast-level default as the synthesis
/// starting point.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BaselineRecipe {
    pub dose_g: f64,
    pub yield_g: f64,
    pub time_s: f64,
    /// Saved as a string because stepless grinders use labels ("2.5 turns")
    pub grind_setting: String,
    #[serde(default)]
    pub temp_c: Option<f64>,
}

impl BaselineRecipe {
    /// Numeric grind value parsed from the saved setting, if the label
    /// starts with a number.
    pub fn grind_setting_value(&self) -> Option<f64> {
        leading_number(&self.grind_setting)
    }
}

// =============================================================================
// RECOMMENDATION OUTPUT TYPES
// =============================================================================

/// The numeric brew target. Bounds per field are fixed by the contract
/// (see `validation`); construction sites clamp into them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationTarget {
    pub dose_g: f64,
    pub yield_g: f64,
    pub time_s: f64,
    /// Only present when the machine supports temperature control
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_c: Option<f64>,
    /// Only present when the machine supports pressure control
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure_bar: Option<f64>,
}

/// A grind setting value: a number on scaled grinders, an opaque label on
/// stepless or dial-less machines.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum SettingValue {
    Number(f64),
    Label(String),
}

impl SettingValue {
    /// Numeric view of the setting. Labels are parsed by leading number
    /// ("7.5 on the collar" reads as 7.5); pure text yields `None`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            SettingValue::Number(n) => Some(*n),
            SettingValue::Label(s) => leading_number(s),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GrinderSetting {
    pub setting_value: SettingValue,
    /// Fine-tuning hint for stepless scales; kept for wire-contract parity
    /// with stored recommendations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub micro_adjustment: Option<String>,
    pub notes: Vec<String>,
}

/// Pre-computed corrective suggestions for the five qualitative failure
/// categories a user reports after a shot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NextAdjustments {
    pub if_fast: Vec<String>,
    pub if_slow: Vec<String>,
    pub if_sour: Vec<String>,
    pub if_bitter: Vec<String>,
    pub if_weak: Vec<String>,
}

/// Complete output of the recipe synthesizer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub target: RecommendationTarget,
    pub grinder: GrinderSetting,
    /// Ordered preparation steps
    pub prep: Vec<String>,
    pub expected_taste: Vec<String>,
    pub next_adjustments: NextAdjustments,
    /// 0.0 - 1.0, capped at 0.95
    pub confidence: f64,
    /// Ordered explanatory strings: bean/roast, roast-level notes, freshness
    /// notes, baseline note, machine-family notes
    pub rationale: Vec<String>,
    /// Engine version tag for forward compatibility of stored recommendations
    pub version: String,
}

// =============================================================================
// CALIBRATION TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TasteTag {
    Sour,
    Bitter,
    Weak,
    Astringent,
    Balanced,
    Perfect,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VisualIssue {
    Channeling,
    Spritzing,
    UnevenExtraction,
    None,
}

/// One shot's worth of feedback. Measurements are optional; taste and visual
/// tags may be empty (an empty report classifies as "ok" on that axis).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalibrationInput {
    #[serde(default)]
    pub shot_time_s: Option<f64>,
    #[serde(default)]
    pub actual_yield_g: Option<f64>,
    pub taste: Vec<TasteTag>,
    pub visual_issues: Vec<VisualIssue>,
    /// Free-text observation, carried through by the caller, not interpreted
    #[serde(default)]
    pub notes: Option<String>,
}

/// A single proposed parameter change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecipeChange {
    /// "grind", "temperature", "dose", "yield", or "prep"
    pub parameter: String,
    pub direction: String,
    /// Human-readable magnitude, e.g. "1 step finer (to 10)"
    pub amount: String,
    pub reason: String,
}

/// Partial brew target: only the fields a calibration round changed.
/// The caller merges it into the active recommendation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PartialTarget {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dose_g: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yield_g: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_s: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_c: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure_bar: Option<f64>,
}

impl PartialTarget {
    pub fn is_empty(&self) -> bool {
        self.dose_g.is_none()
            && self.yield_g.is_none()
            && self.time_s.is_none()
            && self.temp_c.is_none()
            && self.pressure_bar.is_none()
    }
}

/// Output of one calibration round. At most two changes; an empty change
/// list is the loop's terminal "dialed in" state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalibrationResponse {
    pub changes: Vec<RecipeChange>,
    pub new_target: PartialTarget,
    /// Proposed grind setting when a grind change is among the changes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_grind: Option<SettingValue>,
    pub explanation: String,
    /// Supplied by the caller; the engine is stateless across iterations
    pub iteration: u32,
}

/// Parse the leading numeric prefix of a string ("7.5 turns" -> 7.5).
fn leading_number(s: &str) -> Option<f64> {
    let t = s.trim();
    let mut end = 0;
    for (i, c) in t.char_indices() {
        let part_of_number =
            c.is_ascii_digit() || c == '.' || (i == 0 && (c == '-' || c == '+'));
        if !part_of_number {
            break;
        }
        end = i + c.len_utf8();
    }
    t[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roast_level_light_variants() {
        assert_eq!(RoastLevel::from_signal(Some("Light")), RoastLevel::Light);
        assert_eq!(RoastLevel::from_signal(Some("light roast")), RoastLevel::Light);
        assert_eq!(RoastLevel::from_signal(Some("LIGHT/omni")), RoastLevel::Light);
    }

    #[test]
    fn test_roast_level_medium_dark_before_dark() {
        assert_eq!(
            RoastLevel::from_signal(Some("Medium-Dark")),
            RoastLevel::MediumDark
        );
        assert_eq!(
            RoastLevel::from_signal(Some("medium dark")),
            RoastLevel::MediumDark
        );
        assert_eq!(RoastLevel::from_signal(Some("med-dark")), RoastLevel::MediumDark);
        assert_eq!(RoastLevel::from_signal(Some("Dark")), RoastLevel::Dark);
        assert_eq!(RoastLevel::from_signal(Some("French (dark)")), RoastLevel::Dark);
    }

    #[test]
    fn test_roast_level_defaults_to_medium() {
        assert_eq!(RoastLevel::from_signal(None), RoastLevel::Medium);
        assert_eq!(RoastLevel::from_signal(Some("")), RoastLevel::Medium);
        assert_eq!(RoastLevel::from_signal(Some("omni")), RoastLevel::Medium);
        assert_eq!(RoastLevel::from_signal(Some("Medium")), RoastLevel::Medium);
        assert_eq!(RoastLevel::from_signal(Some("med.")), RoastLevel::Medium);
    }

    #[test]
    fn test_grind_range_fallback_chain() {
        let mut machine = MachineProfile {
            id: "m1".to_string(),
            name: "Test Machine".to_string(),
            grind_min: Some(1.0),
            grind_max: Some(30.0),
            espresso_min: Some(8.0),
            espresso_max: Some(15.0),
            dose_min_g: None,
            dose_max_g: None,
            has_builtin_grinder: true,
            supports_temp_control: false,
            supports_pressure_control: false,
            supports_preinfusion: false,
        };
        assert_eq!(machine.grind_range(), (8.0, 15.0));

        machine.espresso_min = None;
        machine.espresso_max = None;
        assert_eq!(machine.grind_range(), (1.0, 30.0));

        machine.grind_min = None;
        machine.grind_max = None;
        assert_eq!(machine.grind_range(), (1.0, 30.0));

        assert_eq!(machine.dose_range(), (14.0, 20.0));
    }

    #[test]
    fn test_machine_profile_deserialize_sparse() {
        // A record-store row with most capability columns missing
        let json = r#"{"id": "m2", "name": "Flair 58"}"#;
        let machine: MachineProfile = serde_json::from_str(json).unwrap();
        assert_eq!(machine.grind_range(), (1.0, 30.0));
        assert!(!machine.supports_preinfusion);
    }

    #[test]
    fn test_days_off_roast_from_date() {
        let ctx = FreshnessContext::RoastDate {
            roasted_on: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            today: NaiveDate::from_ymd_opt(2025, 3, 11).unwrap(),
        };
        assert_eq!(ctx.days_off_roast(), 10);
    }

    #[test]
    fn test_days_off_roast_future_date_floors_at_zero() {
        let ctx = FreshnessContext::RoastDate {
            roasted_on: NaiveDate::from_ymd_opt(2025, 3, 11).unwrap(),
            today: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        };
        assert_eq!(ctx.days_off_roast(), 0);
    }

    #[test]
    fn test_setting_value_as_number() {
        assert_eq!(SettingValue::Number(9.0).as_number(), Some(9.0));
        assert_eq!(SettingValue::Label("7.5 turns".to_string()).as_number(), Some(7.5));
        assert_eq!(SettingValue::Label("fine".to_string()).as_number(), None);
    }

    #[test]
    fn test_setting_value_untagged_serde() {
        let n: SettingValue = serde_json::from_str("9").unwrap();
        assert_eq!(n, SettingValue::Number(9.0));
        let s: SettingValue = serde_json::from_str(r#""2.5 turns from closed""#).unwrap();
        assert_eq!(s, SettingValue::Label("2.5 turns from closed".to_string()));
    }

    #[test]
    fn test_baseline_grind_setting_value() {
        let baseline = BaselineRecipe {
            dose_g: 18.0,
            yield_g: 36.0,
            time_s: 28.0,
            grind_setting: "11".to_string(),
            temp_c: None,
        };
        assert_eq!(baseline.grind_setting_value(), Some(11.0));

        let labelled = BaselineRecipe {
            grind_setting: "just past burr touch".to_string(),
            ..baseline
        };
        assert_eq!(labelled.grind_setting_value(), None);
    }

    #[test]
    fn test_taste_and_visual_tags_serde() {
        let input: CalibrationInput = serde_json::from_str(
            r#"{
                "shot_time_s": 18,
                "taste": ["sour", "weak"],
                "visual_issues": ["channeling", "none"]
            }"#,
        )
        .unwrap();
        assert_eq!(input.shot_time_s, Some(18.0));
        assert_eq!(input.actual_yield_g, None);
        assert_eq!(input.taste, vec![TasteTag::Sour, TasteTag::Weak]);
        assert_eq!(
            input.visual_issues,
            vec![VisualIssue::Channeling, VisualIssue::None]
        );
    }

    #[test]
    fn test_partial_target_omits_absent_fields() {
        let partial = PartialTarget {
            temp_c: Some(94.0),
            ..PartialTarget::default()
        };
        let json = serde_json::to_string(&partial).unwrap();
        assert_eq!(json, r#"{"temp_c":94.0}"#);
        assert!(!partial.is_empty());
        assert!(PartialTarget::default().is_empty());
    }

    #[test]
    fn test_recommendation_serde_roundtrip() {
        let rec = Recommendation {
            target: RecommendationTarget {
                dose_g: 18.0,
                yield_g: 40.0,
                time_s: 28.0,
                temp_c: None,
                pressure_bar: None,
            },
            grinder: GrinderSetting {
                setting_value: SettingValue::Number(9.0),
                micro_adjustment: None,
                notes: vec!["Set grind to 9 on your Test Machine.".to_string()],
            },
            prep: vec!["Dose 18g of freshly ground coffee.".to_string()],
            expected_taste: vec!["Bright acidity".to_string()],
            next_adjustments: NextAdjustments {
                if_fast: vec![],
                if_slow: vec![],
                if_sour: vec![],
                if_bitter: vec![],
                if_weak: vec![],
            },
            confidence: 0.6,
            rationale: vec!["Test rationale.".to_string()],
            version: "2.0.0".to_string(),
        };

        let json = serde_json::to_string(&rec).unwrap();
        // Absent optional target fields must be omitted, not null
        assert!(!json.contains("temp_c"));
        assert!(!json.contains("micro_adjustment"));
        let back: Recommendation = serde_json::from_str(&json).unwrap();
        assert_eq!(rec, back);
    }
}
