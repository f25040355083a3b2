//! Roast-level baseline parameters: the starting points BEFORE freshness
//! offsets and saved-baseline overrides are applied.

use crate::contract::RoastLevel;

/// Baseline brew parameters for a roast level. `grind_bias` is added to the
/// range-positioned base grind, negative = finer.
#[derive(Debug, Clone, PartialEq)]
pub struct RoastBaseline {
    pub dose_g: f64,
    /// Brew ratio, yield over dose
    pub ratio: f64,
    pub time_s: f64,
    pub temp_c: f64,
    pub grind_bias: f64,
    pub notes: &'static [&'static str],
}

/// Return the baseline parameters for a given roast level.
///
/// Light roasts are dense and slow to extract: finer grind, higher
/// temperature, longer ratio. Dark roasts are porous and extract easily:
/// coarser grind, lower temperature, shorter ratio.
pub fn baseline_for(roast_level: RoastLevel) -> RoastBaseline {
    match roast_level {
        RoastLevel::Light => RoastBaseline {
            dose_g: 18.0,
            ratio: 2.2,
            time_s: 28.0,
            temp_c: 94.0,
            grind_bias: -1.0,
            notes: &[
                "Light roasts are dense and acidic, needing a finer grind and higher temp.",
                "Expect bright, fruity, floral notes.",
                "Target a longer ratio (1:2.2) for full flavour development.",
            ],
        },
        RoastLevel::Medium => RoastBaseline {
            dose_g: 18.0,
            ratio: 2.0,
            time_s: 27.0,
            temp_c: 93.0,
            grind_bias: 0.0,
            notes: &[
                "Medium roasts are balanced, so a standard recipe works well.",
                "Expect chocolate, caramel, nutty notes with mild acidity.",
            ],
        },
        RoastLevel::MediumDark => RoastBaseline {
            dose_g: 18.0,
            ratio: 1.9,
            time_s: 26.0,
            temp_c: 92.0,
            grind_bias: 0.5,
            notes: &[
                "Medium-dark roasts extract easily, needing a slightly coarser grind.",
                "Expect chocolate, caramel, low acidity with fuller body.",
                "Be careful not to over-extract, it can turn bitter quickly.",
            ],
        },
        RoastLevel::Dark => RoastBaseline {
            dose_g: 17.0,
            ratio: 1.8,
            time_s: 25.0,
            temp_c: 90.0,
            grind_bias: 1.0,
            notes: &[
                "Dark roasts are porous and extract very easily.",
                "Use coarser grind and lower temperature to avoid bitterness.",
                "Shorter ratio (1:1.8) to maintain sweetness without harshness.",
                "Expect smoky, chocolatey, nutty flavour with minimal acidity.",
            ],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_light_baseline() {
        let b = baseline_for(RoastLevel::Light);
        assert_eq!(b.dose_g, 18.0);
        assert_eq!(b.ratio, 2.2);
        assert_eq!(b.time_s, 28.0);
        assert_eq!(b.temp_c, 94.0);
        assert_eq!(b.grind_bias, -1.0);
        assert_eq!(b.notes.len(), 3);
    }

    #[test]
    fn test_dark_baseline() {
        let b = baseline_for(RoastLevel::Dark);
        assert_eq!(b.dose_g, 17.0);
        assert_eq!(b.ratio, 1.8);
        assert_eq!(b.temp_c, 90.0);
        assert_eq!(b.grind_bias, 1.0);
    }

    #[test]
    fn test_grind_bias_orders_with_roast() {
        let biases: Vec<f64> = [
            RoastLevel::Light,
            RoastLevel::Medium,
            RoastLevel::MediumDark,
            RoastLevel::Dark,
        ]
        .iter()
        .map(|r| baseline_for(*r).grind_bias)
        .collect();
        assert!(biases.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_ratio_shortens_with_roast() {
        assert!(baseline_for(RoastLevel::Light).ratio > baseline_for(RoastLevel::Dark).ratio);
    }
}
