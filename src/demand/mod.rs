//! Future demand classification.
//!
//! A requested connected load is placed in one of three fixed bands; each band
//! carries the service phase required and the capacity action to plan for.

use serde::Serialize;
use strum::{Display, EnumIter, IntoStaticStr};

pub mod prediction;

pub use prediction::{predict_future_demand, Month, PredictionError, PredictionReport, PredictionRequest};

/// Lower bound (kW, inclusive) of the medium demand band.
pub const MEDIUM_DEMAND_THRESHOLD_KW: f64 = 50.0;
/// Lower bound (kW, inclusive) of the high demand band.
pub const HIGH_DEMAND_THRESHOLD_KW: f64 = 100.0;

#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, IntoStaticStr, EnumIter)]
pub enum DemandZone {
    #[strum(serialize = "Low Demand Zone")]
    #[serde(rename = "Low Demand Zone")]
    Low,
    #[strum(serialize = "Medium Demand Zone")]
    #[serde(rename = "Medium Demand Zone")]
    Medium,
    #[strum(serialize = "High Demand Zone")]
    #[serde(rename = "High Demand Zone")]
    High,
}

impl DemandZone {
    pub fn for_load(load_kw: f64) -> Self {
        if load_kw < MEDIUM_DEMAND_THRESHOLD_KW {
            DemandZone::Low
        } else if load_kw < HIGH_DEMAND_THRESHOLD_KW {
            DemandZone::Medium
        } else {
            DemandZone::High
        }
    }

    pub fn required_phase(self) -> &'static str {
        match self {
            DemandZone::Low => "1 Phase",
            DemandZone::Medium => "3 Phase (Recommended)",
            DemandZone::High => "3 Phase (Mandatory)",
        }
    }

    pub fn capacity_action(self) -> &'static str {
        match self {
            DemandZone::Low => "Existing capacity sufficient",
            DemandZone::Medium => "Moderate capacity planning required",
            DemandZone::High => "High capacity upgrade required",
        }
    }
}

/// Result of classifying one load value.
#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DemandAssessment {
    pub zone: DemandZone,
    pub required_phase: &'static str,
    pub capacity_action: &'static str,
}

impl DemandAssessment {
    pub fn zone_label(&self) -> &'static str {
        self.zone.into()
    }
}

/// Classify a non-negative load (kW). Callers validate the sign.
pub fn classify(load_kw: f64) -> DemandAssessment {
    let zone = DemandZone::for_load(load_kw);
    DemandAssessment {
        zone,
        required_phase: zone.required_phase(),
        capacity_action: zone.capacity_action(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;
    use strum::IntoEnumIterator;

    #[rstest]
    #[case(0.0, DemandZone::Low)]
    #[case(49.999, DemandZone::Low)]
    #[case(50.0, DemandZone::Medium)]
    #[case(75.0, DemandZone::Medium)]
    #[case(99.999, DemandZone::Medium)]
    #[case(100.0, DemandZone::High)]
    #[case(150.0, DemandZone::High)]
    fn test_band_boundaries(#[case] load_kw: f64, #[case] expected: DemandZone) {
        assert_eq!(classify(load_kw).zone, expected);
    }

    #[test]
    fn test_example_scenarios() {
        let low = classify(0.0);
        assert_eq!(
            (low.zone_label(), low.required_phase, low.capacity_action),
            ("Low Demand Zone", "1 Phase", "Existing capacity sufficient")
        );

        let medium = classify(75.0);
        assert_eq!(
            (medium.zone_label(), medium.required_phase, medium.capacity_action),
            (
                "Medium Demand Zone",
                "3 Phase (Recommended)",
                "Moderate capacity planning required"
            )
        );

        let high = classify(150.0);
        assert_eq!(
            (high.zone_label(), high.required_phase, high.capacity_action),
            ("High Demand Zone", "3 Phase (Mandatory)", "High capacity upgrade required")
        );
    }

    #[test]
    fn test_display_matches_label() {
        for zone in DemandZone::iter() {
            let assessment = DemandAssessment {
                zone,
                required_phase: zone.required_phase(),
                capacity_action: zone.capacity_action(),
            };
            assert_eq!(zone.to_string(), assessment.zone_label());
        }
    }

    #[test]
    fn test_serializes_as_label() {
        let json = serde_json::to_value(classify(120.0)).unwrap();
        assert_eq!(json["zone"], "High Demand Zone");
        assert_eq!(json["required_phase"], "3 Phase (Mandatory)");
    }

    proptest! {
        #[test]
        fn prop_low_band(load in 0.0f64..50.0) {
            prop_assert_eq!(classify(load).zone, DemandZone::Low);
            prop_assert_eq!(classify(load).required_phase, "1 Phase");
        }

        #[test]
        fn prop_medium_band(load in 50.0f64..100.0) {
            prop_assert_eq!(classify(load).zone, DemandZone::Medium);
            prop_assert_eq!(classify(load).capacity_action, "Moderate capacity planning required");
        }

        #[test]
        fn prop_high_band(load in 100.0f64..1.0e9) {
            prop_assert_eq!(classify(load).zone, DemandZone::High);
            prop_assert_eq!(classify(load).required_phase, "3 Phase (Mandatory)");
        }

        #[test]
        fn prop_idempotent(load in 0.0f64..1.0e6) {
            prop_assert_eq!(classify(load), classify(load));
        }
    }
}
