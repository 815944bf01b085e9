//! Future demand prediction: the ML baseline load for the selected phase
//! combined with the rule-based demand band of the expected load.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use thiserror::Error;
use tracing::info;
use validator::Validate;

use super::{classify, DemandZone};
use crate::dataset::CategoryOptions;
use crate::ml::LoadPredictor;

#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum Month {
    Jan,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

impl Month {
    pub fn labels() -> Vec<String> {
        Month::iter().map(|m| m.to_string()).collect()
    }
}

#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PredictionRequest {
    #[validate(length(min = 1))]
    pub sub_division: String,
    #[validate(length(min = 1))]
    pub connection_type: String,
    #[validate(length(min = 1))]
    pub phase: String,
    pub month: Month,
    /// Expected connected load in kW.
    #[validate(range(min = 0.0))]
    pub expected_load_kw: f64,
}

#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("invalid prediction request: {0}")]
    Invalid(#[from] validator::ValidationErrors),

    #[error("unknown {field} '{value}'")]
    UnknownSelection { field: &'static str, value: String },

    #[error("load model failed: {0}")]
    Model(anyhow::Error),
}

#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize)]
pub struct PredictionReport {
    pub hotspot: DemandZone,
    pub ml_predicted_load_kw: f64,
    pub expected_load_kw: f64,
    pub required_phase: &'static str,
    pub recommended_capacity: &'static str,
    pub month: Month,
    pub sub_division: String,
    pub connection_type: String,
    pub phase: String,
}

impl PredictionReport {
    /// The text block shown to the user.
    pub fn render(&self) -> String {
        let mut out = String::from("Prediction Results\n");
        let _ = writeln!(out, "Future Request Hotspot: {}", self.hotspot);
        let _ = writeln!(out, "ML Predicted Load: {:.2} kW", self.ml_predicted_load_kw);
        let _ = writeln!(out, "User Expected Load: {} kW", python_float(self.expected_load_kw));
        let _ = writeln!(out, "Required Phase: {}", self.required_phase);
        let _ = writeln!(out, "Recommended Capacity: {}", self.recommended_capacity);
        let _ = write!(out, "Month Considered: {}", self.month);
        out
    }
}

/// Shortest round-trip float text with a signed, two-digit exponent
/// (`75.0`, `1e+16`, `1e-05`).
fn python_float(value: f64) -> String {
    let repr = format!("{:?}", value);
    match repr.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exp),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => repr,
    }
}

/// Run a prediction for a form submission.
///
/// Only the phase reaches the model; sub-division, connection type and month
/// are checked and echoed back but carry no weight.
pub fn predict_future_demand(
    req: &PredictionRequest,
    options: &CategoryOptions,
    model: &dyn LoadPredictor,
) -> Result<PredictionReport, PredictionError> {
    req.validate()?;

    if !options.has_sub_division(&req.sub_division) {
        return Err(unknown("sub-division", &req.sub_division));
    }
    if !options.has_connection_type(&req.connection_type) {
        return Err(unknown("connection type", &req.connection_type));
    }
    if !options.has_phase(&req.phase) {
        return Err(unknown("phase", &req.phase));
    }

    let ml = model
        .predict_phase_load(&req.phase)
        .map_err(PredictionError::Model)?;
    let assessment = classify(req.expected_load_kw);

    info!(
        phase = %req.phase,
        month = %req.month,
        expected_load_kw = req.expected_load_kw,
        ml_predicted_load_kw = ml.value,
        hotspot = %assessment.zone,
        "future demand predicted"
    );

    Ok(PredictionReport {
        hotspot: assessment.zone,
        ml_predicted_load_kw: ml.value,
        expected_load_kw: req.expected_load_kw,
        required_phase: assessment.required_phase,
        recommended_capacity: assessment.capacity_action,
        month: req.month,
        sub_division: req.sub_division.clone(),
        connection_type: req.connection_type.clone(),
        phase: req.phase.clone(),
    })
}

fn unknown(field: &'static str, value: &str) -> PredictionError {
    PredictionError::UnknownSelection {
        field,
        value: value.to_string(),
    }
}
