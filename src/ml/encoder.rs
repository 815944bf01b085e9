use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maps categorical labels to the numeric codes an estimator was fitted on.
///
/// Labels not present in the table are accepted when they are themselves
/// numeric, so a phase recorded as `"3"` encodes to `3.0` without an entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CategoricalEncoder {
    #[serde(default)]
    pub codes: BTreeMap<String, f64>,
}

impl CategoricalEncoder {
    pub fn new(codes: impl IntoIterator<Item = (String, f64)>) -> Self {
        Self {
            codes: codes.into_iter().collect(),
        }
    }

    pub fn encode(&self, label: &str) -> Result<f64> {
        if let Some(code) = self.codes.get(label) {
            return Ok(*code);
        }
        label
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| anyhow::anyhow!("unknown category '{}'", label))
    }
}
