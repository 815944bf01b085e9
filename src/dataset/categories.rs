use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Headers of the three categorical columns offered as selection menus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryColumns {
    pub sub_division: String,
    pub connection_type: String,
    pub phase: String,
}

impl Default for CategoryColumns {
    fn default() -> Self {
        Self {
            sub_division: "SUB_DIV_ID".to_string(),
            connection_type: "CONN_TYPE".to_string(),
            phase: "APPPHASE".to_string(),
        }
    }
}

/// Distinct values of the categorical columns, computed once at load time.
#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct CategoryOptions {
    pub sub_divisions: Vec<String>,
    pub connection_types: Vec<String>,
    pub phases: Vec<String>,
}

impl CategoryOptions {
    pub fn has_sub_division(&self, value: &str) -> bool {
        self.sub_divisions.iter().any(|v| v == value)
    }

    pub fn has_connection_type(&self, value: &str) -> bool {
        self.connection_types.iter().any(|v| v == value)
    }

    pub fn has_phase(&self, value: &str) -> bool {
        self.phases.iter().any(|v| v == value)
    }
}

/// Sorted distinct values. Columns whose values are all numeric sort
/// numerically, anything else sorts lexicographically.
pub fn distinct_sorted<'a, I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let unique: Vec<&str> = values.into_iter().unique().collect();

    let numeric: Option<Vec<f64>> = unique.iter().map(|v| v.trim().parse::<f64>().ok()).collect();
    match numeric {
        Some(keys) if !keys.is_empty() => unique
            .into_iter()
            .zip(keys)
            .sorted_by(|(a, ka), (b, kb)| {
                ka.partial_cmp(kb).unwrap_or(Ordering::Equal).then_with(|| a.cmp(b))
            })
            .map(|(v, _)| v.to_string())
            .collect(),
        _ => unique.into_iter().sorted().map(str::to_string).collect(),
    }
}
