use serde::{Deserialize, Serialize};
use std::fmt;

/// Summary of one finished walk, sent to the activity service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WalkLogEntry {
    /// Epoch milliseconds
    pub start_ts: i64,
    /// Epoch milliseconds
    pub end_ts: i64,
    pub calories: u64,
    pub store_name: String,
    pub distance_km: f64,
    pub steps: u64,
}

/// One day of the walking calorie trend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendPoint {
    pub date: String,
    #[serde(default)]
    pub calories: f64,
}

impl fmt::Display for TrendPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} kcal", self.date, self.calories)
    }
}
