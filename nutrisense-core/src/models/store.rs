use serde::{Deserialize, Serialize};
use std::fmt;

use crate::metrics;

/// A nearby store from a recommendation response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Store {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub distance_km: f64,
    #[serde(default)]
    pub total_price: f64,
}

impl Store {
    pub fn new(name: impl Into<String>, distance_km: f64, total_price: f64) -> Self {
        Self {
            name: name.into(),
            distance_km,
            total_price,
        }
    }

    /// Stand-in used when a walking session outlives the store list it was
    /// started from.
    pub fn placeholder() -> Self {
        Self::new("Store", 0.0, 0.0)
    }

    pub fn round_trip_km(&self) -> f64 {
        self.distance_km * 2.0
    }

    /// Calories a walk there and back should burn.
    pub fn estimated_calories(&self, weight_kg: f64) -> u64 {
        metrics::estimate_walk_calories(self.round_trip_km(), weight_kg)
    }
}

impl fmt::Display for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} km - est. ${:.2}",
            self.name, self.distance_km, self.total_price
        )
    }
}
