use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::lenient;

/// How close an ingredient is to going off.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Freshness {
    Aging,
    Expiring,
    Expired,
    #[default]
    #[serde(other)]
    Fresh,
}

impl fmt::Display for Freshness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Freshness::Fresh => write!(f, "fresh"),
            Freshness::Aging => write!(f, "aging"),
            Freshness::Expiring => write!(f, "expiring"),
            Freshness::Expired => write!(f, "expired"),
        }
    }
}

impl FromStr for Freshness {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fresh" => Ok(Freshness::Fresh),
            "aging" => Ok(Freshness::Aging),
            "expiring" => Ok(Freshness::Expiring),
            "expired" => Ok(Freshness::Expired),
            other => Err(format!(
                "Invalid freshness: '{}'. Valid values: fresh, aging, expiring, expired",
                other
            )),
        }
    }
}

/// An item detected in (or added to) the fridge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ingredient {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub quantity: f64,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub freshness: Freshness,
    #[serde(default)]
    pub confirmed: bool,
}

impl Ingredient {
    pub fn new(name: impl Into<String>, quantity: f64, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit: unit.into(),
            freshness: Freshness::Fresh,
            confirmed: false,
        }
    }

    pub fn with_freshness(mut self, freshness: Freshness) -> Self {
        self.freshness = freshness;
        self
    }

    pub fn confirmed(mut self) -> Self {
        self.confirmed = true;
        self
    }

    /// Applies an edit. Edited ingredients count as confirmed.
    pub fn apply(&mut self, patch: &IngredientPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(quantity) = patch.quantity {
            self.quantity = quantity;
        }
        if let Some(unit) = &patch.unit {
            self.unit = unit.clone();
        }
        if let Some(freshness) = patch.freshness {
            self.freshness = freshness;
        }
        self.confirmed = true;
    }
}

impl fmt::Display for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unit.is_empty() {
            write!(f, "{} {} ({})", self.quantity, self.name, self.freshness)
        } else {
            write!(
                f,
                "{} {} {} ({})",
                self.quantity, self.unit, self.name, self.freshness
            )
        }
    }
}

/// Partial update for an ingredient; `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngredientPatch {
    pub name: Option<String>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub freshness: Option<Freshness>,
}

impl IngredientPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.quantity.is_none()
            && self.unit.is_none()
            && self.freshness.is_none()
    }
}
