use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::lenient;
use crate::metrics::DEFAULT_WEIGHT_KG;

/// Gender as used for stride estimation.
///
/// Anything the client or server does not recognise (including the empty
/// string older clients persisted) decodes as `Unspecified`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    #[default]
    #[serde(other)]
    Unspecified,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "male"),
            Gender::Female => write!(f, "female"),
            Gender::Unspecified => write!(f, "unspecified"),
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            "" | "unspecified" | "other" => Ok(Gender::Unspecified),
            other => Err(format!(
                "Invalid gender: '{}'. Valid values: male, female, unspecified",
                other
            )),
        }
    }
}

pub const DEFAULT_GOAL: &str = "maintain";
pub const DEFAULT_DIET_TYPE: &str = "balanced";

/// The user's body and diet profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Profile {
    #[serde(deserialize_with = "lenient::optional_u32")]
    pub age: Option<u32>,
    pub gender: Gender,
    #[serde(deserialize_with = "lenient::optional_f64")]
    pub weight_kg: Option<f64>,
    #[serde(deserialize_with = "lenient::optional_f64")]
    pub height_cm: Option<f64>,
    pub goal: String,
    pub diet_type: String,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            age: None,
            gender: Gender::Unspecified,
            weight_kg: None,
            height_cm: None,
            goal: DEFAULT_GOAL.to_string(),
            diet_type: DEFAULT_DIET_TYPE.to_string(),
        }
    }
}

impl Profile {
    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = gender;
        self
    }

    pub fn with_weight_kg(mut self, weight_kg: f64) -> Self {
        self.weight_kg = Some(weight_kg);
        self
    }

    pub fn with_age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }

    pub fn with_height_cm(mut self, height_cm: f64) -> Self {
        self.height_cm = Some(height_cm);
        self
    }

    /// Weight used for calorie math: the recorded weight when it is a usable
    /// positive number, otherwise 70 kg.
    pub fn effective_weight_kg(&self) -> f64 {
        match self.weight_kg {
            Some(w) if w.is_finite() && w > 0.0 => w,
            _ => DEFAULT_WEIGHT_KG,
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn or_dash<T: fmt::Display>(v: &Option<T>) -> String {
            v.as_ref().map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
        }

        writeln!(f, "Profile")?;
        writeln!(f, "{}", "=".repeat(30))?;
        writeln!(f, "Age:       {}", or_dash(&self.age))?;
        writeln!(f, "Gender:    {}", self.gender)?;
        writeln!(f, "Weight:    {} kg", or_dash(&self.weight_kg))?;
        writeln!(f, "Height:    {} cm", or_dash(&self.height_cm))?;
        writeln!(f, "Goal:      {}", self.goal)?;
        write!(f, "Diet type: {}", self.diet_type)
    }
}
