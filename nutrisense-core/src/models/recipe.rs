//! Recipe and shopping suggestions returned by the recommendation services.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Macros {
    pub calories: f64,
    pub protein: String,
    pub carbs: String,
    pub fat: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Recipe {
    pub title: String,
    pub match_score: f64,
    pub missing_ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub macros: Macros,
    pub reasoning: String,
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(
            f,
            "  Match: {}% | {} cal | {} protein",
            self.match_score, self.macros.calories, self.macros.protein
        )?;
        if self.missing_ingredients.is_empty() {
            writeln!(f, "  Missing: None")?;
        } else {
            writeln!(f, "  Missing: {}", self.missing_ingredients.join(", "))?;
        }
        for (i, step) in self.instructions.iter().enumerate() {
            writeln!(f, "  {}. {}", i + 1, step)?;
        }
        if !self.reasoning.is_empty() {
            write!(f, "  {}", self.reasoning)?;
        }
        Ok(())
    }
}

/// A nutrition gap and what to buy to close it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Suggestion {
    pub suggestion: String,
    pub reason: String,
    pub gap: String,
}

impl fmt::Display for Suggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}]: {}",
            self.suggestion,
            self.gap.replace('_', " "),
            self.reason
        )
    }
}
