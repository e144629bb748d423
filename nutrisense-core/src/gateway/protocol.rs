//! Request and response bodies exchanged with the backend.

use serde::{Deserialize, Serialize};

use crate::models::{
    lenient, Gender, Ingredient, Profile, Recipe, Store, Suggestion, TrendPoint,
    DEFAULT_DIET_TYPE, DEFAULT_GOAL,
};

/// Profile as sent with `PUT /profile`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProfilePayload {
    pub age: Option<u32>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub gender: Gender,
    pub health_goal: String,
    pub diet_type: String,
    pub preferences: Vec<String>,
}

impl ProfilePayload {
    pub fn new(profile: &Profile, preferences: &[String]) -> Self {
        Self {
            age: profile.age,
            weight_kg: profile.weight_kg,
            height_cm: profile.height_cm,
            gender: profile.gender,
            health_goal: profile.goal.clone(),
            diet_type: profile.diet_type.clone(),
            preferences: preferences.to_vec(),
        }
    }
}

/// Profile as returned by `GET /profile`. Any field may be missing or null.
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct RemoteProfile {
    #[serde(deserialize_with = "lenient::optional_u32")]
    pub age: Option<u32>,
    #[serde(deserialize_with = "lenient::optional_f64")]
    pub weight_kg: Option<f64>,
    #[serde(deserialize_with = "lenient::optional_f64")]
    pub height_cm: Option<f64>,
    pub gender: Option<Gender>,
    pub health_goal: Option<String>,
    pub diet_type: Option<String>,
    pub preferences: Option<Vec<String>>,
}

impl RemoteProfile {
    /// Splits the response into a complete profile and preference list.
    /// Missing fields take the profile defaults.
    pub fn into_parts(self) -> (Profile, Vec<String>) {
        let profile = Profile {
            age: self.age,
            gender: self.gender.unwrap_or_default(),
            weight_kg: self.weight_kg,
            height_cm: self.height_cm,
            goal: self
                .health_goal
                .filter(|g| !g.is_empty())
                .unwrap_or_else(|| DEFAULT_GOAL.to_string()),
            diet_type: self
                .diet_type
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| DEFAULT_DIET_TYPE.to_string()),
        };
        (profile, self.preferences.unwrap_or_default())
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TrendResponse {
    pub series: Vec<TrendPoint>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ScanResponse {
    pub items: Vec<Ingredient>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeRequest<'a> {
    pub ingredients: &'a [Ingredient],
    pub user_location: Location,
}

/// Result of `POST /nutrition/analyze-fridge`.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct FridgeAnalysis {
    pub suggestions: Vec<Suggestion>,
    pub shopping_list_generated: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoreRequest<'a> {
    pub lat: f64,
    pub lng: f64,
    pub items: &'a [String],
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct StoresResponse {
    pub stores: Vec<Store>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecipeRequest<'a> {
    pub ingredients: Vec<RecipeIngredient<'a>>,
    pub diet_type: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecipeIngredient<'a> {
    pub name: &'a str,
    pub quantity: f64,
    pub unit: &'a str,
}

impl<'a> From<&'a Ingredient> for RecipeIngredient<'a> {
    fn from(ingredient: &'a Ingredient) -> Self {
        Self {
            name: &ingredient.name,
            quantity: ingredient.quantity,
            unit: &ingredient.unit,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RecipesResponse {
    pub recipes: Vec<Recipe>,
}

/// A point on the map, used for store distance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

impl Default for Location {
    fn default() -> Self {
        Self {
            lat: 40.7128,
            lng: -74.0060,
        }
    }
}
