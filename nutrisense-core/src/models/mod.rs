mod activity;
mod ingredient;
pub(crate) mod lenient;
mod profile;
mod recipe;
mod store;

pub use activity::{TrendPoint, WalkLogEntry};
pub use ingredient::{Freshness, Ingredient, IngredientPatch};
pub use profile::{Gender, Profile, DEFAULT_DIET_TYPE, DEFAULT_GOAL};
pub use recipe::{Macros, Recipe, Suggestion};
pub use store::Store;
