//! The in-memory client state and its mutation entry points.
//!
//! [`StateStore`] owns the aggregate for the lifetime of a session. Every
//! mutator applies its change and then flushes the whole aggregate to local
//! persistence before returning, so reads after a mutator always see the new
//! state and a reload always sees what was last shown.
//!
//! Ingredients and stores are addressed by position. Indices are not stable
//! identities: removing an ingredient shifts every later one down by one.
//! Out-of-range indices are silently ignored.

use crate::models::{Ingredient, IngredientPatch, Profile, Recipe, Store, Suggestion};
use crate::storage::{LocalPersistence, PersistedState};

#[derive(Debug)]
pub struct StateStore {
    profile: Profile,
    preferences: Vec<String>,
    ingredients: Vec<Ingredient>,
    stores: Vec<Store>,
    recipes: Vec<Recipe>,
    suggestions: Vec<Suggestion>,
    shopping_list: Vec<String>,
    persistence: LocalPersistence,
}

impl StateStore {
    /// Opens the store, seeding it from whatever was persisted last.
    pub fn open(persistence: LocalPersistence) -> Self {
        let saved = persistence.load().unwrap_or_default();
        tracing::debug!(
            "Loaded local state: {} ingredient(s), {} preference(s)",
            saved.ingredients.len(),
            saved.preferences.len()
        );

        Self {
            profile: saved.profile,
            preferences: dedup_preserving_order(saved.preferences),
            ingredients: saved.ingredients,
            stores: saved.stores,
            recipes: saved.recipes,
            suggestions: Vec::new(),
            shopping_list: Vec::new(),
            persistence,
        }
    }

    // ==================== Reads ====================

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn preferences(&self) -> &[String] {
        &self.preferences
    }

    pub fn ingredients(&self) -> &[Ingredient] {
        &self.ingredients
    }

    pub fn ingredient(&self, index: usize) -> Option<&Ingredient> {
        self.ingredients.get(index)
    }

    pub fn stores(&self) -> &[Store] {
        &self.stores
    }

    pub fn store(&self, index: usize) -> Option<&Store> {
        self.stores.get(index)
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    pub fn shopping_list(&self) -> &[String] {
        &self.shopping_list
    }

    /// The persisted form of the current state.
    pub fn snapshot(&self) -> PersistedState {
        PersistedState {
            profile: self.profile.clone(),
            preferences: self.preferences.clone(),
            ingredients: self.ingredients.clone(),
            stores: self.stores.clone(),
            recipes: self.recipes.clone(),
        }
    }

    // ==================== Ingredients ====================

    /// Marks the ingredient at `index` confirmed. Returns false if out of range.
    pub fn confirm_ingredient(&mut self, index: usize) -> bool {
        let Some(ingredient) = self.ingredients.get_mut(index) else {
            return false;
        };
        ingredient.confirmed = true;
        self.flush();
        true
    }

    /// Removes the ingredient at `index`; later ingredients shift down.
    pub fn remove_ingredient(&mut self, index: usize) -> Option<Ingredient> {
        if index >= self.ingredients.len() {
            return None;
        }
        let removed = self.ingredients.remove(index);
        self.flush();
        Some(removed)
    }

    pub fn edit_ingredient(&mut self, index: usize, patch: &IngredientPatch) -> bool {
        let Some(ingredient) = self.ingredients.get_mut(index) else {
            return false;
        };
        ingredient.apply(patch);
        self.flush();
        true
    }

    pub fn confirm_all(&mut self) {
        for ingredient in &mut self.ingredients {
            ingredient.confirmed = true;
        }
        self.flush();
    }

    pub fn set_ingredients(&mut self, ingredients: Vec<Ingredient>) {
        self.ingredients = ingredients;
        self.flush();
    }

    // ==================== Preferences ====================

    /// Adds a preference. Blank input and exact duplicates are ignored.
    pub fn add_preference(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() || self.preferences.iter().any(|p| p == text) {
            return false;
        }
        self.preferences.push(text.to_string());
        self.flush();
        true
    }

    pub fn remove_preference(&mut self, index: usize) -> Option<String> {
        if index >= self.preferences.len() {
            return None;
        }
        let removed = self.preferences.remove(index);
        self.flush();
        Some(removed)
    }

    /// Replaces all preferences.
    pub fn set_preferences(&mut self, preferences: Vec<String>) {
        self.preferences = dedup_preserving_order(preferences);
        self.flush();
    }

    // ==================== Profile, stores, recommendations ====================

    pub fn set_profile(&mut self, profile: Profile) {
        self.profile = profile;
        self.flush();
    }

    pub fn set_stores(&mut self, stores: Vec<Store>) {
        self.stores = stores;
        self.flush();
    }

    pub fn set_recipes(&mut self, recipes: Vec<Recipe>) {
        self.recipes = recipes;
        self.flush();
    }

    pub fn set_suggestions(&mut self, suggestions: Vec<Suggestion>, shopping_list: Vec<String>) {
        self.suggestions = suggestions;
        self.shopping_list = shopping_list;
        self.flush();
    }

    /// Writes the current state through to local persistence.
    pub fn flush(&self) {
        self.persistence.save(&self.snapshot());
    }
}

fn dedup_preserving_order(items: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        if !seen.contains(&item) {
            seen.push(item);
        }
    }
    seen
}
