//! In-process gateway for tests. Records every call and answers from canned data.

use std::sync::Mutex;

use super::client::Gateway;
use super::error::GatewayError;
use super::protocol::{FridgeAnalysis, Location, ProfilePayload, RemoteProfile};
use crate::models::{Ingredient, Recipe, Store, TrendPoint, WalkLogEntry};

#[derive(Debug, Default)]
pub struct FakeGateway {
    pub remote_profile: Mutex<Option<RemoteProfile>>,
    pub fail_writes: Mutex<bool>,
    pub fail_reads: Mutex<bool>,
    pub trend: Mutex<Vec<TrendPoint>>,
    pub scan_items: Mutex<Vec<Ingredient>>,
    pub analysis: Mutex<FridgeAnalysis>,
    pub stores: Mutex<Vec<Store>>,
    pub recipes: Mutex<Vec<Recipe>>,

    pub profile_puts: Mutex<Vec<ProfilePayload>>,
    pub walk_logs: Mutex<Vec<WalkLogEntry>>,
    pub store_requests: Mutex<Vec<(Vec<String>, Location)>>,
    pub recipe_diets: Mutex<Vec<String>>,
    pub tokens_seen: Mutex<Vec<String>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_remote_profile(self, profile: RemoteProfile) -> Self {
        *self.remote_profile.lock().unwrap() = Some(profile);
        self
    }

    pub fn failing(self) -> Self {
        *self.fail_writes.lock().unwrap() = true;
        *self.fail_reads.lock().unwrap() = true;
        self
    }

    pub fn walk_logs(&self) -> Vec<WalkLogEntry> {
        self.walk_logs.lock().unwrap().clone()
    }

    pub fn profile_puts(&self) -> Vec<ProfilePayload> {
        self.profile_puts.lock().unwrap().clone()
    }

    fn seen(&self, token: &str) {
        self.tokens_seen.lock().unwrap().push(token.to_string());
    }

    fn write_result(&self) -> Result<(), GatewayError> {
        if *self.fail_writes.lock().unwrap() {
            Err(GatewayError::SaveFailed("Server returned status 500".to_string()))
        } else {
            Ok(())
        }
    }

    fn read<T: Clone>(&self, value: &Mutex<T>) -> Result<T, GatewayError> {
        if *self.fail_reads.lock().unwrap() {
            Err(GatewayError::FetchFailed("Server returned status 503".to_string()))
        } else {
            Ok(value.lock().unwrap().clone())
        }
    }
}

impl Gateway for FakeGateway {
    async fn get_profile(&self, token: &str) -> Option<RemoteProfile> {
        self.seen(token);
        self.read(&self.remote_profile).ok().flatten()
    }

    async fn put_profile(&self, token: &str, payload: &ProfilePayload) -> Result<(), GatewayError> {
        self.seen(token);
        self.write_result()?;
        self.profile_puts.lock().unwrap().push(payload.clone());
        Ok(())
    }

    async fn append_walk_log(&self, token: &str, entry: &WalkLogEntry) -> Result<(), GatewayError> {
        self.seen(token);
        self.write_result()?;
        self.walk_logs.lock().unwrap().push(entry.clone());
        Ok(())
    }

    async fn walk_trend(&self, token: &str, days: u32) -> Result<Vec<TrendPoint>, GatewayError> {
        self.seen(token);
        let trend = self.read(&self.trend)?;
        Ok(trend.into_iter().take(days as usize).collect())
    }

    async fn scan_fridge(
        &self,
        token: &str,
        _image: Vec<u8>,
        _filename: &str,
    ) -> Result<Vec<Ingredient>, GatewayError> {
        self.seen(token);
        self.read(&self.scan_items)
    }

    async fn analyze_fridge(
        &self,
        token: &str,
        _ingredients: &[Ingredient],
        _location: Location,
    ) -> Result<FridgeAnalysis, GatewayError> {
        self.seen(token);
        self.read(&self.analysis)
    }

    async fn recommend_stores(
        &self,
        items: &[String],
        location: Location,
    ) -> Result<Vec<Store>, GatewayError> {
        self.store_requests
            .lock()
            .unwrap()
            .push((items.to_vec(), location));
        self.read(&self.stores)
    }

    async fn recommend_recipes(
        &self,
        token: &str,
        _ingredients: &[Ingredient],
        diet_type: &str,
    ) -> Result<Vec<Recipe>, GatewayError> {
        self.seen(token);
        self.recipe_diets.lock().unwrap().push(diet_type.to_string());
        self.read(&self.recipes)
    }
}
