//! HTTP client for the NutriSense backend.

use std::future::Future;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;

use super::error::GatewayError;
use super::protocol::{
    AnalyzeRequest, FridgeAnalysis, Location, ProfilePayload, RecipeIngredient, RecipeRequest,
    RecipesResponse, RemoteProfile, ScanResponse, StoreRequest, StoresResponse, TrendResponse,
};
use crate::models::{Ingredient, Recipe, Store, TrendPoint, WalkLogEntry};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Typed access to the remote profile, activity and recommendation endpoints.
///
/// Implementations report failures but never touch local state; the caller
/// decides what a failure means for the session.
pub trait Gateway: Send + Sync {
    /// `None` on any non-2xx or transport failure.
    fn get_profile(&self, token: &str) -> impl Future<Output = Option<RemoteProfile>> + Send;

    fn put_profile(
        &self,
        token: &str,
        payload: &ProfilePayload,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    fn append_walk_log(
        &self,
        token: &str,
        entry: &WalkLogEntry,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    fn walk_trend(
        &self,
        token: &str,
        days: u32,
    ) -> impl Future<Output = Result<Vec<TrendPoint>, GatewayError>> + Send;

    fn scan_fridge(
        &self,
        token: &str,
        image: Vec<u8>,
        filename: &str,
    ) -> impl Future<Output = Result<Vec<Ingredient>, GatewayError>> + Send;

    fn analyze_fridge(
        &self,
        token: &str,
        ingredients: &[Ingredient],
        location: Location,
    ) -> impl Future<Output = Result<FridgeAnalysis, GatewayError>> + Send;

    fn recommend_stores(
        &self,
        items: &[String],
        location: Location,
    ) -> impl Future<Output = Result<Vec<Store>, GatewayError>> + Send;

    fn recommend_recipes(
        &self,
        token: &str,
        ingredients: &[Ingredient],
        diet_type: &str,
    ) -> impl Future<Output = Result<Vec<Recipe>, GatewayError>> + Send;
}

/// [`Gateway`] over HTTP with reqwest.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    base_url: String,
    http: reqwest::Client,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Joins `path` onto the base URL, tolerating a trailing slash.
    pub fn url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let base = if base.contains("://") {
            base.to_string()
        } else {
            format!("http://{}", base)
        };
        format!("{}{}", base, path)
    }
}

impl Gateway for HttpGateway {
    async fn get_profile(&self, token: &str) -> Option<RemoteProfile> {
        let result = self
            .http
            .get(self.url("/profile"))
            .bearer_auth(token)
            .send()
            .await;

        match read_json::<RemoteProfile>(result).await {
            Ok(profile) => Some(profile),
            Err(e) => {
                tracing::debug!("Remote profile unavailable: {}", e);
                None
            }
        }
    }

    async fn put_profile(&self, token: &str, payload: &ProfilePayload) -> Result<(), GatewayError> {
        let result = self
            .http
            .put(self.url("/profile"))
            .bearer_auth(token)
            .json(payload)
            .send()
            .await;
        expect_saved(result)
    }

    async fn append_walk_log(&self, token: &str, entry: &WalkLogEntry) -> Result<(), GatewayError> {
        let result = self
            .http
            .post(self.url("/activity/walk"))
            .bearer_auth(token)
            .json(entry)
            .send()
            .await;
        expect_saved(result)
    }

    async fn walk_trend(&self, token: &str, days: u32) -> Result<Vec<TrendPoint>, GatewayError> {
        let result = self
            .http
            .get(self.url("/activity/walk/trend"))
            .bearer_auth(token)
            .query(&[("days", days)])
            .send()
            .await;
        let trend: TrendResponse = read_json(result).await?;
        Ok(trend.series)
    }

    async fn scan_fridge(
        &self,
        token: &str,
        image: Vec<u8>,
        filename: &str,
    ) -> Result<Vec<Ingredient>, GatewayError> {
        let form = Form::new().part("file", Part::bytes(image).file_name(filename.to_string()));
        let result = self
            .http
            .post(self.url("/fridge/scan"))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await;
        let scan: ScanResponse = read_json(result).await?;
        Ok(scan.items)
    }

    async fn analyze_fridge(
        &self,
        token: &str,
        ingredients: &[Ingredient],
        location: Location,
    ) -> Result<FridgeAnalysis, GatewayError> {
        let body = AnalyzeRequest {
            ingredients,
            user_location: location,
        };
        let result = self
            .http
            .post(self.url("/nutrition/analyze-fridge"))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await;
        read_json(result).await
    }

    async fn recommend_stores(
        &self,
        items: &[String],
        location: Location,
    ) -> Result<Vec<Store>, GatewayError> {
        let body = StoreRequest {
            lat: location.lat,
            lng: location.lng,
            items,
        };
        let result = self
            .http
            .post(self.url("/stores/recommend"))
            .json(&body)
            .send()
            .await;
        let stores: StoresResponse = read_json(result).await?;
        Ok(stores.stores)
    }

    async fn recommend_recipes(
        &self,
        token: &str,
        ingredients: &[Ingredient],
        diet_type: &str,
    ) -> Result<Vec<Recipe>, GatewayError> {
        let body = RecipeRequest {
            ingredients: ingredients.iter().map(RecipeIngredient::from).collect(),
            diet_type,
        };
        let result = self
            .http
            .post(self.url("/recipes/recommend"))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await;
        let recipes: RecipesResponse = read_json(result).await?;
        Ok(recipes.recipes)
    }
}

async fn read_json<T: DeserializeOwned>(
    result: Result<reqwest::Response, reqwest::Error>,
) -> Result<T, GatewayError> {
    let response = result.map_err(|e| GatewayError::FetchFailed(e.to_string()))?;

    if !response.status().is_success() {
        return Err(GatewayError::FetchFailed(format!(
            "Server returned status {}",
            response.status()
        )));
    }

    response
        .json()
        .await
        .map_err(|e| GatewayError::FetchFailed(e.to_string()))
}

fn expect_saved(result: Result<reqwest::Response, reqwest::Error>) -> Result<(), GatewayError> {
    let response = result.map_err(|e| GatewayError::SaveFailed(e.to_string()))?;

    if !response.status().is_success() {
        return Err(GatewayError::SaveFailed(format!(
            "Server returned status {}",
            response.status()
        )));
    }

    Ok(())
}
