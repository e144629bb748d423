//! Command dispatch over the client state.
//!
//! [`Engine`] owns everything a session mutates: the state store, the walk
//! tracker, the gateway and the token source. Hosts drive it with
//! [`Command`]s and render from the returned [`Outcome`] plus the read
//! accessors; nothing here knows about presentation.

use std::fmt;

use crate::gateway::{Gateway, GatewayError, Location, RemoteWrite, TokenProvider};
use crate::models::{IngredientPatch, Profile, TrendPoint};
use crate::reconcile::{self, Reconciled};
use crate::state::StateStore;
use crate::walking::{WalkSummary, WalkTracker};

/// Default number of days for the walking trend.
pub const DEFAULT_TREND_DAYS: u32 = 7;

/// Everything the host can ask the engine to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    ConfirmIngredient(usize),
    RemoveIngredient(usize),
    EditIngredient(usize, IngredientPatch),
    ConfirmAll,
    AddPreference(String),
    RemovePreference(usize),
    SaveProfile(Profile),
    /// Pushes the current profile and preferences without changing them.
    PushProfile,
    ScanFridge { image: Vec<u8>, filename: String },
    Analyze,
    RecommendRecipes,
    StartWalking(usize),
    StopWalking(usize),
    WalkTrend { days: u32 },
    Reconcile,
}

/// A walk that was stopped, and what became of its log entry.
#[derive(Debug, Clone, PartialEq)]
pub struct StoppedWalk {
    pub summary: WalkSummary,
    /// The summary stands regardless of this.
    pub logged: Result<RemoteWrite, GatewayError>,
}

/// Result of [`Engine::analyze`].
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub suggestions: usize,
    pub shopping_items: usize,
    /// `None` when nothing needs buying, so no stores were requested.
    pub stores: Option<Result<usize, GatewayError>>,
}

/// What a dispatched command did.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The command changed state (and it was persisted).
    Updated,
    /// The command was a no-op: bad index, duplicate, already running...
    Unchanged,
    ProfileSaved(Result<RemoteWrite, GatewayError>),
    Scanned(usize),
    /// There are no ingredients to work from yet.
    NeedsIngredients,
    Analyzed(Analysis),
    Recipes(usize),
    WalkStarted(usize),
    WalkStopped(StoppedWalk),
    /// `None` when signed out.
    Trend(Option<Vec<TrendPoint>>),
    Reconciled(Reconciled),
}

impl From<bool> for Outcome {
    fn from(changed: bool) -> Self {
        if changed {
            Outcome::Updated
        } else {
            Outcome::Unchanged
        }
    }
}

pub struct Engine<G> {
    state: StateStore,
    walks: WalkTracker,
    gateway: G,
    tokens: Box<dyn TokenProvider>,
    location: Location,
}

impl<G: Gateway> Engine<G> {
    pub fn new(
        state: StateStore,
        gateway: G,
        tokens: impl TokenProvider + 'static,
        walks: WalkTracker,
    ) -> Self {
        Self {
            state,
            walks,
            gateway,
            tokens: Box::new(tokens),
            location: Location::default(),
        }
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    pub fn state(&self) -> &StateStore {
        &self.state
    }

    pub fn walks(&self) -> &WalkTracker {
        &self.walks
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn signed_in(&self) -> bool {
        self.tokens.token().is_some()
    }

    /// Runs one command to completion.
    ///
    /// Remote failures that leave local state intact come back inside the
    /// [`Outcome`]; an `Err` means the command did nothing at all.
    pub async fn dispatch(&mut self, command: Command) -> Result<Outcome, GatewayError> {
        tracing::debug!("Dispatching {:?}", CommandName(&command));

        let outcome = match command {
            Command::ConfirmIngredient(index) => self.state.confirm_ingredient(index).into(),
            Command::RemoveIngredient(index) => {
                self.state.remove_ingredient(index).is_some().into()
            }
            Command::EditIngredient(index, patch) => {
                self.state.edit_ingredient(index, &patch).into()
            }
            Command::ConfirmAll => {
                self.state.confirm_all();
                Outcome::Updated
            }
            Command::AddPreference(text) => self.state.add_preference(&text).into(),
            Command::RemovePreference(index) => {
                self.state.remove_preference(index).is_some().into()
            }
            Command::SaveProfile(profile) => Outcome::ProfileSaved(self.save_profile(profile).await),
            Command::PushProfile => Outcome::ProfileSaved(self.push_profile().await),
            Command::ScanFridge { image, filename } => {
                Outcome::Scanned(self.scan_fridge(image, &filename).await?)
            }
            Command::Analyze => match self.analyze().await? {
                Some(analysis) => Outcome::Analyzed(analysis),
                None => Outcome::NeedsIngredients,
            },
            Command::RecommendRecipes => match self.recommend_recipes().await? {
                Some(count) => Outcome::Recipes(count),
                None => Outcome::NeedsIngredients,
            },
            Command::StartWalking(index) => {
                if self.start_walking(index) {
                    Outcome::WalkStarted(index)
                } else {
                    Outcome::Unchanged
                }
            }
            Command::StopWalking(index) => match self.stop_walking(index).await {
                Some(stopped) => Outcome::WalkStopped(stopped),
                None => Outcome::Unchanged,
            },
            Command::WalkTrend { days } => Outcome::Trend(self.walk_trend(days).await?),
            Command::Reconcile => Outcome::Reconciled(self.reconcile().await),
        };

        Ok(outcome)
    }

    // ==================== Profile ====================

    pub async fn reconcile(&mut self) -> Reconciled {
        reconcile::reconcile(&mut self.state, &self.gateway, self.tokens.as_ref()).await
    }

    pub async fn save_profile(&mut self, profile: Profile) -> Result<RemoteWrite, GatewayError> {
        reconcile::save_profile(&mut self.state, &self.gateway, self.tokens.as_ref(), profile)
            .await
    }

    pub async fn push_profile(&self) -> Result<RemoteWrite, GatewayError> {
        reconcile::push_profile(&self.state, &self.gateway, self.tokens.as_ref()).await
    }

    // ==================== Fridge ====================

    /// Replaces the ingredient list with what the scanner found.
    pub async fn scan_fridge(
        &mut self,
        image: Vec<u8>,
        filename: &str,
    ) -> Result<usize, GatewayError> {
        let token = self.require_token()?;
        let items = self.gateway.scan_fridge(&token, image, filename).await?;
        let count = items.len();
        self.state.set_ingredients(items);
        tracing::info!("Scan detected {} ingredient(s)", count);
        Ok(count)
    }

    /// Asks for nutrition suggestions, then stores for the shopping list.
    ///
    /// Returns `None` when there are no ingredients. A store lookup failure
    /// does not discard the suggestions.
    pub async fn analyze(&mut self) -> Result<Option<Analysis>, GatewayError> {
        if self.state.ingredients().is_empty() {
            return Ok(None);
        }
        let token = self.require_token()?;

        let analysis = self
            .gateway
            .analyze_fridge(&token, self.state.ingredients(), self.location)
            .await?;
        let suggestions = analysis.suggestions.len();
        let shopping_list = analysis.shopping_list_generated;
        let shopping_items = shopping_list.len();
        self.state.set_suggestions(analysis.suggestions, shopping_list);

        let stores = if shopping_items == 0 {
            None
        } else {
            let result = self
                .gateway
                .recommend_stores(self.state.shopping_list(), self.location)
                .await;
            Some(match result {
                Ok(stores) => {
                    let count = stores.len();
                    self.state.set_stores(stores);
                    Ok(count)
                }
                Err(e) => {
                    tracing::warn!("Could not load stores: {}", e);
                    Err(e)
                }
            })
        };

        Ok(Some(Analysis {
            suggestions,
            shopping_items,
            stores,
        }))
    }

    /// Returns `None` when there are no ingredients.
    pub async fn recommend_recipes(&mut self) -> Result<Option<usize>, GatewayError> {
        if self.state.ingredients().is_empty() {
            return Ok(None);
        }
        let token = self.require_token()?;

        let recipes = self
            .gateway
            .recommend_recipes(
                &token,
                self.state.ingredients(),
                &self.state.profile().diet_type,
            )
            .await?;
        let count = recipes.len();
        self.state.set_recipes(recipes);
        Ok(Some(count))
    }

    // ==================== Walking ====================

    pub fn start_walking(&mut self, store_index: usize) -> bool {
        self.walks.start(store_index, self.state.profile())
    }

    /// Stops a walk and submits its log entry. `None` if it wasn't running.
    pub async fn stop_walking(&mut self, store_index: usize) -> Option<StoppedWalk> {
        let summary = self
            .walks
            .stop(store_index, self.state.profile(), self.state.stores())?;
        let logged = self.log_walk(&summary).await;
        Some(StoppedWalk { summary, logged })
    }

    /// Stops every running walk, logging each.
    pub async fn stop_all_walks(&mut self) -> Vec<StoppedWalk> {
        let mut stopped = Vec::new();
        for index in self.walks.running() {
            if let Some(walk) = self.stop_walking(index).await {
                stopped.push(walk);
            }
        }
        stopped
    }

    /// `Ok(None)` when signed out.
    pub async fn walk_trend(&self, days: u32) -> Result<Option<Vec<TrendPoint>>, GatewayError> {
        let Some(token) = self.tokens.token() else {
            return Ok(None);
        };
        let series = self.gateway.walk_trend(&token, days).await?;
        Ok(Some(series))
    }

    async fn log_walk(&self, summary: &WalkSummary) -> Result<RemoteWrite, GatewayError> {
        let Some(token) = self.tokens.token() else {
            tracing::debug!("Not signed in; walk not logged remotely");
            return Ok(RemoteWrite::Skipped);
        };

        match self.gateway.append_walk_log(&token, &summary.entry).await {
            Ok(()) => Ok(RemoteWrite::Synced),
            Err(e) => {
                tracing::warn!("Failed to log walk: {}", e);
                Err(e)
            }
        }
    }

    fn require_token(&self) -> Result<String, GatewayError> {
        self.tokens.token().ok_or(GatewayError::AuthMissing)
    }
}

impl<G> fmt::Debug for Engine<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("state", &self.state)
            .field("walks", &self.walks)
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

// Keeps image bytes out of debug logs.
struct CommandName<'a>(&'a Command);

impl fmt::Debug for CommandName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Command::ScanFridge { image, filename } => {
                write!(f, "ScanFridge({}, {} bytes)", filename, image.len())
            }
            other => write!(f, "{:?}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::fake::FakeGateway;
    use crate::gateway::{FridgeAnalysis, RemoteProfile, StaticToken};
    use crate::models::{Gender, Ingredient, Recipe, Store, Suggestion};
    use crate::storage::{FileStorage, LocalPersistence, MemoryStorage, PersistedState};
    use crate::walking::{ManualClock, ManualTicker};
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    struct Harness {
        engine: Engine<FakeGateway>,
        clock: ManualClock,
        ticker: ManualTicker,
        backend: Arc<MemoryStorage>,
    }

    fn harness_with(state: PersistedState, gateway: FakeGateway, token: Option<&str>) -> Harness {
        let backend = Arc::new(MemoryStorage::with_state(state));
        let clock = ManualClock::new(1_700_000_000_000);
        let ticker = ManualTicker::new();
        let walks = WalkTracker::new(Arc::new(clock.clone()), Arc::new(ticker.clone()));
        let engine = Engine::new(
            StateStore::open(LocalPersistence::new(backend.clone())),
            gateway,
            StaticToken::new(token.map(str::to_string)),
            walks,
        );
        Harness {
            engine,
            clock,
            ticker,
            backend,
        }
    }

    fn walker_state() -> PersistedState {
        PersistedState {
            profile: Profile::default()
                .with_gender(Gender::Male)
                .with_weight_kg(70.0),
            stores: vec![Store::new("Corner Mart", 1.0, 23.5)],
            ..Default::default()
        }
    }

    fn fridge_state() -> PersistedState {
        PersistedState {
            ingredients: vec![
                Ingredient::new("milk", 1.0, "l"),
                Ingredient::new("eggs", 6.0, ""),
            ],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_hour_walk_end_to_end() {
        let mut h = harness_with(walker_state(), FakeGateway::new(), Some("tok"));

        let started = h.engine.dispatch(Command::StartWalking(0)).await.unwrap();
        assert_eq!(started, Outcome::WalkStarted(0));

        h.clock.advance(Duration::from_secs(3600));
        let Outcome::WalkStopped(stopped) =
            h.engine.dispatch(Command::StopWalking(0)).await.unwrap()
        else {
            panic!("expected a stopped walk");
        };

        assert_eq!(stopped.summary.calories(), 245);
        assert_eq!(stopped.summary.steps(), 2564);
        assert_eq!(stopped.logged, Ok(RemoteWrite::Synced));

        let logs = h.engine.gateway().walk_logs();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].calories, 245);
        assert_eq!(logs[0].steps, 2564);
        assert_eq!(logs[0].distance_km, 2.0);
        assert_eq!(logs[0].store_name, "Corner Mart");
        assert_eq!(logs[0].end_ts - logs[0].start_ts, 3_600_000);
    }

    #[tokio::test]
    async fn test_double_start_single_submission() {
        let mut h = harness_with(walker_state(), FakeGateway::new(), Some("tok"));

        h.engine.dispatch(Command::StartWalking(0)).await.unwrap();
        h.clock.advance(Duration::from_secs(5));
        let second = h.engine.dispatch(Command::StartWalking(0)).await.unwrap();
        assert_eq!(second, Outcome::Unchanged);
        assert_eq!(h.ticker.active(), 1);

        h.clock.advance(Duration::from_secs(55));
        h.engine.dispatch(Command::StopWalking(0)).await.unwrap();
        let again = h.engine.dispatch(Command::StopWalking(0)).await.unwrap();

        assert_eq!(again, Outcome::Unchanged);
        let logs = h.engine.gateway().walk_logs();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].end_ts - logs[0].start_ts, 60_000);
    }

    #[tokio::test]
    async fn test_stop_without_start_submits_nothing() {
        let mut h = harness_with(walker_state(), FakeGateway::new(), Some("tok"));

        let outcome = h.engine.dispatch(Command::StopWalking(0)).await.unwrap();

        assert_eq!(outcome, Outcome::Unchanged);
        assert!(h.engine.gateway().walk_logs().is_empty());
    }

    #[tokio::test]
    async fn test_failed_walk_log_keeps_summary() {
        let mut h = harness_with(walker_state(), FakeGateway::new().failing(), Some("tok"));

        h.engine.start_walking(0);
        h.clock.advance(Duration::from_secs(3600));
        let stopped = h.engine.stop_walking(0).await.unwrap();

        assert!(matches!(stopped.logged, Err(GatewayError::SaveFailed(_))));
        assert_eq!(stopped.summary.calories(), 245);
        assert!(!h.engine.walks().is_running(0));
    }

    #[tokio::test]
    async fn test_signed_out_walk_is_not_logged() {
        let mut h = harness_with(walker_state(), FakeGateway::new(), None);

        h.engine.start_walking(0);
        h.clock.advance(Duration::from_secs(10));
        let stopped = h.engine.stop_walking(0).await.unwrap();

        assert_eq!(stopped.logged, Ok(RemoteWrite::Skipped));
        assert!(h.engine.gateway().walk_logs().is_empty());
    }

    #[tokio::test]
    async fn test_walk_after_store_list_changes_uses_placeholder() {
        let mut h = harness_with(walker_state(), FakeGateway::new(), Some("tok"));

        h.engine.start_walking(0);
        h.engine.state.set_stores(Vec::new());
        h.clock.advance(Duration::from_secs(600));
        let stopped = h.engine.stop_walking(0).await.unwrap();

        assert_eq!(stopped.summary.entry.store_name, "Store");
        assert_eq!(stopped.summary.entry.distance_km, 0.0);
        assert_eq!(stopped.summary.steps(), 0);
    }

    #[tokio::test]
    async fn test_stop_all_walks() {
        let mut state = walker_state();
        state.stores.push(Store::new("Fresh Co", 0.4, 9.0));
        let mut h = harness_with(state, FakeGateway::new(), Some("tok"));

        h.engine.start_walking(0);
        h.engine.start_walking(1);
        h.clock.advance(Duration::from_secs(30));

        let stopped = h.engine.stop_all_walks().await;
        assert_eq!(stopped.len(), 2);
        assert_eq!(h.engine.gateway().walk_logs().len(), 2);
        assert!(h.engine.walks().running().is_empty());
    }

    #[tokio::test]
    async fn test_preference_commands() {
        let mut h = harness_with(PersistedState::default(), FakeGateway::new(), None);

        let first = h
            .engine
            .dispatch(Command::AddPreference("vegan".to_string()))
            .await
            .unwrap();
        let second = h
            .engine
            .dispatch(Command::AddPreference("vegan".to_string()))
            .await
            .unwrap();

        assert_eq!(first, Outcome::Updated);
        assert_eq!(second, Outcome::Unchanged);
        assert_eq!(h.engine.state().preferences().len(), 1);

        let removed = h
            .engine
            .dispatch(Command::RemovePreference(4))
            .await
            .unwrap();
        assert_eq!(removed, Outcome::Unchanged);
    }

    #[tokio::test]
    async fn test_ingredient_commands_shift_indices() {
        let mut state = fridge_state();
        state.ingredients.push(Ingredient::new("spinach", 200.0, "g"));
        let mut h = harness_with(state, FakeGateway::new(), None);

        h.engine.dispatch(Command::RemoveIngredient(0)).await.unwrap();
        h.engine.dispatch(Command::ConfirmIngredient(0)).await.unwrap();

        let ingredients = h.engine.state().ingredients();
        assert_eq!(ingredients[0].name, "eggs");
        assert!(ingredients[0].confirmed);
        assert!(!ingredients[1].confirmed);
        assert_eq!(h.backend.snapshot().unwrap().ingredients, ingredients);
    }

    #[tokio::test]
    async fn test_save_profile_reports_remote_failure() {
        let mut h = harness_with(PersistedState::default(), FakeGateway::new().failing(), Some("tok"));
        let profile = Profile::default().with_age(29);

        let outcome = h
            .engine
            .dispatch(Command::SaveProfile(profile.clone()))
            .await
            .unwrap();

        assert!(matches!(
            outcome,
            Outcome::ProfileSaved(Err(GatewayError::SaveFailed(_)))
        ));
        assert_eq!(h.engine.state().profile(), &profile);
    }

    #[tokio::test]
    async fn test_push_profile_sends_current_preferences() {
        let mut h = harness_with(PersistedState::default(), FakeGateway::new(), Some("tok"));
        h.engine.state.add_preference("halal");

        let outcome = h.engine.dispatch(Command::PushProfile).await.unwrap();

        assert_eq!(outcome, Outcome::ProfileSaved(Ok(RemoteWrite::Synced)));
        assert_eq!(
            h.engine.gateway().profile_puts()[0].preferences,
            vec!["halal".to_string()]
        );
    }

    #[tokio::test]
    async fn test_scan_requires_login() {
        let mut h = harness_with(fridge_state(), FakeGateway::new(), None);

        let result = h
            .engine
            .dispatch(Command::ScanFridge {
                image: vec![0xFF, 0xD8],
                filename: "fridge.jpg".to_string(),
            })
            .await;

        assert_eq!(result, Err(GatewayError::AuthMissing));
        assert_eq!(h.engine.state().ingredients().len(), 2);
    }

    #[tokio::test]
    async fn test_scan_replaces_ingredients() {
        let gateway = FakeGateway::new();
        *gateway.scan_items.lock().unwrap() = vec![Ingredient::new("tofu", 400.0, "g")];
        let mut h = harness_with(fridge_state(), gateway, Some("tok"));

        let outcome = h
            .engine
            .dispatch(Command::ScanFridge {
                image: vec![1, 2, 3],
                filename: "fridge.jpg".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Scanned(1));
        assert_eq!(h.engine.state().ingredients()[0].name, "tofu");
        assert_eq!(h.backend.snapshot().unwrap().ingredients.len(), 1);
    }

    #[tokio::test]
    async fn test_analyze_without_ingredients() {
        let mut h = harness_with(PersistedState::default(), FakeGateway::new(), Some("tok"));

        let outcome = h.engine.dispatch(Command::Analyze).await.unwrap();

        assert_eq!(outcome, Outcome::NeedsIngredients);
        assert!(h.engine.gateway().tokens_seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_analyze_fetches_stores_for_shopping_list() {
        let gateway = FakeGateway::new();
        *gateway.analysis.lock().unwrap() = FridgeAnalysis {
            suggestions: vec![Suggestion {
                suggestion: "Add lentils".to_string(),
                reason: "protein".to_string(),
                gap: "low_protein".to_string(),
            }],
            shopping_list_generated: vec!["lentils".to_string(), "kale".to_string()],
        };
        *gateway.stores.lock().unwrap() = vec![Store::new("Mart", 0.8, 12.0)];
        let location = Location { lat: 51.5, lng: -0.12 };
        let mut h = harness_with(fridge_state(), gateway, Some("tok"));
        h.engine = h.engine.with_location(location);

        let Outcome::Analyzed(analysis) = h.engine.dispatch(Command::Analyze).await.unwrap() else {
            panic!("expected an analysis");
        };

        assert_eq!(analysis.suggestions, 1);
        assert_eq!(analysis.shopping_items, 2);
        assert_eq!(analysis.stores, Some(Ok(1)));
        assert_eq!(h.engine.state().stores()[0].name, "Mart");
        assert_eq!(h.engine.state().shopping_list().len(), 2);

        let requests = h.engine.gateway().store_requests.lock().unwrap().clone();
        assert_eq!(requests, vec![(vec!["lentils".to_string(), "kale".to_string()], location)]);
    }

    #[tokio::test]
    async fn test_analyze_with_nothing_to_buy_skips_stores() {
        let mut state = fridge_state();
        state.stores = vec![Store::new("Old", 1.0, 1.0)];
        let mut h = harness_with(state, FakeGateway::new(), Some("tok"));

        let Outcome::Analyzed(analysis) = h.engine.dispatch(Command::Analyze).await.unwrap() else {
            panic!("expected an analysis");
        };

        assert_eq!(analysis.stores, None);
        assert_eq!(h.engine.state().stores()[0].name, "Old");
        assert!(h.engine.gateway().store_requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_analyze_requires_login() {
        let mut h = harness_with(fridge_state(), FakeGateway::new(), None);
        assert_eq!(
            h.engine.dispatch(Command::Analyze).await,
            Err(GatewayError::AuthMissing)
        );
    }

    #[tokio::test]
    async fn test_recipes_use_profile_diet() {
        let gateway = FakeGateway::new();
        *gateway.recipes.lock().unwrap() = vec![Recipe {
            title: "Omelette".to_string(),
            ..Default::default()
        }];
        let mut state = fridge_state();
        state.profile.diet_type = "keto".to_string();
        let mut h = harness_with(state, gateway, Some("tok"));

        let outcome = h.engine.dispatch(Command::RecommendRecipes).await.unwrap();

        assert_eq!(outcome, Outcome::Recipes(1));
        assert_eq!(h.engine.state().recipes()[0].title, "Omelette");
        assert_eq!(
            *h.engine.gateway().recipe_diets.lock().unwrap(),
            vec!["keto".to_string()]
        );
    }

    #[tokio::test]
    async fn test_recipe_failure_keeps_previous_recipes() {
        let mut state = fridge_state();
        state.recipes = vec![Recipe {
            title: "Soup".to_string(),
            ..Default::default()
        }];
        let mut h = harness_with(state, FakeGateway::new().failing(), Some("tok"));

        let result = h.engine.dispatch(Command::RecommendRecipes).await;

        assert!(matches!(result, Err(GatewayError::FetchFailed(_))));
        assert_eq!(h.engine.state().recipes()[0].title, "Soup");
    }

    #[tokio::test]
    async fn test_trend_signed_out_and_in() {
        let gateway = FakeGateway::new();
        *gateway.trend.lock().unwrap() = vec![
            TrendPoint {
                date: "2024-03-01".to_string(),
                calories: 120.0,
            },
            TrendPoint {
                date: "2024-03-02".to_string(),
                calories: 80.0,
            },
        ];
        let mut h = harness_with(PersistedState::default(), gateway, Some("tok"));

        let outcome = h
            .engine
            .dispatch(Command::WalkTrend { days: 1 })
            .await
            .unwrap();
        let Outcome::Trend(Some(series)) = outcome else {
            panic!("expected a trend");
        };
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].calories, 120.0);

        let signed_out = harness_with(PersistedState::default(), FakeGateway::new(), None);
        assert_eq!(signed_out.engine.walk_trend(7).await, Ok(None));
    }

    #[tokio::test]
    async fn test_reconcile_command_replaces_preferences() {
        let state = PersistedState {
            preferences: vec!["vegan".to_string()],
            ..Default::default()
        };
        let gateway = FakeGateway::new().with_remote_profile(RemoteProfile {
            preferences: Some(vec!["keto".to_string(), "nut-free".to_string()]),
            ..Default::default()
        });
        let mut h = harness_with(state, gateway, Some("tok"));

        let outcome = h.engine.dispatch(Command::Reconcile).await.unwrap();

        assert_eq!(outcome, Outcome::Reconciled(Reconciled::Remote { preferences: 2 }));
        assert_eq!(
            h.engine.state().preferences(),
            &["keto".to_string(), "nut-free".to_string()]
        );
    }

    #[tokio::test]
    async fn test_state_survives_restart() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path().to_path_buf());
        let open = || {
            let clock = ManualClock::new(0);
            let walks = WalkTracker::new(Arc::new(clock), Arc::new(ManualTicker::new()));
            Engine::new(
                StateStore::open(LocalPersistence::new(storage.clone())),
                FakeGateway::new(),
                StaticToken::none(),
                walks,
            )
        };

        {
            let mut engine = open();
            engine.state.set_ingredients(fridge_state().ingredients);
            engine.dispatch(Command::ConfirmAll).await.unwrap();
            engine
                .dispatch(Command::AddPreference("nut-free".to_string()))
                .await
                .unwrap();
            engine
                .dispatch(Command::SaveProfile(Profile::default().with_height_cm(180.0)))
                .await
                .unwrap();
        }

        let engine = open();
        let state = engine.state();
        assert!(state.ingredients().iter().all(|i| i.confirmed));
        assert_eq!(state.preferences(), &["nut-free".to_string()]);
        assert_eq!(state.profile().height_cm, Some(180.0));
    }
}
