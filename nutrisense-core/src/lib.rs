//! NutriSense Core Library
//!
//! Client-side state, walking sessions and profile sync for NutriSense hosts.

pub mod engine;
pub mod gateway;
pub mod metrics;
pub mod models;
pub mod reconcile;
pub mod state;
pub mod storage;
pub mod walking;

pub use engine::{Analysis, Command, Engine, Outcome, StoppedWalk, DEFAULT_TREND_DAYS};
pub use gateway::{
    Gateway, GatewayError, HttpGateway, Location, RemoteWrite, StaticToken, TokenProvider,
};
pub use metrics::{estimate_steps, estimate_walk_calories, format_elapsed};
pub use models::{
    Freshness, Gender, Ingredient, IngredientPatch, Profile, Recipe, Store, Suggestion, TrendPoint,
    WalkLogEntry,
};
pub use reconcile::Reconciled;
pub use state::StateStore;
pub use storage::{
    FileStorage, LocalPersistence, MemoryStorage, PersistedState, StateStorage, StorageError,
};
pub use walking::{LiveWalk, WalkSummary, WalkTracker};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
