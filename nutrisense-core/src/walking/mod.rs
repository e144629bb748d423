//! Walking sessions: per-store timers with live calorie tracking.

mod session;
mod ticker;

pub use session::{LiveWalk, WalkSession, WalkSummary, WalkTracker, TICK_INTERVAL};
pub use ticker::{
    Clock, ManualClock, ManualTicker, SystemClock, TickFn, TickHandle, Ticker, TokioTicker,
};
