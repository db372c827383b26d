use anyhow::Result;
use shared::domain::Strategy;
use tracing::{info, warn};

/// Number of placeholder cards rendered while no strategies are available.
pub const PLACEHOLDER_SLOTS: usize = 3;
/// Number of strategies requested from the provider.
pub const STRATEGY_COUNT: usize = 5;

/// Fetch-once, cache-forever strategy library. The load is issued exactly once
/// at startup; failure degrades silently to an empty cache with no retry, since
/// the strategy panel is supplementary rather than critical-path.
#[derive(Debug)]
pub enum StrategyCache {
    Loading,
    Ready(Vec<Strategy>),
    Unavailable,
}

impl StrategyCache {
    pub fn new() -> Self {
        StrategyCache::Loading
    }

    /// Resolves the single startup fetch. The cache only ever holds the full
    /// fetched set, never a partial one.
    pub fn resolve(&mut self, result: Result<Vec<Strategy>>) {
        match result {
            Ok(strategies) => {
                info!(count = strategies.len(), "strategies: library loaded");
                *self = StrategyCache::Ready(strategies);
            }
            Err(err) => {
                warn!("strategies: library fetch failed, panel stays empty: {err}");
                *self = StrategyCache::Unavailable;
            }
        }
    }

    /// Empty unless the fetch succeeded.
    pub fn strategies(&self) -> &[Strategy] {
        match self {
            StrategyCache::Ready(strategies) => strategies,
            _ => &[],
        }
    }

    /// True while placeholder cards should be shown instead of strategies.
    pub fn shows_placeholders(&self) -> bool {
        !matches!(self, StrategyCache::Ready(_))
    }
}

impl Default for StrategyCache {
    fn default() -> Self {
        Self::new()
    }
}
