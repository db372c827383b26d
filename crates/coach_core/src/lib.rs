use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::domain::{BehaviorCategory, Strategy, StudentLevel};
use tokio::sync::Mutex;
use tracing::info;

pub mod coach_session;
pub mod gemini;
pub mod log_store;
pub mod prompts;
pub mod simulator;
pub mod strategy_cache;

pub use coach_session::{AdviceState, CoachSession, ADVICE_FALLBACK_TEXT, NO_ADVICE_TEXT};
pub use log_store::LogStore;
pub use simulator::{SimulatorSession, CONNECTION_LOST_TEXT, OPENING_TURN_TEXT};
pub use strategy_cache::{StrategyCache, PLACEHOLDER_SLOTS, STRATEGY_COUNT};

/// Sampling parameters forwarded to the provider on single-shot generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
}

/// Fixed sampling for advice requests.
pub const ADVICE_SAMPLING: SamplingParams = SamplingParams {
    temperature: 0.7,
    top_k: 40,
    top_p: 0.95,
};

/// One multi-turn conversation with the persona-emulating model. The handle
/// owns the provider-side history it replays on every turn.
#[async_trait]
pub trait Conversation: Send + Sync {
    async fn send_turn(&self, text: &str) -> Result<String>;
}

/// The generative-language boundary. The rest of the system treats the
/// provider as an opaque collaborator with exactly these three operations.
#[async_trait]
pub trait GenerativeProvider: Send + Sync {
    async fn generate_text(&self, prompt: &str, sampling: SamplingParams) -> Result<String>;
    async fn start_conversation(&self, system_directive: &str) -> Result<Box<dyn Conversation>>;
    async fn generate_strategies(&self, prompt: &str, count: usize) -> Result<Vec<Strategy>>;
}

/// Stand-in used when no API key is configured. Every call fails, which drives
/// each component through its defined fallback path instead of crashing.
pub struct MissingGenerativeProvider;

#[async_trait]
impl GenerativeProvider for MissingGenerativeProvider {
    async fn generate_text(&self, _prompt: &str, _sampling: SamplingParams) -> Result<String> {
        Err(anyhow!("generative provider unavailable; set GEMINI_API_KEY"))
    }

    async fn start_conversation(&self, _system_directive: &str) -> Result<Box<dyn Conversation>> {
        Err(anyhow!("generative provider unavailable; set GEMINI_API_KEY"))
    }

    async fn generate_strategies(&self, _prompt: &str, _count: usize) -> Result<Vec<Strategy>> {
        Err(anyhow!("generative provider unavailable; set GEMINI_API_KEY"))
    }
}

/// Async facade over the provider. Owns the single simulator conversation
/// handle; starting a new simulation replaces (and thereby drops) the previous
/// handle, ending one releases it explicitly.
pub struct CoachClient {
    provider: Arc<dyn GenerativeProvider>,
    conversation: Mutex<Option<Box<dyn Conversation>>>,
}

impl CoachClient {
    pub fn new(provider: Arc<dyn GenerativeProvider>) -> Arc<Self> {
        Arc::new(Self {
            provider,
            conversation: Mutex::new(None),
        })
    }

    /// Single-shot advice for one scenario/category pair. Independent of any
    /// previous call; no conversation memory is retained.
    pub async fn request_advice(
        &self,
        scenario: &str,
        category: BehaviorCategory,
    ) -> Result<String> {
        info!(category = %category, scenario_len = scenario.len(), "coach: requesting advice");
        let prompt = prompts::advice_prompt(scenario, category);
        let advice = self.provider.generate_text(&prompt, ADVICE_SAMPLING).await?;
        if advice.trim().is_empty() {
            return Ok(NO_ADVICE_TEXT.to_string());
        }
        Ok(advice)
    }

    /// Opens the persona conversation for a new simulation session, fixing
    /// category and level through the system directive.
    pub async fn start_simulation(
        &self,
        category: BehaviorCategory,
        level: StudentLevel,
    ) -> Result<()> {
        let directive = prompts::persona_directive(category, level);
        let handle = self.provider.start_conversation(&directive).await?;
        let mut guard = self.conversation.lock().await;
        // Replacing drops any previous handle: at most one conversation lives
        // at a time.
        *guard = Some(handle);
        info!(category = %category, level = %level, "simulator: conversation opened");
        Ok(())
    }

    /// Sends one tutor turn and returns the persona's reply. Holding the lock
    /// across the round trip serializes concurrent sends, so replies append in
    /// submission order.
    pub async fn send_simulation_turn(&self, text: &str) -> Result<String> {
        let guard = self.conversation.lock().await;
        let Some(handle) = guard.as_ref() else {
            return Err(anyhow!("no active simulation session"));
        };
        handle.send_turn(text).await
    }

    /// Releases the conversation handle. Safe to call when none is active.
    pub async fn end_simulation(&self) {
        if self.conversation.lock().await.take().is_some() {
            info!("simulator: conversation handle released");
        }
    }

    /// Fetches the fixed-size strategy library. Called exactly once at
    /// startup; the caller degrades silently on failure.
    pub async fn load_strategies(&self) -> Result<Vec<Strategy>> {
        self.provider
            .generate_strategies(prompts::STRATEGY_LIBRARY_PROMPT, STRATEGY_COUNT)
            .await
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
