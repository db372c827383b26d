use super::*;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use tokio::sync::Mutex as AsyncMutex;

struct TestConversation {
    replies: AsyncMutex<Vec<String>>,
    fail_with: Option<String>,
    sent_turns: Arc<AsyncMutex<Vec<String>>>,
    live_handles: Arc<AtomicUsize>,
}

impl Drop for TestConversation {
    fn drop(&mut self) {
        self.live_handles.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Conversation for TestConversation {
    async fn send_turn(&self, text: &str) -> Result<String> {
        self.sent_turns.lock().await.push(text.to_string());
        if let Some(err) = &self.fail_with {
            return Err(anyhow!(err.clone()));
        }
        let mut replies = self.replies.lock().await;
        if replies.is_empty() {
            return Ok("I don't want to.".to_string());
        }
        Ok(replies.remove(0))
    }
}

struct TestProvider {
    advice: String,
    strategies: Vec<Strategy>,
    fail_with: Option<String>,
    reply_queue: Vec<String>,
    prompts_seen: Arc<AsyncMutex<Vec<String>>>,
    directives_seen: Arc<AsyncMutex<Vec<String>>>,
    sent_turns: Arc<AsyncMutex<Vec<String>>>,
    live_handles: Arc<AtomicUsize>,
}

impl TestProvider {
    fn ok() -> Self {
        Self {
            advice: "Lead with empathy, then restate the expectation.".to_string(),
            strategies: sample_strategies(STRATEGY_COUNT),
            fail_with: None,
            reply_queue: Vec::new(),
            prompts_seen: Arc::new(AsyncMutex::new(Vec::new())),
            directives_seen: Arc::new(AsyncMutex::new(Vec::new())),
            sent_turns: Arc::new(AsyncMutex::new(Vec::new())),
            live_handles: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn failing(err: impl Into<String>) -> Self {
        let mut provider = Self::ok();
        provider.fail_with = Some(err.into());
        provider
    }
}

fn sample_strategies(count: usize) -> Vec<Strategy> {
    (0..count)
        .map(|i| Strategy {
            title: format!("Strategy {i}"),
            description: "A short reusable technique.".to_string(),
            category: "Disengagement".to_string(),
        })
        .collect()
}

#[async_trait]
impl GenerativeProvider for TestProvider {
    async fn generate_text(&self, prompt: &str, _sampling: SamplingParams) -> Result<String> {
        self.prompts_seen.lock().await.push(prompt.to_string());
        if let Some(err) = &self.fail_with {
            return Err(anyhow!(err.clone()));
        }
        Ok(self.advice.clone())
    }

    async fn start_conversation(&self, system_directive: &str) -> Result<Box<dyn Conversation>> {
        self.directives_seen
            .lock()
            .await
            .push(system_directive.to_string());
        if let Some(err) = &self.fail_with {
            return Err(anyhow!(err.clone()));
        }
        self.live_handles.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(TestConversation {
            replies: AsyncMutex::new(self.reply_queue.clone()),
            fail_with: None,
            sent_turns: Arc::clone(&self.sent_turns),
            live_handles: Arc::clone(&self.live_handles),
        }))
    }

    async fn generate_strategies(&self, _prompt: &str, count: usize) -> Result<Vec<Strategy>> {
        if let Some(err) = &self.fail_with {
            return Err(anyhow!(err.clone()));
        }
        Ok(self.strategies.iter().take(count).cloned().collect())
    }
}

#[tokio::test]
async fn advice_prompt_carries_scenario_and_category() {
    let provider = Arc::new(TestProvider::ok());
    let prompts_seen = Arc::clone(&provider.prompts_seen);
    let client = CoachClient::new(provider);

    let advice = client
        .request_advice("hides under the desk", BehaviorCategory::Frustration)
        .await
        .expect("advice");
    assert_eq!(advice, "Lead with empathy, then restate the expectation.");

    let prompts = prompts_seen.lock().await;
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("hides under the desk"));
    assert!(prompts[0].contains("Frustration"));
}

#[tokio::test]
async fn empty_provider_text_maps_to_no_advice_found() {
    let mut provider = TestProvider::ok();
    provider.advice = "   ".to_string();
    let client = CoachClient::new(Arc::new(provider));

    let advice = client
        .request_advice("scenario", BehaviorCategory::Defiance)
        .await
        .expect("advice");
    assert_eq!(advice, NO_ADVICE_TEXT);
}

#[tokio::test]
async fn advice_failure_propagates_to_the_caller() {
    let client = CoachClient::new(Arc::new(TestProvider::failing("quota exhausted")));
    let err = client
        .request_advice("scenario", BehaviorCategory::Defiance)
        .await
        .expect_err("should fail");
    assert!(err.to_string().contains("quota exhausted"));
}

#[tokio::test]
async fn simulation_directive_fixes_persona_and_level() {
    let provider = Arc::new(TestProvider::ok());
    let directives_seen = Arc::clone(&provider.directives_seen);
    let client = CoachClient::new(provider);

    client
        .start_simulation(BehaviorCategory::Impulsivity, StudentLevel::High)
        .await
        .expect("start");

    let directives = directives_seen.lock().await;
    assert_eq!(directives.len(), 1);
    assert!(directives[0].contains("Alex"));
    assert!(directives[0].contains("Impulsivity"));
    assert!(directives[0].contains("High School"));
}

#[tokio::test]
async fn send_without_active_session_errors() {
    let client = CoachClient::new(Arc::new(TestProvider::ok()));
    let err = client
        .send_simulation_turn("hello")
        .await
        .expect_err("no session");
    assert!(err.to_string().contains("no active simulation session"));
}

#[tokio::test]
async fn end_simulation_drops_the_conversation_handle() {
    let provider = Arc::new(TestProvider::ok());
    let live_handles = Arc::clone(&provider.live_handles);
    let client = CoachClient::new(provider);

    client
        .start_simulation(BehaviorCategory::Defiance, StudentLevel::Primary)
        .await
        .expect("start");
    assert_eq!(live_handles.load(Ordering::SeqCst), 1);

    client.end_simulation().await;
    assert_eq!(live_handles.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn restarting_replaces_the_previous_handle() {
    let provider = Arc::new(TestProvider::ok());
    let live_handles = Arc::clone(&provider.live_handles);
    let client = CoachClient::new(provider);

    client
        .start_simulation(BehaviorCategory::Defiance, StudentLevel::Primary)
        .await
        .expect("start");
    client
        .start_simulation(BehaviorCategory::Distraction, StudentLevel::Middle)
        .await
        .expect("restart");

    // The replaced handle must have been dropped, never left dangling.
    assert_eq!(live_handles.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn turns_reach_the_conversation_in_order() {
    let provider = Arc::new(TestProvider::ok());
    let sent_turns = Arc::clone(&provider.sent_turns);
    let client = CoachClient::new(provider);

    client
        .start_simulation(BehaviorCategory::Disengagement, StudentLevel::Middle)
        .await
        .expect("start");
    client.send_simulation_turn("first").await.expect("turn 1");
    client.send_simulation_turn("second").await.expect("turn 2");

    assert_eq!(
        sent_turns.lock().await.as_slice(),
        ["first".to_string(), "second".to_string()]
    );
}

#[tokio::test]
async fn strategy_load_returns_the_requested_count() {
    let client = CoachClient::new(Arc::new(TestProvider::ok()));
    let strategies = client.load_strategies().await.expect("strategies");
    assert_eq!(strategies.len(), STRATEGY_COUNT);
}

#[tokio::test]
async fn strategy_load_failure_surfaces_for_silent_degradation() {
    let client = CoachClient::new(Arc::new(TestProvider::failing("offline")));
    let result = client.load_strategies().await;

    let mut cache = StrategyCache::new();
    cache.resolve(result);
    assert!(cache.strategies().is_empty());
    assert!(cache.shows_placeholders());
}
