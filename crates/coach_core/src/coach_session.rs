use shared::domain::BehaviorCategory;
use tracing::info;

/// Shown in place of advice when the provider call fails. Failures share the
/// display slot with successful advice; there is no persisted error state.
pub const ADVICE_FALLBACK_TEXT: &str = "Error getting advice. Please try again.";
/// Shown when the provider answers with empty text.
pub const NO_ADVICE_TEXT: &str = "No advice found.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdviceState {
    Idle,
    Loading,
    Ready(String),
}

/// Single-shot advice flow: scenario and category in, advice text out. Each
/// request is independent; no conversation memory is kept between calls.
#[derive(Debug)]
pub struct CoachSession {
    state: AdviceState,
}

impl CoachSession {
    pub fn new() -> Self {
        Self {
            state: AdviceState::Idle,
        }
    }

    pub fn state(&self) -> &AdviceState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, AdviceState::Loading)
    }

    pub fn advice(&self) -> Option<&str> {
        match &self.state {
            AdviceState::Ready(text) => Some(text),
            _ => None,
        }
    }

    /// Moves to Loading and reports whether a request should be dispatched.
    /// Empty scenarios and requests while one is already outstanding are
    /// guarded no-ops, not errors.
    pub fn begin_request(&mut self, scenario: &str, category: BehaviorCategory) -> bool {
        if scenario.trim().is_empty() || self.is_loading() {
            return false;
        }
        info!(category = %category, "coach: advice request started");
        self.state = AdviceState::Loading;
        true
    }

    /// Resolves the outstanding request with advice text. Ignored unless a
    /// request is in flight.
    pub fn resolve_advice(&mut self, advice: String) {
        if !self.is_loading() {
            return;
        }
        self.state = AdviceState::Ready(advice);
    }

    /// Resolves the outstanding request with the fixed fallback prose.
    pub fn resolve_failure(&mut self) {
        if !self.is_loading() {
            return;
        }
        self.state = AdviceState::Ready(ADVICE_FALLBACK_TEXT.to_string());
    }
}

impl Default for CoachSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_scenario_never_leaves_idle() {
        let mut session = CoachSession::new();
        assert!(!session.begin_request("", BehaviorCategory::Defiance));
        assert!(!session.begin_request("   ", BehaviorCategory::Defiance));
        assert_eq!(session.state(), &AdviceState::Idle);
    }

    #[test]
    fn only_one_request_may_be_outstanding() {
        let mut session = CoachSession::new();
        assert!(session.begin_request("refuses worksheet", BehaviorCategory::Frustration));
        assert!(!session.begin_request("another scenario", BehaviorCategory::Frustration));
        assert!(session.is_loading());
    }

    #[test]
    fn failure_resolves_into_the_fallback_slot() {
        let mut session = CoachSession::new();
        session.begin_request("refuses worksheet", BehaviorCategory::Defiance);
        session.resolve_failure();
        assert_eq!(session.advice(), Some(ADVICE_FALLBACK_TEXT));
        assert!(!session.is_loading());
    }

    #[test]
    fn resolution_without_outstanding_request_is_ignored() {
        let mut session = CoachSession::new();
        session.resolve_advice("stale".to_string());
        assert_eq!(session.state(), &AdviceState::Idle);
    }

    #[test]
    fn new_request_is_allowed_after_resolution() {
        let mut session = CoachSession::new();
        session.begin_request("scenario", BehaviorCategory::Distraction);
        session.resolve_advice("Try a movement break.".to_string());
        assert!(session.begin_request("scenario two", BehaviorCategory::Distraction));
    }
}
