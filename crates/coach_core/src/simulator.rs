use shared::domain::{BehaviorCategory, ChatTurn, StudentLevel};
use tracing::info;

/// Synthetic student turn that primes the scene before any network exchange.
pub const OPENING_TURN_TEXT: &str =
    "(The student is looking at the floor, refusing to open their workbook).";
/// Student turn appended when a round trip to the persona model fails. The
/// tutor's already-appended turn is never rolled back.
pub const CONNECTION_LOST_TEXT: &str = "Error in simulation. Connection lost.";

/// One practice conversation with the persona-emulating model. Category and
/// level are fixed for the session's lifetime; the transcript grows
/// monotonically while active and is replaced wholesale by the next
/// `start`, never appended to once ended.
#[derive(Debug)]
pub struct SimulatorSession {
    category: BehaviorCategory,
    level: StudentLevel,
    transcript: Vec<ChatTurn>,
    active: bool,
}

impl SimulatorSession {
    /// Opens a session seeded with the synthetic opening turn. Seeding is
    /// independent of the external conversation handle, so the transcript has
    /// length 1 before any call resolves.
    pub fn start(category: BehaviorCategory, level: StudentLevel) -> Self {
        info!(category = %category, level = %level, "simulator: transcript seeded");
        Self {
            category,
            level,
            transcript: vec![ChatTurn::student(OPENING_TURN_TEXT)],
            active: true,
        }
    }

    pub fn category(&self) -> BehaviorCategory {
        self.category
    }

    pub fn level(&self) -> StudentLevel {
        self.level
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn transcript(&self) -> &[ChatTurn] {
        &self.transcript
    }

    /// Optimistically appends the tutor's turn. Guarded no-op while inactive
    /// or on empty input.
    pub fn push_tutor_turn(&mut self, text: &str) -> bool {
        if !self.active || text.trim().is_empty() {
            return false;
        }
        self.transcript.push(ChatTurn::tutor(text));
        true
    }

    /// Appends the persona's reply. Ignored once the session has ended.
    pub fn resolve_student_reply(&mut self, reply: String) {
        if !self.active {
            return;
        }
        self.transcript.push(ChatTurn::student(reply));
    }

    /// Appends the fixed connection-lost turn in place of a reply.
    pub fn resolve_connection_lost(&mut self) {
        self.resolve_student_reply(CONNECTION_LOST_TEXT.to_string());
    }

    /// Ends the session. The transcript stays visible but immutable until the
    /// next `start` discards it.
    pub fn end(&mut self) {
        if self.active {
            info!(turns = self.transcript.len(), "simulator: session ended");
        }
        self.active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::domain::TurnRole;

    fn session() -> SimulatorSession {
        SimulatorSession::start(BehaviorCategory::Defiance, StudentLevel::Primary)
    }

    #[test]
    fn start_seeds_exactly_one_student_turn() {
        let session = session();
        assert_eq!(session.transcript().len(), 1);
        assert_eq!(session.transcript()[0].role, TurnRole::Student);
        assert_eq!(session.transcript()[0].text, OPENING_TURN_TEXT);
        assert!(session.is_active());
    }

    #[test]
    fn failed_send_appends_tutor_turn_plus_fallback() {
        let mut session = session();
        assert!(session.push_tutor_turn("Let's open the workbook together."));
        session.resolve_connection_lost();

        assert_eq!(session.transcript().len(), 3);
        assert_eq!(session.transcript()[1].role, TurnRole::Tutor);
        assert_eq!(session.transcript()[2].text, CONNECTION_LOST_TEXT);
    }

    #[test]
    fn send_while_inactive_is_a_no_op() {
        let mut session = session();
        session.end();
        assert!(!session.push_tutor_turn("hello?"));
        assert_eq!(session.transcript().len(), 1);
    }

    #[test]
    fn empty_input_is_a_no_op() {
        let mut session = session();
        assert!(!session.push_tutor_turn("  "));
        assert_eq!(session.transcript().len(), 1);
    }

    #[test]
    fn replies_do_not_append_after_end() {
        let mut session = session();
        session.push_tutor_turn("How are you feeling about maths today?");
        session.end();
        session.resolve_student_reply("I hate it.".to_string());
        assert_eq!(session.transcript().len(), 2);
    }

    #[test]
    fn restarting_resets_to_a_single_seeded_turn() {
        let mut session = session();
        session.push_tutor_turn("Can you try the first question?");
        session.resolve_student_reply("No.".to_string());
        session.end();

        let fresh = SimulatorSession::start(BehaviorCategory::Distraction, StudentLevel::High);
        assert_eq!(fresh.transcript().len(), 1);
        assert_eq!(fresh.transcript()[0].text, OPENING_TURN_TEXT);
        assert_eq!(fresh.category(), BehaviorCategory::Distraction);
    }
}
