//! Commands queued from the UI thread to the backend worker.

use shared::domain::{BehaviorCategory, StudentLevel};

/// One unit of backend work. Commands are processed strictly in queue order by
/// a single worker loop, which is what keeps simulation replies in submission
/// order.
pub enum BackendCommand {
    RequestAdvice {
        scenario: String,
        category: BehaviorCategory,
    },
    /// `generation` tags the simulation session this command belongs to, so
    /// replies that arrive after a restart can be discarded.
    StartSimulation {
        generation: u64,
        category: BehaviorCategory,
        level: StudentLevel,
    },
    SendSimulationTurn {
        generation: u64,
        text: String,
    },
    EndSimulation,
    LoadStrategies,
}
