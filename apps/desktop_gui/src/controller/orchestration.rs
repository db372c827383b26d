//! Command dispatch from the UI thread into the backend queue.

use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;

/// Queues a command without blocking the UI thread. Backpressure and a dead
/// worker both degrade to a status-line message rather than a stall.
pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    status: &mut String,
) {
    let cmd_name = match &cmd {
        BackendCommand::RequestAdvice { .. } => "request_advice",
        BackendCommand::StartSimulation { .. } => "start_simulation",
        BackendCommand::SendSimulationTurn { .. } => "send_simulation_turn",
        BackendCommand::EndSimulation => "end_simulation",
        BackendCommand::LoadStrategies => "load_strategies",
    };
    tracing::debug!(command = cmd_name, "queueing ui->backend command");
    match cmd_tx.try_send(cmd) {
        Ok(()) => {}
        Err(TrySendError::Full(_)) => {
            *status = "Command queue is full; please retry".to_string();
            tracing::warn!(command = cmd_name, "ui->backend command queue is full");
        }
        Err(TrySendError::Disconnected(_)) => {
            *status = "Backend worker disconnected; restart the app".to_string();
            tracing::error!(command = cmd_name, "ui->backend command queue disconnected");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;

    #[test]
    fn full_queue_reports_through_the_status_line() {
        let (cmd_tx, _cmd_rx) = bounded(1);
        let mut status = String::new();
        dispatch_backend_command(&cmd_tx, BackendCommand::LoadStrategies, &mut status);
        assert!(status.is_empty());
        dispatch_backend_command(&cmd_tx, BackendCommand::EndSimulation, &mut status);
        assert!(status.contains("full"));
    }

    #[test]
    fn disconnected_queue_reports_through_the_status_line() {
        let (cmd_tx, cmd_rx) = bounded(1);
        drop(cmd_rx);
        let mut status = String::new();
        dispatch_backend_command(&cmd_tx, BackendCommand::LoadStrategies, &mut status);
        assert!(status.contains("disconnected"));
    }
}
