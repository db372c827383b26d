//! Backend worker thread: owns the tokio runtime and the provider client.

use std::sync::Arc;
use std::thread;

use coach_core::{
    gemini::{GeminiProvider, GeminiSettings},
    CoachClient, GenerativeProvider, MissingGenerativeProvider,
};
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

/// Spawns the backend worker. The worker drains the command queue
/// sequentially; there is never more than one provider call in flight, so
/// replies come back in submission order.
pub fn spawn_backend_thread(
    settings: GeminiSettings,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let provider: Arc<dyn GenerativeProvider> = match GeminiProvider::new(settings) {
                Ok(provider) => Arc::new(provider),
                Err(err) => {
                    // Every call against the stub fails, which routes each
                    // panel through its defined fallback instead of crashing.
                    let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                        UiErrorContext::BackendStartup,
                        format!("generative provider unavailable: {err}"),
                    )));
                    tracing::warn!("starting without a generative provider: {err}");
                    Arc::new(MissingGenerativeProvider)
                }
            };
            let client = CoachClient::new(provider);
            let _ = ui_tx.try_send(UiEvent::Info("Backend worker ready".to_string()));

            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    BackendCommand::RequestAdvice { scenario, category } => {
                        let event = match client.request_advice(&scenario, category).await {
                            Ok(advice) => UiEvent::AdviceReady(advice),
                            Err(err) => {
                                tracing::error!("advice request failed: {err}");
                                UiEvent::AdviceFailed
                            }
                        };
                        let _ = ui_tx.try_send(event);
                    }
                    BackendCommand::StartSimulation {
                        generation,
                        category,
                        level,
                    } => {
                        if let Err(err) = client.start_simulation(category, level).await {
                            // The seeded transcript is already on screen; each
                            // later send fails into its connection-lost turn.
                            tracing::error!(
                                generation,
                                "failed to open simulation conversation: {err}"
                            );
                        }
                    }
                    BackendCommand::SendSimulationTurn { generation, text } => {
                        let event = match client.send_simulation_turn(&text).await {
                            Ok(reply) => UiEvent::SimulationReply { generation, reply },
                            Err(err) => {
                                tracing::error!(generation, "simulation turn failed: {err}");
                                UiEvent::SimulationTurnFailed { generation }
                            }
                        };
                        let _ = ui_tx.try_send(event);
                    }
                    BackendCommand::EndSimulation => {
                        client.end_simulation().await;
                    }
                    BackendCommand::LoadStrategies => {
                        let event = match client.load_strategies().await {
                            Ok(strategies) => UiEvent::StrategiesLoaded(strategies),
                            Err(err) => {
                                tracing::warn!("strategy library fetch failed: {err}");
                                UiEvent::StrategiesUnavailable
                            }
                        };
                        let _ = ui_tx.try_send(event);
                    }
                }
            }
            tracing::info!("backend worker shutting down: command queue closed");
        });
    });
}
