//! The TutorAlly desktop app: four tabs over one shared behavior category.

use std::time::Duration;

use chrono::Local;
use coach_core::{
    log_store::{MAX_INTENSITY, MIN_INTENSITY},
    CoachSession, LogStore, SimulatorSession, StrategyCache, PLACEHOLDER_SLOTS,
};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::domain::{BehaviorCategory, StudentLevel, TurnRole};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiErrorContext, UiEvent};
use crate::controller::orchestration::dispatch_backend_command;

const DEFAULT_INTENSITY: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Dashboard,
    Coach,
    Simulator,
    Tracker,
}

impl Tab {
    const ALL: [Tab; 4] = [Tab::Dashboard, Tab::Coach, Tab::Simulator, Tab::Tracker];

    fn label(self) -> &'static str {
        match self {
            Tab::Dashboard => "Dashboard",
            Tab::Coach => "Coach",
            Tab::Simulator => "Simulator",
            Tab::Tracker => "Tracker",
        }
    }
}

/// Draft of the next incident log entry, bound to the tracker form.
struct LogForm {
    student_name: String,
    description: String,
    intensity: u8,
}

impl LogForm {
    fn new() -> Self {
        Self {
            student_name: String::new(),
            description: String::new(),
            intensity: DEFAULT_INTENSITY,
        }
    }
}

pub struct TutorAllyApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,

    active_tab: Tab,
    /// Shared by the coach form and the tracker form; the simulator keeps its
    /// own pick so an exercise is not disturbed by logging work.
    selected_category: BehaviorCategory,

    scenario_input: String,
    coach: CoachSession,

    simulator: Option<SimulatorSession>,
    /// Bumped on every simulation start; replies tagged with an older value
    /// belong to a replaced session and are dropped.
    sim_generation: u64,
    sim_category: BehaviorCategory,
    sim_level: StudentLevel,
    sim_input: String,

    log_store: LogStore,
    log_form: LogForm,

    strategies: StrategyCache,

    status: String,
}

impl TutorAllyApp {
    pub fn new(cmd_tx: Sender<BackendCommand>, ui_rx: Receiver<UiEvent>) -> Self {
        let mut status = "Starting backend worker...".to_string();
        // The strategy library is fetched exactly once, at startup.
        dispatch_backend_command(&cmd_tx, BackendCommand::LoadStrategies, &mut status);
        Self {
            cmd_tx,
            ui_rx,
            active_tab: Tab::Dashboard,
            selected_category: BehaviorCategory::Defiance,
            scenario_input: String::new(),
            coach: CoachSession::new(),
            simulator: None,
            sim_generation: 0,
            sim_category: BehaviorCategory::Defiance,
            sim_level: StudentLevel::Middle,
            sim_input: String::new(),
            log_store: LogStore::new(),
            log_form: LogForm::new(),
            strategies: StrategyCache::new(),
            status,
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => {
                    self.status = message;
                }
                UiEvent::AdviceReady(advice) => {
                    self.coach.resolve_advice(advice);
                }
                UiEvent::AdviceFailed => {
                    self.coach.resolve_failure();
                }
                UiEvent::SimulationReply { generation, reply } => {
                    if generation == self.sim_generation {
                        if let Some(session) = &mut self.simulator {
                            session.resolve_student_reply(reply);
                        }
                    }
                }
                UiEvent::SimulationTurnFailed { generation } => {
                    if generation == self.sim_generation {
                        if let Some(session) = &mut self.simulator {
                            session.resolve_connection_lost();
                        }
                    }
                }
                UiEvent::StrategiesLoaded(strategies) => {
                    self.strategies.resolve(Ok(strategies));
                }
                UiEvent::StrategiesUnavailable => {
                    self.strategies
                        .resolve(Err(anyhow::anyhow!("strategy library unavailable")));
                }
                UiEvent::Error(err) => {
                    self.status = match err.context() {
                        UiErrorContext::BackendStartup => {
                            format!("Backend startup: {}", err.message())
                        }
                        UiErrorContext::General => {
                            format!("{} error: {}", err.category().label(), err.message())
                        }
                    };
                }
            }
        }
    }

    fn submit_advice_request(&mut self) {
        let scenario = self.scenario_input.trim().to_string();
        if self.coach.begin_request(&scenario, self.selected_category) {
            dispatch_backend_command(
                &self.cmd_tx,
                BackendCommand::RequestAdvice {
                    scenario,
                    category: self.selected_category,
                },
                &mut self.status,
            );
        }
    }

    fn start_simulation(&mut self) {
        self.sim_generation += 1;
        self.simulator = Some(SimulatorSession::start(self.sim_category, self.sim_level));
        self.sim_input.clear();
        dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::StartSimulation {
                generation: self.sim_generation,
                category: self.sim_category,
                level: self.sim_level,
            },
            &mut self.status,
        );
    }

    fn send_simulation_turn(&mut self) {
        let text = self.sim_input.trim().to_string();
        let Some(session) = &mut self.simulator else {
            return;
        };
        if session.push_tutor_turn(&text) {
            self.sim_input.clear();
            dispatch_backend_command(
                &self.cmd_tx,
                BackendCommand::SendSimulationTurn {
                    generation: self.sim_generation,
                    text,
                },
                &mut self.status,
            );
        }
    }

    fn end_active_simulation(&mut self) {
        if let Some(session) = &mut self.simulator {
            session.end();
        }
        dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::EndSimulation,
            &mut self.status,
        );
    }

    fn save_log_entry(&mut self) {
        match self.log_store.add_entry(
            &self.log_form.student_name,
            self.selected_category,
            &self.log_form.description,
            self.log_form.intensity,
        ) {
            Ok(_) => {
                self.log_form.student_name.clear();
                self.log_form.description.clear();
                self.log_form.intensity = DEFAULT_INTENSITY;
                self.status = "Incident logged".to_string();
            }
            Err(err) => {
                self.status = err.to_string();
            }
        }
    }

    /// The last transcript turn being the tutor's means a round trip is still
    /// outstanding.
    fn awaiting_reply(&self) -> bool {
        self.simulator
            .as_ref()
            .map(|session| {
                session.is_active()
                    && matches!(
                        session.transcript().last(),
                        Some(turn) if turn.role == TurnRole::Tutor
                    )
            })
            .unwrap_or(false)
    }

    // ------------------------------ rendering ------------------------------

    fn render_dashboard(&mut self, ui: &mut egui::Ui) {
        ui.heading("Behavior Trends");
        ui.add_space(4.0);
        egui::Frame::group(ui.style()).show(ui, |ui| {
            draw_category_chart(ui, &mut self.log_store);
        });

        ui.add_space(12.0);
        ui.heading("Quick Strategies");
        ui.add_space(4.0);
        if self.strategies.shows_placeholders() {
            let hint = if matches!(self.strategies, StrategyCache::Unavailable) {
                "Strategy library unavailable"
            } else {
                "Loading strategies..."
            };
            for _ in 0..PLACEHOLDER_SLOTS {
                egui::Frame::group(ui.style()).show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    ui.weak(hint);
                });
            }
        } else {
            egui::ScrollArea::vertical()
                .id_salt("strategy_cards")
                .show(ui, |ui| {
                    for strategy in self.strategies.strategies() {
                        egui::Frame::group(ui.style()).show(ui, |ui| {
                            ui.set_width(ui.available_width());
                            ui.horizontal(|ui| {
                                ui.strong(&strategy.title);
                                ui.small(
                                    egui::RichText::new(&strategy.category)
                                        .color(egui::Color32::LIGHT_BLUE),
                                );
                            });
                            ui.label(&strategy.description);
                        });
                    }
                });
        }
    }

    fn render_coach(&mut self, ui: &mut egui::Ui) {
        ui.heading("AI Coach");
        ui.add_space(4.0);

        ui.horizontal(|ui| {
            ui.label("Behavior:");
            egui::ComboBox::from_id_salt("coach_category")
                .selected_text(self.selected_category.label())
                .show_ui(ui, |ui| {
                    for category in BehaviorCategory::ALL {
                        ui.selectable_value(
                            &mut self.selected_category,
                            category,
                            category.label(),
                        );
                    }
                });
        });

        ui.add_space(4.0);
        ui.label("Describe the situation:");
        ui.add(
            egui::TextEdit::multiline(&mut self.scenario_input)
                .hint_text("e.g. Student refuses to start the worksheet and argues back")
                .desired_rows(4)
                .desired_width(f32::INFINITY),
        );

        ui.add_space(6.0);
        ui.horizontal(|ui| {
            let can_submit =
                !self.coach.is_loading() && !self.scenario_input.trim().is_empty();
            if ui
                .add_enabled(can_submit, egui::Button::new("Get Advice"))
                .clicked()
            {
                self.submit_advice_request();
            }
            if self.coach.is_loading() {
                ui.spinner();
                ui.weak("Consulting the coach...");
            }
        });

        if let Some(advice) = self.coach.advice() {
            ui.add_space(10.0);
            ui.strong("Recommended Action Plan");
            ui.add_space(4.0);
            egui::Frame::group(ui.style()).show(ui, |ui| {
                ui.set_width(ui.available_width());
                egui::ScrollArea::vertical()
                    .id_salt("advice_text")
                    .show(ui, |ui| {
                        ui.label(advice);
                    });
            });
        }
    }

    fn render_simulator(&mut self, ui: &mut egui::Ui) {
        let session_active = self
            .simulator
            .as_ref()
            .map(|session| session.is_active())
            .unwrap_or(false);
        if session_active {
            self.render_simulator_session(ui);
        } else {
            self.render_simulator_setup(ui);
        }
    }

    fn render_simulator_setup(&mut self, ui: &mut egui::Ui) {
        ui.heading("Practice Simulator");
        ui.add_space(4.0);
        ui.label("Rehearse a difficult session with a simulated student.");
        ui.add_space(8.0);

        ui.horizontal(|ui| {
            ui.label("Behavior:");
            egui::ComboBox::from_id_salt("sim_category")
                .selected_text(self.sim_category.label())
                .show_ui(ui, |ui| {
                    for category in BehaviorCategory::ALL {
                        ui.selectable_value(&mut self.sim_category, category, category.label());
                    }
                });
            ui.label("Level:");
            egui::ComboBox::from_id_salt("sim_level")
                .selected_text(self.sim_level.label())
                .show_ui(ui, |ui| {
                    for level in StudentLevel::ALL {
                        ui.selectable_value(&mut self.sim_level, level, level.label());
                    }
                });
        });

        ui.add_space(8.0);
        if ui.button("Start Session").clicked() {
            self.start_simulation();
        }
    }

    fn render_simulator_session(&mut self, ui: &mut egui::Ui) {
        let mut end_clicked = false;
        let mut send_clicked = false;

        if let Some(session) = &self.simulator {
            ui.horizontal(|ui| {
                ui.strong("Simulating: Alex");
                ui.small(format!(
                    "{} · {}",
                    session.category().label(),
                    session.level().label()
                ));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("End Session").clicked() {
                        end_clicked = true;
                    }
                });
            });
            ui.separator();

            let transcript_height = ui.available_height() - 64.0;
            egui::ScrollArea::vertical()
                .id_salt("sim_transcript")
                .max_height(transcript_height.max(120.0))
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    for turn in session.transcript() {
                        match turn.role {
                            TurnRole::Tutor => {
                                ui.with_layout(
                                    egui::Layout::top_down(egui::Align::Max),
                                    |ui| chat_bubble(ui, &turn.text, true),
                                );
                            }
                            TurnRole::Student => {
                                ui.with_layout(
                                    egui::Layout::top_down(egui::Align::Min),
                                    |ui| chat_bubble(ui, &turn.text, false),
                                );
                            }
                        }
                        ui.add_space(4.0);
                    }
                });
        }

        if self.awaiting_reply() {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.weak("Alex is typing...");
            });
        }

        ui.add_space(4.0);
        let awaiting = self.awaiting_reply();
        ui.horizontal(|ui| {
            let response = ui.add_sized(
                [ui.available_width() - 70.0, 28.0],
                egui::TextEdit::singleline(&mut self.sim_input).hint_text("Respond to Alex..."),
            );
            let enter_pressed =
                response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            let can_send = !awaiting && !self.sim_input.trim().is_empty();
            if ui.add_enabled(can_send, egui::Button::new("Send")).clicked()
                || (can_send && enter_pressed)
            {
                send_clicked = true;
            }
        });

        if end_clicked {
            self.end_active_simulation();
        }
        if send_clicked {
            self.send_simulation_turn();
        }
    }

    fn render_tracker(&mut self, ui: &mut egui::Ui) {
        ui.heading("Behavior Tracker");
        ui.add_space(4.0);
        ui.columns(2, |columns| {
            self.render_log_form(&mut columns[0]);
            self.render_log_list(&mut columns[1]);
        });
    }

    fn render_log_form(&mut self, ui: &mut egui::Ui) {
        ui.strong("Log an incident");
        ui.add_space(4.0);

        ui.label("Student name");
        ui.add(
            egui::TextEdit::singleline(&mut self.log_form.student_name)
                .hint_text("e.g. Jamie")
                .desired_width(f32::INFINITY),
        );

        ui.add_space(4.0);
        ui.label("Behavior");
        egui::ComboBox::from_id_salt("tracker_category")
            .selected_text(self.selected_category.label())
            .show_ui(ui, |ui| {
                for category in BehaviorCategory::ALL {
                    ui.selectable_value(&mut self.selected_category, category, category.label());
                }
            });

        ui.add_space(4.0);
        ui.add(
            egui::Slider::new(&mut self.log_form.intensity, MIN_INTENSITY..=MAX_INTENSITY)
                .text("Intensity"),
        );

        ui.add_space(4.0);
        ui.label("Notes");
        ui.add(
            egui::TextEdit::multiline(&mut self.log_form.description)
                .hint_text("What happened?")
                .desired_rows(3)
                .desired_width(f32::INFINITY),
        );

        ui.add_space(6.0);
        let can_save = !self.log_form.student_name.trim().is_empty();
        if ui
            .add_enabled(can_save, egui::Button::new("Save Entry"))
            .clicked()
        {
            self.save_log_entry();
        }
    }

    fn render_log_list(&mut self, ui: &mut egui::Ui) {
        ui.strong("Recent logs");
        ui.add_space(4.0);
        if self.log_store.is_empty() {
            ui.weak("No incidents logged yet. Saved entries appear here, newest first.");
            return;
        }
        egui::ScrollArea::vertical()
            .id_salt("log_entries")
            .show(ui, |ui| {
                for entry in self.log_store.entries() {
                    egui::Frame::group(ui.style()).show(ui, |ui| {
                        ui.set_width(ui.available_width());
                        ui.horizontal(|ui| {
                            ui.strong(&entry.student_name);
                            ui.small(
                                egui::RichText::new(entry.category.label())
                                    .color(egui::Color32::LIGHT_BLUE),
                            );
                            ui.small(
                                egui::RichText::new(format!("intensity {}", entry.intensity))
                                    .color(intensity_color(entry.intensity)),
                            );
                            ui.with_layout(
                                egui::Layout::right_to_left(egui::Align::Center),
                                |ui| {
                                    ui.small(
                                        entry
                                            .logged_at
                                            .with_timezone(&Local)
                                            .format("%b %d, %H:%M")
                                            .to_string(),
                                    );
                                },
                            );
                        });
                        if !entry.description.trim().is_empty() {
                            ui.label(&entry.description);
                        }
                    });
                    ui.add_space(4.0);
                }
            });
    }
}

impl eframe::App for TutorAllyApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        egui::TopBottomPanel::top("tab_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.strong("TutorAlly");
                ui.separator();
                for tab in Tab::ALL {
                    ui.selectable_value(&mut self.active_tab, tab, tab.label());
                }
            });
        });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.small(&self.status);
        });

        egui::CentralPanel::default().show(ctx, |ui| match self.active_tab {
            Tab::Dashboard => self.render_dashboard(ui),
            Tab::Coach => self.render_coach(ui),
            Tab::Simulator => self.render_simulator(ui),
            Tab::Tracker => self.render_tracker(ui),
        });

        // Backend events arrive on a plain channel; poll for them even when
        // the user is idle.
        ctx.request_repaint_after(Duration::from_millis(150));
    }
}

fn chat_bubble(ui: &mut egui::Ui, text: &str, is_tutor: bool) {
    let fill = if is_tutor {
        egui::Color32::from_rgb(37, 99, 168)
    } else {
        egui::Color32::from_gray(58)
    };
    egui::Frame::new()
        .fill(fill)
        .corner_radius(8)
        .inner_margin(egui::Margin::symmetric(10, 6))
        .show(ui, |ui| {
            ui.set_max_width(ui.available_width() * 0.75);
            ui.label(egui::RichText::new(text).color(egui::Color32::WHITE));
        });
}

fn draw_category_chart(ui: &mut egui::Ui, log_store: &mut LogStore) {
    let counts = log_store.aggregate_by_category();
    let max = counts.values().copied().max().unwrap_or(0);
    let desired = egui::vec2(ui.available_width(), 180.0);
    let (response, painter) = ui.allocate_painter(desired, egui::Sense::hover());
    let rect = response.rect;

    if max == 0 {
        painter.text(
            rect.center(),
            egui::Align2::CENTER_CENTER,
            "No incidents logged yet",
            egui::FontId::proportional(14.0),
            ui.visuals().weak_text_color(),
        );
        return;
    }

    let slot = rect.width() / BehaviorCategory::ALL.len() as f32;
    let label_band = 16.0;
    for (i, category) in BehaviorCategory::ALL.iter().enumerate() {
        let count = counts.get(category).copied().unwrap_or(0);
        let height = (count as f32 / max as f32) * (rect.height() - label_band - 20.0);
        let x0 = rect.left() + i as f32 * slot + slot * 0.18;
        let x1 = rect.left() + (i + 1) as f32 * slot - slot * 0.18;
        let bar = egui::Rect::from_min_max(
            egui::pos2(x0, rect.bottom() - label_band - height),
            egui::pos2(x1, rect.bottom() - label_band),
        );
        painter.rect_filled(bar, 3.0, category_color(*category));
        painter.text(
            egui::pos2((x0 + x1) * 0.5, rect.bottom()),
            egui::Align2::CENTER_BOTTOM,
            category.label(),
            egui::FontId::proportional(10.0),
            ui.visuals().text_color(),
        );
        if count > 0 {
            painter.text(
                egui::pos2((x0 + x1) * 0.5, bar.top() - 2.0),
                egui::Align2::CENTER_BOTTOM,
                count.to_string(),
                egui::FontId::proportional(12.0),
                ui.visuals().text_color(),
            );
        }
    }
}

fn category_color(category: BehaviorCategory) -> egui::Color32 {
    match category {
        BehaviorCategory::Defiance => egui::Color32::from_rgb(220, 88, 88),
        BehaviorCategory::Disengagement => egui::Color32::from_rgb(120, 120, 190),
        BehaviorCategory::Distraction => egui::Color32::from_rgb(222, 170, 70),
        BehaviorCategory::Frustration => egui::Color32::from_rgb(214, 112, 58),
        BehaviorCategory::Impulsivity => egui::Color32::from_rgb(94, 168, 108),
    }
}

fn intensity_color(intensity: u8) -> egui::Color32 {
    match intensity {
        0..=2 => egui::Color32::from_rgb(94, 168, 108),
        3 => egui::Color32::from_rgb(222, 170, 70),
        _ => egui::Color32::from_rgb(220, 88, 88),
    }
}
