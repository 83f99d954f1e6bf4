//! The operator dashboard: fixed one-key telemetry widgets plus the dynamic
//! tuning pane driven by the binding engine.

use std::sync::Arc;

use chrono::{DateTime, Local};
use crossbeam_channel::{Receiver, Sender};
use serde::{Deserialize, Serialize};
use shared::{
    keys::{Namespace, PropertyName},
    value::{ControlKind, Value},
};
use table_client::{BindingEngine, RouteOutcome, TableWriter};

use crate::{
    backend_bridge::{commands::BackendCommand, writer::CommandWriter},
    config::Settings,
    controller::{events::UiEvent, orchestration::queue_command},
};

pub const SETTINGS_STORAGE_KEY: &str = "dashboard_settings";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
}

/// Readings backed by fixed one-key widget bindings. Everything else under
/// the namespace flows through the binding engine instead.
#[derive(Debug, Default)]
struct FixedTelemetry {
    match_time: Option<f64>,
    navx_connected: Option<bool>,
    navx_heading: Option<f64>,
    lift_position: Option<f64>,
    lift_stop: bool,
    robot_vel: Option<f64>,
    has_cube: bool,
    soft_limits: Option<bool>,
    starting_position: Option<i64>,
    selected_auto: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedDashboardSettings {
    pub tuning_open: bool,
}

impl Default for PersistedDashboardSettings {
    fn default() -> Self {
        Self { tuning_open: true }
    }
}

pub struct DashboardApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,

    settings: Settings,
    engine: BindingEngine,

    connection: ConnectionStatus,
    status: String,
    last_update_at: Option<DateTime<Local>>,

    telemetry: FixedTelemetry,
    auto_draft: String,

    tuning_open: bool,
    manual_name: String,
    manual_value: String,
    camera_fullscreen: bool,
}

impl DashboardApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        settings: Settings,
        persisted: Option<PersistedDashboardSettings>,
    ) -> Self {
        let persisted = persisted.unwrap_or_default();
        let namespace = Namespace::new(settings.namespace.clone());
        let writer: Arc<dyn TableWriter> = Arc::new(CommandWriter::new(cmd_tx.clone()));
        let engine = BindingEngine::new(namespace, writer);

        let mut app = Self {
            cmd_tx,
            ui_rx,
            settings,
            engine,
            connection: ConnectionStatus::Disconnected,
            status: "Starting".to_string(),
            last_update_at: None,
            telemetry: FixedTelemetry::default(),
            auto_draft: String::new(),
            tuning_open: persisted.tuning_open,
            manual_name: String::new(),
            manual_value: String::new(),
            camera_fullscreen: false,
        };
        app.request_connect();
        app
    }

    fn request_connect(&mut self) {
        self.connection = ConnectionStatus::Connecting;
        self.status = format!("Connecting to {}", self.settings.server_url);
        queue_command(
            &self.cmd_tx,
            BackendCommand::Connect {
                server_url: self.settings.server_url.clone(),
            },
            &mut self.status,
        );
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Connected => {
                    self.connection = ConnectionStatus::Connected;
                    self.status = format!("Connected to {}", self.settings.server_url);
                    self.publish_default_values();
                }
                UiEvent::Disconnected { reason } => {
                    self.connection = ConnectionStatus::Disconnected;
                    self.status = format!("Connection lost: {reason}");
                }
                UiEvent::ValueChanged { key, value, is_new } => {
                    self.last_update_at = Some(Local::now());
                    let value = value.coerce();
                    self.apply_fixed_binding(&key, &value);
                    if let RouteOutcome::Unbound(name) = self.engine.route(&key, value, is_new) {
                        self.status = format!("Update for unbound property '{name}' ignored");
                    }
                }
                UiEvent::ManualValue { key, value } => match value {
                    Some(value) => {
                        self.manual_value = value.display_string();
                        self.status = format!("Read {key}");
                    }
                    None => {
                        self.status = format!("No cached value for {key}");
                    }
                },
                UiEvent::Error(message) => {
                    self.status = message;
                }
            }
        }
    }

    /// Fixed one-key widget bindings, matched by property name.
    fn apply_fixed_binding(&mut self, key: &str, value: &Value) {
        let Some(name) = self.engine.namespace().strip(key) else {
            return;
        };
        match name.as_str() {
            "time" => self.telemetry.match_time = value.as_number(),
            "navx_connected" => self.telemetry.navx_connected = value.as_bool(),
            "navx_heading" => self.telemetry.navx_heading = value.as_number(),
            "lift_position" => self.telemetry.lift_position = value.as_number(),
            "lift_stop" => self.telemetry.lift_stop = value.as_bool().unwrap_or(false),
            "robot_vel" => self.telemetry.robot_vel = value.as_number(),
            "has_cube" => self.telemetry.has_cube = value.as_bool().unwrap_or(false),
            "soft_limits" => self.telemetry.soft_limits = value.as_bool(),
            "starting_position" => {
                self.telemetry.starting_position = value.as_number().map(|n| n as i64)
            }
            "selected_auto" => self.telemetry.selected_auto = value.display_string(),
            _ => {}
        }
    }

    /// Published once per connection so robot-side code always finds its
    /// tuning keys populated.
    fn publish_default_values(&mut self) {
        for (name, value) in default_entries() {
            let key = self.engine.namespace().qualify(&PropertyName::from(name));
            queue_command(
                &self.cmd_tx,
                BackendCommand::Put { key, value },
                &mut self.status,
            );
        }
    }

    fn put_fixed(&mut self, name: &str, value: Value) {
        let key = self.engine.namespace().qualify(&PropertyName::from(name));
        queue_command(
            &self.cmd_tx,
            BackendCommand::Put { key, value },
            &mut self.status,
        );
    }

    fn connection_badge(&self) -> (&'static str, egui::Color32) {
        match self.connection {
            ConnectionStatus::Connecting => ("CONNECTING", egui::Color32::YELLOW),
            ConnectionStatus::Connected => ("ROBOT CONNECTED", egui::Color32::GREEN),
            ConnectionStatus::Disconnected => ("DISCONNECTED", egui::Color32::RED),
        }
    }

    fn show_header(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("Robot Dashboard");
            ui.separator();
            let (label, color) = self.connection_badge();
            ui.colored_label(color, label);
            ui.separator();
            let time_text = self
                .telemetry
                .match_time
                .map(format_match_time)
                .unwrap_or_else(|| "-:--".to_string());
            ui.label(egui::RichText::new(time_text).strong().size(22.0));

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let camera_label = if self.camera_fullscreen {
                    "Exit fullscreen"
                } else {
                    "Fullscreen camera"
                };
                if ui.button(camera_label).clicked() {
                    self.camera_fullscreen = !self.camera_fullscreen;
                }
                ui.toggle_value(&mut self.tuning_open, "Tuning");
                if self.connection == ConnectionStatus::Disconnected
                    && ui.button("Connect").clicked()
                {
                    self.request_connect();
                }
            });
        });
    }

    fn show_camera(&mut self, ui: &mut egui::Ui) {
        let response = ui.interact(
            ui.max_rect(),
            egui::Id::new("camera_surface"),
            egui::Sense::click(),
        );
        ui.centered_and_justified(|ui| {
            ui.label(egui::RichText::new("Camera stream").weak());
        });
        if response.clicked() {
            self.camera_fullscreen = !self.camera_fullscreen;
        }
    }

    fn show_main_panel(&mut self, ui: &mut egui::Ui) {
        ui.add_space(4.0);
        egui::Grid::new("telemetry_grid")
            .num_columns(2)
            .spacing([24.0, 8.0])
            .show(ui, |ui| {
                ui.label("NavX");
                match self.telemetry.navx_connected {
                    Some(true) => ui.colored_label(egui::Color32::GREEN, "CONNECTED"),
                    Some(false) => ui.colored_label(egui::Color32::RED, "DISCONNECTED"),
                    None => ui.label("n/a"),
                };
                ui.end_row();

                ui.label("Heading");
                ui.label(
                    self.telemetry
                        .navx_heading
                        .map(format_heading)
                        .unwrap_or_else(|| "n/a".to_string()),
                );
                ui.end_row();

                ui.label("Lift position");
                let lift_text = self
                    .telemetry
                    .lift_position
                    .map(format_percent)
                    .unwrap_or_else(|| "n/a".to_string());
                if self.telemetry.lift_stop {
                    ui.colored_label(egui::Color32::RED, lift_text);
                } else {
                    ui.label(lift_text);
                }
                ui.end_row();

                ui.label("Robot speed");
                ui.label(
                    self.telemetry
                        .robot_vel
                        .map(|vel| format!("{:.2} ft/s", feet_per_second(vel)))
                        .unwrap_or_else(|| "n/a".to_string()),
                );
                ui.end_row();

                ui.label("Cube");
                if self.telemetry.has_cube {
                    ui.colored_label(egui::Color32::GREEN, "Yes");
                } else {
                    ui.colored_label(egui::Color32::GRAY, "No");
                }
                ui.end_row();

                ui.label("Soft limits");
                let soft_limits = self.telemetry.soft_limits.unwrap_or(false);
                let (text, color) = if soft_limits {
                    ("ENABLED", egui::Color32::GREEN)
                } else {
                    ("DISABLED", egui::Color32::YELLOW)
                };
                if ui
                    .button(egui::RichText::new(text).color(color))
                    .clicked()
                {
                    self.put_fixed("soft_limits", Value::Bool(!soft_limits));
                }
                ui.end_row();
            });

        ui.add_space(8.0);
        ui.separator();
        ui.label(egui::RichText::new("Autonomous").strong());

        ui.horizontal(|ui| {
            ui.label("Starting position:");
            for (label, pos) in [("Left", -1), ("Center", 0), ("Right", 1)] {
                let selected = self.telemetry.starting_position == Some(pos);
                if ui.selectable_label(selected, label).clicked() {
                    self.put_fixed("starting_position", Value::Number(pos as f64));
                }
            }
        });

        ui.horizontal(|ui| {
            ui.label("Selected mode:");
            if self.telemetry.selected_auto.is_empty() {
                ui.weak("none");
            } else {
                ui.monospace(self.telemetry.selected_auto.as_str());
            }
        });
        ui.horizontal(|ui| {
            ui.add(
                egui::TextEdit::singleline(&mut self.auto_draft)
                    .hint_text("autonomous mode name")
                    .desired_width(220.0),
            );
            if ui.button("Select").clicked() {
                self.put_fixed("selected_auto", Value::Text(self.auto_draft.clone()));
            }
        });

        ui.add_space(8.0);
        ui.separator();
        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.set_min_height(160.0);
            self.show_camera(ui);
        });
    }

    fn show_tuning_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Tuning");
        ui.small(format!(
            "Every value under {} gets an editable control here.",
            self.engine.namespace().prefix()
        ));
        ui.separator();

        ui.horizontal(|ui| {
            ui.label("Name");
            ui.add(egui::TextEdit::singleline(&mut self.manual_name).desired_width(130.0));
            ui.label("Value");
            ui.add(egui::TextEdit::singleline(&mut self.manual_value).desired_width(100.0));
        });
        ui.horizontal(|ui| {
            let has_name = !self.manual_name.trim().is_empty();
            if ui
                .add_enabled(
                    has_name && !self.manual_value.is_empty(),
                    egui::Button::new("Set"),
                )
                .clicked()
            {
                let name = PropertyName::from(self.manual_name.trim());
                let key = self.engine.namespace().qualify(&name);
                queue_command(
                    &self.cmd_tx,
                    BackendCommand::Put {
                        key,
                        value: Value::Text(self.manual_value.clone()),
                    },
                    &mut self.status,
                );
            }
            if ui.add_enabled(has_name, egui::Button::new("Get")).clicked() {
                let name = PropertyName::from(self.manual_name.trim());
                let key = self.engine.namespace().qualify(&name);
                queue_command(&self.cmd_tx, BackendCommand::Get { key }, &mut self.status);
            }
        });
        ui.separator();

        let mut edits: Vec<PropertyName> = Vec::new();
        egui::ScrollArea::vertical().show(ui, |ui| {
            if self.engine.registry().is_empty() {
                ui.weak("No tunable values published yet.");
            }
            for control in self.engine.registry_mut().iter_mut() {
                ui.horizontal(|ui| {
                    ui.label(control.name().as_str());
                    match control.kind() {
                        ControlKind::Boolean => {
                            if ui.checkbox(control.checked_mut(), "").changed() {
                                edits.push(control.name().clone());
                            }
                        }
                        ControlKind::Number | ControlKind::Text => {
                            let response = ui.add(
                                egui::TextEdit::singleline(control.text_mut())
                                    .desired_width(130.0),
                            );
                            if response.changed() {
                                control.mark_dirty();
                            }
                            // DOM-onchange semantics: commit on focus loss
                            // (Enter included) when the buffer was touched.
                            if response.lost_focus() && control.is_dirty() {
                                edits.push(control.name().clone());
                            }
                        }
                    }
                });
            }
        });

        for name in edits {
            if self.engine.apply_edit(&name) {
                self.status = format!("Published {name}");
            } else {
                self.status = format!("Could not publish '{name}': value does not parse");
            }
        }
    }

    fn show_status_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.small("Status:");
            ui.small(egui::RichText::new(&self.status).weak());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if let Some(at) = self.last_update_at {
                    ui.small(format!("last update {}", at.format("%H:%M:%S")));
                }
                ui.small(format!("{} bound controls", self.engine.registry().len()));
            });
        });
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        egui::TopBottomPanel::top("header").show(ctx, |ui| self.show_header(ui));
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| self.show_status_bar(ui));

        if self.camera_fullscreen {
            egui::CentralPanel::default().show(ctx, |ui| self.show_camera(ui));
        } else {
            if self.tuning_open {
                egui::SidePanel::right("tuning_panel")
                    .resizable(true)
                    .default_width(340.0)
                    .show(ctx, |ui| self.show_tuning_panel(ui));
            }
            egui::CentralPanel::default().show(ctx, |ui| self.show_main_panel(ui));
        }

        // Remote updates arrive between frames; keep draining them.
        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let persisted = PersistedDashboardSettings {
            tuning_open: self.tuning_open,
        };
        if let Ok(text) = serde_json::to_string(&persisted) {
            storage.set_string(SETTINGS_STORAGE_KEY, text);
        }
    }
}

/// Renders remaining match time as `M:SS`; negative readings clamp to 0:00.
fn format_match_time(seconds: f64) -> String {
    if seconds < 0.0 {
        return "0:00".to_string();
    }
    let total = seconds as i64;
    format!("{}:{:02}", total / 60, total % 60)
}

fn format_heading(heading: f64) -> String {
    format!("{heading:.2}\u{b0}")
}

fn format_percent(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

/// Drivetrain encoder reading (rev/s) to feet per second on 12" travel per
/// revolution.
fn feet_per_second(robot_vel: f64) -> f64 {
    robot_vel * 60.0 / 12.0
}

/// Values published once per connection so robot-side code always finds its
/// tuning keys populated.
fn default_entries() -> Vec<(&'static str, Value)> {
    vec![
        ("starting_position", Value::Number(0.0)),
        ("soft_limits", Value::Bool(true)),
        ("selected_auto", Value::Text(String::new())),
        ("time", Value::Text("0".to_string())),
    ]
}
