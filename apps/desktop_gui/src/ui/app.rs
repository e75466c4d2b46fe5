//! Main egui application shell: one central card per flow screen.

use std::time::Duration;

use client_core::{AuthMode, BaselineForm, FlowSnapshot};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::domain::{FocusArea, Screen, Session, PAYWALL_TIERS};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiEvent};
use crate::controller::orchestration::dispatch_backend_command;

const CARD_MIN_WIDTH: f32 = 420.0;
const CARD_MAX_WIDTH: f32 = 620.0;

struct AuthFormState {
    email: String,
    password: String,
    mode: AuthMode,
}

impl Default for AuthFormState {
    fn default() -> Self {
        Self {
            email: String::new(),
            password: String::new(),
            mode: AuthMode::Login,
        }
    }
}

pub struct RuvaApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    snapshot: FlowSnapshot,
    busy: bool,
    status: String,
    status_banner: Option<UiError>,
    auth_form: AuthFormState,
    baseline: BaselineForm,
    selected_tier: usize,
}

impl RuvaApp {
    pub fn new(cmd_tx: Sender<BackendCommand>, ui_rx: Receiver<UiEvent>) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            snapshot: FlowSnapshot {
                screen: Screen::Splash,
                focus: None,
                session: Session::default(),
                result: None,
                last_error: None,
            },
            busy: false,
            status: String::new(),
            status_banner: None,
            auth_form: AuthFormState::default(),
            baseline: BaselineForm::default(),
            selected_tier: 1,
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => self.status = message,
                UiEvent::Snapshot(snapshot) => {
                    if snapshot.screen != self.snapshot.screen {
                        self.status_banner = None;
                    }
                    self.snapshot = snapshot;
                }
                UiEvent::Error(error) => {
                    tracing::debug!(
                        category = ?error.category(),
                        context = ?error.context(),
                        "ui error: {}",
                        error.message()
                    );
                    self.status_banner = Some(error);
                }
                UiEvent::CommandFinished { command } => {
                    tracing::trace!(command, "backend command finished");
                    self.busy = false;
                }
            }
        }
    }

    /// Commands are serialized: a new one is only queued once the previous
    /// one reported back.
    fn send(&mut self, cmd: BackendCommand) {
        if self.busy {
            return;
        }
        if cmd.is_remote() {
            self.status_banner = None;
        }
        self.busy = dispatch_backend_command(&self.cmd_tx, cmd, &mut self.status);
    }

    fn show_status_banner(&mut self, ui: &mut egui::Ui) {
        let Some(banner) = self.status_banner.clone() else {
            return;
        };
        egui::Frame::NONE
            .fill(egui::Color32::from_rgb(111, 53, 53))
            .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(175, 96, 96)))
            .corner_radius(8.0)
            .inner_margin(egui::Margin::symmetric(10, 8))
            .show(ui, |ui| {
                ui.horizontal_wrapped(|ui| {
                    ui.label(egui::RichText::new(banner.message()).color(egui::Color32::WHITE));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("Dismiss").clicked() {
                            self.status_banner = None;
                        }
                    });
                });
                if let Some(hint) = banner.hint() {
                    ui.label(
                        egui::RichText::new(hint)
                            .small()
                            .color(egui::Color32::from_rgb(235, 210, 210)),
                    );
                }
            });
        ui.add_space(6.0);
    }

    fn primary_button(&self, ui: &mut egui::Ui, label: &str) -> bool {
        let button = egui::Button::new(egui::RichText::new(label).strong())
            .min_size(egui::vec2(ui.available_width(), 34.0));
        ui.add_enabled(!self.busy, button).clicked()
    }

    fn show_splash(&mut self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.heading(egui::RichText::new("RUVA").size(40.0).strong());
            ui.weak("Face • Physique • Styling");
        });
        ui.add_space(18.0);
        if self.primary_button(ui, "Get started") {
            self.send(BackendCommand::StartOnboarding);
        }
    }

    fn show_onboarding(&mut self, ui: &mut egui::Ui) {
        ui.heading("Choose your focus");
        ui.weak("You can explore every area later.");
        ui.add_space(8.0);
        for area in FocusArea::ALL {
            if self.primary_button(ui, area.title()) {
                self.send(BackendCommand::SelectFocus(area));
            }
        }
    }

    fn show_auth(&mut self, ui: &mut egui::Ui) {
        ui.heading("Welcome back");
        if let Some(focus) = self.snapshot.focus {
            ui.weak(format!("Focus: {}", focus.title()));
        }
        ui.add_space(6.0);

        ui.horizontal(|ui| {
            ui.selectable_value(&mut self.auth_form.mode, AuthMode::Login, "Log in");
            ui.selectable_value(&mut self.auth_form.mode, AuthMode::Signup, "Sign up");
        });
        ui.add(
            egui::TextEdit::singleline(&mut self.auth_form.email)
                .hint_text("Email")
                .desired_width(f32::INFINITY),
        );
        ui.add(
            egui::TextEdit::singleline(&mut self.auth_form.password)
                .hint_text("Password")
                .password(true)
                .desired_width(f32::INFINITY),
        );

        let submit_label = match self.auth_form.mode {
            AuthMode::Login => "Log in",
            AuthMode::Signup => "Create account",
        };
        if self.primary_button(ui, submit_label) {
            self.send(BackendCommand::Authenticate {
                email: self.auth_form.email.clone(),
                password: self.auth_form.password.clone(),
                mode: self.auth_form.mode,
            });
        }
        if ui
            .add_enabled(!self.busy, egui::Button::new("Continue as guest"))
            .clicked()
        {
            self.send(BackendCommand::ContinueAsGuest {
                email: self.auth_form.email.clone(),
            });
        }
    }

    fn show_input(&mut self, ui: &mut egui::Ui) {
        ui.heading("Your baseline");
        if let Some(email) = &self.snapshot.session.email {
            ui.weak(format!("Signed in as {email}"));
        }
        ui.add_space(6.0);

        egui::Grid::new("baseline_form")
            .num_columns(2)
            .spacing([12.0, 8.0])
            .show(ui, |ui| {
                let form = &mut self.baseline;
                let fields: [(&str, &mut String); 6] = [
                    ("Face photo URL", &mut form.face_photo_url),
                    ("Height (cm)", &mut form.height_cm),
                    ("Weight (kg)", &mut form.weight_kg),
                    ("Age", &mut form.age),
                    ("Goals", &mut form.goals),
                    ("Style vibe", &mut form.style_vibe),
                ];
                for (label, value) in fields {
                    ui.label(label);
                    ui.add(egui::TextEdit::singleline(value).desired_width(f32::INFINITY));
                    ui.end_row();
                }
            });

        ui.add_space(8.0);
        if self.primary_button(ui, "Generate plan") {
            self.send(BackendCommand::SubmitBaseline(self.baseline.clone()));
        }
    }

    fn show_loading(&mut self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.heading("Running your plan...");
            if self.snapshot.last_error.is_none() || self.busy {
                ui.add_space(12.0);
                ui.spinner();
            }
        });
        if self.snapshot.last_error.is_some() {
            ui.add_space(12.0);
            if self.primary_button(ui, "Retry") {
                self.send(BackendCommand::RetryWorkflow);
            }
        }
    }

    fn show_summary(&mut self, ui: &mut egui::Ui) {
        ui.heading("Quick Summary");
        if let Some(plan) = self.snapshot.result.clone() {
            for (title, text) in plan.summary_cards() {
                egui::Frame::NONE
                    .fill(ui.visuals().faint_bg_color)
                    .corner_radius(10.0)
                    .inner_margin(egui::Margin::symmetric(12, 10))
                    .show(ui, |ui| {
                        ui.set_width(ui.available_width());
                        ui.label(egui::RichText::new(title).strong());
                        ui.label(text);
                    });
            }
        }
        ui.add_space(8.0);
        if self.primary_button(ui, "View full plan") {
            self.send(BackendCommand::ShowDetails);
        }
    }

    fn show_details(&mut self, ui: &mut egui::Ui) {
        if let Some(plan) = self.snapshot.result.clone() {
            egui::ScrollArea::vertical()
                .max_height((ui.available_height() - 48.0).max(120.0))
                .show(ui, |ui| {
                    for section in plan.detail_sections() {
                        egui::CollapsingHeader::new(section.title)
                            .default_open(true)
                            .show(ui, |ui| {
                                for (label, value) in section.rows {
                                    ui.label(egui::RichText::new(label).strong());
                                    ui.label(value);
                                    ui.add_space(4.0);
                                }
                            });
                    }
                });
        }
        ui.add_space(8.0);
        if self.primary_button(ui, "Continue") {
            self.send(BackendCommand::ProceedToPaywall);
        }
    }

    fn show_paywall(&mut self, ui: &mut egui::Ui) {
        ui.heading("RUVA Premium");
        ui.weak("Unlock advanced features and premium tone.");
        ui.add_space(8.0);
        for (index, tier) in PAYWALL_TIERS.iter().enumerate() {
            ui.selectable_value(
                &mut self.selected_tier,
                index,
                format!("{:<8} ${}", tier.label, tier.price_usd),
            );
        }
        ui.add_space(8.0);
        if self.primary_button(ui, "Subscribe") {
            if let Some(tier) = PAYWALL_TIERS.get(self.selected_tier) {
                self.status = format!("{} plan selected; purchases are not available yet", tier.label);
            }
        }
    }
}

impl eframe::App for RuvaApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.weak(self.snapshot.screen.as_str());
                ui.separator();
                ui.weak(self.status.as_str());
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let avail = ui.available_size();
            let card_width = avail.x.clamp(CARD_MIN_WIDTH, CARD_MAX_WIDTH);
            ui.add_space((avail.y * 0.08).clamp(12.0, 60.0));

            ui.vertical_centered(|ui| {
                ui.set_width(card_width);
                egui::Frame::NONE
                    .fill(ui.visuals().extreme_bg_color)
                    .corner_radius(14.0)
                    .stroke(egui::Stroke::new(
                        1.0,
                        ui.visuals().widgets.noninteractive.bg_stroke.color,
                    ))
                    .inner_margin(egui::Margin::symmetric(20, 18))
                    .show(ui, |ui| {
                        ui.style_mut().spacing.item_spacing = egui::vec2(10.0, 10.0);
                        self.show_status_banner(ui);
                        match self.snapshot.screen {
                            Screen::Splash => self.show_splash(ui),
                            Screen::Onboarding => self.show_onboarding(ui),
                            Screen::Auth => self.show_auth(ui),
                            Screen::Input => self.show_input(ui),
                            Screen::Loading => self.show_loading(ui),
                            Screen::Summary => self.show_summary(ui),
                            Screen::Details => self.show_details(ui),
                            Screen::Paywall => self.show_paywall(ui),
                        }
                    });
            });
        });

        let repaint_after = if self.busy {
            Duration::from_millis(50)
        } else {
            Duration::from_millis(250)
        };
        ctx.request_repaint_after(repaint_after);
    }
}
