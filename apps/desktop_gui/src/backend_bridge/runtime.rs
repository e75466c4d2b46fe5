//! Runtime bridge between UI command queue and the flow controller.
//!
//! Commands run on the worker thread while a relay task forwards controller
//! events to the UI as they happen, so intermediate screens (such as
//! `Loading` during a workflow run) are visible before the command returns.

use std::thread;

use client_core::{ClientError, ClientSettings, FlowEvent, FlowSnapshot, ScreenFlowController};
use crossbeam_channel::{Receiver, Sender};
use tokio::{
    sync::{broadcast, broadcast::error::RecvError, mpsc},
    task::JoinHandle,
};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

/// Outcome of one command, relayed after every event the command emitted.
pub(crate) struct CommandReport {
    command: &'static str,
    error: Option<UiError>,
    snapshot: FlowSnapshot,
}

pub fn launch(settings: ClientSettings, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    thread::spawn(move || {
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker starting...".to_string()));
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
            let mut controller = match client_core::connect(&settings) {
                Ok(controller) => controller,
                Err(err) => {
                    let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                        UiErrorContext::BackendStartup,
                        format!("backend worker startup failure: {err:#}"),
                    )));
                    tracing::error!("failed to build flow controller: {err:#}");
                    return;
                }
            };
            let _ = ui_tx.try_send(UiEvent::Snapshot(controller.snapshot()));
            let _ = ui_tx.try_send(UiEvent::Info(format!(
                "Backend worker ready ({})",
                settings.backend_url
            )));

            let (report_tx, report_rx) = mpsc::unbounded_channel();
            let event_task = spawn_event_relay(controller.subscribe(), report_rx, ui_tx);

            while let Ok(cmd) = cmd_rx.recv() {
                execute(&mut controller, cmd, &report_tx).await;
            }
            tracing::info!("ui command channel closed; backend worker exiting");
            drop(report_tx);
            drop(controller);
            let _ = event_task.await;
        });
    });
}

/// Runs one command and queues its report for the relay.
pub(crate) async fn execute(
    controller: &mut ScreenFlowController,
    cmd: BackendCommand,
    report_tx: &mpsc::UnboundedSender<CommandReport>,
) {
    let command = cmd.name();
    let error = match run_command(controller, cmd).await {
        Ok(()) => None,
        Err(err) => {
            let screen = controller.screen();
            tracing::warn!(command, %screen, "command failed: {err}");
            Some(UiError::from_message(
                UiErrorContext::for_screen(screen),
                err.to_string(),
            ))
        }
    };
    let _ = report_tx.send(CommandReport {
        command,
        error,
        snapshot: controller.snapshot(),
    });
}

async fn run_command(
    controller: &mut ScreenFlowController,
    cmd: BackendCommand,
) -> Result<(), ClientError> {
    match cmd {
        BackendCommand::StartOnboarding => controller.start_onboarding(),
        BackendCommand::SelectFocus(area) => controller.select_focus(area.as_str()),
        BackendCommand::Authenticate {
            email,
            password,
            mode,
        } => controller.authenticate(&email, &password, mode).await,
        BackendCommand::ContinueAsGuest { email } => controller.continue_as_guest(&email).await,
        BackendCommand::SubmitBaseline(form) => controller.submit_baseline(&form).await,
        BackendCommand::RetryWorkflow => controller.retry_workflow().await,
        BackendCommand::ShowDetails => controller.show_details(),
        BackendCommand::ProceedToPaywall => controller.proceed_to_paywall(),
    }
}

/// Forwards controller events to the UI as they are published. Pending
/// events always drain before a command report, so the UI never sees a
/// command finish ahead of the screens it passed through.
pub(crate) fn spawn_event_relay(
    mut events: broadcast::Receiver<FlowEvent>,
    mut reports: mpsc::UnboundedReceiver<CommandReport>,
    ui_tx: Sender<UiEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut events_open = true;
        loop {
            tokio::select! {
                biased;
                event = events.recv(), if events_open => match event {
                    Ok(event) => forward_flow_event(event, &ui_tx),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "ui bridge fell behind controller events");
                    }
                    Err(RecvError::Closed) => events_open = false,
                },
                report = reports.recv() => match report {
                    Some(report) => {
                        if let Some(error) = report.error {
                            let _ = ui_tx.try_send(UiEvent::Error(error));
                        }
                        let _ = ui_tx.try_send(UiEvent::Snapshot(report.snapshot));
                        let _ = ui_tx.try_send(UiEvent::CommandFinished {
                            command: report.command,
                        });
                    }
                    None => break,
                },
            }
        }
    })
}

/// Screen transitions become fresh snapshots. Failures reach the UI through
/// the command report, so `Failed` events are only logged here.
fn forward_flow_event(event: FlowEvent, ui_tx: &Sender<UiEvent>) {
    match event {
        FlowEvent::ScreenChanged { from, to, snapshot } => {
            tracing::debug!(%from, %to, "forwarding screen change");
            let _ = ui_tx.try_send(UiEvent::Snapshot(snapshot));
        }
        FlowEvent::SessionEstablished(session) => {
            if let Some(email) = session.email {
                let _ = ui_tx.try_send(UiEvent::Info(format!("Signed in as {email}")));
            }
        }
        FlowEvent::Failed { screen, message } => {
            tracing::debug!(%screen, "flow failure: {message}");
        }
        FlowEvent::FocusSelected(_) | FlowEvent::PlanReady(_) => {}
    }
}

#[cfg(test)]
#[path = "tests/runtime_tests.rs"]
mod tests;
