use super::*;

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use client_core::{BaselineForm, FlowBackend};
use crossbeam_channel::bounded;
use serde_json::json;
use shared::{
    domain::{Screen, UserId},
    protocol::{
        AuthResponse, CredentialsRequest, GuestRequest, InputRequest, PlanResult,
        WorkflowRunRequest,
    },
};
use tokio::sync::Notify;

/// Backend whose workflow run blocks until the test releases it.
#[derive(Default)]
struct GatedBackend {
    release_workflow: Notify,
}

#[async_trait]
impl FlowBackend for GatedBackend {
    async fn signup(&self, _request: &CredentialsRequest) -> Result<AuthResponse, ClientError> {
        Err(ClientError::MissingSession)
    }

    async fn login(&self, _request: &CredentialsRequest) -> Result<AuthResponse, ClientError> {
        Err(ClientError::MissingSession)
    }

    async fn guest(&self, request: &GuestRequest) -> Result<AuthResponse, ClientError> {
        Ok(AuthResponse {
            user_id: UserId::new("g1"),
            email: Some(request.email.clone()),
        })
    }

    async fn submit_input(&self, _request: &InputRequest) -> Result<(), ClientError> {
        Ok(())
    }

    async fn run_workflow(
        &self,
        _request: &WorkflowRunRequest,
    ) -> Result<PlanResult, ClientError> {
        self.release_workflow.notified().await;
        Ok(plan())
    }
}

fn plan() -> PlanResult {
    PlanResult::validate_json(json!({
        "summary": {
            "face_summary": "Oval",
            "physique_summary": "Lean",
            "style_summary": "Minimal",
            "outfit_summary": "Layers"
        },
        "face": {
            "face_shape": "oval",
            "strong_features": [],
            "weak_features": [],
            "grooming": [],
            "hairstyle": [],
            "accessories": []
        },
        "physique": {
            "body_type": "mesomorph",
            "workout_7_day": [],
            "posture_cues": [],
            "diet_notes": []
        },
        "styling": {
            "daily_outfits": [],
            "colours": [],
            "wardrobe_essentials": [],
            "hairstyle_synergy": []
        },
        "glow": { "week_by_week": [] }
    }))
    .expect("plan fixture")
}

/// Collects UI events until `done` matches one, failing after a few seconds.
async fn collect_until(
    ui_rx: &Receiver<UiEvent>,
    done: impl Fn(&UiEvent) -> bool,
) -> Vec<UiEvent> {
    let deadline = Instant::now() + Duration::from_secs(5);
    let mut seen = Vec::new();
    loop {
        match ui_rx.try_recv() {
            Ok(event) => {
                let finished = done(&event);
                seen.push(event);
                if finished {
                    return seen;
                }
            }
            Err(_) => {
                assert!(Instant::now() < deadline, "timed out; saw {seen:?}");
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        }
    }
}

fn is_snapshot_on(event: &UiEvent, screen: Screen) -> bool {
    matches!(event, UiEvent::Snapshot(snapshot) if snapshot.screen == screen)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn loading_screen_reaches_ui_while_workflow_is_in_flight() {
    let backend = Arc::new(GatedBackend::default());
    let mut controller = ScreenFlowController::new(backend.clone());
    controller.start_onboarding().expect("start");
    controller.select_focus("physique").expect("focus");
    controller
        .continue_as_guest("g1@ruva.app")
        .await
        .expect("guest");

    let (ui_tx, ui_rx) = bounded(64);
    let (report_tx, report_rx) = mpsc::unbounded_channel();
    let relay = spawn_event_relay(controller.subscribe(), report_rx, ui_tx);

    let worker = tokio::spawn(async move {
        execute(
            &mut controller,
            BackendCommand::SubmitBaseline(BaselineForm::default()),
            &report_tx,
        )
        .await;
        (controller, report_tx)
    });

    let before_release = collect_until(&ui_rx, |event| is_snapshot_on(event, Screen::Loading)).await;
    assert!(!before_release
        .iter()
        .any(|event| matches!(event, UiEvent::CommandFinished { .. })));
    assert!(!worker.is_finished());

    backend.release_workflow.notify_one();
    let (controller, report_tx) = worker.await.expect("worker task");
    assert_eq!(controller.screen(), Screen::Summary);

    let after_release = collect_until(&ui_rx, |event| {
        matches!(event, UiEvent::CommandFinished { command: "submit_baseline" })
    })
    .await;
    let summary_at = after_release
        .iter()
        .position(|event| is_snapshot_on(event, Screen::Summary))
        .expect("summary snapshot");
    assert!(summary_at < after_release.len() - 1);
    assert!(!after_release
        .iter()
        .any(|event| matches!(event, UiEvent::Error(_))));

    drop(report_tx);
    drop(controller);
    relay.await.expect("relay task");
}

#[tokio::test]
async fn failed_command_reports_error_before_finishing() {
    let backend = Arc::new(GatedBackend::default());
    let mut controller = ScreenFlowController::new(backend);

    let (ui_tx, ui_rx) = bounded(64);
    let (report_tx, report_rx) = mpsc::unbounded_channel();
    let relay = spawn_event_relay(controller.subscribe(), report_rx, ui_tx);

    execute(&mut controller, BackendCommand::ShowDetails, &report_tx).await;
    let events = collect_until(&ui_rx, |event| {
        matches!(event, UiEvent::CommandFinished { .. })
    })
    .await;

    assert_eq!(events.len(), 3);
    assert!(matches!(&events[0], UiEvent::Error(error) if error.message().contains("show details")));
    assert!(is_snapshot_on(&events[1], Screen::Splash));

    drop(report_tx);
    relay.await.expect("relay task");
}
