use super::*;

use std::collections::HashMap;

use axum::{
    extract::State,
    http::{header, StatusCode, Uri},
    Router,
};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::Mutex};

use crate::{
    backend::{Endpoint, HttpBackend},
    error::GUEST_LOGIN_ERROR,
};

#[derive(Clone)]
struct StubReply {
    status: StatusCode,
    body: String,
}

#[derive(Clone, Default)]
struct StubState {
    // Replies are consumed in order; the last one keeps repeating.
    replies: Arc<Mutex<HashMap<String, Vec<StubReply>>>>,
    received: Arc<Mutex<Vec<(String, Value)>>>,
}

async fn handle_stub(
    State(state): State<StubState>,
    uri: Uri,
    body: String,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    let path = uri.path().to_string();
    let parsed = serde_json::from_str(&body).unwrap_or(Value::Null);
    state.received.lock().await.push((path.clone(), parsed));

    let mut replies = state.replies.lock().await;
    let reply = match replies.get_mut(&path) {
        Some(queue) if queue.len() > 1 => Some(queue.remove(0)),
        Some(queue) => queue.first().cloned(),
        None => None,
    };
    let reply = reply.unwrap_or(StubReply {
        status: StatusCode::NOT_FOUND,
        body: json!({ "detail": "no stub configured" }).to_string(),
    });
    (
        reply.status,
        [(header::CONTENT_TYPE, "application/json")],
        reply.body,
    )
}

struct StubBackend {
    base_url: String,
    state: StubState,
}

impl StubBackend {
    async fn spawn() -> Self {
        let state = StubState::default();
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        let app = Router::new()
            .fallback(handle_stub)
            .with_state(state.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    async fn reply(&self, path: &str, status: u16, body: Value) {
        self.reply_raw(path, status, &body.to_string()).await;
    }

    async fn reply_raw(&self, path: &str, status: u16, body: &str) {
        self.state
            .replies
            .lock()
            .await
            .entry(path.to_string())
            .or_default()
            .push(StubReply {
                status: StatusCode::from_u16(status).expect("status"),
                body: body.to_string(),
            });
    }

    async fn requests_to(&self, path: &str) -> Vec<Value> {
        self.state
            .received
            .lock()
            .await
            .iter()
            .filter(|(p, _)| p == path)
            .map(|(_, body)| body.clone())
            .collect()
    }

    fn controller(&self) -> ScreenFlowController {
        ScreenFlowController::new(Arc::new(HttpBackend::new(format!("{}/", self.base_url))))
    }
}

fn plan_json() -> Value {
    json!({
        "summary": {
            "face_summary": "Balanced oval face",
            "physique_summary": "Lean with room to add muscle",
            "style_summary": "Minimal, earthy palette",
            "outfit_summary": "Overshirt, white tee, tapered chinos"
        },
        "face": {
            "face_shape": "oval",
            "strong_features": ["jawline"],
            "weak_features": ["under-eye"],
            "grooming": ["SPF daily"],
            "hairstyle": ["textured crop"],
            "accessories": ["steel watch"]
        },
        "physique": {
            "body_type": "ectomorph",
            "workout_7_day": ["Mon: push"],
            "posture_cues": ["ribs down"],
            "diet_notes": ["+300 kcal"]
        },
        "styling": {
            "daily_outfits": ["tee + chinos"],
            "colours": ["olive"],
            "wardrobe_essentials": ["overshirt"],
            "hairstyle_synergy": ["matte paste"]
        },
        "glow": { "week_by_week": ["Weeks 1-4: foundations"] }
    })
}

async fn controller_on_auth(stub: &StubBackend) -> ScreenFlowController {
    let mut controller = stub.controller();
    controller.start_onboarding().expect("start");
    controller.select_focus("physique").expect("focus");
    controller
}

async fn controller_on_input(stub: &StubBackend) -> ScreenFlowController {
    stub.reply("/auth/guest", 200, json!({ "user_id": "g1", "email": "g1@x" }))
        .await;
    let mut controller = controller_on_auth(stub).await;
    controller.continue_as_guest("").await.expect("guest");
    controller
}

fn screen_changes(events: &mut broadcast::Receiver<FlowEvent>) -> Vec<Screen> {
    let mut visited = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let FlowEvent::ScreenChanged { from, to, snapshot } = event {
            if visited.is_empty() {
                visited.push(from);
            }
            assert_eq!(snapshot.screen, to);
            visited.push(to);
        }
    }
    visited
}

#[tokio::test]
async fn end_to_end_guest_flow_visits_every_screen_once_in_order() {
    let stub = StubBackend::spawn().await;
    stub.reply("/auth/guest", 200, json!({ "user_id": "g1", "email": "g1@x" }))
        .await;
    stub.reply("/input", 200, json!({ "ok": true })).await;
    stub.reply("/workflow/run", 200, plan_json()).await;

    let mut controller = stub.controller();
    let mut events = controller.subscribe();
    assert_eq!(controller.screen(), Screen::Splash);

    controller.start_onboarding().expect("start");
    controller.select_focus("styling").expect("focus");
    assert_eq!(controller.focus(), Some(FocusArea::Styling));

    controller.continue_as_guest("").await.expect("guest");
    assert_eq!(controller.session().user_id, Some(UserId::new("g1")));
    assert_eq!(controller.session().email.as_deref(), Some("g1@x"));

    controller
        .submit_baseline(&BaselineForm::default())
        .await
        .expect("baseline + workflow");
    assert_eq!(controller.screen(), Screen::Summary);
    let plan = controller.result().expect("plan stored");
    let cards = plan.summary_cards();
    assert_eq!(cards.len(), 4);
    assert!(cards.iter().all(|(_, text)| !text.is_empty()));

    controller.show_details().expect("details");
    controller.proceed_to_paywall().expect("paywall");
    assert_eq!(controller.screen(), Screen::Paywall);

    assert_eq!(screen_changes(&mut events), Screen::ORDER.to_vec());

    assert!(matches!(
        controller.proceed_to_paywall(),
        Err(ClientError::InvalidTransition {
            screen: Screen::Paywall,
            ..
        })
    ));
    assert!(controller.start_onboarding().is_err());
    assert!(controller.show_details().is_err());
    assert!(controller.run_workflow().await.is_err());
    assert_eq!(controller.screen(), Screen::Paywall);

    let workflow_requests = stub.requests_to("/workflow/run").await;
    assert_eq!(workflow_requests, vec![json!({ "user_id": "g1" })]);
}

#[tokio::test]
async fn login_rejection_surfaces_backend_detail_and_stays_on_auth() {
    let stub = StubBackend::spawn().await;
    stub.reply("/auth/login", 401, json!({ "detail": "bad credentials" }))
        .await;

    let mut controller = controller_on_auth(&stub).await;
    let mut events = controller.subscribe();
    let err = controller
        .authenticate("a@b.com", "pw", AuthMode::Login)
        .await
        .expect_err("login should fail");

    assert!(matches!(&err, ClientError::Auth { message } if message == "bad credentials"));
    assert_eq!(controller.screen(), Screen::Auth);
    assert_eq!(controller.last_error(), Some("bad credentials"));
    assert_eq!(controller.session(), &Session::default());
    match events.try_recv() {
        Ok(FlowEvent::Failed { screen, message }) => {
            assert_eq!(screen, Screen::Auth);
            assert_eq!(message, "bad credentials");
        }
        other => panic!("expected failure event, got {other:?}"),
    }
}

#[tokio::test]
async fn signup_success_establishes_session_with_submitted_email() {
    let stub = StubBackend::spawn().await;
    stub.reply("/auth/signup", 200, json!({ "user_id": "u1" })).await;

    let mut controller = controller_on_auth(&stub).await;
    controller
        .authenticate("a@b.com", "pw", AuthMode::Signup)
        .await
        .expect("signup");

    assert_eq!(controller.screen(), Screen::Input);
    assert_eq!(controller.session().user_id, Some(UserId::new("u1")));
    assert_eq!(controller.session().email.as_deref(), Some("a@b.com"));
    assert_eq!(
        stub.requests_to("/auth/signup").await,
        vec![json!({ "email": "a@b.com", "password": "pw" })]
    );
    assert!(stub.requests_to("/auth/login").await.is_empty());
}

#[tokio::test]
async fn auth_failure_without_detail_uses_generic_message_and_allows_retry() {
    let stub = StubBackend::spawn().await;
    stub.reply_raw("/auth/login", 500, "upstream exploded").await;
    stub.reply("/auth/login", 200, json!({ "user_id": 7 })).await;

    let mut controller = controller_on_auth(&stub).await;
    let err = controller
        .authenticate("a@b.com", "pw", AuthMode::Login)
        .await
        .expect_err("first attempt fails");
    assert_eq!(err.to_string(), GENERIC_AUTH_ERROR);
    assert_eq!(controller.screen(), Screen::Auth);

    controller
        .authenticate("a@b.com", "pw", AuthMode::Login)
        .await
        .expect("second attempt succeeds");
    assert_eq!(controller.session().user_id, Some(UserId::new("7")));
    assert_eq!(controller.last_error(), None);
    assert_eq!(stub.requests_to("/auth/login").await.len(), 2);
}

#[tokio::test]
async fn auth_transport_failure_is_recovered_inline() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let mut controller =
        ScreenFlowController::new(Arc::new(HttpBackend::new(format!("http://{addr}"))));
    controller.start_onboarding().expect("start");
    controller.select_focus("lookmaxxing").expect("focus");

    let err = controller
        .authenticate("a@b.com", "pw", AuthMode::Login)
        .await
        .expect_err("unreachable backend");
    assert!(matches!(err, ClientError::Auth { .. }));
    assert_eq!(controller.screen(), Screen::Auth);
    assert!(controller.last_error().is_some());
}

#[tokio::test]
async fn unknown_focus_area_is_rejected_without_transition() {
    let stub = StubBackend::spawn().await;
    let mut controller = stub.controller();
    controller.start_onboarding().expect("start");

    let err = controller
        .select_focus("cardio")
        .expect_err("unknown focus");
    assert!(matches!(err, ClientError::UnknownFocusArea(_)));
    assert_eq!(controller.screen(), Screen::Onboarding);
    assert_eq!(controller.focus(), None);

    for near_miss in ["STYLING", " physique ", "LookMaxxing"] {
        assert!(matches!(
            controller.select_focus(near_miss),
            Err(ClientError::UnknownFocusArea(_))
        ));
        assert_eq!(controller.screen(), Screen::Onboarding);
    }
    assert_eq!(controller.focus(), None);

    controller.select_focus("physique").expect("known focus");
    assert_eq!(controller.screen(), Screen::Auth);
    assert_eq!(controller.last_error(), None);
}

#[tokio::test]
async fn blank_guest_email_is_synthesized_uniquely_per_attempt() {
    let stub = StubBackend::spawn().await;
    stub.reply("/auth/guest", 503, json!({ "detail": "busy" })).await;
    stub.reply("/auth/guest", 200, json!({ "user_id": "g2" })).await;

    let mut controller = controller_on_auth(&stub).await;
    let err = controller
        .continue_as_guest("")
        .await
        .expect_err("first guest attempt fails");
    assert!(matches!(err, ClientError::GuestLogin));
    assert_eq!(controller.last_error(), Some(GUEST_LOGIN_ERROR));
    assert_eq!(controller.screen(), Screen::Auth);

    controller.continue_as_guest("   ").await.expect("guest");

    let emails: Vec<String> = stub
        .requests_to("/auth/guest")
        .await
        .iter()
        .map(|body| body["email"].as_str().expect("email").to_string())
        .collect();
    assert_eq!(emails.len(), 2);
    assert!(emails.iter().all(|email| !email.is_empty()));
    assert_ne!(emails[0], emails[1]);
    // The backend omitted the email, so the submitted one is kept.
    assert_eq!(controller.session().email.as_deref(), Some(emails[1].as_str()));
}

#[tokio::test]
async fn provided_guest_email_is_sent_verbatim() {
    let stub = StubBackend::spawn().await;
    stub.reply("/auth/guest", 200, json!({ "user_id": "g3", "email": "me@x.io" }))
        .await;

    let mut controller = controller_on_auth(&stub).await;
    controller.continue_as_guest(" me@x.io ").await.expect("guest");
    assert_eq!(
        stub.requests_to("/auth/guest").await,
        vec![json!({ "email": " me@x.io " })]
    );
    assert_eq!(controller.session().email.as_deref(), Some("me@x.io"));
}

#[tokio::test]
async fn blank_baseline_is_posted_with_explicit_nulls() {
    let stub = StubBackend::spawn().await;
    stub.reply("/input", 200, json!({})).await;
    stub.reply("/workflow/run", 200, plan_json()).await;

    let mut controller = controller_on_input(&stub).await;
    controller
        .submit_baseline(&BaselineForm::default())
        .await
        .expect("submit");

    let inputs = stub.requests_to("/input").await;
    assert_eq!(
        inputs,
        vec![json!({
            "user_id": "g1",
            "face_photo_url": null,
            "height_cm": null,
            "weight_kg": null,
            "age": null,
            "goals": null,
            "style_vibe": null
        })]
    );
}

#[tokio::test]
async fn invalid_baseline_number_keeps_user_on_input() {
    let stub = StubBackend::spawn().await;
    let mut controller = controller_on_input(&stub).await;

    let form = BaselineForm {
        weight_kg: "heavy".into(),
        ..Default::default()
    };
    let err = controller
        .submit_baseline(&form)
        .await
        .expect_err("invalid weight");
    assert!(matches!(err, ClientError::InvalidBaseline { field: "weight_kg", .. }));
    assert_eq!(controller.screen(), Screen::Input);
    assert!(stub.requests_to("/input").await.is_empty());
}

#[tokio::test]
async fn baseline_rejection_is_surfaced_and_workflow_is_not_started() {
    let stub = StubBackend::spawn().await;
    stub.reply("/input", 503, json!({ "detail": "storage offline" }))
        .await;

    let mut controller = controller_on_input(&stub).await;
    let err = controller
        .submit_baseline(&BaselineForm::default())
        .await
        .expect_err("input rejected");
    assert!(matches!(
        err,
        ClientError::Status {
            endpoint: Endpoint::Input,
            status: 503,
            ..
        }
    ));
    assert_eq!(controller.screen(), Screen::Input);
    assert!(controller
        .last_error()
        .expect("error recorded")
        .contains("storage offline"));
    assert!(stub.requests_to("/workflow/run").await.is_empty());
}

#[tokio::test]
async fn workflow_failure_stays_on_loading_until_retry_succeeds() {
    let stub = StubBackend::spawn().await;
    stub.reply("/input", 200, json!({})).await;
    stub.reply("/workflow/run", 502, json!({ "detail": "model timeout" }))
        .await;
    stub.reply("/workflow/run", 200, plan_json()).await;

    let mut controller = controller_on_input(&stub).await;
    let err = controller
        .submit_baseline(&BaselineForm::default())
        .await
        .expect_err("workflow fails first");
    assert!(err.is_retryable());
    assert_eq!(controller.screen(), Screen::Loading);
    assert!(controller.result().is_none());
    assert!(controller.last_error().is_some());

    controller.retry_workflow().await.expect("retry");
    assert_eq!(controller.screen(), Screen::Summary);
    assert_eq!(controller.last_error(), None);
    assert_eq!(stub.requests_to("/workflow/run").await.len(), 2);
    assert_eq!(stub.requests_to("/input").await.len(), 1);
}

#[tokio::test]
async fn malformed_plan_is_reported_as_invalid_response_shape() {
    let stub = StubBackend::spawn().await;
    stub.reply("/input", 200, json!({})).await;
    stub.reply(
        "/workflow/run",
        200,
        json!({ "summary": { "face_summary": "only this" } }),
    )
    .await;

    let mut controller = controller_on_input(&stub).await;
    let err = controller
        .submit_baseline(&BaselineForm::default())
        .await
        .expect_err("shape mismatch");
    assert!(matches!(
        err,
        ClientError::InvalidResponseShape {
            endpoint: Endpoint::WorkflowRun,
            ..
        }
    ));
    assert_eq!(controller.screen(), Screen::Loading);
    assert!(controller.result().is_none());
}

#[tokio::test]
async fn auth_success_without_user_id_is_an_invalid_response_shape() {
    let stub = StubBackend::spawn().await;
    stub.reply("/auth/login", 200, json!({ "token": "abc" })).await;

    let mut controller = controller_on_auth(&stub).await;
    let err = controller
        .authenticate("a@b.com", "pw", AuthMode::Login)
        .await
        .expect_err("missing user_id");
    assert!(matches!(err, ClientError::InvalidResponseShape { .. }));
    assert_eq!(controller.screen(), Screen::Auth);
}

#[tokio::test]
async fn out_of_order_operations_change_nothing() {
    let stub = StubBackend::spawn().await;
    let mut controller = stub.controller();
    let mut events = controller.subscribe();

    assert!(controller.select_focus("styling").is_err());
    assert!(controller.show_details().is_err());
    assert!(controller
        .authenticate("a@b.com", "pw", AuthMode::Login)
        .await
        .is_err());
    assert!(controller
        .submit_baseline(&BaselineForm::default())
        .await
        .is_err());

    assert_eq!(controller.snapshot().screen, Screen::Splash);
    assert_eq!(controller.last_error(), None);
    assert!(events.try_recv().is_err());
    assert!(stub.state.received.lock().await.is_empty());
}

#[test]
fn auth_mode_parses_login_and_signup_only() {
    assert_eq!("login".parse::<AuthMode>(), Ok(AuthMode::Login));
    assert_eq!(" SignUp ".parse::<AuthMode>(), Ok(AuthMode::Signup));
    assert!("register".parse::<AuthMode>().is_err());
}
