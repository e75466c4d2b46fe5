//! Screen-flow state machine.
//!
//! The controller is the only owner of navigation state. Renderers either
//! read [`ScreenFlowController::snapshot`] or subscribe to [`FlowEvent`]s.
//! Every operation takes `&mut self`, so a single controller can never have
//! two backend calls in flight.

use std::{str::FromStr, sync::Arc};

use shared::{
    domain::{FocusArea, Screen, Session, UserId},
    protocol::{CredentialsRequest, GuestRequest, PlanResult, WorkflowRunRequest},
};
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::{
    backend::FlowBackend,
    baseline::BaselineForm,
    error::{ClientError, GENERIC_AUTH_ERROR},
    guest::synthesize_guest_email,
};

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Signup,
}

impl FromStr for AuthMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "login" => Ok(AuthMode::Login),
            "signup" => Ok(AuthMode::Signup),
            other => Err(format!("unknown auth mode '{other}' (expected login or signup)")),
        }
    }
}

/// Owned copy of the controller state for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowSnapshot {
    pub screen: Screen,
    pub focus: Option<FocusArea>,
    pub session: Session,
    pub result: Option<Arc<PlanResult>>,
    pub last_error: Option<String>,
}

#[derive(Debug, Clone)]
pub enum FlowEvent {
    ScreenChanged {
        from: Screen,
        to: Screen,
        snapshot: FlowSnapshot,
    },
    FocusSelected(FocusArea),
    SessionEstablished(Session),
    PlanReady(Arc<PlanResult>),
    Failed {
        screen: Screen,
        message: String,
    },
}

pub struct ScreenFlowController {
    backend: Arc<dyn FlowBackend>,
    screen: Screen,
    focus: Option<FocusArea>,
    session: Session,
    result: Option<Arc<PlanResult>>,
    last_error: Option<String>,
    events: broadcast::Sender<FlowEvent>,
}

impl ScreenFlowController {
    pub fn new(backend: Arc<dyn FlowBackend>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            backend,
            screen: Screen::Splash,
            focus: None,
            session: Session::default(),
            result: None,
            last_error: None,
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FlowEvent> {
        self.events.subscribe()
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn focus(&self) -> Option<FocusArea> {
        self.focus
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn result(&self) -> Option<&PlanResult> {
        self.result.as_deref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn snapshot(&self) -> FlowSnapshot {
        FlowSnapshot {
            screen: self.screen,
            focus: self.focus,
            session: self.session.clone(),
            result: self.result.clone(),
            last_error: self.last_error.clone(),
        }
    }

    pub fn start_onboarding(&mut self) -> Result<(), ClientError> {
        self.expect_screen(Screen::Splash, "start onboarding")?;
        self.last_error = None;
        self.advance(Screen::Onboarding);
        Ok(())
    }

    pub fn select_focus(&mut self, area: &str) -> Result<(), ClientError> {
        self.expect_screen(Screen::Onboarding, "select a focus area")?;
        self.last_error = None;
        let area = match area.parse::<FocusArea>() {
            Ok(area) => area,
            Err(err) => return Err(self.fail(err.into())),
        };
        self.focus = Some(area);
        let _ = self.events.send(FlowEvent::FocusSelected(area));
        self.advance(Screen::Auth);
        Ok(())
    }

    pub async fn authenticate(
        &mut self,
        email: &str,
        password: &str,
        mode: AuthMode,
    ) -> Result<(), ClientError> {
        self.expect_screen(Screen::Auth, "authenticate")?;
        self.last_error = None;

        let request = CredentialsRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let outcome = match mode {
            AuthMode::Login => self.backend.login(&request).await,
            AuthMode::Signup => self.backend.signup(&request).await,
        };

        match outcome {
            Ok(response) => {
                self.establish_session(response.user_id, email.to_string());
                self.advance(Screen::Input);
                Ok(())
            }
            Err(ClientError::Status { detail, .. }) => Err(self.fail(ClientError::Auth {
                message: detail.unwrap_or_else(|| GENERIC_AUTH_ERROR.to_string()),
            })),
            Err(err @ ClientError::Transport { .. }) => Err(self.fail(ClientError::Auth {
                message: err.to_string(),
            })),
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Guest login. A blank `email` is replaced by a synthesized placeholder.
    pub async fn continue_as_guest(&mut self, email: &str) -> Result<(), ClientError> {
        self.expect_screen(Screen::Auth, "continue as guest")?;
        self.last_error = None;

        let email = if email.trim().is_empty() {
            synthesize_guest_email()
        } else {
            email.to_string()
        };

        let outcome = self.backend.guest(&GuestRequest { email: email.clone() }).await;
        match outcome {
            Ok(response) => {
                let email = response.email.unwrap_or(email);
                self.establish_session(response.user_id, email);
                self.advance(Screen::Input);
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "guest login failed");
                Err(self.fail(ClientError::GuestLogin))
            }
        }
    }

    /// Posts the baseline, then runs the workflow. On a workflow failure the
    /// controller stays on `Loading` and [`Self::retry_workflow`] may be used.
    pub async fn submit_baseline(&mut self, form: &BaselineForm) -> Result<(), ClientError> {
        self.expect_screen(Screen::Input, "submit the baseline")?;
        self.last_error = None;

        let user_id = self.current_user()?;
        let request = match form.coerce(user_id) {
            Ok(request) => request,
            Err(err) => return Err(self.fail(err)),
        };
        let submitted = self.backend.submit_input(&request).await;
        if let Err(err) = submitted {
            return Err(self.fail(err));
        }

        self.advance(Screen::Loading);
        self.run_workflow().await
    }

    pub async fn run_workflow(&mut self) -> Result<(), ClientError> {
        self.expect_screen(Screen::Loading, "run the workflow")?;
        self.last_error = None;

        let user_id = self.current_user()?;
        let outcome = self
            .backend
            .run_workflow(&WorkflowRunRequest { user_id })
            .await;
        match outcome {
            Ok(plan) => {
                let plan = Arc::new(plan);
                self.result = Some(plan.clone());
                let _ = self.events.send(FlowEvent::PlanReady(plan));
                self.advance(Screen::Summary);
                Ok(())
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    pub async fn retry_workflow(&mut self) -> Result<(), ClientError> {
        info!(previous_error = ?self.last_error, "retrying workflow run");
        self.run_workflow().await
    }

    pub fn show_details(&mut self) -> Result<(), ClientError> {
        self.expect_screen(Screen::Summary, "show details")?;
        self.advance(Screen::Details);
        Ok(())
    }

    pub fn proceed_to_paywall(&mut self) -> Result<(), ClientError> {
        self.expect_screen(Screen::Details, "continue to the paywall")?;
        self.advance(Screen::Paywall);
        Ok(())
    }

    fn expect_screen(&self, expected: Screen, action: &'static str) -> Result<(), ClientError> {
        if self.screen == expected {
            Ok(())
        } else {
            Err(ClientError::InvalidTransition {
                screen: self.screen,
                action,
            })
        }
    }

    fn current_user(&mut self) -> Result<UserId, ClientError> {
        match self.session.user_id.clone() {
            Some(user_id) => Ok(user_id),
            None => Err(self.fail(ClientError::MissingSession)),
        }
    }

    fn establish_session(&mut self, user_id: UserId, email: String) {
        self.session = Session {
            user_id: Some(user_id),
            email: Some(email),
        };
        if let Some(user_id) = &self.session.user_id {
            info!(%user_id, "session established");
        }
        let _ = self
            .events
            .send(FlowEvent::SessionEstablished(self.session.clone()));
    }

    fn advance(&mut self, to: Screen) {
        let from = self.screen;
        debug_assert_eq!(from.next(), Some(to), "screens only move forward by one");
        self.screen = to;
        info!(%from, %to, "screen transition");
        let _ = self.events.send(FlowEvent::ScreenChanged {
            from,
            to,
            snapshot: self.snapshot(),
        });
    }

    fn fail(&mut self, err: ClientError) -> ClientError {
        let message = err.to_string();
        warn!(screen = %self.screen, %message, "flow operation failed");
        self.last_error = Some(message.clone());
        let _ = self.events.send(FlowEvent::Failed {
            screen: self.screen,
            message,
        });
        err
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
