//! Backend commands queued from UI to backend worker.

use client_core::{AuthMode, BaselineForm};
use shared::domain::FocusArea;

pub enum BackendCommand {
    StartOnboarding,
    SelectFocus(FocusArea),
    Authenticate {
        email: String,
        password: String,
        mode: AuthMode,
    },
    ContinueAsGuest {
        email: String,
    },
    SubmitBaseline(BaselineForm),
    RetryWorkflow,
    ShowDetails,
    ProceedToPaywall,
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::StartOnboarding => "start_onboarding",
            BackendCommand::SelectFocus(_) => "select_focus",
            BackendCommand::Authenticate { .. } => "authenticate",
            BackendCommand::ContinueAsGuest { .. } => "continue_as_guest",
            BackendCommand::SubmitBaseline(_) => "submit_baseline",
            BackendCommand::RetryWorkflow => "retry_workflow",
            BackendCommand::ShowDetails => "show_details",
            BackendCommand::ProceedToPaywall => "proceed_to_paywall",
        }
    }

    /// Whether the command reaches the remote backend.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            BackendCommand::Authenticate { .. }
                | BackendCommand::ContinueAsGuest { .. }
                | BackendCommand::SubmitBaseline(_)
                | BackendCommand::RetryWorkflow
        )
    }
}
