//! Backend-to-UI events and error modeling for the desktop GUI.

use client_core::FlowSnapshot;
use shared::domain::Screen;

#[derive(Debug)]
pub enum UiEvent {
    Info(String),
    Snapshot(FlowSnapshot),
    Error(UiError),
    CommandFinished { command: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Auth,
    Transport,
    Validation,
    Backend,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Auth,
    Baseline,
    Workflow,
    General,
}

impl UiErrorContext {
    pub fn for_screen(screen: Screen) -> Self {
        match screen {
            Screen::Auth => UiErrorContext::Auth,
            Screen::Input => UiErrorContext::Baseline,
            Screen::Loading => UiErrorContext::Workflow,
            _ => UiErrorContext::General,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("connection refused")
            || message_lower.contains("error sending request")
            || message_lower.contains("timed out")
            || message_lower.contains("dns")
            || message_lower.contains("request to")
        {
            UiErrorCategory::Transport
        } else if message_lower.contains("invalid response")
            || message_lower.contains("returned http 5")
        {
            UiErrorCategory::Backend
        } else if message_lower.contains("invalid")
            || message_lower.contains("unknown focus")
            || message_lower.contains("expected a")
        {
            UiErrorCategory::Validation
        } else if context == UiErrorContext::Auth {
            UiErrorCategory::Auth
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    /// Short guidance shown under the error message, if any.
    pub fn hint(&self) -> Option<&'static str> {
        match (self.category, self.context) {
            (UiErrorCategory::Transport, _) => {
                Some("Backend unreachable; check the backend URL and your network, then retry.")
            }
            (UiErrorCategory::Backend, UiErrorContext::Workflow) => {
                Some("Plan generation failed on the server; use Retry to run it again.")
            }
            (UiErrorCategory::Validation, UiErrorContext::Baseline) => {
                Some("Numeric fields accept plain numbers only, or leave them blank.")
            }
            (_, UiErrorContext::BackendStartup) => {
                Some("The background worker did not start; restart the app.")
            }
            _ => None,
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
