use std::sync::Arc;

use anyhow::Result;
use tracing::info;

pub mod backend;
pub mod baseline;
pub mod config;
pub mod controller;
pub mod error;
pub mod guest;

pub use backend::{Endpoint, FlowBackend, HttpBackend};
pub use baseline::BaselineForm;
pub use config::{load_settings, ClientSettings};
pub use controller::{AuthMode, FlowEvent, FlowSnapshot, ScreenFlowController};
pub use error::ClientError;

/// Controller wired to the HTTP backend described by `settings`.
pub fn connect(settings: &ClientSettings) -> Result<ScreenFlowController> {
    let backend = HttpBackend::from_settings(settings)?;
    info!(backend_url = %backend.base_url(), "using plan backend");
    Ok(ScreenFlowController::new(Arc::new(backend)))
}
