use anyhow::{Context, Result};
use clap::Parser;
use client_core::{load_settings, AuthMode, BaselineForm, FlowEvent};
use shared::domain::Screen;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

mod render;

use render::render_screen;

/// Walks the onboarding flow end to end and prints every screen.
#[derive(Parser, Debug)]
struct Args {
    /// Overrides `ruva.toml` and BACKEND_URL.
    #[arg(long)]
    backend_url: Option<String>,
    #[arg(long, default_value = "lookmaxxing")]
    focus: String,
    #[arg(long, default_value = "")]
    email: String,
    /// Without a password the flow continues as guest.
    #[arg(long)]
    password: Option<String>,
    #[arg(long)]
    signup: bool,
    #[arg(long)]
    guest: bool,
    #[arg(long, default_value = "")]
    photo_url: String,
    #[arg(long, default_value = "")]
    height_cm: String,
    #[arg(long, default_value = "")]
    weight_kg: String,
    #[arg(long, default_value = "")]
    age: String,
    #[arg(long, default_value = "")]
    goals: String,
    #[arg(long, default_value = "")]
    style_vibe: String,
    /// Extra attempts when the workflow run fails with a retryable error.
    #[arg(long, default_value_t = 1)]
    workflow_retries: u32,
    /// Print the generated plan as JSON after the paywall.
    #[arg(long)]
    json: bool,
}

impl Args {
    fn baseline(&self) -> BaselineForm {
        BaselineForm {
            face_photo_url: self.photo_url.clone(),
            height_cm: self.height_cm.clone(),
            weight_kg: self.weight_kg.clone(),
            age: self.age.clone(),
            goals: self.goals.clone(),
            style_vibe: self.style_vibe.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(url) = &args.backend_url {
        settings.backend_url = url.clone();
    }
    let mut controller = client_core::connect(&settings)?;

    let mut events = controller.subscribe();
    println!("{}", render_screen(&controller.snapshot()));
    let renderer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(FlowEvent::ScreenChanged { snapshot, .. }) => {
                    println!("{}", render_screen(&snapshot));
                }
                Ok(FlowEvent::Failed { screen, message }) => {
                    eprintln!("[{screen}] {message}");
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "renderer fell behind controller events");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    controller.start_onboarding()?;
    controller.select_focus(&args.focus)?;

    match (&args.password, args.guest) {
        (Some(password), false) => {
            let mode = if args.signup {
                AuthMode::Signup
            } else {
                AuthMode::Login
            };
            controller
                .authenticate(&args.email, password, mode)
                .await
                .context("sign-in failed")?;
        }
        _ => controller
            .continue_as_guest(&args.email)
            .await
            .context("guest sign-in failed")?,
    }

    let mut outcome = controller.submit_baseline(&args.baseline()).await;
    let mut retries_left = args.workflow_retries;
    while let Err(err) = &outcome {
        if controller.screen() != Screen::Loading || !err.is_retryable() || retries_left == 0 {
            break;
        }
        retries_left -= 1;
        outcome = controller.retry_workflow().await;
    }
    outcome.context("plan generation failed")?;

    controller.show_details()?;
    controller.proceed_to_paywall()?;

    let plan = controller.snapshot().result;
    drop(controller);
    renderer.await.context("renderer task panicked")?;

    if args.json {
        if let Some(plan) = plan {
            println!("{}", serde_json::to_string_pretty(plan.as_ref())?);
        }
    }
    Ok(())
}
