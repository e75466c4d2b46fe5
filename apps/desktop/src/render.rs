//! Plain-text rendering of a flow snapshot.

use std::fmt::Write as _;

use client_core::FlowSnapshot;
use shared::domain::{FocusArea, Screen, PAYWALL_TIERS};

pub fn render_screen(snapshot: &FlowSnapshot) -> String {
    let mut out = String::new();
    match snapshot.screen {
        Screen::Splash => {
            out.push_str("RUVA\nFace • Physique • Styling\n");
        }
        Screen::Onboarding => {
            out.push_str("Choose your focus\n");
            for area in FocusArea::ALL {
                let _ = writeln!(out, "  - {} ({})", area.title(), area.as_str());
            }
        }
        Screen::Auth => {
            out.push_str("Welcome back\n");
            if let Some(focus) = snapshot.focus {
                let _ = writeln!(out, "Focus: {}", focus.title());
            }
        }
        Screen::Input => {
            out.push_str("Your baseline\n");
            if snapshot.session.is_established() {
                let who = snapshot.session.email.as_deref().unwrap_or("guest");
                let _ = writeln!(out, "Signed in as {who}");
            } else {
                out.push_str("Not signed in\n");
            }
        }
        Screen::Loading => {
            out.push_str("Running your plan...\n");
        }
        Screen::Summary => {
            out.push_str("Quick Summary\n");
            if let Some(plan) = &snapshot.result {
                for (title, text) in plan.summary_cards() {
                    let _ = writeln!(out, "\n[{title}]\n{text}");
                }
            }
        }
        Screen::Details => {
            if let Some(plan) = &snapshot.result {
                for section in plan.detail_sections() {
                    let _ = writeln!(out, "== {} ==", section.title);
                    for (label, value) in section.rows {
                        let _ = writeln!(out, "{label}: {}", indent_continuation(&value));
                    }
                    out.push('\n');
                }
            }
        }
        Screen::Paywall => {
            out.push_str("RUVA Premium\nUnlock advanced features and premium tone.\n");
            for tier in PAYWALL_TIERS {
                let _ = writeln!(out, "  {:<8} ${}", tier.label, tier.price_usd);
            }
        }
    }

    if let Some(error) = &snapshot.last_error {
        let _ = writeln!(out, "! {error}");
    }
    out
}

fn indent_continuation(value: &str) -> String {
    value.replace('\n', "\n    ")
}
