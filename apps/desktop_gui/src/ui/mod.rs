//! UI layer for desktop GUI: the app shell and per-screen views.

pub mod app;

pub use app::RuvaApp;
