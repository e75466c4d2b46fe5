//! Worker thread that owns the flow controller and its async runtime.

pub mod commands;
pub mod runtime;
