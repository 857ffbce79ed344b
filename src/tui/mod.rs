//! TUI module: Terminal User Interface using Ratatui.
//!
//! Screens:
//! - Dashboard with today's weather, UV and air quality
//! - Profile onboarding and editing
//! - Clothing recommendations
//! - Advice chat

mod app;
mod styles;
mod ui;
mod worker;

pub use app::App;
pub use styles::SunTheme;
pub use worker::{Worker, WorkerEvent, WorkerHandle};
