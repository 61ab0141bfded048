//! Subscriber Dashboard
//!
//! Native client for an email-subscriber backend: session handling, a typed
//! API client, client-side filtering/sorting/pagination, CSV/JSON import and
//! CSV export, rendered with egui.

pub mod actions;
pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod export;
pub mod import;
/// Application and session state
pub mod state;
/// egui rendering
pub mod ui;
pub mod view;

pub use app::DashboardApp;
pub use config::Config;
pub use error::{DashboardError, Result};
