//! TUI module: Terminal User Interface using Ratatui.
//!
//! Screens:
//! - Home with model status and helplines
//! - Student profile form
//! - Tabbed questionnaire
//! - Analysis progress and results

mod app;
mod styles;
mod ui;
mod worker;

pub use app::App;
pub use styles::CalmTheme;
pub use worker::{AnalysisProgress, AnalysisWorker, AnalysisWorkerHandle};
