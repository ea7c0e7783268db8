pub mod models;
pub mod orchestrator;
pub mod report;

pub use models::{production_builder, production_model};
pub use orchestrator::{Orchestrator, RunError, RunOutcome, RunRequest, run};
pub use report::{render_json, render_text};
