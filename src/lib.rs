pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::HttpEvaluationBackend;
pub use config::{cli::LocalStorage, AppConfig};
pub use core::{
    orchestrator::{EvaluationOrchestrator, TriggerOutcome},
    session::{SessionState, SessionStore},
    upload::UploadHandler,
};
pub use utils::error::{PriEvalError, Result};
