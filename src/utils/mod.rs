//! Utility modules

pub mod config;
pub mod evaluation;
pub mod io;
pub mod logging;

pub use config::Config;
pub use evaluation::{Evaluator, ModelSummary};
pub use io::{load_json, save_json, Checkpoint, ModelReport};
pub use logging::setup_logging;
