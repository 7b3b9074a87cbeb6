pub mod analysis;
pub mod config;
pub mod error;
pub mod locator;
pub mod log;
pub mod pipeline;
pub mod report;

pub use config::Config;
pub use error::{Error, Result};
pub use pipeline::{Pipeline, RunOutcome};
