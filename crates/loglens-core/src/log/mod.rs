mod reader;
mod types;

pub use reader::{LogLines, LogReader};
pub use types::*;
