mod cli;
mod preview;

pub use crate::cli::{init_logging, run, run_with_args, Args};
pub use crate::preview::render_preview;
