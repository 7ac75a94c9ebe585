//! Command-line interface module.

mod args;
pub mod check;
pub mod common;
pub mod outline;
pub mod platforms;
pub mod watch;

pub use args::{Cli, Commands, OutputFormat, PageArgs};
