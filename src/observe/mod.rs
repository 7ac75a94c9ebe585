//! Mutation observation and scheduling.
//!
//! Turns the raw mutation stream into a low-frequency "content probably
//! changed" signal: [`MutationFilter`] drops records outside the adapter's
//! scope and [`Debouncer`] coalesces relevant batches into one trailing pass.

mod debouncer;
mod filter;

pub use debouncer::{Debouncer, IDLE};
pub use filter::MutationFilter;
