//! Shared CLI argument types
//!
//! This module contains reusable argument structs that can be flattened
//! into commands using `#[command(flatten)]`.

mod filters;
mod global;

pub use filters::MetricFilterArgs;
pub use global::GlobalOptions;
