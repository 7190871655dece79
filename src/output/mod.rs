//! Output for CLI results
//!
//! stdout carries exactly one JSON document per run: a result or an error.
//! Diagnostics go to stderr through the logger.

pub mod json;

pub use json::ErrorOutput;

use serde::Serialize;

use crate::error::{Error, Result};

/// Print a successful result with metadata.
pub fn print<T: Serialize>(data: &T) -> Result<()> {
    println!("{}", json::format_json(data)?);
    Ok(())
}

/// Print the structured error payload.
///
/// Falls back to a hand-built document if serialization itself fails, so
/// stdout is never left empty.
pub fn print_error(err: &Error) {
    match serde_json::to_string_pretty(&ErrorOutput::from_error(err)) {
        Ok(json) => println!("{}", json),
        Err(_) => println!(
            r#"{{"error":{{"kind":"internal_error","message":"failed to render error"}}}}"#
        ),
    }
}
