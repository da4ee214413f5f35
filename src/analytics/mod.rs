//! Parse event analytics.
//!
//! - [`logger`] appends one JSONL entry per parse or form submission.
//! - [`reporter`] aggregates the log for `fuelform stats`.

pub mod logger;
pub mod reporter;
