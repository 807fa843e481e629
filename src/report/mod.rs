//! Reporting utilities: formatted terminal output for runs and registries.
//!
//! Formatting lives here so the emulator code stays free of presentation
//! concerns and output changes are localized.

mod format;

pub use format::*;
