//! Input/output helpers.
//!
//! - result exports to CSV (`export`)
//! - result JSON read/write (`result`)

pub mod export;
pub mod result;

pub use export::*;
pub use result::*;
