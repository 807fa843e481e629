//! Model store location, configuration and bootstrap.

pub mod store;

pub use store::*;
