//! `mg-emu` library crate.
//!
//! Neural-network emulators for the nonlinear matter power-spectrum boost in
//! modified gravity and dark energy models.
//!
//! The binary (`mgemu`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the emulator facade (`emu::MgBoost`) is usable from other Rust code

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod emu;
pub mod error;
pub mod io;
pub mod logging;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
