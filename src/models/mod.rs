//! Emulator networks.
//!
//! The resolver/evaluator only need `modes`, `parameters` and a batch
//! prediction; everything about layer layout stays in `network`.

pub mod network;

pub use network::*;
