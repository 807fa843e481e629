//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - model identity (`ModelFamily`, `SchemaVersion`, `Role`)
//! - caller input (`CosmoParams`, `CoordinateSet`)
//! - resolver/evaluator outputs (`ResolvedParameters`, `BoostResult`)

pub mod types;

pub use types::*;
