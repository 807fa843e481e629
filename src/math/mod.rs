//! Numerical helpers: linear interpolation and wavenumber grids.

pub mod grid;
pub mod interp;

pub use grid::*;
pub use interp::*;
