//! Dataset-specific normalization routines.
//!
//! Each submodule turns one raw upstream file into a typed DataFrame
//! ready for the Parquet cache.

pub mod bds;
pub mod shapes;
pub mod uic;

pub use bds::BdsGeo;
