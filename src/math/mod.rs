//! Linear algebra helpers that ndarray does not provide itself.
//!
//! Matrices cross into nalgebra only for decompositions; everything the
//! rest of the crate sees stays an ndarray `Array2`/`Array1`.
pub mod svd;

pub use svd::truncated_svd;
