//! Fixed width integer arithmetic shared by the exchange crates.
//!
//! All amounts are 256-bit unsigned integers and every division rounds
//! towards zero.

pub mod math;
pub mod serialization;
pub mod u256_ext;

pub use math::{BASIS_POINTS, MathError};
