//! Fixtures shared by the tests of the workspace crates.

pub mod accounts;
pub mod orders;
pub mod protocol;
pub mod tokens;
