//! CLI command implementations.

pub mod check;
pub mod colors;
pub mod run;
