//! CLI command implementations.

pub mod generate;
pub mod util;
