// ABOUTME: Configuration constants for sysconf
// ABOUTME: Environment variable names and default file locations shared across packages

pub mod constants;

pub use constants::*;
