mod core;
mod errors;
mod type_config;

pub use core::*;

pub use errors::*;
pub use type_config::*;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub mod test_utils;
