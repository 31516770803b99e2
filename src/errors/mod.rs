//! Error types and error handling for the compiler.
//!
//! This module defines the errors produced while analysing a compilation unit:
//!
//! - Recoverable semantic errors with source position information
//! - The diagnostics sink the passes accumulate those errors into
//! - Fatal internal errors for malformed trees
//! - Helpful error messages and suggestions

pub mod diagnostics;
pub mod errors;

#[cfg(test)]
mod tests;
