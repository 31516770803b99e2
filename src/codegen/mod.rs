//! Code generation module.
//!
//! Writes the fully annotated tree as a textual stack-based assembly module for an
//! external assembler. It handles:
//!
//! - The module preamble and one `.class` block per class
//! - Field directives, method frames and a default constructor per class
//! - Method bodies, as a linear instruction sequence with labelled branches
//! - Translation of resolved types through the builtin assembly-type table

pub mod assembly_types;
pub mod codegen;
pub mod expr;
pub mod stmt;

#[cfg(test)]
mod tests;
