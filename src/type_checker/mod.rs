//! Type checking pass.
//!
//! The second traversal of the tree. It runs after the declaration pass and,
//! working from the scopes that pass built, it:
//!
//! - Resolves every name and records the symbol it refers to
//! - Picks the single overload that matches each call's argument types
//! - Records the evaluated type of every expression, using `error` for
//!   expressions that could not be typed
//! - Checks assignments, conditions and return values against their expected types
//!
//! An `error` operand never causes a second report: the first problem is the only
//! one the user sees.

pub mod type_checker;
