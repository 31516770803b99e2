//! Declaration pass.
//!
//! The first traversal of the tree. It registers classes, functions, parameters
//! and locals into the scope tree and attaches the created symbols to their
//! declaration nodes, while detecting:
//!
//! - Classes declared twice in the same scope
//! - Functions redeclared with an identical parameter signature
//! - Repeated parameter names
//! - Locals declared twice anywhere in one method body

pub mod declarations;
