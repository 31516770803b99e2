//! Symbol table module.
//!
//! This module maps declared names onto symbols through a tree of nested
//! scopes:
//!
//! - Scope creation and switching between scopes
//! - Declaration with redeclaration detection and function overloading
//! - Lookup chains that walk from an inner scope to the compilation unit

pub mod symbol_table;
