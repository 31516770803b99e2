/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the AST structure
///
/// Submodules:
/// - ast: The compilation unit and the declaration nodes
/// - expressions: Definitions for the expression kinds
/// - statements: Definitions for the statement kinds
/// - types: Type annotations and resolved types
pub mod ast;
pub mod expressions;
pub mod statements;
pub mod types;

#[cfg(test)]
mod tests;
