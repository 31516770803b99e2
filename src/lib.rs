#![allow(clippy::module_inception)]

//! Semantic core of a compiler for a small Java-like teaching language.
//!
//! The crate receives an already parsed [`ast::ast::CompilationUnit`] and runs
//! three passes over it:
//!
//! 1. the declaration pass registers classes, functions, parameters and locals
//!    into a tree of scopes,
//! 2. the type-checking pass resolves names and annotates every expression with
//!    its evaluated type,
//! 3. the code generator writes a textual stack-based assembly module.
//!
//! Recoverable problems in the user's program are collected in a
//! [`errors::diagnostics::Diagnostics`] sink. Broken AST shapes abort the run
//! with an [`errors::errors::InternalError`].

use std::rc::Rc;

use log::debug;

use crate::{
    ast::ast::CompilationUnit,
    config::CompileOptions,
    errors::{diagnostics::Diagnostics, errors::InternalError},
    symbols::symbol_table::SymbolTable,
};

pub mod ast;
pub mod codegen;
pub mod config;
pub mod declarations;
pub mod errors;
pub mod symbols;
pub mod type_checker;

extern crate regex;

#[derive(Debug, Clone, PartialEq)]
pub struct Position(pub u32, pub Rc<String>);

impl Position {
    pub fn null() -> Self {
        Position(0, Rc::new(String::from("<null>")))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn null() -> Self {
        Span {
            start: Position::null(),
            end: Position::null(),
        }
    }

    /// Creates a span covering `start..end` in `file`.
    pub fn new(start: u32, end: u32, file: &Rc<String>) -> Self {
        Span {
            start: Position(start, Rc::clone(file)),
            end: Position(end, Rc::clone(file)),
        }
    }
}

/// The result of one compilation run.
#[derive(Debug)]
pub struct CompileOutput {
    /// Every semantic error found, in the order the passes reported them.
    pub diagnostics: Diagnostics,
    /// The generated assembly text. Only present when `diagnostics` is empty.
    pub assembly: Option<String>,
}

impl CompileOutput {
    pub fn is_success(&self) -> bool {
        self.diagnostics.is_empty() && self.assembly.is_some()
    }
}

/// Runs the declaration pass, the type-checking pass and, if both finished without
/// diagnostics, the code generator.
///
/// The tree is annotated in place, so a unit can only be compiled once.
pub fn compile(
    unit: &CompilationUnit,
    options: &CompileOptions,
) -> Result<CompileOutput, InternalError> {
    let mut diagnostics = Diagnostics::new();
    let mut table = SymbolTable::with_builtins();

    declarations::declarations::declare(unit, &mut table, &mut diagnostics)?;
    debug!("Declaration pass finished with {} error(s)", diagnostics.len());

    type_checker::type_checker::type_check(unit, &table, &mut diagnostics, options)?;
    debug!("Type checking finished with {} error(s)", diagnostics.len());

    if !diagnostics.is_empty() {
        return Ok(CompileOutput {
            diagnostics,
            assembly: None,
        });
    }

    let assembly = codegen::codegen::generate(unit, options)?;
    debug!("Generated {} bytes of assembly", assembly.len());

    Ok(CompileOutput {
        diagnostics,
        assembly: Some(assembly),
    })
}
