//! Options controlling a compilation run.

use crate::{
    ast::ast::{is_static, ClassDecl, ClassMember},
    symbols::symbol_table::SymbolId,
};

/// Which function of the top-level class becomes the program entry point.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EntryPoint {
    /// The first function declared `static` in the top-level class.
    #[default]
    FirstStatic,
    /// The first function of the top-level class with this name.
    Named(String),
}

impl EntryPoint {
    /// The symbol of the method designated as entry point, among the methods of
    /// the top-level class the declaration pass registered.
    pub fn resolve(&self, class: &ClassDecl) -> Option<SymbolId> {
        class
            .members
            .iter()
            .filter_map(|member| match member {
                ClassMember::Method(function) => Some(function),
                _ => None,
            })
            .find(|function| match self {
                EntryPoint::FirstStatic => is_static(&function.modifiers),
                EntryPoint::Named(name) => function.name.value == *name,
            })
            .and_then(|function| function.symbol.get())
            .map(|symbol| symbol.id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompileOptions {
    /// Name written in the `.assembly` and `.module` directives.
    pub assembly_name: String,
    /// External assembly providing `System.Object` and the console routines.
    pub runtime_library: String,
    /// Value of the `.maxstack` directive emitted for every method.
    pub max_stack: u32,
    pub entry_point: EntryPoint,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            assembly_name: String::from("program"),
            runtime_library: String::from("mscorlib"),
            max_stack: 8,
            entry_point: EntryPoint::FirstStatic,
        }
    }
}

impl CompileOptions {
    pub fn with_entry_point(mut self, name: &str) -> Self {
        self.entry_point = EntryPoint::Named(name.to_string());
        self
    }
}
