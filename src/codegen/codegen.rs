//! Main code generation module.
//!
//! Holds the [`CodeGenerator`] and emits the module preamble, the class and field
//! directives and the method frames. Method bodies are handled by the statement
//! and expression generators.

use std::rc::Rc;

use log::{debug, trace};

use crate::{
    ast::{
        ast::{
            accessor, is_static, Accessor, ClassDecl, ClassMember, CompilationUnit, FuncDecl,
            VarDecl,
        },
        statements::Stmt,
        types::TypeRef,
    },
    config::CompileOptions,
    errors::errors::InternalError,
    symbols::symbol_table::{Storage, Symbol, SymbolDetails, SymbolId},
};

use super::{
    assembly_types::{assembly_type, class_reference, quote_name},
    stmt::gen_statement,
};

/// State of one code generation run.
///
/// Instructions are appended to a single text buffer. The generator never touches
/// the semantic annotations of the tree, it only reads them.
pub struct CodeGenerator<'a> {
    pub options: &'a CompileOptions,
    output: String,
    indent: usize,
    next_label: usize,
    entry_point: Option<SymbolId>,
    /// Whether the method being generated receives `this` as argument 0.
    pub has_this: bool,
}

impl<'a> CodeGenerator<'a> {
    pub fn new(options: &'a CompileOptions) -> Self {
        CodeGenerator {
            options,
            output: String::new(),
            indent: 0,
            next_label: 0,
            entry_point: None,
            has_this: false,
        }
    }

    /// Consumes the generator, returning the assembly text.
    pub fn finish(self) -> String {
        self.output
    }

    // OUTPUT

    /// Appends one line at the current indentation.
    pub fn emit(&mut self, line: &str) {
        for _ in 0..self.indent {
            self.output.push_str("    ");
        }
        self.output.push_str(line);
        self.output.push('\n');
    }

    /// Appends a label definition one level left of the instructions.
    pub fn emit_label(&mut self, label: &str) {
        let indent = self.indent.saturating_sub(1);
        for _ in 0..indent {
            self.output.push_str("    ");
        }
        self.output.push_str(label);
        self.output.push_str(":\n");
    }

    fn open_block(&mut self) {
        self.emit("{");
        self.indent += 1;
    }

    fn close_block(&mut self) {
        self.indent = self.indent.saturating_sub(1);
        self.emit("}");
    }

    /// A label name unique within the module.
    pub fn new_label(&mut self, prefix: &str) -> String {
        let label = format!("{}_{}", prefix, self.next_label);
        self.next_label += 1;
        label
    }

    /// Whether `function` is emitted without a `this` argument. The entry point
    /// always is.
    pub fn is_static_method(&self, function: &Symbol) -> bool {
        self.entry_point == Some(function.id) || function.is_static()
    }

    /// The `[runtime]Namespace.Type` reference to a runtime library type.
    pub fn runtime_type(&self, type_name: &str) -> String {
        format!("[{}]{}", quote_name(&self.options.runtime_library), type_name)
    }

    // MODULE

    pub fn gen_module(&mut self, unit: &CompilationUnit) -> Result<(), InternalError> {
        let class = unit.class.as_ref().ok_or(InternalError::MissingChild {
            node: "compilation unit",
            child: "class declaration",
        })?;

        self.entry_point = self.options.entry_point.resolve(class);
        if self.entry_point.is_none() {
            debug!("No entry point found in `{}`", class.name.value);
        }

        let runtime = quote_name(&self.options.runtime_library);
        let assembly = quote_name(&self.options.assembly_name);
        self.emit(&format!(".assembly extern {} {{}}", runtime));
        self.emit(&format!(".assembly {} {{}}", assembly));
        let module = if assembly == self.options.assembly_name {
            format!("{}.exe", assembly)
        } else {
            quote_name(&format!("{}.exe", self.options.assembly_name))
        };
        self.emit(&format!(".module {}", module));
        self.emit("");

        self.gen_class(class, false)
    }

    // CLASSES

    fn gen_class(&mut self, class: &ClassDecl, nested: bool) -> Result<(), InternalError> {
        let symbol = declared(&class.symbol, "class", &class.name.value)?;
        let SymbolDetails::Class { path, .. } = &symbol.details else {
            return Err(InternalError::UnexpectedNode {
                context: "a class declaration",
                found: "non-class symbol",
            });
        };
        trace!("Generating class `{}`", class_reference(path));

        let visibility = match (nested, accessor(&class.modifiers)) {
            (false, Accessor::Public) => "public",
            (false, Accessor::Private) => "private",
            (true, Accessor::Public) => "nested public",
            (true, Accessor::Private) => "nested private",
        };
        let is_static_class = is_static(&class.modifiers);
        let mut header = format!(".class {}", visibility);
        if is_static_class {
            header.push_str(" abstract sealed");
        }
        header.push_str(&format!(
            " auto ansi beforefieldinit {} extends {}",
            quote_name(&class.name.value),
            self.runtime_type("System.Object")
        ));

        self.emit(&header);
        self.open_block();

        for member in class.members.iter() {
            if let ClassMember::Field(field) = member {
                self.gen_field(field)?;
            }
        }
        for member in class.members.iter() {
            match member {
                ClassMember::Method(function) => self.gen_function(function)?,
                ClassMember::Class(nested) => self.gen_class(nested, true)?,
                ClassMember::Field(_) => {}
            }
        }
        if !is_static_class {
            self.gen_default_constructor();
        }

        self.close_block();
        Ok(())
    }

    fn gen_field(&mut self, field: &VarDecl) -> Result<(), InternalError> {
        for declarator in field.declarators.iter() {
            let symbol = declared(&declarator.symbol, "field", &declarator.name.value)?;
            let type_ = assembly_type(resolved_type(&symbol)?)?;

            let mut directive = match accessor(&field.modifiers) {
                Accessor::Public => String::from(".field public"),
                Accessor::Private => String::from(".field private"),
            };
            if let SymbolDetails::Variable {
                storage: Storage::Field { is_static: true, .. },
                ..
            } = symbol.details
            {
                directive.push_str(" static");
            }
            directive.push_str(&format!(" {} {}", type_, quote_name(&symbol.name)));
            self.emit(&directive);
        }
        Ok(())
    }

    fn gen_default_constructor(&mut self) {
        self.emit(
            ".method public hidebysig specialname rtspecialname instance void .ctor() cil managed",
        );
        self.open_block();
        self.emit(&format!(".maxstack {}", self.options.max_stack));
        self.emit("ldarg.0");
        let base = self.runtime_type("System.Object");
        self.emit(&format!("call instance void {}::.ctor()", base));
        self.emit("ret");
        self.close_block();
    }

    // METHODS

    fn gen_function(&mut self, function: &FuncDecl) -> Result<(), InternalError> {
        let symbol = declared(&function.symbol, "function", &function.name.value)?;
        let is_entry = self.entry_point == Some(symbol.id);
        let is_static_method = self.is_static_method(&symbol);
        trace!("Generating method `{}`", symbol.name);

        let return_type = assembly_type(resolved_type(&symbol)?)?;
        let mut parameters = vec![];
        for parameter in function.parameters.iter() {
            let parameter_symbol = declared(&parameter.symbol, "parameter", &parameter.name.value)?;
            parameters.push(format!(
                "{} {}",
                assembly_type(resolved_type(&parameter_symbol)?)?,
                quote_name(&parameter_symbol.name)
            ));
        }

        let visibility = match accessor(&function.modifiers) {
            Accessor::Public => "public",
            Accessor::Private => "private",
        };
        let binding = if is_static_method { "static" } else { "instance" };
        self.emit(&format!(
            ".method {} hidebysig {} {} {}({}) cil managed",
            visibility,
            binding,
            return_type,
            quote_name(&symbol.name),
            parameters.join(", ")
        ));
        self.open_block();

        if is_entry {
            self.emit(".entrypoint");
        }
        self.emit(&format!(".maxstack {}", self.options.max_stack));

        let body = function.body.as_ref().ok_or(InternalError::MissingChild {
            node: "function declaration",
            child: "body",
        })?;

        let mut locals = vec![];
        for statement in body.iter() {
            collect_locals(statement, &mut locals)?;
        }
        if !locals.is_empty() {
            let mut entries = vec![];
            for (index, local) in locals.iter() {
                entries.push(format!(
                    "[{}] {} {}",
                    index,
                    assembly_type(resolved_type(local)?)?,
                    quote_name(&local.name)
                ));
            }
            self.emit(&format!(".locals init ({})", entries.join(", ")));
        }

        self.has_this = !is_static_method;
        for statement in body.iter() {
            gen_statement(self, statement)?;
        }
        self.emit("ret");
        self.has_this = false;

        self.close_block();
        Ok(())
    }
}

/// Collects the locals declared anywhere in a method body, ordered by slot.
fn collect_locals(
    statement: &Stmt,
    locals: &mut Vec<(u16, Rc<Symbol>)>,
) -> Result<(), InternalError> {
    match statement {
        Stmt::LocalDecl(decl) => {
            for declarator in decl.declarators.iter() {
                let symbol = declared(&declarator.symbol, "variable", &declarator.name.value)?;
                let index = match &symbol.details {
                    SymbolDetails::Variable {
                        storage: Storage::Local(index),
                        ..
                    } => *index,
                    _ => continue,
                };
                let position = locals.partition_point(|(other, _)| *other < index);
                locals.insert(position, (index, symbol));
            }
        }
        Stmt::Block(block) => {
            for statement in block.iter() {
                collect_locals(statement, locals)?;
            }
        }
        Stmt::If(if_stmt) => {
            collect_locals(&if_stmt.then_body, locals)?;
            if let Some(else_body) = &if_stmt.else_body {
                collect_locals(else_body, locals)?;
            }
        }
        Stmt::While(while_stmt) => collect_locals(&while_stmt.body, locals)?,
        Stmt::Expression(_) | Stmt::Return(_) | Stmt::Empty(_) => {}
    }
    Ok(())
}

/// The symbol the declaration pass attached to a node.
pub fn declared(
    slot: &std::cell::OnceCell<Rc<Symbol>>,
    what: &'static str,
    name: &str,
) -> Result<Rc<Symbol>, InternalError> {
    slot.get().cloned().ok_or_else(|| InternalError::Unresolved {
        stage: "code generation",
        what,
        name: name.to_string(),
    })
}

/// The type the type checker recorded for a symbol.
pub fn resolved_type(symbol: &Symbol) -> Result<&TypeRef, InternalError> {
    symbol.resolved_type().ok_or_else(|| InternalError::Unresolved {
        stage: "code generation",
        what: "type",
        name: symbol.name.clone(),
    })
}

/// Generates the assembly text for a unit that went through both semantic passes
/// without diagnostics.
pub fn generate(unit: &CompilationUnit, options: &CompileOptions) -> Result<String, InternalError> {
    let mut generator = CodeGenerator::new(options);
    generator.gen_module(unit)?;
    Ok(generator.finish())
}
