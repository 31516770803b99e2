use std::{cell::OnceCell, rc::Rc};

use log::{debug, trace};

use crate::{
    ast::{
        ast::{
            is_static, ClassDecl, ClassMember, CompilationUnit, FuncDecl, Modifier, ParamDecl,
            VarDecl,
        },
        statements::Stmt,
        types::same_signature,
    },
    errors::{
        diagnostics::Diagnostics,
        errors::{ErrorImpl, InternalError},
    },
    symbols::symbol_table::{Storage, Symbol, SymbolDetails, SymbolKind, SymbolTable},
    Position,
};

/// State of the declaration pass.
///
/// The pass only looks at declaration shapes and names, never at expressions.
pub struct Declarer<'a> {
    table: &'a mut SymbolTable,
    diagnostics: &'a mut Diagnostics,
    /// Names of the enclosing classes, outermost first.
    class_path: Vec<String>,
    next_local: u16,
}

impl<'a> Declarer<'a> {
    pub fn new(table: &'a mut SymbolTable, diagnostics: &'a mut Diagnostics) -> Self {
        Declarer {
            table,
            diagnostics,
            class_path: vec![],
            next_local: 0,
        }
    }

    fn report(&mut self, error: ErrorImpl, position: &Position) {
        self.diagnostics.report(error, position.clone());
    }

    fn check_modifiers(&mut self, declaration: &str, modifiers: &[Modifier], position: &Position) {
        if modifiers.contains(&Modifier::Public) && modifiers.contains(&Modifier::Private) {
            self.report(
                ErrorImpl::InconsistentModifiers {
                    declaration: declaration.to_string(),
                    reason: String::from("declared both public and private"),
                },
                position,
            );
        }

        for (index, modifier) in modifiers.iter().enumerate() {
            if modifiers[..index].contains(modifier) {
                self.report(
                    ErrorImpl::InconsistentModifiers {
                        declaration: declaration.to_string(),
                        reason: format!("modifier `{}` repeated", modifier),
                    },
                    position,
                );
            }
        }
    }

    pub fn declare_class(&mut self, class: &ClassDecl) -> Result<(), InternalError> {
        let name = &class.name.value;
        let position = &class.name.span.start;
        self.check_modifiers(name, &class.modifiers, position);

        if let Some(base) = &class.base {
            self.report(
                ErrorImpl::FeatureNotImplemented {
                    feature: String::from("inheritance"),
                },
                &base.get_span().start,
            );
        }
        if !class.type_parameters.is_empty() {
            self.report(
                ErrorImpl::FeatureNotImplemented {
                    feature: String::from("generic classes"),
                },
                position,
            );
        }

        let current = self.table.current();
        if !self.table.members(current, name).is_empty() {
            self.report(ErrorImpl::DuplicateClassDecl { class: name.clone() }, position);
            return Ok(());
        }

        let mut path = self.class_path.clone();
        path.push(name.clone());

        let scope = self.table.enter_scope(name);
        let symbol = self.table.create_symbol(
            name,
            SymbolDetails::Class {
                path,
                modifiers: class.modifiers.clone(),
                builtin: false,
            },
            Some(scope),
            position.clone(),
        );
        if self.table.declare(Rc::clone(&symbol)).is_err() {
            self.report(ErrorImpl::DuplicateClassDecl { class: name.clone() }, position);
            return Ok(());
        }
        attach(&class.symbol, symbol, "class", name)?;
        debug!("Declared class `{}`", name);

        self.table.set_current(scope);
        self.class_path.push(name.clone());

        for member in class.members.iter() {
            match member {
                ClassMember::Method(function) => self.declare_function(function)?,
                ClassMember::Field(field) => self.declare_field(field)?,
                ClassMember::Class(nested) => self.declare_class(nested)?,
            }
        }

        self.class_path.pop();
        self.table.set_current(current);
        Ok(())
    }

    pub fn declare_function(&mut self, function: &FuncDecl) -> Result<(), InternalError> {
        let name = &function.name.value;
        let position = &function.name.span.start;
        self.check_modifiers(name, &function.modifiers, position);

        let signature = function
            .parameters
            .iter()
            .map(|parameter| parameter.type_node.clone())
            .collect::<Vec<_>>();

        let collides = self
            .table
            .lookup_local(name, SymbolKind::Function)
            .iter()
            .any(|other| match &other.details {
                SymbolDetails::Function { parameters, .. } => {
                    same_signature(parameters, &signature)
                }
                _ => false,
            });
        if collides {
            self.report(
                ErrorImpl::DuplicateFunctionDecl {
                    function: name.clone(),
                },
                position,
            );
            return Ok(());
        }

        let current = self.table.current();
        let scope = self.table.enter_scope(name);
        let symbol = self.table.create_symbol(
            name,
            SymbolDetails::Function {
                parameters: signature,
                return_type: function.return_type.clone(),
                modifiers: function.modifiers.clone(),
                owner: self.class_path.clone(),
                intrinsic: None,
            },
            Some(scope),
            position.clone(),
        );
        if self.table.declare(Rc::clone(&symbol)).is_err() {
            self.report(
                ErrorImpl::DuplicateFunctionDecl {
                    function: name.clone(),
                },
                position,
            );
            return Ok(());
        }
        attach(&function.symbol, symbol, "function", name)?;
        debug!("Declared function `{}`", name);

        self.table.set_current(scope);
        self.next_local = 0;

        for (index, parameter) in function.parameters.iter().enumerate() {
            self.declare_parameter(parameter, index as u16)?;
        }

        let body = function.body.as_ref().ok_or(InternalError::MissingChild {
            node: "function declaration",
            child: "body",
        })?;
        for statement in body.iter() {
            self.declare_statement(statement)?;
        }

        self.table.set_current(current);
        Ok(())
    }

    fn declare_parameter(
        &mut self,
        parameter: &ParamDecl,
        index: u16,
    ) -> Result<(), InternalError> {
        let name = &parameter.name.value;
        let position = &parameter.name.span.start;

        if !self.table.lookup_local(name, SymbolKind::Variable).is_empty() {
            self.report(
                ErrorImpl::DuplicateParamName {
                    parameter: name.clone(),
                },
                position,
            );
            return Ok(());
        }

        let symbol = self.table.create_symbol(
            name,
            SymbolDetails::Variable {
                type_node: parameter.type_node.clone(),
                storage: Storage::Parameter(index),
            },
            None,
            position.clone(),
        );
        if self.table.declare(Rc::clone(&symbol)).is_err() {
            self.report(
                ErrorImpl::DuplicateParamName {
                    parameter: name.clone(),
                },
                position,
            );
            return Ok(());
        }
        trace!("Declared parameter `{}`", name);
        attach(&parameter.symbol, symbol, "parameter", name)
    }

    /// Walks a method body for local declarations. Nested statements share the
    /// method's scope.
    fn declare_statement(&mut self, statement: &Stmt) -> Result<(), InternalError> {
        match statement {
            Stmt::LocalDecl(decl) => {
                if !decl.modifiers.is_empty() {
                    self.report(
                        ErrorImpl::InconsistentModifiers {
                            declaration: declared_names(decl),
                            reason: String::from("local variables take no modifiers"),
                        },
                        &decl.span.start,
                    );
                }
                self.declare_variables(decl, |declarer| {
                    let index = declarer.next_local;
                    declarer.next_local += 1;
                    Storage::Local(index)
                })
            }
            Stmt::Block(block) => {
                for statement in block.iter() {
                    self.declare_statement(statement)?;
                }
                Ok(())
            }
            Stmt::If(if_stmt) => {
                self.declare_statement(&if_stmt.then_body)?;
                if let Some(else_body) = &if_stmt.else_body {
                    self.declare_statement(else_body)?;
                }
                Ok(())
            }
            Stmt::While(while_stmt) => self.declare_statement(&while_stmt.body),
            Stmt::Expression(_) | Stmt::Return(_) | Stmt::Empty(_) => Ok(()),
        }
    }

    fn declare_field(&mut self, field: &VarDecl) -> Result<(), InternalError> {
        let names = declared_names(field);
        self.check_modifiers(&names, &field.modifiers, &field.span.start);

        let storage = Storage::Field {
            is_static: is_static(&field.modifiers),
            owner: self.class_path.clone(),
        };
        self.declare_variables(field, |_| storage.clone())
    }

    fn declare_variables(
        &mut self,
        decl: &VarDecl,
        mut storage: impl FnMut(&mut Self) -> Storage,
    ) -> Result<(), InternalError> {
        for declarator in decl.declarators.iter() {
            let name = &declarator.name.value;
            let position = &declarator.name.span.start;

            if !self.table.lookup_local(name, SymbolKind::Variable).is_empty() {
                self.report(
                    ErrorImpl::VariableAlreadyDeclared {
                        variable: name.clone(),
                    },
                    position,
                );
                continue;
            }

            let current = self.table.current();
            if !self.table.members(current, name).is_empty() {
                // A class or function of the same name already lives here.
                self.report(
                    ErrorImpl::VariableAlreadyDeclared {
                        variable: name.clone(),
                    },
                    position,
                );
                continue;
            }

            let details = SymbolDetails::Variable {
                type_node: decl.type_node.clone(),
                storage: storage(self),
            };
            let symbol = self
                .table
                .create_symbol(name, details, None, position.clone());
            if self.table.declare(Rc::clone(&symbol)).is_err() {
                self.report(
                    ErrorImpl::VariableAlreadyDeclared {
                        variable: name.clone(),
                    },
                    position,
                );
                continue;
            }
            trace!("Declared variable `{}`", name);
            attach(&declarator.symbol, symbol, "variable", name)?;
        }
        Ok(())
    }
}

fn attach(
    slot: &OnceCell<Rc<Symbol>>,
    symbol: Rc<Symbol>,
    what: &'static str,
    name: &str,
) -> Result<(), InternalError> {
    slot.set(symbol)
        .map_err(|_| InternalError::AnnotationAlreadySet {
            what,
            name: name.to_string(),
        })
}

fn declared_names(decl: &VarDecl) -> String {
    decl.declarators
        .iter()
        .map(|declarator| declarator.name.value.as_str())
        .collect::<Vec<&str>>()
        .join(", ")
}

/// Runs the declaration pass over `unit`, registering every declaration in `table`.
///
/// Running the pass twice over the same tree is an error: the second run finds
/// the symbol slots already filled and fails with
/// [`InternalError::AnnotationAlreadySet`].
pub fn declare(
    unit: &CompilationUnit,
    table: &mut SymbolTable,
    diagnostics: &mut Diagnostics,
) -> Result<(), InternalError> {
    let class = unit.class.as_ref().ok_or(InternalError::MissingChild {
        node: "compilation unit",
        child: "class declaration",
    })?;

    let root = table.root();
    table.set_current(root);

    let mut declarer = Declarer::new(table, diagnostics);
    declarer.declare_class(class)?;

    table.set_current(root);
    Ok(())
}
