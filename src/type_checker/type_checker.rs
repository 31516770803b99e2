use std::rc::Rc;

use log::{debug, trace};

use crate::{
    ast::{
        ast::{is_static, ClassDecl, ClassMember, CompilationUnit, FuncDecl, Name, VarDecl},
        expressions::{BinaryOperator, Expr, ExprKind, Literal, QualifiedName, UnaryOperator},
        statements::{Block, ExpressionStmt, Stmt},
        types::{TypeNode, TypeRef},
    },
    config::CompileOptions,
    errors::{
        diagnostics::Diagnostics,
        errors::{ErrorImpl, InternalError},
    },
    symbols::symbol_table::{
        ScopeId, Storage, Symbol, SymbolDetails, SymbolId, SymbolKind, SymbolTable,
    },
    Position,
};

/// Type-checking context bound to one scope.
///
/// Class and function bodies are checked by a fresh context bound to the scope
/// the declaration pass opened for them.
pub struct TypeChecker<'a> {
    table: &'a SymbolTable,
    diagnostics: &'a mut Diagnostics,
    scope: ScopeId,
    /// The function whose body is being checked.
    function: Option<Rc<Symbol>>,
    /// The program entry point, compiled static whatever its modifiers.
    entry_point: Option<SymbolId>,
}

impl<'a> TypeChecker<'a> {
    pub fn new(
        table: &'a SymbolTable,
        diagnostics: &'a mut Diagnostics,
        scope: ScopeId,
        entry_point: Option<SymbolId>,
    ) -> Self {
        TypeChecker {
            table,
            diagnostics,
            scope,
            function: None,
            entry_point,
        }
    }

    /// A context for the body of a nested declaration.
    fn nested(&mut self, scope: ScopeId, function: Option<Rc<Symbol>>) -> TypeChecker<'_> {
        TypeChecker {
            table: self.table,
            diagnostics: &mut *self.diagnostics,
            scope,
            function,
            entry_point: self.entry_point,
        }
    }

    fn report(&mut self, error: ErrorImpl, position: &Position) {
        self.diagnostics.report(error, position.clone());
    }

    /// Whether `function` runs without a `this` argument.
    fn is_static_function(&self, function: &Symbol) -> bool {
        self.entry_point == Some(function.id) || function.is_static()
    }

    fn in_static_context(&self) -> bool {
        self.function
            .as_ref()
            .map(|function| self.is_static_function(function))
            .unwrap_or(true)
    }

    // DECLARATIONS

    pub fn check_class(&mut self, class: &ClassDecl) -> Result<(), InternalError> {
        // Rejected by the declaration pass, its body was never declared.
        let Some(symbol) = class.symbol.get() else {
            return Ok(());
        };
        let scope = class_scope(symbol)?;
        debug!("Type checking class `{}`", symbol.name);

        let mut checker = self.nested(scope, None);
        for member in class.members.iter() {
            match member {
                ClassMember::Method(function) => checker.check_function(function)?,
                ClassMember::Field(field) => checker.check_field(field)?,
                ClassMember::Class(nested) => checker.check_class(nested)?,
            }
        }
        Ok(())
    }

    pub fn check_function(&mut self, function: &FuncDecl) -> Result<(), InternalError> {
        let Some(symbol) = function.symbol.get() else {
            return Ok(());
        };
        let scope = symbol.scope.ok_or_else(|| InternalError::Unresolved {
            stage: "type checking",
            what: "scope",
            name: symbol.name.clone(),
        })?;
        debug!("Type checking function `{}`", symbol.name);

        let (parameter_types, _) = self.function_signature(symbol);
        for (parameter, type_) in function.parameters.iter().zip(parameter_types) {
            // Already typed when the pass runs again over the same tree.
            if let Some(parameter) = parameter.symbol.get() {
                if parameter.resolved_type().is_none() {
                    parameter.set_resolved_type(type_);
                }
            }
        }

        let mut checker = self.nested(scope, Some(Rc::clone(symbol)));

        let body = function.body.as_ref().ok_or(InternalError::MissingChild {
            node: "function declaration",
            child: "body",
        })?;
        checker.check_block(body)
    }

    fn check_field(&mut self, field: &VarDecl) -> Result<(), InternalError> {
        for declarator in field.declarators.iter() {
            match declarator.symbol.get() {
                Some(symbol) => {
                    self.variable_type(symbol);
                }
                None => {
                    self.resolve_type_node(&field.type_node, self.scope);
                }
            }
            if let Some(initializer) = &declarator.initializer {
                self.report(
                    ErrorImpl::FeatureNotImplemented {
                        feature: String::from("field initializers"),
                    },
                    &initializer.span.start,
                );
                self.check_expr(initializer)?;
            }
        }
        Ok(())
    }

    // TYPES

    /// Resolves a written type in `scope`, reporting what cannot be resolved.
    pub fn resolve_type_node(&mut self, type_node: &TypeNode, scope: ScopeId) -> TypeRef {
        match type_node {
            TypeNode::Builtin(builtin, _) => TypeRef::from(*builtin),
            TypeNode::Named(segments, span) => {
                let Some(symbol) = self.resolve_segments(segments, scope, &span.start) else {
                    return TypeRef::Error;
                };
                if symbol.kind() == SymbolKind::Class {
                    TypeRef::Class(symbol)
                } else {
                    self.report(
                        ErrorImpl::IdentifierNotTypeName {
                            identifier: type_node.to_string(),
                        },
                        &span.start,
                    );
                    TypeRef::Error
                }
            }
            TypeNode::Array(_, span) => {
                self.report(
                    ErrorImpl::FeatureNotImplemented {
                        feature: String::from("arrays"),
                    },
                    &span.start,
                );
                TypeRef::Error
            }
            TypeNode::Generic { span, .. } => {
                self.report(
                    ErrorImpl::FeatureNotImplemented {
                        feature: String::from("generic types"),
                    },
                    &span.start,
                );
                TypeRef::Error
            }
        }
    }

    /// The type of a variable symbol, resolved in the scope it was declared in the
    /// first time it is needed.
    fn variable_type(&mut self, symbol: &Rc<Symbol>) -> TypeRef {
        if let Some(type_) = symbol.resolved_type() {
            return type_.clone();
        }
        let type_ = match &symbol.details {
            SymbolDetails::Variable { type_node, .. } => {
                self.resolve_type_node(type_node, symbol.declared_in)
            }
            _ => TypeRef::Declaration,
        };
        symbol.set_resolved_type(type_.clone());
        type_
    }

    /// Parameter types and return type of a function symbol, resolved once.
    fn function_signature(&mut self, symbol: &Rc<Symbol>) -> (Vec<TypeRef>, TypeRef) {
        let SymbolDetails::Function {
            parameters,
            return_type,
            ..
        } = &symbol.details
        else {
            return (vec![], TypeRef::Error);
        };

        let resolved_parameters = match symbol.resolved_parameters() {
            Some(resolved) => resolved.to_vec(),
            None => {
                let resolved = parameters
                    .iter()
                    .map(|parameter| self.resolve_type_node(parameter, symbol.declared_in))
                    .collect::<Vec<_>>();
                symbol.set_resolved_parameters(resolved.clone());
                resolved
            }
        };

        let resolved_return = match symbol.resolved_type() {
            Some(resolved) => resolved.clone(),
            None => {
                let resolved = self.resolve_type_node(return_type, symbol.declared_in);
                symbol.set_resolved_type(resolved.clone());
                resolved
            }
        };

        (resolved_parameters, resolved_return)
    }

    // NAMES

    /// Walks a dotted name from `scope`.
    ///
    /// The first segment is looked up through the enclosing scopes; each further
    /// segment is looked up among the members of the class the previous one named.
    /// Anything but exactly one symbol per segment is reported as undeclared.
    fn resolve_segments(
        &mut self,
        segments: &[Name],
        scope: ScopeId,
        position: &Position,
    ) -> Option<Rc<Symbol>> {
        let mut current = scope;
        let mut resolved: Option<Rc<Symbol>> = None;

        for (index, segment) in segments.iter().enumerate() {
            if let Some(previous) = &resolved {
                match (previous.kind(), previous.scope) {
                    (SymbolKind::Class, Some(member_scope)) => current = member_scope,
                    _ => {
                        self.report(
                            ErrorImpl::FeatureNotImplemented {
                                feature: format!("member access on `{}`", previous.name),
                            },
                            &segment.span.start,
                        );
                        return None;
                    }
                }
            }

            let candidates = if index == 0 {
                self.table.lookup_from(current, &segment.value)
            } else {
                self.table.members(current, &segment.value)
            };

            if candidates.len() != 1 {
                let path = segments[..=index]
                    .iter()
                    .map(|segment| segment.value.as_str())
                    .collect::<Vec<&str>>()
                    .join(".");
                self.report(
                    ErrorImpl::UndeclaredIdentifier { identifier: path },
                    if segment.span.start == Position::null() {
                        position
                    } else {
                        &segment.span.start
                    },
                );
                return None;
            }
            resolved = candidates.into_iter().next();
        }

        if resolved.is_none() {
            trace!("Empty qualified name");
        }
        resolved
    }

    /// Resolves a qualified name and records its symbol on the node.
    fn resolve_name(&mut self, name: &QualifiedName) -> Result<Option<Rc<Symbol>>, InternalError> {
        if name.segments.is_empty() {
            return Err(InternalError::MissingChild {
                node: "qualified name",
                child: "identifier",
            });
        }
        let Some(symbol) = self.resolve_segments(&name.segments, self.scope, &name.span.start)
        else {
            return Ok(None);
        };
        bind(name, &symbol)?;
        Ok(Some(symbol))
    }

    // STATEMENTS

    pub fn check_block(&mut self, block: &Block) -> Result<(), InternalError> {
        for statement in block.iter() {
            self.check_stmt(statement)?;
        }
        Ok(())
    }

    pub fn check_stmt(&mut self, statement: &Stmt) -> Result<(), InternalError> {
        match statement {
            Stmt::Block(block) => self.check_block(block),
            Stmt::Expression(expression_stmt) => {
                self.check_expression_stmt(expression_stmt)?;
                Ok(())
            }
            Stmt::LocalDecl(decl) => self.check_local_decl(decl),
            Stmt::If(if_stmt) => {
                self.check_condition(&if_stmt.condition)?;
                self.check_stmt(&if_stmt.then_body)?;
                if let Some(else_body) = &if_stmt.else_body {
                    self.check_stmt(else_body)?;
                }
                Ok(())
            }
            Stmt::While(while_stmt) => {
                self.check_condition(&while_stmt.condition)?;
                self.check_stmt(&while_stmt.body)
            }
            Stmt::Return(return_stmt) => {
                let expected = match self.function.clone() {
                    Some(function) => self.function_signature(&function).1,
                    None => {
                        return Err(InternalError::UnexpectedNode {
                            context: "a class member",
                            found: "return statement",
                        })
                    }
                };
                let received = match &return_stmt.value {
                    Some(value) => self.check_expr(value)?,
                    None => TypeRef::Void,
                };
                if !expected.is_error()
                    && !received.is_error()
                    && !received.is_convertible_to(&expected)
                {
                    self.report(
                        ErrorImpl::IncompatibleAssignment {
                            expected: expected.to_string(),
                            received: received.to_string(),
                        },
                        &return_stmt.span.start,
                    );
                }
                Ok(())
            }
            Stmt::Empty(_) => Ok(()),
        }
    }

    /// Checks the wrapped expression and copies its type onto the statement.
    fn check_expression_stmt(
        &mut self,
        statement: &ExpressionStmt,
    ) -> Result<TypeRef, InternalError> {
        let type_ = self.check_expr(&statement.expression)?;
        if let Some(existing) = statement.eval_type.get() {
            return Ok(existing.clone());
        }
        statement
            .eval_type
            .set(type_.clone())
            .map_err(|_| InternalError::AnnotationAlreadySet {
                what: "type",
                name: String::from("expression statement"),
            })?;
        Ok(type_)
    }

    fn check_local_decl(&mut self, decl: &VarDecl) -> Result<(), InternalError> {
        for declarator in decl.declarators.iter() {
            let declared = match declarator.symbol.get() {
                Some(symbol) => self.variable_type(symbol),
                // Rejected redeclaration: check it against its own annotation.
                None => self.resolve_type_node(&decl.type_node, self.scope),
            };

            if let Some(initializer) = &declarator.initializer {
                let received = self.check_expr(initializer)?;
                if !declared.is_error()
                    && !received.is_error()
                    && !received.is_convertible_to(&declared)
                {
                    self.report(
                        ErrorImpl::IncompatibleAssignment {
                            expected: declared.to_string(),
                            received: received.to_string(),
                        },
                        &initializer.span.start,
                    );
                }
            }
        }
        Ok(())
    }

    fn check_condition(&mut self, condition: &Expr) -> Result<(), InternalError> {
        let type_ = self.check_expr(condition)?;
        if !type_.is_error() && type_ != TypeRef::Boolean {
            self.report(
                ErrorImpl::BooleanExpected {
                    received: type_.to_string(),
                },
                &condition.span.start,
            );
        }
        Ok(())
    }

    // EXPRESSIONS

    /// Type checks `expr` and records its type.
    ///
    /// An expression is only ever evaluated once: checking it again returns the
    /// recorded type.
    pub fn check_expr(&mut self, expr: &Expr) -> Result<TypeRef, InternalError> {
        if let Some(type_) = expr.eval_type.get() {
            return Ok(type_.clone());
        }

        let type_ = match &expr.kind {
            ExprKind::Literal(literal) => match literal {
                Literal::Int(_) => TypeRef::Int,
                Literal::String(_) => TypeRef::String,
                Literal::Boolean(_) => TypeRef::Boolean,
                Literal::Null => TypeRef::Null,
            },
            ExprKind::This => {
                if self.in_static_context() {
                    self.report(
                        ErrorImpl::InconsistentModifiers {
                            declaration: String::from("this"),
                            reason: String::from("used inside a static method"),
                        },
                        &expr.span.start,
                    );
                    TypeRef::Error
                } else {
                    TypeRef::This
                }
            }
            ExprKind::Name(name) => self.check_name(name, &expr.span.start)?,
            ExprKind::Unary { operator, operand } => {
                let operand_type = self.check_expr(operand)?;
                let expected = match operator {
                    UnaryOperator::Negate => TypeRef::Int,
                    UnaryOperator::Not => TypeRef::Boolean,
                };
                if operand_type.is_error() {
                    TypeRef::Error
                } else if operand_type != expected {
                    self.report(
                        ErrorImpl::IncompatibleOperands {
                            operator: operator.to_string(),
                            left: operand_type.to_string(),
                            right: String::from("no second operand"),
                        },
                        &expr.span.start,
                    );
                    TypeRef::Error
                } else {
                    expected
                }
            }
            ExprKind::Binary {
                operator,
                left,
                right,
            } => self.check_binary(*operator, left, right, &expr.span.start)?,
            ExprKind::Assignment { target, value } => {
                self.check_assignment(target, value, &expr.span.start)?
            }
            ExprKind::Call { callee, arguments } => {
                self.check_call(callee, arguments, &expr.span.start)?
            }
            ExprKind::New { class, arguments } => {
                for argument in arguments.iter() {
                    self.check_expr(argument)?;
                }
                self.check_new(class, arguments, &expr.span.start)?
            }
            ExprKind::FieldAccess { target, .. } => {
                self.check_expr(target)?;
                self.report(
                    ErrorImpl::FeatureNotImplemented {
                        feature: String::from("field access on expressions"),
                    },
                    &expr.span.start,
                );
                TypeRef::Error
            }
            ExprKind::Index { target, index } => {
                self.check_expr(target)?;
                self.check_expr(index)?;
                self.report(
                    ErrorImpl::FeatureNotImplemented {
                        feature: String::from("arrays"),
                    },
                    &expr.span.start,
                );
                TypeRef::Error
            }
        };

        trace!("{} has type {}", expr.kind.describe(), type_);
        expr.eval_type
            .set(type_.clone())
            .map_err(|_| InternalError::AnnotationAlreadySet {
                what: "type",
                name: expr.kind.describe().to_string(),
            })?;
        Ok(type_)
    }

    fn check_name(
        &mut self,
        name: &QualifiedName,
        position: &Position,
    ) -> Result<TypeRef, InternalError> {
        let Some(symbol) = self.resolve_name(name)? else {
            return Ok(TypeRef::Error);
        };

        match &symbol.details {
            SymbolDetails::Variable { storage, .. } => {
                if let Storage::Field {
                    is_static: false,
                    owner,
                } = storage
                {
                    let unqualified = name.segments.len() == 1;
                    if let Err(reason) = self.instance_field_access(owner, unqualified) {
                        self.report(
                            ErrorImpl::InconsistentModifiers {
                                declaration: name.to_string(),
                                reason: String::from(reason),
                            },
                            position,
                        );
                        return Ok(TypeRef::Error);
                    }
                }
                Ok(self.variable_type(&symbol))
            }
            SymbolDetails::Class { .. } | SymbolDetails::Function { .. } => {
                Ok(TypeRef::Declaration)
            }
        }
    }

    /// Instance fields can only be read or written by their bare name, from an
    /// instance method of the class declaring them.
    fn instance_field_access(
        &self,
        owner: &[String],
        unqualified: bool,
    ) -> Result<(), &'static str> {
        if self.in_static_context() {
            return Err("instance field used inside a static method");
        }
        if !unqualified {
            return Err("instance field accessed through a qualified name");
        }
        match self.function.as_ref().map(|caller| &caller.details) {
            Some(SymbolDetails::Function { owner: caller, .. }) if caller.as_slice() == owner => {
                Ok(())
            }
            _ => Err("instance field of another class"),
        }
    }

    fn check_binary(
        &mut self,
        operator: BinaryOperator,
        left: &Expr,
        right: &Expr,
        position: &Position,
    ) -> Result<TypeRef, InternalError> {
        let left_type = self.check_expr(left)?;
        let right_type = self.check_expr(right)?;

        if left_type.is_error() || right_type.is_error() {
            return Ok(TypeRef::Error);
        }
        let applicable = match operator {
            BinaryOperator::Add
            | BinaryOperator::Less
            | BinaryOperator::LessEqual
            | BinaryOperator::Greater
            | BinaryOperator::GreaterEqual => {
                matches!(left_type, TypeRef::Int | TypeRef::String)
            }
            BinaryOperator::Subtract
            | BinaryOperator::Multiply
            | BinaryOperator::Divide
            | BinaryOperator::Remainder => left_type == TypeRef::Int,
            BinaryOperator::And | BinaryOperator::Or => left_type == TypeRef::Boolean,
            BinaryOperator::Equal | BinaryOperator::NotEqual => left_type.is_value(),
        };
        if left_type != right_type || !applicable {
            self.report(
                ErrorImpl::IncompatibleOperands {
                    operator: operator.to_string(),
                    left: left_type.to_string(),
                    right: right_type.to_string(),
                },
                position,
            );
            return Ok(TypeRef::Error);
        }

        if operator.is_comparison() {
            Ok(TypeRef::Boolean)
        } else {
            Ok(left_type)
        }
    }

    fn check_assignment(
        &mut self,
        target: &Expr,
        value: &Expr,
        position: &Position,
    ) -> Result<TypeRef, InternalError> {
        let target_type = match &target.kind {
            ExprKind::Name(_) => self.check_expr(target)?,
            ExprKind::FieldAccess { .. } | ExprKind::Index { .. } => {
                // Reports the missing feature and marks the target as `error`.
                self.check_expr(target)?
            }
            other => {
                return Err(InternalError::UnexpectedNode {
                    context: "an assignment target",
                    found: other.describe(),
                })
            }
        };
        let value_type = self.check_expr(value)?;

        if target_type.is_error() || value_type.is_error() {
            return Ok(TypeRef::Error);
        }
        if !value_type.is_convertible_to(&target_type) || !target_type.is_value() {
            self.report(
                ErrorImpl::IncompatibleAssignment {
                    expected: target_type.to_string(),
                    received: value_type.to_string(),
                },
                position,
            );
            return Ok(TypeRef::Error);
        }
        Ok(target_type)
    }

    fn check_call(
        &mut self,
        callee: &Expr,
        arguments: &[Expr],
        position: &Position,
    ) -> Result<TypeRef, InternalError> {
        let ExprKind::Name(name) = &callee.kind else {
            self.check_expr(callee)?;
            for argument in arguments.iter() {
                self.check_expr(argument)?;
            }
            self.report(
                ErrorImpl::FeatureNotImplemented {
                    feature: String::from("calls on computed expressions"),
                },
                position,
            );
            return Ok(TypeRef::Error);
        };
        set_type(callee, TypeRef::Declaration)?;

        let mut argument_types = Vec::with_capacity(arguments.len());
        for argument in arguments.iter() {
            argument_types.push(self.check_expr(argument)?);
        }
        if argument_types.iter().any(TypeRef::is_error) {
            return Ok(TypeRef::Error);
        }

        let Some((last, prefix)) = name.segments.split_last() else {
            return Err(InternalError::MissingChild {
                node: "method call",
                child: "callee name",
            });
        };

        let candidates = if prefix.is_empty() {
            self.table.lookup_from(self.scope, &last.value)
        } else {
            let Some(owner) = self.resolve_segments(prefix, self.scope, position) else {
                return Ok(TypeRef::Error);
            };
            match (owner.kind(), owner.scope) {
                (SymbolKind::Class, Some(scope)) => self.table.members(scope, &last.value),
                _ => {
                    self.report(
                        ErrorImpl::FeatureNotImplemented {
                            feature: format!("method calls on `{}`", owner.name),
                        },
                        position,
                    );
                    return Ok(TypeRef::Error);
                }
            }
        };
        let overloads = candidates
            .into_iter()
            .filter(|symbol| symbol.kind() == SymbolKind::Function)
            .collect::<Vec<_>>();

        if overloads.is_empty() {
            self.report(
                ErrorImpl::UndeclaredIdentifier {
                    identifier: name.to_string(),
                },
                position,
            );
            return Ok(TypeRef::Error);
        }

        let mut matches = vec![];
        for overload in overloads.iter() {
            let (parameters, return_type) = self.function_signature(overload);
            let applicable = parameters.len() == argument_types.len()
                && parameters
                    .iter()
                    .zip(argument_types.iter())
                    .all(|(parameter, argument)| parameter == argument);
            if applicable {
                matches.push((Rc::clone(overload), return_type));
            }
        }

        let (function, return_type) = match matches.len() {
            1 => matches.remove(0),
            0 => {
                self.report(
                    ErrorImpl::InvalidFuncArg {
                        function: name.to_string(),
                        reason: String::from("no applicable overload"),
                    },
                    position,
                );
                return Ok(TypeRef::Error);
            }
            _ => {
                self.report(
                    ErrorImpl::InvalidFuncArg {
                        function: name.to_string(),
                        reason: String::from("ambiguous call"),
                    },
                    position,
                );
                return Ok(TypeRef::Error);
            }
        };

        if !self.is_static_function(&function)
            && !self.can_call_instance_method(&function, prefix.is_empty())
        {
            self.report(
                ErrorImpl::InconsistentModifiers {
                    declaration: name.to_string(),
                    reason: String::from("instance method called from a static context"),
                },
                position,
            );
            return Ok(TypeRef::Error);
        }

        bind(name, &function)?;
        Ok(return_type)
    }

    /// Instance methods can only be called unqualified, from an instance method of
    /// the same class.
    fn can_call_instance_method(&self, callee: &Symbol, unqualified: bool) -> bool {
        let Some(caller) = &self.function else {
            return false;
        };
        let same_owner = match (&caller.details, &callee.details) {
            (
                SymbolDetails::Function { owner: a, .. },
                SymbolDetails::Function { owner: b, .. },
            ) => a == b,
            _ => false,
        };
        unqualified && !self.is_static_function(caller) && same_owner
    }

    fn check_new(
        &mut self,
        class: &QualifiedName,
        arguments: &[Expr],
        position: &Position,
    ) -> Result<TypeRef, InternalError> {
        let Some(symbol) = self.resolve_name(class)? else {
            return Ok(TypeRef::Error);
        };

        match &symbol.details {
            SymbolDetails::Class { builtin: false, modifiers, .. } if !is_static(modifiers) => {}
            SymbolDetails::Class { .. } => {
                self.report(
                    ErrorImpl::InconsistentModifiers {
                        declaration: class.to_string(),
                        reason: String::from("static classes cannot be instantiated"),
                    },
                    position,
                );
                return Ok(TypeRef::Error);
            }
            _ => {
                self.report(
                    ErrorImpl::IdentifierNotTypeName {
                        identifier: class.to_string(),
                    },
                    position,
                );
                return Ok(TypeRef::Error);
            }
        }

        if !arguments.is_empty() {
            self.report(
                ErrorImpl::FeatureNotImplemented {
                    feature: String::from("constructor arguments"),
                },
                position,
            );
            return Ok(TypeRef::Error);
        }

        Ok(TypeRef::Class(symbol))
    }
}

fn class_scope(symbol: &Symbol) -> Result<ScopeId, InternalError> {
    symbol.scope.ok_or_else(|| InternalError::Unresolved {
        stage: "type checking",
        what: "scope",
        name: symbol.name.clone(),
    })
}

fn bind(name: &QualifiedName, symbol: &Rc<Symbol>) -> Result<(), InternalError> {
    name.symbol
        .set(Rc::clone(symbol))
        .map_err(|_| InternalError::AnnotationAlreadySet {
            what: "symbol",
            name: name.to_string(),
        })
}

fn set_type(expr: &Expr, type_: TypeRef) -> Result<(), InternalError> {
    expr.eval_type
        .set(type_)
        .map_err(|_| InternalError::AnnotationAlreadySet {
            what: "type",
            name: expr.kind.describe().to_string(),
        })
}

/// Runs the type-checking pass over a unit the declaration pass has processed.
///
/// `options` names the entry point, which is checked as a static method.
pub fn type_check(
    unit: &CompilationUnit,
    table: &SymbolTable,
    diagnostics: &mut Diagnostics,
    options: &CompileOptions,
) -> Result<(), InternalError> {
    let class = unit.class.as_ref().ok_or(InternalError::MissingChild {
        node: "compilation unit",
        child: "class declaration",
    })?;

    let entry_point = options.entry_point.resolve(class);
    let mut checker = TypeChecker::new(table, diagnostics, table.root(), entry_point);
    checker.check_class(class)
}
