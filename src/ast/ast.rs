//! Root and declaration nodes of the tree.
//!
//! Every declaration carries a `symbol` slot that stays empty until the
//! declaration pass registers it. A slot that is still empty afterwards marks a
//! declaration that was rejected (duplicate name or signature).

use std::{cell::OnceCell, fmt::Display, rc::Rc};

use crate::{symbols::symbol_table::Symbol, Span};

use super::{statements::Block, types::TypeNode, expressions::Expr};

/// An identifier as written in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct Name {
    pub value: String,
    pub span: Span,
}

impl Name {
    pub fn new(value: &str) -> Self {
        Name {
            value: value.to_string(),
            span: Span::null(),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
}

impl Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    Public,
    Private,
    Static,
}

impl Display for Modifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Modifier::Public => write!(f, "public"),
            Modifier::Private => write!(f, "private"),
            Modifier::Static => write!(f, "static"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accessor {
    Public,
    Private,
}

/// Returns whether `modifiers` contains `static`.
pub fn is_static(modifiers: &[Modifier]) -> bool {
    modifiers.contains(&Modifier::Static)
}

/// Returns the declared accessor, defaulting to private.
pub fn accessor(modifiers: &[Modifier]) -> Accessor {
    if modifiers.contains(&Modifier::Public) {
        Accessor::Public
    } else {
        Accessor::Private
    }
}

/// The root of the tree: exactly one top-level class.
#[derive(Debug)]
pub struct CompilationUnit {
    pub class: Option<ClassDecl>,
    pub span: Span,
}

impl CompilationUnit {
    pub fn new(class: ClassDecl) -> Self {
        CompilationUnit {
            class: Some(class),
            span: Span::null(),
        }
    }
}

#[derive(Debug)]
pub struct ClassDecl {
    pub name: Name,
    pub modifiers: Vec<Modifier>,
    /// `extends` clause. Inheritance is not supported.
    pub base: Option<TypeNode>,
    /// Generic parameters. Generics are not supported.
    pub type_parameters: Vec<Name>,
    pub members: Vec<ClassMember>,
    pub span: Span,
    pub symbol: OnceCell<Rc<Symbol>>,
}

impl ClassDecl {
    pub fn new(name: &str, modifiers: &[Modifier], members: Vec<ClassMember>) -> Self {
        ClassDecl {
            name: Name::new(name),
            modifiers: modifiers.to_vec(),
            base: None,
            type_parameters: vec![],
            members,
            span: Span::null(),
            symbol: OnceCell::new(),
        }
    }

    pub fn with_base(mut self, base: TypeNode) -> Self {
        self.base = Some(base);
        self
    }

    pub fn with_type_parameters(mut self, parameters: &[&str]) -> Self {
        self.type_parameters = parameters.iter().map(|name| Name::new(name)).collect();
        self
    }
}

#[derive(Debug)]
pub enum ClassMember {
    Method(FuncDecl),
    Field(VarDecl),
    Class(ClassDecl),
}

#[derive(Debug)]
pub struct FuncDecl {
    pub name: Name,
    pub modifiers: Vec<Modifier>,
    pub return_type: TypeNode,
    pub parameters: Vec<ParamDecl>,
    pub body: Option<Block>,
    pub span: Span,
    pub symbol: OnceCell<Rc<Symbol>>,
}

impl FuncDecl {
    pub fn new(
        name: &str,
        modifiers: &[Modifier],
        return_type: TypeNode,
        parameters: Vec<ParamDecl>,
        body: Block,
    ) -> Self {
        FuncDecl {
            name: Name::new(name),
            modifiers: modifiers.to_vec(),
            return_type,
            parameters,
            body: Some(body),
            span: Span::null(),
            symbol: OnceCell::new(),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.name.span = span.clone();
        self.span = span;
        self
    }
}

#[derive(Debug)]
pub struct ParamDecl {
    pub name: Name,
    pub type_node: TypeNode,
    pub span: Span,
    pub symbol: OnceCell<Rc<Symbol>>,
}

impl ParamDecl {
    pub fn new(name: &str, type_node: TypeNode) -> Self {
        ParamDecl {
            name: Name::new(name),
            type_node,
            span: Span::null(),
            symbol: OnceCell::new(),
        }
    }
}

/// A declaration of one or more variables sharing a type, such as `int a, b = 2;`.
///
/// Used both for locals and for class-level fields.
#[derive(Debug)]
pub struct VarDecl {
    pub modifiers: Vec<Modifier>,
    pub type_node: TypeNode,
    pub declarators: Vec<VarDeclarator>,
    pub span: Span,
}

impl VarDecl {
    pub fn new(type_node: TypeNode, declarators: Vec<VarDeclarator>) -> Self {
        VarDecl {
            modifiers: vec![],
            type_node,
            declarators,
            span: Span::null(),
        }
    }

    /// A declaration of a single variable without initialiser.
    pub fn single(type_node: TypeNode, name: &str) -> Self {
        VarDecl::new(type_node, vec![VarDeclarator::new(name, None)])
    }

    pub fn with_modifiers(mut self, modifiers: &[Modifier]) -> Self {
        self.modifiers = modifiers.to_vec();
        self
    }
}

#[derive(Debug)]
pub struct VarDeclarator {
    pub name: Name,
    pub initializer: Option<Expr>,
    pub span: Span,
    pub symbol: OnceCell<Rc<Symbol>>,
}

impl VarDeclarator {
    pub fn new(name: &str, initializer: Option<Expr>) -> Self {
        VarDeclarator {
            name: Name::new(name),
            initializer,
            span: Span::null(),
            symbol: OnceCell::new(),
        }
    }
}
