//! Type system definitions for the AST.
//!
//! This module defines the two representations of types in the language:
//!
//! - [`TypeNode`]: a type annotation as written in a declaration
//! - [`TypeRef`]: the resolved static type the type checker works with
//!
//! Type nodes naming classes are resolved into [`TypeRef::Class`] during type
//! checking. Builtin keywords map directly onto their category.

use std::{fmt::Display, rc::Rc};

use crate::{symbols::symbol_table::Symbol, Span};

use super::ast::Name;

/// The builtin type keywords that can appear in a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinType {
    Int,
    String,
    Object,
    Boolean,
    Void,
}

impl Display for BuiltinType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuiltinType::Int => write!(f, "int"),
            BuiltinType::String => write!(f, "string"),
            BuiltinType::Object => write!(f, "object"),
            BuiltinType::Boolean => write!(f, "boolean"),
            BuiltinType::Void => write!(f, "void"),
        }
    }
}

/// A type annotation as written in the source.
#[derive(Debug, Clone)]
pub enum TypeNode {
    Builtin(BuiltinType, Span),
    /// A (possibly dotted) class name.
    Named(Vec<Name>, Span),
    /// `T[]`. Arrays are not supported.
    Array(Box<TypeNode>, Span),
    /// `T<A, B>`. Generics are not supported.
    Generic {
        base: Box<TypeNode>,
        arguments: Vec<TypeNode>,
        span: Span,
    },
}

impl TypeNode {
    pub fn int() -> Self {
        TypeNode::Builtin(BuiltinType::Int, Span::null())
    }

    pub fn string() -> Self {
        TypeNode::Builtin(BuiltinType::String, Span::null())
    }

    pub fn object() -> Self {
        TypeNode::Builtin(BuiltinType::Object, Span::null())
    }

    pub fn boolean() -> Self {
        TypeNode::Builtin(BuiltinType::Boolean, Span::null())
    }

    pub fn void() -> Self {
        TypeNode::Builtin(BuiltinType::Void, Span::null())
    }

    pub fn named(dotted: &str) -> Self {
        TypeNode::Named(dotted.split('.').map(Name::new).collect(), Span::null())
    }

    pub fn array(element: TypeNode) -> Self {
        TypeNode::Array(Box::new(element), Span::null())
    }

    pub fn get_span(&self) -> &Span {
        match self {
            TypeNode::Builtin(_, span) => span,
            TypeNode::Named(_, span) => span,
            TypeNode::Array(_, span) => span,
            TypeNode::Generic { span, .. } => span,
        }
    }

    /// Structural comparison of two annotations, ignoring source locations.
    ///
    /// Used to detect duplicate function signatures before class names can be
    /// resolved.
    pub fn same_as(&self, other: &TypeNode) -> bool {
        match (self, other) {
            (TypeNode::Builtin(a, _), TypeNode::Builtin(b, _)) => a == b,
            (TypeNode::Named(a, _), TypeNode::Named(b, _)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(a, b)| a.value == b.value)
            }
            (TypeNode::Array(a, _), TypeNode::Array(b, _)) => a.same_as(b),
            (
                TypeNode::Generic {
                    base: a_base,
                    arguments: a_arguments,
                    ..
                },
                TypeNode::Generic {
                    base: b_base,
                    arguments: b_arguments,
                    ..
                },
            ) => a_base.same_as(b_base) && same_signature(a_arguments, b_arguments),
            _ => false,
        }
    }
}

/// Pairwise, order and arity sensitive comparison of two parameter lists.
pub fn same_signature(a: &[TypeNode], b: &[TypeNode]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(a, b)| a.same_as(b))
}

impl Display for TypeNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeNode::Builtin(builtin, _) => write!(f, "{}", builtin),
            TypeNode::Named(segments, _) => {
                let joined = segments
                    .iter()
                    .map(|segment| segment.value.as_str())
                    .collect::<Vec<&str>>()
                    .join(".");
                write!(f, "{}", joined)
            }
            TypeNode::Array(element, _) => write!(f, "{}[]", element),
            TypeNode::Generic {
                base, arguments, ..
            } => {
                let arguments = arguments
                    .iter()
                    .map(|argument| argument.to_string())
                    .collect::<Vec<String>>()
                    .join(", ");
                write!(f, "{}<{}>", base, arguments)
            }
        }
    }
}

/// The builtin categories a [`TypeRef`] can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Int,
    String,
    Object,
    Boolean,
    Void,
    This,
    Null,
    Error,
    Declaration,
    Class,
}

/// A resolved static type.
///
/// Builtin types are equal when their category is. Class types are equal when
/// they resolved to the same class symbol. `Error` absorbs: any operation that
/// involves it yields `Error` again without a new diagnostic.
#[derive(Debug, Clone)]
pub enum TypeRef {
    Int,
    String,
    Object,
    Boolean,
    Void,
    /// The type of `this`.
    This,
    /// The type of the `null` literal.
    Null,
    Error,
    /// Placeholder for names that denote a declaration (a class or a function)
    /// rather than a value.
    Declaration,
    Class(Rc<Symbol>),
}

impl TypeRef {
    pub fn category(&self) -> Category {
        match self {
            TypeRef::Int => Category::Int,
            TypeRef::String => Category::String,
            TypeRef::Object => Category::Object,
            TypeRef::Boolean => Category::Boolean,
            TypeRef::Void => Category::Void,
            TypeRef::This => Category::This,
            TypeRef::Null => Category::Null,
            TypeRef::Error => Category::Error,
            TypeRef::Declaration => Category::Declaration,
            TypeRef::Class(_) => Category::Class,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, TypeRef::Error)
    }

    /// Whether a value of this type can sit on the operand stack.
    pub fn is_value(&self) -> bool {
        !matches!(
            self,
            TypeRef::Void | TypeRef::Error | TypeRef::Declaration
        )
    }

    /// Assignment compatibility. The language has no implicit conversions, so this
    /// is plain structural equality.
    pub fn is_convertible_to(&self, target: &TypeRef) -> bool {
        self == target
    }
}

impl From<BuiltinType> for TypeRef {
    fn from(builtin: BuiltinType) -> Self {
        match builtin {
            BuiltinType::Int => TypeRef::Int,
            BuiltinType::String => TypeRef::String,
            BuiltinType::Object => TypeRef::Object,
            BuiltinType::Boolean => TypeRef::Boolean,
            BuiltinType::Void => TypeRef::Void,
        }
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TypeRef::Class(a), TypeRef::Class(b)) => a.id == b.id,
            _ => self.category() == other.category(),
        }
    }
}

impl Display for TypeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeRef::Int => write!(f, "int"),
            TypeRef::String => write!(f, "string"),
            TypeRef::Object => write!(f, "object"),
            TypeRef::Boolean => write!(f, "boolean"),
            TypeRef::Void => write!(f, "void"),
            TypeRef::This => write!(f, "this"),
            TypeRef::Null => write!(f, "null"),
            TypeRef::Error => write!(f, "<error>"),
            TypeRef::Declaration => write!(f, "<declaration>"),
            TypeRef::Class(symbol) => write!(f, "{}", symbol.name),
        }
    }
}
