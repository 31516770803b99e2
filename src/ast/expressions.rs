use std::{cell::OnceCell, fmt::Display, rc::Rc};

use crate::{symbols::symbol_table::Symbol, Span};

use super::{ast::Name, types::TypeRef};

/// An expression node.
///
/// `eval_type` is written exactly once, by the type checker.
#[derive(Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
    pub eval_type: OnceCell<TypeRef>,
}

#[derive(Debug)]
pub enum ExprKind {
    Literal(Literal),
    This,
    Name(QualifiedName),
    Unary {
        operator: UnaryOperator,
        operand: Box<Expr>,
    },
    Binary {
        operator: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Assignment {
        target: Box<Expr>,
        value: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        arguments: Vec<Expr>,
    },
    New {
        class: QualifiedName,
        arguments: Vec<Expr>,
    },
    /// `target.field` where `target` is an arbitrary expression.
    FieldAccess {
        target: Box<Expr>,
        field: Name,
    },
    /// `target[index]`. Arrays are not supported.
    Index {
        target: Box<Expr>,
        index: Box<Expr>,
    },
}

impl ExprKind {
    pub fn describe(&self) -> &'static str {
        match self {
            ExprKind::Literal(_) => "literal",
            ExprKind::This => "`this`",
            ExprKind::Name(_) => "name",
            ExprKind::Unary { .. } => "unary expression",
            ExprKind::Binary { .. } => "binary expression",
            ExprKind::Assignment { .. } => "assignment",
            ExprKind::Call { .. } => "method call",
            ExprKind::New { .. } => "object creation",
            ExprKind::FieldAccess { .. } => "field access",
            ExprKind::Index { .. } => "index expression",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i32),
    String(String),
    Boolean(bool),
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Negate,
    Not,
}

impl Display for UnaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnaryOperator::Negate => write!(f, "-"),
            UnaryOperator::Not => write!(f, "!"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    And,
    Or,
}

impl BinaryOperator {
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOperator::Equal
                | BinaryOperator::NotEqual
                | BinaryOperator::Less
                | BinaryOperator::LessEqual
                | BinaryOperator::Greater
                | BinaryOperator::GreaterEqual
        )
    }
}

impl Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Remainder => "%",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::Less => "<",
            BinaryOperator::LessEqual => "<=",
            BinaryOperator::Greater => ">",
            BinaryOperator::GreaterEqual => ">=",
            BinaryOperator::And => "&&",
            BinaryOperator::Or => "||",
        };
        write!(f, "{}", symbol)
    }
}

/// A dotted name such as `System.Write`. The type checker attaches the symbol the
/// last segment resolved to.
#[derive(Debug, Clone)]
pub struct QualifiedName {
    pub segments: Vec<Name>,
    pub span: Span,
    pub symbol: OnceCell<Rc<Symbol>>,
}

impl QualifiedName {
    /// Builds a name from dotted text, `"System.Write"` giving two segments.
    pub fn parse(dotted: &str) -> Self {
        QualifiedName {
            segments: dotted.split('.').map(Name::new).collect(),
            span: Span::null(),
            symbol: OnceCell::new(),
        }
    }

    pub fn last(&self) -> Option<&Name> {
        self.segments.last()
    }
}

impl Display for QualifiedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joined = self
            .segments
            .iter()
            .map(|segment| segment.value.as_str())
            .collect::<Vec<&str>>()
            .join(".");
        write!(f, "{}", joined)
    }
}

// CONSTRUCTORS

impl Expr {
    pub fn new(kind: ExprKind) -> Self {
        Expr {
            kind,
            span: Span::null(),
            eval_type: OnceCell::new(),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// The type assigned by the type checker, if it ran.
    pub fn get_type(&self) -> Option<&TypeRef> {
        self.eval_type.get()
    }

    pub fn int(value: i32) -> Self {
        Expr::new(ExprKind::Literal(Literal::Int(value)))
    }

    pub fn string(value: &str) -> Self {
        Expr::new(ExprKind::Literal(Literal::String(value.to_string())))
    }

    pub fn boolean(value: bool) -> Self {
        Expr::new(ExprKind::Literal(Literal::Boolean(value)))
    }

    pub fn null() -> Self {
        Expr::new(ExprKind::Literal(Literal::Null))
    }

    pub fn this() -> Self {
        Expr::new(ExprKind::This)
    }

    pub fn name(dotted: &str) -> Self {
        Expr::new(ExprKind::Name(QualifiedName::parse(dotted)))
    }

    pub fn unary(operator: UnaryOperator, operand: Expr) -> Self {
        Expr::new(ExprKind::Unary {
            operator,
            operand: Box::new(operand),
        })
    }

    pub fn binary(left: Expr, operator: BinaryOperator, right: Expr) -> Self {
        Expr::new(ExprKind::Binary {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn assign(target: Expr, value: Expr) -> Self {
        Expr::new(ExprKind::Assignment {
            target: Box::new(target),
            value: Box::new(value),
        })
    }

    /// A call whose callee is the dotted name `callee`.
    pub fn call(callee: &str, arguments: Vec<Expr>) -> Self {
        Expr::new(ExprKind::Call {
            callee: Box::new(Expr::name(callee)),
            arguments,
        })
    }

    pub fn new_object(class: &str, arguments: Vec<Expr>) -> Self {
        Expr::new(ExprKind::New {
            class: QualifiedName::parse(class),
            arguments,
        })
    }

    pub fn field(target: Expr, field: &str) -> Self {
        Expr::new(ExprKind::FieldAccess {
            target: Box::new(target),
            field: Name::new(field),
        })
    }

    pub fn index(target: Expr, index: Expr) -> Self {
        Expr::new(ExprKind::Index {
            target: Box::new(target),
            index: Box::new(index),
        })
    }
}
