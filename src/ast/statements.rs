use std::{cell::OnceCell, slice::Iter};

use crate::Span;

use super::{ast::VarDecl, expressions::Expr, types::TypeRef};

#[derive(Debug)]
pub enum Stmt {
    Block(Block),
    Expression(ExpressionStmt),
    LocalDecl(VarDecl),
    If(IfStmt),
    While(WhileStmt),
    Return(ReturnStmt),
    Empty(Span),
}

impl Stmt {
    pub fn get_span(&self) -> &Span {
        match self {
            Stmt::Block(block) => &block.span,
            Stmt::Expression(stmt) => &stmt.span,
            Stmt::LocalDecl(decl) => &decl.span,
            Stmt::If(stmt) => &stmt.span,
            Stmt::While(stmt) => &stmt.span,
            Stmt::Return(stmt) => &stmt.span,
            Stmt::Empty(span) => span,
        }
    }

    pub fn expr(expression: Expr) -> Self {
        Stmt::Expression(ExpressionStmt::new(expression))
    }

    pub fn local(decl: VarDecl) -> Self {
        Stmt::LocalDecl(decl)
    }

    pub fn block(statements: Vec<Stmt>) -> Self {
        Stmt::Block(Block::new(statements))
    }

    pub fn if_(condition: Expr, then_body: Stmt, else_body: Option<Stmt>) -> Self {
        Stmt::If(IfStmt {
            condition,
            then_body: Box::new(then_body),
            else_body: else_body.map(Box::new),
            span: Span::null(),
        })
    }

    pub fn while_(condition: Expr, body: Stmt) -> Self {
        Stmt::While(WhileStmt {
            condition,
            body: Box::new(body),
            span: Span::null(),
        })
    }

    pub fn return_(value: Option<Expr>) -> Self {
        Stmt::Return(ReturnStmt {
            value,
            span: Span::null(),
        })
    }
}

/// A braced statement list. Blocks do not open scopes: every local of a method
/// lives in the method's scope.
#[derive(Debug)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub span: Span,
}

impl Block {
    pub fn new(statements: Vec<Stmt>) -> Self {
        Block {
            statements,
            span: Span::null(),
        }
    }

    pub fn iter(&self) -> Iter<'_, Stmt> {
        self.statements.iter()
    }
}

/// Evaluates an expression for its side effects. Carries the type of its child.
#[derive(Debug)]
pub struct ExpressionStmt {
    pub expression: Expr,
    pub span: Span,
    pub eval_type: OnceCell<TypeRef>,
}

impl ExpressionStmt {
    pub fn new(expression: Expr) -> Self {
        ExpressionStmt {
            span: expression.span.clone(),
            expression,
            eval_type: OnceCell::new(),
        }
    }
}

#[derive(Debug)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_body: Box<Stmt>,
    pub else_body: Option<Box<Stmt>>,
    pub span: Span,
}

#[derive(Debug)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: Box<Stmt>,
    pub span: Span,
}

#[derive(Debug)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub span: Span,
}
