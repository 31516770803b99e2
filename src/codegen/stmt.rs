use log::trace;

use crate::{
    ast::{
        expressions::ExprKind,
        statements::{ExpressionStmt, Stmt},
    },
    errors::errors::InternalError,
    symbols::symbol_table::{Storage, SymbolDetails},
};

use super::{
    codegen::{declared, CodeGenerator},
    expr::{gen_assignment, gen_expression, has_value},
};

pub fn gen_statement(generator: &mut CodeGenerator, statement: &Stmt) -> Result<(), InternalError> {
    match statement {
        Stmt::Block(block) => {
            for statement in block.iter() {
                gen_statement(generator, statement)?;
            }
        }
        Stmt::Expression(expression_stmt) => gen_expression_statement(generator, expression_stmt)?,
        Stmt::LocalDecl(decl) => {
            for declarator in decl.declarators.iter() {
                let Some(initializer) = &declarator.initializer else {
                    continue;
                };
                let symbol = declared(&declarator.symbol, "variable", &declarator.name.value)?;
                let SymbolDetails::Variable {
                    storage: Storage::Local(index),
                    ..
                } = &symbol.details
                else {
                    return Err(InternalError::UnexpectedNode {
                        context: "a local declaration",
                        found: "non-local symbol",
                    });
                };
                gen_expression(generator, initializer)?;
                generator.emit(&format!("stloc {}", index));
            }
        }
        Stmt::If(if_stmt) => {
            let end_label = generator.new_label("END_IF");
            gen_expression(generator, &if_stmt.condition)?;

            match &if_stmt.else_body {
                Some(else_body) => {
                    let else_label = generator.new_label("ELSE");
                    generator.emit(&format!("brfalse {}", else_label));
                    gen_statement(generator, &if_stmt.then_body)?;
                    generator.emit(&format!("br {}", end_label));
                    generator.emit_label(&else_label);
                    gen_statement(generator, else_body)?;
                }
                None => {
                    generator.emit(&format!("brfalse {}", end_label));
                    gen_statement(generator, &if_stmt.then_body)?;
                }
            }
            generator.emit_label(&end_label);
        }
        Stmt::While(while_stmt) => {
            let loop_label = generator.new_label("LOOP");
            let end_label = generator.new_label("END_LOOP");

            generator.emit_label(&loop_label);
            gen_expression(generator, &while_stmt.condition)?;
            generator.emit(&format!("brfalse {}", end_label));
            gen_statement(generator, &while_stmt.body)?;
            generator.emit(&format!("br {}", loop_label));
            generator.emit_label(&end_label);
        }
        Stmt::Return(return_stmt) => {
            if let Some(value) = &return_stmt.value {
                gen_expression(generator, value)?;
            }
            generator.emit("ret");
        }
        Stmt::Empty(_) => {}
    }
    Ok(())
}

/// Evaluates an expression and discards whatever value it left on the stack.
fn gen_expression_statement(
    generator: &mut CodeGenerator,
    statement: &ExpressionStmt,
) -> Result<(), InternalError> {
    let expression = &statement.expression;
    trace!("Generating {} statement", expression.kind.describe());

    if let ExprKind::Assignment { target, value } = &expression.kind {
        return gen_assignment(generator, target, value, false);
    }

    gen_expression(generator, expression)?;
    if has_value(expression)? {
        generator.emit("pop");
    }
    Ok(())
}
