use crate::{
    ast::{
        expressions::{BinaryOperator, Expr, ExprKind, Literal, QualifiedName, UnaryOperator},
        types::TypeRef,
    },
    errors::errors::InternalError,
    symbols::symbol_table::{Storage, Symbol, SymbolDetails},
};

use super::{
    assembly_types::{
        assembly_type, class_reference, class_symbol_reference, quote_name, string_literal,
    },
    codegen::{resolved_type, CodeGenerator},
};

fn eval_type(expr: &Expr) -> Result<&TypeRef, InternalError> {
    expr.get_type().ok_or_else(|| InternalError::Unresolved {
        stage: "code generation",
        what: "type",
        name: expr.kind.describe().to_string(),
    })
}

fn bound_symbol(name: &QualifiedName) -> Result<&Symbol, InternalError> {
    name.symbol
        .get()
        .map(|symbol| symbol.as_ref())
        .ok_or_else(|| InternalError::Unresolved {
            stage: "code generation",
            what: "symbol",
            name: name.to_string(),
        })
}

/// Whether evaluating `expr` leaves a value on the stack.
pub fn has_value(expr: &Expr) -> Result<bool, InternalError> {
    Ok(eval_type(expr)?.is_value())
}

/// Generates the instructions for `expression`, leaving its value on the stack if
/// it has one.
pub fn gen_expression(
    generator: &mut CodeGenerator,
    expression: &Expr,
) -> Result<(), InternalError> {
    match &expression.kind {
        ExprKind::Literal(literal) => match literal {
            Literal::Int(value) => generator.emit(&format!("ldc.i4 {}", value)),
            Literal::String(value) => generator.emit(&format!("ldstr {}", string_literal(value))),
            Literal::Boolean(true) => generator.emit("ldc.i4.1"),
            Literal::Boolean(false) => generator.emit("ldc.i4.0"),
            Literal::Null => generator.emit("ldnull"),
        },
        ExprKind::This => {
            load_this(generator, "`this`")?;
        }
        ExprKind::Name(name) => {
            let symbol = bound_symbol(name)?;
            // Classes and functions named on their own push nothing.
            if let SymbolDetails::Variable { .. } = symbol.details {
                gen_load(generator, symbol)?;
            }
        }
        ExprKind::Unary { operator, operand } => {
            gen_expression(generator, operand)?;
            match operator {
                UnaryOperator::Negate => generator.emit("neg"),
                UnaryOperator::Not => {
                    generator.emit("ldc.i4.0");
                    generator.emit("ceq");
                }
            }
        }
        ExprKind::Binary {
            operator,
            left,
            right,
        } => {
            gen_expression(generator, left)?;
            gen_expression(generator, right)?;
            gen_operator(generator, *operator, eval_type(left)?)?;
        }
        ExprKind::Assignment { target, value } => gen_assignment(generator, target, value, true)?,
        ExprKind::Call { callee, arguments } => gen_call(generator, callee, arguments)?,
        ExprKind::New { class, .. } => {
            let reference = class_symbol_reference(bound_symbol(class)?)?;
            generator.emit(&format!("newobj instance void {}::.ctor()", reference));
        }
        ExprKind::FieldAccess { .. } | ExprKind::Index { .. } => {
            return Err(InternalError::UnexpectedNode {
                context: "generated code",
                found: expression.kind.describe(),
            })
        }
    }
    Ok(())
}

fn load_this(generator: &mut CodeGenerator, found: &'static str) -> Result<(), InternalError> {
    if !generator.has_this {
        return Err(InternalError::UnexpectedNode {
            context: "a static method",
            found,
        });
    }
    generator.emit("ldarg.0");
    Ok(())
}

fn argument_index(generator: &CodeGenerator, index: u16) -> u32 {
    u32::from(index) + u32::from(generator.has_this)
}

/// `type Owner::name` operand of the field instructions.
fn field_reference(symbol: &Symbol, owner: &[String]) -> Result<String, InternalError> {
    Ok(format!(
        "{} {}::{}",
        assembly_type(resolved_type(symbol)?)?,
        class_reference(owner),
        quote_name(&symbol.name)
    ))
}

fn gen_load(generator: &mut CodeGenerator, symbol: &Symbol) -> Result<(), InternalError> {
    let SymbolDetails::Variable { storage, .. } = &symbol.details else {
        return Ok(());
    };
    match storage {
        Storage::Local(index) => generator.emit(&format!("ldloc {}", index)),
        Storage::Parameter(index) => {
            let index = argument_index(generator, *index);
            generator.emit(&format!("ldarg {}", index));
        }
        Storage::Field {
            is_static: true,
            owner,
        } => generator.emit(&format!("ldsfld {}", field_reference(symbol, owner)?)),
        Storage::Field {
            is_static: false,
            owner,
        } => {
            load_this(generator, "instance field")?;
            generator.emit(&format!("ldfld {}", field_reference(symbol, owner)?));
        }
    }
    Ok(())
}

/// Stores `value` into `target`, leaving a copy of the value on the stack when
/// `keep_value` is set.
pub fn gen_assignment(
    generator: &mut CodeGenerator,
    target: &Expr,
    value: &Expr,
    keep_value: bool,
) -> Result<(), InternalError> {
    let ExprKind::Name(name) = &target.kind else {
        return Err(InternalError::UnexpectedNode {
            context: "an assignment target in generated code",
            found: target.kind.describe(),
        });
    };
    let symbol = bound_symbol(name)?;
    let SymbolDetails::Variable { storage, .. } = &symbol.details else {
        return Err(InternalError::UnexpectedNode {
            context: "an assignment target",
            found: "declaration name",
        });
    };

    if let Storage::Field {
        is_static: false,
        owner,
    } = storage
    {
        let reference = field_reference(symbol, owner)?;
        load_this(generator, "instance field")?;
        gen_expression(generator, value)?;
        generator.emit(&format!("stfld {}", reference));
        if keep_value {
            generator.emit("ldarg.0");
            generator.emit(&format!("ldfld {}", reference));
        }
        return Ok(());
    }

    gen_expression(generator, value)?;
    if keep_value {
        generator.emit("dup");
    }
    match storage {
        Storage::Local(index) => generator.emit(&format!("stloc {}", index)),
        Storage::Parameter(index) => {
            let index = argument_index(generator, *index);
            generator.emit(&format!("starg {}", index));
        }
        Storage::Field { owner, .. } => {
            generator.emit(&format!("stsfld {}", field_reference(symbol, owner)?))
        }
    }
    Ok(())
}

fn gen_operator(
    generator: &mut CodeGenerator,
    operator: BinaryOperator,
    operand_type: &TypeRef,
) -> Result<(), InternalError> {
    if *operand_type == TypeRef::String {
        let string = generator.runtime_type("System.String");
        match operator {
            BinaryOperator::Add => {
                generator.emit(&format!("call string {}::Concat(string, string)", string));
                return Ok(());
            }
            BinaryOperator::Equal => {
                generator.emit(&format!("call bool {}::op_Equality(string, string)", string));
                return Ok(());
            }
            BinaryOperator::NotEqual => {
                generator.emit(&format!("call bool {}::op_Inequality(string, string)", string));
                return Ok(());
            }
            _ if operator.is_comparison() => {
                // Ordering compares the ordinal difference against zero.
                generator.emit(&format!(
                    "call int32 {}::CompareOrdinal(string, string)",
                    string
                ));
                generator.emit("ldc.i4.0");
            }
            _ => {
                return Err(InternalError::UnexpectedNode {
                    context: "a string operation",
                    found: "arithmetic operator",
                })
            }
        }
    }

    match operator {
        BinaryOperator::Add => generator.emit("add"),
        BinaryOperator::Subtract => generator.emit("sub"),
        BinaryOperator::Multiply => generator.emit("mul"),
        BinaryOperator::Divide => generator.emit("div"),
        BinaryOperator::Remainder => generator.emit("rem"),
        BinaryOperator::And => generator.emit("and"),
        BinaryOperator::Or => generator.emit("or"),
        BinaryOperator::Equal => generator.emit("ceq"),
        BinaryOperator::Less => generator.emit("clt"),
        BinaryOperator::Greater => generator.emit("cgt"),
        BinaryOperator::NotEqual => {
            generator.emit("ceq");
            negate(generator);
        }
        BinaryOperator::LessEqual => {
            generator.emit("cgt");
            negate(generator);
        }
        BinaryOperator::GreaterEqual => {
            generator.emit("clt");
            negate(generator);
        }
    }
    Ok(())
}

fn negate(generator: &mut CodeGenerator) {
    generator.emit("ldc.i4.0");
    generator.emit("ceq");
}

fn gen_call(
    generator: &mut CodeGenerator,
    callee: &Expr,
    arguments: &[Expr],
) -> Result<(), InternalError> {
    let ExprKind::Name(name) = &callee.kind else {
        return Err(InternalError::UnexpectedNode {
            context: "a callee in generated code",
            found: callee.kind.describe(),
        });
    };
    let function = bound_symbol(name)?;
    let SymbolDetails::Function { owner, .. } = &function.details else {
        return Err(InternalError::UnexpectedNode {
            context: "a callee",
            found: "non-function symbol",
        });
    };

    let parameter_types = function
        .resolved_parameters()
        .ok_or_else(|| InternalError::Unresolved {
            stage: "code generation",
            what: "signature",
            name: function.name.clone(),
        })?
        .iter()
        .map(assembly_type)
        .collect::<Result<Vec<String>, InternalError>>()?
        .join(", ");
    let return_type = assembly_type(resolved_type(function)?)?;

    if let Some(intrinsic) = function.intrinsic() {
        for argument in arguments.iter() {
            gen_expression(generator, argument)?;
        }
        let console = generator.runtime_type("System.Console");
        generator.emit(&format!(
            "call {} {}::{}({})",
            return_type,
            console,
            intrinsic.routine(),
            parameter_types
        ));
        return Ok(());
    }

    let is_static = generator.is_static_method(function);
    if !is_static {
        load_this(generator, "instance method call")?;
    }
    for argument in arguments.iter() {
        gen_expression(generator, argument)?;
    }
    generator.emit(&format!(
        "call {}{} {}::{}({})",
        if is_static { "" } else { "instance " },
        return_type,
        class_reference(owner),
        quote_name(&function.name),
        parameter_types
    ));
    Ok(())
}
