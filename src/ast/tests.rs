//! Unit tests for the node model and the type representations.

use crate::{
    ast::{
        ast::{accessor, is_static, Accessor, ClassDecl, Modifier},
        expressions::{BinaryOperator, Expr, ExprKind, QualifiedName},
        types::{same_signature, BuiltinType, Category, TypeNode, TypeRef},
    },
    symbols::symbol_table::{SymbolDetails, SymbolTable},
    Position,
};

#[test]
fn test_qualified_name_parse() {
    let name = QualifiedName::parse("System.Write");
    assert_eq!(name.segments.len(), 2);
    assert_eq!(name.segments[0].value, "System");
    assert_eq!(name.last().unwrap().value, "Write");
    assert_eq!(name.to_string(), "System.Write");
}

#[test]
fn test_type_node_same_as_ignores_spans() {
    let file = std::rc::Rc::new(String::from("Main.java"));
    let a = TypeNode::Builtin(BuiltinType::Int, crate::Span::new(1, 4, &file));
    let b = TypeNode::int();
    assert!(a.same_as(&b));
    assert!(!a.same_as(&TypeNode::string()));
    assert!(TypeNode::named("Main.Inner").same_as(&TypeNode::named("Main.Inner")));
    assert!(!TypeNode::named("Main.Inner").same_as(&TypeNode::named("Inner")));
    assert!(TypeNode::array(TypeNode::int()).same_as(&TypeNode::array(TypeNode::int())));
}

#[test]
fn test_same_signature_is_order_and_arity_sensitive() {
    let int_string = vec![TypeNode::int(), TypeNode::string()];
    let string_int = vec![TypeNode::string(), TypeNode::int()];
    assert!(same_signature(&int_string, &int_string.clone()));
    assert!(!same_signature(&int_string, &string_int));
    assert!(!same_signature(&int_string, &[TypeNode::int()]));
    assert!(same_signature(&[], &[]));
}

#[test]
fn test_type_ref_builtin_equality() {
    assert_eq!(TypeRef::Int, TypeRef::Int);
    assert_ne!(TypeRef::Int, TypeRef::String);
    assert_ne!(TypeRef::Null, TypeRef::Object);
    assert_eq!(TypeRef::from(BuiltinType::Boolean), TypeRef::Boolean);
    assert_eq!(TypeRef::Error.category(), Category::Error);
}

#[test]
fn test_type_ref_class_equality_uses_symbol() {
    let mut table = SymbolTable::new();
    let class = |table: &mut SymbolTable, name: &str| {
        table.create_symbol(
            name,
            SymbolDetails::Class {
                path: vec![name.to_string()],
                modifiers: vec![],
                builtin: false,
            },
            None,
            Position::null(),
        )
    };
    let a = class(&mut table, "A");
    let b = class(&mut table, "A");

    assert_eq!(TypeRef::Class(a.clone()), TypeRef::Class(a.clone()));
    assert_ne!(TypeRef::Class(a.clone()), TypeRef::Class(b));
    assert_ne!(TypeRef::Class(a), TypeRef::Object);
}

#[test]
fn test_type_ref_value_and_conversion() {
    assert!(TypeRef::Int.is_value());
    assert!(!TypeRef::Void.is_value());
    assert!(!TypeRef::Declaration.is_value());
    assert!(TypeRef::String.is_convertible_to(&TypeRef::String));
    assert!(!TypeRef::Null.is_convertible_to(&TypeRef::String));
    assert!(TypeRef::Error.is_error());
}

#[test]
fn test_type_display() {
    assert_eq!(TypeRef::Boolean.to_string(), "boolean");
    assert_eq!(TypeNode::array(TypeNode::named("Main")).to_string(), "Main[]");
    assert_eq!(TypeNode::void().to_string(), "void");
}

#[test]
fn test_modifier_helpers() {
    assert!(is_static(&[Modifier::Public, Modifier::Static]));
    assert!(!is_static(&[Modifier::Public]));
    assert_eq!(accessor(&[Modifier::Public]), Accessor::Public);
    assert_eq!(accessor(&[]), Accessor::Private);
}

#[test]
fn test_expression_constructors() {
    let expr = Expr::binary(Expr::int(1), BinaryOperator::Add, Expr::name("x"));
    assert!(expr.get_type().is_none());
    match &expr.kind {
        ExprKind::Binary { operator, .. } => {
            assert_eq!(*operator, BinaryOperator::Add);
            assert!(!operator.is_comparison());
        }
        other => panic!("Expected binary expression, found {}", other.describe()),
    }
    assert!(BinaryOperator::LessEqual.is_comparison());
}

#[test]
fn test_class_constructor() {
    let class = ClassDecl::new("Main", &[Modifier::Public], vec![]);
    assert_eq!(class.name.value, "Main");
    assert!(class.base.is_none());
    assert!(class.symbol.get().is_none());
}
