//! Unit tests for error handling.
//!
//! This module contains tests for error types and error reporting.

use crate::errors::diagnostics::Diagnostics;
use crate::errors::errors::{Error, ErrorImpl, ErrorKind, ErrorTip, InternalError};
use crate::Position;
use std::rc::Rc;

#[test]
fn test_error_creation() {
    let error = Error::new(
        ErrorImpl::UndeclaredIdentifier {
            identifier: "y".to_string(),
        },
        Position(10, Rc::new("Main.java".to_string())),
    );

    assert_eq!(error.get_error_name(), "UndeclaredIdentifier");
    assert_eq!(error.kind(), ErrorKind::UndeclaredIdentifier);
}

#[test]
fn test_error_position() {
    let pos = Position(42, Rc::new("Main.java".to_string()));
    let error = Error::new(
        ErrorImpl::DuplicateClassDecl {
            class: "Main".to_string(),
        },
        pos.clone(),
    );

    assert_eq!(error.get_position().0, 42);
    assert_eq!(error.get_position(), &pos);
}

#[test]
fn test_error_context() {
    let error = Error::new(
        ErrorImpl::VariableAlreadyDeclared {
            variable: "x".to_string(),
        },
        Position::null(),
    );
    assert_eq!(error.get_context(), Some("x".to_string()));

    let error = Error::new(
        ErrorImpl::BooleanExpected {
            received: "int".to_string(),
        },
        Position::null(),
    );
    assert_eq!(error.get_context(), None);
}

#[test]
fn test_incompatible_assignment_error() {
    let error = Error::new(
        ErrorImpl::IncompatibleAssignment {
            expected: "int".to_string(),
            received: "string".to_string(),
        },
        Position::null(),
    );

    assert_eq!(error.get_error_name(), "IncompatibleAssignment");
    assert_eq!(
        error.get_tip().to_string(),
        "Expected type `int`, received `string`"
    );
}

#[test]
fn test_invalid_func_arg_error() {
    let error = Error::new(
        ErrorImpl::InvalidFuncArg {
            function: "f".to_string(),
            reason: "ambiguous call".to_string(),
        },
        Position::null(),
    );

    assert_eq!(error.get_error_name(), "InvalidFuncArg");
    assert_eq!(error.get_context(), Some("f".to_string()));
    assert!(error.get_tip().to_string().contains("ambiguous call"));
}

#[test]
fn test_error_display() {
    let error = Error::new(
        ErrorImpl::DuplicateParamName {
            parameter: "a".to_string(),
        },
        Position::null(),
    );

    assert_eq!(
        error.to_string(),
        "DuplicateParamName: parameter \"a\" declared twice"
    );
}

#[test]
fn test_error_tip_none() {
    let error = Error::new(
        ErrorImpl::FeatureNotImplemented {
            feature: "arrays".to_string(),
        },
        Position::null(),
    );

    assert!(matches!(error.get_tip(), ErrorTip::None));
    assert_eq!(error.get_context(), Some("arrays".to_string()));
}

#[test]
fn test_error_tip_display() {
    let tip = ErrorTip::Suggestion("Try this instead".to_string());
    assert_eq!(tip.to_string(), "Try this instead");

    let tip = ErrorTip::None;
    assert_eq!(tip.to_string(), "");
}

#[test]
fn test_diagnostics_preserve_order() {
    let mut diagnostics = Diagnostics::new();
    assert!(diagnostics.is_empty());

    diagnostics.report(
        ErrorImpl::UndeclaredIdentifier {
            identifier: "y".to_string(),
        },
        Position::null(),
    );
    diagnostics.report(
        ErrorImpl::BooleanExpected {
            received: "int".to_string(),
        },
        Position::null(),
    );
    diagnostics.report(
        ErrorImpl::UndeclaredIdentifier {
            identifier: "z".to_string(),
        },
        Position::null(),
    );

    assert_eq!(diagnostics.len(), 3);
    assert_eq!(
        diagnostics.kinds(),
        vec![
            ErrorKind::UndeclaredIdentifier,
            ErrorKind::BooleanExpected,
            ErrorKind::UndeclaredIdentifier
        ]
    );
    assert_eq!(diagnostics.count(ErrorKind::UndeclaredIdentifier), 2);
    assert_eq!(diagnostics.into_errors().len(), 3);
}

#[test]
fn test_internal_error_display() {
    let error = InternalError::MissingChild {
        node: "compilation unit",
        child: "class declaration",
    };
    assert_eq!(
        error.to_string(),
        "compilation unit is missing its class declaration"
    );

    let error = InternalError::UnsupportedAssemblyType {
        type_: "null".to_string(),
    };
    assert_eq!(error.to_string(), "type `null` has no assembly representation");
}
