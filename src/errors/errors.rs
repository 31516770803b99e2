use std::fmt::Display;

use thiserror::Error;

use crate::Position;

/// A recoverable semantic error in the user's program.
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
        }
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn get_impl(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn kind(&self) -> ErrorKind {
        match &self.internal_error {
            ErrorImpl::VariableAlreadyDeclared { .. } => ErrorKind::VariableAlreadyDeclared,
            ErrorImpl::DuplicateClassDecl { .. } => ErrorKind::DuplicateClassDecl,
            ErrorImpl::DuplicateFunctionDecl { .. } => ErrorKind::DuplicateFunctionDecl,
            ErrorImpl::DuplicateParamName { .. } => ErrorKind::DuplicateParamName,
            ErrorImpl::UndeclaredIdentifier { .. } => ErrorKind::UndeclaredIdentifier,
            ErrorImpl::IdentifierNotTypeName { .. } => ErrorKind::IdentifierNotTypeName,
            ErrorImpl::IncompatibleAssignment { .. } => ErrorKind::IncompatibleAssignment,
            ErrorImpl::IncompatibleOperands { .. } => ErrorKind::IncompatibleOperands,
            ErrorImpl::BooleanExpected { .. } => ErrorKind::BooleanExpected,
            ErrorImpl::InvalidFuncArg { .. } => ErrorKind::InvalidFuncArg,
            ErrorImpl::InconsistentModifiers { .. } => ErrorKind::InconsistentModifiers,
            ErrorImpl::FeatureNotImplemented { .. } => ErrorKind::FeatureNotImplemented,
        }
    }

    pub fn get_error_name(&self) -> &str {
        match self.kind() {
            ErrorKind::VariableAlreadyDeclared => "VariableAlreadyDeclared",
            ErrorKind::DuplicateClassDecl => "DuplicateClassDecl",
            ErrorKind::DuplicateFunctionDecl => "DuplicateFunctionDecl",
            ErrorKind::DuplicateParamName => "DuplicateParamName",
            ErrorKind::UndeclaredIdentifier => "UndeclaredIdentifier",
            ErrorKind::IdentifierNotTypeName => "IdentifierNotTypeName",
            ErrorKind::IncompatibleAssignment => "IncompatibleAssignment",
            ErrorKind::IncompatibleOperands => "IncompatibleOperands",
            ErrorKind::BooleanExpected => "BooleanExpected",
            ErrorKind::InvalidFuncArg => "InvalidFuncArg",
            ErrorKind::InconsistentModifiers => "InconsistentModifiers",
            ErrorKind::FeatureNotImplemented => "FeatureNotImplemented",
        }
    }

    /// The free-text context attached to the error, usually the offending identifier.
    pub fn get_context(&self) -> Option<String> {
        match &self.internal_error {
            ErrorImpl::VariableAlreadyDeclared { variable } => Some(variable.clone()),
            ErrorImpl::DuplicateClassDecl { class } => Some(class.clone()),
            ErrorImpl::DuplicateFunctionDecl { function } => Some(function.clone()),
            ErrorImpl::DuplicateParamName { parameter } => Some(parameter.clone()),
            ErrorImpl::UndeclaredIdentifier { identifier } => Some(identifier.clone()),
            ErrorImpl::IdentifierNotTypeName { identifier } => Some(identifier.clone()),
            ErrorImpl::IncompatibleAssignment { .. } => None,
            ErrorImpl::IncompatibleOperands { operator, .. } => Some(operator.clone()),
            ErrorImpl::BooleanExpected { .. } => None,
            ErrorImpl::InvalidFuncArg { function, .. } => Some(function.clone()),
            ErrorImpl::InconsistentModifiers { declaration, .. } => Some(declaration.clone()),
            ErrorImpl::FeatureNotImplemented { feature } => Some(feature.clone()),
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::VariableAlreadyDeclared { variable } => ErrorTip::Suggestion(format!(
                "Variable `{}` is already declared in this method",
                variable
            )),
            ErrorImpl::DuplicateClassDecl { class } => {
                ErrorTip::Suggestion(format!("Class `{}` already declared", class))
            }
            ErrorImpl::DuplicateFunctionDecl { function } => ErrorTip::Suggestion(format!(
                "Function `{}` with the same parameter types already declared",
                function
            )),
            ErrorImpl::DuplicateParamName { parameter } => {
                ErrorTip::Suggestion(format!("Parameter `{}` appears more than once", parameter))
            }
            ErrorImpl::UndeclaredIdentifier { identifier } => {
                ErrorTip::Suggestion(format!("`{}` is not declared", identifier))
            }
            ErrorImpl::IdentifierNotTypeName { identifier } => {
                ErrorTip::Suggestion(format!("`{}` does not name a class", identifier))
            }
            ErrorImpl::IncompatibleAssignment { expected, received } => ErrorTip::Suggestion(
                format!("Expected type `{}`, received `{}`", expected, received),
            ),
            ErrorImpl::IncompatibleOperands {
                operator,
                left,
                right,
            } => ErrorTip::Suggestion(format!(
                "Operator `{}` cannot combine `{}` and `{}`",
                operator, left, right
            )),
            ErrorImpl::BooleanExpected { received } => ErrorTip::Suggestion(format!(
                "Conditions must be `boolean`, received `{}`",
                received
            )),
            ErrorImpl::InvalidFuncArg { function, reason } => {
                ErrorTip::Suggestion(format!("Cannot call `{}`: {}", function, reason))
            }
            ErrorImpl::InconsistentModifiers {
                declaration,
                reason,
            } => ErrorTip::Suggestion(format!("`{}`: {}", declaration, reason)),
            ErrorImpl::FeatureNotImplemented { .. } => ErrorTip::None,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.get_error_name(), self.internal_error)
    }
}

/// The flat taxonomy of semantic errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    VariableAlreadyDeclared,
    DuplicateClassDecl,
    DuplicateFunctionDecl,
    DuplicateParamName,
    UndeclaredIdentifier,
    IdentifierNotTypeName,
    IncompatibleAssignment,
    IncompatibleOperands,
    BooleanExpected,
    InvalidFuncArg,
    InconsistentModifiers,
    FeatureNotImplemented,
}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    #[error("variable {variable:?} already declared")]
    VariableAlreadyDeclared { variable: String },
    #[error("class {class:?} already declared")]
    DuplicateClassDecl { class: String },
    #[error("function {function:?} already declared with this signature")]
    DuplicateFunctionDecl { function: String },
    #[error("parameter {parameter:?} declared twice")]
    DuplicateParamName { parameter: String },
    #[error("identifier {identifier:?} not declared")]
    UndeclaredIdentifier { identifier: String },
    #[error("identifier {identifier:?} is not a type name")]
    IdentifierNotTypeName { identifier: String },
    #[error("cannot assign {received} to {expected}")]
    IncompatibleAssignment { expected: String, received: String },
    #[error("incompatible operands for {operator:?}: {left} and {right}")]
    IncompatibleOperands {
        operator: String,
        left: String,
        right: String,
    },
    #[error("expected boolean, received {received}")]
    BooleanExpected { received: String },
    #[error("invalid arguments for {function:?}: {reason}")]
    InvalidFuncArg { function: String, reason: String },
    #[error("inconsistent modifiers on {declaration:?}: {reason}")]
    InconsistentModifiers { declaration: String, reason: String },
    #[error("{feature} is not implemented")]
    FeatureNotImplemented { feature: String },
}

/// A fatal failure caused by a malformed tree rather than by the user's program.
///
/// These abort the whole run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InternalError {
    #[error("{node} is missing its {child}")]
    MissingChild {
        node: &'static str,
        child: &'static str,
    },
    #[error("{found} cannot appear as {context}")]
    UnexpectedNode {
        context: &'static str,
        found: &'static str,
    },
    #[error("{what} of `{name}` was annotated twice")]
    AnnotationAlreadySet { what: &'static str, name: String },
    #[error("`{name}` reached {stage} without a resolved {what}")]
    Unresolved {
        stage: &'static str,
        what: &'static str,
        name: String,
    },
    #[error("type `{type_}` has no assembly representation")]
    UnsupportedAssemblyType { type_: String },
}
