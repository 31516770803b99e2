use std::collections::{HashMap, HashSet};

use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    ast::types::{Category, TypeRef},
    errors::errors::InternalError,
    symbols::symbol_table::{Symbol, SymbolDetails},
};

lazy_static! {
    /// Assembly spelling of every type category the language can emit.
    pub static ref ASSEMBLY_TYPES: HashMap<Category, &'static str> = {
        let mut map = HashMap::new();
        map.insert(Category::Int, "int32");
        map.insert(Category::String, "string");
        map.insert(Category::Object, "object");
        map.insert(Category::Boolean, "bool");
        map.insert(Category::Void, "void");
        map.insert(Category::This, "object");
        map
    };

    /// Assembler keywords that cannot appear unquoted as a name.
    static ref RESERVED_NAMES: HashSet<&'static str> = [
        "add", "and", "assembly", "auto", "bool", "br", "call", "cil", "class", "ctor",
        "div", "dup", "entrypoint", "extends", "extern", "field", "instance", "int32",
        "locals", "managed", "method", "module", "neg", "nested", "newobj", "not", "object",
        "or", "pop", "private", "public", "rem", "ret", "static", "string", "sub", "value",
        "void",
    ]
    .into_iter()
    .collect();

    static ref PLAIN_NAME: Option<Regex> = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").ok();
}

/// Writes `name` so the assembler reads it as a single identifier, single-quoting
/// anything that is not a plain identifier or collides with a keyword.
pub fn quote_name(name: &str) -> String {
    let plain = PLAIN_NAME
        .as_ref()
        .map(|pattern| pattern.is_match(name))
        .unwrap_or(false);

    if plain && !RESERVED_NAMES.contains(name) {
        name.to_string()
    } else {
        format!("'{}'", name.replace('\\', "\\\\").replace('\'', "\\'"))
    }
}

/// `Outer/Inner` style reference to a class declared in this module.
pub fn class_reference(path: &[String]) -> String {
    path.iter()
        .map(|segment| quote_name(segment))
        .collect::<Vec<String>>()
        .join("/")
}

/// The class reference for a class symbol.
pub fn class_symbol_reference(symbol: &Symbol) -> Result<String, InternalError> {
    match &symbol.details {
        SymbolDetails::Class { path, .. } => Ok(class_reference(path)),
        _ => Err(InternalError::UnexpectedNode {
            context: "a class reference",
            found: "non-class symbol",
        }),
    }
}

/// Translates a resolved type into its assembly spelling.
///
/// Types without a runtime representation, such as the `null` literal's type or
/// the `error` type, are rejected.
pub fn assembly_type(type_: &TypeRef) -> Result<String, InternalError> {
    if let TypeRef::Class(symbol) = type_ {
        return Ok(format!("class {}", class_symbol_reference(symbol)?));
    }

    ASSEMBLY_TYPES
        .get(&type_.category())
        .map(|name| name.to_string())
        .ok_or_else(|| InternalError::UnsupportedAssemblyType {
            type_: type_.to_string(),
        })
}

/// Escapes a string literal for `ldstr`.
pub fn string_literal(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    escaped.push('"');
    for character in value.chars() {
        match character {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            other => escaped.push(other),
        }
    }
    escaped.push('"');
    escaped
}
