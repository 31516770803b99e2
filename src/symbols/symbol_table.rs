use std::{cell::OnceCell, collections::HashMap, fmt::Display, rc::Rc};

use log::trace;
use thiserror::Error;

use crate::{
    ast::{
        ast::{is_static, Modifier},
        types::{TypeNode, TypeRef},
    },
    Position,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Class,
    Function,
    Variable,
}

impl Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SymbolKind::Class => write!(f, "class"),
            SymbolKind::Function => write!(f, "function"),
            SymbolKind::Variable => write!(f, "variable"),
        }
    }
}

/// The console routines the language exposes as `System.Write` and
/// `System.WriteLine`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intrinsic {
    Write,
    WriteLine,
}

impl Intrinsic {
    pub fn routine(&self) -> &'static str {
        match self {
            Intrinsic::Write => "Write",
            Intrinsic::WriteLine => "WriteLine",
        }
    }
}

/// Where a variable lives at run time.
#[derive(Debug, Clone, PartialEq)]
pub enum Storage {
    /// Index into the method's locals.
    Local(u16),
    /// Position in the declared parameter list.
    Parameter(u16),
    /// A class-level field of the class at `owner`.
    Field { is_static: bool, owner: Vec<String> },
}

#[derive(Debug, Clone)]
pub enum SymbolDetails {
    Class {
        /// Names from the outermost class down to this one.
        path: Vec<String>,
        modifiers: Vec<Modifier>,
        builtin: bool,
    },
    Function {
        parameters: Vec<TypeNode>,
        return_type: TypeNode,
        modifiers: Vec<Modifier>,
        /// Path of the class declaring the function.
        owner: Vec<String>,
        intrinsic: Option<Intrinsic>,
    },
    Variable {
        type_node: TypeNode,
        storage: Storage,
    },
}

/// The record created for every declared name.
///
/// Symbols are shared between the scope that binds them and the declaration node
/// they describe. Apart from the resolved types, which are filled in once by the
/// type checker, they never change after construction.
#[derive(Debug)]
pub struct Symbol {
    pub id: SymbolId,
    pub name: String,
    /// The scope the symbol is bound in.
    pub declared_in: ScopeId,
    /// The scope opened by the declaration's body (classes and functions).
    pub scope: Option<ScopeId>,
    pub position: Position,
    pub details: SymbolDetails,
    resolved_type: OnceCell<TypeRef>,
    resolved_parameters: OnceCell<Vec<TypeRef>>,
}

impl Symbol {
    pub fn kind(&self) -> SymbolKind {
        match self.details {
            SymbolDetails::Class { .. } => SymbolKind::Class,
            SymbolDetails::Function { .. } => SymbolKind::Function,
            SymbolDetails::Variable { .. } => SymbolKind::Variable,
        }
    }

    /// Whether a function or field is `static`. Classes and locals count as static.
    pub fn is_static(&self) -> bool {
        match &self.details {
            SymbolDetails::Function { modifiers, .. } => is_static(modifiers),
            SymbolDetails::Variable {
                storage: Storage::Field { is_static, .. },
                ..
            } => *is_static,
            _ => true,
        }
    }

    pub fn intrinsic(&self) -> Option<Intrinsic> {
        match &self.details {
            SymbolDetails::Function { intrinsic, .. } => *intrinsic,
            _ => None,
        }
    }

    /// The variable's type, or the function's return type.
    pub fn resolved_type(&self) -> Option<&TypeRef> {
        self.resolved_type.get()
    }

    /// Records the resolved type. Returns `false` if one was already recorded.
    pub fn set_resolved_type(&self, type_: TypeRef) -> bool {
        self.resolved_type.set(type_).is_ok()
    }

    pub fn resolved_parameters(&self) -> Option<&[TypeRef]> {
        self.resolved_parameters.get().map(|parameters| parameters.as_slice())
    }

    pub fn set_resolved_parameters(&self, parameters: Vec<TypeRef>) -> bool {
        self.resolved_parameters.set(parameters).is_ok()
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind} {name:?} is already declared in this scope")]
pub struct AlreadyDeclared {
    pub name: String,
    pub kind: SymbolKind,
}

#[derive(Debug)]
pub struct Scope {
    pub name: String,
    pub parent: Option<ScopeId>,
    bindings: HashMap<String, Vec<Rc<Symbol>>>,
}

impl Scope {
    fn new(name: &str, parent: Option<ScopeId>) -> Self {
        Scope {
            name: name.to_string(),
            parent,
            bindings: HashMap::new(),
        }
    }

    /// The symbols bound to `name` at this level only.
    pub fn get(&self, name: &str) -> &[Rc<Symbol>] {
        self.bindings
            .get(name)
            .map(|symbols| symbols.as_slice())
            .unwrap_or(&[])
    }
}

/// The tree of scopes for one compilation unit.
///
/// Scopes live in an arena and refer to their parent by id. The table keeps a
/// current scope that `declare`, `lookup` and `lookup_local` operate on; creating
/// a scope does not switch to it.
#[derive(Debug)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
    current: ScopeId,
    next_symbol: usize,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    /// Creates a table holding only the empty compilation-unit scope.
    pub fn new() -> Self {
        SymbolTable {
            scopes: vec![Scope::new("<compilation-unit>", None)],
            current: ScopeId(0),
            next_symbol: 0,
        }
    }

    /// Creates a table whose root scope already declares the builtin `System` class
    /// with its console routines.
    pub fn with_builtins() -> Self {
        let mut table = SymbolTable::new();
        let root = table.root();
        let system_scope = table.enter_scope("System");
        let system = table.create_symbol(
            "System",
            SymbolDetails::Class {
                path: vec![String::from("System")],
                modifiers: vec![Modifier::Public, Modifier::Static],
                builtin: true,
            },
            Some(system_scope),
            Position::null(),
        );
        let declared = table.declare(system);
        debug_assert!(declared.is_ok(), "builtin `System` collided in a fresh table");

        table.set_current(system_scope);
        for intrinsic in [Intrinsic::Write, Intrinsic::WriteLine] {
            for parameter in [TypeNode::string(), TypeNode::int()] {
                let function = table.create_symbol(
                    intrinsic.routine(),
                    SymbolDetails::Function {
                        parameters: vec![parameter],
                        return_type: TypeNode::void(),
                        modifiers: vec![Modifier::Public, Modifier::Static],
                        owner: vec![String::from("System")],
                        intrinsic: Some(intrinsic),
                    },
                    None,
                    Position::null(),
                );
                let declared = table.declare(function);
                debug_assert!(
                    declared.is_ok(),
                    "builtin `System.{}` declared twice",
                    intrinsic.routine()
                );
            }
        }
        table.set_current(root);

        table
    }

    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    pub fn current(&self) -> ScopeId {
        self.current
    }

    pub fn set_current(&mut self, scope: ScopeId) {
        self.current = scope;
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0]
    }

    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    /// Creates a child of the current scope. The current scope is left unchanged.
    pub fn enter_scope(&mut self, name: &str) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        trace!("Opening scope `{}` under `{}`", name, self.scope(self.current).name);
        self.scopes.push(Scope::new(name, Some(self.current)));
        id
    }

    /// Allocates a symbol bound to the current scope. It is not visible until
    /// passed to [`SymbolTable::declare`].
    pub fn create_symbol(
        &mut self,
        name: &str,
        details: SymbolDetails,
        scope: Option<ScopeId>,
        position: Position,
    ) -> Rc<Symbol> {
        let id = SymbolId(self.next_symbol);
        self.next_symbol += 1;
        Rc::new(Symbol {
            id,
            name: name.to_string(),
            declared_in: self.current,
            scope,
            position,
            details,
            resolved_type: OnceCell::new(),
            resolved_parameters: OnceCell::new(),
        })
    }

    /// Binds `symbol` in the current scope.
    ///
    /// Functions may share a name with other functions (overloads); checking that
    /// their signatures differ is up to the caller. Any other combination of equal
    /// names at the same level is rejected.
    pub fn declare(&mut self, symbol: Rc<Symbol>) -> Result<(), AlreadyDeclared> {
        let current = self.current;
        let scope = &mut self.scopes[current.0];
        let existing = scope.bindings.entry(symbol.name.clone()).or_default();

        let overloads = symbol.kind() == SymbolKind::Function
            && existing.iter().all(|other| other.kind() == SymbolKind::Function);
        if !existing.is_empty() && !overloads {
            return Err(AlreadyDeclared {
                name: symbol.name.clone(),
                kind: symbol.kind(),
            });
        }

        trace!("Declaring {} `{}` in `{}`", symbol.kind(), symbol.name, scope.name);
        existing.push(symbol);
        Ok(())
    }

    /// All symbols visible for `name` from the current scope.
    pub fn lookup(&self, name: &str) -> Vec<Rc<Symbol>> {
        self.lookup_from(self.current, name)
    }

    /// All symbols visible for `name` from `scope`.
    ///
    /// Walks outward and stops at the first level binding the name at all, so an
    /// inner declaration hides every outer symbol of that name, overloads included.
    pub fn lookup_from(&self, scope: ScopeId, name: &str) -> Vec<Rc<Symbol>> {
        let mut next = Some(scope);
        while let Some(id) = next {
            let scope = self.scope(id);
            let found = scope.get(name);
            if !found.is_empty() {
                return found.to_vec();
            }
            next = scope.parent;
        }
        vec![]
    }

    /// The symbols of `kind` bound to `name` in the current scope only.
    pub fn lookup_local(&self, name: &str, kind: SymbolKind) -> Vec<Rc<Symbol>> {
        self.members(self.current, name)
            .into_iter()
            .filter(|symbol| symbol.kind() == kind)
            .collect()
    }

    /// Every symbol bound to `name` at exactly `scope`, without walking outward.
    pub fn members(&self, scope: ScopeId, name: &str) -> Vec<Rc<Symbol>> {
        self.scope(scope).get(name).to_vec()
    }
}
