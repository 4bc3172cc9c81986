//! Indexing domain models

use crate::shared::models::Span;
use petgraph::algo::has_path_connecting;
use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::{FxHashMap, FxHashSet};

/// Variables visible inside one function
#[derive(Debug, Clone, Default)]
pub struct FunctionScope {
    pub params: FxHashSet<String>,
    pub locals: FxHashSet<String>,
    /// params ∪ locals; the shadow check consults this set
    pub all_vars: FxHashSet<String>,
}

/// Signature and effect summary for one function definition
#[derive(Debug, Clone)]
pub struct FunctionInfo {
    pub name: String,
    pub span: Span,
    /// Ordered parameter names
    pub params: Vec<String>,
    pub param_types: FxHashMap<String, String>,
    /// Parameters with pointer or reference type
    pub pointer_params: FxHashSet<String>,
    /// Identifiers appearing in return statements
    pub return_vars: FxHashSet<String>,
    pub return_type: Option<String>,
    /// Global variables this function assigns
    pub modifies_globals: FxHashSet<String>,
    /// Pointer parameters the body may write through
    pub may_modify_params: FxHashSet<String>,
    /// Directly called function names
    pub calls: FxHashSet<String>,
    pub is_recursive: bool,
}

impl FunctionInfo {
    pub fn new(name: String, span: Span) -> Self {
        Self {
            name,
            span,
            params: Vec::new(),
            param_types: FxHashMap::default(),
            pointer_params: FxHashSet::default(),
            return_vars: FxHashSet::default(),
            return_type: None,
            modifies_globals: FxHashSet::default(),
            may_modify_params: FxHashSet::default(),
            calls: FxHashSet::default(),
            is_recursive: false,
        }
    }
}

/// All derived per-file facts. Lifetime is one analysis session; a new file
/// gets a freshly built index.
#[derive(Debug, Default)]
pub struct ProgramIndex {
    /// Top-level variable declarations
    pub globals: FxHashSet<String>,
    pub function_scopes: FxHashMap<String, FunctionScope>,
    pub struct_fields: FxHashMap<String, FxHashSet<String>>,
    /// Best-effort type string per declared variable
    pub type_table: FxHashMap<String, String>,
    pub functions: FxHashMap<String, FunctionInfo>,
    /// Transitively closed may-alias table, filled by the alias propagator
    pub pointer_aliases: FxHashMap<String, FxHashSet<String>>,
    call_graph: DiGraph<String, ()>,
    call_nodes: FxHashMap<String, NodeIndex>,
}

impl ProgramIndex {
    fn call_node(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.call_nodes.get(name) {
            return idx;
        }
        let idx = self.call_graph.add_node(name.to_string());
        self.call_nodes.insert(name.to_string(), idx);
        idx
    }

    /// Record a direct call edge
    pub fn add_call(&mut self, caller: &str, callee: &str) {
        let from = self.call_node(caller);
        let to = self.call_node(callee);
        if !self.call_graph.contains_edge(from, to) {
            self.call_graph.add_edge(from, to, ());
        }
    }

    /// A function is recursive iff it can reach itself through the call
    /// graph, directly or transitively (covers mutual recursion).
    pub fn is_recursive(&self, name: &str) -> bool {
        let Some(&idx) = self.call_nodes.get(name) else {
            return false;
        };
        self.call_graph
            .neighbors(idx)
            .any(|succ| succ == idx || has_path_connecting(&self.call_graph, succ, idx, None))
    }

    pub fn is_global(&self, name: &str) -> bool {
        self.globals.contains(name)
    }

    pub fn scope(&self, function: &str) -> Option<&FunctionScope> {
        self.function_scopes.get(function)
    }

    /// True iff the name resolves inside the given function (params, locals,
    /// or a global). With no function context only globals are visible.
    pub fn is_variable_in_scope(&self, name: &str, function: Option<&str>) -> bool {
        match function {
            None => self.is_global(name),
            Some(func) => {
                if let Some(scope) = self.function_scopes.get(func) {
                    scope.all_vars.contains(name) || self.is_global(name)
                } else {
                    false
                }
            }
        }
    }

    /// Shared scope-crossing rule used identically by the backward and
    /// forward slicing passes. Dataflow may cross function boundaries only
    /// through a global that is shadowed in neither endpoint function;
    /// statements at global scope never join a slice through dataflow.
    pub fn crosses_into_scope(
        &self,
        var: &str,
        from_function: Option<&str>,
        to_function: Option<&str>,
    ) -> bool {
        if from_function == to_function {
            return true;
        }
        let (Some(from), Some(to)) = (from_function, to_function) else {
            return false;
        };
        if !self.is_global(var) {
            return false;
        }
        let shadowed = |func: &str| {
            self.function_scopes
                .get(func)
                .is_some_and(|scope| scope.all_vars.contains(var))
        };
        !shadowed(from) && !shadowed(to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope_with(all: &[&str]) -> FunctionScope {
        let vars: FxHashSet<String> = all.iter().map(|s| s.to_string()).collect();
        FunctionScope {
            params: FxHashSet::default(),
            locals: vars.clone(),
            all_vars: vars,
        }
    }

    #[test]
    fn test_recursion_direct_and_mutual() {
        let mut index = ProgramIndex::default();
        index.add_call("a", "a");
        index.add_call("b", "c");
        index.add_call("c", "b");
        index.add_call("d", "b");

        assert!(index.is_recursive("a"));
        assert!(index.is_recursive("b"));
        assert!(index.is_recursive("c"));
        // d reaches the b/c cycle but never returns to itself
        assert!(!index.is_recursive("d"));
        assert!(!index.is_recursive("unknown"));
    }

    #[test]
    fn test_crosses_into_scope_same_function() {
        let index = ProgramIndex::default();
        assert!(index.crosses_into_scope("x", Some("f"), Some("f")));
        assert!(index.crosses_into_scope("x", None, None));
    }

    #[test]
    fn test_crosses_into_scope_global_unshadowed() {
        let mut index = ProgramIndex::default();
        index.globals.insert("g".to_string());
        index.function_scopes.insert("f".into(), scope_with(&["x"]));
        index.function_scopes.insert("h".into(), scope_with(&["y"]));

        assert!(index.crosses_into_scope("g", Some("f"), Some("h")));
    }

    #[test]
    fn test_crosses_into_scope_shadowed_either_side() {
        let mut index = ProgramIndex::default();
        index.globals.insert("g".to_string());
        index.function_scopes.insert("f".into(), scope_with(&["g"]));
        index.function_scopes.insert("h".into(), scope_with(&["y"]));

        assert!(!index.crosses_into_scope("g", Some("f"), Some("h")));
        assert!(!index.crosses_into_scope("g", Some("h"), Some("f")));
    }

    #[test]
    fn test_crosses_into_scope_needs_both_contexts() {
        let mut index = ProgramIndex::default();
        index.globals.insert("g".to_string());
        index.function_scopes.insert("f".into(), scope_with(&[]));

        // Global-scope statements never join through dataflow
        assert!(!index.crosses_into_scope("g", Some("f"), None));
        assert!(!index.crosses_into_scope("g", None, Some("f")));
    }

    #[test]
    fn test_local_never_crosses() {
        let mut index = ProgramIndex::default();
        index.function_scopes.insert("f".into(), scope_with(&["i"]));
        index.function_scopes.insert("h".into(), scope_with(&["i"]));

        assert!(!index.crosses_into_scope("i", Some("f"), Some("h")));
    }
}
