//! Program index construction
//!
//! A family of single passes over the syntax tree: scope tables, struct
//! field tables, the type table, function signatures and effects, the call
//! graph, recursion flags. Everything here is per-file and rebuilt from
//! scratch for each translation unit.

use crate::features::indexing::domain::{FunctionInfo, FunctionScope, ProgramIndex};
use crate::features::parsing::SourceUnit;
use crate::shared::utils::declarators::{
    base_object, declaration_targets, declarator_name, declarator_with_type, function_name,
};
use crate::shared::utils::tree_sitter::{
    collect_identifiers, find_child_by_kind, node_span, node_text, node_text_owned, walk_subtree,
};
use rustc_hash::FxHashSet;
use tracing::debug;
use tree_sitter::Node;

pub struct ProgramIndexer;

impl ProgramIndexer {
    /// Build the full per-file index
    pub fn build(unit: &SourceUnit) -> ProgramIndex {
        let root = unit.root();
        let source = unit.source();

        let mut index = ProgramIndex::default();
        collect_scopes(&mut index, &root, source);
        collect_struct_fields(&mut index, &root, source);
        collect_types(&mut index, &root, source);
        analyze_functions(&mut index, &root, source);
        mark_recursion(&mut index);

        debug!(
            "indexed {}: {} functions, {} globals",
            unit.path(),
            index.functions.len(),
            index.globals.len()
        );
        index
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Scopes
// ═══════════════════════════════════════════════════════════════════════════

fn collect_scopes(index: &mut ProgramIndex, node: &Node, source: &str) {
    match node.kind() {
        "function_definition" => {
            let Some(declarator) = node.child_by_field_name("declarator") else {
                return;
            };
            let Some(name) = function_name(&declarator, source) else {
                return;
            };
            let params = extract_params(&declarator, source);
            let locals = match node.child_by_field_name("body") {
                Some(body) => collect_locals(&body, source),
                None => FxHashSet::default(),
            };
            let all_vars = params.union(&locals).cloned().collect();
            index.function_scopes.insert(
                name,
                FunctionScope {
                    params,
                    locals,
                    all_vars,
                },
            );
            // locals are handled above; nothing below a function body is a
            // global declaration
        }
        "declaration" => {
            for name in declaration_targets(node, source) {
                index.globals.insert(name);
            }
        }
        _ => {
            for i in 0..node.child_count() {
                if let Some(child) = node.child(i) {
                    collect_scopes(index, &child, source);
                }
            }
        }
    }
}

fn extract_params(declarator: &Node, source: &str) -> FxHashSet<String> {
    let mut params = FxHashSet::default();
    match declarator.kind() {
        "function_declarator" => {
            if let Some(list) = declarator.child_by_field_name("parameters") {
                for i in 0..list.child_count() {
                    let Some(param) = list.child(i) else { continue };
                    if param.kind() != "parameter_declaration" {
                        continue;
                    }
                    if let Some(inner) = param.child_by_field_name("declarator") {
                        if let Some(name) = declarator_name(&inner, source) {
                            params.insert(name);
                        }
                    }
                }
            }
        }
        "pointer_declarator" | "array_declarator" | "reference_declarator" => {
            for i in 0..declarator.child_count() {
                if let Some(child) = declarator.child(i) {
                    params.extend(extract_params(&child, source));
                }
            }
        }
        _ => {}
    }
    params
}

fn collect_locals(body: &Node, source: &str) -> FxHashSet<String> {
    let mut locals = FxHashSet::default();
    walk_subtree(body, &mut |n| {
        if n.kind() == "declaration" {
            for name in declaration_targets(&n, source) {
                locals.insert(name);
            }
        }
    });
    locals
}

// ═══════════════════════════════════════════════════════════════════════════
// Struct fields and types
// ═══════════════════════════════════════════════════════════════════════════

fn collect_struct_fields(index: &mut ProgramIndex, root: &Node, source: &str) {
    walk_subtree(root, &mut |n| {
        if n.kind() != "struct_specifier" && n.kind() != "union_specifier" {
            return;
        }
        let Some(name_node) = find_child_by_kind(&n, "type_identifier") else {
            return;
        };
        let Some(body) = n.child_by_field_name("body") else {
            return;
        };
        let struct_name = node_text_owned(&name_node, source);
        let fields = index.struct_fields.entry(struct_name).or_default();
        for i in 0..body.child_count() {
            let Some(field) = body.child(i) else { continue };
            if field.kind() != "field_declaration" {
                continue;
            }
            for j in 0..field.child_count() {
                if let Some(part) = field.child(j) {
                    if let Some(field_name) = declarator_name(&part, source) {
                        fields.insert(field_name);
                    }
                }
            }
        }
    });
}

fn collect_types(index: &mut ProgramIndex, root: &Node, source: &str) {
    walk_subtree(root, &mut |n| {
        if n.kind() != "declaration" && n.kind() != "parameter_declaration" {
            return;
        }
        let Some(type_node) = n.child_by_field_name("type") else {
            return;
        };
        let base = node_text(&type_node, source).trim().to_string();
        for i in 0..n.child_count() {
            let Some(child) = n.child(i) else { continue };
            let declarator = match child.kind() {
                "init_declarator" => child.child_by_field_name("declarator"),
                "identifier" | "pointer_declarator" | "array_declarator" => Some(child),
                _ => None,
            };
            if let Some(declarator) = declarator {
                let (name, full_type) = declarator_with_type(&declarator, &base, source);
                if let Some(name) = name {
                    index.type_table.insert(name, full_type);
                }
            }
        }
    });
}

// ═══════════════════════════════════════════════════════════════════════════
// Function signatures and effects
// ═══════════════════════════════════════════════════════════════════════════

fn analyze_functions(index: &mut ProgramIndex, root: &Node, source: &str) {
    let mut definitions = Vec::new();
    walk_subtree(root, &mut |n| {
        if n.kind() == "function_definition" {
            definitions.push(n);
        }
    });
    for node in definitions {
        analyze_function(index, &node, source);
    }
}

/// Unwrap pointer/reference layers around the `function_declarator`, so the
/// parameter list of `char *resolve(int n)` is still found.
fn innermost_function_declarator(declarator: Node<'_>) -> Option<Node<'_>> {
    match declarator.kind() {
        "function_declarator" => Some(declarator),
        "pointer_declarator" | "reference_declarator" => declarator
            .child_by_field_name("declarator")
            .and_then(innermost_function_declarator),
        _ => None,
    }
}

fn analyze_function(index: &mut ProgramIndex, node: &Node, source: &str) {
    let Some(declarator) = node.child_by_field_name("declarator") else {
        return;
    };
    let Some(name) = function_name(&declarator, source) else {
        return;
    };

    let mut info = FunctionInfo::new(name.clone(), node_span(node));
    if let Some(type_node) = node.child_by_field_name("type") {
        info.return_type = Some(node_text(&type_node, source).trim().to_string());
    }

    if let Some(func_declarator) = innermost_function_declarator(declarator) {
        if let Some(list) = func_declarator.child_by_field_name("parameters") {
            for i in 0..list.child_count() {
                let Some(param) = list.child(i) else { continue };
                if param.kind() == "parameter_declaration" {
                    record_parameter(&mut info, &param, source);
                }
            }
        }
    }

    if let Some(body) = node.child_by_field_name("body") {
        analyze_body(index, &mut info, &body, source);
    }

    index.functions.insert(name, info);
}

fn record_parameter(info: &mut FunctionInfo, param: &Node, source: &str) {
    let type_node = param.child_by_field_name("type");
    let declarator = param.child_by_field_name("declarator");
    let Some(declarator) = declarator else { return };

    let base = type_node
        .map(|t| node_text(&t, source).trim().to_string())
        .unwrap_or_default();
    let (name, full_type) = declarator_with_type(&declarator, &base, source);
    let Some(name) = name else { return };

    let by_declarator = matches!(
        declarator.kind(),
        "pointer_declarator" | "reference_declarator"
    );
    let by_type = base.contains('*') || base.contains('&');
    if by_declarator || by_type {
        info.pointer_params.insert(name.clone());
    }
    info.param_types.insert(name.clone(), full_type);
    info.params.push(name);
}

fn analyze_body(index: &mut ProgramIndex, info: &mut FunctionInfo, body: &Node, source: &str) {
    let caller = info.name.clone();
    walk_subtree(body, &mut |n| match n.kind() {
        "return_statement" => {
            info.return_vars.extend(collect_identifiers(&n, source));
        }
        "assignment_expression" => {
            if let Some(left) = n.child_by_field_name("left") {
                if left.kind() == "identifier" {
                    let target = node_text_owned(&left, source);
                    if index.globals.contains(&target) {
                        info.modifies_globals.insert(target);
                    }
                } else if left.kind() == "pointer_expression" {
                    if let Some(arg) = left.child_by_field_name("argument") {
                        if arg.kind() == "identifier" {
                            let target = node_text_owned(&arg, source);
                            if info.pointer_params.contains(&target) {
                                info.may_modify_params.insert(target);
                            }
                        }
                    }
                }
                if let Some(base) = base_object(&left, source) {
                    if info.pointer_params.contains(&base) {
                        info.may_modify_params.insert(base);
                    }
                }
            }
        }
        "update_expression" => {
            if let Some(arg) = n.child_by_field_name("argument") {
                if arg.kind() == "identifier" {
                    let target = node_text_owned(&arg, source);
                    if index.globals.contains(&target) {
                        info.modifies_globals.insert(target);
                    }
                }
            }
        }
        "call_expression" => {
            if let Some(func) = n.child_by_field_name("function") {
                if func.kind() == "identifier" {
                    let callee = node_text_owned(&func, source);
                    index.add_call(&caller, &callee);
                    info.calls.insert(callee);
                }
            }
        }
        _ => {}
    });
}

fn mark_recursion(index: &mut ProgramIndex) {
    let names: Vec<String> = index.functions.keys().cloned().collect();
    for name in names {
        let recursive = index.is_recursive(&name);
        if let Some(info) = index.functions.get_mut(&name) {
            info.is_recursive = recursive;
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════
