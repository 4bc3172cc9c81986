//! Per-line fact extraction
//!
//! Walks the syntax tree once, claiming every line covered by a recognized
//! statement kind. The outermost construct claims its lines first; nested
//! statements never override it.

use crate::features::indexing::ProgramIndex;
use crate::features::parsing::SourceUnit;
use crate::features::statements::domain::{
    AliasFact, AliasFactKind, Statement, StatementKind, StatementTable,
};
use crate::shared::models::Span;
use crate::shared::utils::declarators::{
    base_object, declaration_targets, declarator_name, lvalue_base,
};
use crate::shared::utils::tree_sitter::{node_span, node_text, node_text_owned, walk_subtree};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;
use tree_sitter::Node;

pub struct StatementExtractor;

impl StatementExtractor {
    /// Extract facts for every covered line of the unit
    pub fn extract(unit: &SourceUnit, index: &ProgramIndex) -> StatementTable {
        let mut table = StatementTable::default();
        let root = unit.root();
        visit(&mut table, &root, None, index, unit.source());
        debug!("extracted {} statement lines from {}", table.len(), unit.path());
        table
    }
}

fn visit(
    table: &mut StatementTable,
    node: &Node,
    function: Option<&str>,
    index: &ProgramIndex,
    source: &str,
) {
    let owned;
    let function: Option<&str> = if node.kind() == "function_definition" {
        owned = node
            .child_by_field_name("declarator")
            .and_then(|d| crate::shared::utils::declarators::function_name(&d, source));
        owned.as_deref().or(function)
    } else {
        function
    };

    if let Some(kind) = StatementKind::from_node_kind(node.kind()) {
        let span = node_span(node);
        let stmt = build_statement(node, kind, span, function, index, source);
        let mut claimed = false;
        for line in span.lines() {
            claimed |= table.claim(line, &stmt);
        }
        if claimed {
            collect_alias_facts(node, span, &mut table.alias_facts, source);
        }
    }

    for i in 0..node.child_count() {
        if let Some(child) = node.child(i) {
            visit(table, &child, function, index, source);
        }
    }
}

fn build_statement(
    node: &Node,
    kind: StatementKind,
    span: Span,
    function: Option<&str>,
    index: &ProgramIndex,
    source: &str,
) -> Statement {
    let mut stmt = Statement::new(kind, span, function.map(str::to_string));
    stmt.defs = collect_defs(node, source);
    stmt.uses = collect_uses(node, &stmt.defs, source);
    stmt.called_functions = collect_calls(node, source);
    let (pointer_defs, pointer_uses) = collect_pointer_ops(node, source);
    stmt.pointer_defs = pointer_defs;
    stmt.pointer_uses = pointer_uses;
    let (array_accesses, field_accesses) = collect_accesses(node, source);
    stmt.array_accesses = array_accesses;
    stmt.field_accesses = field_accesses;

    if kind == StatementKind::Expression {
        for i in 0..node.child_count() {
            if let Some(child) = node.child(i) {
                if child.kind() == "call_expression" {
                    analyze_call_arguments(&child, index, &mut stmt, source);
                }
            }
        }
    }
    stmt
}

/// Operator of a `pointer_expression` (`*` dereference or `&` address-of)
fn pointer_operator<'a>(node: &Node, source: &'a str) -> Option<&'a str> {
    node.child_by_field_name("operator")
        .map(|op| node_text(&op, source))
}

// ═══════════════════════════════════════════════════════════════════════════
// Defs and uses
// ═══════════════════════════════════════════════════════════════════════════

/// Identifiers assigned or declared anywhere inside the statement.
/// A subscript store defines the array base, a field store the outermost
/// object, a dereference store the pointer operand, `++`/`--` its operand.
fn collect_defs(node: &Node, source: &str) -> FxHashSet<String> {
    let mut defs = FxHashSet::default();
    walk_subtree(node, &mut |n| match n.kind() {
        "declaration" => {
            defs.extend(declaration_targets(&n, source));
        }
        "assignment_expression" => {
            if let Some(left) = n.child_by_field_name("left") {
                if left.kind() == "pointer_expression"
                    && pointer_operator(&left, source) != Some("*")
                {
                    return;
                }
                if let Some(name) = lvalue_base(&left, source) {
                    defs.insert(name);
                }
            }
        }
        "update_expression" => {
            if let Some(arg) = n.child_by_field_name("argument") {
                if arg.kind() == "identifier" {
                    defs.insert(node_text_owned(&arg, source));
                }
            }
        }
        _ => {}
    });
    defs
}

/// Identifiers read while descending the statement: declaration targets and
/// pure assignment targets are excluded, address-computation operands
/// (array index, dereference target, field base) are included, and the
/// statement's own defs are subtracted at the end.
fn collect_uses(node: &Node, defs: &FxHashSet<String>, source: &str) -> FxHashSet<String> {
    let mut uses = FxHashSet::default();
    descend_uses(node, &mut uses, source);
    for def in defs {
        uses.remove(def);
    }
    uses
}

fn descend_uses(n: &Node, uses: &mut FxHashSet<String>, source: &str) {
    match n.kind() {
        "declaration" => {
            for i in 0..n.child_count() {
                if let Some(child) = n.child(i) {
                    if child.kind() == "init_declarator" {
                        if let Some(value) = child.child_by_field_name("value") {
                            descend_uses(&value, uses, source);
                        }
                    }
                }
            }
        }
        "assignment_expression" => {
            if let Some(left) = n.child_by_field_name("left") {
                match left.kind() {
                    "subscript_expression" => {
                        if let Some(arg) = left.child_by_field_name("argument") {
                            descend_uses(&arg, uses, source);
                        }
                        if let Some(index) = left.child_by_field_name("index") {
                            descend_uses(&index, uses, source);
                        }
                    }
                    "pointer_expression" | "field_expression" => {
                        if let Some(arg) = left.child_by_field_name("argument") {
                            descend_uses(&arg, uses, source);
                        }
                    }
                    // a plain identifier target is a pure write
                    _ => {}
                }
            }
            if let Some(right) = n.child_by_field_name("right") {
                descend_uses(&right, uses, source);
            }
        }
        "identifier" => {
            uses.insert(node_text_owned(n, source));
        }
        _ => {
            for i in 0..n.child_count() {
                if let Some(child) = n.child(i) {
                    descend_uses(&child, uses, source);
                }
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Pointer, array and field facts
// ═══════════════════════════════════════════════════════════════════════════

fn collect_pointer_ops(node: &Node, source: &str) -> (FxHashSet<String>, FxHashSet<String>) {
    let mut pointer_defs = FxHashSet::default();
    let mut pointer_uses = FxHashSet::default();
    descend_pointer_ops(node, false, &mut pointer_defs, &mut pointer_uses, source);
    (pointer_defs, pointer_uses)
}

fn descend_pointer_ops(
    n: &Node,
    in_store: bool,
    pointer_defs: &mut FxHashSet<String>,
    pointer_uses: &mut FxHashSet<String>,
    source: &str,
) {
    match n.kind() {
        "pointer_expression" => {
            if pointer_operator(n, source) == Some("*") {
                if let Some(arg) = n.child_by_field_name("argument") {
                    if arg.kind() == "identifier" {
                        let name = node_text_owned(&arg, source);
                        if in_store {
                            pointer_defs.insert(name);
                        } else {
                            pointer_uses.insert(name);
                        }
                    }
                }
            }
        }
        "assignment_expression" => {
            if let Some(left) = n.child_by_field_name("left") {
                descend_pointer_ops(&left, true, pointer_defs, pointer_uses, source);
            }
            if let Some(right) = n.child_by_field_name("right") {
                descend_pointer_ops(&right, false, pointer_defs, pointer_uses, source);
            }
        }
        _ => {
            for i in 0..n.child_count() {
                if let Some(child) = n.child(i) {
                    descend_pointer_ops(&child, in_store, pointer_defs, pointer_uses, source);
                }
            }
        }
    }
}

#[allow(clippy::type_complexity)]
fn collect_accesses(
    node: &Node,
    source: &str,
) -> (FxHashSet<String>, FxHashMap<String, FxHashSet<String>>) {
    let mut array_accesses = FxHashSet::default();
    let mut field_accesses: FxHashMap<String, FxHashSet<String>> = FxHashMap::default();
    walk_subtree(node, &mut |n| match n.kind() {
        "subscript_expression" => {
            if let Some(arg) = n.child_by_field_name("argument") {
                if arg.kind() == "identifier" {
                    array_accesses.insert(node_text_owned(&arg, source));
                }
            }
        }
        "field_expression" => {
            let field = n.child_by_field_name("field");
            let base = n
                .child_by_field_name("argument")
                .and_then(|arg| base_object(&arg, source));
            if let (Some(field), Some(base)) = (field, base) {
                if field.kind() == "field_identifier" {
                    field_accesses
                        .entry(base)
                        .or_default()
                        .insert(node_text_owned(&field, source));
                }
            }
        }
        _ => {}
    });
    (array_accesses, field_accesses)
}

fn collect_calls(node: &Node, source: &str) -> FxHashSet<String> {
    let mut calls = FxHashSet::default();
    walk_subtree(node, &mut |n| {
        if n.kind() == "call_expression" {
            if let Some(func) = n.child_by_field_name("function") {
                if func.kind() == "identifier" {
                    calls.insert(node_text_owned(&func, source));
                }
            }
        }
    });
    calls
}

// ═══════════════════════════════════════════════════════════════════════════
// Call-argument effects
// ═══════════════════════════════════════════════════════════════════════════

/// Match actual arguments against a known callee's parameters; arguments
/// bound to a parameter the callee may write through are recorded as
/// modified by this call.
fn analyze_call_arguments(
    call: &Node,
    index: &ProgramIndex,
    stmt: &mut Statement,
    source: &str,
) {
    let Some(func) = call.child_by_field_name("function") else {
        return;
    };
    if func.kind() != "identifier" {
        return;
    }
    let Some(info) = index.functions.get(node_text(&func, source)) else {
        return;
    };
    let Some(args_node) = call.child_by_field_name("arguments") else {
        return;
    };

    let mut actual_args = Vec::new();
    for i in 0..args_node.child_count() {
        if let Some(child) = args_node.child(i) {
            if !matches!(child.kind(), "(" | ")" | ",") {
                actual_args.push(child);
            }
        }
    }

    for (i, param) in info.params.iter().enumerate() {
        let Some(arg) = actual_args.get(i) else { break };
        if info.may_modify_params.contains(param) {
            if let Some(arg_var) = lvalue_base(arg, source) {
                stmt.modified_by_call.insert(arg_var);
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Direct alias facts
// ═══════════════════════════════════════════════════════════════════════════

fn collect_alias_facts(node: &Node, span: Span, facts: &mut Vec<AliasFact>, source: &str) {
    walk_subtree(node, &mut |n| match n.kind() {
        "assignment_expression" => {
            let left = n.child_by_field_name("left");
            let right = n.child_by_field_name("right");
            let (Some(left), Some(right)) = (left, right) else {
                return;
            };
            let Some(lhs) = lvalue_base(&left, source) else {
                return;
            };
            push_alias_fact(&right, span, lhs, facts, source, true);
        }
        "init_declarator" => {
            let declarator = n.child_by_field_name("declarator");
            let value = n.child_by_field_name("value");
            let (Some(declarator), Some(value)) = (declarator, value) else {
                return;
            };
            let Some(lhs) = declarator_name(&declarator, source) else {
                return;
            };
            // only the address-of form seeds an alias at a declaration
            push_alias_fact(&value, span, lhs, facts, source, false);
        }
        _ => {}
    });
}

fn push_alias_fact(
    rhs: &Node,
    span: Span,
    lhs: String,
    facts: &mut Vec<AliasFact>,
    source: &str,
    allow_copy_forms: bool,
) {
    match rhs.kind() {
        "pointer_expression" => {
            let operator = pointer_operator(rhs, source);
            let Some(arg) = rhs.child_by_field_name("argument") else {
                return;
            };
            match operator {
                Some("&") => {
                    if let Some(target) = lvalue_base(&arg, source) {
                        facts.push(AliasFact {
                            span,
                            kind: AliasFactKind::AddressOf,
                            lhs,
                            rhs: target,
                        });
                    }
                }
                Some("*") if allow_copy_forms => {
                    if arg.kind() == "identifier" {
                        facts.push(AliasFact {
                            span,
                            kind: AliasFactKind::LoadDeref,
                            lhs,
                            rhs: node_text_owned(&arg, source),
                        });
                    }
                }
                _ => {}
            }
        }
        "identifier" if allow_copy_forms => {
            facts.push(AliasFact {
                span,
                kind: AliasFactKind::Copy,
                lhs,
                rhs: node_text_owned(rhs, source),
            });
        }
        _ => {}
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════
