//! Anchor extraction
//!
//! Finds the smallest recognized statement node spanning the target line and
//! collects the identifiers seeding relevance propagation: declaration
//! targets, assignment targets, call targets with their argument
//! identifiers, and plain references on that line.

use crate::features::parsing::SourceUnit;
use crate::shared::utils::tree_sitter::{
    collect_identifiers, node_contains_line, node_span, node_text_owned, walk_subtree,
};
use std::collections::BTreeSet;
use tree_sitter::Node;

/// Sentinel anchor used when nothing can be extracted, keeping the slicing
/// pipeline total (the query degenerates to a near-empty slice).
pub const FALLBACK_ANCHOR: &str = "__dummy__";

const ANCHOR_STATEMENT_KINDS: [&str; 8] = [
    "expression_statement",
    "declaration",
    "return_statement",
    "if_statement",
    "while_statement",
    "for_statement",
    "assignment_expression",
    "call_expression",
];

pub struct AnchorExtractor;

impl AnchorExtractor {
    /// Extract the anchor identifier set for a target line. Empty when the
    /// line sits outside any recognized statement; the caller substitutes
    /// the sentinel.
    pub fn extract(unit: &SourceUnit, target_line: u32) -> BTreeSet<String> {
        let root = unit.root();
        let source = unit.source();
        let mut anchors = BTreeSet::new();

        let Some(target_node) = find_statement_at_line(&root, target_line) else {
            return anchors;
        };

        walk_subtree(&target_node, &mut |n| {
            let span = node_span(&n);
            if span.start_line > target_line || span.end_line < target_line {
                return;
            }
            match n.kind() {
                "declaration" | "init_declarator" => {
                    for i in 0..n.child_count() {
                        if let Some(child) = n.child(i) {
                            if child.kind() == "identifier" {
                                anchors.insert(node_text_owned(&child, source));
                            }
                        }
                    }
                }
                "assignment_expression" => {
                    if let Some(left) = n.child_by_field_name("left") {
                        anchors.extend(collect_identifiers(&left, source));
                    }
                }
                "call_expression" => {
                    if let Some(func) = n.child_by_field_name("function") {
                        if func.kind() == "identifier" {
                            anchors.insert(node_text_owned(&func, source));
                        }
                    }
                    if let Some(args) = n.child_by_field_name("arguments") {
                        anchors.extend(collect_identifiers(&args, source));
                    }
                }
                "identifier" => {
                    anchors.insert(node_text_owned(&n, source));
                }
                _ => {}
            }
        });

        anchors
    }
}

/// Smallest recognized statement node whose span contains the target line
fn find_statement_at_line<'a>(root: &Node<'a>, target_line: u32) -> Option<Node<'a>> {
    let mut best: Option<Node<'a>> = None;
    walk_subtree(root, &mut |n| {
        if !node_contains_line(&n, target_line) {
            return;
        }
        if !ANCHOR_STATEMENT_KINDS.contains(&n.kind()) {
            return;
        }
        let size = n.end_byte() - n.start_byte();
        match best {
            Some(current) if current.end_byte() - current.start_byte() <= size => {}
            _ => best = Some(n),
        }
    });
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::parsing::{Dialect, TranslationUnitParser};

    fn anchors_at(code: &str, line: u32) -> BTreeSet<String> {
        let mut parser = TranslationUnitParser::new();
        let unit = parser
            .parse_source("test.c", Dialect::C, code.to_string())
            .unwrap();
        AnchorExtractor::extract(&unit, line)
    }

    #[test]
    fn test_call_anchors_include_target_and_arguments() {
        let code = "void f(int g) {\nprintf(\"%d\", g);\n}";
        let anchors = anchors_at(code, 2);
        assert!(anchors.contains("printf"));
        assert!(anchors.contains("g"));
    }

    #[test]
    fn test_assignment_anchors_use_left_hand_side() {
        let code = "void f(int a) {\nint total;\ntotal = a + 1;\n}";
        let anchors = anchors_at(code, 3);
        assert!(anchors.contains("total"));
    }

    #[test]
    fn test_declaration_anchor() {
        let code = "void f(int a) {\nint y = a + 1;\n}";
        let anchors = anchors_at(code, 2);
        assert!(anchors.contains("y"));
    }

    #[test]
    fn test_line_outside_any_statement_yields_empty_set() {
        let code = "void f(void) {\nint x = 1;\n}\n\n\n";
        let anchors = anchors_at(code, 5);
        assert!(anchors.is_empty());
    }

    #[test]
    fn test_only_target_line_contributes_on_multiline_constructs() {
        let code = "void f(int a, int b) {\nif (a > 0) {\nb = 1;\n}\n}";
        let anchors = anchors_at(code, 3);
        assert!(anchors.contains("b"));
        assert!(!anchors.contains("a"));
    }
}
