//! Tree-sitter Utility Functions
//!
//! Common utilities for working with tree-sitter AST nodes.
//! Eliminates code duplication across the indexing and statement extractors.

use crate::shared::models::Span;
use rustc_hash::FxHashSet;
use tree_sitter::Node;

// ═══════════════════════════════════════════════════════════════════════════
// Node Traversal Utilities
// ═══════════════════════════════════════════════════════════════════════════

/// Find a direct child node by kind
#[inline]
pub fn find_child_by_kind<'a>(node: &'a Node, kind: &str) -> Option<Node<'a>> {
    for i in 0..node.child_count() {
        if let Some(child) = node.child(i) {
            if child.kind() == kind {
                return Some(child);
            }
        }
    }
    None
}

/// Find all direct children by kind
#[inline]
pub fn find_children_by_kind<'a>(node: &'a Node, kind: &str) -> Vec<Node<'a>> {
    let mut result = Vec::new();
    for i in 0..node.child_count() {
        if let Some(child) = node.child(i) {
            if child.kind() == kind {
                result.push(child);
            }
        }
    }
    result
}

/// Visit every node in the subtree, depth-first, in document order
pub fn walk_subtree<'tree, F: FnMut(Node<'tree>)>(node: &Node<'tree>, f: &mut F) {
    let mut stack = vec![*node];
    while let Some(current) = stack.pop() {
        f(current);
        for i in (0..current.child_count()).rev() {
            if let Some(child) = current.child(i) {
                stack.push(child);
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Text Extraction Utilities
// ═══════════════════════════════════════════════════════════════════════════

/// Extract text content from a node
#[inline]
pub fn node_text<'a>(node: &Node, source: &'a str) -> &'a str {
    let start = node.start_byte();
    let end = node.end_byte();
    &source[start..end]
}

/// Extract text content from a node as owned String
#[inline]
pub fn node_text_owned(node: &Node, source: &str) -> String {
    node_text(node, source).to_string()
}

/// Collect every `identifier` in the subtree as a name set
pub fn collect_identifiers(node: &Node, source: &str) -> FxHashSet<String> {
    let mut names = FxHashSet::default();
    walk_subtree(node, &mut |n| {
        if n.kind() == "identifier" {
            names.insert(node_text_owned(&n, source));
        }
    });
    names
}

// ═══════════════════════════════════════════════════════════════════════════
// Span Conversion Utilities
// ═══════════════════════════════════════════════════════════════════════════

/// Convert tree-sitter node to a line Span (1-indexed)
#[inline]
pub fn node_span(node: &Node) -> Span {
    Span::new(
        node.start_position().row as u32 + 1,
        node.end_position().row as u32 + 1,
    )
}

/// Check whether a node's line range covers the given 1-indexed line
#[inline]
pub fn node_contains_line(node: &Node, line: u32) -> bool {
    node_span(node).contains_line(line)
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use tree_sitter::Parser;

    fn parse_c(code: &str) -> tree_sitter::Tree {
        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_c::language()).unwrap();
        parser.parse(code, None).unwrap()
    }

    #[test]
    fn test_find_child_by_kind() {
        let code = "int x = 1;";
        let tree = parse_c(code);
        let root = tree.root_node();
        let decl = root.child(0).unwrap();

        assert_eq!(decl.kind(), "declaration");
        assert!(find_child_by_kind(&decl, "init_declarator").is_some());
    }

    #[test]
    fn test_node_text() {
        let code = "int count = 0;";
        let tree = parse_c(code);
        let root = tree.root_node();
        let decl = root.child(0).unwrap();
        let init = find_child_by_kind(&decl, "init_declarator").unwrap();
        let name = init.child_by_field_name("declarator").unwrap();

        assert_eq!(node_text(&name, code), "count");
    }

    #[test]
    fn test_collect_identifiers() {
        let code = "int y = a + b * c;";
        let tree = parse_c(code);
        let root = tree.root_node();

        let names = collect_identifiers(&root, code);
        for expected in ["y", "a", "b", "c"] {
            assert!(names.contains(expected), "missing {expected}");
        }
    }

    #[test]
    fn test_node_span() {
        let code = "void f(void)\n{\n    return;\n}\n";
        let tree = parse_c(code);
        let root = tree.root_node();
        let func = root.child(0).unwrap();

        let span = node_span(&func);
        assert_eq!(span.start_line, 1);
        assert_eq!(span.end_line, 4);
        assert!(node_contains_line(&func, 3));
    }
}
