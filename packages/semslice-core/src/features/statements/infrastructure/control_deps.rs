//! Control dependency attachment
//!
//! Walks control constructs recursively, carrying the set of governing
//! condition lines. Entering an if/while/for/do/switch body adds that
//! construct's condition line; nesting composes, so a statement inside two
//! nested ifs carries both condition lines.

use crate::features::parsing::SourceUnit;
use crate::features::statements::domain::StatementTable;
use crate::shared::utils::tree_sitter::node_span;
use std::collections::BTreeSet;
use tree_sitter::Node;

const CONTROL_KINDS: [&str; 5] = [
    "if_statement",
    "while_statement",
    "for_statement",
    "do_statement",
    "switch_statement",
];

pub struct ControlDependencyBuilder;

impl ControlDependencyBuilder {
    /// Attach governing condition lines to every covered statement line
    pub fn build(unit: &SourceUnit, table: &mut StatementTable) {
        let root = unit.root();
        visit(&root, &BTreeSet::new(), table);
    }
}

fn visit(node: &Node, governing: &BTreeSet<u32>, table: &mut StatementTable) {
    if CONTROL_KINDS.contains(&node.kind()) {
        let condition_line = node_span(node).start_line;
        let mut inner = governing.clone();
        inner.insert(condition_line);

        let mut governed_ids = Vec::new();
        for field in ["consequence", "alternative", "body"] {
            if let Some(sub) = node.child_by_field_name(field) {
                governed_ids.push(sub.id());
                visit(&sub, &inner, table);
            }
        }

        // the condition and header parts stay under the outer set
        for i in 0..node.child_count() {
            let Some(child) = node.child(i) else { continue };
            if governed_ids.contains(&child.id()) {
                continue;
            }
            if matches!(
                child.kind(),
                "(" | ")" | "{" | "}" | "if" | "else" | "while" | "for" | "do" | "switch"
            ) {
                continue;
            }
            visit(&child, governing, table);
        }
    } else {
        if !governing.is_empty() {
            let span = node_span(node);
            for line in span.lines() {
                if let Some(stmt) = table.get_mut(line) {
                    // a condition line never depends on itself, even when the
                    // body's opening brace shares its line
                    stmt.control_deps
                        .extend(governing.iter().copied().filter(|&dep| dep != line));
                }
            }
        }
        for i in 0..node.child_count() {
            if let Some(child) = node.child(i) {
                visit(&child, governing, table);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::indexing::ProgramIndexer;
    use crate::features::parsing::{Dialect, TranslationUnitParser};
    use crate::features::statements::StatementExtractor;

    fn extract_with_deps(code: &str) -> StatementTable {
        let mut parser = TranslationUnitParser::new();
        let unit = parser
            .parse_source("test.c", Dialect::C, code.to_string())
            .unwrap();
        let index = ProgramIndexer::build(&unit);
        let mut table = StatementExtractor::extract(&unit, &index);
        ControlDependencyBuilder::build(&unit, &mut table);
        table
    }

    #[test]
    fn test_if_body_depends_on_condition_line() {
        let code = "void f(int x) {\nif (x > 0) {\nx = x - 1;\n}\n}";
        let table = extract_with_deps(code);
        let body = table.get(3).unwrap();
        assert!(body.control_deps.contains(&2));
    }

    #[test]
    fn test_nested_conditions_compose() {
        let code = r#"
void f(int x, int y) {
    if (x > 0) {
        while (y > 0) {
            y = y - 1;
        }
    }
}
"#;
        let table = extract_with_deps(code);
        let innermost = table.get(5).unwrap();
        assert!(innermost.control_deps.contains(&3));
        assert!(innermost.control_deps.contains(&4));
    }

    #[test]
    fn test_else_branch_is_governed() {
        let code = "void f(int x) {\nif (x) {\nx = 1;\n} else {\nx = 2;\n}\n}";
        let table = extract_with_deps(code);
        assert!(table.get(5).unwrap().control_deps.contains(&2));
    }

    #[test]
    fn test_statement_after_construct_is_free() {
        let code = "void f(int x) {\nif (x) {\nx = 1;\n}\nx = 2;\n}";
        let table = extract_with_deps(code);
        assert!(table.get(5).unwrap().control_deps.is_empty());
    }

    #[test]
    fn test_condition_line_not_self_governed() {
        let code = "void f(int x) {\nwhile (x) {\nx = 0;\n}\n}";
        let table = extract_with_deps(code);
        assert!(table.get(2).unwrap().control_deps.is_empty());
    }
}
