//! C/C++ declarator and lvalue helpers
//!
//! Declarators wrap the declared name in pointer/array/function layers
//! (`int *(*fp[3])(void)`). These helpers unwrap them for the indexing and
//! statement extraction passes.

use super::tree_sitter::node_text_owned;
use tree_sitter::Node;

/// Extract the declared name from a declarator, unwrapping pointer, array,
/// function and parenthesized layers.
pub fn declarator_name(node: &Node, source: &str) -> Option<String> {
    match node.kind() {
        "identifier" | "field_identifier" => Some(node_text_owned(node, source)),
        "pointer_declarator"
        | "array_declarator"
        | "function_declarator"
        | "parenthesized_declarator"
        | "reference_declarator"
        | "init_declarator" => {
            for i in 0..node.child_count() {
                if let Some(child) = node.child(i) {
                    if let Some(name) = declarator_name(&child, source) {
                        return Some(name);
                    }
                }
            }
            None
        }
        _ => None,
    }
}

/// Extract a function's name from its (possibly pointer-wrapped) declarator
pub fn function_name(declarator: &Node, source: &str) -> Option<String> {
    match declarator.kind() {
        "identifier" => Some(node_text_owned(declarator, source)),
        "function_declarator" | "pointer_declarator" | "reference_declarator" => declarator
            .child_by_field_name("declarator")
            .and_then(|child| function_name(&child, source)),
        _ => None,
    }
}

/// Extract the declared name and a best-effort type string, accumulating
/// `*` / `[]` suffixes while unwrapping declarator layers.
pub fn declarator_with_type(
    declarator: &Node,
    base_type: &str,
    source: &str,
) -> (Option<String>, String) {
    match declarator.kind() {
        "identifier" => (
            Some(node_text_owned(declarator, source)),
            base_type.to_string(),
        ),
        "pointer_declarator" => {
            let suffixed = format!("{base_type}*");
            match declarator.child_by_field_name("declarator") {
                Some(inner) => {
                    let (name, _) = declarator_with_type(&inner, base_type, source);
                    (name, suffixed)
                }
                None => (None, suffixed),
            }
        }
        "array_declarator" => {
            let suffixed = format!("{base_type}[]");
            match declarator.child_by_field_name("declarator") {
                Some(inner) => {
                    let (name, _) = declarator_with_type(&inner, base_type, source);
                    (name, suffixed)
                }
                None => (None, suffixed),
            }
        }
        "function_declarator" => match declarator.child_by_field_name("declarator") {
            Some(inner) => declarator_with_type(&inner, base_type, source),
            None => (None, base_type.to_string()),
        },
        _ => (None, base_type.to_string()),
    }
}

/// Names declared by a `declaration` node, covering both initialized
/// (`int x = 1;`) and bare (`int x, *p;`) declarators.
pub fn declaration_targets(declaration: &Node, source: &str) -> Vec<String> {
    let mut names = Vec::new();
    for i in 0..declaration.child_count() {
        let Some(child) = declaration.child(i) else {
            continue;
        };
        match child.kind() {
            "init_declarator" => {
                if let Some(inner) = child.child_by_field_name("declarator") {
                    if let Some(name) = declarator_name(&inner, source) {
                        names.push(name);
                    }
                }
            }
            "identifier" | "pointer_declarator" | "array_declarator" => {
                if let Some(name) = declarator_name(&child, source) {
                    names.push(name);
                }
            }
            _ => {}
        }
    }
    names
}

/// Outermost base identifier of an lvalue expression: `s.a.b` → `s`,
/// `*p` → `p`, `arr[i]` → `arr`.
pub fn base_object(node: &Node, source: &str) -> Option<String> {
    match node.kind() {
        "identifier" => Some(node_text_owned(node, source)),
        "field_expression" => node
            .child_by_field_name("argument")
            .and_then(|arg| base_object(&arg, source)),
        "pointer_expression" | "subscript_expression" => {
            let arg = node.child_by_field_name("argument")?;
            if arg.kind() == "identifier" {
                Some(node_text_owned(&arg, source))
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Base variable of an assignment left-hand side, or of an address-of
/// operand. Identifiers pass through; subscript, field and dereference
/// expressions resolve to their base.
pub fn lvalue_base(node: &Node, source: &str) -> Option<String> {
    match node.kind() {
        "identifier" => Some(node_text_owned(node, source)),
        "subscript_expression" | "pointer_expression" => {
            let arg = node.child_by_field_name("argument")?;
            if arg.kind() == "identifier" {
                Some(node_text_owned(&arg, source))
            } else {
                None
            }
        }
        "field_expression" => base_object(node, source),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tree_sitter::Parser;

    fn parse_c(code: &str) -> tree_sitter::Tree {
        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_c::language()).unwrap();
        parser.parse(code, None).unwrap()
    }

    fn first_declarator<'a>(root: &'a Node, code: &str) -> Node<'a> {
        let _ = code;
        let decl = root.child(0).unwrap();
        decl.child_by_field_name("declarator").unwrap()
    }

    #[test]
    fn test_plain_declarator() {
        let code = "int x;";
        let tree = parse_c(code);
        let root = tree.root_node();
        let d = first_declarator(&root, code);
        assert_eq!(declarator_name(&d, code).as_deref(), Some("x"));
    }

    #[test]
    fn test_pointer_declarator_type() {
        let code = "char **argv;";
        let tree = parse_c(code);
        let root = tree.root_node();
        let d = first_declarator(&root, code);
        let (name, ty) = declarator_with_type(&d, "char", code);
        assert_eq!(name.as_deref(), Some("argv"));
        assert_eq!(ty, "char*");
    }

    #[test]
    fn test_array_declarator_type() {
        let code = "int buf[16];";
        let tree = parse_c(code);
        let root = tree.root_node();
        let d = first_declarator(&root, code);
        let (name, ty) = declarator_with_type(&d, "int", code);
        assert_eq!(name.as_deref(), Some("buf"));
        assert_eq!(ty, "int[]");
    }

    #[test]
    fn test_function_name_through_pointer() {
        let code = "static char *resolve(int n) { return 0; }";
        let tree = parse_c(code);
        let root = tree.root_node();
        let func = root.child(0).unwrap();
        let d = func.child_by_field_name("declarator").unwrap();
        assert_eq!(function_name(&d, code).as_deref(), Some("resolve"));
    }

    #[test]
    fn test_base_object_chained_fields() {
        let code = "void f(void) { s.inner.count = 1; }";
        let tree = parse_c(code);
        let root = tree.root_node();
        let mut found = None;
        crate::shared::utils::tree_sitter::walk_subtree(&root, &mut |n| {
            if n.kind() == "assignment_expression" {
                let left = n.child_by_field_name("left").unwrap();
                found = base_object(&left, code);
            }
        });
        assert_eq!(found.as_deref(), Some("s"));
    }
}
