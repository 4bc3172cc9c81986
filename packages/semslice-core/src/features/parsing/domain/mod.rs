//! Parsing domain models

use std::path::Path;
use tree_sitter::{Node, Tree};

/// Source dialect, selected per file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    C,
    Cpp,
}

impl Dialect {
    /// Pick a dialect from a file extension; everything that is not a known
    /// C++ extension parses with the C grammar.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("cpp") | Some("cc") | Some("cxx") | Some("hpp") | Some("hxx") | Some("hh") => {
                Dialect::Cpp
            }
            _ => Dialect::C,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::C => "c",
            Dialect::Cpp => "cpp",
        }
    }
}

/// One parsed translation unit: the source text plus its concrete syntax
/// tree. Immutable after parse.
#[derive(Debug)]
pub struct SourceUnit {
    path: String,
    dialect: Dialect,
    source: String,
    tree: Tree,
}

impl SourceUnit {
    pub fn new(path: String, dialect: Dialect, source: String, tree: Tree) -> Self {
        Self {
            path,
            dialect,
            source,
            tree,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Source lines, 0-indexed by position in the returned Vec
    pub fn lines(&self) -> Vec<&str> {
        self.source.split('\n').collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_from_path() {
        assert_eq!(Dialect::from_path(Path::new("a/b.c")), Dialect::C);
        assert_eq!(Dialect::from_path(Path::new("a/b.h")), Dialect::C);
        assert_eq!(Dialect::from_path(Path::new("a/b.cpp")), Dialect::Cpp);
        assert_eq!(Dialect::from_path(Path::new("a/b.cc")), Dialect::Cpp);
        assert_eq!(Dialect::from_path(Path::new("a/b.hpp")), Dialect::Cpp);
        assert_eq!(Dialect::from_path(Path::new("noext")), Dialect::C);
    }
}
