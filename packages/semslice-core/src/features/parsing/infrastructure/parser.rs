//! Tree-sitter parser wrapper for C/C++ translation units

use crate::errors::{Result, SemsliceError};
use crate::features::parsing::domain::{Dialect, SourceUnit};
use std::fs;
use std::path::Path;
use tracing::warn;
use tree_sitter::Parser;

/// Parses one translation unit per call. The grammar is selected per file,
/// so a single parser instance can serve mixed C/C++ inputs.
pub struct TranslationUnitParser {
    parser: Parser,
    current: Option<Dialect>,
}

impl Default for TranslationUnitParser {
    fn default() -> Self {
        Self::new()
    }
}

impl TranslationUnitParser {
    pub fn new() -> Self {
        Self {
            parser: Parser::new(),
            current: None,
        }
    }

    fn set_dialect(&mut self, dialect: Dialect) -> Result<()> {
        if self.current == Some(dialect) {
            return Ok(());
        }
        let language = match dialect {
            Dialect::C => tree_sitter_c::language(),
            Dialect::Cpp => tree_sitter_cpp::language(),
        };
        self.parser
            .set_language(&language)
            .map_err(|e| SemsliceError::parse(format!("grammar load failed: {e}")))?;
        self.current = Some(dialect);
        Ok(())
    }

    /// Parse source text already in memory
    pub fn parse_source(
        &mut self,
        path: &str,
        dialect: Dialect,
        source: String,
    ) -> Result<SourceUnit> {
        self.set_dialect(dialect)?;
        let tree = self.parser.parse(&source, None).ok_or_else(|| {
            warn!("parse failed: {path}");
            SemsliceError::parse(format!("cannot parse {path}"))
        })?;
        Ok(SourceUnit::new(path.to_string(), dialect, source, tree))
    }

    /// Read and parse a file, picking the dialect from its extension
    pub fn parse_file(&mut self, path: &Path) -> Result<SourceUnit> {
        let dialect = Dialect::from_path(path);
        let source = fs::read_to_string(path)?;
        self.parse_source(&path.to_string_lossy(), dialect, source)
    }
}
