//! Statement domain models

use crate::shared::models::Span;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::{BTreeMap, BTreeSet};

/// Recognized statement kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    Expression,
    Declaration,
    Return,
    If,
    While,
    For,
    DoWhile,
    Switch,
    Break,
    Continue,
    Goto,
    Labeled,
}

impl StatementKind {
    pub fn from_node_kind(kind: &str) -> Option<Self> {
        match kind {
            "expression_statement" => Some(Self::Expression),
            "declaration" => Some(Self::Declaration),
            "return_statement" => Some(Self::Return),
            "if_statement" => Some(Self::If),
            "while_statement" => Some(Self::While),
            "for_statement" => Some(Self::For),
            "do_statement" => Some(Self::DoWhile),
            "switch_statement" => Some(Self::Switch),
            "break_statement" => Some(Self::Break),
            "continue_statement" => Some(Self::Continue),
            "goto_statement" => Some(Self::Goto),
            "labeled_statement" => Some(Self::Labeled),
            _ => None,
        }
    }

    /// Kinds that govern the execution of nested statements
    pub fn is_control(&self) -> bool {
        matches!(
            self,
            Self::If | Self::While | Self::For | Self::DoWhile | Self::Switch
        )
    }
}

/// Facts for one source line (shared by every line a multi-line construct
/// spans)
#[derive(Debug, Clone)]
pub struct Statement {
    pub kind: StatementKind,
    pub span: Span,
    /// Owning function; `None` means global scope
    pub function: Option<String>,
    /// Identifiers assigned or declared
    pub defs: FxHashSet<String>,
    /// Identifiers read, including address-computation operands
    pub uses: FxHashSet<String>,
    /// Lines of the governing branch/loop conditions
    pub control_deps: BTreeSet<u32>,
    pub called_functions: FxHashSet<String>,
    /// Dereference targets on an assignment left-hand side
    pub pointer_defs: FxHashSet<String>,
    /// Dereference targets elsewhere
    pub pointer_uses: FxHashSet<String>,
    /// Aliases established at this statement
    pub may_alias: FxHashMap<String, FxHashSet<String>>,
    /// Base identifiers of subscript expressions
    pub array_accesses: FxHashSet<String>,
    /// Base identifier → accessed field names
    pub field_accesses: FxHashMap<String, FxHashSet<String>>,
    /// Arguments a called function may modify through a pointer parameter
    pub modified_by_call: FxHashSet<String>,
}

impl Statement {
    pub fn new(kind: StatementKind, span: Span, function: Option<String>) -> Self {
        Self {
            kind,
            span,
            function,
            defs: FxHashSet::default(),
            uses: FxHashSet::default(),
            control_deps: BTreeSet::new(),
            called_functions: FxHashSet::default(),
            pointer_defs: FxHashSet::default(),
            pointer_uses: FxHashSet::default(),
            may_alias: FxHashMap::default(),
            array_accesses: FxHashSet::default(),
            field_accesses: FxHashMap::default(),
            modified_by_call: FxHashSet::default(),
        }
    }
}

/// Direct pointer-assignment patterns feeding the alias propagator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasFactKind {
    /// `p = &x`
    AddressOf,
    /// `p = q`
    Copy,
    /// `p = *q`
    LoadDeref,
}

/// One direct alias edge, recorded in document order
#[derive(Debug, Clone)]
pub struct AliasFact {
    pub span: Span,
    pub kind: AliasFactKind,
    pub lhs: String,
    pub rhs: String,
}

/// All statements of one file, keyed by line, plus the ordered alias facts
/// gathered while extracting them
#[derive(Debug, Default)]
pub struct StatementTable {
    statements: BTreeMap<u32, Statement>,
    pub alias_facts: Vec<AliasFact>,
}

impl StatementTable {
    pub fn get(&self, line: u32) -> Option<&Statement> {
        self.statements.get(&line)
    }

    pub fn get_mut(&mut self, line: u32) -> Option<&mut Statement> {
        self.statements.get_mut(&line)
    }

    pub fn contains(&self, line: u32) -> bool {
        self.statements.contains_key(&line)
    }

    /// First statement claiming a line wins; nested statements never
    /// override the enclosing construct's facts.
    pub fn claim(&mut self, line: u32, statement: &Statement) -> bool {
        if self.statements.contains_key(&line) {
            return false;
        }
        self.statements.insert(line, statement.clone());
        true
    }

    /// Statements in line order
    pub fn iter(&self) -> impl Iterator<Item = (u32, &Statement)> {
        self.statements.iter().map(|(line, stmt)| (*line, stmt))
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn function_of(&self, line: u32) -> Option<&str> {
        self.statements
            .get(&line)
            .and_then(|stmt| stmt.function.as_deref())
    }
}
