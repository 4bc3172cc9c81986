//! Reconstruction ports
//!
//! Both recovery problems are ordered lists of pure strategies: each
//! strategy either produces a result or passes, and the first success wins.
//! This keeps every heuristic independently unit-testable.

use crate::features::reconstruction::domain::VariableDeclaration;

/// Input for signature recovery: the located header text (everything up to
/// the opening brace) and the function name it must match.
pub struct SignatureContext<'a> {
    pub function_name: &'a str,
    pub header_text: &'a str,
}

/// One signature recovery heuristic. Returns the recovered return type and
/// raw parameter list on success.
pub trait SignatureRecovery {
    fn name(&self) -> &'static str;
    fn recover(&self, ctx: &SignatureContext<'_>) -> Option<(String, Vec<String>)>;
}

/// Input for declaration recovery: the source lines, the function's slice
/// lines, and its body bounds.
pub struct DeclarationContext<'a> {
    pub source_lines: &'a [&'a str],
    pub slice_lines: &'a [u32],
    pub body_start: u32,
    pub body_end: u32,
}

/// Outcome of declaration recovery for one identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclarationOutcome {
    /// A slice line already declares it; nothing to emit
    AlreadyDeclared,
    /// Found elsewhere in the function body; emit this declaration once
    Recovered(VariableDeclaration),
}

/// One declaration recovery heuristic. `None` means "pass to the next
/// strategy"; when every strategy passes, the identifier is treated as
/// externally supplied and nothing is emitted — a type is never fabricated.
pub trait DeclarationRecovery {
    fn name(&self) -> &'static str;
    fn attempt(&self, variable: &str, ctx: &DeclarationContext<'_>) -> Option<DeclarationOutcome>;
}
