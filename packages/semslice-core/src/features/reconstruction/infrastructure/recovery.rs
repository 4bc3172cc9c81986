//! Recovery strategies
//!
//! Pure heuristics tried in order; the first one that produces a result
//! wins. Signature recovery falls back to `void name()` so the output stays
//! syntactically regular; declaration recovery falls back to emitting
//! nothing (the identifier is assumed externally supplied).

use crate::features::reconstruction::domain::VariableDeclaration;
use crate::features::reconstruction::ports::{
    DeclarationContext, DeclarationOutcome, DeclarationRecovery, SignatureContext,
    SignatureRecovery,
};
use once_cell::sync::Lazy;
use regex::Regex;

/// `int x = 5;` / `char *p;` / `struct Point pt;` — a type keyword, pointer
/// stars, a name, an optional array suffix
static DECLARATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(int|char|float|double|long|short|unsigned|signed|void|struct\s+\w+|enum\s+\w+)\s+(\**)(\w+)(\s*\[.*?\])?",
    )
    .expect("declaration pattern is valid")
});

/// Variable declarations textually present on one source line. Matches are
/// validated by the character that follows (`=`, `;` or `,`), which filters
/// out function headers and casts.
pub(crate) fn extract_line_declarations(line: &str, line_num: u32) -> Vec<VariableDeclaration> {
    let mut declarations = Vec::new();
    for captures in DECLARATION_RE.captures_iter(line) {
        let full = captures.get(0).expect("group 0 always present");
        let after = line[full.end()..].trim_start();
        if !matches!(after.chars().next(), Some('=') | Some(';') | Some(',')) {
            continue;
        }

        let type_str = captures.get(1).map_or("", |m| m.as_str()).trim();
        let pointers = captures.get(2).map_or("", |m| m.as_str());
        let name = captures.get(3).map_or("", |m| m.as_str()).trim();
        let array_part = captures.get(4).map_or("", |m| m.as_str()).trim();
        if name.is_empty() {
            continue;
        }

        let mut full_type = format!("{type_str} {pointers}").trim().to_string();
        if !array_part.is_empty() {
            full_type.push_str(array_part);
        }
        declarations.push(VariableDeclaration {
            name: name.to_string(),
            type_str: full_type,
            line: line_num,
        });
    }
    declarations
}

// ═══════════════════════════════════════════════════════════════════════════
// Signature recovery
// ═══════════════════════════════════════════════════════════════════════════

/// Parses the located header text against the function name with
/// bracket/identifier matching.
pub struct HeaderPatternStrategy;

impl SignatureRecovery for HeaderPatternStrategy {
    fn name(&self) -> &'static str {
        "header-pattern"
    }

    fn recover(&self, ctx: &SignatureContext<'_>) -> Option<(String, Vec<String>)> {
        let header = ctx.header_text.split('{').next().unwrap_or("").trim();
        let escaped = regex::escape(ctx.function_name);

        let return_re = Regex::new(&format!(r"(.*?)\s+{escaped}\s*\(")).ok()?;
        let return_type = return_re
            .captures(header)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty());

        let params_re = Regex::new(&format!(r"{escaped}\s*\((.*?)\)")).ok()?;
        let params_str = params_re
            .captures(header)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string());

        if return_type.is_none() && params_str.is_none() {
            return None;
        }

        let params = match params_str.as_deref() {
            None | Some("") | Some("void") => Vec::new(),
            Some(list) => list.split(',').map(|p| p.trim().to_string()).collect(),
        };
        Some((return_type.unwrap_or_else(|| "void".to_string()), params))
    }
}

/// Terminal fallback: `void name()` with no parameters
pub struct VoidFallbackStrategy;

impl SignatureRecovery for VoidFallbackStrategy {
    fn name(&self) -> &'static str {
        "void-fallback"
    }

    fn recover(&self, _ctx: &SignatureContext<'_>) -> Option<(String, Vec<String>)> {
        Some(("void".to_string(), Vec::new()))
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Declaration recovery
// ═══════════════════════════════════════════════════════════════════════════

/// A slice line already declares the identifier
pub struct SliceLocalScanStrategy;

impl DeclarationRecovery for SliceLocalScanStrategy {
    fn name(&self) -> &'static str {
        "slice-local-scan"
    }

    fn attempt(
        &self,
        variable: &str,
        ctx: &DeclarationContext<'_>,
    ) -> Option<DeclarationOutcome> {
        for &line_num in ctx.slice_lines {
            let Some(line) = source_line(ctx.source_lines, line_num) else {
                continue;
            };
            if extract_line_declarations(line, line_num)
                .iter()
                .any(|decl| decl.name == variable)
            {
                return Some(DeclarationOutcome::AlreadyDeclared);
            }
        }
        None
    }
}

/// Re-scan the whole function body (not just the slice lines) for a
/// declaration of the identifier.
pub struct BodyScanStrategy;

impl DeclarationRecovery for BodyScanStrategy {
    fn name(&self) -> &'static str {
        "body-scan"
    }

    fn attempt(
        &self,
        variable: &str,
        ctx: &DeclarationContext<'_>,
    ) -> Option<DeclarationOutcome> {
        for line_num in ctx.body_start..ctx.body_end {
            let Some(line) = source_line(ctx.source_lines, line_num) else {
                continue;
            };
            if let Some(decl) = extract_line_declarations(line, line_num)
                .into_iter()
                .find(|decl| decl.name == variable)
            {
                return Some(DeclarationOutcome::Recovered(decl));
            }
        }
        None
    }
}

fn source_line<'a>(lines: &'a [&'a str], line_num: u32) -> Option<&'a str> {
    if line_num == 0 {
        return None;
    }
    lines.get(line_num as usize - 1).copied()
}
