//! Slice reconstruction
//!
//! Rebuilds a syntactically regular unit from a sparse, possibly
//! multi-function line subset: locate each involved function's signature and
//! body bounds, recover missing local declarations, lift conservative global
//! declarations, and emit the slice lines with gap markers and line-number
//! trace comments.

use crate::features::reconstruction::domain::FunctionSkeleton;
use crate::features::reconstruction::infrastructure::filters::{
    is_probable_external, COMMON_MACROS, C_KEYWORDS, LIBC_FUNCTIONS,
};
use crate::features::reconstruction::infrastructure::recovery::{
    extract_line_declarations, BodyScanStrategy, HeaderPatternStrategy, SliceLocalScanStrategy,
    VoidFallbackStrategy,
};
use crate::features::reconstruction::ports::{
    DeclarationContext, DeclarationOutcome, DeclarationRecovery, SignatureContext,
    SignatureRecovery,
};
use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashSet;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// How far above a function's first slice line the signature may start
const SIGNATURE_SCAN_WINDOW: u32 = 10;

static IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([a-zA-Z_]\w*)\b").expect("identifier pattern is valid"));

/// `[static] [const] [extern] <type-keyword> <declarator>` with a semicolon
static GLOBAL_DECL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(static\s+)?(const\s+)?(extern\s+)?(int|char|float|double|long|short|unsigned|signed|void|struct\s+\w+|enum\s+\w+)\s+[\*\s]*\w+",
    )
    .expect("global declaration pattern is valid")
});

/// Reconstructs one unit from a slice result plus the raw source text.
/// Independent of the analysis session; runs possibly much later.
pub struct SliceReconstructor<'a> {
    source_lines: Vec<&'a str>,
    slice_lines: &'a BTreeSet<u32>,
    function_map: &'a BTreeMap<u32, String>,
    functions: BTreeMap<String, FunctionSkeleton>,
    signature_strategies: Vec<Box<dyn SignatureRecovery>>,
    declaration_strategies: Vec<Box<dyn DeclarationRecovery>>,
}

/// Convenience entry point matching the query boundary
pub fn reconstruct(
    source: &str,
    slice_lines: &BTreeSet<u32>,
    function_map: &BTreeMap<u32, String>,
) -> String {
    SliceReconstructor::new(source, slice_lines, function_map).reconstruct()
}

impl<'a> SliceReconstructor<'a> {
    pub fn new(
        source: &'a str,
        slice_lines: &'a BTreeSet<u32>,
        function_map: &'a BTreeMap<u32, String>,
    ) -> Self {
        Self {
            source_lines: source.split('\n').collect(),
            slice_lines,
            function_map,
            functions: BTreeMap::new(),
            signature_strategies: vec![
                Box::new(HeaderPatternStrategy),
                Box::new(VoidFallbackStrategy),
            ],
            declaration_strategies: vec![
                Box::new(SliceLocalScanStrategy),
                Box::new(BodyScanStrategy),
            ],
        }
    }

    pub fn reconstruct(&mut self) -> String {
        self.analyze_functions();

        let mut lines: Vec<String> = Vec::new();
        lines.push("/* Reconstructed slice - syntax-correct but semantically incomplete */".into());
        lines.push(String::new());
        lines.push("#include <stdio.h>".into());
        lines.push("#include <stdlib.h>".into());
        lines.push("#include <string.h>".into());
        lines.push(String::new());

        let globals = self.lift_global_declarations();
        if !globals.is_empty() {
            lines.extend(globals);
            lines.push(String::new());
        }

        let names: Vec<String> = self.functions.keys().cloned().collect();
        for name in names {
            lines.extend(self.emit_function(&name));
            lines.push(String::new());
        }

        debug!(
            "reconstructed {} functions from {} slice lines",
            self.functions.len(),
            self.slice_lines.len()
        );
        lines.join("\n")
    }

    fn line(&self, line_num: u32) -> Option<&'a str> {
        if line_num == 0 {
            return None;
        }
        self.source_lines.get(line_num as usize - 1).copied()
    }

    // ═══════════════════════════════════════════════════════════════════
    // Function skeletons
    // ═══════════════════════════════════════════════════════════════════

    fn analyze_functions(&mut self) {
        let involved: BTreeSet<&String> = self.function_map.values().collect();
        let mut skeletons = BTreeMap::new();
        for name in involved {
            if let Some(skeleton) = self.extract_skeleton(name) {
                skeletons.insert(name.clone(), skeleton);
            }
        }
        self.functions = skeletons;
    }

    fn extract_skeleton(&self, name: &str) -> Option<FunctionSkeleton> {
        let func_lines: Vec<u32> = self
            .function_map
            .iter()
            .filter(|(_, f)| f.as_str() == name)
            .map(|(line, _)| *line)
            .collect();
        let first = *func_lines.iter().min()?;
        let last = *func_lines.iter().max()?;

        // scan a short window upward for an opening brace or a header-like
        // line
        let mut signature_line = first;
        let window_floor = first.saturating_sub(SIGNATURE_SCAN_WINDOW).max(1);
        let mut probe = first;
        while probe >= window_floor {
            if let Some(text) = self.line(probe) {
                let trimmed = text.trim();
                if trimmed.contains('{') || looks_like_function_start(trimmed) {
                    signature_line = probe;
                    break;
                }
            }
            if probe == window_floor {
                break;
            }
            probe -= 1;
        }

        let header_text = self.gather_header(signature_line, first);
        let ctx = SignatureContext {
            function_name: name,
            header_text: &header_text,
        };
        let (return_type, params) = self
            .signature_strategies
            .iter()
            .find_map(|strategy| strategy.recover(&ctx))
            .unwrap_or_else(|| ("void".to_string(), Vec::new()));

        let body_start = self.find_opening_brace(signature_line, first);
        let body_end = self.find_closing_brace(body_start, last);

        Some(FunctionSkeleton {
            name: name.to_string(),
            return_type,
            params,
            signature_line,
            body_start,
            body_end,
        })
    }

    /// Header text from the signature line up to and including the line
    /// with the opening brace (signatures may span lines)
    fn gather_header(&self, signature_line: u32, first_slice_line: u32) -> String {
        let mut parts = Vec::new();
        for line_num in signature_line..=first_slice_line + 5 {
            let Some(text) = self.line(line_num) else { break };
            parts.push(text);
            if text.contains('{') {
                break;
            }
        }
        parts.join(" ")
    }

    /// First line after the opening brace
    fn find_opening_brace(&self, signature_line: u32, hint: u32) -> u32 {
        for line_num in signature_line..=hint + SIGNATURE_SCAN_WINDOW {
            if let Some(text) = self.line(line_num) {
                if text.contains('{') {
                    return line_num + 1;
                }
            }
        }
        signature_line + 1
    }

    /// Closing-brace line, by brace-count balancing forward
    fn find_closing_brace(&self, body_start: u32, hint: u32) -> u32 {
        let mut depth: i32 = 1;
        for line_num in body_start..=hint + 20 {
            let Some(text) = self.line(line_num) else { break };
            depth += text.matches('{').count() as i32;
            depth -= text.matches('}').count() as i32;
            if depth <= 0 {
                return line_num;
            }
        }
        hint + 1
    }

    // ═══════════════════════════════════════════════════════════════════
    // Global declarations
    // ═══════════════════════════════════════════════════════════════════

    /// Conservative lift: only slice lines before the first function,
    /// matching the textual declaration shape; initializers are stripped
    /// and deduplicated by declared name.
    fn lift_global_declarations(&self) -> Vec<String> {
        let first_function_line = self
            .functions
            .values()
            .map(|f| f.signature_line)
            .min()
            .unwrap_or(self.source_lines.len() as u32 + 1);

        let mut declarations = Vec::new();
        let mut seen = FxHashSet::default();
        for &line_num in self.slice_lines {
            if line_num >= first_function_line {
                break;
            }
            let Some(text) = self.line(line_num) else {
                continue;
            };
            let trimmed = text.trim();
            if trimmed.is_empty()
                || trimmed.starts_with("//")
                || trimmed.starts_with("/*")
                || trimmed.starts_with('#')
            {
                continue;
            }
            if trimmed.starts_with("struct")
                || trimmed.starts_with("enum")
                || trimmed.starts_with("typedef")
            {
                continue;
            }
            if !trimmed.contains(';') || !GLOBAL_DECL_RE.is_match(trimmed) {
                continue;
            }

            let cleaned = strip_initializer(trimmed);
            if let Some(name) = declared_name(&cleaned) {
                if seen.insert(name) {
                    declarations.push(cleaned);
                }
            }
        }
        declarations
    }

    // ═══════════════════════════════════════════════════════════════════
    // Function emission
    // ═══════════════════════════════════════════════════════════════════

    fn emit_function(&self, name: &str) -> Vec<String> {
        let skeleton = &self.functions[name];
        let mut lines = Vec::new();

        let params = if skeleton.params.is_empty() {
            "void".to_string()
        } else {
            skeleton.params.join(", ")
        };
        lines.push(format!("{} {}({})", skeleton.return_type, name, params));
        lines.push("{".to_string());

        let func_slice_lines: Vec<u32> = self
            .slice_lines
            .iter()
            .copied()
            .filter(|line| {
                self.function_map
                    .get(line)
                    .is_some_and(|f| f.as_str() == name)
            })
            .collect();

        if func_slice_lines.is_empty() {
            lines.push("    /* Empty slice */".to_string());
            lines.push("}".to_string());
            return lines;
        }

        let recovered = self.recover_declarations(skeleton, &func_slice_lines);
        if !recovered.is_empty() {
            lines.push("    /* Auto-recovered variable declarations */".to_string());
            for decl in recovered {
                lines.push(format!("    {} {};", decl.type_str, decl.name));
            }
            lines.push(String::new());
        }

        lines.extend(self.emit_body(&func_slice_lines));
        lines.push("}".to_string());
        lines
    }

    /// Identifiers used in the slice but declared by no slice line: re-scan
    /// the whole body through the strategy chain; identifiers found nowhere
    /// are assumed externally supplied and skipped.
    fn recover_declarations(
        &self,
        skeleton: &FunctionSkeleton,
        func_slice_lines: &[u32],
    ) -> Vec<crate::features::reconstruction::domain::VariableDeclaration> {
        let ctx = DeclarationContext {
            source_lines: &self.source_lines,
            slice_lines: func_slice_lines,
            body_start: skeleton.body_start,
            body_end: skeleton.body_end,
        };

        let mut recovered = Vec::new();
        let mut used: Vec<String> = self
            .used_identifiers(func_slice_lines)
            .into_iter()
            .collect();
        used.sort();

        for variable in used {
            let outcome = self
                .declaration_strategies
                .iter()
                .find_map(|strategy| strategy.attempt(&variable, &ctx));
            if let Some(DeclarationOutcome::Recovered(decl)) = outcome {
                recovered.push(decl);
            }
        }
        recovered
    }

    /// Identifiers appearing on the slice lines, filtered down to plausible
    /// local variables
    fn used_identifiers(&self, func_slice_lines: &[u32]) -> FxHashSet<String> {
        let mut used = FxHashSet::default();
        for &line_num in func_slice_lines {
            let Some(text) = self.line(line_num) else {
                continue;
            };
            for captures in IDENTIFIER_RE.captures_iter(text) {
                if let Some(matched) = captures.get(1) {
                    used.insert(matched.as_str().to_string());
                }
            }
        }

        used.retain(|identifier| {
            !C_KEYWORDS.contains(identifier.as_str())
                && !LIBC_FUNCTIONS.contains(identifier.as_str())
                && !COMMON_MACROS.contains(identifier.as_str())
                && !self.functions.contains_key(identifier)
                && !is_probable_external(identifier)
        });
        used
    }

    /// Slice lines in increasing order, with elision markers at every gap
    /// and a line-number comment on every emitted line
    fn emit_body(&self, func_slice_lines: &[u32]) -> Vec<String> {
        let mut lines = Vec::new();
        let mut indent_level: usize = 1;
        let mut prev_line: u32 = 0;

        for &line_num in func_slice_lines {
            let Some(text) = self.line(line_num) else {
                continue;
            };
            if prev_line > 0 && line_num - prev_line > 1 {
                lines.push(String::new());
                lines.push("    /* ... */".to_string());
                lines.push(String::new());
            }

            let trimmed = text.trim();
            if !trimmed.is_empty() {
                let indent = if trimmed.starts_with('}') {
                    indent_level.saturating_sub(1).max(1)
                } else {
                    indent_level
                };
                lines.push(format!(
                    "{}{}  // Line {}",
                    "    ".repeat(indent),
                    trimmed,
                    line_num
                ));
            }

            let opens = text.matches('{').count();
            let closes = text.matches('}').count();
            indent_level = indent_level.saturating_add(opens).saturating_sub(closes).max(1);
            prev_line = line_num;
        }
        lines
    }
}

fn looks_like_function_start(line: &str) -> bool {
    line.contains('(') && line.contains(')') && !line.starts_with("//")
}

/// Strip the initializer from a declaration, keeping a marker comment
fn strip_initializer(line: &str) -> String {
    match line.find('=') {
        Some(eq_pos) => {
            let head = line[..eq_pos].trim_end();
            format!("{head};  /* initializer removed */")
        }
        None => line.to_string(),
    }
}

/// Declared name: the last identifier token that is not a type keyword
fn declared_name(declaration: &str) -> Option<String> {
    let cleaned = declaration.split("/*").next().unwrap_or(declaration);
    let cleaned = cleaned.split("//").next().unwrap_or(cleaned);
    let cleaned = cleaned.replace(';', " ");

    let type_keywords = [
        "int", "char", "float", "double", "long", "short", "unsigned", "signed", "void", "const",
        "static", "extern", "struct", "enum", "union",
    ];
    IDENTIFIER_RE
        .captures_iter(&cleaned)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|token| !type_keywords.contains(&token.as_str()))
        .last()
}
