//! Query boundary
//!
//! One `FileAnalysis` per file (parse + index + statements + aliases), one
//! `slice` call per (file, line) query, and total helpers for
//! finding-driven callers: failures come back in-band as reason strings so
//! batch drivers can continue past individual files.

use crate::errors::Result;
use crate::features::aliasing::{AliasPropagator, AliasTable};
use crate::features::indexing::{ProgramIndex, ProgramIndexer};
use crate::features::parsing::{Dialect, SourceUnit, TranslationUnitParser};
use crate::features::reconstruction;
use crate::features::slicing::infrastructure::{AnchorExtractor, FALLBACK_ANCHOR};
use crate::features::slicing::{SliceConfig, SliceResult, SlicingEngine};
use crate::features::statements::{ControlDependencyBuilder, StatementExtractor, StatementTable};
use crate::shared::models::Finding;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::warn;

pub const REASON_FILE_NOT_FOUND: &str = "file_not_found";
pub const REASON_PARSE_FAILED: &str = "parse_failed";

/// All per-file analysis state, rebuilt per file and owned by one session.
/// Queries against different files must use separate `FileAnalysis` values;
/// there is no internal locking.
pub struct FileAnalysis {
    unit: SourceUnit,
    index: ProgramIndex,
    statements: StatementTable,
    aliases: AliasTable,
    config: SliceConfig,
}

impl FileAnalysis {
    /// Read, parse and index one file (dialect picked by extension)
    pub fn analyze(path: &Path, config: &SliceConfig) -> Result<Self> {
        let mut parser = TranslationUnitParser::new();
        let unit = parser.parse_file(path)?;
        Ok(Self::from_unit(unit, config))
    }

    /// Analyze source text already in memory
    pub fn analyze_source(
        path: &str,
        dialect: Dialect,
        source: String,
        config: &SliceConfig,
    ) -> Result<Self> {
        let mut parser = TranslationUnitParser::new();
        let unit = parser.parse_source(path, dialect, source)?;
        Ok(Self::from_unit(unit, config))
    }

    fn from_unit(unit: SourceUnit, config: &SliceConfig) -> Self {
        let mut index = ProgramIndexer::build(&unit);
        let mut statements = StatementExtractor::extract(&unit, &index);
        ControlDependencyBuilder::build(&unit, &mut statements);
        let (aliases, _stats) =
            AliasPropagator::new(config.alias_max_iterations).propagate(&mut statements);
        index.pointer_aliases = aliases.clone();
        Self {
            unit,
            index,
            statements,
            aliases,
            config: config.clone(),
        }
    }

    pub fn source(&self) -> &str {
        self.unit.source()
    }

    pub fn path(&self) -> &str {
        self.unit.path()
    }

    /// Slice at a target line. Total: an unanchorable line degrades to the
    /// sentinel anchor and a near-empty slice.
    pub fn slice(&self, target_line: u32) -> SliceResult {
        let mut anchors = AnchorExtractor::extract(&self.unit, target_line);
        if anchors.is_empty() {
            warn!(
                "no anchors at line {} in {}; using sentinel",
                target_line,
                self.unit.path()
            );
            anchors.insert(FALLBACK_ANCHOR.to_string());
        }

        let engine = SlicingEngine::new(&self.index, &self.statements, &self.aliases, &self.config);
        let slice_lines = engine.slice(target_line, &anchors);

        let mut function_map = BTreeMap::new();
        for &line in &slice_lines {
            if let Some(function) = self.statements.function_of(line) {
                function_map.insert(line, function.to_string());
            }
        }

        SliceResult {
            target_file: self.unit.path().to_string(),
            target_line,
            anchors,
            slice_lines,
            function_map,
        }
    }

    /// Reconstruct a slice of this file into one syntactically regular unit
    pub fn reconstruct(&self, result: &SliceResult) -> String {
        reconstruction::reconstruct(
            self.unit.source(),
            &result.slice_lines,
            &result.function_map,
        )
    }
}

/// One-shot convenience for a single (file, line) query
pub fn slice_file(path: &Path, target_line: u32, config: &SliceConfig) -> Result<SliceResult> {
    let analysis = FileAnalysis::analyze(path, config)?;
    Ok(analysis.slice(target_line))
}

/// Batch record for one finding; failures are in-band reason strings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindingRecord {
    pub project: String,
    pub file: String,
    pub line: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<SliceResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FindingRecord {
    fn success(finding: &Finding, result: SliceResult) -> Self {
        Self {
            project: finding.project.clone(),
            file: finding.file.clone(),
            line: finding.line,
            result: Some(result),
            error: None,
        }
    }

    fn failure(finding: &Finding, reason: &str) -> Self {
        Self {
            project: finding.project.clone(),
            file: finding.file.clone(),
            line: finding.line,
            result: None,
            error: Some(reason.to_string()),
        }
    }
}

/// Slice one finding resolved against a repository root. Never fails the
/// caller: missing files and parse failures come back as records.
pub fn slice_finding(repo_root: &Path, finding: &Finding, config: &SliceConfig) -> FindingRecord {
    let path = finding.resolve(repo_root);
    if !path.exists() {
        return FindingRecord::failure(finding, REASON_FILE_NOT_FOUND);
    }
    match slice_file(&path, finding.line, config) {
        Ok(result) => FindingRecord::success(finding, result),
        Err(err) => {
            warn!("slice failed for {}: {err}", path.display());
            FindingRecord::failure(finding, REASON_PARSE_FAILED)
        }
    }
}

/// Slice many findings in parallel; every query owns an independent
/// analysis session, so no state is shared between workers.
pub fn slice_findings(
    repo_root: &Path,
    findings: &[Finding],
    config: &SliceConfig,
) -> Vec<FindingRecord> {
    findings
        .par_iter()
        .map(|finding| slice_finding(repo_root, finding, config))
        .collect()
}
