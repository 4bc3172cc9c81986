/*
 * semslice-core - Semantic defect slicing for C/C++
 *
 * Feature-First Architecture:
 * - shared/      : Common models and tree-sitter utilities
 * - features/    : Pipeline stages (parsing → indexing → statements →
 *                  aliasing → slicing → reconstruction)
 * - api/         : Query boundary (per-file sessions, finding records)
 *
 * Given a static-analyzer finding (file, line), the pipeline parses one
 * translation unit, derives def/use, control-dependency, pointer-alias and
 * interprocedural-effect facts, slices bidirectionally from the target
 * line, and reconstructs a syntactically self-consistent fragment from the
 * resulting line set. Nothing here requires the analyzed project to build.
 */

#![allow(clippy::collapsible_if)] // Readability over brevity
#![allow(clippy::collapsible_else_if)] // else if clarity
#![allow(clippy::single_match)] // Single match for readability
#![allow(clippy::needless_range_loop)] // Range loop for node indexing

/// Query boundary (sessions, finding records, batch helpers)
pub mod api;

/// Error types
pub mod errors;

/// Feature modules (pipeline stages)
pub mod features;

/// Shared models and utilities
pub mod shared;

// ═══════════════════════════════════════════════════════════════════════════
// Re-exports for Public API
// ═══════════════════════════════════════════════════════════════════════════

pub use api::{
    slice_file, slice_finding, slice_findings, FileAnalysis, FindingRecord,
    REASON_FILE_NOT_FOUND, REASON_PARSE_FAILED,
};
pub use errors::{Result, SemsliceError};
pub use features::parsing::{Dialect, SourceUnit, TranslationUnitParser};
pub use features::reconstruction::reconstruct;
pub use features::slicing::{SliceConfig, SliceResult};
pub use shared::models::Finding;
