//! Per-line statement facts
//!
//! For every line covered by a recognized statement kind, the extractor
//! records def/use, pointer, array, field, call and control-dependency
//! facts. A multi-line construct attaches identical facts to every line it
//! spans, so any contained line can anchor a query.

pub mod domain;
pub mod infrastructure;

pub use domain::{AliasFact, AliasFactKind, Statement, StatementKind, StatementTable};
pub use infrastructure::{ControlDependencyBuilder, StatementExtractor};
