//! Indexing infrastructure

mod indexer;

pub use indexer::ProgramIndexer;
