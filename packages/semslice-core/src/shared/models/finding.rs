//! Static-analyzer finding record
//!
//! The input schema at the boundary: one defect report resolved against a
//! repository root by the caller. Ingestion of raw tool reports happens
//! upstream and is not part of this crate.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One static-analyzer finding: a (project, file, line) triple
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Project directory name (with version suffix, e.g. `vim-8.2`)
    pub project: String,
    /// File path relative to the project directory
    pub file: String,
    /// 1-indexed defect line
    pub line: u32,
}

impl Finding {
    pub fn new(project: impl Into<String>, file: impl Into<String>, line: u32) -> Self {
        Self {
            project: project.into(),
            file: file.into(),
            line,
        }
    }

    /// Resolve this finding against a repository root into a concrete path
    pub fn resolve(&self, repo_root: &Path) -> PathBuf {
        repo_root.join(&self.project).join(&self.file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve() {
        let finding = Finding::new("vim-8.2", "src/buffer.c", 120);
        let path = finding.resolve(Path::new("/data/repos"));
        assert_eq!(path, PathBuf::from("/data/repos/vim-8.2/src/buffer.c"));
    }
}
