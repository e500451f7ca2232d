use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::attachments::CopyOutcome;
use crate::content_tree::RenameMapping;
use crate::diagnostics::Warning;

/// Pages changed by each text rewrite step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RewriteCounts {
    pub links: usize,
    pub trailing_sections: usize,
    pub image_references: usize,
    pub divs: usize,
    pub headings: usize,
}

/// Summary of one migration run
#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    pub source: PathBuf,
    pub target: PathBuf,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Tree nodes including the root
    pub node_count: usize,
    /// Pages listed in the index
    pub page_count: usize,
    /// Page files found and copied, the root page included
    pub pages_copied: usize,
    pub attachments: CopyOutcome,
    pub rewrites: RewriteCounts,
    pub mapping: RenameMapping,
    pub warnings: Vec<Warning>,
}

impl MigrationReport {
    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}
