//! Table of contents emission for the migrated tree.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::MigrationConfig;
use crate::content_tree::{ContentTree, NodeId};
use crate::error::Result;

/// Renders a content tree into a book's table of contents file
pub trait TocGenerator {
    /// File name written at the target root
    fn file_name(&self) -> &str;

    fn render(&self, tree: &ContentTree) -> Result<String>;

    /// Render and write into `target_root`; returns the written path
    fn write(&self, tree: &ContentTree, target_root: &Path) -> Result<PathBuf> {
        let path = target_root.join(self.file_name());
        fs::write(&path, self.render(tree)?)?;
        log::info!("Wrote table of contents to {}", path.display());
        Ok(path)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TocEntry {
    pub file: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<TocEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TocDocument {
    pub format: String,
    pub root: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<TocEntry>,
}

/// Jupyter Book `_toc.yml`: the index page as root, then nested sections
/// following the tree, each naming its page path without extension.
#[derive(Debug, Clone)]
pub struct JupyterBookToc {
    pub format: String,
    pub file_name: String,
}

impl JupyterBookToc {
    pub fn from_config(config: &MigrationConfig) -> Self {
        Self {
            format: config.toc_format.clone(),
            file_name: config.toc_file.clone(),
        }
    }

    fn entries(tree: &ContentTree, parent: NodeId) -> Vec<TocEntry> {
        tree.children(parent)
            .iter()
            .map(|&child| TocEntry {
                file: tree.relative_path(child),
                sections: Self::entries(tree, child),
            })
            .collect()
    }

    pub fn document(&self, tree: &ContentTree) -> TocDocument {
        TocDocument {
            format: self.format.clone(),
            root: tree.root().identifier.clone(),
            sections: Self::entries(tree, NodeId::ROOT),
        }
    }
}

impl TocGenerator for JupyterBookToc {
    fn file_name(&self) -> &str {
        &self.file_name
    }

    fn render(&self, tree: &ContentTree) -> Result<String> {
        Ok(serde_yaml::to_string(&self.document(tree))?)
    }
}
