//! Migration settings.
//!
//! Defaults describe the layout of a wiki space export converted to markdown:
//! an `index.md` listing every page under "Available Pages:", one flat `.md`
//! per page, and attachments stored as `attachments/<page id>/<file id>`.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MigrationError, Result};

/// What to do with the level map when a document repeats its depth-1 heading
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadingPolicy {
    /// Demote every level assigned so far by one, once
    #[default]
    Shift,
    /// Forget earlier assignments and start over from depth 1
    Reset,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationConfig {
    /// Index document name inside the source directory
    pub index_file: String,
    /// Heading text that introduces the page list in the index
    pub index_marker: String,
    /// Page file extension, without the dot
    pub page_extension: String,
    /// Substrings removed, in order, from identifiers to form directory names
    pub removable_substrings: Vec<String>,
    /// Heading that opens a page's attachment manifest
    pub attachments_heading: String,
    /// Media type routed through diagram inflation
    pub diagram_media_type: String,
    /// Suffix appended to inflated diagram files
    pub diagram_suffix: String,
    /// Directory under the target root holding per-page attachment folders
    pub attachments_dir: String,
    /// Footer markers; pages are truncated at the earliest one
    pub trailing_section_markers: Vec<String>,
    pub heading_policy: HeadingPolicy,
    /// Table of contents file written at the target root
    pub toc_file: String,
    pub toc_format: String,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            index_file: "index.md".to_string(),
            index_marker: "Available Pages:".to_string(),
            page_extension: "md".to_string(),
            removable_substrings: Vec::new(),
            attachments_heading: "## Attachments".to_string(),
            diagram_media_type: "application/vnd.jgraph.mxfile".to_string(),
            diagram_suffix: ".drawio.xml".to_string(),
            attachments_dir: "attachments".to_string(),
            trailing_section_markers: vec![
                "<div class=\"pageSectionHeader\">\n\n## Attachments:".to_string(),
                "<div class=\"pageSectionHeader\">\n\n## Comments:".to_string(),
                "## Change History".to_string(),
            ],
            heading_policy: HeadingPolicy::Shift,
            toc_file: "_toc.yml".to_string(),
            toc_format: "jb-article".to_string(),
        }
    }
}

impl MigrationConfig {
    /// Load settings from a TOML file. Keys left out keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(MigrationError::NotFound(format!(
                "config file {}",
                path.display()
            )));
        }
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Index file name without its extension, used as the root identifier
    pub fn index_stem(&self) -> &str {
        let suffix = format!(".{}", self.page_extension);
        self.index_file
            .strip_suffix(suffix.as_str())
            .unwrap_or(&self.index_file)
    }

    /// File name of a page given its segment or identifier
    pub fn page_file_name(&self, stem: &str) -> String {
        format!("{}.{}", stem, self.page_extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = MigrationConfig::default();
        assert_eq!(config.index_stem(), "index");
        assert_eq!(config.page_file_name("Home"), "Home.md");
        assert_eq!(config.heading_policy, HeadingPolicy::Shift);
        assert_eq!(config.trailing_section_markers.len(), 3);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = MigrationConfig::from_toml(
            r#"
removable_substrings = ["ACME_-_", "_(archived)"]
heading_policy = "reset"
"#,
        )
        .unwrap();

        assert_eq!(config.removable_substrings, vec!["ACME_-_", "_(archived)"]);
        assert_eq!(config.heading_policy, HeadingPolicy::Reset);
        assert_eq!(config.index_marker, "Available Pages:");
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = MigrationConfig::load(&temp_dir.path().join("nope.toml"));
        assert!(matches!(result, Err(MigrationError::NotFound(_))));
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("restack.toml");
        fs::write(&path, "index_file = \"home.md\"\n").unwrap();

        let config = MigrationConfig::load(&path).unwrap();
        assert_eq!(config.index_stem(), "home");
    }
}
