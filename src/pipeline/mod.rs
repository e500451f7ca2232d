//! Migration orchestration.
//!
//! Every stage runs over the whole tree before the next one starts: the
//! tree and attachments must be complete before any page text is rewritten.

mod report;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;

pub use report::{MigrationReport, RewriteCounts};

use crate::attachments::{copy_page_attachments, parse_manifest, AttachmentManifest, CopyOutcome};
use crate::config::MigrationConfig;
use crate::content_tree::{build_content_tree, ContentTree, RenameMapping};
use crate::diagnostics::{Diagnostics, Warning};
use crate::diagram::{DiagramInflater, DrawioInflater};
use crate::error::{MigrationError, Result};
use crate::headings::reconcile;
use crate::rewrite::{
    fixup_divs, rewrite_image_references, rewrite_in_place, rewrite_links, strip_trailing_sections,
    ImageContext,
};
use crate::toc::{JupyterBookToc, TocGenerator};

/// A migrated page file and its attachments, if it lists any
struct Page {
    path: PathBuf,
    /// Unique per page: the hierarchical path, or the index stem for the root
    name: String,
    manifest: Option<AttachmentManifest>,
}

/// Runs a migration with pluggable diagram and table of contents handling
pub struct Migrator<'a> {
    config: &'a MigrationConfig,
    inflater: &'a dyn DiagramInflater,
    toc: &'a dyn TocGenerator,
}

impl<'a> Migrator<'a> {
    pub fn new(config: &'a MigrationConfig, inflater: &'a dyn DiagramInflater, toc: &'a dyn TocGenerator) -> Self {
        Self { config, inflater, toc }
    }

    /// Flat source file of a node. Identifiers that already end in the page
    /// extension are used as is.
    fn source_page(&self, source: &Path, identifier: &str) -> PathBuf {
        let suffix = format!(".{}", self.config.page_extension);
        if identifier.ends_with(&suffix) {
            source.join(identifier)
        } else {
            source.join(self.config.page_file_name(identifier))
        }
    }

    fn copy_pages(&self, source: &Path, tree: &ContentTree, diagnostics: &mut Diagnostics) -> Result<Vec<Page>> {
        let mut pages = Vec::new();

        for id in tree.preorder() {
            let node = tree.node(id);
            if node.has_children() {
                fs::create_dir_all(node.path())?;
            }
            let from = self.source_page(source, &node.identifier);
            if !from.is_file() {
                diagnostics.warn(Warning::MissingPage {
                    identifier: node.identifier.clone(),
                    source: from,
                });
                continue;
            }
            let to = tree.page_file(id, &self.config.page_extension);
            fs::copy(&from, &to)?;
            let relative = tree.relative_path(id);
            pages.push(Page {
                name: if relative.is_empty() {
                    self.config.index_stem().to_string()
                } else {
                    relative
                },
                path: to,
                manifest: None,
            });
        }

        log::info!("Copied {} of {} pages", pages.len(), tree.len());
        Ok(pages)
    }

    fn copy_attachments(
        &self,
        source: &Path,
        target: &Path,
        pages: &mut [Page],
        diagnostics: &mut Diagnostics,
    ) -> Result<CopyOutcome> {
        let mut outcome = CopyOutcome::default();

        for page in pages.iter_mut() {
            let text = fs::read_to_string(&page.path)?;
            let Some(mut manifest) = parse_manifest(&text, &page.name, self.config, diagnostics) else {
                continue;
            };
            if !manifest.is_empty() {
                outcome += copy_page_attachments(
                    &mut manifest,
                    source,
                    target,
                    &page.path,
                    self.config,
                    self.inflater,
                    diagnostics,
                )?;
            }
            page.manifest = Some(manifest);
        }

        Ok(outcome)
    }

    fn rewrite_pages(
        &self,
        source: &Path,
        target: &Path,
        pages: &[Page],
        mapping: &RenameMapping,
        diagnostics: &mut Diagnostics,
    ) -> Result<RewriteCounts> {
        let mut counts = RewriteCounts::default();
        let config = self.config;

        for page in pages {
            if rewrite_in_place(&page.path, |text| Ok(rewrite_links(text, mapping)))? {
                counts.links += 1;
            }
        }
        for page in pages {
            let markers = &config.trailing_section_markers;
            if rewrite_in_place(&page.path, |text| Ok(strip_trailing_sections(text, markers).to_string()))? {
                counts.trailing_sections += 1;
            }
        }
        for page in pages {
            let ctx = ImageContext {
                source_root: source,
                target_root: target,
                page: &page.name,
                manifest: page.manifest.as_ref(),
                config,
            };
            if rewrite_in_place(&page.path, |text| rewrite_image_references(text, &ctx, diagnostics))? {
                counts.image_references += 1;
            }
        }
        for page in pages {
            if rewrite_in_place(&page.path, |text| Ok(fixup_divs(text)))? {
                counts.divs += 1;
            }
        }
        for page in pages {
            let document = page.path.display().to_string();
            let reconciled = rewrite_in_place(&page.path, |text| {
                Ok(reconcile(text, config.heading_policy, &document, diagnostics))
            })?;
            if reconciled {
                counts.headings += 1;
            }
        }

        Ok(counts)
    }

    /// Migrate the export in `source` into a hierarchical tree in `target`.
    ///
    /// Fails only when the index document is missing or the target cannot
    /// be written; every other anomaly becomes a warning in the report.
    pub fn run(&self, source: &Path, target: &Path) -> Result<MigrationReport> {
        let started_at = Utc::now();
        let mut diagnostics = Diagnostics::new();

        let index_path = source.join(&self.config.index_file);
        if !index_path.is_file() {
            return Err(MigrationError::NotFound(format!(
                "index document {}",
                index_path.display()
            )));
        }
        fs::create_dir_all(target)?;
        log::info!("Migrating {} into {}", source.display(), target.display());

        let index_text = fs::read_to_string(&index_path)?;
        let tree = build_content_tree(&index_text, target, self.config, &mut diagnostics);
        let mapping = RenameMapping::from_tree(&tree, &mut diagnostics);
        if mapping.is_empty() {
            diagnostics.warn(Warning::EmptyContentTree);
        }

        self.toc.write(&tree, target)?;
        let mut pages = self.copy_pages(source, &tree, &mut diagnostics)?;
        let attachments = self.copy_attachments(source, target, &mut pages, &mut diagnostics)?;
        let rewrites = self.rewrite_pages(source, target, &pages, &mapping, &mut diagnostics)?;

        let report = MigrationReport {
            source: source.to_path_buf(),
            target: target.to_path_buf(),
            started_at,
            finished_at: Utc::now(),
            node_count: tree.len(),
            page_count: tree.page_count(),
            pages_copied: pages.len(),
            attachments,
            rewrites,
            mapping,
            warnings: diagnostics.into_warnings(),
        };
        log::info!(
            "Migration finished in {} ms: {} pages, {} attachment files copied, {} warnings",
            report.duration_ms(),
            report.pages_copied,
            report.attachments.copied,
            report.warnings.len()
        );
        Ok(report)
    }
}

/// Migrate with draw.io inflation and a Jupyter Book table of contents
pub fn migrate(source: &Path, target: &Path, config: &MigrationConfig) -> Result<MigrationReport> {
    let toc = JupyterBookToc::from_config(config);
    Migrator::new(config, &DrawioInflater, &toc).run(source, target)
}

/// Build the content tree of an export without writing anything
pub fn preview_tree(source: &Path, config: &MigrationConfig, diagnostics: &mut Diagnostics) -> Result<ContentTree> {
    let index_path = source.join(&config.index_file);
    if !index_path.is_file() {
        return Err(MigrationError::NotFound(format!(
            "index document {}",
            index_path.display()
        )));
    }
    let index_text = fs::read_to_string(&index_path)?;
    Ok(build_content_tree(&index_text, Path::new(""), config, diagnostics))
}
