use std::fs;
use std::ops::AddAssign;
use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::WalkDir;

use super::dedupe::find_duplicates;
use super::models::{AssetKind, Attachment, AttachmentManifest};
use crate::config::MigrationConfig;
use crate::diagnostics::{Diagnostics, Warning};
use crate::diagram::DiagramInflater;
use crate::error::Result;

/// Files written and files left out while copying attachments
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CopyOutcome {
    pub copied: usize,
    pub skipped: usize,
}

impl CopyOutcome {
    pub fn total(&self) -> usize {
        self.copied + self.skipped
    }
}

impl AddAssign for CopyOutcome {
    fn add_assign(&mut self, other: Self) {
        self.copied += other.copied;
        self.skipped += other.skipped;
    }
}

/// Everything an attachment copy needs to know about its page
pub struct CopyContext<'a> {
    /// Root of the flat export
    pub source_root: &'a Path,
    /// `<target>/<attachments_dir>/<page path>`
    pub attachment_dir: &'a Path,
    /// The migrated page file; diagrams are written next to it
    pub page_file: &'a Path,
    pub page: &'a str,
    pub config: &'a MigrationConfig,
    pub inflater: &'a dyn DiagramInflater,
}

/// `name` for the first distinct file, `stem_idx.ext` after that
fn numbered_name(name: &str, idx: usize) -> String {
    if idx == 0 {
        return name.to_string();
    }
    let path = Path::new(name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| name.to_string());
    match path.extension() {
        Some(ext) => format!("{}_{}.{}", stem, idx, ext.to_string_lossy()),
        None => format!("{}_{}", stem, idx),
    }
}

fn destination_for(ctx: &CopyContext<'_>, kind: AssetKind, name: &str) -> PathBuf {
    match kind {
        AssetKind::Diagram => {
            let page_dir = ctx.page_file.parent().unwrap_or(ctx.attachment_dir);
            page_dir.join(format!("{}{}", name, ctx.config.diagram_suffix))
        }
        AssetKind::Generic => ctx.attachment_dir.join(name),
    }
}

/// Copy every distinct file of one attachment.
///
/// All uploads are pooled regardless of media type and deduplicated by
/// content. Each distinct file gets the meaningful name, numbered from the
/// second one on; byte-identical uploads are counted as skipped.
pub fn copy_attachment(
    ctx: &CopyContext<'_>,
    attachment: &mut Attachment,
    diagnostics: &mut Diagnostics,
) -> Result<CopyOutcome> {
    let sources: Vec<PathBuf> = attachment
        .all_paths()
        .map(|p| ctx.source_root.join(p))
        .collect();
    let kind = attachment.kind(&ctx.config.diagram_media_type);
    let mut outcome = CopyOutcome::default();
    let mut idx = 0;

    for group in find_duplicates(&sources)? {
        outcome.skipped += group.duplicates.len();
        let destination = destination_for(
            ctx,
            kind,
            &numbered_name(&attachment.meaningful_name, idx),
        );

        if !group.representative.is_file() {
            diagnostics.warn(Warning::MissingAttachmentSource {
                page: ctx.page.to_string(),
                source: group.representative.clone(),
                destination,
            });
            outcome.skipped += 1;
            continue;
        }

        if destination.exists() {
            diagnostics.warn(Warning::DestinationOverwritten {
                page: ctx.page.to_string(),
                destination: destination.clone(),
            });
        }

        match kind {
            AssetKind::Diagram => match ctx.inflater.inflate(&group.representative) {
                Ok(xml) => fs::write(&destination, xml)?,
                Err(e) => {
                    diagnostics.warn(Warning::DiagramInflateFailed {
                        page: ctx.page.to_string(),
                        source: group.representative.clone(),
                        reason: e.to_string(),
                    });
                    outcome.skipped += 1;
                    continue;
                }
            },
            AssetKind::Generic => {
                fs::copy(&group.representative, &destination)?;
            }
        }
        outcome.copied += 1;

        if attachment.destination.is_some() {
            attachment.multiple_copies = true;
            diagnostics.warn(Warning::MultipleCopies {
                page: ctx.page.to_string(),
                name: attachment.meaningful_name.clone(),
                destination: destination.clone(),
            });
        }
        attachment.destination = Some(destination);
        idx += 1;
    }

    Ok(outcome)
}

/// Regular files directly inside `dir`; a missing directory counts as empty
pub fn count_source_files(dir: &Path) -> usize {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .count()
}

/// Copy all attachments of one page and check the result against the
/// page's source directory.
///
/// Every file in the source directory must end up either copied or
/// skipped; a mismatch is reported, never fatal.
pub fn copy_page_attachments(
    manifest: &mut AttachmentManifest,
    source_root: &Path,
    target_root: &Path,
    page_file: &Path,
    config: &MigrationConfig,
    inflater: &dyn DiagramInflater,
    diagnostics: &mut Diagnostics,
) -> Result<CopyOutcome> {
    let attachment_dir = target_root
        .join(&config.attachments_dir)
        .join(&manifest.page_name);
    fs::create_dir_all(&attachment_dir)?;

    let page = manifest.page_name.clone();
    let ctx = CopyContext {
        source_root,
        attachment_dir: &attachment_dir,
        page_file,
        page: &page,
        config,
        inflater,
    };

    let mut outcome = CopyOutcome::default();
    for attachment in manifest.attachments.iter_mut() {
        outcome += copy_attachment(&ctx, attachment, diagnostics)?;
    }

    if let Some(source_dir) = manifest.source_dir(source_root) {
        let source_count = count_source_files(&source_dir);
        if source_count != outcome.total() {
            diagnostics.warn(Warning::IntegrityMismatch {
                page: page.clone(),
                source_dir,
                copied: outcome.copied,
                skipped: outcome.skipped,
                source_count,
            });
        }
    }

    log::info!(
        "Page '{}': {} attachment files copied, {} skipped",
        page,
        outcome.copied,
        outcome.skipped
    );
    Ok(outcome)
}
