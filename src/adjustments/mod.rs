//! Hand-edit support after a migration.
//!
//! A grep over the migrated pages is turned into a JSON change file of
//! `[old, new]` pairs per page. After the `new` side has been edited, the
//! changes are applied, and a later check lists the changes whose new text
//! is no longer present.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use regex::RegexBuilder;
use serde::Serialize;

use crate::diagnostics::{Diagnostics, Warning};
use crate::error::Result;
use crate::rewrite::rewrite_in_place;

/// Page file (relative to the target root) to its `(old, new)` replacements
pub type ChangeSet = BTreeMap<String, Vec<(String, String)>>;

/// Changes of one file whose new text was not found
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckResult {
    pub file: String,
    pub missing: Vec<usize>,
}

/// Build a change template from `grep` output lines such as
/// `Guide/Install.md:## Setup`. Each match starts as an unchanged pair.
pub fn generate_template(grep_output: &str, page_extension: &str) -> ChangeSet {
    let separator = format!(".{}:", page_extension);
    let mut changes = ChangeSet::new();

    for line in grep_output.lines().filter(|l| !l.trim().is_empty()) {
        let Some((file, text)) = line.split_once(separator.as_str()) else {
            log::debug!("Skipping grep line without a page file: {}", line);
            continue;
        };
        changes
            .entry(format!("{}.{}", file, page_extension))
            .or_default()
            .push((text.to_string(), text.to_string()));
    }

    changes
}

pub fn load_changes(path: &Path) -> Result<ChangeSet> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

pub fn save_changes(changes: &ChangeSet, path: &Path) -> Result<()> {
    fs::write(path, serde_json::to_string_pretty(changes)?)?;
    Ok(())
}

/// Apply every replacement. Returns the number of files rewritten.
pub fn execute(changes: &ChangeSet, target_root: &Path, diagnostics: &mut Diagnostics) -> Result<usize> {
    let mut rewritten = 0;

    for (file, replacements) in changes {
        let path = target_root.join(file);
        if !path.is_file() {
            diagnostics.warn(Warning::AdjustmentFileMissing { file: path });
            continue;
        }

        let changed = rewrite_in_place(&path, |text| {
            let mut data = text.to_string();
            for (old, new) in replacements {
                if data.contains(old.as_str()) {
                    data = data.replace(old.as_str(), new);
                } else {
                    diagnostics.warn(Warning::AdjustmentTextNotFound {
                        file: path.clone(),
                        text: old.clone(),
                    });
                }
            }
            Ok(data)
        })?;
        if changed {
            rewritten += 1;
        }
    }

    log::info!("Applied adjustments to {} files", rewritten);
    Ok(rewritten)
}

/// Whether a change's new text is present. Heading changes must appear at
/// the start of a line.
fn change_applied(data: &str, old: &str, new: &str) -> bool {
    if !old.starts_with('#') {
        return data.contains(new);
    }
    RegexBuilder::new(&format!("^{}", regex::escape(new)))
        .multi_line(true)
        .case_insensitive(true)
        .build()
        .map(|re| re.is_match(data))
        .unwrap_or(false)
}

/// Report, per file, the indices of changes whose new text is absent.
pub fn check(changes: &ChangeSet, target_root: &Path, diagnostics: &mut Diagnostics) -> Result<Vec<CheckResult>> {
    let mut results = Vec::new();

    for (file, replacements) in changes {
        let path = target_root.join(file);
        if !path.is_file() {
            diagnostics.warn(Warning::AdjustmentFileMissing { file: path });
            continue;
        }
        let data = fs::read_to_string(&path)?;
        let missing: Vec<usize> = replacements
            .iter()
            .enumerate()
            .filter(|(_, (old, new))| !change_applied(&data, old, new))
            .map(|(idx, _)| idx)
            .collect();
        if !missing.is_empty() {
            results.push(CheckResult {
                file: file.clone(),
                missing,
            });
        }
    }

    Ok(results)
}
