use std::path::Path;

use regex::Regex;

use super::tree::{ContentTree, NodeId};
use crate::config::MigrationConfig;
use crate::diagnostics::{Diagnostics, Warning};

/// A link bullet from the index page list
#[derive(Debug, Clone, PartialEq)]
pub struct IndexItem {
    /// Indentation column of the bullet marker
    pub indent: usize,
    pub title: String,
    pub identifier: String,
}

/// Matches a bullet whose first content is a link. The link text may wrap
/// onto continuation lines.
fn bullet_link_regex() -> Regex {
    Regex::new(r"(?ms)^([ \t]*)[-*+][ \t]+\[(.*?)\]\(([^)\s]*)\)").unwrap()
}

/// Tabs count as four columns
fn indent_width(indent: &str) -> usize {
    indent
        .chars()
        .map(|c| if c == '\t' { 4 } else { 1 })
        .sum()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extract the link bullets that follow `marker`, in document order.
///
/// Returns `None` when the marker is absent.
pub fn parse_index_items(index_text: &str, marker: &str) -> Option<Vec<IndexItem>> {
    let start = index_text.find(marker)? + marker.len();
    let re = bullet_link_regex();

    let items = re
        .captures_iter(&index_text[start..])
        .map(|caps| IndexItem {
            indent: indent_width(&caps[1]),
            title: collapse_whitespace(&caps[2]),
            identifier: caps[3].to_string(),
        })
        .collect();
    Some(items)
}

/// Strip configured boilerplate from an identifier to get its directory name.
///
/// Falls back to the identifier itself if nothing would be left.
pub fn normalize_segment(identifier: &str, removable: &[String]) -> String {
    let mut segment = identifier.to_string();
    for pattern in removable.iter().filter(|p| !p.is_empty()) {
        segment = segment.replace(pattern.as_str(), "");
    }
    if segment == identifier {
        return segment;
    }

    let trimmed = segment.trim_matches(|c: char| c.is_whitespace() || c == '_');
    if trimmed.is_empty() {
        identifier.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Build the page hierarchy from the index document.
///
/// Each bullet attaches to the nearest open ancestor whose bullet is less
/// indented, so the node depth equals the bullet nesting depth. An index
/// without the page list marker yields a root-only tree.
pub fn build_content_tree(
    index_text: &str,
    output_root: &Path,
    config: &MigrationConfig,
    diagnostics: &mut Diagnostics,
) -> ContentTree {
    let mut tree = ContentTree::new(config.index_stem(), output_root);

    let Some(items) = parse_index_items(index_text, &config.index_marker) else {
        diagnostics.warn(Warning::MissingIndexMarker {
            marker: config.index_marker.clone(),
        });
        return tree;
    };

    let extension_suffix = format!(".{}", config.page_extension);
    // (indent, node) of each bullet still open, outermost first
    let mut open: Vec<(usize, NodeId)> = Vec::new();

    for item in items {
        while matches!(open.last(), Some(&(indent, _)) if indent >= item.indent) {
            open.pop();
        }
        let parent = open.last().map(|&(_, id)| id).unwrap_or(NodeId::ROOT);

        let stem = match item.identifier.strip_suffix(extension_suffix.as_str()) {
            Some(stem) => {
                diagnostics.warn(Warning::IdentifierHasExtension {
                    identifier: item.identifier.clone(),
                });
                stem
            }
            None => item.identifier.as_str(),
        };

        let base = normalize_segment(stem, &config.removable_substrings);
        let mut segment = base.clone();
        let mut counter = 1;
        while tree.has_child_segment(parent, &segment) {
            segment = format!("{}_{}", base, counter);
            counter += 1;
        }
        if segment != base {
            diagnostics.warn(Warning::SegmentCollision {
                identifier: item.identifier.clone(),
                segment: segment.clone(),
            });
        }

        let id = tree.add_child(parent, &item.identifier, &item.title, &segment);
        open.push((item.indent, id));
    }

    log::info!(
        "Built content tree with {} pages under {}",
        tree.page_count(),
        output_root.display()
    );
    tree
}
