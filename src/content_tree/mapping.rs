use std::collections::BTreeMap;

use serde::Serialize;

use super::tree::ContentTree;
use crate::diagnostics::{Diagnostics, Warning};

/// Flat document identifier to `/`-separated path relative to the output root.
///
/// Built once from a finished tree and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RenameMapping {
    entries: BTreeMap<String, String>,
}

impl RenameMapping {
    /// Map every non-root node. A repeated identifier keeps its first path.
    pub fn from_tree(tree: &ContentTree, diagnostics: &mut Diagnostics) -> Self {
        let mut entries: BTreeMap<String, String> = BTreeMap::new();

        for id in tree.preorder().skip(1) {
            let identifier = &tree.node(id).identifier;
            if let Some(kept) = entries.get(identifier) {
                diagnostics.warn(Warning::DuplicateIdentifier {
                    identifier: identifier.clone(),
                    kept: kept.clone(),
                });
                continue;
            }
            entries.insert(identifier.clone(), tree.relative_path(id));
        }

        Self { entries }
    }

    pub fn get(&self, identifier: &str) -> Option<&str> {
        self.entries.get(identifier).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
