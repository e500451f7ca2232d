use regex::{Captures, Regex};

use crate::content_tree::RenameMapping;

fn link_target_regex() -> Regex {
    Regex::new(r"(?s)\]\((.*?)\)").unwrap()
}

/// Point links at flat page identifiers to their hierarchical paths.
///
/// `[Text](Page_Id)` becomes `[Text](/Parent/Page_Id)` when `Page_Id` is in
/// the mapping; every other target is left alone.
pub fn rewrite_links(text: &str, mapping: &RenameMapping) -> String {
    link_target_regex()
        .replace_all(text, |caps: &Captures| match mapping.get(&caps[1]) {
            Some(path) => format!("](/{})", path),
            None => caps[0].to_string(),
        })
        .into_owned()
}
