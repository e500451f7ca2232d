//! Text rewrites applied to migrated pages once the tree and attachments
//! are in place: cross-page links, export footers, image references and
//! wrapper markup.

mod divs;
mod images;
mod links;
mod trailing;

use std::fs;
use std::path::{Component, Path};

use crate::error::Result;

pub use divs::fixup_divs;
pub use images::{rewrite_image_references, ImageContext};
pub use links::rewrite_links;
pub use trailing::strip_trailing_sections;

/// Read a file, transform it, and write it back only if the text changed.
/// Returns whether the file was rewritten.
pub fn rewrite_in_place<F>(path: &Path, transform: F) -> Result<bool>
where
    F: FnOnce(&str) -> Result<String>,
{
    let original = fs::read_to_string(path)?;
    let updated = transform(&original)?;
    if updated == original {
        return Ok(false);
    }
    fs::write(path, updated)?;
    log::debug!("Rewrote {}", path.display());
    Ok(true)
}

/// `/`-separated form of a relative path, for use in links
pub fn url_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_rewrite_in_place_only_writes_changes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("page.md");
        fs::write(&path, "hello").unwrap();

        assert!(!rewrite_in_place(&path, |text| Ok(text.to_string())).unwrap());
        assert!(rewrite_in_place(&path, |text| Ok(text.to_uppercase())).unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "HELLO");
    }

    #[test]
    fn test_url_path() {
        assert_eq!(url_path(Path::new("attachments/Home/a.png")), "attachments/Home/a.png");
        assert_eq!(url_path(Path::new("./A/B.md")), "A/B.md");
    }
}
