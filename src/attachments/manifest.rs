use std::path::Path;

use regex::Regex;

use super::models::AttachmentManifest;
use crate::config::MigrationConfig;
use crate::diagnostics::{Diagnostics, Warning};

fn manifest_link_regex() -> Regex {
    Regex::new(r"(?s)\[(.*?)\]\(([^)]*)\)").unwrap()
}

/// The parenthesised media type right after a manifest link
fn media_type_regex() -> Regex {
    Regex::new(r"^\s*\(([^)]*)\)").unwrap()
}

/// Attachment display name with whitespace and line wraps turned into `_`.
/// "Screen\nShot 1.png" -> "Screen_Shot_1.png"
pub fn meaningful_name(display_name: &str) -> String {
    display_name.split_whitespace().collect::<Vec<_>>().join("_")
}

/// Directory segment holding an upload, e.g. "attachments/123/456.png" -> "123"
pub fn page_id_of(storage_path: &str) -> Option<String> {
    Path::new(storage_path)
        .parent()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().to_string())
}

/// Locate the attachment list at the end of a page.
///
/// Starts after the last `heading` and stops at the close of the export's
/// `greybox` list container, or at the next heading if there is none.
pub fn manifest_section<'a>(page_text: &'a str, heading: &str) -> Option<&'a str> {
    let start = page_text.rfind(heading)? + heading.len();
    let section = &page_text[start..];

    if let Some(open) = section.find("<div class=\"greybox\"") {
        let body = &section[open..];
        let body = body.find('>').map(|i| &body[i + 1..]).unwrap_or(body);
        let end = body.find("</div>").unwrap_or(body.len());
        return Some(&body[..end]);
    }

    let end = section.find("\n#").unwrap_or(section.len());
    Some(&section[..end])
}

/// Parse a page's attachment manifest.
///
/// Returns `None` when the page has no attachment section. Entries are
/// grouped by meaningful name and, within a name, by media type. Entries
/// that are not `[name](path) (type)` triples, or that point at a different
/// page id than the first entry, are skipped with a warning.
pub fn parse_manifest(
    page_text: &str,
    page_name: &str,
    config: &MigrationConfig,
    diagnostics: &mut Diagnostics,
) -> Option<AttachmentManifest> {
    let section = manifest_section(page_text, &config.attachments_heading)?;
    let link_re = manifest_link_regex();
    let type_re = media_type_regex();
    let mut manifest = AttachmentManifest::new(page_name);

    for caps in link_re.captures_iter(section) {
        let whole = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
        let end = caps.get(0).map(|m| m.end()).unwrap_or_default();
        let name = meaningful_name(&caps[1]);
        let storage_path = caps[2].trim();

        let media_type = type_re
            .captures(&section[end..])
            .map(|t| t[1].trim().to_string());
        let page_id = page_id_of(storage_path);

        let (Some(media_type), Some(page_id)) = (media_type, page_id) else {
            diagnostics.warn(Warning::UnparseableManifestEntry {
                page: page_name.to_string(),
                entry: meaningful_name(whole),
            });
            continue;
        };
        if name.is_empty() || media_type.is_empty() {
            diagnostics.warn(Warning::UnparseableManifestEntry {
                page: page_name.to_string(),
                entry: meaningful_name(whole),
            });
            continue;
        }

        let expected = manifest.page_id.get_or_insert_with(|| page_id.clone());
        if *expected != page_id {
            diagnostics.warn(Warning::InconsistentPageId {
                page: page_name.to_string(),
                expected: expected.clone(),
                found: page_id,
            });
            continue;
        }

        manifest.entry(&name).add_file(&media_type, storage_path);
    }

    log::debug!(
        "Page '{}' lists {} attachments in {} files",
        page_name,
        manifest.len(),
        manifest.file_count()
    );
    Some(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BULLET: &str = "<img src=\"images/icons/bullet_blue.gif\" width=\"8\" height=\"8\" />";

    fn parse(text: &str) -> (Option<AttachmentManifest>, Diagnostics) {
        let mut diagnostics = Diagnostics::new();
        let manifest = parse_manifest(text, "test", &MigrationConfig::default(), &mut diagnostics);
        (manifest, diagnostics)
    }

    fn entry(name: &str, path: &str, media_type: &str) -> String {
        format!("{}\n[{}]({})\n({})  \n", BULLET, name, path, media_type)
    }

    fn page_with(entries: &[String]) -> String {
        format!(
            "Body text\n\n<div class=\"pageSectionHeader\">\n\n## Attachments:\n\n</div>\n\n\
             <div class=\"greybox\" align=\"left\">\n\n{}\n</div>\n\n[After](attachments/999/1) (text/plain)\n",
            entries.concat()
        )
    }

    #[test]
    fn test_wrapped_names_and_grouping() {
        let text = format!(
            "Thie is a test string...\n\n## Attachments:\n\n</div>\n\n<div class=\"greybox\" align=\"left\">\n\n\
             {b}\n[network-firewall-design](attachments/357810050/357811162)\n(application/vnd.jgraph.mxfile)  \n\
             {b}\n[network-firewall-design.png](attachments/357810050/357811163.png)\n(image/png)  \n\
             {b}\n[network-firewall-design](attachments/357810050/357811144)\n(application/vnd.jgraph.mxfile)  \n\
             {b}\n[network-firewall-design.png](attachments/357810050/357811145.png)\n(image/png)  \n\
             {b} [Screen\nShot 2020-09-08 at 5.23.23 PM.png](attachments/357810050/357811168.png)\n(image/png)  \n\n\
             </div>\n\nAny further information...\n",
            b = BULLET
        );
        let (manifest, diagnostics) = parse(&text);
        let manifest = manifest.unwrap();

        assert!(diagnostics.is_empty());
        assert_eq!(manifest.page_id.as_deref(), Some("357810050"));
        assert_eq!(manifest.len(), 3);
        assert!(manifest.get("network-firewall-design").is_some());
        assert!(manifest.get("network-firewall-design.png").is_some());
        assert!(manifest.get("Screen_Shot_2020-09-08_at_5.23.23_PM.png").is_some());
        assert_eq!(
            manifest
                .get("network-firewall-design")
                .and_then(|a| a.paths_for("application/vnd.jgraph.mxfile"))
                .map(|p| p.len()),
            Some(2)
        );
    }

    #[test]
    fn test_repeated_uploads_group_into_four_attachments() {
        let mut entries = Vec::new();
        for i in 0..3 {
            entries.push(entry(
                "vpc-architectures",
                &format!("attachments/4242/10{}", i),
                "application/vnd.jgraph.mxfile",
            ));
            entries.push(entry(
                "vpc-architectures.png",
                &format!("attachments/4242/20{}.png", i),
                "image/png",
            ));
        }
        entries.push(entry("application-capsule", "attachments/4242/300", "application/vnd.jgraph.mxfile"));
        entries.push(entry("application-capsule.png", "attachments/4242/301.png", "image/png"));

        let (manifest, diagnostics) = parse(&page_with(&entries));
        let manifest = manifest.unwrap();

        assert!(diagnostics.is_empty());
        assert_eq!(manifest.len(), 4);
        assert_eq!(manifest.file_count(), 8);
        assert_eq!(manifest.page_id.as_deref(), Some("4242"));
        assert!(manifest
            .attachments
            .iter()
            .flat_map(|a| a.all_paths())
            .all(|p| page_id_of(p).as_deref() == Some("4242")));
    }

    #[test]
    fn test_same_name_different_types_share_one_attachment() {
        let entries = vec![
            entry("drawing", "attachments/5/1", "application/vnd.jgraph.mxfile"),
            entry("drawing", "attachments/5/2", "application/octet-stream"),
        ];
        let (manifest, _) = parse(&page_with(&entries));
        let manifest = manifest.unwrap();

        assert_eq!(manifest.len(), 1);
        assert_eq!(manifest.attachments[0].files.len(), 2);
    }

    #[test]
    fn test_no_section() {
        let (manifest, diagnostics) = parse("# Title\n\nJust text with [a link](Other_Page).\n");
        assert!(manifest.is_none());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_entry_without_media_type_is_skipped() {
        let entries = vec![
            format!("{}\n[orphan](attachments/5/1)\n", BULLET),
            entry("kept.png", "attachments/5/2.png", "image/png"),
        ];
        let (manifest, diagnostics) = parse(&page_with(&entries));
        let manifest = manifest.unwrap();

        assert_eq!(manifest.len(), 1);
        assert!(manifest.get("kept.png").is_some());
        assert_eq!(diagnostics.count("unparseable-manifest-entry"), 1);
    }

    #[test]
    fn test_foreign_page_id_is_flagged_not_merged() {
        let entries = vec![
            entry("a.png", "attachments/5/1.png", "image/png"),
            entry("b.png", "attachments/6/2.png", "image/png"),
        ];
        let (manifest, diagnostics) = parse(&page_with(&entries));
        let manifest = manifest.unwrap();

        assert_eq!(manifest.len(), 1);
        assert_eq!(manifest.page_id.as_deref(), Some("5"));
        assert_eq!(diagnostics.count("inconsistent-page-id"), 1);
    }

    #[test]
    fn test_section_without_greybox_stops_at_next_heading() {
        let text = "## Attachments\n\n[a.png](attachments/1/1.png) (image/png)\n\n## Comments\n\n[b.png](attachments/1/2.png) (image/png)\n";
        let (manifest, _) = parse(text);
        let manifest = manifest.unwrap();

        assert_eq!(manifest.len(), 1);
        assert!(manifest.get("a.png").is_some());
    }

    #[test]
    fn test_meaningful_name() {
        assert_eq!(meaningful_name("Screen\n  Shot 1.png"), "Screen_Shot_1.png");
        assert_eq!(meaningful_name("plain"), "plain");
        assert_eq!(page_id_of("attachments/123/456.png").as_deref(), Some("123"));
        assert_eq!(page_id_of("456.png"), None);
    }
}
