/// Cut a page at the export footer.
///
/// Each marker is located by its last occurrence and the page ends at the
/// earliest of those positions. Pages without any marker are returned whole.
pub fn strip_trailing_sections<'a>(text: &'a str, markers: &[String]) -> &'a str {
    let cut = markers
        .iter()
        .filter(|m| !m.is_empty())
        .filter_map(|m| text.rfind(m.as_str()))
        .min();
    match cut {
        Some(offset) => &text[..offset],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MigrationConfig;

    fn markers() -> Vec<String> {
        MigrationConfig::default().trailing_section_markers
    }

    #[test]
    fn test_cuts_at_earliest_footer() {
        let text = "# Page\n\nBody\n\n<div class=\"pageSectionHeader\">\n\n## Attachments:\n\nfiles\n\n\
                    <div class=\"pageSectionHeader\">\n\n## Comments:\n\nnice\n\n## Change History\n";
        assert_eq!(strip_trailing_sections(text, &markers()), "# Page\n\nBody\n\n");
    }

    #[test]
    fn test_last_occurrence_of_each_marker() {
        let text = "Intro mentions ## Change History here\n\nBody\n## Change History\nv1\n";
        assert_eq!(
            strip_trailing_sections(text, &markers()),
            "Intro mentions ## Change History here\n\nBody\n"
        );
    }

    #[test]
    fn test_no_footer() {
        let text = "# Page\n\nJust content\n";
        assert_eq!(strip_trailing_sections(text, &markers()), text);
    }
}
