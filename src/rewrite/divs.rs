use regex::Regex;

/// Wrapper divs whose content is kept, followed by a newline
const WRAPPER_PATTERNS: &[&str] = &[
    r#"<div class="content-wrapper">\s*(.*?)\s*</div>"#,
    r#"<div class="content-wrapper">\s*(.*?)\s*</div>"#,
    r#"<div class="table-wrap">\s*(.*?)\s*</div>"#,
    r#"<div class="code panel.*?<div class="CodeContent.*?>\s*(.*?)\s*</div>\s*</div>"#,
    r#"<div>\s*(.*?)\s*</div>"#,
    r#"<div>\s*(.*?)\s*</div>"#,
    r#"<div class="details">\s*(.*?)\s*</div>"#,
];

/// Multi-column layout cells, unwrapped in place
const COLUMN_PATTERNS: &[&str] = &[
    r#"<div class="innerCell">\s*(.*?)\s*</div>"#,
    r#"<div class="cell normal" data-type="normal">\s*(.*?)\s*</div>"#,
    r#"<div class="columnLayout single" layout="single">\s*(.*?)\s*</div>"#,
];

const EXPANDER_CONTENT: &str = r#"<div id="expander-content-.*?class="expand-content">\s*(.*?)\s*</div>"#;
const EXPANDER_CONTROL: &str =
    r#"<div id="expander-control-.*?class="expand-control">\s*<img.*?/>(.*?)\s*</div>"#;
const EXPANDER_CONTAINER: &str = r#"<div id="expander-.*?class="expand-container">(.*?)\s*</div>"#;
const TOC_MACRO: &str = r#"<div class="toc-macro.*?>.*?</div>"#;

/// Case-insensitive, `.` matching newlines
fn pattern(source: &str) -> Regex {
    Regex::new(&format!("(?is){}", source)).unwrap()
}

fn replace(text: String, source: &str, replacement: &str) -> String {
    pattern(source).replace_all(&text, replacement).into_owned()
}

/// Expander macros become `{dropdown}` directives
fn fixup_expanders(text: String) -> String {
    let text = replace(text, EXPANDER_CONTENT, "${1}\n```");
    let text = replace(text, EXPANDER_CONTROL, "```{dropdown} ${1}");
    replace(text, EXPANDER_CONTAINER, "${1}")
}

/// Remove the wrapper markup the export leaves around page content.
pub fn fixup_divs(text: &str) -> String {
    let mut text = fixup_expanders(text.to_string());
    for source in WRAPPER_PATTERNS {
        text = replace(text, source, "${1}\n");
    }
    text = text.replace('\u{a0}', " ");
    // pages get their own table of contents when rendered
    text = replace(text, TOC_MACRO, "");
    for source in COLUMN_PATTERNS {
        text = replace(text, source, "${1}");
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrappers_unwrapped() {
        let text = "<div class=\"content-wrapper\">\n\nSome text\n\n</div>\n<div class=\"table-wrap\">\n| a |\n</div>";
        assert_eq!(fixup_divs(text), "Some text\n\n| a |\n");
    }

    #[test]
    fn test_code_panel() {
        let text = "<div class=\"code panel pdl\" style=\"border-width: 1px;\">\n<div class=\"codeContent panelContent pdl\">\n\n```bash\nls\n```\n\n</div>\n</div>";
        assert_eq!(fixup_divs(text), "```bash\nls\n```\n");
    }

    #[test]
    fn test_expander_becomes_dropdown() {
        let text = "<div id=\"expander-123\" class=\"expand-container\">\n\
                    <div id=\"expander-control-123\" class=\"expand-control\">\n\
                    <img src=\"x.png\" class=\"expand-control-image\" />Click to expand\n</div>\n\
                    <div id=\"expander-content-123\" class=\"expand-content\">\nHidden text\n</div>\n</div>";
        let out = fixup_divs(text);

        assert!(out.contains("```{dropdown} Click to expand"));
        assert!(out.contains("Hidden text\n```"));
        assert!(!out.contains("<div"));
    }

    #[test]
    fn test_toc_macro_and_nbsp() {
        let text = "<div class=\"toc-macro rbtoc1\">\n- [A](#a)\n</div>\nA\u{a0}B";
        assert_eq!(fixup_divs(text), "\nA B");
    }

    #[test]
    fn test_columns() {
        let text = "<div class=\"columnLayout single\" layout=\"single\">\n<div class=\"cell normal\" data-type=\"normal\">\n<div class=\"innerCell\">\nCell text\n</div>\n</div>\n</div>";
        assert_eq!(fixup_divs(text), "Cell text");
    }
}
