use restack_lib::diagnostics::Warning;

/// ANSI color codes
pub struct Color;

impl Color {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
}

/// Wrap `text` in a color when colors are enabled
pub fn paint(text: &str, color: &str, use_color: bool) -> String {
    if use_color {
        format!("{}{}{}", color, text, Color::RESET)
    } else {
        text.to_string()
    }
}

/// One line per warning: `[code] message`
pub fn render_warnings(warnings: &[Warning], use_color: bool) -> String {
    warnings
        .iter()
        .map(|w| {
            let code = paint(&format!("[{}]", w.code()), Color::YELLOW, use_color);
            format!("{} {}", code, w)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Tree branch connector for the last or a middle child
pub fn connector(is_last: bool) -> &'static str {
    if is_last {
        "\u{2514}\u{2500}\u{2500} "
    } else {
        "\u{251c}\u{2500}\u{2500} "
    }
}

/// Prefix continuing below a child
pub fn continuation(is_last: bool) -> &'static str {
    if is_last {
        "    "
    } else {
        "\u{2502}   "
    }
}
