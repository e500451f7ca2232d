use super::state::HeadingState;
use crate::config::HeadingPolicy;
use crate::diagnostics::{Diagnostics, Warning};

/// Depth and remainder of an ATX heading line.
///
/// Up to three leading spaces, a run of `#`, then whitespace or the end of
/// the line. `"### Title"` -> `(3, " Title")`
pub fn heading_depth(line: &str) -> Option<(usize, &str)> {
    let indent = line.len() - line.trim_start_matches(' ').len();
    if indent > 3 {
        return None;
    }
    let body = &line[indent..];
    let depth = body.len() - body.trim_start_matches('#').len();
    if depth == 0 {
        return None;
    }
    let rest = &body[depth..];
    match rest.chars().next() {
        None => Some((depth, rest)),
        Some(c) if c.is_whitespace() => Some((depth, rest)),
        _ => None,
    }
}

/// Tracks fenced code blocks so `#` lines inside them are left alone
#[derive(Debug, Default)]
struct FenceTracker {
    open: Option<(char, usize)>,
}

impl FenceTracker {
    /// Feed one line; returns true while the line belongs to a code block
    fn in_code(&mut self, line: &str) -> bool {
        let trimmed = line.trim_start_matches(' ');
        let fence = ['`', '~'].into_iter().find_map(|c| {
            let run = trimmed.len() - trimmed.trim_start_matches(c).len();
            (run >= 3).then_some((c, run))
        });

        match (self.open, fence) {
            (None, Some(f)) => {
                self.open = Some(f);
                true
            }
            (Some((c, len)), Some((fc, flen))) if c == fc && flen >= len => {
                self.open = None;
                true
            }
            (open, _) => open.is_some(),
        }
    }
}

/// Observed heading depths in document order, code blocks excluded
pub fn observed_depths(text: &str) -> Vec<usize> {
    let mut fences = FenceTracker::default();
    text.lines()
        .filter(|line| !fences.in_code(line))
        .filter_map(|line| heading_depth(line).map(|(depth, _)| depth))
        .collect()
}

/// Renumber the headings of one document.
///
/// Non-heading lines pass through unchanged; heading lines keep everything
/// after their `#` run. Trailing blank lines are dropped and the result ends
/// with exactly one line terminator. CRLF documents stay CRLF.
///
/// A document with headings but none at depth 1 is reported, and its
/// shallowest heading depth is treated as depth 1.
pub fn reconcile(
    text: &str,
    policy: HeadingPolicy,
    document: &str,
    diagnostics: &mut Diagnostics,
) -> String {
    let depths = observed_depths(text);
    let top = match depths.iter().min() {
        Some(&1) | None => 1,
        Some(&shallowest) => {
            diagnostics.warn(Warning::NoTopLevelHeading {
                document: document.to_string(),
            });
            shallowest
        }
    };

    let mut state = HeadingState::new(policy);
    let mut fences = FenceTracker::default();
    let mut lines: Vec<String> = Vec::new();

    for line in text.lines() {
        if fences.in_code(line) {
            lines.push(line.to_string());
            continue;
        }
        match heading_depth(line) {
            Some((depth, rest)) => {
                let observed = if depth == top { 1 } else { depth };
                let level = state.corrected_level(observed);
                lines.push(format!("{}{}", "#".repeat(level), rest));
            }
            None => lines.push(line.to_string()),
        }
    }

    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }

    log::debug!(
        "Reconciled {} headings in '{}' ({} at depth 1)",
        depths.len(),
        document,
        state.level1_count()
    );

    let eol = if text.contains("\r\n") { "\r\n" } else { "\n" };
    let mut corrected = lines.join(eol);
    corrected.push_str(eol);
    corrected
}
