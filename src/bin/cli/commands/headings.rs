use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::render::terminal::render_warnings;
use restack_lib::config::HeadingPolicy;
use restack_lib::diagnostics::Diagnostics;
use restack_lib::headings::reconcile;

pub fn run(file: &Path, policy: HeadingPolicy, in_place: bool, use_color: bool) -> Result<()> {
    let text = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let mut diagnostics = Diagnostics::new();
    let corrected = reconcile(&text, policy, &file.display().to_string(), &mut diagnostics);

    if in_place {
        if corrected != text {
            fs::write(file, &corrected)
                .with_context(|| format!("Failed to write {}", file.display()))?;
        }
    } else {
        print!("{}", corrected);
    }

    if !diagnostics.is_empty() {
        eprintln!("{}", render_warnings(diagnostics.warnings(), use_color));
    }
    Ok(())
}
