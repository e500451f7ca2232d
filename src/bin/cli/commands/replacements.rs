use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::app::App;
use crate::render::terminal::{paint, render_warnings, Color};
use crate::OutputFormat;
use restack_lib::adjustments::{check, execute, generate_template, load_changes, save_changes};
use restack_lib::diagnostics::Diagnostics;

pub fn run_generate(app: &App, grep_output: &Path, output: &Path) -> Result<()> {
    let text = fs::read_to_string(grep_output)
        .with_context(|| format!("Failed to read {}", grep_output.display()))?;
    let changes = generate_template(&text, &app.config.page_extension);
    save_changes(&changes, output).with_context(|| format!("Failed to write {}", output.display()))?;

    let count: usize = changes.values().map(Vec::len).sum();
    println!("Wrote {} changes for {} files to {}", count, changes.len(), output.display());
    Ok(())
}

pub fn run_execute(changes: &Path, target: &Path, format: &OutputFormat, use_color: bool) -> Result<()> {
    let changes = load_changes(changes).with_context(|| format!("Failed to load {}", changes.display()))?;
    let mut diagnostics = Diagnostics::new();
    let rewritten = execute(&changes, target, &mut diagnostics)?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "filesRewritten": rewritten,
                "warnings": diagnostics.warnings(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("{}", paint(&format!("Rewrote {} files", rewritten), Color::GREEN, use_color));
            if !diagnostics.is_empty() {
                println!("{}", render_warnings(diagnostics.warnings(), use_color));
            }
        }
    }
    Ok(())
}

pub fn run_check(changes: &Path, target: &Path, format: &OutputFormat, use_color: bool) -> Result<()> {
    let changes = load_changes(changes).with_context(|| format!("Failed to load {}", changes.display()))?;
    let mut diagnostics = Diagnostics::new();
    let results = check(&changes, target, &mut diagnostics)?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        OutputFormat::Plain => {
            if results.is_empty() {
                println!("{}", paint("All changes present", Color::GREEN, use_color));
            }
            for result in &results {
                let indices: Vec<String> = result.missing.iter().map(|i| i.to_string()).collect();
                println!("{},{}", paint(&result.file, Color::RED, use_color), indices.join(","));
            }
        }
    }

    if !diagnostics.is_empty() {
        eprintln!("{}", render_warnings(diagnostics.warnings(), use_color));
    }
    Ok(())
}
