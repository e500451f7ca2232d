use std::path::Path;

use anyhow::{Context, Result};

use crate::app::App;
use crate::render::terminal::{paint, render_warnings, Color};
use crate::OutputFormat;
use restack_lib::pipeline::migrate;

pub fn run(app: &App, source: &Path, target: &Path, format: &OutputFormat, use_color: bool) -> Result<()> {
    let report = migrate(source, target, &app.config)
        .with_context(|| format!("Failed to migrate {}", source.display()))?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Plain => {
            let headline = format!(
                "Migrated {} of {} pages into {}",
                report.pages_copied,
                report.node_count,
                target.display()
            );
            println!("{}", paint(&headline, Color::BOLD, use_color));
            println!(
                "  attachments: {} copied, {} skipped",
                report.attachments.copied, report.attachments.skipped
            );
            let r = &report.rewrites;
            println!(
                "  pages rewritten: {} links, {} footers, {} images, {} divs, {} headings",
                r.links, r.trailing_sections, r.image_references, r.divs, r.headings
            );
            println!("  finished in {} ms", report.duration_ms());

            if report.warnings.is_empty() {
                println!("{}", paint("No warnings", Color::GREEN, use_color));
            } else {
                println!("{} warnings:", report.warnings.len());
                println!("{}", render_warnings(&report.warnings, use_color));
            }
        }
    }

    Ok(())
}
