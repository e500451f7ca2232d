//! Restructure a flat wiki space export into a hierarchical book.
//!
//! The export is a directory of markdown pages plus an `index.md` whose
//! nested bullet list describes the page hierarchy. Migration rebuilds that
//! hierarchy on disk, copies attachments under meaningful names, rewrites
//! cross-page references and repairs heading levels.

pub mod adjustments;
pub mod attachments;
pub mod config;
pub mod content_tree;
pub mod diagnostics;
pub mod diagram;
pub mod error;
pub mod headings;
pub mod pipeline;
pub mod rewrite;
pub mod toc;

pub use config::{HeadingPolicy, MigrationConfig};
pub use diagnostics::{Diagnostics, Warning};
pub use error::{MigrationError, Result};
pub use pipeline::{migrate, MigrationReport, Migrator};
