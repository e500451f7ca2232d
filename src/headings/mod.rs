//! Heading level reconciliation.
//!
//! Exported pages skip heading levels and often carry several top-level
//! headings. Each document is renumbered on its own so levels start at 1
//! and increase by one step at a time.

mod reconcile;
mod state;

pub use reconcile::*;
pub use state::HeadingState;
