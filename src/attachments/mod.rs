//! Page attachments: parsing the manifest at the bottom of each page,
//! deduplicating repeated uploads and copying them under meaningful names.

mod copy;
mod dedupe;
mod manifest;
mod models;

pub use copy::*;
pub use dedupe::*;
pub use manifest::*;
pub use models::*;
