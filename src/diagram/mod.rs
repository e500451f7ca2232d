//! Diagram attachments: inflating draw.io sources and placing the PNG
//! renderings that pages embed inline.

mod drawio;
mod embedded;

use std::path::Path;

use crate::error::Result;

#[cfg(test)]
pub(crate) use drawio::compress;
pub use drawio::{inflate_mxfile, inflate_payload, pretty_print_xml, DrawioInflater};
pub use embedded::*;

/// Turns a stored diagram attachment into plain, editable XML
pub trait DiagramInflater {
    fn inflate(&self, source: &Path) -> Result<String>;
}
