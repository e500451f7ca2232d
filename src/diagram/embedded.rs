use std::fs;
use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use crate::attachments::AttachmentManifest;
use crate::diagnostics::{Diagnostics, Warning};
use crate::error::Result;

pub const PNG_DATA_PREFIX: &str = "data:image/png;base64,";
pub const PNG_MEDIA_TYPE: &str = "image/png";

/// Where an embedded diagram image ended up
#[derive(Debug, Clone, PartialEq)]
pub enum EmbeddedImage {
    /// Byte-identical to an uploaded attachment
    Attachment { name: String, path: PathBuf },
    /// Written out as a new file in the page's attachment folder
    Generated { name: String, path: PathBuf },
}

impl EmbeddedImage {
    pub fn name(&self) -> &str {
        match self {
            EmbeddedImage::Attachment { name, .. } | EmbeddedImage::Generated { name, .. } => name,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            EmbeddedImage::Attachment { path, .. } | EmbeddedImage::Generated { path, .. } => path,
        }
    }
}

/// Decode a `data:image/png;base64,` payload.
///
/// Anything else is reported and yields `None`; the caller leaves the
/// reference as it was.
pub fn decode_png_payload(data: &str, page: &str, diagnostics: &mut Diagnostics) -> Option<Vec<u8>> {
    let unencoded = || Warning::UnencodedPayload {
        page: page.to_string(),
        prefix: data.chars().take(100).collect(),
    };

    let Some(encoded) = data.strip_prefix(PNG_DATA_PREFIX) else {
        diagnostics.warn(unencoded());
        return None;
    };
    let compact: String = encoded.split_whitespace().collect();
    match BASE64.decode(compact.as_bytes()) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            log::debug!("Embedded payload on '{}' is not base64: {}", page, e);
            diagnostics.warn(unencoded());
            None
        }
    }
}

/// Resolve decoded image bytes against the page's copied PNG uploads, or
/// write them to the first free `auto_generated_<n>.png` in `attachment_dir`.
///
/// A generated file already holding the same bytes is reused, so migrating
/// into the same target again points at the same file.
pub fn store_embedded_png(
    bytes: &[u8],
    manifest: &AttachmentManifest,
    source_root: &Path,
    attachment_dir: &Path,
) -> Result<EmbeddedImage> {
    for attachment in &manifest.attachments {
        let (Some(paths), Some(destination)) =
            (attachment.paths_for(PNG_MEDIA_TYPE), &attachment.destination)
        else {
            continue;
        };
        let matches = |storage_path: &String| {
            fs::read(source_root.join(storage_path))
                .map(|content| content == bytes)
                .unwrap_or(false)
        };
        if paths.iter().any(matches) {
            return Ok(EmbeddedImage::Attachment {
                name: attachment.meaningful_name.clone(),
                path: destination.clone(),
            });
        }
    }

    fs::create_dir_all(attachment_dir)?;
    let mut idx = 0;
    loop {
        let name = format!("auto_generated_{}.png", idx);
        let path = attachment_dir.join(&name);
        if !path.exists() {
            fs::write(&path, bytes)?;
            log::debug!("Wrote embedded image {}", path.display());
            return Ok(EmbeddedImage::Generated { name, path });
        }
        if fs::read(&path)? == bytes {
            log::debug!("Embedded image already stored as {}", path.display());
            return Ok(EmbeddedImage::Generated { name, path });
        }
        idx += 1;
    }
}
