use std::path::{Path, PathBuf};

use serde::Serialize;

/// Storage paths uploaded under one media type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaFiles {
    pub media_type: String,
    /// Paths relative to the export root, in manifest order
    pub paths: Vec<String>,
}

/// How an attachment is copied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    /// Compressed diagram source, inflated next to its page
    Diagram,
    /// Anything else, copied byte for byte into the page's attachment folder
    Generic,
}

/// Every upload sharing one meaningful name on a page.
///
/// The export keeps each re-upload as a separate file, sometimes under a
/// different media type, so one name can stand for several files.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attachment {
    pub meaningful_name: String,
    pub files: Vec<MediaFiles>,
    /// Where the last distinct copy was written
    pub destination: Option<PathBuf>,
    /// Set when more than one distinct file was written for this name
    pub multiple_copies: bool,
}

impl Attachment {
    pub fn new(meaningful_name: &str) -> Self {
        Self {
            meaningful_name: meaningful_name.to_string(),
            files: Vec::new(),
            destination: None,
            multiple_copies: false,
        }
    }

    pub fn add_file(&mut self, media_type: &str, path: &str) {
        match self.files.iter_mut().find(|f| f.media_type == media_type) {
            Some(group) => group.paths.push(path.to_string()),
            None => self.files.push(MediaFiles {
                media_type: media_type.to_string(),
                paths: vec![path.to_string()],
            }),
        }
    }

    pub fn paths_for(&self, media_type: &str) -> Option<&[String]> {
        self.files
            .iter()
            .find(|f| f.media_type == media_type)
            .map(|f| f.paths.as_slice())
    }

    /// All storage paths regardless of media type
    pub fn all_paths(&self) -> impl Iterator<Item = &str> {
        self.files
            .iter()
            .flat_map(|f| f.paths.iter().map(String::as_str))
    }

    pub fn file_count(&self) -> usize {
        self.files.iter().map(|f| f.paths.len()).sum()
    }

    pub fn kind(&self, diagram_media_type: &str) -> AssetKind {
        if self.paths_for(diagram_media_type).is_some() {
            AssetKind::Diagram
        } else {
            AssetKind::Generic
        }
    }
}

/// Attachments listed at the bottom of one page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttachmentManifest {
    /// Page path relative to the target root, used as the attachment folder
    pub page_name: String,
    /// Export directory holding this page's uploads
    pub page_id: Option<String>,
    pub attachments: Vec<Attachment>,
}

impl AttachmentManifest {
    pub fn new(page_name: &str) -> Self {
        Self {
            page_name: page_name.to_string(),
            page_id: None,
            attachments: Vec::new(),
        }
    }

    pub fn get(&self, meaningful_name: &str) -> Option<&Attachment> {
        self.attachments
            .iter()
            .find(|a| a.meaningful_name == meaningful_name)
    }

    pub fn entry(&mut self, meaningful_name: &str) -> &mut Attachment {
        let index = match self
            .attachments
            .iter()
            .position(|a| a.meaningful_name == meaningful_name)
        {
            Some(index) => index,
            None => {
                self.attachments.push(Attachment::new(meaningful_name));
                self.attachments.len() - 1
            }
        };
        &mut self.attachments[index]
    }

    /// The attachment that lists `storage_path` among its files
    pub fn find_by_storage_path(&self, storage_path: &str) -> Option<&Attachment> {
        self.attachments
            .iter()
            .find(|a| a.all_paths().any(|p| p == storage_path))
    }

    pub fn len(&self) -> usize {
        self.attachments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attachments.is_empty()
    }

    pub fn file_count(&self) -> usize {
        self.attachments.iter().map(Attachment::file_count).sum()
    }

    /// Source directory of this page's uploads, from the first listed file
    pub fn source_dir(&self, source_root: &Path) -> Option<PathBuf> {
        let first = self.attachments.iter().flat_map(|a| a.all_paths()).next()?;
        source_root.join(first).parent().map(Path::to_path_buf)
    }
}
