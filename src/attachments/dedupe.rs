use std::fs::{File, Metadata};
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use crate::error::Result;

const CHUNK_SIZE: usize = 64 * 1024;

/// A file and the later files with exactly the same bytes
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateGroup {
    pub representative: PathBuf,
    pub duplicates: Vec<PathBuf>,
}

/// Read until `buf` is full or the reader is exhausted
fn fill(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

fn metadata_if_exists(path: &Path) -> io::Result<Option<Metadata>> {
    match path.metadata() {
        Ok(meta) => Ok(Some(meta)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Full byte comparison of two files. A missing file equals nothing.
pub fn files_identical(a: &Path, b: &Path) -> io::Result<bool> {
    let (Some(meta_a), Some(meta_b)) = (metadata_if_exists(a)?, metadata_if_exists(b)?) else {
        return Ok(false);
    };
    if !meta_a.is_file() || !meta_b.is_file() || meta_a.len() != meta_b.len() {
        return Ok(false);
    }

    let mut reader_a = BufReader::new(File::open(a)?);
    let mut reader_b = BufReader::new(File::open(b)?);
    let mut buf_a = vec![0u8; CHUNK_SIZE];
    let mut buf_b = vec![0u8; CHUNK_SIZE];

    loop {
        let read_a = fill(&mut reader_a, &mut buf_a)?;
        let read_b = fill(&mut reader_b, &mut buf_b)?;
        if read_a != read_b || buf_a[..read_a] != buf_b[..read_b] {
            return Ok(false);
        }
        if read_a == 0 {
            return Ok(true);
        }
    }
}

/// Partition `paths` into groups of byte-identical files.
///
/// Representatives keep the order of their first appearance; each later
/// file joins the first representative it matches. Pairwise comparison is
/// quadratic, which is fine for the handful of uploads on one page.
pub fn find_duplicates(paths: &[PathBuf]) -> Result<Vec<DuplicateGroup>> {
    let mut groups: Vec<DuplicateGroup> = Vec::new();
    let mut claimed = vec![false; paths.len()];

    for i in 0..paths.len() {
        if claimed[i] {
            continue;
        }
        let mut group = DuplicateGroup {
            representative: paths[i].clone(),
            duplicates: Vec::new(),
        };
        for j in (i + 1)..paths.len() {
            if !claimed[j] && files_identical(&paths[i], &paths[j])? {
                group.duplicates.push(paths[j].clone());
                claimed[j] = true;
            }
        }
        groups.push(group);
    }

    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_groups_identical_files() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a", b"same bytes");
        let b = write(&dir, "b", b"other bytes");
        let c = write(&dir, "c", b"same bytes");
        let d = write(&dir, "d", b"other bytes");

        let groups = find_duplicates(&[a.clone(), b.clone(), c.clone(), d.clone()]).unwrap();

        assert_eq!(
            groups,
            vec![
                DuplicateGroup { representative: a, duplicates: vec![c] },
                DuplicateGroup { representative: b, duplicates: vec![d] },
            ]
        );
    }

    #[test]
    fn test_same_length_different_content() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a", b"abcd");
        let b = write(&dir, "b", b"abce");

        assert!(!files_identical(&a, &b).unwrap());
        assert_eq!(find_duplicates(&[a, b]).unwrap().len(), 2);
    }

    #[test]
    fn test_large_files_compare_across_chunks() {
        let dir = TempDir::new().unwrap();
        let mut content = vec![7u8; CHUNK_SIZE * 2 + 17];
        let a = write(&dir, "a", &content);
        let b = write(&dir, "b", &content);
        *content.last_mut().unwrap() = 8;
        let c = write(&dir, "c", &content);

        assert!(files_identical(&a, &b).unwrap());
        assert!(!files_identical(&a, &c).unwrap());
    }

    #[test]
    fn test_missing_files_are_their_own_group() {
        let dir = TempDir::new().unwrap();
        let present = write(&dir, "present", b"x");
        let missing = dir.path().join("missing");

        let groups = find_duplicates(&[missing.clone(), present.clone(), missing.clone()]).unwrap();

        assert_eq!(groups.len(), 3);
        assert!(groups.iter().all(|g| g.duplicates.is_empty()));
    }

    #[test]
    fn test_dedupe_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let files = vec![
            write(&dir, "1", b"one"),
            write(&dir, "2", b"two"),
            write(&dir, "3", b"one"),
            write(&dir, "4", b"three"),
            write(&dir, "5", b"two"),
        ];

        let first = find_duplicates(&files).unwrap();
        let representatives: Vec<PathBuf> = first.iter().map(|g| g.representative.clone()).collect();
        let second = find_duplicates(&representatives).unwrap();

        assert_eq!(second.len(), representatives.len());
        assert!(second.iter().all(|g| g.duplicates.is_empty()));
        assert_eq!(
            second.iter().map(|g| g.representative.clone()).collect::<Vec<_>>(),
            representatives
        );
    }
}
