// src/digest.rs

//! Content fingerprinting.
//!
//! Everything the pipeline knows about "did this change?" reduces to the two
//! functions here: a streaming digest of a single file, and a folded digest
//! of every file under a directory (for importers whose input is a folder
//! rather than one file). Digests are hex strings, suitable for storage in
//! the fingerprint cache and for plain equality comparison.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use blake3::Hasher;
use tracing::debug;

/// Read buffer size for streaming file contents into the hasher.
///
/// Memory use stays flat regardless of asset size.
const CHUNK_SIZE: usize = 8192;

/// Compute the content fingerprint of a single file.
///
/// A missing or unreadable file is an error and propagates to the caller;
/// the scan must not silently treat it as "unchanged".
pub fn fingerprint_file(path: &Path) -> Result<String> {
    let mut hasher = Hasher::new();
    feed_file(&mut hasher, path)?;
    Ok(hasher.finalize().to_hex().to_string())
}

/// Compute a fingerprint over every file contained in `root`, recursively.
///
/// File paths are sorted before hashing so the result is independent of
/// directory iteration order.
pub fn fingerprint_dir(root: &Path) -> Result<String> {
    let mut hasher = Hasher::new();
    for path in collect_files(root)? {
        debug!(path = ?path, "folding file into directory fingerprint");
        feed_file(&mut hasher, &path)?;
    }
    Ok(hasher.finalize().to_hex().to_string())
}

/// Collect every regular file under `root`, sorted.
fn collect_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        let entries =
            std::fs::read_dir(&dir).with_context(|| format!("reading directory {:?}", dir))?;
        for entry in entries {
            let path = entry?.path();
            if path.is_dir() {
                stack.push(path);
            } else if path.is_file() {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Stream the contents of `path` into `hasher` in bounded chunks.
fn feed_file(hasher: &mut Hasher, path: &Path) -> Result<()> {
    let mut file =
        File::open(path).with_context(|| format!("opening file for hashing: {:?}", path))?;
    let mut buf = [0u8; CHUNK_SIZE];
    loop {
        let n = file
            .read(&mut buf)
            .with_context(|| format!("reading file for hashing: {:?}", path))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(())
}
