use std::path::Path;

use serde::Serialize;

use super::{ReadError, sandbox};

/// Entries hidden from listings: version-control internals, dependency
/// caches, and OS litter.
const HIDDEN_ENTRIES: &[&str] = &[
    ".git",
    ".svn",
    ".hg",
    "node_modules",
    "__pycache__",
    ".DS_Store",
];

#[derive(Debug, Clone, Serialize)]
pub struct DirEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Dir,
    File,
}

/// List the direct children of a directory under the root. Non-recursive;
/// order is whatever the filesystem yields.
pub fn list(root: &Path, rel: &str) -> Result<Vec<DirEntry>, ReadError> {
    let dir = sandbox::resolve(root, rel)?;
    if !dir.is_dir() {
        return Err(ReadError::NotADirectory(rel.to_string()));
    }

    let mut items = Vec::new();
    for entry in std::fs::read_dir(&dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if HIDDEN_ENTRIES.contains(&name.as_str()) {
            continue;
        }
        // Follow symlinks so a linked directory is browsable; broken links
        // fall back to being shown as files.
        let kind = match std::fs::metadata(entry.path()) {
            Ok(md) if md.is_dir() => EntryKind::Dir,
            _ => EntryKind::File,
        };
        items.push(DirEntry { name, kind });
    }
    Ok(items)
}
