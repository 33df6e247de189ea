use std::path::{Path, PathBuf};

use super::ReadError;

/// Resolve a caller-supplied relative path against the sandbox root.
///
/// Both the root and the joined result are canonicalized, so `..` segments
/// and symlinks cannot smuggle the resolved path outside the root. The
/// containment check is component-wise (`Path::starts_with`), which keeps
/// sibling directories like `/srv/files-evil` from passing for a root of
/// `/srv/files`.
pub fn resolve(root: &Path, rel: &str) -> Result<PathBuf, ReadError> {
    let root = root
        .canonicalize()
        .map_err(|e| ReadError::InvalidPath(format!("root is not accessible: {e}")))?;

    // Joining an absolute path replaces the root entirely; the containment
    // check below rejects that case along with `..` escapes.
    let resolved = root
        .join(rel)
        .canonicalize()
        .map_err(|_| ReadError::InvalidPath(format!("'{rel}' does not exist")))?;

    if resolved.starts_with(&root) {
        Ok(resolved)
    } else {
        Err(ReadError::OutOfRoot(rel.to_string()))
    }
}
