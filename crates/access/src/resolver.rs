//! Root-confined path resolution.
//!
//! Every client-supplied path is joined onto the share root and fully
//! normalized (`.`, `..` and symlinks resolved, including symlinks whose
//! target does not exist yet) before it is compared with the canonical
//! root. The comparison is component-wise on the resolved forms, so
//! neither `..` sequences nor symlinks can reach outside the root.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Result, ShareError};

/// Maximum number of symlinks followed during a single resolution.
pub const MAX_SYMLINK_HOPS: usize = 40;

/// What the caller expects to find at the resolved location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expect {
    /// An existing directory. The empty path resolves to the root.
    Directory,
    /// An existing regular file.
    File,
    /// A file to be written. It need not exist; missing parents are created.
    UploadTarget,
}

impl Expect {
    /// Whether this mode rejects an empty relative path.
    fn requires_name(self) -> bool {
        matches!(self, Expect::File | Expect::UploadTarget)
    }
}

/// Resolve `relative` beneath `root` and check it against `expect`.
///
/// The returned path is absolute, free of symlinks and guaranteed to be
/// the canonical root or a descendant of it.
pub fn resolve(root: &Path, relative: &str, expect: Expect) -> Result<PathBuf> {
    if expect.requires_name() && relative.is_empty() {
        return Err(ShareError::no_file_provided());
    }

    let root = fs::canonicalize(root)?;
    let candidate = normalize_beneath(&root, relative)?;

    if !candidate.starts_with(&root) {
        warn!("Rejected path escaping the share root: {:?}", relative);
        return Err(ShareError::OutsideRoot);
    }

    match expect {
        Expect::Directory => {
            if !candidate.is_dir() {
                return Err(ShareError::directory_not_found(relative));
            }
        }
        Expect::File => {
            if !candidate.is_file() {
                return Err(ShareError::file_not_found(relative));
            }
        }
        Expect::UploadTarget => {
            if candidate.is_dir() {
                return Err(ShareError::NotFound(format!(
                    "'{relative}' is a directory"
                )));
            }
            if let Some(parent) = candidate.parent() {
                create_parents(parent, relative)?;
            }
        }
    }

    debug!("Resolved {:?} as {:?}", relative, expect);
    Ok(candidate)
}

/// Resolve a directory for listing.
pub fn resolve_directory(root: &Path, relative: &str) -> Result<PathBuf> {
    resolve(root, relative, Expect::Directory)
}

/// Resolve an existing regular file for download.
pub fn resolve_download(root: &Path, relative: &str) -> Result<PathBuf> {
    resolve(root, relative, Expect::File)
}

/// Resolve the destination of an upload, creating its parent directories.
pub fn resolve_upload_target(root: &Path, relative: &str) -> Result<PathBuf> {
    resolve(root, relative, Expect::UploadTarget)
}

fn normalize_beneath(canonical_root: &Path, relative: &str) -> Result<PathBuf> {
    let mut resolved = canonical_root.to_path_buf();
    let mut hops = 0;
    walk(&mut resolved, Path::new(relative), &mut hops)?;
    Ok(resolved)
}

/// Apply the components of `path` to `resolved`, which is always kept
/// symlink-free.
fn walk(resolved: &mut PathBuf, path: &Path, hops: &mut usize) -> io::Result<()> {
    if path.has_root() {
        // An absolute path replaces everything resolved so far.
        if let Some(anchor) = path.ancestors().last() {
            *resolved = anchor.to_path_buf();
        }
    }

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            Component::Normal(name) => {
                resolved.push(name);
                follow_symlink(resolved, hops)?;
            }
        }
    }

    Ok(())
}

/// Replace the last component of `resolved` by its target if it is a
/// symlink. Missing components are kept as they are.
fn follow_symlink(resolved: &mut PathBuf, hops: &mut usize) -> io::Result<()> {
    let metadata = match fs::symlink_metadata(&*resolved) {
        Ok(metadata) => metadata,
        Err(e)
            if matches!(
                e.kind(),
                io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
            ) =>
        {
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    if !metadata.file_type().is_symlink() {
        return Ok(());
    }

    *hops += 1;
    if *hops > MAX_SYMLINK_HOPS {
        return Err(io::Error::other("too many levels of symbolic links"));
    }

    let target = fs::read_link(&*resolved)?;
    resolved.pop();
    walk(resolved, &target, hops)
}

fn create_parents(parent: &Path, relative: &str) -> Result<()> {
    match fs::create_dir_all(parent) {
        Ok(()) => Ok(()),
        Err(e)
            if matches!(
                e.kind(),
                io::ErrorKind::AlreadyExists | io::ErrorKind::NotADirectory
            ) =>
        {
            Err(ShareError::NotFound(format!(
                "cannot create parent directory for '{relative}'"
            )))
        }
        Err(e) => Err(e.into()),
    }
}
