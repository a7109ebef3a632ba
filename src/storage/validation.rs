//! Path validation
//!
//! Maps an untrusted client path onto a canonical host path and proves the
//! result stays inside its volume root. Every filesystem-touching operation
//! takes a [`ResolvedPath`], and this module is the only place that builds one.

use log::warn;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::ExplorerError;

/// Same limit the kernel applies before reporting ELOOP
const MAX_SYMLINK_HOPS: usize = 40;

/// A canonical path proven to be the volume root or one of its descendants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    absolute: PathBuf,
    entry: PathBuf,
    root: PathBuf,
    relative: String,
}

impl ResolvedPath {
    /// Absolute, symlink-free host path
    pub fn as_path(&self) -> &Path {
        &self.absolute
    }

    /// Canonical root of the volume this path was resolved against
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `/`-separated path below the root; empty for the root itself.
    ///
    /// Resolving this string against the same volume yields the same object.
    pub fn relative(&self) -> &str {
        &self.relative
    }

    pub fn is_root(&self) -> bool {
        self.relative.is_empty()
    }

    /// The requested entry itself, with its final component not followed.
    ///
    /// Differs from [`as_path`](Self::as_path) only when the client named a
    /// symlink. Unless it is the root, its parent directory is inside the root.
    pub fn entry(&self) -> &Path {
        &self.entry
    }

    /// Name the client used for the final component, or `None` for the root
    pub fn file_name(&self) -> Option<&str> {
        if self.entry == self.root {
            return None;
        }
        self.entry.file_name().and_then(|name| name.to_str())
    }

    /// Resolves `name` below this path through the same containment check.
    pub fn child(&self, name: &str) -> Result<ResolvedPath, ExplorerError> {
        resolve(&self.root, &join_relative(&self.relative, name))
    }
}

/// Resolves `relative` against `volume_root`.
///
/// The joined path is canonicalized with symlinks followed; segments that do
/// not exist yet are appended literally so upload and mkdir targets resolve
/// too. The result is accepted only if it equals the canonical root or is a
/// component-wise descendant of it.
pub fn resolve(volume_root: &Path, relative: &str) -> Result<ResolvedPath, ExplorerError> {
    let root = volume_root
        .canonicalize()
        .map_err(|e| classify(e).at(relative))?;

    if relative.contains('\0') {
        warn!(
            "Rejected path with NUL byte under {}: {relative:?}",
            root.display()
        );
        return Err(ExplorerError::AccessDenied(relative.to_string()));
    }

    let joined = root.join(relative);
    let mut hops = 0;
    let absolute =
        canonicalize_lenient(&joined, &mut hops).map_err(|e| classify(e).at(relative))?;
    let below_root = contained(&root, &absolute, relative)?;

    // A trailing name is kept unfollowed so a symlink can be addressed itself
    let entry = match (
        Path::new(relative).components().next_back(),
        joined.parent(),
    ) {
        (Some(Component::Normal(name)), Some(parent)) => {
            let mut hops = 0;
            let parent =
                canonicalize_lenient(parent, &mut hops).map_err(|e| classify(e).at(relative))?;
            contained(&root, &parent, relative)?;
            parent.join(name)
        }
        _ => absolute.clone(),
    };

    let relative = below_root
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");

    Ok(ResolvedPath {
        absolute,
        entry,
        root,
        relative,
    })
}

/// The part of `path` below `root`, or AccessDenied.
///
/// `Path::strip_prefix` compares whole components, so `/mnt/storage_1x` is
/// not inside `/mnt/storage_1`.
fn contained<'a>(root: &Path, path: &'a Path, relative: &str) -> Result<&'a Path, ExplorerError> {
    path.strip_prefix(root).map_err(|_| {
        warn!(
            "Possible intrusion attempt: {relative:?} escapes volume root {}",
            root.display()
        );
        ExplorerError::AccessDenied(relative.to_string())
    })
}

/// Canonicalizes the deepest existing ancestor and appends the rest literally.
///
/// Walks component by component so `..` after a missing segment still
/// applies, and dangling symlinks are followed to their intended target.
fn canonicalize_lenient(path: &Path, hops: &mut usize) -> io::Result<PathBuf> {
    let mut resolved = PathBuf::new();

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => resolved.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            Component::Normal(segment) => {
                let candidate = resolved.join(segment);
                resolved = match candidate.canonicalize() {
                    Ok(canonical) => canonical,
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {
                        match fs::symlink_metadata(&candidate) {
                            Ok(meta) if meta.file_type().is_symlink() => {
                                *hops += 1;
                                if *hops > MAX_SYMLINK_HOPS {
                                    return Err(io::Error::other(
                                        "too many levels of symbolic links",
                                    ));
                                }
                                let target = fs::read_link(&candidate)?;
                                canonicalize_lenient(&resolved.join(target), hops)?
                            }
                            _ => candidate,
                        }
                    }
                    Err(e) => return Err(e),
                };
            }
        }
    }

    Ok(resolved)
}

fn classify(error: io::Error) -> ExplorerError {
    match error.kind() {
        // "file.txt/child" names nothing
        io::ErrorKind::NotADirectory => ExplorerError::NotFound(String::new()),
        _ => ExplorerError::from(error),
    }
}

pub(crate) fn join_relative(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{base}/{name}")
    }
}

/// Reduces a client-supplied file name to a single safe path component.
///
/// Separators become spaces, whitespace runs collapse to `_`, anything
/// outside `[A-Za-z0-9_.-]` is dropped and leading/trailing `.`/`_` are
/// trimmed. Returns `None` when nothing usable is left.
pub fn sanitize_filename(filename: &str) -> Option<String> {
    let spaced = filename.replace(['/', '\\'], " ");
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let filtered: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    let trimmed = filtered.trim_matches(|c| c == '.' || c == '_');

    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
