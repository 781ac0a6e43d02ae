use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::Error;

/// Whether a resolved location is a directory or a regular file.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
}

/// A location proven to exist inside the library root at resolution time.
/// Lives for one request only; the filesystem may change afterwards.
#[derive(Debug, Clone)]
pub struct ResolvedPath {
    path: PathBuf,
    relative: String,
    kind: EntryKind,
}

impl ResolvedPath {
    /// Canonical absolute path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Root-relative form, `/`-separated, empty for the root itself.
    pub fn relative(&self) -> &str {
        &self.relative
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

/// The single directory tree the server is allowed to expose.
///
/// Built once at startup and then shared read-only. The stored path is
/// canonical so containment checks compare like with like.
#[derive(Debug, Clone)]
pub struct LibraryRoot {
    path: PathBuf,
}

impl LibraryRoot {
    /// Canonicalize `path` and check that it is a directory.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let canonical = std::fs::canonicalize(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::NotFound(path.display().to_string()),
            _ => Error::Io(e),
        })?;
        if !canonical.is_dir() {
            return Err(Error::NotFound(format!(
                "{} is not a directory",
                canonical.display()
            )));
        }
        Ok(Self { path: canonical })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Map a client-supplied relative path onto the library.
    ///
    /// `..` segments are refused outright rather than normalized away, and
    /// the canonical result is checked against the root again so a symlink
    /// cannot lead outside it.
    pub async fn resolve(&self, request_path: &str) -> Result<ResolvedPath, Error> {
        let segments = split_segments(request_path)?;

        let mut joined = self.path.clone();
        joined.extend(&segments);

        let canonical = tokio::fs::canonicalize(&joined)
            .await
            .map_err(|e| not_found_or_io(e, request_path))?;
        if !canonical.starts_with(&self.path) {
            return Err(Error::Forbidden(request_path.to_string()));
        }

        let metadata = tokio::fs::metadata(&canonical)
            .await
            .map_err(|e| not_found_or_io(e, request_path))?;
        let kind = if metadata.is_dir() {
            EntryKind::Directory
        } else if metadata.is_file() {
            EntryKind::File
        } else {
            // sockets, fifos, devices
            return Err(Error::NotFound(request_path.to_string()));
        };

        Ok(ResolvedPath {
            path: canonical,
            relative: segments.join("/"),
            kind,
        })
    }
}

/// Split a request path into plain name segments, dropping empty and `.`
/// parts. Anything that is not a single normal component is rejected.
fn split_segments(request_path: &str) -> Result<Vec<&str>, Error> {
    let mut segments = Vec::new();
    for segment in request_path.split(['/', '\\']) {
        if segment.is_empty() || segment == "." {
            continue;
        }
        if segment == ".." || segment.contains('\0') {
            return Err(Error::Forbidden(request_path.to_string()));
        }
        let mut components = Path::new(segment).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => segments.push(segment),
            _ => return Err(Error::Forbidden(request_path.to_string())),
        }
    }
    Ok(segments)
}

fn not_found_or_io(e: io::Error, request_path: &str) -> Error {
    // ENOENT and ENOTDIR (a file used as a directory) both mean "no such path".
    match e.kind() {
        io::ErrorKind::PermissionDenied => Error::Io(e),
        _ => Error::NotFound(request_path.to_string()),
    }
}
