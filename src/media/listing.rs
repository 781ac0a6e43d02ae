use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::media::mime::is_video;
use crate::media::root::ResolvedPath;

/// Folder art file looked up in each show directory.
pub const THUMBNAIL_NAME: &str = "index.jpg";

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ListingKind {
    Directory,
    Video,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub name: String,
    pub kind: ListingKind,
    /// Only ever true for directories containing `index.jpg`.
    pub has_thumb: bool,
}

/// Contents of one library directory, read at call time.
#[derive(Debug, Clone, Default)]
pub struct Listing {
    /// Root-relative path of the listed directory; empty for the root.
    pub relative: String,
    /// Root-relative parent, `None` when listing the root.
    pub parent: Option<String>,
    pub dirs: Vec<ListingEntry>,
    pub videos: Vec<ListingEntry>,
    pub others: Vec<ListingEntry>,
}

impl Listing {
    /// Root-relative path of a child entry.
    pub fn child_path(&self, name: &str) -> String {
        if self.relative.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", self.relative, name)
        }
    }

    pub fn len(&self) -> usize {
        self.dirs.len() + self.videos.len() + self.others.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Parent of a root-relative path, `None` for the root itself.
pub fn parent_of(relative: &str) -> Option<String> {
    if relative.is_empty() {
        return None;
    }
    Some(match relative.rsplit_once('/') {
        Some((parent, _)) => parent.to_string(),
        None => String::new(),
    })
}

/// Enumerate a resolved directory into folders, videos and other files,
/// each sorted by name.
pub async fn list_directory(resolved: &ResolvedPath) -> Result<Listing, Error> {
    if !resolved.is_dir() {
        return Err(Error::NotFound(format!(
            "{} is not a directory",
            resolved.relative()
        )));
    }

    let mut listing = Listing {
        relative: resolved.relative().to_string(),
        parent: parent_of(resolved.relative()),
        ..Listing::default()
    };

    let mut dir_paths: Vec<(String, PathBuf)> = Vec::new();
    let mut read_dir = tokio::fs::read_dir(resolved.path()).await?;
    while let Some(entry) = read_dir.next_entry().await? {
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            tracing::debug!("Skipping non UTF-8 entry in {}", resolved.path().display());
            continue;
        };
        let path = entry.path();
        // metadata() follows symlinks, so linked shows list like real ones.
        let metadata = match tokio::fs::metadata(&path).await {
            Ok(m) => m,
            Err(e) => {
                tracing::debug!("Cannot stat {}: {}", path.display(), e);
                continue;
            }
        };

        if metadata.is_dir() {
            dir_paths.push((name, path));
        } else if metadata.is_file() {
            let kind = if is_video(&path) {
                ListingKind::Video
            } else {
                ListingKind::Other
            };
            let entry = ListingEntry { name, kind, has_thumb: false };
            match kind {
                ListingKind::Video => listing.videos.push(entry),
                _ => listing.others.push(entry),
            }
        }
    }

    for (name, path) in dir_paths {
        let has_thumb = has_thumbnail(&path).await;
        listing.dirs.push(ListingEntry {
            name,
            kind: ListingKind::Directory,
            has_thumb,
        });
    }

    listing.dirs.sort_by(|a, b| a.name.cmp(&b.name));
    listing.videos.sort_by(|a, b| a.name.cmp(&b.name));
    listing.others.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(listing)
}

/// Find the folder art file in `dir`, matching its name case-insensitively.
/// The directory is re-read on every call.
pub async fn find_thumbnail(dir: &Path) -> Option<PathBuf> {
    let mut read_dir = tokio::fs::read_dir(dir).await.ok()?;
    while let Ok(Some(entry)) = read_dir.next_entry().await {
        let matches = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.eq_ignore_ascii_case(THUMBNAIL_NAME));
        if matches && entry.file_type().await.is_ok_and(|t| t.is_file()) {
            return Some(entry.path());
        }
    }
    None
}

pub async fn has_thumbnail(dir: &Path) -> bool {
    find_thumbnail(dir).await.is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_of_nested_path() {
        assert_eq!(parent_of("Show/Season 1").as_deref(), Some("Show"));
        assert_eq!(parent_of("Show").as_deref(), Some(""));
        assert_eq!(parent_of(""), None);
    }

    #[test]
    fn child_path_at_root_has_no_leading_slash() {
        let root = Listing::default();
        assert_eq!(root.child_path("Show"), "Show");

        let nested = Listing {
            relative: "Show".to_string(),
            ..Listing::default()
        };
        assert_eq!(nested.child_path("ep1.mp4"), "Show/ep1.mp4");
    }
}
