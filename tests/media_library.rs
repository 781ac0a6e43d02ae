use std::fs;
use std::path::Path;

use tempfile::TempDir;
use tvview::error::Error;
use tvview::media::listing::{has_thumbnail, list_directory, ListingKind};
use tvview::media::mime::classify;
use tvview::media::root::{EntryKind, LibraryRoot};

/// Library layout:
///   Show A/index.jpg, Show A/ep1.mp4, Show A/ep2.mkv, Show A/notes.txt
///   Show B/ep1.avi
///   top.webm
fn make_library() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("Show A")).unwrap();
    fs::create_dir_all(root.join("Show B")).unwrap();
    fs::write(root.join("Show A/index.jpg"), b"jpeg").unwrap();
    fs::write(root.join("Show A/ep1.mp4"), vec![0u8; 10_000]).unwrap();
    fs::write(root.join("Show A/ep2.mkv"), b"mkv").unwrap();
    fs::write(root.join("Show A/notes.txt"), b"notes").unwrap();
    fs::write(root.join("Show B/ep1.avi"), b"avi").unwrap();
    fs::write(root.join("top.webm"), b"webm").unwrap();
    dir
}

fn library_root(dir: &TempDir) -> LibraryRoot {
    LibraryRoot::new(dir.path()).unwrap()
}

// ── LibraryRoot::new ──────────────────────────────────────────────────────────

#[test]
fn root_must_exist() {
    let result = LibraryRoot::new("/nonexistent/library/root");
    assert!(matches!(result, Err(Error::NotFound(_))));
}

#[test]
fn root_must_be_a_directory() {
    let dir = make_library();
    let result = LibraryRoot::new(dir.path().join("top.webm"));
    assert!(matches!(result, Err(Error::NotFound(_))));
}

// ── resolve ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn resolve_file_inside_root() {
    let dir = make_library();
    let root = library_root(&dir);
    let resolved = root.resolve("Show A/ep1.mp4").await.unwrap();
    assert_eq!(resolved.kind(), EntryKind::File);
    assert_eq!(resolved.relative(), "Show A/ep1.mp4");
    assert!(resolved.path().starts_with(root.path()));
}

#[tokio::test]
async fn resolve_directory_and_root() {
    let dir = make_library();
    let root = library_root(&dir);
    assert!(root.resolve("Show B").await.unwrap().is_dir());

    let top = root.resolve("").await.unwrap();
    assert!(top.is_dir());
    assert_eq!(top.relative(), "");
    assert_eq!(top.path(), root.path());
}

#[tokio::test]
async fn resolve_missing_is_not_found() {
    let dir = make_library();
    let root = library_root(&dir);
    assert!(matches!(
        root.resolve("Show A/ep9.mp4").await,
        Err(Error::NotFound(_))
    ));
    // A file used as a directory is just as missing.
    assert!(matches!(
        root.resolve("top.webm/inner").await,
        Err(Error::NotFound(_))
    ));
}

#[tokio::test]
async fn resolve_never_leaves_the_root() {
    let dir = make_library();
    let root = library_root(&dir);
    for attempt in [
        "../etc/passwd",
        "Show A/../../etc/passwd",
        "Show A/../Show B/ep1.avi",
        "/../../../../etc/passwd",
        "..\\..\\etc\\passwd",
    ] {
        match root.resolve(attempt).await {
            Err(Error::Forbidden(_)) | Err(Error::NotFound(_)) => {}
            Ok(resolved) => panic!(
                "{attempt} resolved to {}",
                resolved.path().display()
            ),
            Err(other) => panic!("{attempt}: unexpected error {other}"),
        }
    }
}

#[tokio::test]
async fn absolute_looking_request_stays_inside_root() {
    let dir = make_library();
    let root = library_root(&dir);
    // Leading slashes are dropped, so this is "<root>/etc/passwd", which does not exist.
    assert!(matches!(
        root.resolve("/etc/passwd").await,
        Err(Error::NotFound(_))
    ));
}

#[cfg(unix)]
#[tokio::test]
async fn symlink_out_of_root_is_forbidden() {
    let outside = tempfile::tempdir().unwrap();
    fs::write(outside.path().join("secret.mp4"), b"secret").unwrap();

    let dir = make_library();
    std::os::unix::fs::symlink(outside.path(), dir.path().join("escape")).unwrap();
    let root = library_root(&dir);
    assert!(matches!(
        root.resolve("escape/secret.mp4").await,
        Err(Error::Forbidden(_))
    ));
}

#[cfg(unix)]
#[tokio::test]
async fn symlink_within_root_is_allowed() {
    let dir = make_library();
    std::os::unix::fs::symlink(dir.path().join("Show B"), dir.path().join("Alias")).unwrap();
    let root = library_root(&dir);
    let resolved = root.resolve("Alias/ep1.avi").await.unwrap();
    assert!(resolved.is_file());
    assert!(resolved.path().starts_with(root.path()));
}

// ── classify ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn classify_rejects_directories() {
    let dir = make_library();
    let root = library_root(&dir);
    let show = root.resolve("Show A").await.unwrap();
    assert!(matches!(classify(&show), Err(Error::NotFound(_))));

    let episode = root.resolve("Show A/ep2.mkv").await.unwrap();
    let descriptor = classify(&episode).unwrap();
    assert_eq!(descriptor.mime, "video/x-matroska");
    assert!(descriptor.direct);
}

// ── list_directory ────────────────────────────────────────────────────────────

#[tokio::test]
async fn listing_splits_and_sorts_entries() {
    let dir = make_library();
    let root = library_root(&dir);
    let listing = list_directory(&root.resolve("Show A").await.unwrap())
        .await
        .unwrap();

    assert_eq!(listing.relative, "Show A");
    assert_eq!(listing.parent.as_deref(), Some(""));
    assert!(listing.dirs.is_empty());
    let videos: Vec<_> = listing.videos.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(videos, vec!["ep1.mp4", "ep2.mkv"]);
    let others: Vec<_> = listing.others.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(others, vec!["index.jpg", "notes.txt"]);
    assert!(listing.videos.iter().all(|e| e.kind == ListingKind::Video));
}

#[tokio::test]
async fn root_listing_flags_thumbnails() {
    let dir = make_library();
    let root = library_root(&dir);
    let listing = list_directory(&root.resolve("").await.unwrap()).await.unwrap();

    assert_eq!(listing.parent, None);
    let dirs: Vec<_> = listing
        .dirs
        .iter()
        .map(|e| (e.name.as_str(), e.has_thumb))
        .collect();
    assert_eq!(dirs, vec![("Show A", true), ("Show B", false)]);
    assert_eq!(listing.videos.len(), 1);
    assert_eq!(listing.videos[0].name, "top.webm");
}

#[tokio::test]
async fn listing_reflects_changes_between_calls() {
    let dir = make_library();
    let root = library_root(&dir);
    let resolved = root.resolve("").await.unwrap();

    let before = list_directory(&resolved).await.unwrap();
    assert!(!before.dirs[1].has_thumb);

    fs::write(dir.path().join("Show B/INDEX.JPG"), b"jpeg").unwrap();
    fs::create_dir(dir.path().join("Show C")).unwrap();

    let after = list_directory(&resolved).await.unwrap();
    assert_eq!(after.dirs.len(), 3);
    assert!(after.dirs[1].has_thumb, "thumbnail match is case-insensitive");
}

#[tokio::test]
async fn listing_a_file_is_not_found() {
    let dir = make_library();
    let root = library_root(&dir);
    let file = root.resolve("top.webm").await.unwrap();
    assert!(matches!(list_directory(&file).await, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn thumbnail_check_on_missing_directory_is_false() {
    assert!(!has_thumbnail(Path::new("/nonexistent/show")).await);
}
