use std::path::Path;
use tvview::media::mime::{
    describe, guess_mime, is_video, ClientHint, Delivery, DeliveryMode, DEFAULT_MIME,
};

#[test]
fn test_all_listed_video_extensions_are_video() {
    for name in [
        "a.mp4", "a.mkv", "a.avi", "a.mov", "a.wmv", "a.flv", "a.ts", "a.webm", "a.m2ts",
    ] {
        assert!(is_video(Path::new(name)), "{name} should be video");
    }
}

#[test]
fn test_case_insensitive() {
    assert!(is_video(Path::new("EPISODE.MKV")));
    assert_eq!(guess_mime(Path::new("EPISODE.MKV")), Some("video/x-matroska"));
}

#[test]
fn test_non_video_files() {
    assert!(!is_video(Path::new("index.jpg")));
    assert!(!is_video(Path::new("notes.txt")));
    assert!(!is_video(Path::new("Makefile")));
    // m4v has a MIME type but is not in the video set
    assert!(!is_video(Path::new("clip.m4v")));
}

#[test]
fn test_unknown_extension_defaults_to_mp4() {
    let descriptor = describe(Path::new("episode.xyz"));
    assert_eq!(descriptor.mime, DEFAULT_MIME);
    assert_eq!(descriptor.extension.as_deref(), Some("xyz"));
    assert!(!descriptor.direct);

    let bare = describe(Path::new("README"));
    assert_eq!(bare.mime, "video/mp4");
    assert_eq!(bare.extension, None);
}

#[test]
fn test_jpeg_is_image() {
    assert_eq!(guess_mime(Path::new("index.jpg")), Some("image/jpeg"));
}

#[test]
fn test_direct_mode_serves_anything() {
    let video = describe(Path::new("ep1.mkv"));
    let text = describe(Path::new("notes.txt"));
    assert_eq!(video.delivery(DeliveryMode::Direct), Delivery::DirectServe);
    assert_eq!(text.delivery(DeliveryMode::Direct), Delivery::DirectServe);
}

#[test]
fn test_transcode_mode_only_for_video() {
    let video = describe(Path::new("ep1.avi"));
    let image = describe(Path::new("index.jpg"));
    assert_eq!(video.delivery(DeliveryMode::Transcode), Delivery::Transcode);
    assert_eq!(image.delivery(DeliveryMode::Transcode), Delivery::Unsupported);
}

#[test]
fn test_client_hint_from_user_agent() {
    let android = "Mozilla/5.0 (Linux; Android 14) AppleWebKit/537.36 Chrome/120.0 Mobile Safari/537.36";
    let desktop = "Mozilla/5.0 (X11; Linux x86_64) Gecko/20100101 Firefox/125.0";
    assert_eq!(ClientHint::from_user_agent(Some(android)), ClientHint::Mobile);
    assert_eq!(ClientHint::from_user_agent(Some(desktop)), ClientHint::Desktop);
    assert_eq!(ClientHint::from_user_agent(None), ClientHint::Desktop);
}
