use std::borrow::Cow;
use std::fmt::Write;

use crate::media::listing::{Listing, THUMBNAIL_NAME};
use crate::media::mime::ClientHint;

const STYLE: &str = r#"body{font-family:sans-serif;margin:1.5em;background:#111;color:#eee}
a{color:#8cf;text-decoration:none}
ul{list-style:none;padding:0}
li{margin:.4em 0}
.dirs li{display:inline-block;width:160px;margin:.5em;vertical-align:top;text-align:center}
.dirs img{width:150px;border-radius:4px;display:block;margin:0 auto .3em}
video{max-width:100%;background:#000}"#;

/// Escape text for use in HTML element content and quoted attributes.
pub fn html_escape(s: &str) -> Cow<'_, str> {
    quick_xml::escape::escape(s)
}

/// Percent-encode each segment of a root-relative path, keeping the slashes.
pub fn encode_path(relative: &str) -> String {
    relative
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>{STYLE}</style>
</head>
<body>
{body}
</body>
</html>"#,
        title = html_escape(title),
    )
}

fn browse_href(relative: &str) -> String {
    if relative.is_empty() {
        "/".to_string()
    } else {
        format!("/browse/{}", encode_path(relative))
    }
}

/// Android intent that hands a video URL to an external player app.
fn intent_href(host: &str, relative: &str) -> String {
    format!(
        "intent://{host}/video/{path}#Intent;scheme=http;type=video/*;end",
        path = encode_path(relative),
    )
}

/// Directory listing page: folders (with art when present), videos, then other files.
pub fn render_listing(listing: &Listing, client: ClientHint, host: Option<&str>) -> String {
    let title = if listing.relative.is_empty() {
        "TV".to_string()
    } else {
        listing.relative.clone()
    };

    let mut body = String::new();
    let _ = writeln!(body, "<h1>{}</h1>", html_escape(&title));
    if let Some(parent) = &listing.parent {
        let _ = writeln!(body, r#"<p><a href="{}">&larr; Back</a></p>"#, browse_href(parent));
    }

    if !listing.dirs.is_empty() {
        body.push_str("<ul class=\"dirs\">\n");
        for dir in &listing.dirs {
            let child = listing.child_path(&dir.name);
            let name = html_escape(&dir.name);
            let thumb = if dir.has_thumb {
                format!(
                    r#"<img src="/thumb/{}/{THUMBNAIL_NAME}" alt="" loading="lazy">"#,
                    encode_path(&child)
                )
            } else {
                String::new()
            };
            let _ = writeln!(
                body,
                r#"<li><a href="{}">{thumb}{name}</a></li>"#,
                browse_href(&child)
            );
        }
        body.push_str("</ul>\n");
    }

    if !listing.videos.is_empty() {
        body.push_str("<h2>Videos</h2>\n<ul class=\"videos\">\n");
        for video in &listing.videos {
            let child = listing.child_path(&video.name);
            let name = html_escape(&video.name);
            let _ = write!(
                body,
                r#"<li><a href="/play/{path}">{name}</a> <small><a href="/stream/{path}">(transcode)</a></small>"#,
                path = encode_path(&child)
            );
            if let (ClientHint::Mobile, Some(host)) = (client, host) {
                let _ = write!(
                    body,
                    r#" <small><a href="{}">(open in app)</a></small>"#,
                    html_escape(&intent_href(host, &child))
                );
            }
            body.push_str("</li>\n");
        }
        body.push_str("</ul>\n");
    }

    if !listing.others.is_empty() {
        body.push_str("<h2>Other files</h2>\n<ul class=\"others\">\n");
        for other in &listing.others {
            let child = listing.child_path(&other.name);
            let _ = writeln!(
                body,
                r#"<li><a href="/video/{}">{}</a></li>"#,
                encode_path(&child),
                html_escape(&other.name)
            );
        }
        body.push_str("</ul>\n");
    }

    if listing.is_empty() {
        body.push_str("<p>This folder is empty.</p>\n");
    }

    page(&title, &body)
}

/// Player page. The browser plays `/video/...` directly; the transcode link
/// is there for codecs it cannot decode.
pub fn render_player(relative: &str, file_name: &str, back: &str) -> String {
    let path = encode_path(relative);
    let body = format!(
        r#"<p><a href="{back}">&larr; Back</a></p>
<h1>{name}</h1>
<video controls autoplay preload="metadata" src="/video/{path}"></video>
<p>Not playing? <a href="/stream/{path}">Play transcoded version</a> (no seeking).</p>"#,
        back = browse_href(back),
        name = html_escape(file_name),
    );
    page(file_name, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::listing::{ListingEntry, ListingKind};

    #[test]
    fn encode_path_keeps_separators() {
        assert_eq!(encode_path("My Show/ep #1.mkv"), "My%20Show/ep%20%231.mkv");
    }

    #[test]
    fn listing_escapes_names() {
        let listing = Listing {
            videos: vec![ListingEntry {
                name: "<b>ep1</b>.mp4".to_string(),
                kind: ListingKind::Video,
                has_thumb: false,
            }],
            ..Listing::default()
        };
        let html = render_listing(&listing, ClientHint::Desktop, None);
        assert!(html.contains("&lt;b&gt;ep1&lt;/b&gt;.mp4"));
        assert!(!html.contains("<b>ep1</b>"));
    }

    #[test]
    fn mobile_listing_offers_intent_link() {
        let listing = Listing {
            relative: "Show".to_string(),
            parent: Some(String::new()),
            videos: vec![ListingEntry {
                name: "ep1.mkv".to_string(),
                kind: ListingKind::Video,
                has_thumb: false,
            }],
            ..Listing::default()
        };
        let mobile = render_listing(&listing, ClientHint::Mobile, Some("10.0.0.2:8000"));
        assert!(mobile.contains("intent://10.0.0.2:8000/video/Show/ep1.mkv#Intent;"));
        let desktop = render_listing(&listing, ClientHint::Desktop, Some("10.0.0.2:8000"));
        assert!(!desktop.contains("intent://"));
    }

    #[test]
    fn player_points_at_both_routes() {
        let html = render_player("Show/ep 1.mkv", "ep 1.mkv", "Show");
        assert!(html.contains(r#"src="/video/Show/ep%201.mkv""#));
        assert!(html.contains(r#"href="/stream/Show/ep%201.mkv""#));
        assert!(html.contains(r#"href="/browse/Show""#));
    }
}
