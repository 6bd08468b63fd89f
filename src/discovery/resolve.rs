//! Reference resolution for feed candidates and extracted links.
//!
//! Both functions are total: when the base cannot be parsed they fall back
//! to string concatenation instead of failing.

use url::Url;

fn is_http_url(reference: &str) -> bool {
    let lower = reference.get(..8).unwrap_or(reference).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Resolve `reference` against `base` with standard URL semantics, so a
/// relative path replaces the last segment of the base path.
///
/// `resolve_root("https://host/blog", "index.xml")` is
/// `https://host/index.xml`.
pub fn resolve_root(base: &str, reference: &str) -> String {
    let reference = reference.trim();
    if is_http_url(reference) {
        return reference.to_string();
    }

    match Url::parse(base).and_then(|b| b.join(reference)) {
        Ok(url) => url.to_string(),
        Err(_) => format!("{}{}", base, reference),
    }
}

/// Resolve `reference` treating the base path as a directory, even when it
/// lacks a trailing slash. A single leading `/` on the reference is ignored.
///
/// `resolve_dir("https://host/blog", "index.xml")` is
/// `https://host/blog/index.xml`.
pub fn resolve_dir(base: &str, reference: &str) -> String {
    let reference = reference.trim();
    if is_http_url(reference) {
        return reference.to_string();
    }
    let relative = reference.strip_prefix('/').unwrap_or(reference);

    match Url::parse(base) {
        Ok(mut url) => {
            if !url.path().ends_with('/') {
                let dir = format!("{}/", url.path());
                url.set_path(&dir);
            }
            match url.join(relative) {
                Ok(joined) => joined.to_string(),
                Err(_) => format!("{}{}", url, relative),
            }
        }
        Err(_) => {
            let mut dir = base.to_string();
            if !dir.ends_with('/') {
                dir.push('/');
            }
            dir + relative
        }
    }
}

/// Make an extracted link absolute against the page it came from. Empty
/// stays empty; when resolution fails the reference is kept as written.
pub fn resolve_link(page: &str, reference: &str) -> String {
    let reference = reference.trim();
    if reference.is_empty() || is_http_url(reference) {
        return reference.to_string();
    }

    Url::parse(page)
        .and_then(|base| base.join(reference))
        .map(String::from)
        .unwrap_or_else(|_| reference.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_relative_replaces_last_segment() {
        assert_eq!(
            resolve_root("https://host/blog", "index.xml"),
            "https://host/index.xml"
        );
        assert_eq!(
            resolve_root("https://host/blog/", "/feed.xml"),
            "https://host/feed.xml"
        );
        assert_eq!(
            resolve_root("https://host/blog", "/?feed=rss2"),
            "https://host/?feed=rss2"
        );
    }

    #[test]
    fn test_dir_relative_keeps_last_segment() {
        assert_eq!(
            resolve_dir("https://host/blog", "index.xml"),
            "https://host/blog/index.xml"
        );
        assert_eq!(
            resolve_dir("https://host/blog", "/feed.xml"),
            "https://host/blog/feed.xml"
        );
        assert_eq!(resolve_dir("https://host", "atom.xml"), "https://host/atom.xml");
    }

    #[test]
    fn test_absolute_reference_returned_verbatim() {
        assert_eq!(
            resolve_root("https://host/blog", "https://cdn.example/Feed.XML"),
            "https://cdn.example/Feed.XML"
        );
        assert_eq!(
            resolve_dir("https://host/blog", "HTTP://cdn.example/rss"),
            "HTTP://cdn.example/rss"
        );
    }

    #[test]
    fn test_unparsable_base_concatenates() {
        assert_eq!(resolve_root("host/blog", "/feed"), "host/blog/feed");
        assert_eq!(resolve_dir("host/blog", "/feed"), "host/blog/feed");
        assert_eq!(resolve_dir("host/blog/", "feed"), "host/blog/feed");
    }

    #[test]
    fn test_resolve_link() {
        assert_eq!(resolve_link("https://host/links/", "/s1"), "https://host/s1");
        assert_eq!(resolve_link("https://host/links/", "img/a.png"), "https://host/links/img/a.png");
        assert_eq!(resolve_link("https://host/links/", "  "), "");
        assert_eq!(resolve_link("not a base", "/s1"), "/s1");
    }
}
