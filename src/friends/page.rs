use scraper::Html;
use tracing::debug;

use super::dsl::{parse_selector, Expression};
use crate::app::Result;
use crate::config::Preset;
use crate::discovery::resolve_link;
use crate::domain::FriendLink;
use crate::fetcher::{Fetcher, FRIENDS_PAGE_LIMIT};

/// Extract roster entries from a friends listing page.
///
/// Every element matching the preset's `item` selector yields one entry,
/// in document order. `link` and `avatar` are resolved against `base_url`.
/// An item is dropped only when both its name and link come out empty.
/// A preset without a friends-page rule yields nothing.
pub fn extract(html: &str, base_url: &str, preset: &Preset) -> Result<Vec<FriendLink>> {
    let Some(rule) = preset.friends_page.as_ref() else {
        return Ok(Vec::new());
    };

    let item = parse_selector(rule.item.trim())?;
    let name = Expression::parse(&rule.name)?;
    let link = Expression::parse(&rule.link)?;
    let avatar = Expression::parse(&rule.avatar)?;

    let document = Html::parse_document(html);
    let mut friends = Vec::new();

    for element in document.select(&item) {
        let entry = FriendLink::new(
            name.evaluate(element),
            resolve_link(base_url, &link.evaluate(element)),
            resolve_link(base_url, &avatar.evaluate(element)),
        );

        if entry.name.is_empty() && entry.link.is_empty() {
            debug!(base_url = %base_url, "Skipping friends-page item without name or link");
            continue;
        }
        friends.push(entry);
    }

    Ok(friends)
}

/// Fetch `url` and extract its roster entries. Nothing is requested when
/// the preset has no friends-page rule.
pub async fn fetch_friends_page<F>(fetcher: &F, url: &str, preset: &Preset) -> Result<Vec<FriendLink>>
where
    F: Fetcher + Send + Sync + ?Sized,
{
    if preset.friends_page.is_none() {
        debug!(%url, "Preset has no friends-page rule, skipping fetch");
        return Ok(Vec::new());
    }

    let response = fetcher.fetch(url, FRIENDS_PAGE_LIMIT).await?;
    extract(&response.text(), url, preset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppError;
    use crate::config::FriendsPageRule;
    use crate::fetcher::{FetcherOptions, HttpFetcher};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn preset(item: &str, name: &str, link: &str, avatar: &str) -> Preset {
        Preset {
            friends_page: Some(FriendsPageRule {
                item: item.into(),
                name: name.into(),
                link: link.into(),
                avatar: avatar.into(),
            }),
        }
    }

    const PAGE: &str = r#"<html><body><ul>
        <li class="it"><a href="/a" class="nm0">A</a><img src="/a.png"></li>
        <li class="it" data-href="https://b.example/"><span class="nm1">B</span></li>
        <li class="it">Carol<img data-src="c.png"></li>
        <li class="it"><img src="/ghost.png"></li>
    </ul></body></html>"#;

    #[test]
    fn test_extract_in_document_order_with_fallbacks() {
        let preset = preset(
            "li.it",
            ".nm0||.nm1||.",
            "a@href||@data-href",
            "img@src||img@data-src",
        );
        let friends = extract(PAGE, "https://host.example/links/", &preset).unwrap();

        let names: Vec<_> = friends.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["A", "B", "Carol"]);

        assert_eq!(friends[0].link, "https://host.example/a");
        assert_eq!(friends[0].avatar, "https://host.example/a.png");
        assert_eq!(friends[1].link, "https://b.example/");
        assert_eq!(friends[1].avatar, "");
        assert_eq!(friends[2].link, "");
        assert_eq!(friends[2].avatar, "https://host.example/links/c.png");
        assert!(friends.iter().all(|f| f.feed_suffix.is_empty()));
    }

    #[test]
    fn test_preset_without_rule_yields_nothing() {
        let friends = extract(PAGE, "https://host.example/", &Preset::default()).unwrap();
        assert!(friends.is_empty());
    }

    #[test]
    fn test_invalid_rule_rejected() {
        let bad_item = preset("[[", ".", "a@href", "");
        assert!(matches!(
            extract(PAGE, "https://host.example/", &bad_item),
            Err(AppError::InvalidSelector(_))
        ));

        let bad_link = preset("li", ".", "a@", "");
        assert!(extract(PAGE, "https://host.example/", &bad_link).is_err());
    }

    #[test]
    fn test_no_matching_items() {
        let preset = preset(".flink-list-item", ".", "a@href", "");
        let friends = extract(PAGE, "https://host.example/", &preset).unwrap();
        assert!(friends.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_friends_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/links/"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(PAGE))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(FetcherOptions::default()).unwrap();
        let url = format!("{}/links/", server.uri());
        let preset = preset("li.it", ".nm0||.nm1||.", "a@href", "");

        let friends = fetch_friends_page(&fetcher, &url, &preset).await.unwrap();
        assert_eq!(friends.len(), 3);
        assert_eq!(friends[0].link, format!("{}/a", server.uri()));
    }

    #[tokio::test]
    async fn test_fetch_friends_page_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(FetcherOptions::default()).unwrap();
        let preset = preset("li", ".", "a@href", "");
        let err = fetch_friends_page(&fetcher, &server.uri(), &preset)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::HttpStatus { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_preset_without_rule_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/links/"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(PAGE))
            .expect(0)
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(FetcherOptions::default()).unwrap();
        let url = format!("{}/links/", server.uri());
        let preset = Preset { friends_page: None };

        let friends = fetch_friends_page(&fetcher, &url, &preset).await.unwrap();
        assert!(friends.is_empty());
        server.verify().await;
    }
}
