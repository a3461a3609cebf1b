//! Blog scraper that turns blog posts into prompt context.

use std::{sync::Arc, time::Duration};

use anyhow::anyhow;
use async_trait::async_trait;
use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue, REFERER, USER_AGENT};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument, warn};

use crate::base::{config::Config, types::Res};

use super::{ContentClient, GenericContentClient};

/// Posts considered per page.
const MAX_POSTS_PER_PAGE: usize = 15;
/// Posts with this many characters or fewer are skipped.
const MIN_POST_CHARS: usize = 100;
/// Characters kept from each post.
const MAX_POST_CHARS: usize = 800;
/// Characters kept from all posts combined.
const MAX_CONTEXT_CHARS: usize = 6000;
/// Separator between posts.
const POST_SEPARATOR: &str = "\n---\n";
/// Subtrees whose text never counts as post content.
const EXCLUDED_TAGS: [&str; 5] = ["script", "style", "nav", "header", "footer"];

// Extra methods on `ContentClient` applied by the blog implementation.

impl ContentClient {
    pub fn blog(config: &Config) -> Res<Self> {
        let client = BlogContentClient::new(config)?;
        Ok(Self { inner: Arc::new(client) })
    }
}

// Specific implementations.

/// Blog content client implementation.
#[derive(Clone)]
pub struct BlogContentClient {
    client: reqwest::Client,
    urls: Vec<String>,
}

impl BlogContentClient {
    /// Create a new blog content client.
    #[instrument(name = "BlogContentClient::new", skip_all)]
    pub fn new(config: &Config) -> Res<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 Chrome/120 Safari/537.36"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers.insert(REFERER, HeaderValue::from_static("https://www.google.com/"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.blog_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            urls: config.blog_urls.clone(),
        })
    }
}

#[async_trait]
impl GenericContentClient for BlogContentClient {
    #[instrument(name = "BlogContentClient::fetch_context", skip_all)]
    async fn fetch_context(&self) -> Res<String> {
        let mut combined = String::new();

        for url in &self.urls {
            let response = self.client.get(url).send().await?;

            if !response.status().is_success() {
                warn!("Blog fetch returned status {} for {}", response.status(), url);
                continue;
            }

            let body = response.text().await?;
            let posts = extract_posts(&body)?;

            debug!("Extracted {} posts from {}", posts.len(), url);

            for post in posts {
                combined.push_str(&post);
                combined.push_str(POST_SEPARATOR);
            }
        }

        if combined.is_empty() {
            return Err(anyhow!("No blog posts could be extracted."));
        }

        Ok(truncate_chars(&combined, MAX_CONTEXT_CHARS))
    }
}

// Helpers.

/// Extract the text of post-like `div`s from a page, truncated and filtered for length.
pub fn extract_posts(html: &str) -> Res<Vec<String>> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("div[class]").map_err(|e| anyhow!("Invalid selector: {e:?}"))?;

    let posts = document
        .select(&selector)
        .filter(|div| div.value().attr("class").is_some_and(|class| class.to_lowercase().contains("post")))
        .filter(|div| !div.ancestors().any(|node| node.value().as_element().is_some_and(|e| EXCLUDED_TAGS.contains(&e.name()))))
        .take(MAX_POSTS_PER_PAGE)
        .map(visible_text)
        .filter(|text| text.chars().count() > MIN_POST_CHARS)
        .map(|text| truncate_chars(&text, MAX_POST_CHARS))
        .collect();

    Ok(posts)
}

/// Whitespace-joined, stripped text of an element, skipping excluded subtrees.
fn visible_text(element: ElementRef<'_>) -> String {
    let root = element.id();

    element
        .descendants()
        .filter_map(|node| node.value().as_text().map(|text| (node, text)))
        .filter(|(node, _)| {
            !node
                .ancestors()
                .take_while(|ancestor| ancestor.id() != root)
                .any(|ancestor| ancestor.value().as_element().is_some_and(|e| EXCLUDED_TAGS.contains(&e.name())))
        })
        .map(|(_, text)| text.trim())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use wiremock::matchers::{headers, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::base::config::ConfigInner;

    fn long_text(word: &str) -> String {
        vec![word; 40].join(" ")
    }

    fn page(posts: &[String]) -> String {
        let body = posts.iter().map(|p| format!("<div class=\"Post-Body\"><p>{p}</p><script>var x = 1;</script></div>")).collect::<String>();

        format!(
            "<html><head><style>body {{}}</style></head><body>\
             <header><div class=\"post-header\">{}</div></header>\
             {body}\
             <div class=\"sidebar\">not a post at all, ignored entirely by the selector</div>\
             </body></html>",
            long_text("header")
        )
    }

    fn config_for(urls: Vec<String>) -> Config {
        Config {
            inner: Arc::new(ConfigInner {
                blog_urls: urls,
                blog_timeout_secs: 2,
                ..Default::default()
            }),
        }
    }

    #[test]
    fn extracts_post_divs_and_skips_excluded_subtrees() {
        let posts = extract_posts(&page(&[long_text("visa"), "too short".to_string()])).unwrap();

        assert_eq!(posts.len(), 1);
        assert!(posts[0].starts_with("visa visa"));
        assert!(!posts[0].contains("var x"));
        assert!(!posts[0].contains("header"));
    }

    #[test]
    fn truncates_long_posts() {
        let posts = extract_posts(&page(&["x".repeat(2000)])).unwrap();
        assert_eq!(posts[0].chars().count(), MAX_POST_CHARS);
    }

    #[test]
    fn considers_at_most_fifteen_posts_per_page() {
        let many = (0..20).map(|i| long_text(&format!("post{i}"))).collect::<Vec<_>>();
        let posts = extract_posts(&page(&many)).unwrap();

        assert_eq!(posts.len(), MAX_POSTS_PER_PAGE);
    }

    #[tokio::test]
    async fn fetch_combines_pages_and_skips_failures() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/"))
            .and(headers("Accept-Language", vec!["en-US", "en;q=0.9"]))
            .respond_with(ResponseTemplate::new(200).set_body_string(page(&[long_text("bank")])))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = BlogContentClient::new(&config_for(vec![format!("{}/broken", server.uri()), format!("{}/", server.uri())])).unwrap();
        let context = client.fetch_context().await.unwrap();

        assert!(context.starts_with("bank bank"));
        assert!(context.ends_with(POST_SEPARATOR));
    }

    #[tokio::test]
    async fn fetch_errors_when_nothing_is_extracted() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = BlogContentClient::new(&config_for(vec![server.uri()])).unwrap();

        assert!(client.fetch_context().await.is_err());
    }

    #[tokio::test]
    async fn fetch_errors_on_unreachable_host() {
        let client = BlogContentClient::new(&config_for(vec!["http://127.0.0.1:9/".to_string()])).unwrap();

        assert!(client.fetch_context().await.is_err());
    }
}
