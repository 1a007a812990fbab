use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{Client, Url};
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::{debug, info};

use crate::config::FetchConfig;
use crate::utils::error::AppError;

/// Elements whose text is page chrome rather than article content
const SKIPPED_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "nav", "header", "footer", "aside", "form", "svg",
];

/// Candidate containers for the article body, most specific first
const ROOT_SELECTORS: &[&str] = &["article", "main", "[role=\"main\"]", "body"];

static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    /// Plain text with line breaks normalized to single spaces
    pub text_content: String,
}

/// Fetches a page and extracts its readable article
pub struct ArticleFetcher {
    client: Client,
}

impl ArticleFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    pub async fn fetch(&self, url: &str) -> Result<Article, AppError> {
        let url = Url::parse(url)
            .map_err(|e| AppError::ExtractionFailed(format!("invalid URL '{}': {}", url, e)))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::ExtractionFailed(format!(
                "unsupported URL scheme '{}'",
                url.scheme()
            )));
        }

        info!("Fetching {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| AppError::ExtractionFailed(format!("failed to fetch {}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(AppError::ExtractionFailed(format!(
                "{} returned {}",
                url,
                response.status()
            )));
        }

        let html = response
            .text()
            .await
            .map_err(|e| AppError::ExtractionFailed(format!("failed to read {}: {}", url, e)))?;

        debug!("Fetched {} bytes of HTML", html.len());

        let article = extract_article(&html).ok_or_else(|| {
            AppError::ExtractionFailed(format!("no readable content found at {}", url))
        })?;

        info!(
            "Extracted article '{}' ({} chars)",
            article.title,
            article.text_content.chars().count()
        );

        Ok(article)
    }
}

/// Extract title and readable text from an HTML document.
///
/// Returns `None` when the document has no visible text outside page chrome.
pub fn extract_article(html: &str) -> Option<Article> {
    let document = Html::parse_document(html);

    let root = ROOT_SELECTORS.iter().find_map(|css| {
        let selector = Selector::parse(css).ok()?;
        document.select(&selector).next()
    });

    let raw_text = match root {
        Some(root) => visible_text(root),
        // fragments without a body element
        None => visible_text(document.root_element()),
    };

    let text_content = normalize_whitespace(&raw_text);
    if text_content.is_empty() {
        return None;
    }

    Some(Article {
        title: extract_title(&document),
        text_content,
    })
}

fn visible_text(root: ElementRef<'_>) -> String {
    let mut text = String::new();

    for node in root.descendants() {
        let Some(fragment) = node.value().as_text() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| SKIPPED_TAGS.contains(&el.name()))
        });

        if !hidden {
            text.push_str(fragment);
            // keep block boundaries from gluing words together
            text.push(' ');
        }
    }

    text
}

fn extract_title(document: &Html) -> String {
    let candidates = [
        ("title", None),
        ("meta[property=\"og:title\"]", Some("content")),
        ("h1", None),
    ];

    for (css, attr) in candidates {
        let Ok(selector) = Selector::parse(css) else {
            continue;
        };

        let Some(element) = document.select(&selector).next() else {
            continue;
        };

        let value = match attr {
            Some(attr) => element.value().attr(attr).unwrap_or_default().to_string(),
            None => element.text().collect::<String>(),
        };

        let title = normalize_whitespace(&value);
        if !title.is_empty() {
            return title;
        }
    }

    String::new()
}

/// Collapse every whitespace run (line breaks included) into one space
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE: &str = r#"<!doctype html>
<html>
  <head>
    <title>  Rust   Weekly
    </title>
    <style>body { color: red; }</style>
  </head>
  <body>
    <nav>Home | About</nav>
    <header><h1>Site banner</h1></header>
    <article>
      <h2>Ownership</h2>
      <p>Rust has ownership.
      It is checked at compile time.</p>
      <script>trackVisitor();</script>
      <p>Borrowing<em>is</em> next.</p>
    </article>
    <footer>Copyright</footer>
  </body>
</html>"#;

    fn fetch_config() -> FetchConfig {
        FetchConfig {
            timeout_seconds: 5,
            user_agent: "article-prompt-test".to_string(),
        }
    }

    #[test]
    fn test_extract_prefers_article_and_skips_chrome() {
        let article = extract_article(PAGE).unwrap();

        assert_eq!(article.title, "Rust Weekly");
        assert_eq!(
            article.text_content,
            "Ownership Rust has ownership. It is checked at compile time. Borrowing is next."
        );
        assert!(!article.text_content.contains('\n'));
        assert!(!article.text_content.contains("trackVisitor"));
    }

    #[test]
    fn test_extract_falls_back_to_body() {
        let html = "<html><head><meta property=\"og:title\" content=\"OG Title\"></head>\
                    <body><nav>menu</nav><p>Plain body text.</p></body></html>";
        let article = extract_article(html).unwrap();

        assert_eq!(article.title, "OG Title");
        assert_eq!(article.text_content, "Plain body text.");
    }

    #[test]
    fn test_extract_title_from_h1() {
        let html = "<html><body><main><h1>Heading</h1><p>Text.</p></main></body></html>";
        let article = extract_article(html).unwrap();

        assert_eq!(article.title, "Heading");
        assert_eq!(article.text_content, "Heading Text.");
    }

    #[test]
    fn test_extract_returns_none_without_text() {
        let html = "<html><body><script>var x = 1;</script><nav>Menu</nav></body></html>";
        assert!(extract_article(html).is_none());
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  a\n\nb\t c  "), "a b c");
    }

    #[tokio::test]
    async fn test_fetch_extracts_article() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/post"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
            .mount(&server)
            .await;

        let fetcher = ArticleFetcher::new(&fetch_config()).unwrap();
        let article = fetcher.fetch(&format!("{}/post", server.uri())).await.unwrap();

        assert_eq!(article.title, "Rust Weekly");
    }

    #[tokio::test]
    async fn test_fetch_error_status_is_extraction_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = ArticleFetcher::new(&fetch_config()).unwrap();
        let result = fetcher.fetch(&format!("{}/missing", server.uri())).await;

        assert!(matches!(result, Err(AppError::ExtractionFailed(_))));
    }

    #[tokio::test]
    async fn test_fetch_rejects_invalid_urls() {
        let fetcher = ArticleFetcher::new(&fetch_config()).unwrap();

        let result = fetcher.fetch("not a url").await;
        assert!(matches!(result, Err(AppError::ExtractionFailed(_))));

        let result = fetcher.fetch("ftp://example.com/file").await;
        assert!(matches!(result, Err(AppError::ExtractionFailed(_))));
    }
}
