//! News site scraper
//!
//! Pulls palm-oil search results from the news site's listing pages and
//! extracts headline, link, description, image and publish date per item.

use chrono::NaiveDate;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use shared::{contains_relevant_keyword, format_description, NewsItem};

use crate::error::{AppError, AppResult};

/// Result page offsets requested per call
pub const PAGE_OFFSETS: [u32; 4] = [0, 10, 20, 30];

const ITEM_SELECTOR: &str = "div.NewsList_newsListText__hstO7";
const LINK_SELECTOR: &str = "a[href]";
const HEADLINE_SELECTOR: &str = "span.NewsList_newsListItemHead__dg7eK";
const DESCRIPTION_SELECTOR: &str = "span.NewsList_newsList__2fXyv";
const DATE_SELECTOR: &str = "div.NewsList_infoNewsListSubMobile__SPmAG";
const IMAGE_SELECTOR: &str = "img.NewsList_newsImage__j_h0a";

/// News site client
#[derive(Clone)]
pub struct NewsClient {
    client: Client,
    base_url: String,
}

impl NewsClient {
    /// Create a new NewsClient sharing an existing HTTP client
    pub fn new(client: Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    /// Search results URL for one page
    pub fn search_url(&self, today: NaiveDate, offset: u32) -> String {
        format!(
            "{}/news-search-results?keywords=palm%20oil&to={}&from=1999-01-01&language=english&offset={}",
            self.base_url.trim_end_matches('/'),
            today.format("%Y-%m-%d"),
            offset
        )
    }

    /// Fetch one results page and extract its relevant items
    pub async fn fetch_page(&self, today: NaiveDate, offset: u32) -> AppResult<Vec<NewsItem>> {
        let url = self.search_url(today, offset);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("News request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::ExternalService(format!(
                "News site error: {} for offset {}",
                response.status(),
                offset
            )));
        }

        let html = response
            .text()
            .await
            .map_err(|e| AppError::ExternalService(format!("Failed to read news page: {}", e)))?;

        parse_news_page(&html, &self.base_url)
    }
}

fn selector(css: &str) -> AppResult<Selector> {
    Selector::parse(css)
        .map_err(|e| AppError::Internal(format!("invalid selector '{}': {}", css, e)))
}

/// Text fragments trimmed and concatenated without separators
fn stripped_text(element: ElementRef<'_>) -> String {
    element.text().map(str::trim).collect()
}

/// Extract relevant news items from a results page
pub fn parse_news_page(html: &str, base_url: &str) -> AppResult<Vec<NewsItem>> {
    let document = Html::parse_document(html);
    let item_sel = selector(ITEM_SELECTOR)?;
    let link_sel = selector(LINK_SELECTOR)?;
    let headline_sel = selector(HEADLINE_SELECTOR)?;
    let description_sel = selector(DESCRIPTION_SELECTOR)?;
    let date_sel = selector(DATE_SELECTOR)?;
    let span_sel = selector("span")?;
    let image_sel = selector(IMAGE_SELECTOR)?;

    let mut items = Vec::new();

    for item in document.select(&item_sel) {
        let link = item
            .select(&link_sel)
            .next()
            .and_then(|a| a.value().attr("href"));
        let headline = item.select(&headline_sel).next();
        let description = item.select(&description_sel).next();

        let (Some(link), Some(headline), Some(description)) = (link, headline, description) else {
            continue;
        };

        let headline = stripped_text(headline);
        if !contains_relevant_keyword(&headline) {
            continue;
        }

        let link = if link.starts_with('/') {
            format!("{}{}", base_url.trim_end_matches('/'), link)
        } else {
            link.to_string()
        };

        let published = item
            .parent()
            .and_then(ElementRef::wrap)
            .and_then(|parent| parent.select(&date_sel).next())
            .and_then(|info| info.select(&span_sel).next())
            .map(stripped_text);

        // The thumbnail lives in the closest preceding sibling <div>
        let image_url = item
            .prev_siblings()
            .filter_map(ElementRef::wrap)
            .find(|sibling| sibling.value().name() == "div")
            .and_then(|div| div.select(&image_sel).next())
            .and_then(|img| img.value().attr("src"))
            .map(str::to_string);

        items.push(NewsItem {
            headline,
            link,
            description: format_description(&stripped_text(description)),
            image_url,
            published,
        });
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
        <div class="NewsList_newsListItem">
            <div class="NewsList_thumb"><img class="NewsList_newsImage__j_h0a" src="https://img.example/cpo.jpg"></div>
            <div class="NewsList_newsListText__hstO7">
                <a href="/node/712345">
                    <span class="NewsList_newsListItemHead__dg7eK"> CPO futures extend gains </span>
                    <span class="NewsList_newsList__2fXyv">palmoil prices rose on strong exports</span>
                </a>
            </div>
            <div class="NewsList_infoNewsListSubMobile__SPmAG"><span>10 Jun 2025</span></div>
        </div>
        <div class="NewsList_newsListItem">
            <div class="NewsList_newsListText__hstO7">
                <a href="https://other.example/story">
                    <span class="NewsList_newsListItemHead__dg7eK">Ringgit opens higher</span>
                    <span class="NewsList_newsList__2fXyv">Currency moves</span>
                </a>
            </div>
        </div>
        <div class="NewsList_newsListItem">
            <div class="NewsList_newsListText__hstO7">
                <span class="NewsList_newsListItemHead__dg7eK">Plantation stocks slip</span>
            </div>
        </div>
        <div class="NewsList_newsListItem">
            <div class="NewsList_newsListText__hstO7">
                <a href="https://other.example/kernel">
                    <span class="NewsList_newsListItemHead__dg7eK">Palm kernel output up</span>
                    <span class="NewsList_newsList__2fXyv">Kernel output rose.</span>
                </a>
            </div>
        </div>
        </body></html>
    "#;

    #[test]
    fn test_parse_news_page_extracts_relevant_items() {
        let items = parse_news_page(PAGE, "https://theedgemalaysia.com").unwrap();
        assert_eq!(items.len(), 2);

        let first = &items[0];
        assert_eq!(first.headline, "CPO futures extend gains");
        assert_eq!(first.link, "https://theedgemalaysia.com/node/712345");
        assert_eq!(first.description, "Palm oil prices rose on strong exports");
        assert_eq!(first.image_url.as_deref(), Some("https://img.example/cpo.jpg"));
        assert_eq!(first.published.as_deref(), Some("10 Jun 2025"));

        let second = &items[1];
        assert_eq!(second.link, "https://other.example/kernel");
        assert_eq!(second.image_url, None);
        assert_eq!(second.published, None);
    }

    #[test]
    fn test_inline_markup_fragments_joined_without_spaces() {
        let page = r#"
            <div class="NewsList_newsListItem">
                <div class="NewsList_newsListText__hstO7">
                    <a href="/node/1">
                        <span class="NewsList_newsListItemHead__dg7eK">CPO <b>futures</b> rise</span>
                        <span class="NewsList_newsList__2fXyv">Demand for <i>palm</i> oil grew</span>
                    </a>
                </div>
            </div>
        "#;

        let items = parse_news_page(page, "https://theedgemalaysia.com").unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].headline, "CPOfuturesrise");
        assert_eq!(items[0].description, "Demand forpalm oil grew");
    }

    #[test]
    fn test_parse_news_page_empty_document() {
        assert!(parse_news_page("<html></html>", "https://theedgemalaysia.com")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_search_url() {
        let client = NewsClient::new(Client::new(), "https://theedgemalaysia.com/".to_string());
        let today = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        assert_eq!(
            client.search_url(today, 20),
            "https://theedgemalaysia.com/news-search-results?keywords=palm%20oil&to=2025-06-10&from=1999-01-01&language=english&offset=20"
        );
    }
}
