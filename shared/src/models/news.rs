//! News models

use serde::{Deserialize, Serialize};

/// A palm-oil related news headline scraped from the news source
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewsItem {
    pub headline: String,
    pub link: String,
    pub description: String,
    pub image_url: Option<String>,
    pub published: Option<String>,
}

/// News feed response body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewsFeed {
    pub news: Vec<NewsItem>,
}
