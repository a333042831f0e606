//! Palm-oil news aggregation across the first result pages

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use futures_util::future::try_join_all;
use shared::{NewsFeed, NewsItem};

use crate::error::{AppError, AppResult};
use crate::external::news::{NewsClient, PAGE_OFFSETS};

/// News service
#[derive(Clone)]
pub struct NewsService {
    client: NewsClient,
    utc_offset_hours: i32,
}

impl NewsService {
    pub fn new(client: NewsClient, utc_offset_hours: i32) -> Self {
        Self {
            client,
            utc_offset_hours,
        }
    }

    /// Relevant items from every result page, in page order
    pub async fn get_news(&self) -> AppResult<NewsFeed> {
        let today = local_date(Utc::now(), self.utc_offset_hours)?;
        self.get_news_as_of(today).await
    }

    pub async fn get_news_as_of(&self, today: NaiveDate) -> AppResult<NewsFeed> {
        let pages = try_join_all(
            PAGE_OFFSETS
                .iter()
                .map(|offset| self.client.fetch_page(today, *offset)),
        )
        .await?;

        let news: Vec<NewsItem> = pages.into_iter().flatten().collect();
        tracing::debug!(items = news.len(), "news pages scraped");

        Ok(NewsFeed { news })
    }
}

/// Calendar date at `now` in a fixed UTC offset, independent of the host zone
pub fn local_date(now: DateTime<Utc>, utc_offset_hours: i32) -> AppResult<NaiveDate> {
    let offset = FixedOffset::east_opt(utc_offset_hours * 3600).ok_or_else(|| {
        AppError::Configuration(format!("invalid news UTC offset: {}h", utc_offset_hours))
    })?;
    Ok(now.with_timezone(&offset).date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn evening_utc() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 9, 20, 0, 0).unwrap()
    }

    #[test]
    fn test_local_date_rolls_over_ahead_of_utc() {
        assert_eq!(
            local_date(evening_utc(), 8).unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 10).unwrap()
        );
    }

    #[test]
    fn test_local_date_at_utc() {
        assert_eq!(
            local_date(evening_utc(), 0).unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 9).unwrap()
        );
    }

    #[test]
    fn test_local_date_rejects_out_of_range_offset() {
        assert!(matches!(
            local_date(evening_utc(), 30),
            Err(AppError::Configuration(_))
        ));
    }
}
