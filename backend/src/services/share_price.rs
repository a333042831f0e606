//! Recent share prices for listed companies

use chrono::{DateTime, Duration, Utc};
use shared::{round2, Lookup, SharePriceSeries};

use super::company::CompanyService;
use crate::error::AppResult;
use crate::external::price::{DailyClose, PriceClient};

/// Share price service
#[derive(Clone)]
pub struct SharePriceService {
    companies: CompanyService,
    prices: PriceClient,
    exchange_suffix: String,
    lookback_days: i64,
}

impl SharePriceService {
    pub fn new(
        companies: CompanyService,
        prices: PriceClient,
        exchange_suffix: String,
        lookback_days: i64,
    ) -> Self {
        Self {
            companies,
            prices,
            exchange_suffix,
            lookback_days,
        }
    }

    /// Exchange ticker for a listed stock code
    pub fn ticker(&self, stock_code: &str) -> String {
        format!("{}{}", stock_code.trim(), self.exchange_suffix)
    }

    /// Daily closes over the lookback window ending now
    pub async fn get_share_prices(&self, code: &str) -> AppResult<Lookup<SharePriceSeries>> {
        self.get_share_prices_until(code, Utc::now()).await
    }

    /// Daily closes over the lookback window ending at `end`
    pub async fn get_share_prices_until(
        &self,
        code: &str,
        end: DateTime<Utc>,
    ) -> AppResult<Lookup<SharePriceSeries>> {
        let Some(stock_code) = self.companies.get_stock_code(code).await? else {
            return Ok(Lookup::missing(format!(
                "Company '{}' not found in database.",
                code
            )));
        };

        let ticker = self.ticker(&stock_code);
        let start = end - Duration::days(self.lookback_days);
        let closes = self.prices.daily_closes(&ticker, start, end).await?;

        if closes.is_empty() {
            tracing::info!(%ticker, "no closes in lookback window");
            return Ok(Lookup::missing(format!(
                "No data found for stock code {}",
                ticker
            )));
        }

        Ok(Lookup::Found(to_series(&closes)))
    }
}

/// Parallel date/price arrays with prices rounded to sen
pub fn to_series(closes: &[DailyClose]) -> SharePriceSeries {
    let (dates, prices) = closes
        .iter()
        .map(|c| (c.date.format("%Y-%m-%d").to_string(), round2(c.close)))
        .unzip();
    SharePriceSeries { dates, prices }
}
