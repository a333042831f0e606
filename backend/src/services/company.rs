//! Company master data and reporting series from the SQLite store
//!
//! Every lookup is keyed by the uppercase company short code. Numeric columns
//! are cast explicitly since the source tables were loaded from spreadsheets
//! and store a mix of integer and real values.

use serde::Serialize;
use shared::{CompanyProfile, FinancialFlow, Lookup, SankeyGraph};
use sqlx::SqlitePool;

use crate::error::AppResult;

/// Production data starts at the beginning of the current reporting year
const PRODUCTION_FROM: &str = "2025-01-01";
/// Earnings history starts one year earlier
const EARNINGS_FROM: &str = "2024-01-01";
/// Plantation areas are reported once a year
const PLANTATION_AREA_YEAR: &str = "2024";
/// Only the most recent flow edges feed the Sankey diagram
const SANKEY_EDGE_LIMIT: i64 = 100;

/// Company data service
#[derive(Clone)]
pub struct CompanyService {
    db: SqlitePool,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct CompanyRow {
    company_long_name: String,
    company_stock_code: String,
    company_board: Option<String>,
    company_description: Option<String>,
    company_website: Option<String>,
}

impl From<CompanyRow> for CompanyProfile {
    fn from(row: CompanyRow) -> Self {
        Self {
            company_long_name: row.company_long_name,
            company_stock_code: row.company_stock_code,
            company_board: row.company_board,
            company_description: row.company_description,
            company_website: row.company_website,
        }
    }
}

/// Monthly production volume by raw material
#[derive(Debug, Clone, Serialize, sqlx::FromRow, PartialEq)]
pub struct ProductionRecord {
    pub date: String,
    pub raw_material: Option<String>,
    pub volume: Option<f64>,
}

/// A categorised value per reporting date, used for extraction rates and
/// plantation areas
#[derive(Debug, Clone, Serialize, sqlx::FromRow, PartialEq)]
pub struct CategoryValue {
    pub date: String,
    pub company_short_name: String,
    pub value: Option<f64>,
    pub category: Option<String>,
}

/// Quarterly earnings
#[derive(Debug, Clone, Serialize, sqlx::FromRow, PartialEq)]
pub struct EarningsRecord {
    pub company_short_name: String,
    pub date: String,
    pub revenue: Option<f64>,
    pub net_profit: Option<f64>,
    pub net_profit_margin: Option<f64>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct FlowRow {
    date: String,
    source: String,
    target: String,
    value: Option<f64>,
}

impl CompanyService {
    /// Create a new CompanyService instance
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Company profile from the master table
    pub async fn get_profile(&self, code: &str) -> AppResult<Lookup<CompanyProfile>> {
        let row = sqlx::query_as::<_, CompanyRow>(
            r#"
            SELECT company_long_name,
                   CAST(company_stock_code AS TEXT) AS company_stock_code, company_board,
                   company_description, company_website
            FROM company_master_table
            WHERE company_short_name = ?
            "#,
        )
        .bind(code.to_uppercase())
        .fetch_optional(&self.db)
        .await?;

        Ok(match row {
            Some(row) => Lookup::Found(row.into()),
            None => Lookup::missing("Company not found"),
        })
    }

    /// Listed stock code, if the company is known
    pub async fn get_stock_code(&self, code: &str) -> AppResult<Option<String>> {
        let stock_code = sqlx::query_scalar::<_, String>(
            "SELECT CAST(company_stock_code AS TEXT) FROM company_master_table WHERE company_short_name = ?",
        )
        .bind(code.to_uppercase())
        .fetch_optional(&self.db)
        .await?;

        Ok(stock_code)
    }

    /// Monthly production from the start of the reporting year, oldest first
    pub async fn get_production(&self, code: &str) -> AppResult<Vec<ProductionRecord>> {
        let rows = sqlx::query_as::<_, ProductionRecord>(
            r#"
            SELECT CAST(date AS TEXT) AS date, raw_material,
                   CAST(volume AS REAL) AS volume
            FROM company_monthly_production
            WHERE company_short_name = ? AND date >= ?
            ORDER BY date ASC
            "#,
        )
        .bind(code.to_uppercase())
        .bind(PRODUCTION_FROM)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    /// Extraction rates, oldest first
    pub async fn get_extraction_rates(&self, code: &str) -> AppResult<Vec<CategoryValue>> {
        let rows = sqlx::query_as::<_, CategoryValue>(
            r#"
            SELECT CAST(date AS TEXT) AS date, company_short_name,
                   CAST(value AS REAL) AS value, category
            FROM company_extraction_rate
            WHERE company_short_name = ?
            ORDER BY date ASC
            "#,
        )
        .bind(code.to_uppercase())
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    /// Plantation area breakdown for the reporting year
    pub async fn get_plantation_area(&self, code: &str) -> AppResult<Vec<CategoryValue>> {
        let rows = sqlx::query_as::<_, CategoryValue>(
            r#"
            SELECT CAST(date AS TEXT) AS date, company_short_name,
                   CAST(value AS REAL) AS value, category
            FROM company_plantation_area
            WHERE company_short_name = ? AND CAST(date AS TEXT) = ?
            "#,
        )
        .bind(code.to_uppercase())
        .bind(PLANTATION_AREA_YEAR)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    /// Earnings since the start of the previous year, oldest first
    pub async fn get_earnings(&self, code: &str) -> AppResult<Vec<EarningsRecord>> {
        let rows = sqlx::query_as::<_, EarningsRecord>(
            r#"
            SELECT company_short_name, CAST(date AS TEXT) AS date,
                   CAST(revenue AS REAL) AS revenue,
                   CAST(net_profit AS REAL) AS net_profit,
                   CAST(net_profit_margin AS REAL) AS net_profit_margin
            FROM company_earnings_data
            WHERE company_short_name = ? AND date >= ?
            ORDER BY date ASC
            "#,
        )
        .bind(code.to_uppercase())
        .bind(EARNINGS_FROM)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    /// Revenue/cost flow graph from the most recent edges
    pub async fn get_sankey(&self, code: &str) -> AppResult<SankeyGraph> {
        let rows = sqlx::query_as::<_, FlowRow>(
            r#"
            SELECT CAST(date AS TEXT) AS date, source, target,
                   CAST(value AS REAL) AS value
            FROM company_financials_data
            WHERE company_short_name = ?
            ORDER BY date DESC
            LIMIT ?
            "#,
        )
        .bind(code.to_uppercase())
        .bind(SANKEY_EDGE_LIMIT)
        .fetch_all(&self.db)
        .await?;

        let flows: Vec<FinancialFlow> = rows
            .into_iter()
            .map(|row| FinancialFlow {
                date: row.date,
                source: row.source,
                target: row.target,
                value: row.value.unwrap_or(0.0),
            })
            .collect();

        Ok(SankeyGraph::from_flows(&flows))
    }
}
