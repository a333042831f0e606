//! Company master data, market and financial flow models

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

/// Company profile from the master table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompanyProfile {
    pub company_long_name: String,
    pub company_stock_code: String,
    pub company_board: Option<String>,
    pub company_description: Option<String>,
    pub company_website: Option<String>,
}

/// Daily closing prices, parallel arrays as consumed by the charting frontend
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SharePriceSeries {
    pub dates: Vec<String>,
    pub prices: Vec<f64>,
}

/// One edge of a company's revenue/cost flow
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FinancialFlow {
    pub date: String,
    pub source: String,
    pub target: String,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SankeyNode {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SankeyLink {
    pub source: usize,
    pub target: usize,
    pub value: f64,
}

/// Node/link graph for a Sankey diagram
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SankeyGraph {
    pub nodes: Vec<SankeyNode>,
    pub links: Vec<SankeyLink>,
}

impl SankeyGraph {
    /// Build the graph from flow edges.
    ///
    /// Node names are deduplicated and sorted so indices are stable across
    /// calls; links keep the order of the input edges.
    pub fn from_flows(flows: &[FinancialFlow]) -> Self {
        let names: BTreeSet<&str> = flows
            .iter()
            .flat_map(|f| [f.source.as_str(), f.target.as_str()])
            .collect();

        let index: HashMap<&str, usize> = names
            .iter()
            .enumerate()
            .map(|(i, name)| (*name, i))
            .collect();

        let links = flows
            .iter()
            .map(|f| SankeyLink {
                source: index[f.source.as_str()],
                target: index[f.target.as_str()],
                value: f.value,
            })
            .collect();

        SankeyGraph {
            nodes: names
                .into_iter()
                .map(|name| SankeyNode {
                    name: name.to_string(),
                })
                .collect(),
            links,
        }
    }
}
