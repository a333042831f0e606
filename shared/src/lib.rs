//! Shared types and logic for the Palm Oil Intelligence platform
//!
//! This crate holds the domain models returned by the API together with the
//! pure transformations behind them: nearest-station resolution, wind and
//! forecast risk classification, and news text normalization.

pub mod geodesy;
pub mod models;
pub mod risk;
pub mod text;
pub mod types;

pub use geodesy::*;
pub use models::*;
pub use risk::*;
pub use text::*;
pub use types::*;
