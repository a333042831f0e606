//! HTTP handlers

pub mod company;
pub mod health;
pub mod market;
pub mod mspo;
pub mod news;

pub use company::*;
pub use health::*;
pub use market::*;
pub use mspo::*;
pub use news::*;
