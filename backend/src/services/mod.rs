//! Business logic services for the Palm Oil Intelligence API

pub mod cache;
pub mod company;
pub mod mspo;
pub mod news;
pub mod share_price;
pub mod stations;
pub mod wind;

pub use cache::DataCache;
pub use company::CompanyService;
pub use mspo::MspoService;
pub use news::NewsService;
pub use share_price::SharePriceService;
pub use wind::{RasterError, WindRaster};
