//! External API integrations

pub mod forecast;
pub mod news;
pub mod price;

pub use forecast::ForecastClient;
pub use news::NewsClient;
pub use price::PriceClient;
