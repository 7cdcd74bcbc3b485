mod exchange_rate;
mod metal;
mod price_point;
mod refresh_config;
mod series;

pub use exchange_rate::ExchangeRate;
pub use metal::MetalSymbol;
pub use price_point::{DerivedPricePoint, RawPricePoint};
pub use refresh_config::RefreshConfig;
pub use series::MetalSeries;
