pub mod cache_store;
pub mod convert;
pub mod exchange_rate_api;
pub mod gateway;
pub mod metal_history;
pub mod reconcile;
pub mod refresher;

pub use cache_store::{CacheStore, SharedCacheStore};
pub use convert::{derive_retail, MarginSchedule, RetailPrice};
pub use exchange_rate_api::RateClient;
pub use gateway::{LiveGateway, UpstreamGateway};
pub use metal_history::HistoryClient;
pub use reconcile::reconcile;
pub use refresher::{
    HealthStats, MetalReport, PriceBoard, Refresher, SharedHealthStats, SharedRefresher,
    SourceState, SourceStatus,
};
