pub mod cache;
pub mod config;
pub mod downloader;
pub mod fetch;
pub mod html;
pub mod metrics;
pub mod resolver;
pub mod testing;
pub mod wikipedia;

pub use cache::{CacheError, CacheRecord, FileCacheStore, MemoryCacheStore, PosterCache};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, FetchConfig,
    ServerConfig, StorageConfig, WikipediaConfig,
};
pub use downloader::{DownloadError, PosterDownloader};
pub use fetch::{FetchError, FetchedPage, FetchedStream, HttpFetcher, ReqwestFetcher};
pub use resolver::{
    NotFoundStage, PosterRequest, PosterResolver, Resolution, ResolutionOrigin, ResolveError,
};
pub use wikipedia::{PosterExtractor, SearchOutcome, WikipediaSearch};
