// src/integrations/mod.rs
//
// External Integrations Module
//
// - `fetcher`: rate-limited, retrying request scheduler shared per upstream
// - `jikan`: item metadata
// - `mal`: list sources (global ranking, user lists)
//
// Infrastructure only: clients return raw payloads or normalized entities,
// they never touch the store.

pub mod fetcher;
pub mod http;
pub mod jikan;
pub mod mal;

pub use fetcher::RateLimitedFetcher;
pub use http::{HttpTransport, ReqwestTransport};
pub use jikan::{CatalogSource, JikanClient};
pub use mal::{ListSource, MalClient};
