//! Upstream SEO data provider adapters.
//!
//! Each adapter implements the `SeoProvider` port from `ranklens-core`,
//! owning its wire format end to end: request envelopes, response parsing,
//! and the reduction into domain records.

pub mod dataforseo;

pub use dataforseo::{DataForSeo, DataForSeoConfig};
