mod spacex;

pub use spacex::SpacexClient;

use crate::error::FetchError;
use crate::model::LaunchRecord;
use bytes::Bytes;
use std::future::Future;

/// Anything that can serve pages of launches. The orchestrator is generic over this so
/// tests can drive it without a network.
pub trait LaunchSource: Clone + Send + Sync + 'static {
    /// Fetch one page (1-based) of launches whose name matches `search` case-insensitively.
    fn fetch_page(
        &self,
        search: &str,
        page: u32,
    ) -> impl Future<Output = Result<Vec<LaunchRecord>, FetchError>> + Send;

    /// Download a mission patch image.
    fn fetch_patch(&self, url: &str) -> impl Future<Output = Result<Bytes, FetchError>> + Send;
}
