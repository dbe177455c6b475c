use crate::error::Result;
use async_trait::async_trait;
use wgwatch_core::Listing;

/// Somewhere listings can be acquired from.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Run one search and return the listings it produced.
    async fn fetch(&self, query: &str) -> Result<Vec<Listing>>;
}
