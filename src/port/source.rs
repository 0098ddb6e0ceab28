//! Rate source port.

use async_trait::async_trait;

use crate::domain::Rate;
use crate::error::FetchError;

/// Fetches raw rate records from an upstream API.
///
/// One call produces the records for one snapshot. Implementations must
/// bound the request with an explicit timeout so a hung upstream cannot
/// stall a polling tick indefinitely, and must classify an upstream
/// rate-limit response as [`FetchError::RateLimited`] so the caller can
/// apply its retry policy.
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<Rate>, FetchError>;
}
