use crate::core::cancellation::CancellationToken;
use crate::domain::model::{Address, PostalCode};
use crate::utils::error::LookupError;
use async_trait::async_trait;

/// Resolves a postal code against some external address source.
///
/// `Ok(None)` means the source has no address for the code. Implementations
/// must return [`LookupError::Cancelled`] when `cancel` fires mid-call.
#[async_trait]
pub trait AddressLookup: Send + Sync {
    async fn resolve(
        &self,
        code: &PostalCode,
        cancel: &CancellationToken,
    ) -> Result<Option<Address>, LookupError>;
}
