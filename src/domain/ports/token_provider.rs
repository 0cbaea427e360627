use async_trait::async_trait;

use crate::domain::errors::CherryPickerResult;
use crate::domain::models::AccessToken;

/// Source of fresh bearer tokens.
///
/// Implementations perform exactly one credential exchange per call and
/// never cache; caching is the job of
/// [`TokenCache`](crate::services::TokenCache).
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Exchange credentials for a new token.
    ///
    /// Fails with [`CherryPickerError::Auth`](crate::domain::CherryPickerError::Auth)
    /// when the exchange is rejected or the payload lacks `access_token` /
    /// `expires_in`.
    async fn fetch_token(&self) -> CherryPickerResult<AccessToken>;
}
