//! Image-search port.

use crate::domain::ImageRef;

use super::ProviderError;

/// Finds one representative image for a search phrase.
pub trait ImageSearch: Send + Sync {
    /// # Errors
    /// Returns error on provider failure or when nothing matches.
    fn search(&self, phrase: &str) -> Result<ImageRef, ProviderError>;
}
