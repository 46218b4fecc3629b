//! SampleFetcher trait - sample stream transport
//!
//! `load` never fails because of a fetch error; the session degrades to an
//! overlay-less playback instead.

use crate::ContractError;

/// Fetches the raw tabular sample text for a source reference
#[trait_variant::make(SampleFetcher: Send)]
pub trait LocalSampleFetcher {
    /// Fetch the complete text
    ///
    /// # Errors
    /// Returns `ContractError::Fetch` (or `Io`) when the source cannot be read
    async fn fetch(&self, source: &str) -> Result<String, ContractError>;
}
