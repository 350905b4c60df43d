//! Model catalog: retrieval and normalization.
//!
//! The catalog comes from <https://models.dev>, which publishes per-model
//! metadata (capabilities, pricing, context limits, modalities) grouped by
//! provider. Normalization flattens every entry into a [`NormalizedModel`]
//! keyed by `provider/model`, tolerating both the nested and the older flat
//! document shapes and both generations of pricing/limit objects.
//!
//! # Usage
//!
//! ```rust,ignore
//! use aidex::catalog::{self, Catalog};
//!
//! let catalog = Catalog::from_json(json)?;
//! if let Some(model) = catalog.get("anthropic/claude-opus-4-5") {
//!     println!("Context length: {:?}", model.max_input_tokens);
//! }
//! ```

mod fetch;
mod model;
mod registry;
mod types;

pub use fetch::{build_http_client, fetch_catalog, try_fetch_catalog};
pub use model::{DEFAULT_MODE, NormalizedModel, TOKENS_PER_MILLION};
pub use registry::Catalog;
pub use types::{
    CatalogDocument, CatalogProvider, RawCatalogEntry, RawCost, RawLimit, RawModalities,
};

/// Catalog retrieval and decoding errors.
///
/// These never reach the user; the caller degrades to an empty catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP error: {0}")]
    Status(u16),

    #[error("invalid catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("catalog payload is a JSON {0}, expected an object")]
    Shape(&'static str),
}
