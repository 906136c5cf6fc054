//! Article ingestion: RSS/Atom feeds and paginated HTML listings, with
//! optional full-text extraction from each article page.

pub mod extract;
pub mod manager;
pub mod sources;

pub use extract::extract_full_text;
pub use manager::{IngestManager, IngestOptions};
pub use sources::{default_sources, ArticleSource, ListingSelectors, ListingSource, RssSource, SourceKind, SourceMetadata};

pub mod prelude {
    pub use super::sources::ArticleSource;
    pub use super::{IngestManager, IngestOptions};
    pub use nd_core::{ArticleRecord, Error, Result};
}
