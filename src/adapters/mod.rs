// Adapters layer: concrete implementations of the domain ports.

pub mod http;
pub mod sqlite;
pub mod summary;

pub use http::{HttpCatalogFetcher, HttpRateFetcher};
pub use sqlite::SqliteCountryStore;
pub use summary::PngSummaryGenerator;
