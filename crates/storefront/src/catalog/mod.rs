//! Catalog browsing: filter, sort, paginate, and per-session UI state.

pub mod filter;
pub mod page;
pub mod pipeline;
pub mod prefs;
pub mod sort;

pub use filter::{PriceRange, ProductFilter};
pub use page::Paginator;
pub use pipeline::{CatalogKind, CatalogQuery, CatalogService, CatalogView};
pub use prefs::{CatalogPrefs, CatalogPrefsStore, ViewMode};
pub use sort::SortKey;
