//! Data source access and the cached tender table.

pub mod loader;
pub mod table_cache;

pub use loader::PgTenderSource;
pub use table_cache::TableCache;
