//! Repository implementations for PostgreSQL.

mod keywords;
mod snapshot;
mod website;

pub use keywords::PgKeywordRowStore;
pub use snapshot::PgSnapshotStore;
pub use website::PgWebsiteRepository;
