//! SQLite storage plumbing shared by the audit trail and signature stores.

pub mod error;
pub mod migration;
pub mod pool;
pub mod schema;

pub use error::storage_error;
pub use migration::{Migration, MigrationError, MigrationResult, MigrationRunner};
pub use pool::{DatabasePool, PoolConfig, PoolConfigBuilder, PoolError};
pub use schema::{integrity_migrations, migrate};
