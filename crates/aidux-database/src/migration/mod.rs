pub mod runner;
pub mod types;

pub use runner::{MigrationResult, MigrationRunner};
pub use types::{AppliedMigration, Migration, MigrationError};
