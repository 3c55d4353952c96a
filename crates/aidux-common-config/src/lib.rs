//! Configuration for the AiDuxCare integrity subsystem.
//!
//! Settings live in `.aidux/config.yaml`; every section is optional and
//! falls back to defaults. Selected values can be overridden from the
//! environment (see [`env::vars`]).

pub mod env;
pub mod loader;
pub mod types;

pub use env::*;
pub use loader::*;
pub use types::*;
