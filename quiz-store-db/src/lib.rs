//! SQLite persistence for quizzes.
//!
//! Provides schema creation and upgrades, the one-time seed from a localized
//! quiz document, and typed record access objects, backed by SQLite (via
//! rusqlite with bundled feature).

pub mod config;
pub mod dao;
pub mod schema;
pub mod seed;
pub mod store;
mod tx;

pub use config::{ConfigError, StoreConfig, load_config, load_or_default, save_config};
pub use dao::{AccessError, AccessObjects, Dao, Record};
pub use schema::{
    CURRENT_VERSION, Migration, SchemaError, create_schema, open_memory, upgrade_schema,
};
pub use seed::{SeedError, SeedStats, seed};
pub use store::{QuizDatabase, StoreError, initialize};
