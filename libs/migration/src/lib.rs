pub mod batch;
pub mod config;
pub mod source;
pub mod sweep;

pub use batch::{BatchWriter, WriteStats};
pub use config::SourceConfig;
pub use source::MySqlExtractor;
pub use sweep::{MigrationStats, Migrator};
