pub mod hot_reload;
pub mod loader;

pub use hot_reload::RuleWatcher;
pub use loader::{parse_source, RuleError, RuleRepository};
