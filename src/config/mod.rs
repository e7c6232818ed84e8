//! Configuration module for dealtrack
//!
//! - `paths`: where settings, data and the change log live
//! - `settings`: user preferences persisted as JSON

pub mod paths;
pub mod settings;

pub use paths::DealPaths;
pub use settings::Settings;
