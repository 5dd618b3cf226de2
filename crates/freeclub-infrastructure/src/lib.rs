pub mod config_service;
pub mod file_store;
pub mod logging;
pub mod paths;

pub use crate::config_service::ConfigService;
pub use crate::file_store::FileKeyValueStore;
pub use crate::logging::init_tracing;
pub use crate::paths::ClubPaths;
