pub mod configuration;
pub mod utils;

// Re-export commonly used types
pub use configuration::{
    ConfigError, Configuration, Environment, Platform, UpdateTrigger, DEFAULT_BASE_URL,
};
pub use utils::{all_dir, get_data_path, DataDir};
