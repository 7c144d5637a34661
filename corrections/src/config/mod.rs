pub mod loader;
pub mod types;

pub use loader::{
    candidate_paths, discover_config_path, system_config_dirs, ConfigLoader, DefaultConfigLoader,
    APPLICATION_NAME, ENV_PREFIX,
};
pub use types::{ApplicationConfig, HttpConfig, NextlinuxConfig};
