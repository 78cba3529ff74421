mod load;
mod types;

pub use load::{apply_env_overrides, expand, load_config, resolve_root, CONFIG_FILE};
pub use types::*;
