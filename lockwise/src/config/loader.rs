use std::fs;
use std::path::Path;

use super::models::Config;

/// Name of the configuration file searched for in ancestor directories.
pub(crate) const CONFIG_FILENAME: &str = ".lockwise.toml";

pub(super) fn load_from_path(path: &Path) -> Config {
    let mut current = path.to_path_buf();
    if current.is_file() {
        current.pop();
    }

    loop {
        let lockwise_toml = current.join(CONFIG_FILENAME);
        if lockwise_toml.exists() {
            if let Ok(content) = fs::read_to_string(&lockwise_toml) {
                if let Ok(mut config) = toml::from_str::<Config>(&content) {
                    config.config_file_path = Some(lockwise_toml);
                    return config;
                }
            }
        }

        if !current.pop() {
            break;
        }
    }

    Config::default()
}
