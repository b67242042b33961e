//! CLI plumbing for the daemon binary.
//!
//! The socket path is positional because every deployment points it
//! somewhere else; everything slower-moving lives in the YAML file.

use std::path::PathBuf;

/// Environment variable overriding the configuration file location.
pub const CONFIG_ENV: &str = "LS_CONFIG_PATH";

/// Default configuration file, relative to the working directory.
pub const CONFIG_DEFAULT: &str = "config.yaml";

/// Configuration file path: `LS_CONFIG_PATH` when set, the default
/// otherwise.
pub fn config_path() -> PathBuf {
    std::env::var(CONFIG_ENV)
        .unwrap_or_else(|_| CONFIG_DEFAULT.to_string())
        .into()
}

/// Command line arguments, program name excluded.
pub fn parse_args() -> Vec<String> {
    std::env::args().skip(1).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_path_resolution() {
        std::env::remove_var(CONFIG_ENV);
        assert_eq!(config_path(), PathBuf::from("config.yaml"));

        std::env::set_var(CONFIG_ENV, "/etc/bt/ls.yaml");
        assert_eq!(config_path(), PathBuf::from("/etc/bt/ls.yaml"));
        std::env::remove_var(CONFIG_ENV);
    }
}
