use std::path::PathBuf;
use std::str::FromStr;
use tracing::warn;

/// Config file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "sbmig.config.json";

/// Returns the config file path, `SBMIG_CONFIG` or `./sbmig.config.json`.
pub fn config_file() -> PathBuf {
    std::env::var("SBMIG_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(CONFIG_FILE_NAME))
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "Ignoring unparsable environment variable");
            None
        }
    }
}

/// Page size for listing calls from `SBMIG_PER_PAGE`.
pub fn env_per_page() -> Option<usize> {
    env_parse("SBMIG_PER_PAGE")
}

/// Maximum in-flight remote mutations from `SBMIG_CONCURRENCY`.
pub fn env_concurrency() -> Option<usize> {
    env_parse("SBMIG_CONCURRENCY")
}

/// Request timeout in seconds from `SBMIG_TIMEOUT_SECS`.
pub fn env_timeout_secs() -> Option<u64> {
    env_parse("SBMIG_TIMEOUT_SECS")
}

/// Directory for backups and discovery output from `SBMIG_WORKING_DIR`.
pub fn env_working_dir() -> Option<PathBuf> {
    std::env::var("SBMIG_WORKING_DIR").ok().map(PathBuf::from)
}
