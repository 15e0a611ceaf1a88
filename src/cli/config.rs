use std::fs;
use std::path::PathBuf;

use crate::session::FileStorage;

const SESSION_FILE: &str = "session.json";

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("TASKDESK_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("taskdesk")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

/// Durable session storage for the CLI, `<config dir>/session.json`
pub fn session_storage() -> anyhow::Result<FileStorage> {
    let path = get_config_dir()?.join(SESSION_FILE);
    tracing::debug!("Using session file {}", path.display());
    Ok(FileStorage::new(path))
}
