use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("~/.local/share"))
        .join("memento")
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct AppConfig {
    pub data_directory: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_directory: default_data_dir(),
        }
    }
}

impl AppConfig {
    /// The single keyed store holding the whole application envelope.
    pub fn state_path(&self) -> PathBuf {
        self.data_directory.join("state.json")
    }

    /// Ensure the data directory exists.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.data_directory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_path_lives_under_data_dir() {
        let config = AppConfig {
            data_directory: PathBuf::from("/tmp/memento-test"),
        };
        assert_eq!(
            config.state_path(),
            PathBuf::from("/tmp/memento-test/state.json")
        );
    }
}
