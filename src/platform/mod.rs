// Driftwood platform paths
// Resolves per-user config and data directories through `directories`, with an
// optional profile directory that relocates both (used by `--profile`).

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

const QUALIFIER: &str = "io";
const ORGANIZATION: &str = "driftwood";
const APPLICATION: &str = "Driftwood";

/// Where settings and history live for this process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfilePaths {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
}

impl ProfilePaths {
    /// Platform default locations, e.g. on Linux:
    ///
    /// - config: `$XDG_CONFIG_HOME/driftwood` (`~/.config/driftwood`)
    /// - data:   `$XDG_DATA_HOME/driftwood` (`~/.local/share/driftwood`)
    ///
    /// Falls back to a directory under the system temp dir when no home
    /// directory can be determined.
    pub fn platform_default() -> Self {
        match ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION) {
            Some(dirs) => Self {
                config_dir: dirs.config_dir().to_path_buf(),
                data_dir: dirs.data_dir().to_path_buf(),
            },
            None => Self::in_profile(&std::env::temp_dir().join("driftwood")),
        }
    }

    /// Both directories under one profile root.
    pub fn in_profile(root: &Path) -> Self {
        Self {
            config_dir: root.join("config"),
            data_dir: root.join("data"),
        }
    }

    pub fn history_db(&self) -> PathBuf {
        self.data_dir.join("history.db")
    }

    /// Creates both directories if missing.
    pub fn ensure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.data_dir)
    }
}
