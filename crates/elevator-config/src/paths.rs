//! Where configuration files live.
//!
//! Three files feed the loader, lowest precedence first:
//!
//! | Layer   | Location                                  |
//! |---------|-------------------------------------------|
//! | user    | `$XDG_CONFIG_HOME/elevator/config.toml`   |
//! | project | `<project>/elevator.toml`                 |
//! | local   | `<project>/elevator.local.toml`           |

use crate::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

const PROJECT_FILE: &str = "elevator.toml";
const LOCAL_FILE: &str = "elevator.local.toml";
const USER_FILE: &str = "config.toml";

/// Resolves the per-user and per-project configuration locations.
pub struct Paths {
    project_dirs: Option<ProjectDirs>,
}

impl Paths {
    pub fn new() -> Self {
        Self {
            project_dirs: ProjectDirs::from("dev", "Elevator", "elevator"),
        }
    }

    /// Directory holding the per-user file. Fails when the platform has no
    /// notion of a home directory.
    pub fn user_config_dir(&self) -> Result<PathBuf, ConfigError> {
        self.project_dirs
            .as_ref()
            .map(|dirs| dirs.config_dir().to_path_buf())
            .ok_or_else(|| ConfigError::Xdg("platform reported no home directory".to_string()))
    }

    pub fn user_config_file(&self) -> Result<PathBuf, ConfigError> {
        Ok(self.user_config_dir()?.join(USER_FILE))
    }

    /// Shared settings, meant to be committed alongside the project.
    pub fn project_config_file(project_dir: impl AsRef<Path>) -> PathBuf {
        project_dir.as_ref().join(PROJECT_FILE)
    }

    /// Machine-specific overrides layered on top of the project file.
    pub fn local_config_file(project_dir: impl AsRef<Path>) -> PathBuf {
        project_dir.as_ref().join(LOCAL_FILE)
    }
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn user_file_sits_in_the_elevator_directory() {
        let paths = Paths::new();

        // Sandboxed runners may have no resolvable home.
        if let (Ok(dir), Ok(file)) = (paths.user_config_dir(), paths.user_config_file()) {
            assert_eq!(file, dir.join("config.toml"));
            assert!(dir.to_string_lossy().contains("elevator"));
        }
    }

    #[test]
    fn project_and_local_files_share_a_directory() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let root = temp_dir.path();

        let project = Paths::project_config_file(root);
        let local = Paths::local_config_file(root);

        assert_eq!(project.parent(), Some(root));
        assert_eq!(local.parent(), Some(root));
        assert_eq!(project.file_name().unwrap(), "elevator.toml");
        assert_eq!(local.file_name().unwrap(), "elevator.local.toml");
    }
}
