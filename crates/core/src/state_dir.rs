//! Platform-specific state directory management

use directories::ProjectDirs;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::CoreResult;

/// Manages platform-specific application directories
#[derive(Debug, Clone)]
pub struct StateDir {
    /// Project directories from the directories crate
    project_dirs: Option<ProjectDirs>,
    /// Override directory for testing or custom installations
    override_dir: Option<PathBuf>,
}

impl StateDir {
    /// Create a new StateDir instance
    pub fn new() -> Self {
        let project_dirs = ProjectDirs::from("africa", "Digs", "digs");
        if project_dirs.is_none() {
            warn!("Failed to determine platform-specific directories, will use fallback");
        }
        Self {
            project_dirs,
            override_dir: None,
        }
    }

    /// Create a new StateDir with an override directory
    pub fn with_override(path: impl Into<PathBuf>) -> Self {
        Self {
            project_dirs: None,
            override_dir: Some(path.into()),
        }
    }

    /// Get the configuration directory
    pub fn config_dir(&self) -> PathBuf {
        if let Some(override_dir) = &self.override_dir {
            return override_dir.join("config");
        }

        self.project_dirs.as_ref().map_or_else(
            || PathBuf::from("./config"),
            |dirs| dirs.config_dir().to_path_buf(),
        )
    }

    /// Get the data directory for persistent storage
    pub fn data_dir(&self) -> PathBuf {
        if let Some(override_dir) = &self.override_dir {
            return override_dir.join("data");
        }

        self.project_dirs.as_ref().map_or_else(
            || PathBuf::from("./data"),
            |dirs| dirs.data_dir().to_path_buf(),
        )
    }

    /// Default config file path
    pub fn config_path(&self) -> PathBuf {
        self.config_dir().join("digs.toml")
    }

    /// Where the signed-in session is persisted
    pub fn session_path(&self) -> PathBuf {
        self.data_dir().join("session.json")
    }

    /// Log file for a component
    pub fn log_path(&self, component: &str) -> PathBuf {
        self.data_dir().join(format!("{component}.log"))
    }

    /// Create all required directories
    pub async fn create_directories(&self) -> CoreResult<()> {
        for dir in [self.config_dir(), self.data_dir()] {
            tokio::fs::create_dir_all(&dir).await?;
            debug!("Ensured directory exists: {}", dir.display());
        }
        Ok(())
    }
}

impl Default for StateDir {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_override_layout() {
        let state = StateDir::with_override("/tmp/digs-test");
        assert_eq!(state.config_dir(), PathBuf::from("/tmp/digs-test/config"));
        assert_eq!(
            state.session_path(),
            PathBuf::from("/tmp/digs-test/data/session.json")
        );
        assert_eq!(
            state.config_path(),
            PathBuf::from("/tmp/digs-test/config/digs.toml")
        );
        assert_eq!(
            state.log_path("cli"),
            PathBuf::from("/tmp/digs-test/data/cli.log")
        );
    }

    #[tokio::test]
    async fn test_create_directories() {
        let temp = TempDir::new().unwrap();
        let state = StateDir::with_override(temp.path());

        state.create_directories().await.unwrap();

        assert!(state.config_dir().is_dir());
        assert!(state.data_dir().is_dir());
    }
}
