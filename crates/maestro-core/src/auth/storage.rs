use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::SessionData;

/// Well-known storage key for the persisted session
pub const SESSION_KEY: &str = "maestro_user";

/// Durable local storage for the session: a single JSON file named after
/// [`SESSION_KEY`] inside the data directory.
#[derive(Debug, Clone)]
pub struct SessionStorage {
    dir: PathBuf,
}

impl SessionStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", SESSION_KEY))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn exists(&self) -> bool {
        self.path().exists()
    }

    /// Load the persisted session, if any
    pub fn load(&self) -> Result<Option<SessionData>> {
        let path = self.path();
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path).context("Failed to read session file")?;
        let data: SessionData =
            serde_json::from_str(&contents).context("Failed to parse session file")?;
        Ok(Some(data))
    }

    /// Persist the session, replacing any previous entry
    pub fn save(&self, data: &SessionData) -> Result<()> {
        std::fs::create_dir_all(&self.dir).context("Failed to create session directory")?;
        let contents = serde_json::to_string_pretty(data)?;

        // Write-then-rename so a crash never leaves a half-written session behind
        let tmp = self.dir.join(format!("{}.json.tmp", SESSION_KEY));
        std::fs::write(&tmp, contents).context("Failed to write session file")?;
        std::fs::rename(&tmp, self.path()).context("Failed to replace session file")?;
        Ok(())
    }

    /// Remove the persisted session. Clearing an absent entry is fine.
    pub fn clear(&self) -> Result<()> {
        let path = self.path();
        if path.exists() {
            std::fs::remove_file(path).context("Failed to remove session file")?;
        }
        Ok(())
    }
}
