use serde::{Deserialize, Serialize};

use super::{Analysis, GeneratedPlaylist};

/// Everything the dashboard shows, fetched in one go
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dashboard {
    pub analyses: Vec<Analysis>,
    pub playlists: Vec<GeneratedPlaylist>,
}

impl Dashboard {
    /// The backend lists analyses newest first
    pub fn latest_analysis(&self) -> Option<&Analysis> {
        self.analyses.first()
    }

    pub fn recent_playlists(&self, n: usize) -> &[GeneratedPlaylist] {
        &self.playlists[..n.min(self.playlists.len())]
    }
}
