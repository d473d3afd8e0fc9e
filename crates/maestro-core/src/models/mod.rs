//! Data models for backend responses.
//!
//! - `Analysis`: Music personality analysis with analytics and recommendations
//! - `GeneratedPlaylist`, `PlaylistRequest`, `Mood`: Playlist generation
//! - `UserProfile`: Spotify profile details
//! - `Dashboard`: Combined analyses and playlists for the overview

pub mod analysis;
pub mod dashboard;
pub mod playlist;
pub mod profile;

pub use analysis::{Analysis, AudioFeatures, MoodDistribution, MusicAnalytics, Recommendations};
pub use dashboard::Dashboard;
pub use playlist::{GeneratedPlaylist, Mood, PlaylistRequest};
pub use profile::{ProfileImage, UserProfile};
