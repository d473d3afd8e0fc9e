use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::api::ApiError;

/// A playlist the backend generated and saved to the user's Spotify account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedPlaylist {
    pub id: i64,
    pub playlist_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub generated_at: String,
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
}

impl GeneratedPlaylist {
    pub fn spotify_url(&self) -> String {
        format!("https://open.spotify.com/playlist/{}", self.playlist_id)
    }

    /// Short description of what the playlist was generated from
    pub fn source_display(&self) -> String {
        match (self.mood.as_deref(), self.prompt.as_deref()) {
            (Some(mood), Some(prompt)) if !prompt.is_empty() => format!("{} - \"{}\"", mood, prompt),
            (Some(mood), _) => mood.to_string(),
            (None, Some(prompt)) if !prompt.is_empty() => format!("\"{}\"", prompt),
            _ => "-".to_string(),
        }
    }
}

/// Preset moods offered when generating a playlist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mood {
    Happy,
    Energetic,
    Chill,
    Focused,
    Melancholic,
    Romantic,
    Party,
    Workout,
    Study,
    Relaxing,
}

impl Mood {
    pub const ALL: [Mood; 10] = [
        Mood::Happy,
        Mood::Energetic,
        Mood::Chill,
        Mood::Focused,
        Mood::Melancholic,
        Mood::Romantic,
        Mood::Party,
        Mood::Workout,
        Mood::Study,
        Mood::Relaxing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Happy => "Happy",
            Mood::Energetic => "Energetic",
            Mood::Chill => "Chill",
            Mood::Focused => "Focused",
            Mood::Melancholic => "Melancholic",
            Mood::Romantic => "Romantic",
            Mood::Party => "Party",
            Mood::Workout => "Workout",
            Mood::Study => "Study",
            Mood::Relaxing => "Relaxing",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mood {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Mood::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ApiError::InvalidRequest(format!("unknown mood: {}", s)))
    }
}

impl Serialize for Mood {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// What to base a generated playlist on: a preset mood, a free-text prompt, or both
#[derive(Debug, Clone, Default)]
pub struct PlaylistRequest {
    pub mood: Option<Mood>,
    pub prompt: Option<String>,
}

/// Body of `POST /generate-playlist/`
#[derive(Debug, Serialize)]
pub(crate) struct GeneratePlaylistBody<'a> {
    pub user_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mood: Option<Mood>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<&'a str>,
}

impl PlaylistRequest {
    pub fn new(mood: Option<Mood>, prompt: Option<String>) -> Self {
        Self { mood, prompt }
    }

    fn trimmed_prompt(&self) -> Option<&str> {
        self.prompt.as_deref().map(str::trim).filter(|p| !p.is_empty())
    }

    /// A request needs a mood or a non-blank prompt
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.mood.is_none() && self.trimmed_prompt().is_none() {
            return Err(ApiError::InvalidRequest(
                "Please select a mood or enter a custom prompt.".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn body(&self, user_id: i64) -> Result<GeneratePlaylistBody<'_>, ApiError> {
        self.validate()?;
        Ok(GeneratePlaylistBody {
            user_id,
            mood: self.mood,
            prompt: self.trimmed_prompt(),
        })
    }
}
