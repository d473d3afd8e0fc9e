use serde::{Deserialize, Serialize};

/// An AI-derived "music personality" analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    pub id: i64,
    pub personality_type: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub music_analytics: MusicAnalytics,
    #[serde(default)]
    pub insights: Vec<String>,
    #[serde(default)]
    pub recommendations: Recommendations,
    pub generated_at: String,
}

// The backend stores analytics as free-form JSON, so everything below is lenient.

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MusicAnalytics {
    #[serde(default)]
    pub top_genres: Vec<String>,
    #[serde(default)]
    pub mood_distribution: Option<MoodDistribution>,
    #[serde(default)]
    pub audio_features: Option<AudioFeatures>,
}

/// Percentage share of each mood across the listening history
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MoodDistribution {
    #[serde(default)]
    pub happy: f64,
    #[serde(default)]
    pub melancholic: f64,
    #[serde(default)]
    pub energetic: f64,
    #[serde(default)]
    pub calm: f64,
    #[serde(default)]
    pub angsty: f64,
}

impl MoodDistribution {
    pub fn entries(&self) -> [(&'static str, f64); 5] {
        [
            ("Happy", self.happy),
            ("Melancholic", self.melancholic),
            ("Energetic", self.energetic),
            ("Calm", self.calm),
            ("Angsty", self.angsty),
        ]
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AudioFeatures {
    #[serde(default)]
    pub energy_level: Option<String>,
    #[serde(default)]
    pub danceability: Option<f64>,
    #[serde(default)]
    pub acousticness: Option<f64>,
    #[serde(default)]
    pub instrumentalness: Option<f64>,
    #[serde(default)]
    pub complexity: Option<f64>,
}

impl AudioFeatures {
    /// Numeric features with their display labels, skipping missing ones
    pub fn scores(&self) -> Vec<(&'static str, f64)> {
        [
            ("Danceability", self.danceability),
            ("Acousticness", self.acousticness),
            ("Instrumentalness", self.instrumentalness),
            ("Complexity", self.complexity),
        ]
        .into_iter()
        .filter_map(|(label, value)| value.map(|v| (label, v)))
        .collect()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Recommendations {
    #[serde(default)]
    pub similar_artists: Vec<String>,
    #[serde(default)]
    pub growth_opportunities: Vec<String>,
}

impl Analysis {
    /// The mood with the largest share, if the analysis has a distribution
    pub fn dominant_mood(&self) -> Option<(&'static str, f64)> {
        let distribution = self.music_analytics.mood_distribution.as_ref()?;
        distribution
            .entries()
            .into_iter()
            .filter(|(_, share)| *share > 0.0)
            .max_by(|a, b| a.1.total_cmp(&b.1))
    }
}
