use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Spotify profile fields the backend merges into the user's display state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default, deserialize_with = "follower_count")]
    pub followers: Option<u64>,
    #[serde(default)]
    pub images: Vec<ProfileImage>,
    /// Anything else the backend sends along
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileImage {
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

impl UserProfile {
    pub fn display_name_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.display_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(fallback)
    }

    /// Largest avatar image, if any
    pub fn avatar_url(&self) -> Option<&str> {
        self.images
            .iter()
            .max_by_key(|i| i.width.unwrap_or(0))
            .map(|i| i.url.as_str())
    }
}

/// Spotify reports followers as `{"total": n}`; the backend may flatten it to a number.
fn follower_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Followers {
        Count(u64),
        Object { total: Option<u64> },
    }

    Ok(match Option::<Followers>::deserialize(deserializer)? {
        Some(Followers::Count(n)) => Some(n),
        Some(Followers::Object { total }) => total,
        None => None,
    })
}
