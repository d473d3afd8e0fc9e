//! Plain-text rendering of backend data for the terminal.

use std::fmt::Write;

use chrono::Local;
use maestro_core::auth::{AuthState, SessionData};
use maestro_core::models::{Analysis, Dashboard, GeneratedPlaylist, UserProfile};
use maestro_core::utils::{bar, format_date, percent, truncate};

/// Width of mood distribution bars
const BAR_WIDTH: usize = 20;

/// Maximum description length in playlist listings
const DESCRIPTION_WIDTH: usize = 60;

// Writing to a String cannot fail, so the fmt::Results below are discarded.

pub fn status(state: AuthState, session: Option<&SessionData>) -> String {
    let mut out = String::new();
    match session {
        Some(s) => {
            let _ = writeln!(out, "Status:      {}", state.label());
            let _ = writeln!(out, "Spotify ID:  {}", s.spotify_id);
            let _ = writeln!(out, "User ID:     {}", s.user_id);
            if s.is_expired() {
                let _ = writeln!(out, "Token:       expired (refreshes on next request)");
            } else {
                let _ = writeln!(
                    out,
                    "Token:       expires in {}m ({})",
                    s.minutes_until_expiry(),
                    s.token_expires.with_timezone(&Local).format("%H:%M")
                );
            }
        }
        None => {
            let _ = writeln!(out, "Not logged in. Run `maestro login` to connect Spotify.");
        }
    }
    out
}

pub fn profile(profile: &UserProfile, spotify_id: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", profile.display_name_or(spotify_id));
    let fields = [
        ("Email", profile.email.clone()),
        ("Country", profile.country.clone()),
        ("Plan", profile.product.clone()),
        ("Followers", profile.followers.map(|f| f.to_string())),
        ("Avatar", profile.avatar_url().map(str::to_string)),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            let _ = writeln!(out, "  {:<10} {}", label, value);
        }
    }
    out
}

pub fn analysis(analysis: &Analysis) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", analysis.personality_type);
    let _ = writeln!(out, "Generated {}", format_date(&analysis.generated_at));
    if let Some(ref description) = analysis.description {
        let _ = writeln!(out, "\n{}", description);
    }

    let analytics = &analysis.music_analytics;
    if let Some(ref moods) = analytics.mood_distribution {
        let _ = writeln!(out, "\nMood distribution");
        for (label, share) in moods.entries() {
            let _ = writeln!(out, "  {:<12} {} {:>3.0}%", label, bar(share, BAR_WIDTH), share);
        }
    }

    if let Some(ref features) = analytics.audio_features {
        let _ = writeln!(out, "\nAudio features");
        if let Some(ref energy) = features.energy_level {
            let _ = writeln!(out, "  {:<17} {}", "Energy level", energy);
        }
        for (label, score) in features.scores() {
            let _ = writeln!(out, "  {:<17} {}", label, percent(score));
        }
    }

    if !analytics.top_genres.is_empty() {
        let _ = writeln!(out, "\nTop genres: {}", analytics.top_genres.join(", "));
    }

    if !analysis.insights.is_empty() {
        let _ = writeln!(out, "\nInsights");
        for insight in &analysis.insights {
            let _ = writeln!(out, "  - {}", insight);
        }
    }

    let recs = &analysis.recommendations;
    if !recs.similar_artists.is_empty() {
        let _ = writeln!(out, "\nSimilar artists: {}", recs.similar_artists.join(", "));
    }
    if !recs.growth_opportunities.is_empty() {
        let _ = writeln!(out, "Try next: {}", recs.growth_opportunities.join(", "));
    }
    out
}

pub fn playlists(playlists: &[GeneratedPlaylist]) -> String {
    let mut out = String::new();
    for playlist in playlists {
        let _ = writeln!(out, "{}  ({})", playlist.name, format_date(&playlist.generated_at));
        if !playlist.description.is_empty() {
            let _ = writeln!(out, "  {}", truncate(&playlist.description, DESCRIPTION_WIDTH));
        }
        let _ = writeln!(out, "  From: {}", playlist.source_display());
        let _ = writeln!(out, "  {}", playlist.spotify_url());
    }
    out
}

pub fn dashboard(dashboard: &Dashboard, max_playlists: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== Your music personality ==");
    match dashboard.latest_analysis() {
        Some(latest) => {
            let _ = writeln!(out, "{}", latest.personality_type);
            if let Some((mood, share)) = latest.dominant_mood() {
                let _ = writeln!(out, "Mostly {} ({:.0}%)", mood.to_lowercase(), share);
            }
            let _ = writeln!(out, "{} analyses so far", dashboard.analyses.len());
        }
        None => {
            let _ = writeln!(out, "No analysis yet. Run `maestro analyze`.");
        }
    }

    let _ = writeln!(out, "\n== Recent playlists ==");
    let recent = dashboard.recent_playlists(max_playlists);
    if recent.is_empty() {
        let _ = writeln!(out, "No playlists yet. Run `maestro generate`.");
    } else {
        out.push_str(&playlists(recent));
    }
    out
}
