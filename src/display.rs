use crate::lookup::{Platform, ProfileSummary, StatValue};
use serde::Serialize;
use std::fmt::Write;

/// How a profile card for one platform is laid out.
#[derive(Debug, Clone, Serialize)]
pub struct DisplayConfig {
    pub platform: Platform,
    pub name: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
    /// `(label, stats key)` in card order
    pub stats: [(&'static str, &'static str); 3],
}

impl DisplayConfig {
    pub fn for_platform(platform: Platform) -> Self {
        let (icon, color, stats) = match platform {
            Platform::TikTok => (
                "fa-brands fa-tiktok",
                "#fff",
                [("Followers", "followers"), ("Following", "following"), ("Likes", "likes")],
            ),
            Platform::Instagram => (
                "fa-brands fa-instagram",
                "#e1306c",
                [("Followers", "followers"), ("Following", "following"), ("Posts", "posts")],
            ),
            Platform::GitHub => (
                "fa-brands fa-github",
                "#aaa",
                [("Followers", "followers"), ("Following", "following"), ("Repos", "repos")],
            ),
            Platform::Twitter => (
                "fa-brands fa-twitter",
                "#1da1f2",
                [("Followers", "followers"), ("Following", "following"), ("Tweets", "tweets")],
            ),
            Platform::YouTube => (
                "fa-brands fa-youtube",
                "#ff0000",
                [("Subscribers", "subscribers"), ("Videos", "videos"), ("Views", "views")],
            ),
            Platform::Pinterest => (
                "fa-brands fa-pinterest",
                "#e60023",
                [("Followers", "followers"), ("Following", "following"), ("Pins", "pins")],
            ),
            Platform::Roblox => (
                "fa-solid fa-gamepad",
                "#ff4444",
                [("Friends", "friends"), ("Followers", "followers"), ("Following", "following")],
            ),
        };

        Self {
            platform,
            name: platform.display_name(),
            icon,
            color,
            stats,
        }
    }

    pub fn all() -> Vec<Self> {
        Platform::ALL.into_iter().map(Self::for_platform).collect()
    }
}

/// Abbreviate a counter for display: `1234567` -> `1.2M`, `1500` -> `1.5K`.
/// Pre-formatted text is shown unchanged.
pub fn format_stat(value: Option<&StatValue>) -> String {
    match value {
        None | Some(StatValue::Count(0)) => "0".to_string(),
        Some(StatValue::Text(text)) if text.is_empty() => "0".to_string(),
        Some(StatValue::Text(text)) => text.clone(),
        Some(StatValue::Count(n)) if *n >= 1_000_000 => format!("{:.1}M", *n as f64 / 1_000_000.0),
        Some(StatValue::Count(n)) if *n >= 1_000 => format!("{:.1}K", *n as f64 / 1_000.0),
        Some(StatValue::Count(n)) => n.to_string(),
    }
}

/// Plain-text profile card.
pub fn render_card(platform: Platform, profile: &ProfileSummary) -> String {
    let config = DisplayConfig::for_platform(platform);
    let mut out = String::new();

    let verified = if profile.is_verified { " ✓" } else { "" };
    let _ = writeln!(out, "[{}]", config.name.to_uppercase());
    let _ = writeln!(out, "{}{verified} (@{})", profile.nickname, profile.username);
    let _ = writeln!(out, "{}", profile.bio);
    let _ = writeln!(out, "{}", profile.url);
    if let Some(ref pic) = profile.profile_pic {
        let _ = writeln!(out, "{pic}");
    }

    for (label, key) in config.stats {
        let _ = writeln!(out, "  {label:<12} {}", format_stat(profile.stats.get(key)));
    }

    out
}
