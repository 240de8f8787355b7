use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Failure of a single fetcher or strategy, before it is collapsed into the
/// platform's boundary message.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Upstream says the profile does not exist, or the page had no profile in it
    #[error("profile not found")]
    NotFound,

    /// Network failure, timeout or an unexpected non-2xx status
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Upstream answered but the body did not have the expected shape
    #[error("failed to parse upstream response: {0}")]
    ParseFailure(String),

    #[error("rate limited by upstream")]
    RateLimited,
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::ParseFailure(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    TikTok,
    GitHub,
    Instagram,
    Pinterest,
    Twitter,
    YouTube,
    Roblox,
}

impl Platform {
    pub const ALL: [Platform; 7] = [
        Platform::TikTok,
        Platform::GitHub,
        Platform::Instagram,
        Platform::Pinterest,
        Platform::Twitter,
        Platform::YouTube,
        Platform::Roblox,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::TikTok => "tiktok",
            Platform::GitHub => "github",
            Platform::Instagram => "instagram",
            Platform::Pinterest => "pinterest",
            Platform::Twitter => "twitter",
            Platform::YouTube => "youtube",
            Platform::Roblox => "roblox",
        }
    }

    /// Human readable platform name
    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::TikTok => "TikTok",
            Platform::GitHub => "GitHub",
            Platform::Instagram => "Instagram",
            Platform::Pinterest => "Pinterest",
            Platform::Twitter => "Twitter/X",
            Platform::YouTube => "YouTube",
            Platform::Roblox => "Roblox",
        }
    }

    /// The only error message callers ever see for a failed fetch.
    pub fn not_found_message(&self) -> &'static str {
        match self {
            Platform::TikTok => "TikTok User not found",
            Platform::GitHub => "GitHub user not found",
            Platform::Instagram => "Instagram Profile not found or private",
            Platform::Pinterest => "Pinterest User not found",
            Platform::Twitter => "Twitter/X user not found",
            Platform::YouTube => "YouTube Channel not found",
            Platform::Roblox => "Roblox User not found",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Platform not supported: {0}")]
pub struct UnknownPlatform(pub String);

impl FromStr for Platform {
    type Err = UnknownPlatform;

    /// Exact match, ignoring case only.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::ALL
            .into_iter()
            .find(|platform| platform.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownPlatform(s.to_string()))
    }
}

/// A single counter. Some platforms give reliable integers, others only
/// pre-formatted text such as `"1.2M subscribers"` or `"N/A"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatValue {
    Count(u64),
    Text(String),
}

impl From<u64> for StatValue {
    fn from(value: u64) -> Self {
        StatValue::Count(value)
    }
}

impl From<String> for StatValue {
    fn from(value: String) -> Self {
        StatValue::Text(value)
    }
}

impl From<&str> for StatValue {
    fn from(value: &str) -> Self {
        StatValue::Text(value.to_string())
    }
}

pub type Stats = BTreeMap<String, StatValue>;

/// The common record every fetcher produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub username: String,
    pub nickname: String,
    pub bio: String,
    pub profile_pic: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
    pub url: String,
    pub stats: Stats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,

    /// Stats that were reported as 0 because their sub-request failed
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unknown_stats: Vec<String>,
}

impl ProfileSummary {
    /// Bare record with every optional field at its default.
    pub fn new(username: impl Into<String>, url: impl Into<String>) -> Self {
        let username = username.into();
        Self {
            id: None,
            nickname: username.clone(),
            username,
            bio: super::normalize::NO_BIO.to_string(),
            profile_pic: None,
            is_verified: false,
            url: url.into(),
            stats: Stats::new(),
            created: None,
            unknown_stats: Vec::new(),
        }
    }

    /// Set the display name, keeping the username when `nickname` is blank.
    pub fn nickname(mut self, nickname: Option<String>) -> Self {
        if let Some(nickname) = super::normalize::non_empty(nickname) {
            self.nickname = nickname;
        }
        self
    }

    /// Set the bio, falling back to `default` when blank.
    pub fn bio(mut self, bio: Option<String>, default: &str) -> Self {
        self.bio = super::normalize::non_empty(bio).unwrap_or_else(|| default.to_string());
        self
    }

    pub fn profile_pic(mut self, url: Option<String>) -> Self {
        self.profile_pic = super::normalize::non_empty(url);
        self
    }

    pub fn verified(mut self, verified: bool) -> Self {
        self.is_verified = verified;
        self
    }

    pub fn stat(mut self, name: &str, value: impl Into<StatValue>) -> Self {
        self.stats.insert(name.to_string(), value.into());
        self
    }
}
