pub mod fetchers;
pub mod normalize;
pub mod types;

pub use fetchers::FetcherRegistry;
pub use types::{FetchError, Platform, ProfileSummary, StatValue};

use crate::scrape::Http;

#[derive(thiserror::Error, Debug)]
pub enum LookupError {
    #[error("Username is required")]
    MissingUsername,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Platform not supported: {0}")]
    UnsupportedPlatform(String),

    /// The cause is kept for logs; callers only get the platform's message.
    #[error("{}", .platform.not_found_message())]
    Fetch {
        platform: Platform,
        #[source]
        source: FetchError,
    },
}

#[derive(Debug, Clone)]
pub struct Lookup {
    pub platform: Platform,
    pub profile: ProfileSummary,
}

/// Trim, drop a leading `@`, trim again. None when nothing is left.
pub fn clean_username(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let cleaned = trimmed.strip_prefix('@').unwrap_or(trimmed).trim();
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}

/// Picks a fetcher by platform name and runs it.
pub struct Dispatcher {
    registry: FetcherRegistry,
    http: Http,
    default_platform: Platform,
}

impl Dispatcher {
    pub fn new(http: Http, default_platform: Platform) -> Self {
        Self {
            registry: FetcherRegistry::new(),
            http,
            default_platform,
        }
    }

    /// Validate the raw inputs and fetch the profile.
    ///
    /// Username and platform are both checked before any outbound request.
    pub fn lookup(
        &self,
        username: Option<&str>,
        platform: Option<&str>,
    ) -> Result<Lookup, LookupError> {
        let username = username
            .and_then(clean_username)
            .ok_or(LookupError::MissingUsername)?;

        let platform = match platform {
            None => self.default_platform,
            Some(name) => name
                .parse::<Platform>()
                .map_err(|err| LookupError::UnsupportedPlatform(err.0))?,
        };

        let fetcher = self
            .registry
            .get(platform)
            .ok_or_else(|| LookupError::UnsupportedPlatform(platform.to_string()))?;

        log::debug!("fetcher={platform} username={username:?}");

        match fetcher.fetch(&self.http, &username) {
            Ok(profile) => {
                log::info!("fetcher={platform} outcome=success username={username:?}");
                Ok(Lookup { platform, profile })
            }
            Err(source) => {
                log::warn!("fetcher={platform} outcome=error username={username:?} err={source}");
                Err(LookupError::Fetch { platform, source })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_username() {
        assert_eq!(clean_username("torvalds"), Some("torvalds".into()));
        assert_eq!(clean_username("  @jack "), Some("jack".into()));
        assert_eq!(clean_username("@ jack"), Some("jack".into()));
        assert_eq!(clean_username("@"), None);
        assert_eq!(clean_username("   "), None);
        assert_eq!(clean_username(""), None);
    }

    #[test]
    fn test_fetch_error_message_hides_cause() {
        let err = LookupError::Fetch {
            platform: Platform::Roblox,
            source: FetchError::UpstreamUnavailable("connection reset".into()),
        };
        assert_eq!(err.to_string(), "Roblox User not found");
    }
}
