pub mod github;
pub mod instagram;
pub mod pinterest;
pub mod roblox;
pub mod tiktok;
pub mod twitter;
pub mod youtube;

use crate::lookup::types::{FetchError, Platform, ProfileSummary};
use crate::scrape::Http;

/// One platform's way of turning a username into a [`ProfileSummary`].
pub trait ProfileFetcher: Send + Sync {
    fn platform(&self) -> Platform;

    /// Fetch and normalise a profile. `username` is already cleaned.
    fn fetch(&self, http: &Http, username: &str) -> Result<ProfileSummary, FetchError>;
}

/// A named extraction step in a fallback chain.
pub struct Strategy<T: ?Sized> {
    pub name: &'static str,
    pub run: fn(&T, &str) -> Result<ProfileSummary, FetchError>,
}

/// Run `strategies` in order and return the first success. Results are never
/// merged: a later strategy only runs if every earlier one failed, and the
/// last failure is returned if all of them do.
pub fn first_success<T: ?Sized>(
    platform: Platform,
    input: &T,
    username: &str,
    strategies: &[Strategy<T>],
) -> Result<ProfileSummary, FetchError> {
    let mut last_err = FetchError::NotFound;

    for strategy in strategies {
        let name = strategy.name;
        match (strategy.run)(input, username) {
            Ok(profile) => {
                log::info!("platform={platform} strategy={name} outcome=success");
                return Ok(profile);
            }
            Err(err) => {
                log::warn!("platform={platform} strategy={name} outcome=error err={err}");
                last_err = err;
            }
        }
    }

    Err(last_err)
}

/// Collection of all available fetchers
pub struct FetcherRegistry {
    fetchers: Vec<Box<dyn ProfileFetcher>>,
}

impl FetcherRegistry {
    pub fn new() -> Self {
        let fetchers: Vec<Box<dyn ProfileFetcher>> = vec![
            Box::new(tiktok::TikTokFetcher),
            Box::new(github::GitHubFetcher),
            Box::new(instagram::InstagramFetcher),
            Box::new(pinterest::PinterestFetcher),
            Box::new(twitter::TwitterFetcher),
            Box::new(youtube::YouTubeFetcher),
            Box::new(roblox::RobloxFetcher),
        ];

        debug_assert!(
            Platform::ALL
                .iter()
                .all(|p| fetchers.iter().any(|f| f.platform() == *p)),
            "every platform needs a fetcher"
        );

        Self { fetchers }
    }

    pub fn get(&self, platform: Platform) -> Option<&dyn ProfileFetcher> {
        self.fetchers
            .iter()
            .find(|f| f.platform() == platform)
            .map(|f| f.as_ref())
    }
}

impl Default for FetcherRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Concatenated, trimmed text of the first element matching `selector`.
pub(crate) fn select_text(
    document: &scraper::Html,
    selector: &scraper::Selector,
) -> Option<String> {
    document
        .select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Attribute of the first element matching `selector`.
pub(crate) fn select_attr(
    document: &scraper::Html,
    selector: &scraper::Selector,
    attr: &str,
) -> Option<String> {
    document
        .select(selector)
        .find_map(|el| el.attr(attr))
        .map(str::to_string)
        .filter(|value| !value.is_empty())
}
