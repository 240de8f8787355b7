use crate::lookup::fetchers::ProfileFetcher;
use crate::lookup::types::{FetchError, Platform, ProfileSummary};
use crate::scrape::{page_url, Http, UpstreamRequest, API_TIMEOUT};
use serde::Deserialize;

const USERS_API: &str = "https://api.github.com/users";
const NO_BIO: &str = "No bio";

/// Subset of the `/users/{username}` response.
#[derive(Debug, Deserialize)]
struct GitHubUser {
    login: String,
    name: Option<String>,
    bio: Option<String>,
    avatar_url: Option<String>,
    html_url: String,
    #[serde(default)]
    followers: u64,
    #[serde(default)]
    following: u64,
    #[serde(default)]
    public_repos: u64,
}

pub struct GitHubFetcher;

impl ProfileFetcher for GitHubFetcher {
    fn platform(&self) -> Platform {
        Platform::GitHub
    }

    fn fetch(&self, http: &Http, username: &str) -> Result<ProfileSummary, FetchError> {
        let user: GitHubUser = http.json(
            UpstreamRequest::get(page_url(USERS_API, &[username])?)
                .header("Accept", "application/vnd.github+json")
                .timeout(API_TIMEOUT),
        )?;

        Ok(ProfileSummary::new(user.login, user.html_url)
            .nickname(user.name)
            .bio(user.bio, NO_BIO)
            .profile_pic(user.avatar_url)
            .stat("followers", user.followers)
            .stat("following", user.following)
            .stat("repos", user.public_repos))
    }
}
