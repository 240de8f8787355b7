use crate::lookup::fetchers::{first_success, ProfileFetcher, Strategy};
use crate::lookup::normalize::{count_or_na, NOT_AVAILABLE, NO_BIO};
use crate::lookup::types::{FetchError, Platform, ProfileSummary};
use crate::scrape::{
    page_url, Http, UpstreamRequest, API_TIMEOUT, USER_AGENT_CRAWLER, USER_AGENT_SHORT,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

const SYNDICATION_URL: &str = "https://cdn.syndication.twimg.com/widgets/followbutton/info.json";
const EMBED_ORIGIN: &str = "https://platform.twitter.com";
const BASE_URL: &str = "https://x.com/";

static TITLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<title>(.*?)(?:\s*\(|<)").expect("Failed to compile Twitter title regex")
});

static OG_IMAGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<meta property="og:image" content="(.*?)""#)
        .expect("Failed to compile Twitter og:image regex")
});

/// Entry of the follow-button widget response.
#[derive(Debug, Deserialize)]
struct SyndicationUser {
    screen_name: String,
    name: Option<String>,
    description: Option<String>,
    profile_image_url_https: Option<String>,
    #[serde(default)]
    verified: bool,
    followers_count: Option<u64>,
    friends_count: Option<u64>,
}

pub struct TwitterFetcher;

impl ProfileFetcher for TwitterFetcher {
    fn platform(&self) -> Platform {
        Platform::Twitter
    }

    fn fetch(&self, http: &Http, username: &str) -> Result<ProfileSummary, FetchError> {
        first_success(
            Platform::Twitter,
            http,
            username,
            &[
                Strategy {
                    name: "syndication",
                    run: from_syndication,
                },
                Strategy {
                    name: "meta-scrape",
                    run: from_meta_scrape,
                },
            ],
        )
    }
}

fn syndication_url(username: &str) -> Result<String, FetchError> {
    url::Url::parse_with_params(SYNDICATION_URL, &[("screen_names", username)])
        .map(String::from)
        .map_err(|err| FetchError::ParseFailure(err.to_string()))
}

fn from_syndication(http: &Http, username: &str) -> Result<ProfileSummary, FetchError> {
    let users: Vec<SyndicationUser> = http.json(
        UpstreamRequest::get(syndication_url(username)?)
            .header("User-Agent", USER_AGENT_SHORT)
            .header("Accept", "application/json")
            .header("Referer", format!("{EMBED_ORIGIN}/"))
            .header("Origin", EMBED_ORIGIN)
            .timeout(API_TIMEOUT),
    )?;

    let user = users.into_iter().next().ok_or(FetchError::NotFound)?;

    // the widget hands out 48px avatars
    let avatar = user
        .profile_image_url_https
        .map(|url| url.replace("_normal", "_400x400"));

    Ok(
        ProfileSummary::new(&user.screen_name, page_url(BASE_URL, &[&user.screen_name])?)
            .nickname(user.name)
            .bio(user.description, NO_BIO)
            .profile_pic(avatar)
            .verified(user.verified)
            .stat("followers", count_or_na(user.followers_count))
            .stat("following", count_or_na(user.friends_count))
            .stat("tweets", NOT_AVAILABLE),
    )
}

fn from_meta_scrape(http: &Http, username: &str) -> Result<ProfileSummary, FetchError> {
    let html = http.text(
        UpstreamRequest::get(page_url(BASE_URL, &[username])?)
            .header("User-Agent", USER_AGENT_CRAWLER)
            .header("Accept", "text/html")
            .timeout(API_TIMEOUT),
    )?;

    parse_profile_page(&html, username)
}

pub(crate) fn parse_profile_page(html: &str, username: &str) -> Result<ProfileSummary, FetchError> {
    let name = TITLE_RE
        .captures(html)
        .map(|caps| caps[1].trim().to_string());
    let image = OG_IMAGE_RE.captures(html).map(|caps| caps[1].to_string());

    if name.is_none() && image.is_none() {
        return Err(FetchError::NotFound);
    }

    Ok(ProfileSummary::new(username, page_url(BASE_URL, &[username])?)
        .nickname(name)
        .profile_pic(image)
        .stat("followers", NOT_AVAILABLE)
        .stat("following", NOT_AVAILABLE)
        .stat("tweets", NOT_AVAILABLE))
}
