use crate::lookup::fetchers::ProfileFetcher;
use crate::lookup::normalize::NOT_AVAILABLE;
use crate::lookup::types::{FetchError, Platform, ProfileSummary};
use crate::scrape::{
    page_url, Http, UpstreamRequest, ACCEPT_LANGUAGE, PAGE_TIMEOUT, USER_AGENT_DEFAULT,
};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde_json::Value;

const BASE_URL: &str = "https://youtube.com/";
const INITIAL_DATA_MARKER: &str = "var ytInitialData =";
const CHANNEL_BIO: &str = "YouTube Channel";

static SCRIPT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("script").expect("Failed to compile script selector"));

pub struct YouTubeFetcher;

impl ProfileFetcher for YouTubeFetcher {
    fn platform(&self) -> Platform {
        Platform::YouTube
    }

    fn fetch(&self, http: &Http, username: &str) -> Result<ProfileSummary, FetchError> {
        let html = http.text(
            UpstreamRequest::get(channel_url(username)?)
                .header("User-Agent", USER_AGENT_DEFAULT)
                .header("Accept-Language", ACCEPT_LANGUAGE)
                .timeout(PAGE_TIMEOUT),
        )?;

        parse_channel_page(&html, username)
    }
}

fn channel_url(username: &str) -> Result<String, FetchError> {
    page_url(BASE_URL, &[&format!("@{username}")])
}

/// Decode the first JSON value following `var ytInitialData =`.
fn initial_data(html: &str) -> Result<Value, FetchError> {
    let document = Html::parse_document(html);
    let script = document
        .select(&SCRIPT_SELECTOR)
        .map(|el| el.text().collect::<String>())
        .find(|text| text.contains(INITIAL_DATA_MARKER))
        .ok_or_else(|| FetchError::ParseFailure("ytInitialData script missing".into()))?;

    let start = script.find(INITIAL_DATA_MARKER).unwrap_or_default() + INITIAL_DATA_MARKER.len();

    // the blob is followed by `;` and more script, so read exactly one value
    serde_json::Deserializer::from_str(&script[start..])
        .into_iter::<Value>()
        .next()
        .ok_or_else(|| FetchError::ParseFailure("ytInitialData is empty".into()))?
        .map_err(Into::into)
}

pub(crate) fn parse_channel_page(html: &str, username: &str) -> Result<ProfileSummary, FetchError> {
    let data = initial_data(html)?;

    let header = &data["header"]["pageHeaderRenderer"]["content"]["pageHeaderViewModel"];
    if header.is_null() {
        return Err(FetchError::NotFound);
    }

    let mut subscribers = "0".to_string();
    let mut videos = "0".to_string();

    let rows = header["metadata"]["contentMetadataViewModel"]["metadataRows"].as_array();
    for row in rows.into_iter().flatten() {
        let parts = row["metadataParts"].as_array();
        for content in parts
            .into_iter()
            .flatten()
            .filter_map(|part| part["text"]["content"].as_str())
        {
            if content.contains("subscribers") {
                subscribers = content.to_string();
            }
            if content.contains("videos") {
                videos = content.to_string();
            }
        }
    }

    let title = header["title"]["content"].as_str().map(str::to_string);
    let avatar = header["image"]["decoratedAvatarViewModel"]["avatar"]["avatarViewModel"]["image"]
        ["sources"][0]["url"]
        .as_str()
        .map(str::to_string);

    Ok(ProfileSummary::new(username, channel_url(username)?)
        .nickname(title)
        .bio(None, CHANNEL_BIO)
        .profile_pic(avatar)
        .verified(true)
        .stat("subscribers", subscribers)
        .stat("videos", videos)
        .stat("views", NOT_AVAILABLE))
}
