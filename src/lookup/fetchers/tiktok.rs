use crate::lookup::fetchers::{first_success, select_text, ProfileFetcher, Strategy};
use crate::lookup::normalize::NO_BIO;
use crate::lookup::types::{FetchError, Platform, ProfileSummary};
use crate::scrape::{page_url, Http, UpstreamRequest, API_TIMEOUT, USER_AGENT_DEFAULT};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde::Deserialize;
use serde_json::Value;

const BASE_URL: &str = "https://www.tiktok.com/";
const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8";

static REHYDRATION_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("script#__UNIVERSAL_DATA_FOR_REHYDRATION__")
        .expect("Failed to compile rehydration selector")
});

static SIGI_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("script#SIGI_STATE").expect("Failed to compile SIGI selector"));

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TikTokUser {
    unique_id: String,
    nickname: Option<String>,
    avatar_larger: Option<String>,
    signature: Option<String>,
    #[serde(default)]
    verified: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TikTokStats {
    #[serde(default)]
    follower_count: u64,
    #[serde(default)]
    following_count: u64,
    #[serde(default)]
    heart_count: u64,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    user: TikTokUser,
    #[serde(default)]
    stats: TikTokStats,
}

impl UserInfo {
    fn into_summary(self) -> Result<ProfileSummary, FetchError> {
        let UserInfo { user, stats } = self;
        let url = page_url(BASE_URL, &[&format!("@{}", user.unique_id)])?;

        Ok(ProfileSummary::new(user.unique_id, url)
            .nickname(user.nickname)
            .bio(user.signature, NO_BIO)
            .profile_pic(user.avatar_larger)
            .verified(user.verified)
            .stat("followers", stats.follower_count)
            .stat("following", stats.following_count)
            .stat("likes", stats.heart_count))
    }
}

pub struct TikTokFetcher;

impl ProfileFetcher for TikTokFetcher {
    fn platform(&self) -> Platform {
        Platform::TikTok
    }

    fn fetch(&self, http: &Http, username: &str) -> Result<ProfileSummary, FetchError> {
        let url = page_url(BASE_URL, &[&format!("@{username}")])?;
        let html = http.text(
            UpstreamRequest::get(url)
                .header("User-Agent", USER_AGENT_DEFAULT)
                .header("Accept", ACCEPT)
                .header("Referer", BASE_URL)
                .timeout(API_TIMEOUT),
        )?;

        // both blobs live in the same page, newer layout first
        first_success(
            Platform::TikTok,
            html.as_str(),
            username,
            &[
                Strategy {
                    name: "rehydration",
                    run: from_rehydration,
                },
                Strategy {
                    name: "sigi-state",
                    run: from_sigi_state,
                },
            ],
        )
    }
}

fn script_json(html: &str, selector: &Selector) -> Result<Value, FetchError> {
    let document = Html::parse_document(html);
    let script = select_text(&document, selector).ok_or(FetchError::NotFound)?;
    Ok(serde_json::from_str(&script)?)
}

fn from_rehydration(html: &str, _username: &str) -> Result<ProfileSummary, FetchError> {
    let data = script_json(html, &REHYDRATION_SELECTOR)?;
    let detail = &data["__DEFAULT_SCOPE__"]["webapp.user-detail"];

    if detail["statusCode"].as_i64() != Some(0) || detail["userInfo"].is_null() {
        return Err(FetchError::NotFound);
    }

    let info: UserInfo = serde_json::from_value(detail["userInfo"].clone())?;
    info.into_summary()
}

fn from_sigi_state(html: &str, username: &str) -> Result<ProfileSummary, FetchError> {
    let data = script_json(html, &SIGI_SELECTOR)?;
    let module = &data["UserModule"];

    let user = &module["users"][username];
    if user.is_null() {
        return Err(FetchError::NotFound);
    }

    let info = UserInfo {
        user: serde_json::from_value(user.clone())?,
        stats: match &module["stats"][username] {
            Value::Null => TikTokStats::default(),
            stats => serde_json::from_value(stats.clone())?,
        },
    };
    info.into_summary()
}
