use crate::lookup::fetchers::{select_attr, ProfileFetcher};
use crate::lookup::normalize::{group_thousands, json_count_text, NOT_AVAILABLE, NO_BIO};
use crate::lookup::types::{FetchError, Platform, ProfileSummary};
use crate::scrape::{
    page_url, Http, UpstreamRequest, ACCEPT_HTML, ACCEPT_LANGUAGE, PAGE_TIMEOUT,
    USER_AGENT_DEFAULT,
};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;

const BASE_URL: &str = "https://www.pinterest.com/";
const PROFILE_URL: &str = "https://pinterest.com/";

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("Failed to compile Pinterest selector")
}

static OG_TITLE: Lazy<Selector> = Lazy::new(|| selector(r#"meta[property="og:title"]"#));
static OG_DESCRIPTION: Lazy<Selector> =
    Lazy::new(|| selector(r#"meta[property="og:description"]"#));
static OG_IMAGE: Lazy<Selector> = Lazy::new(|| selector(r#"meta[property="og:image"]"#));
static JSON_SCRIPT: Lazy<Selector> = Lazy::new(|| selector(r#"script[type="application/json"]"#));

fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("Failed to compile Pinterest regex")
}

// the page embeds a JSON document as an escaped string, hence the `\"`
static FOLLOWERS_RE: Lazy<Regex> = Lazy::new(|| regex(r#"\\"follower_count\\":(\d+)"#));
static FOLLOWING_RE: Lazy<Regex> = Lazy::new(|| regex(r#"\\"following_count\\":(\d+)"#));
static PINS_RE: Lazy<Regex> = Lazy::new(|| regex(r#"\\"pin_count\\":(\d+)"#));
static FULL_NAME_RE: Lazy<Regex> = Lazy::new(|| regex(r#"\\"full_name\\":\\"(.*?)\\""#));
static ABOUT_RE: Lazy<Regex> = Lazy::new(|| regex(r#"\\"about\\":\\"(.*?)\\""#));
static IMAGE_RE: Lazy<Regex> = Lazy::new(|| regex(r#"\\"image_xlarge_url\\":\\"(.*?)\\""#));

/// Profile fields as they stand after each extraction layer.
#[derive(Debug)]
struct Draft {
    name: String,
    bio: String,
    followers: String,
    following: String,
    pins: String,
    found: bool,
}

impl Draft {
    fn new(username: &str) -> Self {
        Self {
            name: username.to_string(),
            bio: NO_BIO.to_string(),
            followers: NOT_AVAILABLE.to_string(),
            following: NOT_AVAILABLE.to_string(),
            pins: NOT_AVAILABLE.to_string(),
            found: false,
        }
    }

    /// Layer 1: JSON blobs in `application/json` scripts. Last blob wins.
    fn apply_json_scripts(&mut self, document: &Html, username: &str) {
        for script in document.select(&JSON_SCRIPT) {
            let text: String = script.text().collect();
            let Ok(json) = serde_json::from_str::<Value>(&text) else {
                continue;
            };

            let Some(user) = [
                &json["props"]["pageProps"]["data"]["user"],
                &json["data"]["user"],
                &json["resourceDataCache"][0]["data"],
            ]
            .into_iter()
            .find(|candidate| is_truthy(candidate)) else {
                continue;
            };

            let text_field = |key: &str| {
                user[key]
                    .as_str()
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
            };

            self.name = text_field("full_name")
                .or_else(|| text_field("username"))
                .unwrap_or_else(|| username.to_string());
            self.bio = text_field("about")
                .or_else(|| text_field("bio"))
                .unwrap_or_else(|| NO_BIO.to_string());
            let count = |key: &str| {
                json_count_text(&user[key]).unwrap_or_else(|| NOT_AVAILABLE.to_string())
            };
            self.followers = count("follower_count");
            self.following = count("following_count");
            self.pins = count("pin_count");
            self.found = true;
        }
    }

    /// Layer 2: og tags fill what the scripts left at their defaults.
    fn apply_og_tags(
        &mut self,
        og_title: Option<String>,
        og_description: Option<String>,
        username: &str,
    ) {
        if let Some(title) = og_title {
            self.found = true;
            if self.name == username {
                let cleaned = title.replacen('(', "", 1).replacen(')', "", 1);
                self.name = cleaned.split('|').next().unwrap_or_default().trim().to_string();
            }
        }
        if let Some(description) = og_description {
            self.found = true;
            if self.bio == NO_BIO {
                self.bio = description;
            }
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::Array(_) | Value::Object(_) => true,
    }
}

pub struct PinterestFetcher;

impl ProfileFetcher for PinterestFetcher {
    fn platform(&self) -> Platform {
        Platform::Pinterest
    }

    fn fetch(&self, http: &Http, username: &str) -> Result<ProfileSummary, FetchError> {
        let html = http.text(
            UpstreamRequest::get(page_url(BASE_URL, &[username, ""])?)
                .header("User-Agent", USER_AGENT_DEFAULT)
                .header("Accept", ACCEPT_HTML)
                .header("Accept-Language", ACCEPT_LANGUAGE)
                .timeout(PAGE_TIMEOUT),
        )?;

        parse_profile_page(&html, username)
    }
}

/// Pinterest renders one page; fields are resolved from the richest layer
/// that has them: escaped inline JSON, then script blobs, then og tags.
pub(crate) fn parse_profile_page(html: &str, username: &str) -> Result<ProfileSummary, FetchError> {
    let document = Html::parse_document(html);
    let og_image = select_attr(&document, &OG_IMAGE, "content");

    let mut draft = Draft::new(username);
    draft.apply_json_scripts(&document, username);
    draft.apply_og_tags(
        select_attr(&document, &OG_TITLE, "content"),
        select_attr(&document, &OG_DESCRIPTION, "content"),
        username,
    );

    // Layer 3: escaped inline JSON overrides everything above
    let capture = |re: &Regex| re.captures(html).map(|caps| caps[1].to_string());
    let count = |re: &Regex| {
        capture(re)
            .and_then(|raw| raw.parse::<u64>().ok())
            .map(group_thousands)
    };

    let followers = count(&FOLLOWERS_RE);
    let following = count(&FOLLOWING_RE);
    let pins = count(&PINS_RE);
    let name = capture(&FULL_NAME_RE);
    let about = capture(&ABOUT_RE);
    let image = capture(&IMAGE_RE).map(|url| url.replace("\\/", "/"));

    let inline_found = [&followers, &following, &pins, &name, &about, &image]
        .iter()
        .any(|field| field.is_some());
    if !draft.found && !inline_found && og_image.is_none() {
        return Err(FetchError::NotFound);
    }

    Ok(
        ProfileSummary::new(username, page_url(PROFILE_URL, &[username])?)
            .nickname(name.or(Some(draft.name)))
            .bio(about.or(Some(draft.bio)), NO_BIO)
            .profile_pic(image.or(og_image))
            .stat("followers", followers.unwrap_or(draft.followers))
            .stat("following", following.unwrap_or(draft.following))
            .stat("pins", pins.unwrap_or(draft.pins)),
    )
}
