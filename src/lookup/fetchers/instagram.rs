use crate::lookup::fetchers::{first_success, select_attr, select_text, ProfileFetcher, Strategy};
use crate::lookup::normalize::{count_or_na, parse_leading_int, NOT_AVAILABLE, NO_BIO};
use crate::lookup::types::{FetchError, Platform, ProfileSummary};
use crate::scrape::{
    page_url, Http, UpstreamRequest, ACCEPT_HTML, ACCEPT_LANGUAGE, API_TIMEOUT, PAGE_TIMEOUT,
    USER_AGENT_CRAWLER, USER_AGENT_DEFAULT,
};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

const MIRROR_URL: &str = "https://imginn.com/";
const INSTAGRAM_URL: &str = "https://www.instagram.com/";
const PROFILE_URL: &str = "https://instagram.com/";

/// Order of the counters in the mirror's `div.counts` list
const COUNTERS: [(&str, &str); 3] = [
    ("followers", "followers"),
    ("following", "following"),
    ("posts", "posts"),
];

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("Failed to compile Instagram selector")
}

static NAME: Lazy<Selector> = Lazy::new(|| selector("h1.name"));
static TITLE: Lazy<Selector> = Lazy::new(|| selector("title"));
static USERNAME: Lazy<Selector> = Lazy::new(|| selector("span.username"));
static DESC: Lazy<Selector> = Lazy::new(|| selector("div.desc"));
static AVATAR: Lazy<Selector> = Lazy::new(|| selector("div.profile-pic img"));
static AVATAR_ALT: Lazy<Selector> = Lazy::new(|| selector("img.avatar"));
static COUNTS: Lazy<Selector> = Lazy::new(|| selector("div.counts"));
static COUNTS_ITEM: Lazy<Selector> = Lazy::new(|| selector("div.counts li"));
static LIST_ITEM: Lazy<Selector> = Lazy::new(|| selector("li"));
static SPAN: Lazy<Selector> = Lazy::new(|| selector("span"));

fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("Failed to compile Instagram regex")
}

static FULL_NAME_RE: Lazy<Regex> = Lazy::new(|| regex(r#""full_name":"(.*?)""#));
static BIOGRAPHY_RE: Lazy<Regex> = Lazy::new(|| regex(r#""biography":"(.*?)""#));
static PIC_RE: Lazy<Regex> = Lazy::new(|| regex(r#""profile_pic_url":"(.*?)""#));
static FOLLOWERS_RE: Lazy<Regex> = Lazy::new(|| regex(r#""follower_count":(.*?)[,}]"#));
static FOLLOWING_RE: Lazy<Regex> = Lazy::new(|| regex(r#""following_count":(.*?)[,}]"#));
static MEDIA_RE: Lazy<Regex> = Lazy::new(|| regex(r#""media_count":(.*?)[,}]"#));

pub struct InstagramFetcher;

impl ProfileFetcher for InstagramFetcher {
    fn platform(&self) -> Platform {
        Platform::Instagram
    }

    fn fetch(&self, http: &Http, username: &str) -> Result<ProfileSummary, FetchError> {
        first_success(
            Platform::Instagram,
            http,
            username,
            &[
                Strategy {
                    name: "imginn",
                    run: from_mirror,
                },
                Strategy {
                    name: "meta-scrape",
                    run: from_meta_scrape,
                },
            ],
        )
    }
}

/// Public Instagram mirror, scraped with CSS selectors.
fn from_mirror(http: &Http, username: &str) -> Result<ProfileSummary, FetchError> {
    let html = http.text(
        UpstreamRequest::get(page_url(MIRROR_URL, &[username, ""])?)
            .header("User-Agent", USER_AGENT_DEFAULT)
            .header("Accept", ACCEPT_HTML)
            .header("Accept-Language", ACCEPT_LANGUAGE)
            .timeout(PAGE_TIMEOUT),
    )?;

    parse_mirror_page(&html, username)
}

pub(crate) fn parse_mirror_page(html: &str, username: &str) -> Result<ProfileSummary, FetchError> {
    let document = Html::parse_document(html);

    let has_profile = [&*NAME, &*USERNAME, &*COUNTS]
        .into_iter()
        .any(|sel| document.select(sel).next().is_some());
    if !has_profile {
        return Err(FetchError::ParseFailure("no profile markup on mirror page".into()));
    }

    let name = select_text(&document, &NAME).or_else(|| {
        select_text(&document, &TITLE)
            .and_then(|title| title.split('(').next().map(|s| s.trim().to_string()))
    });

    let handle = select_text(&document, &USERNAME)
        .map(|h| h.replacen('@', "", 1))
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| username.to_string());

    let avatar = select_attr(&document, &AVATAR, "src")
        .or_else(|| select_attr(&document, &AVATAR_ALT, "src"));

    let mut profile = ProfileSummary::new(handle.clone(), page_url(PROFILE_URL, &[&handle])?)
        .nickname(name)
        .bio(select_text(&document, &DESC), NO_BIO)
        .profile_pic(avatar);

    for (idx, (key, label)) in COUNTERS.into_iter().enumerate() {
        let value = labelled_count(&document, label)
            .or_else(|| nth_count(&document, idx))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());
        profile = profile.stat(key, value);
    }

    Ok(profile)
}

/// Span text of every `li` mentioning `label`.
fn labelled_count(document: &Html, label: &str) -> Option<String> {
    let text: String = document
        .select(&LIST_ITEM)
        .filter(|li| li.text().any(|t| t.contains(label)))
        .flat_map(|li| li.select(&SPAN).flat_map(|span| span.text()).collect::<Vec<_>>())
        .collect();
    Some(text.trim().to_string()).filter(|t| !t.is_empty())
}

fn nth_count(document: &Html, idx: usize) -> Option<String> {
    let li = document.select(&COUNTS_ITEM).nth(idx)?;
    let text: String = li.select(&SPAN).flat_map(|span| span.text()).collect();
    Some(text.trim().to_string()).filter(|t| !t.is_empty())
}

/// Instagram itself, asked as a link-preview crawler; fields come from
/// inline JSON fragments in the raw markup.
fn from_meta_scrape(http: &Http, username: &str) -> Result<ProfileSummary, FetchError> {
    let html = http.text(
        UpstreamRequest::get(page_url(INSTAGRAM_URL, &[username, ""])?)
            .header("User-Agent", USER_AGENT_CRAWLER)
            .header("Accept-Language", ACCEPT_LANGUAGE)
            .timeout(API_TIMEOUT),
    )?;

    parse_instagram_page(&html, username)
}

pub(crate) fn parse_instagram_page(
    html: &str,
    username: &str,
) -> Result<ProfileSummary, FetchError> {
    let capture = |re: &Regex| re.captures(html).map(|caps| caps[1].to_string());

    let name = capture(&FULL_NAME_RE);
    let bio = capture(&BIOGRAPHY_RE).map(|bio| bio.replace("\\n", " "));
    let pic = capture(&PIC_RE).map(|pic| pic.replace('\\', ""));
    let followers = capture(&FOLLOWERS_RE);
    let following = capture(&FOLLOWING_RE);
    let posts = capture(&MEDIA_RE);

    if [&name, &bio, &pic, &followers, &following, &posts]
        .iter()
        .all(|field| field.is_none())
    {
        return Err(FetchError::NotFound);
    }

    let count = |raw: Option<String>| count_or_na(raw.as_deref().and_then(parse_leading_int));

    Ok(
        ProfileSummary::new(username, page_url(PROFILE_URL, &[username])?)
            .nickname(name)
            .bio(bio, NO_BIO)
            .profile_pic(pic)
            .stat("followers", count(followers))
            .stat("following", count(following))
            .stat("posts", count(posts)),
    )
}
