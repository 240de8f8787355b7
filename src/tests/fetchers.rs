use std::sync::Arc;

use super::fixtures::{self, USER};
use super::support::{http, MockTransport};
use crate::lookup::fetchers::{
    github::GitHubFetcher, instagram::InstagramFetcher, pinterest::PinterestFetcher, roblox,
    roblox::RobloxFetcher, tiktok::TikTokFetcher, twitter::TwitterFetcher,
    youtube::YouTubeFetcher, ProfileFetcher,
};
use crate::lookup::{FetchError, StatValue};

fn text(value: &str) -> StatValue {
    StatValue::from(value)
}

#[test]
pub fn test_tiktok_rehydration() {
    let mock = Arc::new(
        MockTransport::new().ok(fixtures::TIKTOK_URL, fixtures::tiktok_rehydration_page()),
    );

    let profile = TikTokFetcher.fetch(&http(&mock), USER).unwrap();
    assert_eq!(profile.username, "alice");
    assert_eq!(profile.nickname, "Alice");
    assert_eq!(profile.bio, "hi there");
    assert!(profile.is_verified);
    assert_eq!(profile.url, "https://www.tiktok.com/@alice");
    assert_eq!(profile.stats["followers"], StatValue::Count(1500));
    assert_eq!(profile.stats["likes"], StatValue::Count(99000));
}

#[test]
pub fn test_tiktok_sigi_state_matches_rehydration() {
    let rehydration = Arc::new(
        MockTransport::new().ok(fixtures::TIKTOK_URL, fixtures::tiktok_rehydration_page()),
    );
    let sigi =
        Arc::new(MockTransport::new().ok(fixtures::TIKTOK_URL, fixtures::tiktok_sigi_page()));

    assert_eq!(
        TikTokFetcher.fetch(&http(&sigi), USER).unwrap(),
        TikTokFetcher.fetch(&http(&rehydration), USER).unwrap()
    );
    // one page, two extraction strategies
    assert_eq!(sigi.calls().len(), 1);
}

#[test]
pub fn test_tiktok_unknown_user() {
    let page = r#"<html><body><script id="__UNIVERSAL_DATA_FOR_REHYDRATION__">{"__DEFAULT_SCOPE__":{"webapp.user-detail":{"statusCode":10221}}}</script></body></html>"#;
    let mock = Arc::new(MockTransport::new().ok(fixtures::TIKTOK_URL, page));

    assert_eq!(
        TikTokFetcher.fetch(&http(&mock), USER),
        Err(FetchError::NotFound)
    );
}

#[test]
pub fn test_github_maps_api_fields() {
    let mock = Arc::new(MockTransport::new().ok(fixtures::GITHUB_URL, fixtures::github_body()));

    let profile = GitHubFetcher.fetch(&http(&mock), USER).unwrap();
    assert_eq!(profile.nickname, "Alice Hacker");
    assert_eq!(profile.bio, "writes rust");
    assert_eq!(profile.url, "https://github.com/alice");
    assert!(!profile.is_verified);
    assert_eq!(profile.stats["repos"], StatValue::Count(7));
}

#[test]
pub fn test_github_status_mapping() {
    let mock = Arc::new(
        MockTransport::new()
            .status(fixtures::GITHUB_URL, 404, r#"{"message":"Not Found"}"#)
            .status("https://api.github.com/users/bob", 429, "slow down")
            .status("https://api.github.com/users/carol", 502, "bad gateway")
            .ok("https://api.github.com/users/dave", "<html>"),
    );
    let http = http(&mock);

    assert_eq!(GitHubFetcher.fetch(&http, USER), Err(FetchError::NotFound));
    assert_eq!(GitHubFetcher.fetch(&http, "bob"), Err(FetchError::RateLimited));
    assert!(matches!(
        GitHubFetcher.fetch(&http, "carol"),
        Err(FetchError::UpstreamUnavailable(_))
    ));
    assert!(matches!(
        GitHubFetcher.fetch(&http, "dave"),
        Err(FetchError::ParseFailure(_))
    ));
}

#[test]
pub fn test_instagram_mirror() {
    let mock = Arc::new(MockTransport::new().ok(fixtures::IMGINN_URL, fixtures::IMGINN_PAGE));

    let profile = InstagramFetcher.fetch(&http(&mock), USER).unwrap();
    assert_eq!(profile.username, "alice");
    assert_eq!(profile.nickname, "Alice Liddell");
    assert_eq!(profile.bio, "Down the rabbit hole");
    assert_eq!(profile.profile_pic.as_deref(), Some("https://cdn.imginn.com/alice.jpg"));
    assert_eq!(profile.stats["followers"], text("1.2M"));
    assert_eq!(profile.stats["following"], text("150"));
    assert_eq!(profile.stats["posts"], text("42"));

    // the primary source answered, instagram itself is never asked
    assert_eq!(mock.calls(), vec![fixtures::IMGINN_URL.to_string()]);
}

#[test]
pub fn test_instagram_fallback_fields() {
    let mock = Arc::new(
        MockTransport::new()
            .down(fixtures::IMGINN_URL)
            .ok(fixtures::INSTAGRAM_URL, fixtures::INSTAGRAM_PAGE),
    );

    let profile = InstagramFetcher.fetch(&http(&mock), USER).unwrap();
    assert_eq!(profile.username, "alice");
    assert_eq!(profile.nickname, "Alice L");
    assert_eq!(profile.bio, "line1 line2");
    assert_eq!(
        profile.profile_pic.as_deref(),
        Some("https://scontent.cdninstagram.com/alice.jpg")
    );
    assert!(!profile.is_verified);
    assert_eq!(profile.stats["followers"], text("123,456"));
    assert_eq!(profile.stats["following"], text("78"));
    assert_eq!(profile.stats["posts"], text("9"));
    assert_eq!(profile.url, "https://instagram.com/alice");

    assert_eq!(
        mock.calls(),
        vec![fixtures::IMGINN_URL.to_string(), fixtures::INSTAGRAM_URL.to_string()]
    );
}

#[test]
pub fn test_instagram_both_sources_fail() {
    let mock = Arc::new(
        MockTransport::new()
            .status(fixtures::IMGINN_URL, 404, "")
            .ok(fixtures::INSTAGRAM_URL, "<html><body>Log in</body></html>"),
    );

    assert_eq!(
        InstagramFetcher.fetch(&http(&mock), USER),
        Err(FetchError::NotFound)
    );
}

#[test]
pub fn test_pinterest_script_blob() {
    let mock =
        Arc::new(MockTransport::new().ok(fixtures::PINTEREST_URL, fixtures::pinterest_page()));

    let profile = PinterestFetcher.fetch(&http(&mock), USER).unwrap();
    assert_eq!(profile.nickname, "Alice Pins");
    assert_eq!(profile.bio, "boards and boards");
    assert_eq!(profile.profile_pic.as_deref(), Some("https://i.pinimg.com/alice.jpg"));
    assert_eq!(profile.stats["followers"], text("3,400"));
    assert_eq!(profile.stats["pins"], text("560"));
    assert_eq!(profile.url, "https://pinterest.com/alice");
}

#[test]
pub fn test_pinterest_og_tags_fallback() {
    let page = r#"<html><head>
        <meta property="og:title" content="Alice (alice) | Pinterest">
        <meta property="og:description" content="Alice saves recipes.">
        <meta property="og:image" content="https://i.pinimg.com/og.jpg">
        </head><body></body></html>"#;
    let mock = Arc::new(MockTransport::new().ok(fixtures::PINTEREST_URL, page));

    let profile = PinterestFetcher.fetch(&http(&mock), USER).unwrap();
    assert_eq!(profile.nickname, "Alice alice");
    assert_eq!(profile.bio, "Alice saves recipes.");
    assert_eq!(profile.profile_pic.as_deref(), Some("https://i.pinimg.com/og.jpg"));
    assert_eq!(profile.stats["followers"], text("N/A"));
    assert_eq!(profile.stats["following"], text("N/A"));
    assert_eq!(profile.stats["pins"], text("N/A"));
}

#[test]
pub fn test_twitter_syndication() {
    let mock = Arc::new(
        MockTransport::new().ok(fixtures::SYNDICATION_URL, fixtures::syndication_body()),
    );

    let profile = TwitterFetcher.fetch(&http(&mock), USER).unwrap();
    assert_eq!(profile.nickname, "Alice");
    assert_eq!(profile.bio, "No bio.");
    assert_eq!(
        profile.profile_pic.as_deref(),
        Some("https://pbs.twimg.com/profile_images/1/alice_400x400.jpg")
    );
    assert_eq!(profile.stats["followers"], text("2,500"));
    assert_eq!(profile.stats["following"], text("10"));
    assert_eq!(profile.stats["tweets"], text("N/A"));
    assert_eq!(profile.url, "https://x.com/alice");
}

#[test]
pub fn test_twitter_empty_syndication_falls_back() {
    let mock = Arc::new(
        MockTransport::new()
            .ok(fixtures::SYNDICATION_URL, "[]")
            .ok(fixtures::X_URL, fixtures::X_PAGE),
    );

    let profile = TwitterFetcher.fetch(&http(&mock), USER).unwrap();
    assert_eq!(profile.username, "alice");
    assert_eq!(profile.nickname, "Alice");
    assert_eq!(profile.bio, "No bio.");
    assert_eq!(
        profile.profile_pic.as_deref(),
        Some("https://pbs.twimg.com/profile_images/1/alice_200x200.jpg")
    );
    assert!(!profile.is_verified);
    for key in ["followers", "following", "tweets"] {
        assert_eq!(profile.stats[key], text("N/A"));
    }
}

#[test]
pub fn test_youtube_channel() {
    let mock = Arc::new(MockTransport::new().ok(fixtures::YOUTUBE_URL, fixtures::youtube_page()));

    let profile = YouTubeFetcher.fetch(&http(&mock), USER).unwrap();
    assert_eq!(profile.username, "alice");
    assert_eq!(profile.nickname, "Alice Channel");
    assert_eq!(profile.bio, "YouTube Channel");
    assert!(profile.is_verified);
    assert_eq!(profile.profile_pic.as_deref(), Some("https://yt3.ggpht.com/alice=s72"));
    assert_eq!(profile.stats["subscribers"], text("1.2M subscribers"));
    assert_eq!(profile.stats["videos"], text("340 videos"));
    assert_eq!(profile.stats["views"], text("N/A"));
    assert_eq!(profile.url, "https://youtube.com/@alice");
}

#[test]
pub fn test_roblox_composite() {
    let mock = Arc::new(fixtures::roblox(MockTransport::new()));

    let profile = RobloxFetcher.fetch(&http(&mock), USER).unwrap();
    assert_eq!(profile.id, Some(fixtures::ROBLOX_ID));
    assert_eq!(profile.username, "alice");
    assert_eq!(profile.nickname, "Alice R");
    assert_eq!(profile.bio, "No bio.");
    assert_eq!(profile.created.as_deref(), Some("2015-03-01T00:00:00Z"));
    assert_eq!(profile.profile_pic.as_deref(), Some("https://tr.rbxcdn.com/alice.png"));
    assert_eq!(profile.url, "https://www.roblox.com/users/42/profile");
    assert_eq!(profile.stats["friends"], StatValue::Count(5));
    assert_eq!(profile.stats["followers"], StatValue::Count(600));
    assert_eq!(profile.stats["following"], StatValue::Count(7));
    assert!(profile.unknown_stats.is_empty());

    // id resolution plus five sub-requests
    assert_eq!(mock.calls().len(), 6);
}

#[test]
pub fn test_roblox_failed_count_degrades_to_zero() {
    let mock = Arc::new(
        fixtures::roblox(MockTransport::new())
            .down(&roblox::count_url(fixtures::ROBLOX_ID, "friends"))
            .status(&roblox::headshot_url(fixtures::ROBLOX_ID), 500, ""),
    );

    let profile = RobloxFetcher.fetch(&http(&mock), USER).unwrap();
    assert_eq!(profile.stats["friends"], StatValue::Count(0));
    assert_eq!(profile.stats["followers"], StatValue::Count(600));
    assert_eq!(profile.unknown_stats, vec!["friends".to_string()]);
    assert_eq!(profile.profile_pic, None);
}

#[test]
pub fn test_roblox_unresolved_id_is_fatal() {
    let mock = Arc::new(
        fixtures::roblox(MockTransport::new()).ok(roblox::USERNAMES_URL, r#"{"data": []}"#),
    );

    assert_eq!(
        RobloxFetcher.fetch(&http(&mock), USER),
        Err(FetchError::NotFound)
    );
    // nothing fans out without an id
    assert_eq!(mock.calls(), vec![roblox::USERNAMES_URL.to_string()]);
}
