use crate::lookup::fetchers::ProfileFetcher;
use crate::lookup::normalize::NO_BIO;
use crate::lookup::types::{FetchError, Platform, ProfileSummary};
use crate::scrape::{Http, UpstreamRequest, API_TIMEOUT};
use serde::Deserialize;
use serde_json::json;
use std::thread;

pub const USERNAMES_URL: &str = "https://users.roblox.com/v1/usernames/users";
const USERS_URL: &str = "https://users.roblox.com/v1/users";
const FRIENDS_URL: &str = "https://friends.roblox.com/v1/users";
const THUMBNAILS_URL: &str = "https://thumbnails.roblox.com/v1/users/avatar-headshot";
const HEADSHOT_SIZE: &str = "420x420";

#[derive(Debug, Deserialize)]
struct Data<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct ResolvedUser {
    id: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserInfo {
    name: String,
    display_name: Option<String>,
    description: Option<String>,
    created: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Count {
    count: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Thumbnail {
    image_url: Option<String>,
}

pub fn user_url(id: u64) -> String {
    format!("{USERS_URL}/{id}")
}

/// `kind` is one of `friends`, `followers`, `followings`.
pub fn count_url(id: u64, kind: &str) -> String {
    format!("{FRIENDS_URL}/{id}/{kind}/count")
}

pub fn headshot_url(id: u64) -> String {
    format!("{THUMBNAILS_URL}?userIds={id}&size={HEADSHOT_SIZE}&format=Png&isCircular=false")
}

pub struct RobloxFetcher;

impl RobloxFetcher {
    /// Username -> numeric id. Every failure here means "no such user".
    fn resolve_id(http: &Http, username: &str) -> Result<u64, FetchError> {
        let resolved: Data<ResolvedUser> = http
            .json(
                UpstreamRequest::post_json(
                    USERNAMES_URL,
                    json!({
                        "usernames": [username],
                        "excludeBannedUsers": false,
                    }),
                )
                .timeout(API_TIMEOUT),
            )
            .map_err(|err| {
                log::warn!("roblox: id resolution for {username} failed: {err}");
                FetchError::NotFound
            })?;

        resolved
            .data
            .first()
            .map(|user| user.id)
            .ok_or(FetchError::NotFound)
    }

    /// A count the caller can live without.
    fn count(http: &Http, id: u64, kind: &str) -> Option<u64> {
        match http.json::<Count>(UpstreamRequest::get(count_url(id, kind)).timeout(API_TIMEOUT)) {
            Ok(count) => Some(count.count),
            Err(err) => {
                log::warn!("roblox: {kind} count for {id} failed: {err}");
                None
            }
        }
    }

    fn headshot(http: &Http, id: u64) -> Option<String> {
        let request = UpstreamRequest::get(headshot_url(id)).timeout(API_TIMEOUT);
        match http.json::<Data<Thumbnail>>(request) {
            Ok(thumbs) => thumbs.data.into_iter().next().and_then(|t| t.image_url),
            Err(err) => {
                log::warn!("roblox: headshot for {id} failed: {err}");
                None
            }
        }
    }
}

impl ProfileFetcher for RobloxFetcher {
    fn platform(&self) -> Platform {
        Platform::Roblox
    }

    fn fetch(&self, http: &Http, username: &str) -> Result<ProfileSummary, FetchError> {
        let id = Self::resolve_id(http, username)?;

        // everything below only needs the id, so fan it out
        let (info, friends, followers, following, headshot) = thread::scope(|s| {
            let info = s.spawn(|| {
                http.json::<UserInfo>(UpstreamRequest::get(user_url(id)).timeout(API_TIMEOUT))
            });
            let friends = s.spawn(|| Self::count(http, id, "friends"));
            let followers = s.spawn(|| Self::count(http, id, "followers"));
            let following = s.spawn(|| Self::count(http, id, "followings"));
            let headshot = s.spawn(|| Self::headshot(http, id));

            (
                info.join().unwrap_or_else(|_| {
                    Err(FetchError::UpstreamUnavailable("profile request panicked".into()))
                }),
                friends.join().ok().flatten(),
                followers.join().ok().flatten(),
                following.join().ok().flatten(),
                headshot.join().ok().flatten(),
            )
        });

        let info = info?;

        let url = format!("https://www.roblox.com/users/{id}/profile");
        let mut profile = ProfileSummary::new(info.name, url)
            .nickname(info.display_name)
            .bio(info.description, NO_BIO)
            .profile_pic(headshot);
        profile.id = Some(id);
        profile.created = info.created;

        for (key, count) in [
            ("friends", friends),
            ("followers", followers),
            ("following", following),
        ] {
            if count.is_none() {
                profile.unknown_stats.push(key.to_string());
            }
            profile = profile.stat(key, count.unwrap_or(0));
        }

        Ok(profile)
    }
}
