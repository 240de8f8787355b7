use crate::config::Config;
use crate::lookup::FetchError;
use once_cell::sync::Lazy;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use std::{error::Error, sync::Arc, time::Duration};

pub const USER_AGENT_DEFAULT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
/// Engine prefix of [`USER_AGENT_DEFAULT`], enough for the embed widgets.
pub const USER_AGENT_SHORT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
/// Link-preview crawlers get server-rendered meta tags instead of a login wall.
pub const USER_AGENT_CRAWLER: &str = "facebookexternalhit/1.1";

pub const ACCEPT_HTML: &str = "text/html,application/xhtml+xml";
pub const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

/// Deadline for JSON APIs and lightweight pages
pub const API_TIMEOUT: Duration = Duration::from_secs(10);
/// Deadline for heavy scraped pages
pub const PAGE_TIMEOUT: Duration = Duration::from_secs(12);

static SELF_AGENT: Lazy<String> =
    Lazy::new(|| format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")));

fn get_error(error: &reqwest::Error) -> String {
    match error.source() {
        Some(e) => match e.source() {
            Some(e) => e.to_string(),
            None => e.to_string(),
        },
        None => error.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub json: Option<serde_json::Value>,
    pub timeout: Duration,
}

impl UpstreamRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            headers: Vec::new(),
            json: None,
            timeout: API_TIMEOUT,
        }
    }

    pub fn post_json(url: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: Method::POST,
            json: Some(body),
            ..Self::get(url)
        }
    }

    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Identifier used in log lines (host + path, no query)
    pub fn iden(&self) -> String {
        match url::Url::parse(&self.url) {
            Ok(url) => format!("{}{}", url.host_str().unwrap_or_default(), url.path()),
            Err(_) => self.url.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub body: String,
}

/// Seam between fetchers and the network, so tests can serve canned pages.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &UpstreamRequest) -> Result<UpstreamResponse, FetchError>;
}

/// Blocking reqwest client shared by every request.
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let mut client = reqwest::blocking::Client::builder()
            .user_agent(SELF_AGENT.as_str())
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .timeout(PAGE_TIMEOUT)
            .pool_idle_timeout(Duration::from_secs(10));

        if let Some(proxy) = config.proxy() {
            log::debug!("using proxy {proxy:#?}");
            client = client.proxy(reqwest::Proxy::all(&proxy)?);
        }

        Ok(Self {
            client: client.build()?,
        })
    }
}

impl Transport for ReqwestTransport {
    fn execute(&self, request: &UpstreamRequest) -> Result<UpstreamResponse, FetchError> {
        let iden = request.iden();

        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .timeout(request.timeout);
        for (name, value) in &request.headers {
            builder = builder.header(*name, value);
        }
        if let Some(ref body) = request.json {
            builder = builder.json(body);
        }

        log::debug!("{iden}: requesting");

        let resp = builder.send().map_err(|err| {
            log::error!("{iden}: {err}: {:#?}", get_error(&err));
            FetchError::UpstreamUnavailable(get_error(&err))
        })?;

        let status = resp.status();
        if !status.is_success() {
            log::debug!("{iden}: {:?}", status.to_string());
        }

        // we might get a status, but no readable body
        let body = resp.text().map_err(|err| {
            log::debug!("{iden}: timed out: {}", err.is_timeout());
            FetchError::UpstreamUnavailable(get_error(&err))
        })?;

        Ok(UpstreamResponse { status, body })
    }
}

/// Injected per dispatcher; fetchers only ever see this handle.
#[derive(Clone)]
pub struct Http {
    transport: Arc<dyn Transport>,
}

impl Http {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Body of a 2xx response, anything else is mapped to a [`FetchError`].
    pub fn text(&self, request: UpstreamRequest) -> Result<String, FetchError> {
        let resp = self.transport.execute(&request)?;

        match resp.status {
            s if s.is_success() => Ok(resp.body),
            StatusCode::NOT_FOUND | StatusCode::GONE => Err(FetchError::NotFound),
            StatusCode::TOO_MANY_REQUESTS => Err(FetchError::RateLimited),
            s => Err(FetchError::UpstreamUnavailable(format!(
                "{}: {s}",
                request.iden()
            ))),
        }
    }

    pub fn json<T: DeserializeOwned>(&self, request: UpstreamRequest) -> Result<T, FetchError> {
        let body = self.text(request)?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Append path segments to a fixed base url, percent-encoding the username.
///
/// An empty last segment keeps a trailing slash (`https://imginn.com/jack/`).
pub fn page_url(base: &str, segments: &[&str]) -> Result<String, FetchError> {
    let mut url =
        url::Url::parse(base).map_err(|err| FetchError::ParseFailure(err.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| FetchError::ParseFailure(format!("{base} cannot be a base")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url.into())
}
