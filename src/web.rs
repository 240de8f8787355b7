use crate::{
    config::Config,
    display::DisplayConfig,
    lookup::{Dispatcher, Lookup, LookupError, Platform, ProfileSummary},
};
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tokio::signal;

#[derive(Clone)]
pub struct SharedState {
    pub dispatcher: Arc<Dispatcher>,
}

pub fn router(state: Arc<SharedState>, static_dir: Option<&str>) -> Router {
    let api = Router::new()
        .route("/api/stalk", get(stalk))
        .route("/api/platforms", get(platforms))
        // profiles are re-fetched on every request, never cache them
        .layer(tower_http::set_header::SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ));

    let app = match static_dir {
        Some(dir) => api.fallback_service(tower_http::services::ServeDir::new(dir)),
        None => api,
    };

    app.layer(
        tower_http::trace::TraceLayer::new_for_http()
            .make_span_with(tower_http::trace::DefaultMakeSpan::new().level(tracing::Level::INFO))
            .on_response(tower_http::trace::DefaultOnResponse::new().level(tracing::Level::INFO)),
    )
    .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    log::warn!("shutting down");
}

async fn start_app(config: &Config, dispatcher: Arc<Dispatcher>) -> anyhow::Result<()> {
    let shared_state = Arc::new(SharedState { dispatcher });
    let app = router(shared_state, config.static_dir.as_deref());

    let addr = config.listen_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("listening on {addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

pub fn start_daemon(config: &Config, dispatcher: Arc<Dispatcher>) -> anyhow::Result<()> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async { start_app(config, dispatcher).await })
}

/// Flat `{status: false, error}` envelope with the matching status code.
#[derive(Debug)]
pub struct HttpError(LookupError);

impl IntoResponse for HttpError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.0 {
            LookupError::MissingUsername | LookupError::InvalidRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            LookupError::UnsupportedPlatform(_) => {
                log::debug!("{self:?}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            LookupError::Fetch { .. } => {
                log::error!("{self:?}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (
            status,
            Json(json!({"status": false, "error": self.0.to_string()})),
        )
            .into_response()
    }
}

impl<E> From<E> for HttpError
where
    E: Into<LookupError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[derive(Debug, Clone, Default)]
pub struct StalkRequest {
    pub username: Option<String>,
    pub platform: Option<String>,
}

impl StalkRequest {
    /// First value wins when a key is repeated.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut req = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "username" => &mut req.username,
                "type" => &mut req.platform,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        req
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StalkResponse {
    pub status: bool,
    pub platform: Platform,
    pub data: ProfileSummary,
}

impl From<Lookup> for StalkResponse {
    fn from(lookup: Lookup) -> Self {
        Self {
            status: true,
            platform: lookup.platform,
            data: lookup.profile,
        }
    }
}

async fn stalk(
    State(state): State<Arc<SharedState>>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<StalkResponse>, HttpError> {
    let Query(pairs) = query.map_err(|err| LookupError::InvalidRequest(err.body_text()))?;
    let payload = StalkRequest::from_pairs(pairs);
    log::debug!("payload: {payload:?}");

    let dispatcher = state.dispatcher.clone();

    // fetchers use the blocking client
    tokio::task::block_in_place(move || {
        dispatcher
            .lookup(payload.username.as_deref(), payload.platform.as_deref())
            .map(|lookup| Json(lookup.into()))
            .map_err(Into::into)
    })
}

async fn platforms() -> Json<Vec<DisplayConfig>> {
    Json(DisplayConfig::all())
}
