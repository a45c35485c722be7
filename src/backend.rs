use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde_json::json;
use showcase::{
    config::SiteConfig,
    error::ConfigError,
    log::{log_event, LogLevel, Logger},
};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};
use tower_http::services::{ServeDir, ServeFile};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_SITE_CONFIG_PATH: &str = "config/site.json";
const DEFAULT_DIST_DIR: &str = "dist";

#[derive(Clone)]
struct AppState {
    site_config: Arc<String>,
    logger: Logger,
}

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let port = std::env::var("PORT")
        .ok()
        .and_then(|value| value.trim().parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT);
    let config_path = parse_env_non_empty_string("SITE_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SITE_CONFIG_PATH));
    let dist_dir = parse_env_non_empty_string("DIST_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DIST_DIR));

    let (config, from_disk) = load_site_config(&config_path)?;
    let logger = Logger::new(config.log_level);
    log_event(
        &logger,
        LogLevel::Info,
        if from_disk { "config_loaded" } else { "config_fallback" },
        json!({
            "path": config_path.display().to_string(),
            "sections": config.sections.len(),
            "roles": config.roles.len(),
        }),
    );

    let state = AppState {
        site_config: Arc::new(serde_json::to_string(&config)?),
        logger,
    };

    let app = router(state, &dist_dir);
    let bind_address = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    log_event(
        &logger,
        LogLevel::Info,
        "server_listening",
        json!({ "url": format!("http://127.0.0.1:{port}") }),
    );
    axum::serve(listener, app).await?;
    Ok(())
}

fn router(state: AppState, dist_dir: &Path) -> Router {
    let static_service =
        ServeDir::new(dist_dir).not_found_service(ServeFile::new(dist_dir.join("index.html")));

    Router::new()
        .route("/site.json", get(get_site_config))
        .fallback_service(static_service)
        .with_state(state)
}

/// Reads and validates the config at `path`. A missing file falls back to the
/// embedded config; the flag reports whether the disk copy was used.
fn load_site_config(path: &Path) -> Result<(SiteConfig, bool), ConfigError> {
    match fs::read_to_string(path) {
        Ok(raw) => SiteConfig::from_json(&raw).map(|config| (config, true)),
        Err(error) if error.kind() == ErrorKind::NotFound => {
            SiteConfig::embedded().map(|config| (config, false))
        }
        Err(error) => Err(ConfigError::Io(error)),
    }
}

async fn get_site_config(State(state): State<AppState>) -> impl IntoResponse {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));

    log_event(
        &state.logger,
        LogLevel::Debug,
        "site_config_served",
        json!({ "bytes": state.site_config.len() }),
    );

    (StatusCode::OK, headers, state.site_config.as_str().to_owned())
}

fn parse_env_non_empty_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
