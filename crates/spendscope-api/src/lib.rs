//! HTTP API server with HTMX support
//!
//! Routes are organized into modules:
//! - routes::analysis: Filter actions, chart data and the analysis page
//! - routes::transactions: Filtered transaction list, manual entry, reload
//! - routes::session: Demo mode, error banner, session teardown
//! - routes::settings: Configuration and category catalog display

pub mod error;
pub mod routes;

use axum::{
    http::HeaderMap,
    routing::{get, post},
    Router,
};
use spendscope_config::Config;
use spendscope_core::error::{DefaultErrorLogger, ErrorContext, ErrorLogger};
use spendscope_core::{
    AnalysisSession, AnalysisSettings, AnalysisView, CategoryCatalog, CoreError, LoadState, TransactionSource,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;

pub use error::ApiError;

/// A session with the time it was last used
#[derive(Debug)]
pub struct SessionSlot {
    pub session: AnalysisSession,
    last_seen: Instant,
}

impl SessionSlot {
    fn new(session: AnalysisSession, now: Instant) -> Self {
        Self { session, last_seen: now }
    }
}

/// Sessions keyed by user id
pub type SessionMap = Arc<RwLock<HashMap<String, SessionSlot>>>;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionMap,
    pub source: Arc<dyn TransactionSource>,
    pub demo_source: Arc<dyn TransactionSource>,
    pub catalog: Arc<CategoryCatalog>,
    pub settings: AnalysisSettings,
    pub config: Config,
}

impl AppState {
    pub fn new(
        config: Config,
        catalog: Arc<CategoryCatalog>,
        source: Arc<dyn TransactionSource>,
        demo_source: Arc<dyn TransactionSource>,
    ) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            source,
            demo_source,
            catalog,
            settings: AnalysisSettings::from_config(&config),
            config,
        }
    }

    fn new_session(&self, identity: &Identity) -> AnalysisSession {
        AnalysisSession::new(
            identity.user_id.clone(),
            self.config.session.demo_mode,
            self.catalog.clone(),
            self.settings.clone(),
        )
    }

    fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.config.session.idle_timeout_secs)
    }
}

/// Caller identity as set by the upstream auth proxy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Option<String>,
    /// Key of the caller's session
    pub session_key: String,
}

impl Identity {
    pub fn from_headers(headers: &HeaderMap, config: &Config) -> Self {
        let user_id = headers
            .get(config.server.identity_header.as_str())
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        let session_key = user_id
            .clone()
            .unwrap_or_else(|| config.session.demo_user_id.clone());
        Self { user_id, session_key }
    }
}

/// Drop idle sessions, then the least recently used ones until there is
/// room for one more. Returns how many were dropped.
pub fn prune_sessions(
    sessions: &mut HashMap<String, SessionSlot>,
    now: Instant,
    idle_timeout: Duration,
    max_sessions: usize,
) -> usize {
    let before = sessions.len();
    sessions.retain(|_, slot| now.saturating_duration_since(slot.last_seen) <= idle_timeout);

    while !sessions.is_empty() && sessions.len() >= max_sessions {
        let oldest = sessions
            .iter()
            .min_by_key(|(_, slot)| slot.last_seen)
            .map(|(key, _)| key.clone());
        match oldest {
            Some(key) => {
                sessions.remove(&key);
            }
            None => break,
        }
    }

    let dropped = before - sessions.len();
    if dropped > 0 {
        log::debug!("Dropped {} sessions, {} left", dropped, sessions.len());
    }
    dropped
}

async fn session_op<T>(
    state: &AppState,
    identity: &Identity,
    create_anonymous: bool,
    f: impl FnOnce(&mut AnalysisSession) -> T,
) -> Result<T, ApiError> {
    let now = Instant::now();
    let mut sessions = state.sessions.write().await;

    if !sessions.contains_key(&identity.session_key) {
        let anonymous_allowed = create_anonymous || state.config.session.demo_mode;
        if identity.user_id.is_none() && !anonymous_allowed {
            return Err(CoreError::MissingIdentity.into());
        }
        prune_sessions(&mut sessions, now, state.idle_timeout(), state.config.session.max_sessions);
        let session = state.new_session(identity);
        sessions.insert(identity.session_key.clone(), SessionSlot::new(session, now));
    }

    match sessions.get_mut(&identity.session_key) {
        Some(slot) => {
            slot.last_seen = now;
            Ok(f(&mut slot.session))
        }
        None => Err(CoreError::MissingIdentity.into()),
    }
}

/// Run `f` on the caller's session, creating it on first use
///
/// Callers without an identity only get a session when demo mode is the
/// configured default or they already have one.
pub async fn with_session<T>(
    state: &AppState,
    identity: &Identity,
    f: impl FnOnce(&mut AnalysisSession) -> T,
) -> Result<T, ApiError> {
    session_op(state, identity, false, f).await
}

/// Like [`with_session`], but also creates sessions for anonymous callers
pub async fn with_any_session<T>(
    state: &AppState,
    identity: &Identity,
    f: impl FnOnce(&mut AnalysisSession) -> T,
) -> Result<T, ApiError> {
    session_op(state, identity, true, f).await
}

/// Fetch the caller's transactions into their session
///
/// The source is awaited without holding the session lock. A failed fetch
/// is recorded in the session and also returned to the caller.
pub async fn refresh_session(state: &AppState, identity: &Identity) -> Result<(), ApiError> {
    let ticket = with_session(state, identity, |s| s.begin_fetch()).await??;

    let result = if ticket.demo_mode() {
        let user = ticket
            .user_id()
            .unwrap_or(state.config.session.demo_user_id.as_str());
        state.demo_source.fetch_transactions(user).await
    } else {
        match ticket.user_id() {
            Some(user) => state.source.fetch_transactions(user).await,
            None => Err(CoreError::MissingIdentity),
        }
    };
    let failure = result.as_ref().err().map(|e| {
        let context = ErrorContext::new("fetch_transactions").with_user_id(ticket.user_id().map(str::to_string));
        DefaultErrorLogger.log_error(e, &context);
        match e {
            CoreError::Service { message } => message.clone(),
            other => other.to_string(),
        }
    });

    let mut sessions = state.sessions.write().await;
    match sessions.get_mut(&identity.session_key) {
        Some(slot) => {
            if !slot.session.complete_fetch(ticket, result) {
                log::debug!("Fetch for {} was superseded", identity.session_key);
            }
        }
        None => log::debug!("Session {} ended during fetch", identity.session_key),
    }

    match failure {
        Some(message) => Err(CoreError::Service { message }.into()),
        None => Ok(()),
    }
}

/// Current view, loading the data first if the session has none yet
///
/// Service failures are reported through the view's error banner.
pub async fn current_view(state: &AppState, identity: &Identity) -> Result<AnalysisView, ApiError> {
    let idle = with_session(state, identity, |s| matches!(s.load_state(), LoadState::Idle)).await?;
    if idle {
        match refresh_session(state, identity).await {
            Ok(()) | Err(ApiError::Core(CoreError::Service { .. })) => {}
            Err(e) => return Err(e),
        }
    }
    with_session(state, identity, |s| s.view()).await
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::analysis::{
        api_analysis, api_back, api_chart_click, api_clear, api_select_category, api_select_subcategory,
        api_set_period, api_set_type, htmx_analysis_panel, page_analysis,
    };
    use routes::session::{api_demo_mode, api_dismiss_error, api_end_session, api_set_demo_mode};
    use routes::settings::{api_categories, api_settings, page_settings};
    use routes::transactions::{api_add_transaction, api_reload_transactions, api_transactions};

    Router::new()
        // API endpoints
        .route("/api/health", get(health_check))
        .route("/api/analysis", get(api_analysis))
        .route("/api/analysis/type", post(api_set_type))
        .route("/api/analysis/period", post(api_set_period))
        .route("/api/analysis/category", post(api_select_category))
        .route("/api/analysis/subcategory", post(api_select_subcategory))
        .route("/api/analysis/chart-click", post(api_chart_click))
        .route("/api/analysis/back", post(api_back))
        .route("/api/analysis/clear", post(api_clear))
        .route("/api/transactions", get(api_transactions).post(api_add_transaction))
        .route("/api/transactions/reload", post(api_reload_transactions))
        .route("/api/error/dismiss", post(api_dismiss_error))
        .route("/api/demo-mode", get(api_demo_mode).post(api_set_demo_mode))
        .route("/api/session", axum::routing::delete(api_end_session))
        .route("/api/categories", get(api_categories))
        .route("/api/settings", get(api_settings))
        // HTMX page routes
        .route("/", get(page_analysis))
        .route("/analysis", get(page_analysis))
        .route("/analysis/panel", get(htmx_analysis_panel))
        .route("/settings", get(page_settings))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

// ==================== Template Functions ====================

/// Base HTML template
pub fn base_html(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{} - Spendscope</title>
    <script src="https://unpkg.com/htmx.org@1.9.10"></script>
    <script src="https://cdn.tailwindcss.com"></script>
    <style>
        .htmx-indicator {{ opacity: 0; transition: opacity 0.3s; }}
        .htmx-request .htmx-indicator {{ opacity: 1; }}
        .htmx-request.htmx-indicator {{ opacity: 1; }}
    </style>
</head>
<body class="bg-gray-50 text-gray-900">
    {}
</body>
</html>"#,
        spendscope_utils::escape_html(title),
        content
    )
}

/// Navigation sidebar
pub fn nav_sidebar(current_path: &str) -> String {
    let links = [("/analysis", "Analysis", "📊"), ("/settings", "Settings", "⚙️")];

    let mut nav = String::from("<div class='bg-white border-r h-screen flex flex-col'><div class='p-4 border-b'><h1 class='text-xl font-bold text-indigo-600'>Spendscope</h1></div><ul class='flex-1 py-2 space-y-1 px-2'>");
    for (path, label, icon) in &links {
        let is_active = current_path.starts_with(path) || (current_path == "/" && *path == "/analysis");
        let active_class = if is_active { "bg-indigo-50 text-indigo-600" } else { "text-gray-600 hover:bg-gray-50" };
        nav.push_str(&format!(
            r#"<li><a href='{}' class='flex items-center gap-2 px-3 py-2 rounded-lg {}'>{}<span>{}</span></a></li>"#,
            path, active_class, icon, label
        ));
    }
    nav.push_str("</ul></div>");
    nav
}

/// Check if request is from HTMX (partial page update)
fn is_htmx_request(headers: &HeaderMap) -> bool {
    headers.get("hx-request").is_some()
}

/// Wrap content for full page or HTMX partial
pub fn page_response(headers: &HeaderMap, title: &str, current_path: &str, inner_content: &str) -> String {
    if is_htmx_request(headers) {
        inner_content.to_string()
    } else {
        base_html(
            title,
            &format!(
                r#"<div class='flex flex-col h-screen'>
    <div class='flex flex-1 overflow-hidden'>
        <aside class='w-64 flex-shrink-0'>{}</aside>
        <main class='flex-1 overflow-auto bg-gray-50 p-6'>{}</main>
    </div>
</div>"#,
                nav_sidebar(current_path),
                inner_content
            ),
        )
    }
}

/// Start the HTTP server
///
/// Binds to the configured address and serves until the process stops.
pub async fn start_server(state: AppState) -> std::io::Result<()> {
    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let router = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    log::info!("Starting Spendscope server on http://{}", addr);
    log::info!("Available routes:");
    log::info!("  - /analysis (Spending analysis)");
    log::info!("  - /settings (Configuration)");
    log::info!("  - /api/* (JSON API endpoints)");

    axum::serve(listener, router).await?;
    log::info!("Server stopped gracefully");
    Ok(())
}
