//! # Quillpress Binary
//!
//! The entry point that assembles the application based on compile-time
//! features: pick a persistence gateway and a session provider, wire the
//! services, serve the router.

use std::sync::Arc;

use anyhow::Context;
use secrecy::ExposeSecret;

use api_adapters::metrics::HttpMetrics;
use api_adapters::{router, AppState};
use configs::AppConfig;
use domains::{
    BotRepo, CommentRepo, EngagementRepo, PostRepo, SessionProvider, UserRepo,
};
use services::bots::BotService;
use services::comments::CommentService;
use services::credentials::CredentialStore;
use services::engagement::EngagementService;
use services::identity::IdentityResolver;
use services::posts::PostService;

#[cfg(feature = "db-postgres")]
use storage_adapters::PostgresGateway;

#[cfg(not(feature = "db-postgres"))]
use storage_adapters::MemoryGateway;

#[cfg(feature = "auth-jwt")]
use auth_adapters::JwtSessionProvider;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::load().context("failed to load configuration")?;
    init_tracing(&config);

    // 1. Persistence gateway
    #[cfg(feature = "db-postgres")]
    let gateway = Arc::new(
        PostgresGateway::connect(
            config.database.url.expose_secret(),
            config.database.max_connections,
        )
        .await
        .context("failed to init Postgres")?,
    );

    #[cfg(not(feature = "db-postgres"))]
    let gateway = Arc::new(MemoryGateway::new());

    // 2. Session collaborator
    #[cfg(feature = "auth-jwt")]
    let sessions: Arc<dyn SessionProvider> = Arc::new(JwtSessionProvider::new(
        config.auth.session_secret.clone(),
    ));

    #[cfg(not(feature = "auth-jwt"))]
    let sessions: Arc<dyn SessionProvider> = Arc::new(NoSessions);

    let state = build_state(gateway, sessions);
    let app = router(state);

    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "quillpress listening");
    axum::serve(listener, app).await?;
    Ok(())
}

/// Wire every service against one gateway value that implements all the
/// persistence ports.
fn build_state<G>(gateway: Arc<G>, sessions: Arc<dyn SessionProvider>) -> AppState
where
    G: PostRepo + BotRepo + UserRepo + CommentRepo + EngagementRepo + 'static,
{
    let credentials = CredentialStore::new();
    AppState {
        identity: Arc::new(IdentityResolver::new(
            credentials,
            gateway.clone(),
            gateway.clone(),
            sessions,
        )),
        posts: Arc::new(PostService::new(
            gateway.clone(),
            gateway.clone(),
            gateway.clone(),
        )),
        bots: Arc::new(BotService::new(
            gateway.clone(),
            gateway.clone(),
            credentials,
        )),
        comments: Arc::new(CommentService::new(
            gateway.clone(),
            gateway.clone(),
            gateway.clone(),
            gateway.clone(),
        )),
        engagement: Arc::new(EngagementService::new(gateway.clone(), gateway)),
        metrics: Arc::new(HttpMetrics::new()),
    }
}

fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::EnvFilter;
    let filter =
        EnvFilter::try_new(&config.log.filter).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.log.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Deny-all fallback when no session backend is compiled in: every
/// non-bot bearer resolves to anonymous.
#[cfg(not(feature = "auth-jwt"))]
struct NoSessions;

#[cfg(not(feature = "auth-jwt"))]
#[async_trait::async_trait]
impl SessionProvider for NoSessions {
    async fn resolve(&self, _bearer_token: &str) -> domains::Result<Option<uuid::Uuid>> {
        Ok(None)
    }
}
