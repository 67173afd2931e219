/*
 * Responsibility
 * - tracing / panic hook の初期化
 * - Config読み込み → 依存生成 (TokenCodec/Verifier, PrincipalLookup) → Router 組み立て
 * - Middleware の適用 (HTTP 共通 + Bearer 認証)
 * - axum::serve() で起動
 */
use std::{net::SocketAddr, panic, process, sync::Arc};

use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::Config;
use crate::error::AppError;
use crate::middleware::{self, http::HttpLimits};
use crate::repos::principal_repo::PgPrincipalRepo;
use crate::services::auth::build_auth_services;
use crate::services::principal::{InMemoryPrincipals, PrincipalLookup};
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,stateless_auth=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Always surface panics via tracing; stderr may be hidden.
        tracing::error!(?info, "panic");

        // ABORT_ON_PANIC=true: fail fast. Otherwise default hook, keep serving.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<(), AppError> {
    init_tracing();
    let config = Config::from_env()?;

    init_panic_hook(config.abort_on_panic);

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state, config.http_limits);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState, AppError> {
    let (_codec, verifier) = build_auth_services(config)?;
    let principals = build_principal_lookup(config).await?;

    Ok(AppState::new(verifier, principals))
}

async fn build_principal_lookup(config: &Config) -> Result<Arc<dyn PrincipalLookup>, AppError> {
    if let Some(url) = &config.database_url {
        let pool = PgPoolOptions::new().max_connections(5).connect(url).await?;
        tracing::info!("resolving principals from postgres");
        return Ok(Arc::new(PgPrincipalRepo::new(pool)));
    }

    let store = InMemoryPrincipals::parse(config.static_principals.as_deref().unwrap_or_default());
    if store.is_empty() {
        tracing::warn!("no principals configured; every token subject will be treated as unknown");
    } else {
        tracing::info!(count = store.len(), "resolving principals from STATIC_PRINCIPALS");
    }

    Ok(Arc::new(store))
}

/// Full router: `/api/v1` behind the authentication middleware, wrapped in the HTTP layers.
pub fn build_router(state: AppState, limits: HttpLimits) -> Router {
    let v1 = middleware::auth::access::apply(api::v1::routes(), state.clone());

    let router = Router::new().nest("/api/v1", v1).with_state(state);

    middleware::http::apply(router, limits)
}
