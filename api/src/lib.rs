pub mod config;
pub mod error;
pub mod obfuscate_errors;
pub mod panic_handler;
pub mod routes;
pub mod shared_state;
pub mod tracing_config;

use axum::{routing::IntoMakeService, Extension, Router};
use hyper::server::conn::AddrIncoming;
use pr_reviewers_db::{PgStore, Store};
use pr_reviewers_engine::Engine;
use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::MakeRequestUuid,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
    ServiceBuilderExt,
};
use tracing::{event, Level};

pub use crate::error::Error;
use crate::{obfuscate_errors::ObfuscateErrorLayer, shared_state::InnerState};

pub struct Server {
    pub host: String,
    pub port: u16,
    pub server: axum::Server<AddrIncoming, IntoMakeService<Router>>,
}

/// Connect to Postgres, bring the schema up to date, and bind the server.
pub async fn run_server(config: config::Config) -> Result<Server, anyhow::Error> {
    let pool = pr_reviewers_db::connect(config.database_url.as_str(), config.database_pool_size)?;
    let applied = pr_reviewers_db::run_migrations(&pool).await?;
    event!(Level::INFO, applied, "Database migrations complete");

    build_server(config, Arc::new(PgStore::new(pool)))
}

/// Bind the server over any store.
pub fn build_server(config: config::Config, store: Arc<dyn Store>) -> Result<Server, anyhow::Error> {
    let production = config.production();

    let state = Arc::new(InnerState {
        production,
        engine: Engine::new(store),
    });

    let app = routes::configure_routes(Router::new()).layer(
        // Global middlewares
        ServiceBuilder::new()
            .layer(CatchPanicLayer::custom(move |err| {
                panic_handler::handle_panic(production, err)
            }))
            .layer(ObfuscateErrorLayer::new(production))
            .compression()
            .set_x_request_id(MakeRequestUuid)
            .propagate_x_request_id()
            .layer(Extension(state))
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                    .on_response(DefaultOnResponse::new().level(Level::INFO))
                    .on_request(DefaultOnRequest::new().level(Level::INFO)),
            )
            .into_inner(),
    );

    let bind_ip: IpAddr = config.host.parse()?;
    let addr = SocketAddr::from((bind_ip, config.port));
    let builder = axum::Server::try_bind(&addr)?;

    let server = builder.serve(app.into_make_service());
    let port = server.local_addr().port();
    event!(Level::INFO, "Listening on {}:{}", config.host, port);

    Ok(Server {
        host: config.host,
        port,
        server,
    })
}
