use actix_web::{middleware::Logger, web, App, HttpResponse, HttpServer};
use anyhow::Context;
use async_graphql::http::GraphiQLSource;
use async_graphql_actix_web::{GraphQLRequest, GraphQLResponse};
use document_store::{DocumentStore, InMemoryStore, PgDocumentStore};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::prelude::*;

use social_graph::config::{Config, StoreBackend};
use social_graph::security::CredentialHasher;
use social_graph::{build_schema, AppSchema, SocialGraph};

async fn graphql_handler(schema: web::Data<AppSchema>, req: GraphQLRequest) -> GraphQLResponse {
    schema.execute(req.into_inner()).await.into()
}

async fn graphiql_handler() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(GraphiQLSource::build().endpoint("/graphql").finish())
}

async fn health_handler() -> &'static str {
    "ok"
}

/// SDL endpoint for client code generation
async fn schema_handler(schema: web::Data<AppSchema>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain")
        .body(schema.sdl())
}

async fn connect_store(config: &Config) -> anyhow::Result<Arc<dyn DocumentStore>> {
    match config.store.backend {
        StoreBackend::Memory => {
            warn!("Using in-memory document store; data is lost on restart");
            Ok(Arc::new(InMemoryStore::new()))
        }
        StoreBackend::Postgres => {
            let pg_config = config
                .store
                .postgres
                .as_ref()
                .context("postgres backend selected without pool settings")?;
            let store = PgDocumentStore::connect(pg_config)
                .await
                .context("Failed to connect document store")?;
            store
                .migrate()
                .await
                .context("Failed to migrate document store")?;
            Ok(Arc::new(store))
        }
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Structured JSON logs with span context
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,social_graph=debug,document_store=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_line_number(true)
                .with_file(true)
                .with_target(true),
        )
        .init();

    info!("Starting social graph service...");

    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        backend = ?config.store.backend,
        hashing = ?config.hashing,
        "Configuration loaded"
    );

    let hasher = CredentialHasher::new(config.hashing)
        .map_err(|e| anyhow::anyhow!("Invalid password hashing cost: {e}"))?;
    let store = connect_store(&config).await?;

    let schema = build_schema(SocialGraph::new(store, hasher));

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Social graph GraphQL endpoint on http://{}/graphql", bind_addr);

    let playground = config.graphql.playground;
    HttpServer::new(move || {
        let mut app = App::new()
            .app_data(web::Data::new(schema.clone()))
            .wrap(Logger::default())
            .route("/graphql", web::post().to(graphql_handler))
            .route("/schema", web::get().to(schema_handler))
            .route("/health", web::get().to(health_handler));
        if playground {
            app = app.route("/graphql", web::get().to(graphiql_handler));
        }
        app
    })
    .workers(config.server.workers)
    .bind(&bind_addr)?
    .run()
    .await?;

    Ok(())
}
