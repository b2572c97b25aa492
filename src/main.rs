use std::net::SocketAddr;
use std::sync::Arc;
use vaultgraph::chain::{
    InMemoryVaultRegistry, NullConfigReader, RpcConfigReader, VaultConfigReader,
};
use vaultgraph::{api, config::Config, db::init_db, Ingestor, Projector, Repository};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let port = config.port;

    // Initialize database and dependencies
    let pool = match init_db(&config.database_path).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Failed to initialize database: {}", e);
            std::process::exit(1);
        }
    };

    let repo = Arc::new(Repository::new(pool));
    let config_reader: Arc<dyn VaultConfigReader> = match &config.rpc_url {
        Some(url) => Arc::new(RpcConfigReader::new(url.clone())),
        None => Arc::new(NullConfigReader),
    };
    let registry = Arc::new(InMemoryVaultRegistry::new());
    let projector = Projector::new(repo.clone(), config_reader, registry);
    let ingestor = Arc::new(Ingestor::new(projector));

    // Create router
    let app = api::create_router(api::AppState::new(repo, ingestor));

    // Bind to address
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Server listening on {}", addr);

    // Run server
    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
