use tracing::{error, info};

use disk::{Config, Database, ImportLimits, WebServer};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load_with_env("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    // Initialize logging
    if let Err(e) = disk::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        disk::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = run(config).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> disk::Result<()> {
    config.validate()?;

    // Fails when a table binds more parameters per row than one statement allows.
    let limits = ImportLimits::new(config.import.max_query_args)?;
    info!(
        max_query_args = config.import.max_query_args,
        aggregates = limits.aggregates.rows(),
        nodes = limits.nodes.rows(),
        history = limits.history.rows(),
        "Import batch sizes"
    );

    let db = Database::open(&config.database.url, config.database.max_connections).await?;

    info!(
        "Server configured on {}:{}",
        config.server.host, config.server.port
    );
    let server = WebServer::from_database(&config.server, db, limits)?;
    server.run().await?;

    Ok(())
}
