use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::info;

use station_inventory::cli::{Cli, Commands};
use station_inventory::config::StationInventoryConfig;
use station_inventory::handlers::RegistrationHandler;
use station_inventory::models::RegistrationForm;
use station_inventory::shutdown::{shutdown_all_services, shutdown_signal};
use station_inventory::{build_router, init_telemetry, shutdown_telemetry, AppState, SqliteStore, WorkflowMetrics};

fn main() -> Result<()> {
    let cli = Cli::parse();

    StationInventoryConfig::load_env_file()?;
    let config = StationInventoryConfig::load().context("Failed to load configuration")?;

    match cli.command {
        Commands::Serve { bind } => {
            tokio::runtime::Runtime::new()?.block_on(async { serve_command(config, bind).await })
        }
        Commands::Migrate => {
            tokio::runtime::Runtime::new()?.block_on(async { migrate_command(config).await })
        }
        Commands::AddUser { gov_id, name, email, phone, role, location } => {
            let form = RegistrationForm {
                gov_id: Some(gov_id),
                name: Some(name),
                email: Some(email),
                phone: Some(phone),
                role: Some(role),
                location: Some(location),
            };
            tokio::runtime::Runtime::new()?.block_on(async { add_user_command(config, form).await })
        }
        Commands::Config { write: None } => {
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
        Commands::Config { write: Some(path) } => {
            config.save_to_file(&path)?;
            println!("✅ Configuration written to {}", path.display());
            Ok(())
        }
    }
}

async fn open_store(config: &StationInventoryConfig) -> Result<SqliteStore> {
    SqliteStore::connect(&config.database.url, config.database.max_connections).await
}

async fn serve_command(config: StationInventoryConfig, bind: Option<String>) -> Result<()> {
    init_telemetry(&config.observability)?;
    info!("Starting station inventory API server");

    let store = open_store(&config).await?;
    if config.database.auto_migrate {
        store.migrate().await?;
    }

    let metrics = Arc::new(WorkflowMetrics::new());
    let state = Arc::new(AppState::new(Arc::new(store.clone()), metrics.clone()));
    let app = build_router(state);

    let bind_address = bind.unwrap_or(config.server.bind_address);
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {bind_address}"))?;
    info!("Listening on {}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    shutdown_all_services(&store, &metrics).await;
    shutdown_telemetry();
    Ok(())
}

async fn migrate_command(config: StationInventoryConfig) -> Result<()> {
    init_telemetry(&config.observability)?;
    let store = open_store(&config).await?;
    store.migrate().await?;
    store.shutdown().await;
    println!("✅ Database at {} is up to date", config.database.url);
    Ok(())
}

async fn add_user_command(config: StationInventoryConfig, form: RegistrationForm) -> Result<()> {
    init_telemetry(&config.observability)?;
    let store = open_store(&config).await?;
    if config.database.auto_migrate {
        store.migrate().await?;
    }

    let handler = RegistrationHandler::new(Arc::new(store.clone()), Arc::new(WorkflowMetrics::new()));
    let result = handler.register(form).await;
    store.shutdown().await;

    let user = result?;
    println!("✅ Registered {} ({}) as {} at {}", user.name, user.id, user.role, user.location);
    Ok(())
}
