use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "station-inventory")]
#[command(about = "Asset and inventory backend for police stations")]
#[command(long_about = "Tracks department inventory with category-specific attributes, routes \
                       issuance requests to each station's incharge, and drives maintenance \
                       requests through approval and repair. Start the API with 'station-inventory serve'.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run pending migrations (if enabled) and serve the HTTP API
    Serve {
        /// Address to listen on, overriding server.bind_address
        #[arg(long, help = "Socket address to bind, e.g. 127.0.0.1:3000")]
        bind: Option<String>,
    },
    /// Apply database migrations and exit
    Migrate,
    /// Register a user directly, bypassing the external identity flow
    AddUser {
        /// 12-digit government ID
        #[arg(long)]
        gov_id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// 10-digit phone number
        #[arg(long)]
        phone: String,
        /// admin, incharge or user
        #[arg(long, default_value = "user")]
        role: String,
        /// Station the user is posted to
        #[arg(long)]
        location: String,
    },
    /// Print the effective configuration as TOML
    Config {
        /// Save the configuration to this file instead of printing it
        #[arg(long, value_name = "PATH")]
        write: Option<PathBuf>,
    },
}
