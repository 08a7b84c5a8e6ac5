use chiral_dns_domain::{CliOverrides, Config};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

mod bootstrap;
mod commands;
mod di;
mod server;

#[derive(Parser)]
#[command(name = "chiral-dns")]
#[command(version)]
#[command(about = "Chiral DNS - authoritative DNS server backed by a zone store")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE", global = true)]
    config: Option<String>,

    /// DNS server port
    #[arg(short = 'd', long, global = true)]
    dns_port: Option<u16>,

    /// Bind address
    #[arg(short = 'b', long, global = true)]
    bind: Option<String>,

    /// Database path
    #[arg(long, global = true)]
    database: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve DNS queries over UDP (default)
    Serve {
        /// Zone file to load before serving
        #[arg(long, value_name = "FILE")]
        zone_file: Option<PathBuf>,
    },
    /// Load a zone file into the store
    Load {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Send one query and dump the exchange
    Dig {
        name: String,

        #[arg(default_value = "A")]
        record_type: String,

        #[arg(long, default_value = "127.0.0.1")]
        server: String,

        #[arg(long, default_value_t = 53)]
        port: u16,

        /// Response timeout in milliseconds
        #[arg(long, default_value_t = 2000)]
        timeout: u64,
    },
    /// Interactive administration console
    Console,
    /// Print zone store statistics
    Stats {
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        dns_port: cli.dns_port,
        bind_address: cli.bind.clone(),
        database_path: cli.database.clone(),
        log_level: cli.log_level.clone(),
    };

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;

    bootstrap::init_logging(&config.logging);

    let command = cli.command.unwrap_or(Command::Serve { zone_file: None });

    match command {
        Command::Serve { zone_file } => {
            info!("Starting Chiral DNS v{}", env!("CARGO_PKG_VERSION"));
            let use_cases = open_store(&config).await?;
            if let Some(path) = zone_file {
                commands::load_zone_file(&use_cases, &path).await?;
            }
            let dns_services = di::DnsServices::new(&config, &use_cases);
            server::start_dns_server(&config.server, &config.dns, dns_services.handler).await?;
            info!("Server shutdown complete");
        }
        Command::Load { file } => {
            let use_cases = open_store(&config).await?;
            commands::load_zone_file(&use_cases, &file).await?;
        }
        Command::Dig {
            name,
            record_type,
            server,
            port,
            timeout,
        } => {
            commands::dig(commands::DigRequest {
                name: &name,
                record_type: &record_type,
                server: &server,
                port,
                timeout: Duration::from_millis(timeout),
            })
            .await?;
        }
        Command::Console => {
            let use_cases = open_store(&config).await?;
            server::run_console(use_cases.console_session()).await?;
        }
        Command::Stats { json } => {
            let use_cases = open_store(&config).await?;
            commands::stats(&use_cases, json).await?;
        }
    }

    Ok(())
}

async fn open_store(config: &Config) -> anyhow::Result<di::UseCases> {
    let store = bootstrap::init_store(&config.database).await?;
    Ok(di::UseCases::new(config, store))
}
