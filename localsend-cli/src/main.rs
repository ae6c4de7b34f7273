mod config;
mod progress;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use localsend_core::{
    ClientConfig, DeviceType, HttpPeerClient, LocalBatch, PeerInfo, Protocol,
    Target, TransferOrchestrator,
};

use crate::config::CliConfig;
use crate::progress::SendProgress;

#[derive(Parser, Debug)]
#[clap(name = "localsend-cli")]
#[clap(about = "Send files to LocalSend receivers", long_about = None)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Offer files to a receiver and upload the ones it accepts.
    Send {
        /// IP address or host name of the receiver.
        address: String,

        #[clap(required = true)]
        files: Vec<PathBuf>,

        #[clap(short, long)]
        port: Option<u16>,

        /// Name shown on the receiving device.
        #[clap(long)]
        alias: Option<String>,

        #[clap(long)]
        https: bool,

        /// Attach a SHA-256 of every file to the offer.
        #[clap(long)]
        hash: bool,

        #[clap(long, value_enum, default_value_t = Network::Default)]
        network: Network,

        #[clap(short, long)]
        verbose: bool,
    },

    #[clap(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    Show,
    SetAlias { alias: String },
    SetPort { port: u16 },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Network {
    Default,
    Lan,
    Slow,
}

impl Network {
    fn client_config(self) -> ClientConfig {
        match self {
            Network::Default => ClientConfig::default(),
            Network::Lan => ClientConfig::lan(),
            Network::Slow => ClientConfig::slow_network(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Send {
            address,
            files,
            port,
            alias,
            https,
            hash,
            network,
            verbose,
        } => {
            init_logger(verbose);
            run_send(address, files, port, alias, https, hash, network, verbose)
                .await
        }
        Command::Config(command) => {
            init_logger(false);
            run_config(command)
        }
    }
}

fn init_logger(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_filter),
    )
    .init();
}

#[allow(clippy::too_many_arguments)]
async fn run_send(
    address: String,
    files: Vec<PathBuf>,
    port: Option<u16>,
    alias: Option<String>,
    https: bool,
    hash: bool,
    network: Network,
    verbose: bool,
) -> Result<()> {
    let mut config = CliConfig::load()?;
    let (fingerprint, generated) = config.ensure_fingerprint();
    if generated {
        config
            .save()
            .with_context(|| "Failed to save generated fingerprint")?;
    }

    let mut client_config = network.client_config();
    if let Some(default_port) = config.default_port {
        client_config = client_config.with_default_port(default_port);
    }
    let protocol = if https { Protocol::Https } else { Protocol::Http };
    let target = Target::new(address, port.unwrap_or(client_config.default_port))
        .with_protocol(protocol);

    // This sender never listens. The advertised port is only the LocalSend
    // default so receivers that log the field show a sensible value.
    let info = PeerInfo::new(
        alias.unwrap_or_else(|| config.alias_or_default()),
        fingerprint,
        client_config.default_port,
    )
    .with_device(Some(std::env::consts::OS.to_string()), DeviceType::Headless)
    .with_protocol(protocol);

    let batch = LocalBatch::from_paths(files.as_slice(), hash)
        .await
        .context("Failed to read files to send")?;
    println!(
        "Offering {} file(s) to {}:{}...",
        batch.len(),
        target.address,
        target.port
    );

    let subscriber = Arc::new(SendProgress::new(&batch, verbose));
    let client = HttpPeerClient::new(client_config)?;
    let orchestrator = TransferOrchestrator::new(
        Arc::new(client),
        target,
        info,
        batch,
        subscriber,
    );

    let cancel = orchestrator.cancellation_token();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!("Cancelling file transfer...");
            cancel.cancel();
        }
    });
    let result = orchestrator.run().await;
    ctrl_c.abort();

    match result {
        Ok(()) => {
            println!("All files sent successfully!");
            Ok(())
        }
        Err(e) if e.is_soft() => {
            println!("{}", e);
            Ok(())
        }
        Err(e) => Err(anyhow!(e)),
    }
}

fn run_config(command: ConfigCommand) -> Result<()> {
    let mut config = CliConfig::load()?;
    match command {
        ConfigCommand::Show => {
            println!("Config file: {}", CliConfig::config_file()?.display());
            println!("Alias: {}", config.alias_or_default());
            println!(
                "Fingerprint: {}",
                config.fingerprint.as_deref().unwrap_or("(not generated yet)")
            );
            match config.default_port {
                Some(port) => println!("Default port: {}", port),
                None => println!(
                    "Default port: {}",
                    localsend_core::DEFAULT_PORT
                ),
            }
        }
        ConfigCommand::SetAlias { alias } => {
            config.alias = Some(alias.clone());
            config.save()?;
            println!("Saved '{}' as alias", alias);
        }
        ConfigCommand::SetPort { port } => {
            config.default_port = Some(port);
            config.save()?;
            println!("Saved {} as default port", port);
        }
    }
    Ok(())
}
