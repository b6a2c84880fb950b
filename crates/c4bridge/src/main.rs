use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use c4bridge::Config;
use c4bridge::Engine;
use c4bridge::format_diagnostics;
use c4bridge_client::Endpoint;
use c4bridge_client::VariableClient;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Debug, Parser)]
#[command(version, about = "Bridge Control4 proxies to a local HTTP API")]
struct Cli {
    /// Path to the TOML config file
    #[arg(long, short, global = true, default_value = "c4bridge.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Run the daemon (default)
    Run,
    /// Validate the config file and exit
    Check,
    /// Read variables from one proxy and print them as JSON
    Get {
        #[command(flatten)]
        target: Target,
        /// Variable IDs to read
        #[arg(required = true)]
        variables: Vec<String>,
    },
    /// Write one variable on a proxy
    Set {
        #[command(flatten)]
        target: Target,
        variable: String,
        value: String,
    },
}

/// The proxy a one-off `get` or `set` talks to
#[derive(Debug, Args)]
struct Target {
    /// Web driver URL, including any fixed query parameters
    #[arg(long)]
    base_url: String,

    #[arg(long)]
    proxy_id: u32,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout: u64,
}

impl Target {
    fn client(&self) -> anyhow::Result<VariableClient> {
        let endpoint = Endpoint::parse(
            &self.base_url,
            self.proxy_id,
            Duration::from_secs(self.timeout),
        )?;
        Ok(VariableClient::new(endpoint)?)
    }
}

fn init_tracing(config: Option<&Config>) {
    let filter = config
        .map(|c| c.logging.filter())
        .unwrap_or_else(|| c4bridge::config::LoggingConfig::default().filter());

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .init();
}

fn load_config(path: &std::path::Path) -> anyhow::Result<Config> {
    let (config, diagnostics) = Config::from_file(path)?;
    if !diagnostics.is_empty() {
        eprint!("{}", format_diagnostics(&diagnostics));
    }
    Ok(config)
}

async fn run(config: Config) -> anyhow::Result<()> {
    tracing::info!("c4bridge starting");

    let mut engine = Engine::new();
    engine.register_integrations_from_config(&config);
    let engine = Arc::new(engine);

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let mut api = tokio::spawn(c4bridge::api::serve(
        config.api.listen,
        config.api.port,
        engine.clone(),
        shutdown_rx,
    ));

    tokio::select! {
        result = engine.run() => {
            if let Err(e) = result {
                tracing::error!("Engine stopped: {}", e);
            }
        }
        result = &mut api => {
            engine.shutdown();
            let result = result
                .context("API task panicked")?
                .context("API server stopped");
            if let Err(e) = &result {
                tracing::error!("{:#}", e);
            }
            return result;
        }
        result = tokio::signal::ctrl_c() => {
            match result {
                Ok(()) => tracing::info!("Received shutdown signal"),
                Err(e) => tracing::error!("Failed to listen for shutdown signal: {}", e),
            }
        }
    }

    shutdown_tx.send(()).ok();
    engine.shutdown();
    api.await.context("API task panicked")??;

    tracing::info!("c4bridge shutdown complete");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(CliCommand::Run) {
        CliCommand::Run => {
            let config = load_config(&cli.config)?;
            init_tracing(Some(&config));
            run(config).await
        }
        CliCommand::Check => {
            load_config(&cli.config)?;
            println!("{}: OK", cli.config.display());
            Ok(())
        }
        CliCommand::Get { target, variables } => {
            init_tracing(None);
            let snapshot = target.client()?.get(&variables).await?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
            Ok(())
        }
        CliCommand::Set {
            target,
            variable,
            value,
        } => {
            init_tracing(None);
            target.client()?.set(&variable, &value).await?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::IpAddr;
    use std::net::Ipv4Addr;

    use c4bridge::config::ApiConfig;

    use super::*;

    #[tokio::test]
    async fn test_run_fails_when_api_port_is_taken() {
        let taken = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = taken.local_addr().unwrap().port();

        let config = Config {
            api: ApiConfig {
                listen: IpAddr::V4(Ipv4Addr::LOCALHOST),
                port,
            },
            ..Default::default()
        };

        let err = tokio::time::timeout(Duration::from_secs(5), run(config))
            .await
            .expect("run should stop when the API cannot bind")
            .unwrap_err();
        assert!(
            format!("{err:#}").contains(&format!("Failed to bind 127.0.0.1:{port}")),
            "{err:#}"
        );
    }
}
