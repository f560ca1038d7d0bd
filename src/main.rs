use anyhow::Result;
use clap::Parser;
use gemini_relay::config::Config;
use gemini_relay::server::Application;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "gemini-relay")]
#[command(about = "Relay chat and multi-modal requests to the Gemini API")]
struct CliArgs {
    /// Port to listen on (overrides PORT).
    #[arg(long, value_name = "PORT")]
    port: Option<u16>,

    /// Include truncated error traces in 500 responses.
    #[arg(long)]
    debug_traces: bool,
}

impl CliArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(port) = self.port {
            config.port = port;
        }
        if self.debug_traces {
            config.expose_error_traces = true;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gemini_relay=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    args.apply(&mut config);

    if config.expose_error_traces {
        info!("Error traces will be included in 500 responses");
    }

    info!("Starting gemini-relay on port {}", config.port);

    let app = Application::build(config).await?;
    app.run_until_stopped().await?;
    Ok(())
}
