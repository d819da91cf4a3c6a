use anyhow::Result;
use clap::Parser;
use medical_image_analysis::app::App;
use std::net::SocketAddr;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "medical-image-analysis")]
#[command(about = "Serve the medical image analysis page")]
struct CliArgs {
    /// Address to listen on.
    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:8501")]
    bind: SocketAddr,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "medical_image_analysis=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting medical-image-analysis");

    let args = CliArgs::parse();

    match App::from_env() {
        Ok(app) => match app.run(args.bind).await {
            Ok(_) => Ok(()),
            Err(e) => {
                error!("Server failed: {}", e);
                std::process::exit(1);
            }
        },
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    }
}
