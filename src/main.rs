use anyhow::{Context, Result};
use clap::Parser;
use loqa_converse::{create_router, logging, AppState, Config, Credentials};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "loqa-converse", version, about = "Realtime voice conversation relay")]
struct Cli {
    /// Config file (without extension)
    #[arg(long, default_value = "config/loqa-converse")]
    config: String,

    /// Override the HTTP port
    #[arg(long)]
    port: Option<u16>,

    /// Override the static asset directory
    #[arg(long)]
    public_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    let mut cfg = Config::load(&cli.config)?;
    if let Some(port) = cli.port {
        cfg.service.http.port = port;
    }
    if let Some(dir) = cli.public_dir {
        cfg.service.http.public_dir = dir;
    }

    logging::init(&cfg.logging)?;

    let credentials = match Credentials::from_env() {
        Ok(credentials) => credentials,
        Err(e) => {
            error!("{}", e);
            return Err(e).context("Refusing to start without credentials");
        }
    };

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));
    info!("Static assets: {}", cfg.service.http.public_dir.display());
    info!(
        "Transcription model: {}, completion model: {}",
        cfg.transcription.model, cfg.completion.model
    );

    let state = AppState::new(&cfg, &credentials).context("Failed to build collaborators")?;
    let app = create_router(state);

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Server is listening on {}", addr);
    axum::serve(listener, app).await.context("HTTP server failed")?;

    Ok(())
}
