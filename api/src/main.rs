mod app_error;
mod routes;
mod template;

use pdf_summarizer::{AppConfig, Summarizer, UploadStore};
use routes::AppState;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize environment variables and logging
    dotenv::dotenv().ok();
    env_logger::init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let uploads = UploadStore::new(&config.upload_dir);
    uploads.ensure_dir().await?;
    log::info!("Storing uploads in {}", uploads.dir().display());

    let state = AppState {
        summarizer: Arc::new(Summarizer::from_config(&config)),
        uploads,
    };

    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    log::info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
