// label-helper - Elder-friendly product label reader
// Author: kelexine (https://github.com/kelexine)

use anyhow::{Context, Result};
use clap::Parser;
use label_helper::cli::Args;
use label_helper::config::AppConfig;
use label_helper::gemini::GeminiClient;
use label_helper::pipeline::Pipeline;
use label_helper::server::create_router;
use label_helper::speech::GoogleTts;
use label_helper::utils::logging;
use label_helper::vision::UploadedImage;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Phase 1: Load configuration
    let config = AppConfig::load(args.config.as_deref())?;

    // Phase 2: Initialize logging
    logging::init(&config.logging)?;
    info!("Starting label-helper v{}", env!("CARGO_PKG_VERSION"));

    // Phase 3: Runtime sized from config
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.server.workers.max(1))
        .enable_all()
        .build()
        .context("failed to build Tokio runtime")?;

    runtime.block_on(run(args, config))
}

async fn run(args: Args, config: AppConfig) -> Result<()> {
    // Phase 4: Boundary clients, credential passed in explicitly
    let interpreter = Arc::new(GeminiClient::new(&config.gemini)?);
    let synthesizer = Arc::new(GoogleTts::new(&config.speech)?);
    let pipeline = Pipeline::new(&config.pipeline, interpreter, synthesizer);
    info!(
        "Pipeline: model={} {:?}",
        config.gemini.model,
        pipeline.options()
    );

    if let (Some(image), Some(audio_out)) = (args.image.as_deref(), args.audio_path()) {
        return run_once(&pipeline, image, &audio_out).await;
    }

    // Phase 5: Build and start HTTP server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let app = create_router(config, pipeline)?;

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Phase 6: Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down gracefully");
    Ok(())
}

/// Interpret one image from disk, print the explanation and save the narration.
async fn run_once(pipeline: &Pipeline, image: &Path, audio_out: &Path) -> Result<()> {
    let bytes = tokio::fs::read(image)
        .await
        .with_context(|| format!("failed to read {}", image.display()))?;

    let mut upload = UploadedImage::new(bytes);
    upload.file_name = image
        .file_name()
        .map(|name| name.to_string_lossy().into_owned());

    let report = pipeline.run(upload).await?;

    println!("📝 成分說明\n\n{}\n", report.text);

    match report.audio {
        Ok(clip) => {
            tokio::fs::write(audio_out, &clip.bytes)
                .await
                .with_context(|| format!("failed to write {}", audio_out.display()))?;
            println!("🔊 {}", audio_out.display());
        }
        Err(e) => {
            warn!("Narration not written: {}", e);
            eprintln!("🔇 {}", e);
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
