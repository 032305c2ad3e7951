mod checkin;
mod playback;
mod schedule;
mod sync;

use anyhow::Context;
use checkin::run_check_in_worker;
use opiapi::{ControlPlane, ControlPlaneClient, insecure_http_client};
use opicache::Reconciler;
use opiconfig::Config;
use opiplayer::{DisplayEnv, FfmpegLauncher, Screen, Supervisor, run_preflight};
use opiutils::device_id;
use playback::{Playback, SupervisedPlayback};
use std::process::ExitCode;
use std::sync::Arc;
use sync::SyncController;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("❌ {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    // ========== PHASE 1 : Configuration et vérifications ==========

    let mut config = Config::from_env();
    config.prepare_media_dir()?;

    let mac = device_id();
    info!("🚀 OPISignage v{} starting", env!("CARGO_PKG_VERSION"));
    info!("   Device ID : {}", if mac.is_empty() { "<none>" } else { mac.as_str() });
    info!("   Server    : {}", config.server_url);
    info!("   Media dir : {}", config.media_dir.display());
    if mac.is_empty() {
        // Pas fatal : une interface peut apparaître sans redémarrage
        warn!("⚠️ No network interface with a MAC address, check-in will fail");
    }

    let display = DisplayEnv::from_config(&config);
    let preflight = run_preflight(&display)
        .await
        .context("startup check failed")?;

    // ========== PHASE 2 : Assemblage ==========

    // Un seul client HTTP pour le serveur de contrôle et les téléchargements
    let http = insecure_http_client().context("cannot build HTTP client")?;
    let api: Arc<dyn ControlPlane> =
        Arc::new(ControlPlaneClient::with_client(http.clone(), &config.server_url));
    let tokens = config.token_store();

    let launcher = FfmpegLauncher {
        muxer_program: preflight.muxer_path.clone(),
        player_program: preflight.player_path.clone(),
        backend: preflight.backend,
        audio_device: config.audio_device.clone(),
        display: display.clone(),
    };
    let screen = Screen::default();
    let playback = Arc::new(SupervisedPlayback::new(
        Supervisor::new(Arc::new(launcher), screen.clone()),
        display,
        screen,
    ));

    let controller = SyncController::new(
        api.clone(),
        tokens.clone(),
        Reconciler::new(http, &config.media_dir),
        playback.clone(),
    );

    // ========== PHASE 3 : Boucles ==========

    let token_ready = Arc::new(Notify::new());
    let shutdown = CancellationToken::new();

    let worker = tokio::spawn(run_check_in_worker(
        api,
        mac,
        tokens,
        token_ready.clone(),
        shutdown.clone(),
    ));

    info!("✅ OPISignage is ready, player: {}", preflight.backend);
    tokio::select! {
        _ = controller.run(token_ready, shutdown.clone()) => {}
        _ = shutdown_signal() => info!("🛑 Shutdown requested"),
    }

    shutdown.cancel();
    let _ = worker.await;
    playback.teardown().await;
    info!("👋 OPISignage stopped");
    Ok(())
}

/// Attend Ctrl+C ou SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Ctrl+C handler unavailable: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("SIGTERM handler unavailable: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
