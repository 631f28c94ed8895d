use std::sync::Arc;
use tokio::signal;
use tracing::info;

use wordroom_core::{StudentRoster, Vocabulary};
use wordroom_server::{
    config::Config, create_routes, room_registry::RoomRegistry, round_timer::RoundTimers,
    websocket::ConnectionManager,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    info!("Starting word room server...");

    let config = Config::new();
    let connection_manager = Arc::new(ConnectionManager::new());
    let timers = RoundTimers::new();

    let vocabulary = match Vocabulary::builtin() {
        Ok(vocabulary) => {
            info!("Loaded {} words", vocabulary.len());
            vocabulary
        }
        Err(e) => {
            tracing::error!("Failed to load the word list: {}", e);
            std::process::exit(1);
        }
    };

    let registry = Arc::new(
        RoomRegistry::new(Arc::new(vocabulary)).with_round_duration(config.round_duration()),
    );
    let identity = Arc::new(StudentRoster::default());

    let routes = create_routes(
        connection_manager.clone(),
        registry.clone(),
        timers.clone(),
        identity,
    );

    // Start cleanup task
    let cleanup_connection_manager = connection_manager.clone();
    let cleanup_registry = registry.clone();
    let cleanup_timers = timers.clone();
    let cleanup_config = config.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(cleanup_config.cleanup_interval());
        loop {
            interval.tick().await;

            cleanup_connection_manager
                .cleanup_inactive_connections(cleanup_config.connection_timeout())
                .await;
            for code in cleanup_registry
                .reclaim_idle(
                    cleanup_config.room_idle_timeout(),
                    cleanup_config.finished_room_grace(),
                )
                .await
            {
                cleanup_timers.cancel(&code);
            }
        }
    });

    let ip: std::net::IpAddr = match config.host.parse() {
        Ok(ip) => ip,
        Err(e) => {
            tracing::error!("Invalid HOST '{}': {}", config.host, e);
            std::process::exit(1);
        }
    };

    info!("Server starting on {}:{}", config.host, config.port);

    let (addr, server) = warp::serve(routes).bind_with_graceful_shutdown((ip, config.port), async {
        // Wait for SIGINT (Ctrl+C) or SIGTERM
        #[cfg(unix)]
        {
            let (Ok(mut sigint), Ok(mut sigterm)) = (
                signal::unix::signal(signal::unix::SignalKind::interrupt()),
                signal::unix::signal(signal::unix::SignalKind::terminate()),
            ) else {
                tracing::error!("Failed to install signal handlers");
                std::process::exit(1);
            };

            tokio::select! {
                _ = sigint.recv() => {
                    info!("Received SIGINT, shutting down gracefully...");
                }
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, shutting down gracefully...");
                }
            }
        }

        #[cfg(not(unix))]
        {
            if let Err(e) = signal::ctrl_c().await {
                tracing::error!("Failed to listen for ctrl+c: {}", e);
                return;
            }
            info!("Received Ctrl+C, shutting down gracefully...");
        }
    });

    info!(
        "Server started successfully on {}. Press Ctrl+C to stop.",
        addr
    );
    server.await;
    info!("Server shutdown complete.");
}
