use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use dotenvy::dotenv;
use tokio::signal;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use fleet_tracker::api::create_app;
use fleet_tracker::client::FleetApiClient;
use fleet_tracker::config::environment::EnvironmentConfig;
use fleet_tracker::controllers::fleet_controller::FleetController;
use fleet_tracker::services::refresh_task;
use fleet_tracker::state::AppState;
use fleet_tracker::ui::Console;
use fleet_tracker::widgets::map_widget::{GoogleMapsLoader, MapLoadStatus, MapWidget};

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging; LOG_LEVEL acepta la sintaxis de EnvFilter
    let filter = EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("🚚 Fleet Tracker - Rastreamento de Veículos");
    info!("================================================");

    let config = match EnvironmentConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("❌ {}", e);
            return Err(anyhow::anyhow!("Configuración inválida: {}", e));
        }
    };
    info!(
        "⚙️ Entorno: {} · API: {} · perPage={} · refresco cada {}s",
        config.environment, config.api_base_url, config.per_page, config.refresh_interval_secs
    );

    let client = FleetApiClient::from_config(&config)?;
    let controller = Arc::new(RwLock::new(FleetController::new(
        Arc::new(client),
        config.per_page,
    )));

    // Primera carga y refresco automático
    controller.write().await.refresh().await;
    refresh_task::start(&controller, config.refresh_interval()).await;

    // SDK del mapa
    let mut map = MapWidget::new(config.maps_api_key.clone());
    let loader = GoogleMapsLoader::new(config.http_timeout())?;
    match map.load(&loader).await {
        MapLoadStatus::Ready => info!("🗺️ Mapa listo"),
        MapLoadStatus::Failed(reason) => warn!("⚠️ Mapa no disponible: {}", reason),
        MapLoadStatus::Loading => {}
    }

    // Servidor de desarrollo opcional
    let shutdown = CancellationToken::new();
    let server_handle = match config.dev_server_port {
        Some(port) => {
            if !config.is_development() {
                warn!(
                    "⚠️ DEV_SERVER_PORT definido en entorno '{}'; el passthrough es sólo para desarrollo",
                    config.environment
                );
            }
            let app = create_app(AppState::new(config.clone(), Arc::clone(&controller))?);
            let addr: SocketAddr = format!("0.0.0.0:{}", port).parse()?;
            let listener = tokio::net::TcpListener::bind(addr).await?;

            info!("🌐 Servidor de desarrollo en http://{}", addr);
            info!("🔍 Endpoints disponibles:");
            info!("   GET  /health - Health check");
            info!("   GET  /api/fleet/vehicles - Vista actual (?filter=&category=)");
            info!("   GET  /api/fleet/markers - Marcadores en GeoJSON");
            info!("   POST /api/fleet/refresh - Refrescar lista");
            info!("   POST /api/fleet/next-page - Página siguiente");
            info!("   ANY  {}/* - Passthrough a la API remota", config.dev_proxy_prefix);

            let token = shutdown.clone();
            Some(tokio::spawn(async move {
                axum::serve(listener, app)
                    .with_graceful_shutdown(shutdown_signal(token))
                    .await
                    .map_err(|e| {
                        error!("❌ Error del servidor: {}", e);
                        e
                    })
            }))
        }
        None => None,
    };

    // Consola interactiva
    let console = Console::new(Arc::clone(&controller), map, config.http_timeout());
    if let Err(e) = console.run().await {
        error!("❌ Error en la consola: {}", e);
    }

    controller.write().await.teardown();
    shutdown.cancel();

    if let Some(handle) = server_handle {
        if let Err(e) = handle.await? {
            error!("❌ Servidor terminó con error: {}", e);
        }
        info!("👋 Servidor terminado");
    }

    Ok(())
}

/// Señal de apagado graceful: Ctrl+C, SIGTERM o salida de la consola
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo instalar el handler de Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el handler de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
        _ = token.cancelled() => {
            info!("🛑 Consola cerrada, apagando servidor...");
        },
    }
}
