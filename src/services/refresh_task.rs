use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::controllers::fleet_controller::FleetController;

/// Arranca el refresco automático de un controlador.
///
/// Cada `interval` se llama a `refresh()` (página 1, trigger nuevo). La tarea
/// sólo guarda una referencia débil: termina cuando se cancela el token o
/// cuando el controlador se libera. El token queda asociado al controlador y
/// cancela la tarea anterior si existía.
pub async fn start(controller: &Arc<RwLock<FleetController>>, interval: Duration) -> CancellationToken {
    let cancel = CancellationToken::new();
    controller.write().await.attach_refresh(cancel.clone());

    let target: Weak<RwLock<FleetController>> = Arc::downgrade(controller);
    let token = cancel.clone();

    tokio::spawn(async move {
        info!("⏱️ Auto-refresh iniciado (intervalo={interval:?})");
        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    info!("🛑 Auto-refresh detenido");
                    break;
                }
                _ = tokio::time::sleep(interval) => {
                    let Some(controller) = target.upgrade() else {
                        debug!("auto-refresh: controlador liberado");
                        break;
                    };
                    info!(
                        "🔄 Auto-refresh: nueva búsqueda ({})",
                        chrono::Local::now().format("%H:%M:%S")
                    );
                    controller.write().await.refresh().await;
                }
            }
        }
    });

    cancel
}
