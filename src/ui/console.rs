//! Consola interactiva
//!
//! Lee órdenes por stdin, las aplica al controlador y pinta la lista, el
//! mapa y el detalle abierto.

use std::sync::Arc;
use std::time::Duration;

use colored::*;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::controllers::fleet_controller::FleetController;
use crate::ui::commands::{Command, HELP};
use crate::ui::details::render_details;
use crate::ui::map::render_map;
use crate::ui::table::render_table;
use crate::utils::errors::{AppError, AppResult};
use crate::widgets::map_widget::MapWidget;

pub struct Console {
    controller: Arc<RwLock<FleetController>>,
    map: MapWidget,
    wait_timeout: Duration,
}

pub fn render_help() -> String {
    let mut out = vec![
        "📋 MENU PRINCIPAL".bright_green().bold().to_string(),
        "==================".bright_green().to_string(),
    ];
    for (keys, description) in HELP {
        out.push(format!("  {:<12} {}", keys.bright_white(), description));
    }
    out.join("\n")
}

impl Console {
    pub fn new(
        controller: Arc<RwLock<FleetController>>,
        map: MapWidget,
        wait_timeout: Duration,
    ) -> Self {
        Self {
            controller,
            map,
            wait_timeout,
        }
    }

    pub fn map(&self) -> &MapWidget {
        &self.map
    }

    /// Espera a que la petición en curso se aplique, como mucho `wait_timeout`
    async fn wait_for_data(&self) {
        let fetcher = Arc::clone(self.controller.read().await.fetcher());
        if tokio::time::timeout(self.wait_timeout, fetcher.wait_idle())
            .await
            .is_err()
        {
            warn!("⏳ La petición sigue en curso tras {:?}", self.wait_timeout);
        }
    }

    /// Lista, mapa y detalle con el estado actual. Sincroniza el mapa con la lista.
    pub async fn render_view(&mut self) -> String {
        let snapshot = self.controller.write().await.snapshot().await;
        self.map.set_markers(snapshot.markers.clone());
        self.map.set_center(snapshot.center);

        let mut out = vec![render_table(&snapshot), render_map(&self.map.render())];
        if let Some(selected) = &snapshot.selected {
            out.push(render_details(selected));
        }
        out.join("\n\n")
    }

    /// Aplica una orden. `None` cuando hay que salir.
    pub async fn apply(&mut self, command: Command) -> Option<String> {
        let output = match command {
            Command::Quit => return None,
            Command::Help => render_help(),
            Command::List => self.render_view().await,
            Command::Filter(text) => {
                self.controller.write().await.set_filter(&text).await;
                self.wait_for_data().await;
                self.render_view().await
            }
            Command::Category(category) => {
                self.controller.write().await.set_category(category).await;
                self.wait_for_data().await;
                self.render_view().await
            }
            Command::Refresh => {
                self.controller.write().await.refresh().await;
                self.wait_for_data().await;
                self.render_view().await
            }
            Command::NextPage => {
                let accepted = self.controller.write().await.on_last_row_visible().await;
                if accepted {
                    self.wait_for_data().await;
                }
                self.render_view().await
            }
            Command::Details(index) => {
                let snapshot = self.controller.write().await.snapshot().await;
                match index.checked_sub(1).and_then(|i| snapshot.vehicles.get(i)) {
                    Some(vehicle) => {
                        let id = vehicle.vehicle.id.clone();
                        self.controller.write().await.select_vehicle(&id).await;
                        self.render_view().await
                    }
                    None => format!("❌ Não há veículo na posição {}", index)
                        .bright_red()
                        .to_string(),
                }
            }
            Command::CloseDetails => {
                self.controller.write().await.close_details();
                self.render_view().await
            }
            Command::MarkerInfo(index) => {
                let id = index
                    .checked_sub(1)
                    .and_then(|i| self.map.markers().get(i))
                    .map(|m| m.id.clone());
                match id {
                    Some(id) => {
                        self.map.click_marker(&id);
                        render_map(&self.map.render())
                    }
                    None => format!("❌ Não há marcador na posição {}", index)
                        .bright_red()
                        .to_string(),
                }
            }
            Command::CloseMarker => {
                self.map.close_info();
                render_map(&self.map.render())
            }
            Command::MapGeoJson => serde_json::to_string_pretty(&self.map.to_geojson())
                .unwrap_or_else(|e| format!("❌ {}", e)),
        };
        Some(output)
    }

    /// Bucle principal sobre stdin; termina con `q` o fin de entrada
    pub async fn run(mut self) -> AppResult<()> {
        println!("{}", "🚚 Fleet Tracker".bright_blue().bold());
        println!("{}", "=====================================".bright_blue());
        self.wait_for_data().await;
        println!("{}\n", self.render_view().await);
        println!("{}", render_help());

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("{} ", ">".bright_cyan());
            // flush de stdout; un fallo aquí sólo afecta al prompt
            let _ = std::io::Write::flush(&mut std::io::stdout());

            let Some(line) = lines
                .next_line()
                .await
                .map_err(|e| AppError::Internal(e.to_string()))?
            else {
                break;
            };

            match line.parse::<Command>() {
                Ok(command) => match self.apply(command).await {
                    Some(output) => println!("{}\n", output),
                    None => break,
                },
                Err(e) => println!("{}", format!("❌ {}. 'h' para ajuda.", e).bright_red()),
            }
        }

        info!("👋 Consola cerrada");
        println!("{}", "👋 Até logo!".bright_green());
        Ok(())
    }
}
