//! Panel de detalle de un vehículo

use colored::*;

use crate::models::vehicle::EnrichedVehicle;
use crate::ui::table::status_cell;

pub fn render_details(vehicle: &EnrichedVehicle) -> String {
    let v = &vehicle.vehicle;
    let mut out = vec![
        format!("🚚 Detalhes do Veículo: {}", v.plate)
            .bright_cyan()
            .bold()
            .to_string(),
        "===============================".bright_cyan().to_string(),
        format!("Placa:        {}", v.plate),
        format!("Frota:        {}", v.fleet_label()),
        format!("Tipo:         {}", v.vehicle_type),
        format!("Modelo:       {}", v.model),
        format!("Status:       {}", status_cell(&v.status)),
        format!("Proprietário: {}", v.name_owner),
    ];

    if let Some(speed) = vehicle.speed {
        out.push(format!("Velocidade:   {} km/h", speed));
    }

    match vehicle.position() {
        Some(position) => {
            out.push(format!("Localização:  {}, {}", position.lat, position.lng));
            out.push(format!(
                "🗺️  {}",
                position.google_maps_url().bright_blue().underline()
            ));
        }
        None => out.push("Localização não disponível.".bright_black().to_string()),
    }

    out.push("(c) fechar".bright_black().to_string());
    out.join("\n")
}
