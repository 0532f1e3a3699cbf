//! Tabla de vehículos para la terminal

use colored::*;

use crate::controllers::fleet_controller::{VehicleCategory, ViewSnapshot};
use crate::models::vehicle::{EnrichedVehicle, VehicleStatus};

const COLUMNS: [(&str, usize); 5] = [
    ("PLACA", 10),
    ("FROTA", 10),
    ("TIPO", 12),
    ("MODELO", 18),
    ("STATUS", 10),
];

pub fn status_cell(status: &VehicleStatus) -> ColoredString {
    let label = format!("{:<10}", status.label());
    match status {
        VehicleStatus::Active => label.green(),
        VehicleStatus::Inactive => label.red(),
        VehicleStatus::Other(_) => label.yellow(),
    }
}

fn fit(text: &str, width: usize) -> String {
    let mut cell: String = text.chars().take(width).collect();
    let len = cell.chars().count();
    cell.push_str(&" ".repeat(width.saturating_sub(len)));
    cell
}

fn row(index: usize, vehicle: &EnrichedVehicle) -> String {
    let v = &vehicle.vehicle;
    format!(
        "{:>3}  {} {} {} {} {}",
        index,
        fit(&v.plate, COLUMNS[0].1),
        fit(v.fleet_label(), COLUMNS[1].1),
        fit(&v.vehicle_type, COLUMNS[2].1),
        fit(&v.model, COLUMNS[3].1),
        status_cell(&v.status)
    )
}

fn header() -> String {
    let cells: Vec<String> = COLUMNS.iter().map(|(name, width)| fit(name, *width)).collect();
    format!("{:>3}  {}", "#", cells.join(" "))
}

/// Pinta la lista filtrada con los mensajes de estado de carga
pub fn render_table(snapshot: &ViewSnapshot) -> String {
    let mut out = Vec::new();

    let category = match snapshot.category {
        VehicleCategory::Tracked => "Rastreados",
        VehicleCategory::Others => "Outros",
    };
    out.push(format!(
        "{} {} {}",
        "Lista de Veículos".bright_blue().bold(),
        format!("[{}]", category).bright_cyan(),
        if snapshot.filter.is_empty() {
            String::new()
        } else {
            format!("filtro: '{}'", snapshot.filter)
        }
    ));

    if snapshot.is_error {
        out.push(
            format!(
                "Erro ao carregar veículos: {}",
                snapshot.error.as_deref().unwrap_or("erro desconhecido")
            )
            .bright_red()
            .to_string(),
        );
    }

    if snapshot.is_loading && snapshot.vehicles.is_empty() {
        out.push("Carregando veículos...".bright_black().to_string());
        return out.join("\n");
    }

    out.push(header().bold().to_string());
    if snapshot.vehicles.is_empty() {
        out.push("Nenhum veículo encontrado.".bright_black().to_string());
    } else {
        for (i, vehicle) in snapshot.vehicles.iter().enumerate() {
            out.push(row(i + 1, vehicle));
        }
    }

    if snapshot.is_loading {
        out.push("Carregando mais veículos...".bright_black().to_string());
    } else if !snapshot.has_more && !snapshot.vehicles.is_empty() {
        out.push("Fim da lista de veículos.".bright_black().to_string());
    }

    if let Some(meta) = &snapshot.meta {
        out.push(
            format!(
                "página {}/{} · {} carregados · ~{} no total",
                meta.page, meta.total_pages, snapshot.total_loaded, meta.total_items
            )
            .bright_black()
            .to_string(),
        );
    }

    out.join("\n")
}
