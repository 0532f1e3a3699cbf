//! Órdenes de la consola

use std::str::FromStr;

use crate::controllers::fleet_controller::VehicleCategory;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `f <texto>`: filtra por placa o frota; `f` sólo limpia el filtro
    Filter(String),
    Category(VehicleCategory),
    NextPage,
    Refresh,
    /// Índice 1-based dentro de la lista visible
    Details(usize),
    CloseDetails,
    /// Índice 1-based dentro de los marcadores
    MarkerInfo(usize),
    CloseMarker,
    MapGeoJson,
    List,
    Help,
    Quit,
}

fn parse_index(arg: &str) -> Result<usize, String> {
    match arg.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("índice inválido: '{}'", arg.trim())),
    }
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (line, ""),
        };

        match head.to_lowercase().as_str() {
            "f" => Ok(Command::Filter(rest.to_string())),
            "t" => Ok(Command::Category(VehicleCategory::Tracked)),
            "o" => Ok(Command::Category(VehicleCategory::Others)),
            "n" | "" => Ok(Command::NextPage),
            "r" => Ok(Command::Refresh),
            "d" => parse_index(rest).map(Command::Details),
            "c" => Ok(Command::CloseDetails),
            "m" => parse_index(rest).map(Command::MarkerInfo),
            "mc" => Ok(Command::CloseMarker),
            "g" => Ok(Command::MapGeoJson),
            "l" => Ok(Command::List),
            "h" | "?" => Ok(Command::Help),
            "q" | "salir" | "sair" => Ok(Command::Quit),
            other => Err(format!("orden desconocida: '{}'", other)),
        }
    }
}

pub const HELP: &[(&str, &str)] = &[
    ("f <texto>", "🔍 Filtrar por placa ou frota (f sozinho limpa)"),
    ("t / o", "🗂️  Rastreados / Outros"),
    ("n (Enter)", "⏬ Carregar próxima página"),
    ("r", "🔄 Atualizar lista"),
    ("d <n>", "🚚 Detalhes do veículo n"),
    ("c", "❎ Fechar detalhes"),
    ("m <n> / mc", "📍 Abrir / fechar InfoWindow do marcador n"),
    ("g", "🧭 Marcadores em GeoJSON"),
    ("l", "📋 Mostrar lista e mapa"),
    ("h", "❓ Ajuda"),
    ("q", "🚪 Sair"),
];
