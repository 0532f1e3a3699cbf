//! Resumen del mapa en texto

use colored::*;

use crate::widgets::map_widget::MapView;

pub fn render_map(view: &MapView<'_>) -> String {
    if let Some(placeholder) = view.placeholder() {
        let mut out = placeholder.bright_yellow().to_string();
        if let MapView::Failed(reason) = view {
            out.push_str(&format!("\n{}", reason.bright_black()));
        }
        return out;
    }

    let MapView::Ready {
        center,
        zoom,
        markers,
        popup,
    } = view
    else {
        return String::new();
    };

    let mut out = vec![
        "🗺️  Mapa de Rastreamento".bright_green().bold().to_string(),
        format!(
            "centro: {:.6}, {:.6} · zoom {} · {} marcadores",
            center.lat,
            center.lng,
            zoom,
            markers.len()
        ),
    ];

    for (i, marker) in markers.iter().enumerate() {
        let plate = marker
            .info_content
            .as_deref()
            .and_then(|label| label.lines().next())
            .unwrap_or(&marker.id);
        out.push(format!(
            "{:>3}  📍 {:<24} ({:.5}, {:.5})",
            i + 1,
            plate,
            marker.position.lat,
            marker.position.lng
        ));
    }

    if let Some(marker) = popup {
        out.push("┌ InfoWindow".bright_cyan().to_string());
        if let Some(content) = &marker.info_content {
            for line in content.lines() {
                out.push(format!("│ {}", line));
            }
        }
        out.push("└ (mc) fechar".bright_black().to_string());
    }

    out.join("\n")
}
