use super::model::HistoryEntry;
use crate::http::StatusClass;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, Table};

/// 渲染历史记录表格 (最新在前)
pub fn render_history(entries: &[HistoryEntry], limit: usize) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["ID", "Time", "Method", "URL", "Status", "Duration"]);

    for entry in entries.iter().take(limit) {
        let (status, duration) = match &entry.response {
            Some(response) => (response.status, format!("{}ms", response.response_time)),
            None => (0, "-".to_string()),
        };
        let status_color = match StatusClass::of(status) {
            StatusClass::Success | StatusClass::Redirect => Color::Green,
            StatusClass::ClientError => Color::Yellow,
            StatusClass::ServerError | StatusClass::Unknown => Color::Red,
        };

        table.add_row(vec![
            Cell::new(entry.short_id()),
            Cell::new(entry.timestamp.format("%Y-%m-%d %H:%M:%S")),
            Cell::new(&entry.request.method),
            Cell::new(&entry.request.url).add_attribute(Attribute::Dim),
            Cell::new(status).fg(status_color),
            Cell::new(duration),
        ]);
    }

    table
}

pub fn list_history(entries: &[HistoryEntry], limit: usize) {
    if entries.is_empty() {
        println!("No history yet");
        return;
    }
    println!("{}", render_history(entries, limit));
}
