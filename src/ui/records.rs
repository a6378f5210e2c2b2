//! Records table and the details panel of the highlighted row.
use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap};

use crate::app::AppState;
use crate::model::{Record, ResourceKind};

struct Column {
    title: &'static str,
    width: Constraint,
    cell: fn(&Record) -> String,
}

fn or(record: &Record, key: &str, placeholder: &str) -> String {
    record.text(key).unwrap_or_else(|| placeholder.to_string())
}

fn full_name(r: &Record) -> String {
    let first = r.text("first_name").unwrap_or_default();
    let last = r.text("last_name").unwrap_or_default();
    format!("{first} {last}").trim().to_string()
}

const USER_COLUMNS: &[Column] = &[
    Column {
        title: "NAME",
        width: Constraint::Percentage(22),
        cell: full_name,
    },
    Column {
        title: "USERNAME",
        width: Constraint::Percentage(14),
        cell: |r| or(r, "username", ""),
    },
    Column {
        title: "PHONE",
        width: Constraint::Percentage(16),
        cell: |r| or(r, "phoneNumber", "No data?"),
    },
    Column {
        title: "EMAIL",
        width: Constraint::Percentage(24),
        cell: |r| or(r, "email", "No Email!"),
    },
    Column {
        title: "ADDRESS",
        width: Constraint::Percentage(24),
        cell: |r| or(r, "address", "Address was not given"),
    },
];

const POST_COLUMNS: &[Column] = &[
    Column {
        title: "TITLE",
        width: Constraint::Percentage(35),
        cell: |r| or(r, "title", ""),
    },
    Column {
        title: "CATEGORY",
        width: Constraint::Percentage(20),
        cell: |r| or(r, "category", "No data?"),
    },
    Column {
        title: "DESCRIPTION",
        width: Constraint::Percentage(45),
        cell: |r| or(r, "description", "").lines().next().unwrap_or("").to_string(),
    },
];

fn columns(kind: ResourceKind) -> &'static [Column] {
    match kind {
        ResourceKind::Users => USER_COLUMNS,
        ResourceKind::Posts => POST_COLUMNS,
    }
}

/// Short human name of a record, used in dialogs.
pub fn label(kind: ResourceKind, record: &Record) -> String {
    let name = match kind {
        ResourceKind::Users => full_name(record),
        ResourceKind::Posts => record.text("title").unwrap_or_default(),
    };
    if name.is_empty() {
        record.id.to_string()
    } else {
        name
    }
}

pub fn render_records_table(f: &mut Frame, area: Rect, app: &AppState) {
    let ctl = app.active();
    let kind = ctl.kind();
    let cols = columns(kind);

    let title = format!(
        "{}  page {}/{}  ({} total){}",
        kind.plural(),
        ctl.query().page(),
        ctl.total_pages(),
        ctl.total_items(),
        if ctl.loading() { "  Loading…" } else { "" }
    );
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border));

    if ctl.rows().is_empty() {
        let msg = if ctl.loading() {
            "Loading…".to_string()
        } else if ctl.query().search().is_empty() {
            format!("No {} yet. Press n to create one.", kind.plural().to_lowercase())
        } else {
            format!("Nothing matches \"{}\".", ctl.query().search())
        };
        let p = Paragraph::new(msg)
            .style(Style::default().fg(app.theme.muted))
            .block(block);
        f.render_widget(p, area);
        return;
    }

    let rows = ctl.rows().iter().map(|record| {
        Row::new(cols.iter().map(|c| Cell::from((c.cell)(record))).collect::<Vec<_>>())
            .style(Style::default().fg(app.theme.text))
    });
    let header = Row::new(cols.iter().map(|c| c.title).collect::<Vec<_>>()).style(
        Style::default()
            .fg(app.theme.title)
            .add_modifier(Modifier::BOLD),
    );
    let table = Table::new(rows, cols.iter().map(|c| c.width))
        .header(header)
        .block(block)
        .row_highlight_style(
            Style::default()
                .fg(app.theme.highlight_fg)
                .bg(app.theme.highlight_bg)
                .add_modifier(Modifier::BOLD),
        )
        .column_spacing(1);

    let mut state = TableState::default().with_selected(Some(app.selected_row));
    f.render_stateful_widget(table, area, &mut state);
}

pub fn render_record_details(f: &mut Frame, area: Rect, app: &AppState) {
    let ctl = app.active();
    let text = match ctl.rows().get(app.selected_row) {
        Some(record) => {
            let mut lines = vec![format!("Id: {}", record.id)];
            for c in columns(ctl.kind()) {
                lines.push(format!("{}: {}", c.title, (c.cell)(record)));
            }
            if let Some(photo) = record.photo() {
                lines.push(format!("PHOTO: {}", photo.url(&app.image_base)));
            }
            if let (ResourceKind::Posts, Some(body)) = (ctl.kind(), record.text("description")) {
                lines.push(String::new());
                lines.push(body);
            }
            lines.join("\n")
        }
        None => String::new(),
    };
    let p = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .style(Style::default().fg(app.theme.text))
        .block(
            Block::default()
                .title("Details")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        );
    f.render_widget(p, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user(fields: serde_json::Value) -> Record {
        serde_json::from_value(fields).unwrap()
    }

    #[test]
    fn missing_contact_fields_show_placeholders() {
        let r = user(json!({"_id": "u1", "first_name": "Ann", "last_name": "Lee"}));
        let cells: Vec<String> = USER_COLUMNS.iter().map(|c| (c.cell)(&r)).collect();
        assert_eq!(cells, vec!["Ann Lee", "", "No data?", "No Email!", "Address was not given"]);
    }

    #[test]
    fn label_falls_back_to_id() {
        let r = user(json!({"_id": "p9"}));
        assert_eq!(label(ResourceKind::Posts, &r), "p9");
    }
}
