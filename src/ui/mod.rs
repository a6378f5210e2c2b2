//! Rendering of the whole screen from [`AppState`].
pub mod components;
pub mod form;
pub mod records;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::{AppState, InputMode, ModalState};
use crate::model::ResourceKind;

pub fn render(f: &mut Frame, app: &AppState) {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5), Constraint::Length(1)])
        .split(f.area());
    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(root[1]);

    let mut header = Vec::new();
    for kind in ResourceKind::ALL {
        let name = kind.plural();
        if kind == app.active_tab {
            header.push(Span::styled(
                format!("[{name}]"),
                Style::default().fg(app.theme.title),
            ));
        } else {
            header.push(Span::raw(format!(" {name} ")));
        }
        header.push(Span::raw(" "));
    }
    let applied = app.active().query().search();
    let prompt = match app.input_mode {
        InputMode::Search => format!("  Search: {}_", app.search.text()),
        InputMode::Normal if !applied.is_empty() => format!("  filter: \"{applied}\""),
        InputMode::Normal => "  /: search  n: new  Enter: edit  Delete: remove  ?: help".to_string(),
    };
    header.push(Span::raw(prompt));
    let p = Paragraph::new(Line::from(header))
        .block(
            Block::default()
                .title("records-console")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .style(Style::default().fg(app.theme.header_fg).bg(app.theme.header_bg));
    f.render_widget(p, root[0]);

    records::render_records_table(f, body[0], app);
    records::render_record_details(f, body[1], app);
    components::render_status_bar(f, root[2], app);

    let area = f.area();
    if app.active().phase().is_open() {
        form::render_form_modal(f, area, app);
    }
    match &app.modal {
        Some(state @ ModalState::DeleteConfirm { .. }) => {
            components::render_delete_modal(f, area, app, state)
        }
        Some(ModalState::Help) => components::render_help_modal(f, area, app),
        None => {}
    }
}
