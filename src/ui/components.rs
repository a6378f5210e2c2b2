//! Shared UI components (status bar, modal helpers).
//!
//! Contains small building blocks reused by the list screen and its dialogs.
//!
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::app::keymap::KeyAction;
use crate::app::{AppState, InputMode, ModalState};
use crate::controller::NoticeLevel;

/// Render the bottom status bar with mode, paging and the latest notice.
pub fn render_status_bar(f: &mut Frame, area: Rect, app: &AppState) {
    let ctl = app.active();
    let mode = if app.modal.is_some() {
        "DIALOG"
    } else if ctl.phase().is_open() {
        "FORM"
    } else if ctl.pending_edit().is_some() {
        "FETCHING"
    } else {
        match app.input_mode {
            InputMode::Normal => "NORMAL",
            InputMode::Search => "SEARCH",
        }
    };
    let offline = if app.offline { "  [offline]" } else { "" };
    let mut spans = vec![Span::raw(format!(
        "mode: {mode}  page {}/{}  total:{}{offline}",
        ctl.query().page(),
        ctl.total_pages(),
        ctl.total_items(),
    ))];
    if let Some((notice, _)) = &app.notice {
        let color = match notice.level {
            NoticeLevel::Success => app.theme.success,
            NoticeLevel::Error => app.theme.error,
        };
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            notice.message.clone(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
    }
    let p = Paragraph::new(Line::from(spans)).style(
        Style::default()
            .fg(app.theme.status_fg)
            .bg(app.theme.status_bg),
    );
    f.render_widget(p, area);
}

/// Compute a rectangle centered within `area` with a maximum size.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Render the delete confirmation dialog.
pub fn render_delete_modal(f: &mut Frame, area: Rect, app: &AppState, state: &ModalState) {
    if let ModalState::DeleteConfirm {
        selected, label, ..
    } = state
    {
        let noun = app.active().kind().singular().to_lowercase();
        let width = 56u16.min(area.width.saturating_sub(4)).max(30);
        let rect = centered_rect(width, 7, area);
        let button = |idx: usize, text: &str| {
            if idx == *selected {
                Span::styled(
                    format!("[ {text} ]"),
                    Style::default()
                        .fg(app.theme.highlight_fg)
                        .add_modifier(Modifier::BOLD | Modifier::REVERSED),
                )
            } else {
                Span::raw(format!("  {text}  "))
            }
        };
        let lines = vec![
            Line::raw(format!("Delete {noun} '{label}'?")),
            Line::raw("This cannot be undone."),
            Line::raw(""),
            Line::from(vec![button(0, "Delete"), Span::raw("   "), button(1, "Cancel")]),
        ];
        let p = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
            Block::default()
                .title("Confirm delete")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.error)),
        );
        f.render_widget(Clear, rect);
        f.render_widget(p, rect);
    }
}

/// Render the help modal: configurable bindings from the keymap, then the fixed keys.
pub fn render_help_modal(f: &mut Frame, area: Rect, app: &AppState) {
    let width = 72u16.min(area.width.saturating_sub(4)).max(40);
    let height = 26u16.min(area.height.saturating_sub(2));
    let rect = centered_rect(width, height, area);

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let italic = Style::default().add_modifier(Modifier::ITALIC);
    let row = |label: &str, keys: String| {
        Line::from(vec![
            Span::raw(format!("  {:>18} │ ", label)),
            Span::styled(keys, italic),
        ])
    };

    let mut lines: Vec<Line> = vec![Line::from(Span::styled("List:", bold))];
    for (action, label) in [
        (KeyAction::MoveUp, "Move up"),
        (KeyAction::MoveDown, "Move down"),
        (KeyAction::PrevPage, "Previous page"),
        (KeyAction::NextPage, "Next page"),
        (KeyAction::StartSearch, "Search"),
        (KeyAction::NewRecord, "New record"),
        (KeyAction::EditSelection, "Edit"),
        (KeyAction::DeleteSelection, "Delete"),
        (KeyAction::Reload, "Reload"),
        (KeyAction::SwitchTab, "Switch tab"),
        (KeyAction::OpenHelp, "Help"),
        (KeyAction::Quit, "Quit"),
    ] {
        lines.push(row(label, app.keymap.keys_for(action).join(", ")));
    }

    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled("Search prompt:", bold)));
    lines.push(row("Apply now", "Enter (typing applies after a pause)".into()));
    lines.push(row("Leave", "Esc".into()));

    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled("Form:", bold)));
    lines.push(row("Move between fields", "Up, Down, Tab".into()));
    lines.push(row("Save", "Ctrl+S".into()));
    lines.push(row("Upload image", "Enter on the Image field".into()));
    lines.push(row("Close", "Esc".into()));

    let p = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .title("Help (Esc to close)")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_is_clamped_to_area() {
        let area = Rect::new(0, 0, 20, 10);
        assert_eq!(centered_rect(10, 4, area), Rect::new(5, 3, 10, 4));
        assert_eq!(centered_rect(40, 40, area), Rect::new(0, 0, 20, 10));
    }
}
