//! Create/edit form modal.
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use super::components::centered_rect;
use crate::app::AppState;
use crate::controller::ModalPhase;
use crate::form::{FieldKind, schema};

pub fn render_form_modal(f: &mut Frame, area: Rect, app: &AppState) {
    let ctl = app.active();
    let kind = ctl.kind();
    let title = match ctl.phase() {
        ModalPhase::OpenForEdit(id) => format!("Edit {} {}", kind.singular(), id),
        _ => format!("New {}", kind.singular()),
    };
    let fields = schema(kind);
    let width = 72u16.min(area.width.saturating_sub(4)).max(40);
    let height = (fields.len() as u16 + 9).min(area.height.saturating_sub(2));
    let rect = centered_rect(width, height, area);

    let label_w = fields.iter().map(|s| s.label.len()).max().unwrap_or(0);
    let draft = ctl.draft();
    let mut lines: Vec<Line> = Vec::with_capacity(fields.len() + 6);
    for (i, spec) in fields.iter().enumerate() {
        let focused = i == app.form_focus;
        let raw = draft.get(spec.key);
        let value = match spec.kind {
            FieldKind::Secret => "*".repeat(raw.chars().count()),
            // Only the first line fits the row; the rest stays in the draft.
            FieldKind::Multiline => {
                let extra = raw.lines().count().saturating_sub(1);
                let first = raw.lines().next().unwrap_or("");
                if extra > 0 {
                    format!("{first} (+{extra} lines)")
                } else {
                    first.to_string()
                }
            }
            _ => raw.to_string(),
        };
        let marker = if focused { "▶" } else { " " };
        let required = if spec.required { "*" } else { " " };
        let style = if focused {
            Style::default()
                .fg(app.theme.highlight_fg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.text)
        };
        let cursor = if focused { "_" } else { "" };
        lines.push(Line::from(vec![
            Span::styled(
                format!("{marker} {:>w$}{required} ", spec.label, w = label_w),
                style,
            ),
            Span::styled(format!("{value}{cursor}"), Style::default().fg(app.theme.text)),
        ]));
    }

    lines.push(Line::raw(""));
    let photo = if ctl.uploading() {
        "uploading…".to_string()
    } else {
        ctl.photo_preview().unwrap_or("none").to_string()
    };
    lines.push(Line::from(Span::styled(
        format!("Image: {photo}"),
        Style::default().fg(app.theme.muted),
    )));
    if ctl.submitting() {
        lines.push(Line::from(Span::styled(
            "Saving…",
            Style::default().fg(app.theme.muted),
        )));
    }
    lines.push(Line::from(Span::styled(
        "Ctrl+S save  Esc close  Up/Down move  Enter on Image uploads the typed path",
        Style::default()
            .fg(app.theme.muted)
            .add_modifier(Modifier::ITALIC),
    )));

    let p = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}
