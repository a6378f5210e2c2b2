//! Event loop and key handling.
//!
//! Each iteration settles finished API calls into their controllers, runs
//! time-driven work, draws, then waits briefly for a key. Key handlers only touch
//! state and return the [`Command`]s to spawn.
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::Terminal;
use ratatui::backend::Backend;
use std::time::{Duration, Instant};

use crate::app::keymap::KeyAction;
use crate::app::{AppState, InputMode, ModalState};
use crate::effects::{Command, Effects};
use crate::error::ValidationError;
use crate::form::{FieldKind, schema};
use crate::model::{RecordId, ResourceKind};
use crate::ui;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut AppState,
    effects: &mut Effects,
) -> Result<()> {
    for (kind, cmd) in app.initial_loads() {
        effects.dispatch(kind, [cmd]);
    }

    while app.running {
        settle(app, effects);
        let kind = app.active_tab;
        let due = app.tick(Instant::now());
        effects.dispatch(kind, due);

        terminal.draw(|f| ui::render(f, app))?;

        if event::poll(POLL_INTERVAL)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            let kind = app.active_tab;
            let cmds = handle_key(app, key);
            effects.dispatch(kind, cmds);
        }
    }
    Ok(())
}

/// Feed every finished call back into its controller and spawn the follow-ups.
pub fn settle(app: &mut AppState, effects: &mut Effects) {
    while let Some((kind, outcome)) = effects.try_next() {
        let follow = app.controller_mut(kind).apply(outcome);
        effects.dispatch(kind, follow);
    }
    app.clamp_selection();
    app.collect_notices(Instant::now());
}

/// Route a key press: dialog first, then the open form, then the search prompt.
pub fn handle_key(app: &mut AppState, key: KeyEvent) -> Vec<Command> {
    if app.modal.is_some() {
        return handle_modal_key(app, key);
    }
    if app.active().phase().is_open() {
        return handle_form_key(app, key);
    }
    match app.input_mode {
        InputMode::Search => handle_search_key(app, key),
        InputMode::Normal => handle_normal_key(app, key),
    }
}

fn highlighted_id(app: &AppState) -> Option<RecordId> {
    app.active().rows().get(app.selected_row).map(|r| r.id.clone())
}

fn handle_normal_key(app: &mut AppState, key: KeyEvent) -> Vec<Command> {
    if key.code == KeyCode::Esc {
        // Abandons an edit whose record has not arrived yet.
        app.active_mut().close();
        return Vec::new();
    }
    let Some(action) = app.keymap.resolve(&key) else {
        return Vec::new();
    };
    match action {
        KeyAction::Quit => app.running = false,
        KeyAction::OpenHelp => app.modal = Some(ModalState::Help),
        KeyAction::StartSearch => {
            let applied = app.active().query().search().to_string();
            app.search.begin(&applied);
            app.input_mode = InputMode::Search;
        }
        KeyAction::NewRecord => {
            app.form_focus = 0;
            app.active_mut().open_for_create();
        }
        KeyAction::EditSelection => {
            if let Some(id) = highlighted_id(app) {
                app.form_focus = 0;
                return vec![app.active_mut().open_for_edit(id)];
            }
        }
        KeyAction::DeleteSelection => {
            let kind = app.active_tab;
            if let Some(record) = app.active().rows().get(app.selected_row) {
                let label = ui::records::label(kind, record);
                let pending = app.active().request_remove(record.id.clone());
                app.modal = Some(ModalState::DeleteConfirm {
                    selected: 1,
                    pending,
                    label,
                });
            }
        }
        KeyAction::SwitchTab => {
            app.active_tab = match app.active_tab {
                ResourceKind::Users => ResourceKind::Posts,
                ResourceKind::Posts => ResourceKind::Users,
            };
            app.selected_row = 0;
        }
        KeyAction::Reload => return vec![app.active_mut().load()],
        KeyAction::MoveUp => app.selected_row = app.selected_row.saturating_sub(1),
        KeyAction::MoveDown => {
            if app.selected_row + 1 < app.active().rows().len() {
                app.selected_row += 1;
            }
        }
        KeyAction::PrevPage | KeyAction::NextPage => {
            let ctl = app.active_mut();
            let cmd = if action == KeyAction::PrevPage {
                ctl.prev_page()
            } else {
                ctl.next_page()
            };
            if cmd.is_some() {
                app.selected_row = 0;
            }
            return cmd.into_iter().collect();
        }
        KeyAction::Ignore => {}
    }
    Vec::new()
}

fn handle_search_key(app: &mut AppState, key: KeyEvent) -> Vec<Command> {
    let now = Instant::now();
    match key.code {
        KeyCode::Enter => {
            app.input_mode = InputMode::Normal;
            let text = app.search.commit();
            return app.apply_search(&text);
        }
        KeyCode::Esc => {
            app.search.revert();
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Backspace => app.search.pop(now),
        KeyCode::Char(c) => app.search.push(c, now),
        _ => {}
    }
    Vec::new()
}

fn handle_form_key(app: &mut AppState, key: KeyEvent) -> Vec<Command> {
    let fields = schema(app.active_tab);
    let len = fields.len();
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        if key.code == KeyCode::Char('s') {
            return match app.active_mut().submit() {
                Ok(cmd) => cmd.into_iter().collect(),
                Err(err) => {
                    let label = match err {
                        ValidationError::MissingField { field }
                        | ValidationError::InvalidDate { field, .. } => field,
                    };
                    if let Some(i) = fields.iter().position(|f| f.label == label) {
                        app.form_focus = i;
                    }
                    Vec::new()
                }
            };
        }
        return Vec::new();
    }
    let Some(spec) = fields.get(app.form_focus).copied() else {
        app.form_focus = 0;
        return Vec::new();
    };
    match key.code {
        KeyCode::Esc => app.active_mut().close(),
        KeyCode::Up | KeyCode::BackTab => app.form_focus = (app.form_focus + len - 1) % len,
        KeyCode::Down | KeyCode::Tab => app.form_focus = (app.form_focus + 1) % len,
        KeyCode::Enter => match spec.kind {
            FieldKind::Photo => {
                let ctl = app.active_mut();
                let path = ctl.draft().get(spec.key).trim().to_string();
                return ctl.attach_photo(path).into_iter().collect();
            }
            FieldKind::Multiline => app.active_mut().draft_mut().value_mut(spec.key).push('\n'),
            _ => app.form_focus = (app.form_focus + 1) % len,
        },
        KeyCode::Backspace => {
            app.active_mut().draft_mut().value_mut(spec.key).pop();
        }
        KeyCode::Char(c) => app.active_mut().draft_mut().value_mut(spec.key).push(c),
        _ => {}
    }
    Vec::new()
}

fn handle_modal_key(app: &mut AppState, key: KeyEvent) -> Vec<Command> {
    match app.modal.take() {
        Some(ModalState::Help) => {
            if !matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('?' | 'q')) {
                app.modal = Some(ModalState::Help);
            }
            Vec::new()
        }
        Some(ModalState::DeleteConfirm {
            selected,
            pending,
            label,
        }) => match key.code {
            KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::Char('h' | 'l') => {
                app.modal = Some(ModalState::DeleteConfirm {
                    selected: 1 - selected.min(1),
                    pending,
                    label,
                });
                Vec::new()
            }
            KeyCode::Enter if selected == 0 => vec![app.active_mut().confirm_remove(pending)],
            KeyCode::Char('y') => vec![app.active_mut().confirm_remove(pending)],
            KeyCode::Enter | KeyCode::Esc | KeyCode::Char('n') => {
                app.active_mut().cancel_remove(pending);
                Vec::new()
            }
            _ => {
                app.modal = Some(ModalState::DeleteConfirm {
                    selected,
                    pending,
                    label,
                });
                Vec::new()
            }
        },
        None => Vec::new(),
    }
}
