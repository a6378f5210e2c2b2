//! Application state types and entry glue.
//!
//! Defines the state the TUI renders from: one [`ListController`] per tab, the
//! search prompt, the form focus, dialogs and the status-bar notice. The event loop
//! lives in [`update`] (re-exported as `run`).
//!
pub mod conf;
pub mod connection;
pub mod keymap;
pub mod update;

use ratatui::style::Color;
use std::time::{Duration, Instant};

use crate::controller::{ListController, Notice, PendingRemoval};
use crate::effects::Command;
use crate::form::{FieldSpec, schema};
use crate::model::ResourceKind;
use crate::search::SearchInput;
use connection::ConnectionConfig;
use keymap::Keymap;

/// How long a notice stays in the status bar.
pub const NOTICE_TTL: Duration = Duration::from_secs(4);

/// Current input mode for key handling outside dialogs and the form.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
}

/// Color palette for theming the TUI.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Theme {
    pub text: Color,
    pub muted: Color,
    pub title: Color,
    pub border: Color,
    pub header_bg: Color,
    pub header_fg: Color,
    pub status_bg: Color,
    pub status_fg: Color,
    pub highlight_fg: Color,
    pub highlight_bg: Color,
    pub success: Color,
    pub error: Color,
}

impl Theme {
    /// Dark default theme for terminals without true color.
    pub fn dark() -> Self {
        Self {
            text: Color::Gray,
            muted: Color::DarkGray,
            title: Color::Cyan,
            border: Color::Gray,
            header_bg: Color::Black,
            header_fg: Color::Cyan,
            status_bg: Color::DarkGray,
            status_fg: Color::Black,
            highlight_fg: Color::Yellow,
            highlight_bg: Color::Reset,
            success: Color::Green,
            error: Color::Red,
        }
    }

    /// Catppuccin Mocha theme defaults.
    pub fn mocha() -> Self {
        // Palette reference: https://github.com/catppuccin/catppuccin
        Self {
            text: Color::Rgb(0xcd, 0xd6, 0xf4),         // text
            muted: Color::Rgb(0x7f, 0x84, 0x9c),        // overlay1
            title: Color::Rgb(0xcb, 0xa6, 0xf7),        // mauve
            border: Color::Rgb(0x58, 0x5b, 0x70),       // surface2
            header_bg: Color::Rgb(0x31, 0x32, 0x44),    // surface0
            header_fg: Color::Rgb(0xb4, 0xbe, 0xfe),    // lavender
            status_bg: Color::Rgb(0x45, 0x47, 0x5a),    // surface1
            status_fg: Color::Rgb(0xcd, 0xd6, 0xf4),    // text
            highlight_fg: Color::Rgb(0xf9, 0xe2, 0xaf), // yellow
            highlight_bg: Color::Rgb(0x45, 0x47, 0x5a), // surface1
            success: Color::Rgb(0xa6, 0xe3, 0xa1),      // green
            error: Color::Rgb(0xf3, 0x8b, 0xa8),        // red
        }
    }

    /// Theme by name as accepted in `theme.conf` (`base = dark`).
    fn base(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "dark" => Self::dark(),
            _ => Self::mocha(),
        }
    }

    pub fn from_file(path: &str) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        Some(Self::parse(&contents))
    }

    /// Unknown keys and unparsable colors leave the base theme's value.
    pub fn parse(contents: &str) -> Self {
        let entries: Vec<(&str, &str)> = conf::entries(contents).collect();
        let mut theme = entries
            .iter()
            .find(|(k, _)| *k == "base")
            .map(|(_, v)| Self::base(v))
            .unwrap_or_else(Self::mocha);

        for (key, val) in entries {
            let Some(color) = Self::parse_color(val) else {
                continue;
            };
            match key {
                "text" => theme.text = color,
                "muted" => theme.muted = color,
                "title" => theme.title = color,
                "border" => theme.border = color,
                "header_bg" => theme.header_bg = color,
                "header_fg" => theme.header_fg = color,
                "status_bg" => theme.status_bg = color,
                "status_fg" => theme.status_fg = color,
                "highlight_fg" => theme.highlight_fg = color,
                "highlight_bg" => theme.highlight_bg = color,
                "success" => theme.success = color,
                "error" => theme.error = color,
                _ => {}
            }
        }
        theme
    }

    /// Parse a color from hex ("#RRGGBB" or "RRGGBB") or "reset".
    fn parse_color(s: &str) -> Option<Color> {
        let lower = s.trim().to_ascii_lowercase();
        if lower == "reset" {
            return Some(Color::Reset);
        }
        let hex = lower.strip_prefix('#').unwrap_or(lower.as_str());
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    fn color_to_str(c: Color) -> String {
        match c {
            Color::Rgb(r, g, b) => format!("#{:02X}{:02X}{:02X}", r, g, b),
            Color::Black => "#000000".to_string(),
            Color::Red => "#FF0000".to_string(),
            Color::Green => "#00FF00".to_string(),
            Color::Yellow => "#FFFF00".to_string(),
            Color::Cyan => "#00FFFF".to_string(),
            Color::Gray => "#B3B3B3".to_string(),
            Color::DarkGray => "#4D4D4D".to_string(),
            Color::White => "#FFFFFF".to_string(),
            _ => "reset".to_string(),
        }
    }

    /// Persist the theme to a config file in key=value format.
    pub fn write_file(&self, path: &str) -> std::io::Result<()> {
        use std::fmt::Write as _;
        let mut buf = String::new();
        buf.push_str("# records-console theme configuration\n");
        buf.push_str("# Colors: hex as #RRGGBB or RRGGBB, or 'reset'\n");
        buf.push_str("# base = mocha | dark   (start from a built-in palette)\n\n");

        for (k, v) in [
            ("text", self.text),
            ("muted", self.muted),
            ("title", self.title),
            ("border", self.border),
            ("header_bg", self.header_bg),
            ("header_fg", self.header_fg),
            ("status_bg", self.status_bg),
            ("status_fg", self.status_fg),
            ("highlight_fg", self.highlight_fg),
            ("highlight_bg", self.highlight_bg),
            ("success", self.success),
            ("error", self.error),
        ] {
            let _ = writeln!(&mut buf, "{} = {}", k, Self::color_to_str(v));
        }
        std::fs::write(path, buf)
    }

    /// Load `path` or the first `theme.conf` in the config directories; if none
    /// exists, write `mocha` to `path` and return it.
    pub fn load_or_init(path: &str) -> Self {
        if std::path::Path::new(path).exists() {
            return Self::from_file(path).unwrap_or_else(Self::mocha);
        }
        if let Some(existing) = conf::config_file_read_path("theme.conf") {
            return Self::from_file(&existing).unwrap_or_else(Self::mocha);
        }
        let t = Self::mocha();
        let _ = t.write_file(path);
        t
    }
}

/// Dialogs drawn over the list screen. The create/edit form is not one of them:
/// its visibility is owned by the active tab's controller.
#[derive(Debug)]
pub enum ModalState {
    DeleteConfirm {
        /// 0 = Delete, 1 = Cancel.
        selected: usize,
        pending: PendingRemoval,
        label: String,
    },
    Help,
}

pub struct AppState {
    pub users: ListController,
    pub posts: ListController,
    pub active_tab: ResourceKind,
    /// Highlighted row within the page on screen.
    pub selected_row: usize,
    pub input_mode: InputMode,
    pub search: SearchInput,
    pub search_debounce: Duration,
    pub theme: Theme,
    pub keymap: Keymap,
    pub modal: Option<ModalState>,
    /// Index into the active form schema.
    pub form_focus: usize,
    /// Latest notice and when it was raised.
    pub notice: Option<(Notice, Instant)>,
    /// Prefix for photo URLs shown in the details panel.
    pub image_base: String,
    pub offline: bool,
    pub running: bool,
}

impl AppState {
    pub fn new(cfg: &ConnectionConfig, start_tab: ResourceKind, theme: Theme, keymap: Keymap) -> Self {
        Self {
            users: ListController::new(ResourceKind::Users, cfg.page_size, cfg.image_url.as_str()),
            posts: ListController::new(ResourceKind::Posts, cfg.page_size, cfg.image_url.as_str()),
            active_tab: start_tab,
            selected_row: 0,
            input_mode: InputMode::Normal,
            search: SearchInput::default(),
            search_debounce: cfg.search_debounce(),
            theme,
            keymap,
            modal: None,
            form_focus: 0,
            notice: None,
            image_base: cfg.image_url.clone(),
            offline: cfg.offline,
            running: true,
        }
    }

    pub fn controller(&self, kind: ResourceKind) -> &ListController {
        match kind {
            ResourceKind::Users => &self.users,
            ResourceKind::Posts => &self.posts,
        }
    }

    pub fn controller_mut(&mut self, kind: ResourceKind) -> &mut ListController {
        match kind {
            ResourceKind::Users => &mut self.users,
            ResourceKind::Posts => &mut self.posts,
        }
    }

    pub fn active(&self) -> &ListController {
        self.controller(self.active_tab)
    }

    pub fn active_mut(&mut self) -> &mut ListController {
        self.controller_mut(self.active_tab)
    }

    /// First fetch of every tab.
    pub fn initial_loads(&mut self) -> Vec<(ResourceKind, Command)> {
        ResourceKind::ALL
            .into_iter()
            .map(|kind| (kind, self.controller_mut(kind).load()))
            .collect()
    }

    /// Field under the form cursor.
    pub fn focused_field(&self) -> Option<&'static FieldSpec> {
        schema(self.active_tab).get(self.form_focus)
    }

    /// Move pending notices of both controllers into the status bar; the newest wins.
    pub fn collect_notices(&mut self, now: Instant) {
        let mut notices = self.users.take_notices();
        notices.extend(self.posts.take_notices());
        if let Some(last) = notices.pop() {
            self.notice = Some((last, now));
        }
    }

    /// Time-driven work: apply a search whose typing paused, expire the notice.
    pub fn tick(&mut self, now: Instant) -> Vec<Command> {
        if let Some((_, at)) = &self.notice
            && now.duration_since(*at) >= NOTICE_TTL
        {
            self.notice = None;
        }
        if self.input_mode != InputMode::Search {
            return Vec::new();
        }
        let debounce = self.search_debounce;
        match self.search.due(now, debounce) {
            Some(text) => self.apply_search(&text),
            None => Vec::new(),
        }
    }

    /// Filter the active tab; the highlight returns to the top row.
    pub fn apply_search(&mut self, text: &str) -> Vec<Command> {
        let cmd = self.active_mut().set_search(text);
        if cmd.is_some() {
            self.selected_row = 0;
        }
        cmd.into_iter().collect()
    }

    /// Keep the highlight inside the rows currently on screen.
    pub fn clamp_selection(&mut self) {
        let len = self.active().rows().len();
        self.selected_row = self.selected_row.min(len.saturating_sub(1));
    }
}

/// Re-export the application event loop entry function.
pub use update::run_app as run;
