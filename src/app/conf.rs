//! Shared handling of the `key = value` config files (`theme.conf`, `keybinds.conf`,
//! `connection.conf`): where they live and how lines are split.
use std::path::PathBuf;

const APP_DIR: &str = "records-console";

/// Candidate directories, most specific first.
fn config_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        dirs.push(PathBuf::from(xdg).join(APP_DIR));
    }
    if let Some(home) = std::env::var_os("HOME").filter(|v| !v.is_empty()) {
        dirs.push(PathBuf::from(home).join(".config").join(APP_DIR));
    }
    dirs
}

/// First existing `name` in the config directories, then the working directory.
pub fn config_file_read_path(name: &str) -> Option<String> {
    config_dirs()
        .into_iter()
        .map(|d| d.join(name))
        .chain(std::iter::once(PathBuf::from(name)))
        .find(|p| p.is_file())
        .map(|p| p.to_string_lossy().into_owned())
}

/// Where a fresh `name` should be written: the first config directory that can be
/// created, or the working directory.
pub fn config_file_write_path(name: &str) -> String {
    for dir in config_dirs() {
        if std::fs::create_dir_all(&dir).is_ok() {
            return dir.join(name).to_string_lossy().into_owned();
        }
    }
    name.to_string()
}

/// Non-empty `(key, value)` pairs of a config file body, comments skipped.
pub fn entries(contents: &str) -> impl Iterator<Item = (&str, &str)> {
    contents.lines().filter_map(|raw| {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        let (key, value) = line.split_once('=')?;
        let (key, value) = (key.trim(), value.trim());
        (!key.is_empty() && !value.is_empty()).then_some((key, value))
    })
}

pub fn parse_bool(s: &str) -> bool {
    matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_skip_comments_blank_and_valueless_lines() {
        let body = "# header\n\napi_url = http://x/\nbroken\nempty =\n page_size=5 \n";
        let got: Vec<_> = entries(body).collect();
        assert_eq!(got, vec![("api_url", "http://x/"), ("page_size", "5")]);
    }

    #[test]
    fn values_may_contain_equals() {
        let got: Vec<_> = entries("token = a=b=c").collect();
        assert_eq!(got, vec![("token", "a=b=c")]);
    }

    #[test]
    fn bool_spellings() {
        assert!(parse_bool("Yes"));
        assert!(parse_bool("1"));
        assert!(!parse_bool("off"));
    }
}
