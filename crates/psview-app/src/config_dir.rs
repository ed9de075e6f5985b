// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Configuration file location.

use std::ffi::OsString;
use std::path::PathBuf;

const CONFIG_FILE: &str = "config.json";

/// Default configuration file path: `$XDG_CONFIG_HOME/psview/config.json`,
/// else `~/.config/psview/config.json`.
pub fn default_config_path() -> Option<PathBuf> {
    config_dir_from(
        std::env::var_os("XDG_CONFIG_HOME"),
        std::env::var_os("HOME"),
    )
    .map(|dir| dir.join(CONFIG_FILE))
}

fn config_dir_from(xdg: Option<OsString>, home: Option<OsString>) -> Option<PathBuf> {
    // An empty XDG_CONFIG_HOME counts as unset.
    if let Some(xdg) = xdg.filter(|value| !value.is_empty()) {
        return Some(PathBuf::from(xdg).join("psview"));
    }
    home.filter(|value| !value.is_empty())
        .map(|home| PathBuf::from(home).join(".config").join("psview"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xdg_takes_precedence() {
        let dir = config_dir_from(Some("/xdg".into()), Some("/home/ada".into()));
        assert_eq!(dir, Some(PathBuf::from("/xdg/psview")));
    }

    #[test]
    fn home_fallback() {
        let dir = config_dir_from(Some("".into()), Some("/home/ada".into()));
        assert_eq!(dir, Some(PathBuf::from("/home/ada/.config/psview")));
    }

    #[test]
    fn nothing_to_go_on() {
        assert_eq!(config_dir_from(None, None), None);
    }
}
