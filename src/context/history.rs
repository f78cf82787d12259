//! Recent shell history, read from the user's history file.
//!
//! Gives the model a view of what was run just before the failure. Bash,
//! zsh (plain and extended) and fish history formats are understood.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Maximum number of commands to keep while scanning the file.
const MAX_HISTORY_SIZE: usize = 1000;

#[derive(Clone, Debug, Default)]
pub struct History {
    commands: Vec<String>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a history file. Missing or unreadable files give an empty
    /// history; this context is best effort.
    pub fn load(path: &Path) -> Self {
        match fs::read(path) {
            Ok(bytes) => Self::parse(&String::from_utf8_lossy(&bytes)),
            Err(e) => {
                debug!("could not read history file {}: {}", path.display(), e);
                Self::new()
            }
        }
    }

    pub fn parse(contents: &str) -> Self {
        let mut history = Self::new();
        for line in contents.lines() {
            if let Some(cmd) = parse_line(line) {
                history.push(cmd.to_string());
            }
        }
        history
    }

    /// Add a command to history.
    /// Skips empty commands and duplicates of the last command.
    pub fn push(&mut self, cmd: String) {
        let trimmed = cmd.trim();
        if trimmed.is_empty() {
            return;
        }

        // Skip if it's a duplicate of the last command
        if self.commands.last().map(|s| s.as_str()) == Some(trimmed) {
            return;
        }

        self.commands.push(trimmed.to_string());

        if self.commands.len() > MAX_HISTORY_SIZE {
            self.commands.remove(0);
        }
    }

    /// Get the most recent n commands.
    pub fn recent(&self, n: usize) -> Vec<String> {
        let len = self.commands.len();
        let start = len.saturating_sub(n);
        self.commands[start..].to_vec()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Extract the command from one history line, if it holds one.
fn parse_line(line: &str) -> Option<&str> {
    let line = line.trim_end();

    // zsh extended: ": 1700000000:0;git status"
    if let Some(rest) = line.strip_prefix(": ") {
        if let Some((stamp, cmd)) = rest.split_once(';') {
            if stamp.split(':').all(|p| p.chars().all(|c| c.is_ascii_digit())) {
                return Some(cmd);
            }
        }
    }

    // fish: "- cmd: git status" (followed by "  when: ..." lines)
    if let Some(cmd) = line.strip_prefix("- cmd: ") {
        return Some(cmd);
    }
    if line.starts_with("  when:") || line.starts_with("  paths:") || line.starts_with("    - ") {
        return None;
    }

    // bash HISTTIMEFORMAT stamps: "#1700000000"
    if let Some(stamp) = line.strip_prefix('#') {
        if !stamp.is_empty() && stamp.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
    }

    Some(line)
}

/// Locate the history file.
///
/// Order: explicit path, `$HISTFILE`, the file matching `$SHELL`, then the
/// first known file that exists.
pub fn find_history_file(
    explicit: Option<&Path>,
    lookup: impl Fn(&str) -> Option<String>,
    home: Option<&Path>,
) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(histfile) = lookup("HISTFILE").filter(|v| !v.trim().is_empty()) {
        return Some(PathBuf::from(histfile));
    }

    let home = home?;
    let zsh = home.join(".zsh_history");
    let fish = home.join(".local").join("share").join("fish").join("fish_history");
    let bash = home.join(".bash_history");

    let shell = lookup("SHELL").unwrap_or_default();
    let preferred = match Path::new(&shell).file_name().and_then(|n| n.to_str()) {
        Some("zsh") => Some(&zsh),
        Some("fish") => Some(&fish),
        Some("bash") => Some(&bash),
        _ => None,
    };
    if let Some(path) = preferred.filter(|p| p.exists()) {
        return Some(path.clone());
    }

    [zsh, bash, fish].into_iter().find(|p| p.exists())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bash_history_with_timestamps() {
        let history = History::parse("#1700000000\nls -la\n#1700000001\ncd src\n\ncd src\n");
        assert_eq!(history.recent(10), vec!["ls -la", "cd src"]);
    }

    #[test]
    fn test_zsh_extended_history() {
        let history = History::parse(": 1700000000:0;git status\n: 1700000005:2;cargo build\n");
        assert_eq!(history.recent(10), vec!["git status", "cargo build"]);
    }

    #[test]
    fn test_fish_history() {
        let contents = "- cmd: ls\n  when: 1700000000\n- cmd: cat notes.txt\n  when: 1700000001\n  paths:\n    - notes.txt\n";
        let history = History::parse(contents);
        assert_eq!(history.recent(10), vec!["ls", "cat notes.txt"]);
    }

    #[test]
    fn test_recent_takes_tail() {
        let mut history = History::new();
        for i in 0..5 {
            history.push(format!("cmd {i}"));
        }
        assert_eq!(history.recent(2), vec!["cmd 3", "cmd 4"]);
        assert_eq!(history.recent(0), Vec::<String>::new());
        assert_eq!(history.len(), 5);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let history = History::load(Path::new("/definitely/not/here/.bash_history"));
        assert!(history.is_empty());
    }

    #[test]
    fn test_find_prefers_histfile_then_shell() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".bash_history"), "ls\n").unwrap();
        fs::write(dir.path().join(".zsh_history"), "ls\n").unwrap();

        let found = find_history_file(
            None,
            |name| (name == "HISTFILE").then(|| "/tmp/custom_history".to_string()),
            Some(dir.path()),
        );
        assert_eq!(found, Some(PathBuf::from("/tmp/custom_history")));

        let found = find_history_file(
            None,
            |name| (name == "SHELL").then(|| "/bin/bash".to_string()),
            Some(dir.path()),
        );
        assert_eq!(found, Some(dir.path().join(".bash_history")));

        let found = find_history_file(None, |_| None, Some(dir.path()));
        assert_eq!(found, Some(dir.path().join(".zsh_history")));
    }

    #[test]
    fn test_find_none_without_home() {
        assert_eq!(find_history_file(None, |_| None, None), None);
    }
}
