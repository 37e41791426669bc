use std::io::{self, BufRead, Write};

use serde::Serialize;
use tmuxdir_core::{SessionRecord, WindowRecord};

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize output: {}", e),
    }
}

pub fn session_row(session: &SessionRecord) -> String {
    let marker = if session.attached { '*' } else { ' ' };
    format!(
        "{} {:<20} {:>3} win {:>3} pane  {}",
        marker, session.name, session.window_count, session.pane_count, session.current_window
    )
}

pub fn window_row(window: &WindowRecord) -> String {
    let marker = if window.active { '*' } else { ' ' };
    format!("{} {:<5} {:>3}: {}", marker, window.id, window.index, window.name)
}

pub fn print_sessions(sessions: &[SessionRecord], json: bool) {
    if json {
        print_json(sessions);
    } else if sessions.is_empty() {
        println!("no tmux sessions");
    } else {
        for session in sessions {
            println!("{}", session_row(session));
        }
    }
}

pub fn print_windows(windows: &[WindowRecord], json: bool) {
    if json {
        print_json(windows);
    } else if windows.is_empty() {
        println!("no windows");
    } else {
        for window in windows {
            println!("{}", window_row(window));
        }
    }
}

/// Ask on stderr, read y/N from stdin.
pub fn confirm(prompt: &str) -> bool {
    eprint!("{} [y/N] ", prompt);
    io::stderr().flush().ok();

    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    is_yes(&answer)
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_row_marks_attached() {
        let session = SessionRecord {
            name: "web".to_string(),
            window_count: 2,
            pane_count: 3,
            attached: true,
            created: "1700000000".to_string(),
            current_window: "editor".to_string(),
            last_attached: 1700003600,
        };
        let row = session_row(&session);
        assert!(row.starts_with("* web"));
        assert!(row.ends_with("editor"));
    }

    #[test]
    fn test_window_row() {
        let window = WindowRecord {
            id: "@4".to_string(),
            index: 1,
            name: "logs".to_string(),
            active: false,
            layout: String::new(),
        };
        assert_eq!(window_row(&window), "  @4      1: logs");
    }

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes("\n"));
        assert!(!is_yes("nope"));
    }
}
