use std::path::PathBuf;

use thiserror::Error;

/// Failure of a single external tmux invocation.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// The multiplexer binary could not be found.
    #[error("{program} not found (is it installed and on PATH?)")]
    MissingBinary { program: String },

    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` failed{}: {stderr}", exit_suffix(.status))]
    Failed {
        command: String,
        status: Option<i32>,
        stderr: String,
    },
}

fn exit_suffix(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!(" (exit {})", code),
        None => " (killed by signal)".to_string(),
    }
}

impl ExecutionError {
    /// True when the failure only means "no tmux server to talk to".
    ///
    /// Session listings treat this as the normal empty state rather than an error.
    pub fn is_absent_server(&self) -> bool {
        match self {
            ExecutionError::MissingBinary { .. } => true,
            ExecutionError::Spawn { .. } => false,
            ExecutionError::Failed { stderr, .. } => {
                let normalized = stderr.to_ascii_lowercase();
                normalized.contains("no server running")
                    || normalized.contains("error connecting to")
                    || normalized.contains("no sessions")
            }
        }
    }
}

/// Errors surfaced by directory listings and mutation operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Rejected locally, before any process was started.
    #[error("invalid {field}: {reason}")]
    Validation {
        field: &'static str,
        reason: &'static str,
    },

    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

impl Error {
    pub(crate) fn empty(field: &'static str) -> Self {
        Error::Validation {
            field,
            reason: "must not be empty",
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation { .. })
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed(stderr: &str) -> ExecutionError {
        ExecutionError::Failed {
            command: "tmux list-sessions".to_string(),
            status: Some(1),
            stderr: stderr.to_string(),
        }
    }

    #[test]
    fn test_absent_server_detection() {
        assert!(failed("no server running on /tmp/tmux-501/default").is_absent_server());
        assert!(failed("error connecting to /tmp/tmux-0/default (No such file or directory)")
            .is_absent_server());
        assert!(ExecutionError::MissingBinary {
            program: "tmux".to_string()
        }
        .is_absent_server());

        assert!(!failed("can't find session: =work").is_absent_server());
        assert!(!failed("duplicate session: web").is_absent_server());
    }

    #[test]
    fn test_failed_message_includes_stderr() {
        let message = failed("can't find window: @9").to_string();
        assert_eq!(
            message,
            "`tmux list-sessions` failed (exit 1): can't find window: @9"
        );
    }

    #[test]
    fn test_validation_message() {
        let err = Error::empty("session name");
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "invalid session name: must not be empty");
    }
}
