use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::executor::{Invocation, ProcessExecutor, DEFAULT_TMUX_BINARY};
use crate::poller::{PollerConfig, SESSION_POLL_INTERVAL, WINDOW_POLL_INTERVAL};

/// Overrides `tmux_binary`
pub const ENV_TMUX_BINARY: &str = "TMUXDIR_TMUX";
/// Overrides `socket_name`
pub const ENV_SOCKET: &str = "TMUXDIR_SOCKET";

/// Get the path to the tmuxdir config file
pub fn get_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tmuxdir").join("config.json"))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    /// tmux program to run
    pub tmux_binary: String,

    /// Server socket name (`tmux -L <name>`); default server when unset
    pub socket_name: Option<String>,

    /// Argument vector (default) or a single escaped `sh -c` command line
    pub invocation: Invocation,

    pub session_poll_interval_ms: u64,

    pub window_poll_interval_ms: u64,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            tmux_binary: DEFAULT_TMUX_BINARY.to_string(),
            socket_name: None,
            invocation: Invocation::Direct,
            session_poll_interval_ms: SESSION_POLL_INTERVAL.as_millis() as u64,
            window_poll_interval_ms: WINDOW_POLL_INTERVAL.as_millis() as u64,
        }
    }
}

impl DirectoryConfig {
    /// Load the user config (if any) and apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match get_config_path() {
            Some(path) => Self::load_from(&path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// A missing file is not an error; it just means defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("no config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(binary) = var(ENV_TMUX_BINARY).filter(|v| !v.trim().is_empty()) {
            self.tmux_binary = binary;
        }
        if let Some(socket) = var(ENV_SOCKET).filter(|v| !v.trim().is_empty()) {
            self.socket_name = Some(socket);
        }
    }

    pub fn executor(&self) -> ProcessExecutor {
        ProcessExecutor::new(self.tmux_binary.clone())
            .with_socket(self.socket_name.clone())
            .with_invocation(self.invocation)
    }

    pub fn session_poller(&self) -> PollerConfig {
        PollerConfig::with_interval(Duration::from_millis(self.session_poll_interval_ms))
    }

    pub fn window_poller(&self) -> PollerConfig {
        PollerConfig::with_interval(Duration::from_millis(self.window_poll_interval_ms))
    }
}
