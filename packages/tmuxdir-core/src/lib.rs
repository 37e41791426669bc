//! Live directory of tmux sessions and windows.
//!
//! ## Key components:
//! - `executor` - Run tmux and capture its output
//! - `parser` - Split `-F` listings into typed records
//! - `session` / `window` - Ordered snapshots of sessions and of one session's windows
//! - `mutation` - Create, rename, delete and switch
//! - `poller` - Timed refresh with de-duplication and an explicit close
//! - `config` - User configuration

pub mod config;
pub mod error;
pub mod executor;
pub mod mutation;
pub mod parser;
pub mod poller;
pub mod session;
pub mod window;

use serde::{Deserialize, Serialize};

pub use config::DirectoryConfig;
pub use error::{ConfigError, Error, ExecutionError, Result};
pub use executor::{CommandExecutor, Invocation, ProcessExecutor, TmuxCommand};
pub use mutation::Mutations;
pub use parser::{Fields, ListRecord, FIELD_DELIM};
pub use poller::{spawn_poller, Directory, PollerConfig, PollerHandle, SnapshotEmitter};
pub use session::SessionDirectory;
pub use window::WindowDirectory;

// ============================================
// Records
// ============================================

/// One tmux session, as of the last listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Unique session name; also the mutation target
    pub name: String,
    pub window_count: u32,
    pub pane_count: u32,
    /// At least one client is viewing the session
    pub attached: bool,
    /// tmux creation timestamp, display only
    pub created: String,
    /// Name of the session's active window (may be empty)
    pub current_window: String,
    /// Epoch seconds of the last attach, 0 if never attached
    pub last_attached: u64,
}

impl ListRecord for SessionRecord {
    const FIELDS: &'static [&'static str] = &[
        "#{session_name}",
        "#{session_windows}",
        "#{?session_attached,1,0}",
        "#{session_created}",
        "#{window_name}",
        "#{window_panes}",
        "#{session_last_attached}",
    ];

    fn from_fields(fields: &Fields<'_>) -> Self {
        Self {
            name: fields.text(0),
            window_count: fields.number(1),
            attached: fields.flag(2),
            created: fields.text(3),
            current_window: fields.text(4),
            pane_count: fields.number(5),
            last_attached: fields.number(6),
        }
    }
}

/// One window of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowRecord {
    /// Stable window ID (e.g., "@3"); the only safe mutation target
    pub id: String,
    /// Position in the session; shifts when windows come and go
    pub index: u32,
    pub name: String,
    pub active: bool,
    /// tmux layout string, display only
    pub layout: String,
}

impl ListRecord for WindowRecord {
    const FIELDS: &'static [&'static str] = &[
        "#{window_id}",
        "#{window_index}",
        "#{window_name}",
        "#{window_active}",
        "#{window_layout}",
    ];

    fn from_fields(fields: &Fields<'_>) -> Self {
        Self {
            id: fields.text(0),
            index: fields.number(1),
            name: fields.text(2),
            active: fields.flag(3),
            layout: fields.text(4),
        }
    }
}
