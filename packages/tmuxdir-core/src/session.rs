use std::cmp::Ordering;
use std::sync::Arc;

use crate::executor::{CommandExecutor, TmuxCommand};
use crate::parser::{format_string, parse_records};
use crate::poller::Directory;
use crate::{ExecutionError, SessionRecord};

/// All sessions on the server, attached first, most recently used first.
pub struct SessionDirectory {
    executor: Arc<dyn CommandExecutor>,
    snapshot: Vec<SessionRecord>,
}

impl SessionDirectory {
    pub fn new(executor: Arc<dyn CommandExecutor>) -> Self {
        Self {
            executor,
            snapshot: Vec::new(),
        }
    }

    /// `list-sessions` requesting every field in one round trip.
    pub fn list_command() -> TmuxCommand {
        TmuxCommand::new("list-sessions")
            .flag("-F")
            .value(format_string::<SessionRecord>())
    }

    /// List and order every session.
    ///
    /// Never fails: with no server running (or any other listing failure) the
    /// directory is simply empty.
    pub fn list_sessions(&self) -> Vec<SessionRecord> {
        let output = match self.executor.execute(&Self::list_command()) {
            Ok(output) => output,
            Err(e) => {
                log_absorbed_failure(&e);
                return Vec::new();
            }
        };

        let mut sessions = parse_records::<SessionRecord>(&output);
        sort_sessions(&mut sessions);
        sessions
    }

    /// Re-list and replace the held snapshot.
    pub fn refresh(&mut self) -> &[SessionRecord] {
        self.snapshot = self.list_sessions();
        log::debug!("session snapshot: {} session(s)", self.snapshot.len());
        &self.snapshot
    }

    pub fn snapshot(&self) -> &[SessionRecord] {
        &self.snapshot
    }
}

fn log_absorbed_failure(error: &ExecutionError) {
    if error.is_absent_server() {
        log::debug!("no tmux server, session list is empty: {}", error);
    } else {
        log::warn!("listing sessions failed, showing none: {}", error);
    }
}

/// Attached sessions first, then descending `last_attached`, then name.
///
/// The sort is stable, so identical input always yields identical order, and
/// duplicate names are kept side by side rather than merged.
pub fn sort_sessions(sessions: &mut [SessionRecord]) {
    sessions.sort_by(compare_sessions);
}

fn compare_sessions(a: &SessionRecord, b: &SessionRecord) -> Ordering {
    b.attached
        .cmp(&a.attached)
        .then_with(|| b.last_attached.cmp(&a.last_attached))
        .then_with(|| a.name.cmp(&b.name))
}

impl Directory for SessionDirectory {
    type Record = SessionRecord;

    fn label(&self) -> String {
        "sessions".to_string()
    }

    fn refresh(&mut self) -> Result<Vec<SessionRecord>, ExecutionError> {
        Ok(SessionDirectory::refresh(self).to_vec())
    }
}
