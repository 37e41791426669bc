use std::sync::Arc;

use crate::executor::{CommandExecutor, TmuxCommand};
use crate::mutation::exact_session;
use crate::parser::{format_string, parse_records};
use crate::poller::Directory;
use crate::{ExecutionError, WindowRecord};

/// Windows of one session, in tmux's own (index) order.
pub struct WindowDirectory {
    executor: Arc<dyn CommandExecutor>,
    session: String,
    snapshot: Vec<WindowRecord>,
}

impl WindowDirectory {
    pub fn new(executor: Arc<dyn CommandExecutor>, session: impl Into<String>) -> Self {
        Self {
            executor,
            session: session.into(),
            snapshot: Vec::new(),
        }
    }

    pub fn session(&self) -> &str {
        &self.session
    }

    pub fn list_command(session: &str) -> TmuxCommand {
        TmuxCommand::new("list-windows")
            .target(exact_session(session))
            .flag("-F")
            .value(format_string::<WindowRecord>())
    }

    /// List the session's windows without re-sorting them.
    ///
    /// Unlike the session list, a failure here is reported: an open window view
    /// means the caller expects the session to exist.
    pub fn list_windows(&self) -> Result<Vec<WindowRecord>, ExecutionError> {
        let output = self.executor.execute(&Self::list_command(&self.session))?;
        Ok(parse_records(&output))
    }

    /// Re-list and replace the held snapshot. On failure the snapshot is
    /// emptied and the error handed back.
    pub fn refresh(&mut self) -> Result<&[WindowRecord], ExecutionError> {
        match self.list_windows() {
            Ok(windows) => {
                log::debug!(
                    "window snapshot for {}: {} window(s)",
                    self.session,
                    windows.len()
                );
                self.snapshot = windows;
                Ok(&self.snapshot)
            }
            Err(e) => {
                self.snapshot.clear();
                Err(e)
            }
        }
    }

    pub fn snapshot(&self) -> &[WindowRecord] {
        &self.snapshot
    }

    pub fn active_window(&self) -> Option<&WindowRecord> {
        self.snapshot.iter().find(|w| w.active)
    }
}

impl Directory for WindowDirectory {
    type Record = WindowRecord;

    fn label(&self) -> String {
        format!("windows of {}", self.session)
    }

    fn refresh(&mut self) -> Result<Vec<WindowRecord>, ExecutionError> {
        WindowDirectory::refresh(self).map(<[WindowRecord]>::to_vec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::testing::FakeExecutor;

    const TWO_WINDOWS: &str = "@7|||0|||shell|||0|||aaaa,80x24,0,0,1\n@2|||1|||editor|||1|||bbbb,80x24,0,0,2\n";

    #[test]
    fn test_keeps_tmux_order() {
        let fake = Arc::new(FakeExecutor::new());
        fake.respond(TWO_WINDOWS);
        let directory = WindowDirectory::new(fake.clone(), "web");

        let windows = directory.list_windows().unwrap();
        let ids: Vec<&str> = windows.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, vec!["@7", "@2"]);
        assert_eq!(
            fake.argv(0)[..3],
            ["list-windows".to_string(), "-t".to_string(), "=web".to_string()]
        );
    }

    #[test]
    fn test_failure_is_reported_and_clears_snapshot() {
        let fake = Arc::new(FakeExecutor::new());
        fake.respond(TWO_WINDOWS).fail("can't find session: =web");
        let mut directory = WindowDirectory::new(fake, "web");

        assert_eq!(directory.refresh().unwrap().len(), 2);
        assert_eq!(directory.active_window().map(|w| w.id.as_str()), Some("@2"));

        let err = directory.refresh().unwrap_err();
        assert!(err.to_string().contains("can't find session"));
        assert!(directory.snapshot().is_empty());
        assert!(directory.active_window().is_none());
    }

    #[test]
    fn test_blank_output_is_empty_not_error() {
        let fake = Arc::new(FakeExecutor::new());
        fake.respond("\n\n");
        let directory = WindowDirectory::new(fake, "web");
        assert!(directory.list_windows().unwrap().is_empty());
    }
}
