//! Create, rename, delete and switch sessions and windows.
//!
//! Every argument is trimmed and checked before tmux is started. Sessions are
//! addressed by name and windows by their `@` ID, never by index. None of these
//! refresh a directory; the caller does that after a success.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::executor::{CommandExecutor, TmuxCommand};

/// Target string that matches `name` exactly instead of by prefix.
pub(crate) fn exact_session(name: &str) -> String {
    format!("={}", name)
}

fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::empty(field));
    }
    Ok(trimmed)
}

fn window_id<'a>(value: &'a str) -> Result<&'a str> {
    let id = required("window id", value)?;
    if !id.starts_with('@') {
        return Err(Error::Validation {
            field: "window id",
            reason: "expected a tmux window ID such as @3",
        });
    }
    Ok(id)
}

pub struct Mutations {
    executor: Arc<dyn CommandExecutor>,
}

impl Mutations {
    pub fn new(executor: Arc<dyn CommandExecutor>) -> Self {
        Self { executor }
    }

    fn run(&self, command: TmuxCommand) -> Result<()> {
        log::info!("running {}", command.subcommand());
        self.executor.execute(&command)?;
        Ok(())
    }

    pub fn session_exists(&self, name: &str) -> Result<bool> {
        let name = required("session name", name)?;
        let command = TmuxCommand::new("has-session").target(exact_session(name));
        match self.executor.execute(&command) {
            Ok(_) => Ok(true),
            Err(e) if e.is_absent_server() => Ok(false),
            Err(crate::ExecutionError::Failed { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Start a detached session, optionally rooted at `working_directory`.
    pub fn create_session(&self, name: &str, working_directory: Option<&str>) -> Result<()> {
        let name = required("session name", name)?;
        let mut command = TmuxCommand::new("new-session")
            .flag("-d")
            .flag("-s")
            .value(name);
        if let Some(dir) = working_directory.map(str::trim).filter(|d| !d.is_empty()) {
            command = command.flag("-c").value(dir);
        }
        self.run(command)
    }

    pub fn rename_session(&self, old_name: &str, new_name: &str) -> Result<()> {
        let old_name = required("session name", old_name)?;
        let new_name = required("new session name", new_name)?;
        self.run(
            TmuxCommand::new("rename-session")
                .target(exact_session(old_name))
                .value(new_name),
        )
    }

    pub fn delete_session(&self, name: &str) -> Result<()> {
        let name = required("session name", name)?;
        self.run(TmuxCommand::new("kill-session").target(exact_session(name)))
    }

    /// Point the current client at `target`: a session name or a window ID.
    pub fn switch_to(&self, target: &str) -> Result<()> {
        let target = required("switch target", target)?;
        let target = if target.starts_with('@') {
            target.to_string()
        } else {
            exact_session(target)
        };
        self.run(TmuxCommand::new("switch-client").target(target))
    }

    pub fn create_window(&self, session_name: &str, name: &str) -> Result<()> {
        let session_name = required("session name", session_name)?;
        let name = required("window name", name)?;
        self.run(
            TmuxCommand::new("new-window")
                .target(format!("{}:", exact_session(session_name)))
                .flag("-n")
                .value(name),
        )
    }

    pub fn rename_window(&self, id: &str, name: &str) -> Result<()> {
        let id = window_id(id)?;
        let name = required("window name", name)?;
        self.run(TmuxCommand::new("rename-window").target(id).value(name))
    }

    pub fn delete_window(&self, id: &str) -> Result<()> {
        let id = window_id(id)?;
        self.run(TmuxCommand::new("kill-window").target(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::testing::FakeExecutor;
    use crate::ExecutionError;

    fn setup() -> (Arc<FakeExecutor>, Mutations) {
        let fake = Arc::new(FakeExecutor::new());
        let mutations = Mutations::new(fake.clone());
        (fake, mutations)
    }

    #[test]
    fn test_create_session_with_directory() {
        let (fake, m) = setup();
        m.create_session("  web ", Some("/srv/my app")).unwrap();
        assert_eq!(
            fake.argv(0),
            vec!["new-session", "-d", "-s", "web", "-c", "/srv/my app"]
        );
    }

    #[test]
    fn test_create_session_without_directory() {
        let (fake, m) = setup();
        m.create_session("web", Some("   ")).unwrap();
        m.create_session("api", None).unwrap();
        assert_eq!(fake.argv(0), vec!["new-session", "-d", "-s", "web"]);
        assert_eq!(fake.argv(1), vec!["new-session", "-d", "-s", "api"]);
    }

    #[test]
    fn test_create_session_escapes_directory_in_command_line() {
        let (fake, m) = setup();
        m.create_session("web", Some(r#"/tmp/a"b'c`d\e"#)).unwrap();
        let line = fake.calls.lock().unwrap()[0].command_line("tmux", None);
        assert_eq!(
            line,
            r#"tmux new-session -d -s "web" -c "/tmp/a\"b\'c\`d\\e""#
        );
    }

    #[test]
    fn test_rename_and_delete_session_use_exact_target() {
        let (fake, m) = setup();
        m.rename_session("web", "web2").unwrap();
        m.delete_session("web2").unwrap();
        assert_eq!(fake.argv(0), vec!["rename-session", "-t", "=web", "web2"]);
        assert_eq!(fake.argv(1), vec!["kill-session", "-t", "=web2"]);
    }

    #[test]
    fn test_switch_to_session_or_window() {
        let (fake, m) = setup();
        m.switch_to("infra").unwrap();
        m.switch_to("@12").unwrap();
        assert_eq!(fake.argv(0), vec!["switch-client", "-t", "=infra"]);
        assert_eq!(fake.argv(1), vec!["switch-client", "-t", "@12"]);
    }

    #[test]
    fn test_window_mutations_target_ids() {
        let (fake, m) = setup();
        m.create_window("web", "logs").unwrap();
        m.rename_window("@4", "tail").unwrap();
        m.delete_window("@4").unwrap();
        assert_eq!(fake.argv(0), vec!["new-window", "-t", "=web:", "-n", "logs"]);
        assert_eq!(fake.argv(1), vec!["rename-window", "-t", "@4", "tail"]);
        assert_eq!(fake.argv(2), vec!["kill-window", "-t", "@4"]);
    }

    #[test]
    fn test_empty_names_never_reach_tmux() {
        let (fake, m) = setup();
        assert!(m.rename_window("@1", "   ").unwrap_err().is_validation());
        assert!(m.create_session("\t", None).unwrap_err().is_validation());
        assert!(m.rename_session("web", "").unwrap_err().is_validation());
        assert!(m.delete_session(" ").unwrap_err().is_validation());
        assert!(m.switch_to("").unwrap_err().is_validation());
        assert!(m.create_window("web", " ").unwrap_err().is_validation());
        assert!(m.delete_window("").unwrap_err().is_validation());
        assert_eq!(fake.call_count(), 0);
    }

    #[test]
    fn test_window_index_is_rejected() {
        let (fake, m) = setup();
        let err = m.delete_window("2").unwrap_err();
        assert!(err.is_validation());
        assert_eq!(fake.call_count(), 0);
    }

    #[test]
    fn test_execution_failure_is_surfaced() {
        let (fake, m) = setup();
        fake.fail("duplicate session: web");
        match m.create_session("web", None).unwrap_err() {
            Error::Execution(ExecutionError::Failed { stderr, .. }) => {
                assert_eq!(stderr, "duplicate session: web");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_session_exists() {
        let (fake, m) = setup();
        fake.respond("").fail("can't find session: =gone").fail("no server running");
        assert!(m.session_exists("web").unwrap());
        assert!(!m.session_exists("gone").unwrap());
        assert!(!m.session_exists("any").unwrap());
        assert_eq!(fake.argv(0), vec!["has-session", "-t", "=web"]);
    }
}
