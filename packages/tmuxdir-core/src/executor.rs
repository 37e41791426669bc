use std::io::ErrorKind;
use std::process::Command;

use serde::{Deserialize, Serialize};

use crate::error::ExecutionError;

pub const DEFAULT_TMUX_BINARY: &str = "tmux";

/// How a [`TmuxCommand`] reaches the multiplexer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Invocation {
    /// Spawn tmux directly with a discrete argument vector. Nothing is re-parsed.
    #[default]
    Direct,
    /// Run `sh -c "<command line>"`. Every free-form value is escaped and double-quoted.
    Shell,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Arg {
    /// Literal token we wrote ourselves (subcommand, `-t`, `-F`). Never quoted.
    Flag(String),
    /// Anything that came from a user or from tmux output.
    Value(String),
}

/// A single tmux subcommand with its arguments.
///
/// Values are kept apart from flags so the same command renders safely both as
/// an argument vector and as a shell command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TmuxCommand {
    args: Vec<Arg>,
}

impl TmuxCommand {
    pub fn new(subcommand: &str) -> Self {
        Self {
            args: vec![Arg::Flag(subcommand.to_string())],
        }
    }

    pub fn flag(mut self, flag: &str) -> Self {
        self.args.push(Arg::Flag(flag.to_string()));
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.args.push(Arg::Value(value.into()));
        self
    }

    /// Shorthand for `-t <target>`.
    pub fn target(self, target: impl Into<String>) -> Self {
        self.flag("-t").value(target)
    }

    pub fn subcommand(&self) -> &str {
        match self.args.first() {
            Some(Arg::Flag(name)) | Some(Arg::Value(name)) => name,
            None => "",
        }
    }

    /// Raw arguments, exactly as tmux should receive them.
    pub fn argv(&self) -> Vec<&str> {
        self.args
            .iter()
            .map(|arg| match arg {
                Arg::Flag(s) | Arg::Value(s) => s.as_str(),
            })
            .collect()
    }

    /// Render as one shell-parsed line: `tmux [-L socket] sub -t "value" ...`.
    pub fn command_line(&self, program: &str, socket_name: Option<&str>) -> String {
        let mut parts = vec![program.to_string()];
        if let Some(socket) = socket_name {
            parts.push("-L".to_string());
            parts.push(quote_double(socket));
        }
        for arg in &self.args {
            match arg {
                Arg::Flag(flag) => parts.push(flag.clone()),
                Arg::Value(value) => parts.push(quote_double(value)),
            }
        }
        parts.join(" ")
    }
}

/// Backslash-escape the characters that end or re-open a double-quoted shell string.
///
/// Only `"`, `'`, backtick, `\` and `$` are touched; everything else passes through.
pub fn escape_double_quoted(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        if matches!(c, '"' | '\'' | '`' | '\\' | '$') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn quote_double(value: &str) -> String {
    format!("\"{}\"", escape_double_quoted(value))
}

/// Runs tmux commands and returns captured stdout.
///
/// Calls block until the child exits. There is no timeout: a tmux that never
/// exits hangs the caller.
pub trait CommandExecutor: Send + Sync {
    fn execute(&self, command: &TmuxCommand) -> Result<String, ExecutionError>;
}

/// [`CommandExecutor`] backed by a real tmux process.
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    program: String,
    socket_name: Option<String>,
    invocation: Invocation,
}

impl Default for ProcessExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_TMUX_BINARY)
    }
}

impl ProcessExecutor {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            socket_name: None,
            invocation: Invocation::Direct,
        }
    }

    /// Talk to the server on `tmux -L <socket>` instead of the default one.
    pub fn with_socket(mut self, socket_name: Option<String>) -> Self {
        self.socket_name = socket_name;
        self
    }

    pub fn with_invocation(mut self, invocation: Invocation) -> Self {
        self.invocation = invocation;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn invocation(&self) -> Invocation {
        self.invocation
    }

    fn build(&self, command: &TmuxCommand) -> Command {
        match self.invocation {
            Invocation::Direct => {
                let mut cmd = Command::new(&self.program);
                if let Some(socket) = &self.socket_name {
                    cmd.args(["-L", socket]);
                }
                cmd.args(command.argv());
                cmd
            }
            Invocation::Shell => {
                let line = command.command_line(&self.program, self.socket_name.as_deref());
                let mut cmd = Command::new("sh");
                cmd.args(["-c", &line]);
                cmd
            }
        }
    }
}

impl CommandExecutor for ProcessExecutor {
    fn execute(&self, command: &TmuxCommand) -> Result<String, ExecutionError> {
        let line = command.command_line(&self.program, self.socket_name.as_deref());
        log::debug!("executing: {}", line);

        let output = self.build(command).output().map_err(|e| {
            if e.kind() == ErrorKind::NotFound && self.invocation == Invocation::Direct {
                ExecutionError::MissingBinary {
                    program: self.program.clone(),
                }
            } else {
                ExecutionError::Spawn {
                    command: line.clone(),
                    source: e,
                }
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExecutionError::Failed {
                command: line,
                status: output.status.code(),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// Records every command and replays scripted responses in order.
    /// Once the script runs out, every call succeeds with empty output.
    #[derive(Default)]
    pub struct FakeExecutor {
        pub calls: Mutex<Vec<TmuxCommand>>,
        responses: Mutex<VecDeque<Result<String, ExecutionError>>>,
    }

    impl FakeExecutor {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond(&self, stdout: &str) -> &Self {
            self.responses
                .lock()
                .unwrap()
                .push_back(Ok(stdout.to_string()));
            self
        }

        pub fn fail(&self, stderr: &str) -> &Self {
            self.responses
                .lock()
                .unwrap()
                .push_back(Err(ExecutionError::Failed {
                    command: "tmux".to_string(),
                    status: Some(1),
                    stderr: stderr.to_string(),
                }));
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        pub fn argv(&self, index: usize) -> Vec<String> {
            self.calls.lock().unwrap()[index]
                .argv()
                .into_iter()
                .map(String::from)
                .collect()
        }
    }

    impl CommandExecutor for FakeExecutor {
        fn execute(&self, command: &TmuxCommand) -> Result<String, ExecutionError> {
            self.calls.lock().unwrap().push(command.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(String::new()))
        }
    }
}
