use clap::Args;
use tmuxdir_core::{
    spawn_poller, SessionDirectory, SessionRecord, SnapshotEmitter, WindowDirectory, WindowRecord,
};

use crate::output;
use crate::Context;

#[derive(Args)]
pub struct WatchArgs {
    /// Watch this session's windows instead of the session list
    #[arg(long)]
    pub session: Option<String>,

    /// Print each snapshot as one JSON line
    #[arg(long)]
    pub json: bool,
}

/// Prints every changed snapshot to stdout and errors to stderr.
struct PrintEmitter {
    json: bool,
}

impl PrintEmitter {
    fn separator(&self) {
        if !self.json {
            println!("--");
        }
    }
}

impl SnapshotEmitter<SessionRecord> for PrintEmitter {
    fn emit_snapshot(&self, records: &[SessionRecord]) {
        self.separator();
        output::print_sessions(records, self.json);
    }

    fn emit_error(&self, error: String) {
        eprintln!("Error: {}", error);
    }
}

impl SnapshotEmitter<WindowRecord> for PrintEmitter {
    fn emit_snapshot(&self, records: &[WindowRecord]) {
        self.separator();
        output::print_windows(records, self.json);
    }

    fn emit_error(&self, error: String) {
        eprintln!("Error: {}", error);
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("failed to listen for Ctrl-C: {}", e);
    }
}

/// Poll until Ctrl-C, then stop the poller before returning.
pub async fn run(args: WatchArgs, ctx: &Context) {
    let emitter = PrintEmitter { json: args.json };

    match args.session {
        Some(session) => {
            let directory = WindowDirectory::new(ctx.executor.clone(), session);
            let handle = spawn_poller(directory, ctx.config.window_poller(), emitter);
            shutdown_signal().await;
            handle.close().await;
        }
        None => {
            let directory = SessionDirectory::new(ctx.executor.clone());
            let handle = spawn_poller(directory, ctx.config.session_poller(), emitter);
            shutdown_signal().await;
            handle.close().await;
        }
    }
}
