use clap::{Args, Subcommand};
use tmuxdir_core::{Mutations, SessionDirectory};

use crate::output;
use crate::Context;

#[derive(Args)]
pub struct SessionsArgs {
    #[command(subcommand)]
    pub action: Option<SessionAction>,

    /// Print JSON instead of a table
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum SessionAction {
    /// List sessions, attached and most recently used first (default)
    List,
    /// Create a detached session
    New {
        name: String,
        /// Working directory for the new session
        #[arg(short = 'c', long = "dir")]
        dir: Option<String>,
    },
    /// Rename a session
    Rename { old: String, new: String },
    /// Kill a session
    Kill {
        name: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Switch the current client to a session or window ID (e.g., @3)
    Switch { target: String },
}

pub fn run(args: SessionsArgs, ctx: &Context) {
    let action = args.action.unwrap_or(SessionAction::List);
    if let Err(e) = run_action(action, args.json, ctx) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run_action(action: SessionAction, json: bool, ctx: &Context) -> tmuxdir_core::Result<()> {
    let mutations = Mutations::new(ctx.executor.clone());

    match action {
        SessionAction::List => {}
        SessionAction::New { name, dir } => mutations.create_session(&name, dir.as_deref())?,
        SessionAction::Rename { old, new } => mutations.rename_session(&old, &new)?,
        SessionAction::Kill { name, yes } => {
            if !yes && !output::confirm(&format!("Kill session '{}'?", name)) {
                return Ok(());
            }
            mutations.delete_session(&name)?;
        }
        SessionAction::Switch { target } => {
            return mutations.switch_to(&target);
        }
    }

    // Mutations don't refresh anything themselves; show the new state.
    let mut directory = SessionDirectory::new(ctx.executor.clone());
    output::print_sessions(directory.refresh(), json);
    Ok(())
}
