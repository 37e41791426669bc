mod logging;
mod output;
mod sessions;
mod watch;
mod windows;

use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tmuxdir_core::{CommandExecutor, ConfigError, DirectoryConfig, Invocation};

#[derive(Parser)]
#[command(
    name = "tmuxdir",
    about = "Tmuxdir: browse, watch, and manage tmux sessions and windows"
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// tmux server socket name (same as tmux -L)
    #[arg(long, global = true)]
    socket: Option<String>,

    /// Run tmux through `sh -c` with escaped arguments
    #[arg(long, global = true)]
    shell: bool,

    /// More log output on stderr (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// List, create, rename, kill, or switch to sessions
    Sessions(sessions::SessionsArgs),

    /// List, create, rename, or kill windows
    Windows(windows::WindowsArgs),

    /// Keep printing the session (or window) list as it changes
    Watch(watch::WatchArgs),
}

/// What every subcommand needs: resolved config and a shared executor.
pub struct Context {
    pub config: DirectoryConfig,
    pub executor: Arc<dyn CommandExecutor>,
}

impl Context {
    fn from_args(global: &GlobalArgs) -> Result<Self, ConfigError> {
        let mut config = DirectoryConfig::load()?;
        if let Some(socket) = &global.socket {
            config.socket_name = Some(socket.clone());
        }
        if global.shell {
            config.invocation = Invocation::Shell;
        }
        let executor: Arc<dyn CommandExecutor> = Arc::new(config.executor());
        Ok(Self { config, executor })
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.global.verbose);

    let ctx = match Context::from_args(&cli.global) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    match cli.command {
        Commands::Sessions(args) => {
            sessions::run(args, &ctx);
        }
        Commands::Windows(args) => {
            windows::run(args, &ctx);
        }
        Commands::Watch(args) => {
            watch::run(args, &ctx).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["tmuxdir", "sessions", "--socket", "work", "-vv"]).unwrap();
        assert_eq!(cli.global.socket.as_deref(), Some("work"));
        assert_eq!(cli.global.verbose, 2);
        assert!(!cli.global.shell);
        assert!(matches!(cli.command, Commands::Sessions(_)));
    }

    #[test]
    fn test_windows_requires_action() {
        assert!(Cli::try_parse_from(["tmuxdir", "windows"]).is_err());
        assert!(Cli::try_parse_from(["tmuxdir", "windows", "list", "web"]).is_ok());
    }
}
