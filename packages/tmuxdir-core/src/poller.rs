//! Timed refresh of a directory, with an explicit lifetime.
//!
//! A poller is one tokio task that owns its directory. Timer ticks and manual
//! refresh requests both funnel into that task, so at most one listing is ever
//! in flight and results are applied in the order they complete:
//! - A tick that comes due during a refresh is skipped, not queued.
//! - Manual requests that arrive during a refresh collapse into one follow-up.
//! - Unchanged snapshots are not re-emitted, and a repeated error is reported once.
//!
//! The task runs until [`PollerHandle::close`] is awaited or the handle is dropped.

use std::time::Duration;

use tokio::sync::mpsc::error::{TryRecvError, TrySendError};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::ExecutionError;

pub const SESSION_POLL_INTERVAL: Duration = Duration::from_secs(5);
/// Active-window changes matter sooner than session list changes.
pub const WINDOW_POLL_INTERVAL: Duration = Duration::from_secs(2);
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Something a poller can refresh. Implemented by both directories.
pub trait Directory: Send + 'static {
    type Record: Clone + PartialEq + Send + Sync + 'static;

    /// Human-readable name used in logs and error messages.
    fn label(&self) -> String;

    /// Re-list, replace the held snapshot and return a copy of it.
    fn refresh(&mut self) -> Result<Vec<Self::Record>, ExecutionError>;
}

/// Receives snapshots and errors from a poller (adapter pattern).
///
/// Implement this in whatever presents the directory.
pub trait SnapshotEmitter<R>: Send + Sync {
    /// Called with the full snapshot whenever it differs from the last one
    fn emit_snapshot(&self, records: &[R]);

    /// Called once per distinct refresh failure
    fn emit_error(&self, error: String);
}

#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub interval: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self::sessions()
    }
}

impl PollerConfig {
    pub fn sessions() -> Self {
        Self {
            interval: SESSION_POLL_INTERVAL,
        }
    }

    pub fn windows() -> Self {
        Self {
            interval: WINDOW_POLL_INTERVAL,
        }
    }

    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval: interval.max(MIN_POLL_INTERVAL),
        }
    }
}

#[derive(Debug)]
enum PollCommand {
    Refresh,
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Continue,
    Stop,
}

/// Owner's handle on a running poller.
pub struct PollerHandle<R> {
    commands: mpsc::Sender<PollCommand>,
    snapshot: watch::Receiver<Vec<R>>,
    task: Option<JoinHandle<()>>,
}

impl<R: Clone> PollerHandle<R> {
    /// Ask for an out-of-band refresh, e.g. right after a successful mutation.
    ///
    /// Returns false once the poller has stopped.
    pub fn refresh(&self) -> bool {
        match self.commands.try_send(PollCommand::Refresh) {
            Ok(()) => true,
            // Already queued; it will be coalesced anyway.
            Err(TrySendError::Full(_)) => true,
            Err(TrySendError::Closed(_)) => false,
        }
    }

    /// The latest applied snapshot.
    pub fn snapshot(&self) -> Vec<R> {
        self.snapshot.borrow().clone()
    }

    /// Watch channel that changes on every applied refresh.
    pub fn subscribe(&self) -> watch::Receiver<Vec<R>> {
        self.snapshot.clone()
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stop the timer and wait for the task to exit.
    ///
    /// A listing already in flight is allowed to finish first; nothing is
    /// emitted after this returns.
    pub async fn close(mut self) {
        let _ = self.commands.send(PollCommand::Shutdown).await;
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                log::warn!("poller task ended abnormally: {}", e);
            }
        }
    }
}

impl<R> Drop for PollerHandle<R> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Start polling `directory` on the current tokio runtime.
///
/// The first refresh runs immediately.
pub fn spawn_poller<D, E>(directory: D, config: PollerConfig, emitter: E) -> PollerHandle<D::Record>
where
    D: Directory,
    E: SnapshotEmitter<D::Record> + 'static,
{
    let (command_tx, command_rx) = mpsc::channel(4);
    let (snapshot_tx, snapshot_rx) = watch::channel(Vec::new());

    let poller = Poller {
        label: directory.label(),
        directory: Some(directory),
        config,
        commands: command_rx,
        snapshot: snapshot_tx,
        emitter,
        last_emitted: None,
        last_error: None,
    };
    let task = tokio::spawn(poller.run());

    PollerHandle {
        commands: command_tx,
        snapshot: snapshot_rx,
        task: Some(task),
    }
}

struct Poller<D: Directory, E> {
    label: String,
    /// Lent to the blocking pool while a listing runs
    directory: Option<D>,
    config: PollerConfig,
    commands: mpsc::Receiver<PollCommand>,
    snapshot: watch::Sender<Vec<D::Record>>,
    emitter: E,
    last_emitted: Option<Vec<D::Record>>,
    last_error: Option<String>,
}

impl<D, E> Poller<D, E>
where
    D: Directory,
    E: SnapshotEmitter<D::Record>,
{
    async fn run(mut self) {
        log::info!("polling {} every {:?}", self.label, self.config.interval);

        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            let step = tokio::select! {
                _ = ticker.tick() => self.refresh_serialized().await,

                cmd = self.commands.recv() => match cmd {
                    Some(PollCommand::Refresh) => {
                        let step = self.refresh_serialized().await;
                        // A manual refresh counts as this period's poll
                        ticker.reset();
                        step
                    }
                    Some(PollCommand::Shutdown) | None => Step::Stop,
                },
            };

            if step == Step::Stop {
                break;
            }
        }

        log::info!("stopped polling {}", self.label);
    }

    /// Refresh once, then once more for each burst of manual requests that
    /// queued up in the meantime.
    async fn refresh_serialized(&mut self) -> Step {
        loop {
            if self.refresh_once().await == Step::Stop {
                return Step::Stop;
            }

            let mut again = false;
            loop {
                match self.commands.try_recv() {
                    Ok(PollCommand::Refresh) => again = true,
                    Ok(PollCommand::Shutdown) | Err(TryRecvError::Disconnected) => {
                        return Step::Stop
                    }
                    Err(TryRecvError::Empty) => break,
                }
            }
            if !again {
                return Step::Continue;
            }
        }
    }

    async fn refresh_once(&mut self) -> Step {
        let Some(mut directory) = self.directory.take() else {
            return Step::Stop;
        };

        let joined = tokio::task::spawn_blocking(move || {
            let outcome = directory.refresh();
            (directory, outcome)
        })
        .await;

        match joined {
            Ok((directory, outcome)) => {
                self.directory = Some(directory);
                self.apply(outcome);
                Step::Continue
            }
            Err(e) => {
                self.emitter
                    .emit_error(format!("Refreshing {} failed: {}", self.label, e));
                Step::Stop
            }
        }
    }

    fn apply(&mut self, outcome: Result<Vec<D::Record>, ExecutionError>) {
        let records = match outcome {
            Ok(records) => {
                self.last_error = None;
                records
            }
            Err(e) => {
                let message = format!("Failed to list {}: {}", self.label, e);
                if self.last_error.as_deref() != Some(message.as_str()) {
                    log::warn!("{}", message);
                    self.emitter.emit_error(message.clone());
                    self.last_error = Some(message);
                }
                Vec::new()
            }
        };

        self.snapshot.send_replace(records.clone());
        if self.last_emitted.as_ref() != Some(&records) {
            log::debug!("{}: emitting {} record(s)", self.label, records.len());
            self.emitter.emit_snapshot(&records);
            self.last_emitted = Some(records);
        }
    }
}
