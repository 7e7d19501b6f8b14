//! Optimistic dispatch: apply locally, then sync in the background.

use crate::{
    errors::Result,
    store::{AppState, Command, LocalStore},
    sync::{
        Notice, NoticeKind,
        outbox::{Outbound, Outbox, RetryPolicy},
        transport::Transport,
    },
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, instrument, warn};

/// Owns the session's local store and its outbound queue.
///
/// The UI reads [`Dispatcher::state`] and writes only through
/// [`Dispatcher::dispatch`]. Failed syncs never roll back local state; they
/// surface on the notice channel instead.
pub struct Dispatcher<T> {
    store: LocalStore,
    transport: Arc<T>,
    outbox: Outbox,
    notices: mpsc::UnboundedSender<Notice>,
}

impl<T: Transport> Dispatcher<T> {
    /// Starts a dispatcher; must be called inside a tokio runtime.
    ///
    /// Returns the receiving end of the notice channel alongside it.
    pub fn new(
        store: LocalStore,
        transport: T,
        policy: RetryPolicy,
    ) -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (notices, notice_rx) = mpsc::unbounded_channel();
        let transport = Arc::new(transport);
        let outbox = Outbox::spawn(Arc::clone(&transport), policy, notices.clone());
        (
            Self {
                store,
                transport,
                outbox,
                notices,
            },
            notice_rx,
        )
    }

    /// Current state, as the UI sees it.
    #[must_use]
    pub const fn state(&self) -> &AppState {
        self.store.state()
    }

    fn notify(&self, kind: NoticeKind, message: String) {
        let _ = self.notices.send(Notice { kind, message });
    }

    /// Applies a command locally and, if it is synced, queues it for the server.
    ///
    /// Returns as soon as the local state is updated; delivery happens later.
    #[instrument(skip(self, command), fields(command_type = %command.command_type().as_wire()))]
    pub fn dispatch(&mut self, command: Command) {
        let outbound = match Outbound::from_command(&command) {
            Ok(outbound) => outbound,
            Err(e) => {
                error!("Could not encode command for sync: {e}");
                self.notify(NoticeKind::SyncFailed, format!("Change kept locally only: {e}"));
                None
            }
        };

        self.store.apply(command);

        if let Some(outbound) = outbound {
            if !self.outbox.enqueue(outbound) {
                warn!("Outbox closed; change kept locally only");
                self.notify(
                    NoticeKind::SyncFailed,
                    "Change kept locally only: sync is stopped".to_string(),
                );
            }
        }
    }

    /// Replaces local state with the server's healed snapshot.
    ///
    /// The loading flag is raised for the duration and always lowered again.
    ///
    /// # Errors
    /// Returns the transport error; local state is left as it was.
    #[instrument(skip(self))]
    pub async fn load(&mut self) -> Result<()> {
        self.store.apply(Command::SetLoading(true));
        let outcome = match self.transport.fetch_snapshot().await {
            Ok(snapshot) => {
                info!(
                    goals = snapshot.goals.len(),
                    habits = snapshot.habits.len(),
                    "Snapshot loaded"
                );
                self.store.apply(Command::LoadSnapshot(Box::new(snapshot)));
                Ok(())
            }
            Err(e) => {
                error!("Failed to load snapshot: {e}");
                let kind = if e.requires_reauth() {
                    NoticeKind::SessionExpired
                } else {
                    NoticeKind::LoadFailed
                };
                self.notify(kind, format!("Could not load your data: {e}"));
                Err(e)
            }
        };
        self.store.apply(Command::SetLoading(false));
        outcome
    }

    /// Stops the outbox after everything queued has been attempted, returning the
    /// local store.
    pub async fn shutdown(self) -> LocalStore {
        self.outbox.flush().await;
        self.store
    }
}
