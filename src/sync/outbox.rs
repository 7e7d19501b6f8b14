//! Outbound command queue.
//!
//! One background worker drains the queue in order, so commands reach the remote
//! store in dispatch order. While a command waits, a newer command with the same
//! idempotency key replaces it in place, unless a later waiting command touches
//! the same entity; replacing then would reorder the two. Toggles never coalesce:
//! two flips must reach the server as two flips.

use crate::{
    errors::{Error, Result},
    store::{Command, CommandType},
    sync::{Notice, NoticeKind, transport::Transport},
};
use serde_json::Value;
use std::{collections::VecDeque, sync::Arc, time::Duration};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, error, warn};
use uuid::Uuid;

/// Retry schedule for failed deliveries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per command, including the first
    pub max_attempts: u32,
    /// Delay before the second attempt
    pub base_delay: Duration,
    /// Upper bound on any single delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Delay after the given failed attempt (1-based), doubling each time.
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 2_u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// A command ready for delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    /// `COMMAND_TYPE:entityId` (habit logs add the day)
    pub key: String,
    /// Per-dispatch id the server dedupes on
    pub command_id: String,
    /// Tag, for logging and notices
    pub command_type: CommandType,
    /// Wire body including `commandId`
    pub body: Value,
    entity: Option<String>,
    coalesces: bool,
}

impl Outbound {
    /// Encodes a synced command. View-only commands yield `None`.
    ///
    /// # Errors
    /// Returns a serialization error if the payload cannot be encoded.
    pub fn from_command(command: &Command) -> Result<Option<Self>> {
        let Some(key) = command.idempotency_key() else {
            return Ok(None);
        };
        let command_id = Uuid::new_v4().to_string();
        let body = command.to_wire(&command_id)?;
        let command_type = command.command_type();
        Ok(Some(Self {
            key,
            command_id,
            command_type,
            body,
            entity: command.entity_id().map(str::to_string),
            coalesces: !matches!(
                command_type,
                CommandType::ToggleAction | CommandType::ToggleNotificationRead
            ),
        }))
    }
}

/// Commands waiting for the worker, oldest first.
#[derive(Debug, Default)]
pub struct PendingQueue {
    items: VecDeque<Outbound>,
}

impl PendingQueue {
    /// Queues a command, replacing a waiting one with the same key.
    ///
    /// The replacement only happens when nothing queued after that slot targets
    /// the same entity, so per-entity delivery order always matches dispatch order.
    pub fn push(&mut self, outbound: Outbound) {
        if let Some(index) = self.coalescing_slot(&outbound) {
            debug!(key = %outbound.key, "Coalesced pending command");
            self.items[index] = outbound;
            return;
        }
        self.items.push_back(outbound);
    }

    fn coalescing_slot(&self, outbound: &Outbound) -> Option<usize> {
        if !outbound.coalesces {
            return None;
        }
        let index = self
            .items
            .iter()
            .rposition(|waiting| waiting.coalesces && waiting.key == outbound.key)?;
        let overtaken = self
            .items
            .iter()
            .skip(index + 1)
            .any(|later| later.entity.is_some() && later.entity == outbound.entity);
        (!overtaken).then_some(index)
    }

    /// Takes the oldest command.
    pub fn pop(&mut self) -> Option<Outbound> {
        self.items.pop_front()
    }

    /// Number of waiting commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing is waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

struct Worker<T> {
    transport: Arc<T>,
    policy: RetryPolicy,
    notices: mpsc::UnboundedSender<Notice>,
    pending: PendingQueue,
}

impl<T: Transport> Worker<T> {
    async fn run(mut self, mut inbox: mpsc::UnboundedReceiver<Outbound>) {
        loop {
            if self.pending.is_empty() {
                match inbox.recv().await {
                    Some(outbound) => self.pending.push(outbound),
                    None => break,
                }
            }
            while let Ok(outbound) = inbox.try_recv() {
                self.pending.push(outbound);
            }
            if let Some(next) = self.pending.pop() {
                self.deliver(next).await;
            }
        }
        debug!("Outbox drained and closed");
    }

    async fn deliver(&self, outbound: Outbound) {
        let mut attempt = 1;
        loop {
            match self.transport.send_command(&outbound.body).await {
                Ok(()) => {
                    debug!(key = %outbound.key, attempt, "Command synced");
                    return;
                }
                Err(e) if e.is_retryable() && attempt < self.policy.max_attempts => {
                    let delay = self.policy.delay_after(attempt);
                    warn!(key = %outbound.key, attempt, ?delay, "Sync failed, retrying: {e}");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    error!(key = %outbound.key, attempt, "Giving up on command: {e}");
                    let _ = self.notices.send(Notice::for_failed_command(&outbound, &e));
                    return;
                }
            }
        }
    }
}

impl Notice {
    fn for_failed_command(outbound: &Outbound, error: &Error) -> Self {
        let kind = if error.requires_reauth() {
            NoticeKind::SessionExpired
        } else {
            NoticeKind::SyncFailed
        };
        Self {
            kind,
            message: format!(
                "{} could not be saved: {error}",
                outbound.command_type.as_wire()
            ),
        }
    }
}

/// Handle for enqueueing commands onto the background worker.
#[derive(Debug)]
pub struct Outbox {
    sender: mpsc::UnboundedSender<Outbound>,
    worker: JoinHandle<()>,
}

impl Outbox {
    /// Starts the worker on the current tokio runtime.
    pub fn spawn<T: Transport>(
        transport: Arc<T>,
        policy: RetryPolicy,
        notices: mpsc::UnboundedSender<Notice>,
    ) -> Self {
        let (sender, inbox) = mpsc::unbounded_channel();
        let worker = Worker {
            transport,
            policy,
            notices,
            pending: PendingQueue::default(),
        };
        Self {
            sender,
            worker: tokio::spawn(worker.run(inbox)),
        }
    }

    /// Hands a command to the worker. Returns `false` if the worker has stopped.
    pub fn enqueue(&self, outbound: Outbound) -> bool {
        self.sender.send(outbound).is_ok()
    }

    /// Stops accepting commands and waits until everything queued has been tried.
    pub async fn flush(self) {
        drop(self.sender);
        if let Err(e) = self.worker.await {
            error!("Outbox worker ended abnormally: {e}");
        }
    }
}
