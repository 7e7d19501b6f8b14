//! Client-side synchronisation with the remote store.

pub mod dispatcher;
pub mod outbox;
pub mod transport;

pub use dispatcher::Dispatcher;
pub use outbox::{Outbound, Outbox, RetryPolicy};
pub use transport::{HttpTransport, Transport};

/// What went wrong, for the UI to decide how to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// A command was applied locally but the server never accepted it
    SyncFailed,
    /// The snapshot could not be loaded
    LoadFailed,
    /// The server rejected the session; the user must sign in again
    SessionExpired,
}

/// A user-visible message raised by the sync layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Category of the problem
    pub kind: NoticeKind,
    /// Human-readable detail
    pub message: String,
}
