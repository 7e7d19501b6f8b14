//! Remote store business logic.
//!
//! Every function takes a connection and the authenticated user id; nothing here
//! knows about HTTP. The server module is a thin adapter over these calls.

pub mod apply;
pub mod records;
pub mod seeder;
pub mod snapshot;
pub mod user;

pub use apply::{Applied, apply_command, prune_applied_commands};
pub use seeder::{SeedReport, heal_defaults};
pub use snapshot::fetch_all_and_heal;
pub use user::{EnsuredUser, ensure_user};
