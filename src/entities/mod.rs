//! Entity module - Contains all SeaORM entity definitions for the database.
//! One table per entity kind; every per-user table carries a cascading foreign key
//! to `users`. Temporal columns are epoch milliseconds and nested structures are
//! JSON text.

pub mod action;
pub mod applied_command;
pub mod category;
pub mod goal;
pub mod habit;
pub mod habit_log;
pub mod metric_definition;
pub mod metric_entry;
pub mod notification;
pub mod user;

// Re-export specific types to avoid conflicts
pub use action::Entity as Action;
pub use applied_command::Entity as AppliedCommand;
pub use category::Entity as Category;
pub use goal::Entity as Goal;
pub use habit::Entity as Habit;
pub use habit_log::Entity as HabitLog;
pub use metric_definition::Entity as MetricDefinition;
pub use metric_entry::Entity as MetricEntry;
pub use notification::Entity as Notification;
pub use user::Entity as User;
