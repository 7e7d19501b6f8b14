//! Database configuration module.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema (including the cascading
//! foreign keys to `users`) always matches the Rust structs. Creation is
//! idempotent, so it runs on every start-up.

use crate::entities::{
    Action, AppliedCommand, Category, Goal, Habit, HabitLog, MetricDefinition, MetricEntry,
    Notification, User, habit_log,
};
use crate::errors::Result;
use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema, sea_query::Index,
};
use std::path::Path;
use tracing::{debug, info};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/momentum.sqlite?mode=rwc";

/// Gets the database URL from environment variable or returns default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// File path of a `sqlite://` URL, without query parameters. `None` for in-memory
/// databases and other backends.
fn sqlite_file_path(url: &str) -> Option<&Path> {
    let rest = url.strip_prefix("sqlite://")?;
    let path = rest.split('?').next().unwrap_or(rest);
    (!path.is_empty() && path != ":memory:").then(|| Path::new(path))
}

/// Establishes a connection to the database named by `DATABASE_URL`.
///
/// Falls back to a local `SQLite` file if no environment variable is set. The
/// file's parent directory is created when missing.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    if let Some(parent) = sqlite_file_path(&database_url).and_then(Path::parent) {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    debug!("Connecting to database at {database_url}");
    Database::connect(&database_url).await.map_err(Into::into)
}

async fn create_table<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Creates all tables (parents before children) and the habit-log slot index.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    create_table(db, &schema, User).await?;
    create_table(db, &schema, Category).await?;
    create_table(db, &schema, MetricDefinition).await?;
    create_table(db, &schema, MetricEntry).await?;
    create_table(db, &schema, Goal).await?;
    create_table(db, &schema, Action).await?;
    create_table(db, &schema, Habit).await?;
    create_table(db, &schema, HabitLog).await?;
    create_table(db, &schema, Notification).await?;
    create_table(db, &schema, AppliedCommand).await?;

    let slot_index = Index::create()
        .name("idx_habit_logs_habit_date")
        .table(HabitLog)
        .col(habit_log::Column::HabitId)
        .col(habit_log::Column::Date)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&slot_index)).await?;

    info!("Database tables ensured");
    Ok(())
}
