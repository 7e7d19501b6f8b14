/// Database connection and schema creation
pub mod database;

/// Default category and metric catalog loaded from TOML
pub mod catalog;

/// HTTP server settings from environment variables
pub mod server;
